//! rsformutil - 会员/活动站点页面的主表单检测工具

// 导出全局错误类型
pub use self::error::{RsFormError, FormResult};

// 导出配置模块
pub use self::config::{GlobalConfig, ConfigManager, CustomConfigBuilder};

// 导出DOM模块核心接口
pub use self::dom::{Document, HtmlDocument, NodeId, Selector};

// 导出提取模块核心接口
pub use self::extractor::HtmlExtractor;

// 导出工具模块核心接口
pub use self::utils::{
    CookieReader, PageLocation, get_cookie, get_query_parameter_by_name
};

// 导出表单模块核心接口
pub use self::form::{FormInspector, FormSnapshot, SnapshotReport};

// 导出启动模块核心接口
pub use self::bootstrap::{
    BootReport, Bootstrap, ConsentFlow, FnModule, InitPhase, PageContext, PageModule
};

// 日志宏（crate内部）
mod log;

// 声明所有子模块
pub mod config;
pub mod error;
pub mod dom;
pub mod extractor;
pub mod utils;
pub mod form;
pub mod bootstrap;

/// 便捷接口：解析HTML并按默认配置生成快照
pub fn inspect_html(html: &str, page_url: Option<&str>) -> FormResult<Option<(HtmlDocument, FormSnapshot<NodeId>)>> {
    let location = match page_url {
        Some(url) => PageLocation::parse(url)?,
        None => PageLocation::blank(),
    };
    let doc = HtmlDocument::parse(html);
    let snapshot = FormInspector::default().build(&doc, &location);
    Ok(snapshot.map(|s| (doc, s)))
}
