//! 提取模块：从HTML源码构建文档树
pub mod html_extractor;

pub use self::html_extractor::HtmlExtractor;
