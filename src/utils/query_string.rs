//! 页面地址与查询参数读取

use once_cell::sync::Lazy;
use crate::log::debug;
use url::Url;

use crate::error::FormResult;

/// 相对地址的解析基准
static PLACEHOLDER_BASE: Lazy<Url> = Lazy::new(|| {
    Url::parse("http://localhost/").expect("固定的基准地址必然合法")
});

/// 当前页面地址
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PageLocation {
    url: Option<Url>,
}

impl PageLocation {
    /// 解析页面地址，支持绝对地址和 `/join?x=1`、`?x=1` 这类相对地址
    pub fn parse(raw: &str) -> FormResult<Self> {
        let url = match Url::parse(raw) {
            Ok(url) => url,
            Err(url::ParseError::RelativeUrlWithoutBase) => PLACEHOLDER_BASE.join(raw)?,
            Err(e) => return Err(e.into()),
        };
        Ok(Self { url: Some(url) })
    }

    /// 没有地址信息的页面（所有查询参数都不存在）
    pub fn blank() -> Self {
        Self::default()
    }

    pub fn url(&self) -> Option<&Url> {
        self.url.as_ref()
    }

    /// 读取查询参数，同名参数取第一个，值已做百分号和 `+` 解码
    pub fn query_parameter(&self, name: &str) -> Option<String> {
        self.url
            .as_ref()?
            .query_pairs()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.into_owned())
    }
}

/// 从地址字符串中读取查询参数，地址无效时视为参数不存在
pub fn get_query_parameter_by_name(raw_url: &str, name: &str) -> Option<String> {
    match PageLocation::parse(raw_url) {
        Ok(location) => location.query_parameter(name),
        Err(e) => {
            debug!("地址无法解析，忽略查询参数 {}：{}", name, e);
            None
        }
    }
}
