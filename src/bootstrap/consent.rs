//! 同意管理流程选择
//! 美国访客走CCPA流程，其余访客（包括缺少国家Cookie的访客）显示同意横幅

use serde::{Deserialize, Serialize};

use crate::config::GlobalConfig;
use crate::utils::{get_cookie, PageLocation};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConsentFlow {
    /// 同意管理平台，开启CCPA模式
    Ccpa,
    /// 站内同意横幅
    Banner,
}

impl ConsentFlow {
    pub const CCPA_COUNTRY: &'static str = "US";

    /// 国家码区分大小写
    pub fn for_country(country: Option<&str>) -> Self {
        match country {
            Some(Self::CCPA_COUNTRY) => Self::Ccpa,
            _ => Self::Banner,
        }
    }

    pub fn uses_ccpa(self) -> bool {
        matches!(self, Self::Ccpa)
    }
}

/// 页面上下文：初始化模块时可见的页面地址与Cookie
#[derive(Debug, Clone)]
pub struct PageContext {
    location: PageLocation,
    cookie_header: String,
    country_cookie: String,
}

impl PageContext {
    pub fn new(location: PageLocation, cookie_header: impl Into<String>) -> Self {
        Self::with_config(location, cookie_header, &GlobalConfig::default())
    }

    pub fn with_config(location: PageLocation, cookie_header: impl Into<String>, config: &GlobalConfig) -> Self {
        Self {
            location,
            cookie_header: cookie_header.into(),
            country_cookie: config.country_cookie.clone(),
        }
    }

    pub fn location(&self) -> &PageLocation {
        &self.location
    }

    pub fn cookie(&self, name: &str) -> Option<String> {
        get_cookie(&self.cookie_header, name)
    }

    pub fn country(&self) -> Option<String> {
        self.cookie(&self.country_cookie)
    }

    pub fn consent_flow(&self) -> ConsentFlow {
        ConsentFlow::for_country(self.country().as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigManager;

    #[test]
    fn test_for_country() {
        assert_eq!(ConsentFlow::for_country(Some("US")), ConsentFlow::Ccpa);
        assert_eq!(ConsentFlow::for_country(Some("GB")), ConsentFlow::Banner);
        assert_eq!(ConsentFlow::for_country(Some("us")), ConsentFlow::Banner);
        assert_eq!(ConsentFlow::for_country(None), ConsentFlow::Banner);
        assert!(ConsentFlow::Ccpa.uses_ccpa());
    }

    #[test]
    fn test_context_reads_country_cookie() {
        let ctx = PageContext::new(PageLocation::blank(), "GU_mvt_id=1; GU_country=US");
        assert_eq!(ctx.country().as_deref(), Some("US"));
        assert_eq!(ctx.consent_flow(), ConsentFlow::Ccpa);

        let ctx = PageContext::new(PageLocation::blank(), "");
        assert_eq!(ctx.consent_flow(), ConsentFlow::Banner);
    }

    #[test]
    fn test_context_custom_cookie_name() {
        let config = ConfigManager::custom().country_cookie("geo").build();
        let ctx = PageContext::with_config(PageLocation::blank(), "GU_country=GB; geo=US", &config);
        assert_eq!(ctx.consent_flow(), ConsentFlow::Ccpa);
    }

    #[test]
    fn test_serialized_name() {
        assert_eq!(serde_json::to_string(&ConsentFlow::Ccpa).unwrap(), "\"ccpa\"");
    }
}
