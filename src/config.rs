//! 全局配置管理,存储页面标记选择器与表单相关的可配置项

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::FormResult;

/// 全局配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlobalConfig {
    // 主表单选择器
    pub form_selector: String,
    // 信用卡输入框选择器
    pub payment_selector: String,
    // Stripe结账按钮选择器
    pub stripe_checkout_selector: String,
    // 地址折叠面板选择器
    pub accordion_selector: String,
    // PayPal按钮id（按id查找，不是选择器）
    pub paypal_button_id: String,
    // 校验规则属性名
    pub validation_attribute: String,
    // 推广来源查询参数名
    pub campaign_parameter: String,
    // 来自原生App的推广码正则
    pub app_campaign_pattern: String,
    // 国家Cookie名
    pub country_cookie: String,
    // 是否启用详细日志
    pub verbose: bool,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            form_selector: ".js-form".to_string(),
            payment_selector: ".js-credit-card-number".to_string(),
            stripe_checkout_selector: ".js-stripe-checkout".to_string(),
            accordion_selector: ".js-continue-name-address".to_string(),
            paypal_button_id: "paypal-button-checkout".to_string(),
            validation_attribute: "data-validation".to_string(),
            campaign_parameter: "INTCMP".to_string(),
            app_campaign_pattern: "^APP_.*_MEMBERSHIP_PAYMENT_SCREEN$".to_string(),
            country_cookie: "GU_country".to_string(),
            verbose: false,
        }
    }
}

impl GlobalConfig {
    /// 从JSON字符串加载配置，缺省字段使用默认值
    pub fn from_json_str(json: &str) -> FormResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// 从JSON文件加载配置
    pub fn from_json_file(path: &Path) -> FormResult<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }
}

/// 配置管理器
pub struct ConfigManager;

impl ConfigManager {
    /// 获取默认配置
    pub fn get_default() -> GlobalConfig {
        GlobalConfig::default()
    }

    /// 自定义配置
    pub fn custom() -> CustomConfigBuilder {
        CustomConfigBuilder::new()
    }
}

/// 配置构建器（便于自定义配置）
#[derive(Debug, Clone, Default)]
pub struct CustomConfigBuilder {
    config: GlobalConfig,
}

impl CustomConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn form_selector(mut self, selector: impl Into<String>) -> Self {
        self.config.form_selector = selector.into();
        self
    }

    pub fn payment_selector(mut self, selector: impl Into<String>) -> Self {
        self.config.payment_selector = selector.into();
        self
    }

    pub fn stripe_checkout_selector(mut self, selector: impl Into<String>) -> Self {
        self.config.stripe_checkout_selector = selector.into();
        self
    }

    pub fn accordion_selector(mut self, selector: impl Into<String>) -> Self {
        self.config.accordion_selector = selector.into();
        self
    }

    pub fn paypal_button_id(mut self, id: impl Into<String>) -> Self {
        self.config.paypal_button_id = id.into();
        self
    }

    pub fn validation_attribute(mut self, name: impl Into<String>) -> Self {
        self.config.validation_attribute = name.into();
        self
    }

    pub fn campaign_parameter(mut self, name: impl Into<String>) -> Self {
        self.config.campaign_parameter = name.into();
        self
    }

    pub fn app_campaign_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.config.app_campaign_pattern = pattern.into();
        self
    }

    pub fn country_cookie(mut self, name: impl Into<String>) -> Self {
        self.config.country_cookie = name.into();
        self
    }

    pub fn verbose(mut self, verbose: bool) -> Self {
        self.config.verbose = verbose;
        self
    }

    pub fn build(self) -> GlobalConfig {
        self.config
    }
}
