//! 表单检测器：定位主表单、筛选需要校验的控件、识别支付能力

use once_cell::sync::Lazy;
use regex::Regex;
use crate::log::debug;

use super::snapshot::FormSnapshot;
use crate::config::{ConfigManager, GlobalConfig};
use crate::dom::{Document, Selector};
use crate::error::{FormResult, RsFormError};
use crate::utils::PageLocation;

/// 需要校验的控件类型
const VALIDATABLE_TAGS: [&str; 3] = ["input", "textarea", "select"];

/// 默认的App推广码正则（Android、iOS，以及将来可能的其他App）
static DEFAULT_APP_CAMPAIGN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&ConfigManager::get_default().app_campaign_pattern).unwrap()
});

/// 表单检测器
#[derive(Debug, Clone)]
pub struct FormInspector {
    config: GlobalConfig,
    app_campaign: Regex,
}

impl Default for FormInspector {
    fn default() -> Self {
        Self {
            config: ConfigManager::get_default(),
            app_campaign: DEFAULT_APP_CAMPAIGN.clone(),
        }
    }
}

impl FormInspector {
    /// 创建检测器，校验配置中的选择器并编译推广码正则
    pub fn new(config: GlobalConfig) -> FormResult<Self> {
        for selector in [
            &config.form_selector,
            &config.payment_selector,
            &config.stripe_checkout_selector,
            &config.accordion_selector,
        ] {
            Selector::parse(selector)?;
        }
        if config.paypal_button_id.trim().is_empty() {
            return Err(RsFormError::ConfigError("PayPal按钮id不能为空".to_string()));
        }
        if config.validation_attribute.trim().is_empty() {
            return Err(RsFormError::ConfigError("校验规则属性名不能为空".to_string()));
        }

        let app_campaign = Regex::new(&config.app_campaign_pattern)?;
        if config.verbose {
            debug!("表单检测器已创建，主表单选择器：{}", config.form_selector);
        }

        Ok(Self { config, app_campaign })
    }

    pub fn config(&self) -> &GlobalConfig {
        &self.config
    }

    /// 定位主表单
    pub fn locate_form<D: Document>(&self, doc: &D) -> Option<D::Node> {
        doc.query_selector(&self.config.form_selector)
    }

    /// 保留 input/textarea/select 中必填或带有非空校验规则的控件，保持原有顺序
    pub fn select_validatable<D: Document>(&self, doc: &D, elements: &[D::Node]) -> Vec<D::Node> {
        elements
            .iter()
            .copied()
            .filter(|&node| self.needs_validation(doc, node))
            .collect()
    }

    fn needs_validation<D: Document>(&self, doc: &D, node: D::Node) -> bool {
        let Some(name) = doc.node_name(node) else {
            return false;
        };
        if !VALIDATABLE_TAGS.iter().any(|tag| name.eq_ignore_ascii_case(tag)) {
            return false;
        }

        let required = doc.has_attribute(node, "required");
        let has_profile = doc
            .get_attribute(node, &self.config.validation_attribute)
            .map(|profile| !profile.is_empty())
            .unwrap_or(false);

        required || has_profile
    }

    /// 表单中需要校验的控件
    pub fn validatable_fields<D: Document>(&self, doc: &D, form: D::Node) -> Vec<D::Node> {
        self.select_validatable(doc, &doc.form_elements(form))
    }

    /// 是否有信用卡输入框
    pub fn has_payment_field<D: Document>(&self, doc: &D) -> bool {
        doc.query_selector(&self.config.payment_selector).is_some()
    }

    /// 是否有Stripe结账按钮
    pub fn has_stripe_checkout_field<D: Document>(&self, doc: &D) -> bool {
        doc.query_selector(&self.config.stripe_checkout_selector).is_some()
    }

    /// 是否有姓名/地址折叠面板
    pub fn has_accordion_field<D: Document>(&self, doc: &D) -> bool {
        doc.query_selector(&self.config.accordion_selector).is_some()
    }

    /// 访问是否来自原生App（推广码参数缺失时视为不是）
    pub fn is_app_campaign(&self, location: &PageLocation) -> bool {
        location
            .query_parameter(&self.config.campaign_parameter)
            .map(|code| self.app_campaign.is_match(&code))
            .unwrap_or(false)
    }

    /// 页面有PayPal按钮，且访问不是来自原生App
    pub fn has_paypal_button<D: Document>(&self, doc: &D, location: &PageLocation) -> bool {
        doc.get_element_by_id(&self.config.paypal_button_id).is_some() && !self.is_app_campaign(location)
    }

    /// 生成快照；页面没有主表单时返回 None（不是错误，表示该页面无需校验）
    pub fn build<D: Document>(&self, doc: &D, location: &PageLocation) -> Option<FormSnapshot<D::Node>> {
        let Some(form) = self.locate_form(doc) else {
            debug!("未找到主表单（{}），跳过表单快照", self.config.form_selector);
            return None;
        };

        let snapshot = FormSnapshot {
            form_element: Some(form),
            validatable_fields: self.validatable_fields(doc, form),
            has_accordion: self.has_accordion_field(doc),
            has_payment: self.has_payment_field(doc),
            has_paypal: self.has_paypal_button(doc, location),
            has_stripe_checkout: self.has_stripe_checkout_field(doc),
            errors: Vec::new(),
        };

        debug!(
            "表单快照已生成，待校验控件数：{}，payment={}，paypal={}，stripe={}，accordion={}",
            snapshot.validatable_fields.len(),
            snapshot.has_payment,
            snapshot.has_paypal,
            snapshot.has_stripe_checkout,
            snapshot.has_accordion
        );

        Some(snapshot)
    }
}
