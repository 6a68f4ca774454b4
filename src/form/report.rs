//! 快照报告：将快照转换为可序列化的摘要，供命令行输出或其他语言调用方使用

use serde::{Deserialize, Serialize};

use super::inspector::FormInspector;
use super::snapshot::FormSnapshot;
use crate::dom::Document;
use crate::error::FormResult;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormSummary {
    pub id: Option<String>,
    pub action: Option<String>,
    pub method: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSummary {
    pub tag: String,
    pub id: Option<String>,
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub input_type: Option<String>,
    pub required: bool,
    pub validation: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilityFlags {
    pub has_accordion: bool,
    pub has_payment: bool,
    pub has_paypal: bool,
    pub has_stripe_checkout: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotReport {
    pub form: Option<FormSummary>,
    pub flags: CapabilityFlags,
    pub fields: Vec<FieldSummary>,
    pub errors: Vec<String>,
}

impl SnapshotReport {
    /// 校验规则从检测器配置的属性中读取
    pub fn from_snapshot<D: Document>(
        doc: &D,
        snapshot: &FormSnapshot<D::Node>,
        inspector: &FormInspector,
    ) -> Self {
        let validation_attribute = inspector.config().validation_attribute.as_str();
        let owned = |node: D::Node, name: &str| doc.get_attribute(node, name).map(str::to_string);

        let form = snapshot.form_element.map(|form| FormSummary {
            id: owned(form, "id"),
            action: owned(form, "action"),
            method: owned(form, "method").map(|m| m.to_ascii_lowercase()),
        });

        let fields = snapshot
            .validatable_fields
            .iter()
            .map(|&node| FieldSummary {
                tag: doc.node_name(node).unwrap_or_default().to_ascii_lowercase(),
                id: owned(node, "id"),
                name: owned(node, "name"),
                input_type: owned(node, "type"),
                required: doc.has_attribute(node, "required"),
                validation: owned(node, validation_attribute).filter(|v| !v.is_empty()),
            })
            .collect();

        Self {
            form,
            flags: CapabilityFlags {
                has_accordion: snapshot.has_accordion,
                has_payment: snapshot.has_payment,
                has_paypal: snapshot.has_paypal,
                has_stripe_checkout: snapshot.has_stripe_checkout,
            },
            fields,
            errors: snapshot.errors.clone(),
        }
    }

    pub fn to_json(&self, pretty: bool) -> FormResult<String> {
        let json = if pretty {
            serde_json::to_string_pretty(self)?
        } else {
            serde_json::to_string(self)?
        };
        Ok(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigManager;
    use crate::dom::HtmlDocument;
    use crate::utils::PageLocation;

    #[test]
    fn test_report_from_snapshot() {
        let doc = HtmlDocument::parse(
            r#"<form id="payment-form" class="js-form" action="/join/paid" method="POST">
                 <input id="email" name="email" type="email" required data-validation="email">
                 <SELECT name="country" data-validation="country"></SELECT>
                 <input name="nickname">
               </form>
               <span class="js-stripe-checkout"></span>"#,
        );
        let inspector = FormInspector::default();
        let mut snapshot = inspector.build(&doc, &PageLocation::blank()).unwrap();
        snapshot.add_error("Email is required");

        let report = SnapshotReport::from_snapshot(&doc, &snapshot, &inspector);
        let form = report.form.clone().unwrap();
        assert_eq!(form.id.as_deref(), Some("payment-form"));
        assert_eq!(form.method.as_deref(), Some("post"));
        assert!(report.flags.has_stripe_checkout);
        assert!(!report.flags.has_payment);

        assert_eq!(report.fields.len(), 2);
        assert_eq!(report.fields[0].input_type.as_deref(), Some("email"));
        assert!(report.fields[0].required);
        assert_eq!(report.fields[1].tag, "select");
        assert!(!report.fields[1].required);
        assert_eq!(report.fields[1].validation.as_deref(), Some("country"));
        assert_eq!(report.errors, vec!["Email is required"]);
    }

    #[test]
    fn test_report_json_shape() {
        let doc = HtmlDocument::parse(r#"<form class="js-form"><input name="a" type="text" required></form>"#);
        let inspector = FormInspector::default();
        let snapshot = inspector.build(&doc, &PageLocation::blank()).unwrap();
        let report = SnapshotReport::from_snapshot(&doc, &snapshot, &inspector);

        let value: serde_json::Value = serde_json::from_str(&report.to_json(false).unwrap()).unwrap();
        assert_eq!(value["fields"][0]["type"], "text");
        assert_eq!(value["flags"]["has_paypal"], false);
        assert!(value["form"]["id"].is_null());

        let parsed: SnapshotReport = serde_json::from_str(&report.to_json(true).unwrap()).unwrap();
        assert_eq!(parsed, report);
    }

    #[test]
    fn test_report_reads_configured_validation_attribute() {
        let doc = HtmlDocument::parse(
            r#"<form class="js-form">
                 <input name="a" data-rules="postcode" data-validation="ignored">
                 <input name="b" data-rules="">
               </form>"#,
        );
        let config = ConfigManager::custom().validation_attribute("data-rules").build();
        let inspector = FormInspector::new(config).unwrap();
        let snapshot = inspector.build(&doc, &PageLocation::blank()).unwrap();
        let report = SnapshotReport::from_snapshot(&doc, &snapshot, &inspector);

        assert_eq!(report.fields.len(), 1);
        assert_eq!(report.fields[0].name.as_deref(), Some("a"));
        assert_eq!(report.fields[0].validation.as_deref(), Some("postcode"));
    }
}
