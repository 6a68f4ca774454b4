//! 表单快照

use std::fmt::Debug;

use crate::log::debug;

use super::inspector::FormInspector;
use crate::dom::Document;

/// 某一时刻主表单及支付能力的视图
///
/// - `form_element`：主表单节点
/// - `validatable_fields`：需要校验的控件，文档顺序
/// - `has_*`：生成快照时计算的页面能力标记，`flush` 不会重新计算
/// - `errors`：由外部校验逻辑写入的错误信息，检测器从不修改
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormSnapshot<N> {
    pub form_element: Option<N>,
    pub validatable_fields: Vec<N>,
    pub has_accordion: bool,
    pub has_payment: bool,
    pub has_paypal: bool,
    pub has_stripe_checkout: bool,
    pub errors: Vec<String>,
}

impl<N: Copy + Eq + Debug> FormSnapshot<N> {
    /// DOM变化（增删控件）后重新定位表单并刷新待校验控件
    pub fn flush<D: Document<Node = N>>(&mut self, inspector: &FormInspector, doc: &D) {
        self.form_element = inspector.locate_form(doc);
        self.validatable_fields = match self.form_element {
            Some(form) => inspector.validatable_fields(doc, form),
            None => Vec::new(),
        };

        debug!(
            "表单快照已刷新，表单存在：{}，待校验控件数：{}",
            self.form_element.is_some(),
            self.validatable_fields.len()
        );
    }

    pub fn add_error(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}
