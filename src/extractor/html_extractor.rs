//! HTML文档提取器
//! 由html5ever按HTML树构建算法驱动，将元素、文本与注释写入节点数组DOM

use std::borrow::Cow;
use std::cell::{Ref, RefCell};
use std::collections::HashMap;

use html5ever::tree_builder::{ElementFlags, NodeOrText, QuirksMode, TreeSink};
use html5ever::{parse_document, Attribute, QualName};
use tendril::{StrTendril, TendrilSink};

use crate::dom::{ElementData, HtmlDocument, NodeId};
use crate::log::trace;

#[derive(Debug, Default)]
pub struct HtmlExtractor {
    doc: RefCell<HtmlDocument>,
    // 树构建器需要带命名空间的元素名
    names: RefCell<HashMap<NodeId, QualName>>,
    // template元素 -> 内容片段
    templates: RefCell<HashMap<NodeId, NodeId>>,
}

impl HtmlExtractor {
    /// 创建新的提取器
    pub fn new() -> Self {
        Self::default()
    }

    /// 从HTML字符串构建文档
    pub fn extract(self, html: &str) -> HtmlDocument {
        parse_document(self, Default::default()).one(html)
    }

    fn collect_attrs(attrs: &[Attribute]) -> Vec<(String, String)> {
        attrs
            .iter()
            .map(|attr| (attr.name.local.to_string(), attr.value.to_string()))
            .collect()
    }
}

impl TreeSink for HtmlExtractor {
    type Handle = NodeId;
    type Output = HtmlDocument;
    type ElemName<'a> = Ref<'a, QualName>;

    fn finish(self) -> HtmlDocument {
        self.doc.into_inner()
    }

    fn parse_error(&self, msg: Cow<'static, str>) {
        trace!("HTML解析警告：{}", msg);
    }

    fn get_document(&self) -> NodeId {
        self.doc.borrow().root()
    }

    fn elem_name<'a>(&'a self, target: &'a NodeId) -> Ref<'a, QualName> {
        // 树构建器只会对自己创建的元素取名
        Ref::map(self.names.borrow(), |names| &names[target])
    }

    fn create_element(&self, name: QualName, attrs: Vec<Attribute>, _flags: ElementFlags) -> NodeId {
        let data = ElementData {
            tag: name.local.to_string(),
            attrs: Self::collect_attrs(&attrs),
        };
        let node = self.doc.borrow_mut().create_element_from(data);
        self.names.borrow_mut().insert(node, name);
        node
    }

    fn create_comment(&self, text: StrTendril) -> NodeId {
        self.doc.borrow_mut().create_comment(text.to_string())
    }

    fn create_pi(&self, _target: StrTendril, data: StrTendril) -> NodeId {
        self.doc.borrow_mut().create_comment(data.to_string())
    }

    fn append(&self, parent: &NodeId, child: NodeOrText<NodeId>) {
        let mut doc = self.doc.borrow_mut();
        match child {
            NodeOrText::AppendNode(node) => {
                doc.remove(node);
                doc.attach(*parent, node);
            }
            NodeOrText::AppendText(text) => doc.append_text(*parent, &text),
        }
    }

    fn append_based_on_parent_node(&self, element: &NodeId, prev_element: &NodeId, child: NodeOrText<NodeId>) {
        let has_parent = self.doc.borrow().parent(*element).is_some();
        if has_parent {
            self.append_before_sibling(element, child);
        } else {
            self.append(prev_element, child);
        }
    }

    fn append_doctype_to_document(&self, name: StrTendril, _public_id: StrTendril, _system_id: StrTendril) {
        trace!("忽略文档类型声明：{}", name);
    }

    fn get_template_contents(&self, target: &NodeId) -> NodeId {
        if let Some(&contents) = self.templates.borrow().get(target) {
            return contents;
        }
        let contents = self.doc.borrow_mut().create_fragment();
        self.templates.borrow_mut().insert(*target, contents);
        contents
    }

    fn same_node(&self, x: &NodeId, y: &NodeId) -> bool {
        x == y
    }

    fn set_quirks_mode(&self, mode: QuirksMode) {
        trace!("文档模式：{:?}", mode);
    }

    fn append_before_sibling(&self, sibling: &NodeId, new_node: NodeOrText<NodeId>) {
        let mut doc = self.doc.borrow_mut();
        match new_node {
            NodeOrText::AppendNode(node) => doc.insert_before(*sibling, node),
            NodeOrText::AppendText(text) => doc.insert_text_before(*sibling, &text),
        }
    }

    fn add_attrs_if_missing(&self, target: &NodeId, attrs: Vec<Attribute>) {
        let mut doc = self.doc.borrow_mut();
        for (name, value) in Self::collect_attrs(&attrs) {
            if doc.attribute(*target, &name).is_none() {
                let _ = doc.set_attribute(*target, &name, value);
            }
        }
    }

    fn remove_from_parent(&self, target: &NodeId) {
        self.doc.borrow_mut().remove(*target);
    }

    fn reparent_children(&self, node: &NodeId, new_parent: &NodeId) {
        self.doc.borrow_mut().move_children(*node, *new_parent);
    }
}
