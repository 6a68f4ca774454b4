//! 基于节点数组的可变DOM树
//! 节点只追加不回收，移除操作仅断开父子关系，已移除节点的句柄仍然有效

use super::document::Document;
use super::selector::Selector;
use crate::error::{FormResult, RsFormError};
use crate::extractor::HtmlExtractor;
use crate::log::warn;

/// 表单关联控件（listed elements）
const LISTED_ELEMENTS: [&str; 7] = [
    "button", "fieldset", "input", "object", "output", "select", "textarea",
];

/// 节点句柄
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// 元素数据
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementData {
    pub tag: String,
    pub attrs: Vec<(String, String)>,
}

impl ElementData {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attrs: Vec::new(),
        }
    }

    /// 属性名比较忽略ASCII大小写
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.attr("class")
            .map(|classes| classes.split_ascii_whitespace().any(|c| c == class))
            .unwrap_or(false)
    }

    pub fn is(&self, tag: &str) -> bool {
        self.tag.eq_ignore_ascii_case(tag)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Document,
    Element(ElementData),
    Text(String),
    Comment(String),
}

#[derive(Debug, Clone)]
struct NodeData {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl NodeData {
    fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            parent: None,
            children: Vec::new(),
        }
    }
}

/// HTML文档
#[derive(Debug, Clone)]
pub struct HtmlDocument {
    nodes: Vec<NodeData>,
}

impl Default for HtmlDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl HtmlDocument {
    /// 创建只有根节点的空文档
    pub fn new() -> Self {
        Self {
            nodes: vec![NodeData::new(NodeKind::Document)],
        }
    }

    /// 从HTML源码构建文档
    pub fn parse(html: &str) -> Self {
        HtmlExtractor::new().extract(html)
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// 数组中的节点总数，包含已移除和游离的节点
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes[0].children.is_empty()
    }

    pub fn kind(&self, node: NodeId) -> Option<&NodeKind> {
        self.nodes.get(node.0).map(|n| &n.kind)
    }

    pub fn element(&self, node: NodeId) -> Option<&ElementData> {
        match self.kind(node) {
            Some(NodeKind::Element(data)) => Some(data),
            _ => None,
        }
    }

    fn element_mut(&mut self, node: NodeId) -> Option<&mut ElementData> {
        match self.nodes.get_mut(node.0).map(|n| &mut n.kind) {
            Some(NodeKind::Element(data)) => Some(data),
            _ => None,
        }
    }

    pub fn tag_name(&self, node: NodeId) -> Option<&str> {
        self.element(node).map(|e| e.tag.as_str())
    }

    pub fn attribute(&self, node: NodeId, name: &str) -> Option<&str> {
        self.element(node).and_then(|e| e.attr(name))
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes.get(node.0).and_then(|n| n.parent)
    }

    pub fn children(&self, node: NodeId) -> &[NodeId] {
        self.nodes
            .get(node.0)
            .map(|n| n.children.as_slice())
            .unwrap_or(&[])
    }

    /// 祖先节点（由近及远，不含自身）
    pub fn ancestors(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.parent(node), move |&n| self.parent(n))
    }

    /// 节点是否仍挂在文档根上
    pub fn is_connected(&self, node: NodeId) -> bool {
        node == self.root() || self.ancestors(node).any(|a| a == self.root())
    }

    /// 先序遍历的后代节点（不含自身）
    pub fn descendants(&self, node: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(node).iter().rev().copied().collect();
        while let Some(current) = stack.pop() {
            out.push(current);
            stack.extend(self.children(current).iter().rev().copied());
        }
        out
    }

    pub fn text_content(&self, node: NodeId) -> String {
        let mut text = String::new();
        if let Some(NodeKind::Text(t)) = self.kind(node) {
            text.push_str(t);
        }
        for child in self.descendants(node) {
            if let Some(NodeKind::Text(t)) = self.kind(child) {
                text.push_str(t);
            }
        }
        text
    }

    // ===== 修改操作 =====

    /// 创建游离元素，标签名保持原样
    pub fn create_element(&mut self, tag: impl Into<String>) -> NodeId {
        self.push_node(NodeKind::Element(ElementData::new(tag)))
    }

    pub(crate) fn create_element_from(&mut self, data: ElementData) -> NodeId {
        self.push_node(NodeKind::Element(data))
    }

    pub fn create_text(&mut self, text: impl Into<String>) -> NodeId {
        self.push_node(NodeKind::Text(text.into()))
    }

    pub(crate) fn create_comment(&mut self, text: impl Into<String>) -> NodeId {
        self.push_node(NodeKind::Comment(text.into()))
    }

    /// 游离的文档片段（template内容）
    pub(crate) fn create_fragment(&mut self) -> NodeId {
        self.push_node(NodeKind::Document)
    }

    fn push_node(&mut self, kind: NodeKind) -> NodeId {
        self.nodes.push(NodeData::new(kind));
        NodeId(self.nodes.len() - 1)
    }

    /// 将子节点追加到父节点末尾，子节点原有位置会先被移除
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> FormResult<()> {
        if parent.0 >= self.nodes.len() || child.0 >= self.nodes.len() {
            return Err(RsFormError::InvalidInput(format!("节点不存在：{:?} / {:?}", parent, child)));
        }
        if matches!(self.nodes[parent.0].kind, NodeKind::Text(_) | NodeKind::Comment(_)) {
            return Err(RsFormError::InvalidInput("文本或注释节点不能包含子节点".to_string()));
        }
        if child == self.root() || child == parent || self.ancestors(parent).any(|a| a == child) {
            return Err(RsFormError::InvalidInput(format!("追加{:?}会形成环", child)));
        }

        self.remove(child);
        self.attach(parent, child);
        Ok(())
    }

    pub(crate) fn attach(&mut self, parent: NodeId, child: NodeId) {
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
    }

    /// 追加文本，与末尾文本节点合并
    pub(crate) fn append_text(&mut self, parent: NodeId, text: &str) {
        if let Some(&last) = self.nodes[parent.0].children.last() {
            if let NodeKind::Text(existing) = &mut self.nodes[last.0].kind {
                existing.push_str(text);
                return;
            }
        }
        let node = self.create_text(text);
        self.attach(parent, node);
    }

    /// 插入到兄弟节点之前，兄弟节点游离时不做任何事
    pub(crate) fn insert_before(&mut self, sibling: NodeId, node: NodeId) {
        let Some(parent) = self.parent(sibling) else {
            return;
        };
        self.remove(node);
        let Some(pos) = self.nodes[parent.0].children.iter().position(|&c| c == sibling) else {
            return;
        };
        self.nodes[parent.0].children.insert(pos, node);
        self.nodes[node.0].parent = Some(parent);
    }

    /// 在兄弟节点之前插入文本，与前一个文本节点合并
    pub(crate) fn insert_text_before(&mut self, sibling: NodeId, text: &str) {
        let Some(parent) = self.parent(sibling) else {
            return;
        };
        let siblings = &self.nodes[parent.0].children;
        let previous = siblings
            .iter()
            .position(|&c| c == sibling)
            .and_then(|pos| pos.checked_sub(1))
            .map(|pos| siblings[pos]);
        if let Some(previous) = previous {
            if let NodeKind::Text(existing) = &mut self.nodes[previous.0].kind {
                existing.push_str(text);
                return;
            }
        }
        let node = self.create_text(text);
        self.insert_before(sibling, node);
    }

    /// 将全部子节点按原顺序移到新父节点末尾
    pub(crate) fn move_children(&mut self, from: NodeId, to: NodeId) {
        let children = std::mem::take(&mut self.nodes[from.0].children);
        for &child in &children {
            self.nodes[child.0].parent = Some(to);
        }
        self.nodes[to.0].children.extend(children);
    }

    /// 从父节点断开（根节点不可移除）
    pub fn remove(&mut self, node: NodeId) {
        let Some(parent) = self.parent(node) else {
            return;
        };
        self.nodes[parent.0].children.retain(|&c| c != node);
        self.nodes[node.0].parent = None;
    }

    /// 设置属性，已存在则覆盖
    pub fn set_attribute(&mut self, node: NodeId, name: &str, value: impl Into<String>) -> FormResult<()> {
        let value = value.into();
        let element = self
            .element_mut(node)
            .ok_or_else(|| RsFormError::InvalidInput(format!("{:?} 不是元素节点", node)))?;

        match element.attrs.iter_mut().find(|(key, _)| key.eq_ignore_ascii_case(name)) {
            Some((_, existing)) => *existing = value,
            None => element.attrs.push((name.to_string(), value)),
        }
        Ok(())
    }

    pub fn remove_attribute(&mut self, node: NodeId, name: &str) -> Option<String> {
        let element = self.element_mut(node)?;
        let pos = element.attrs.iter().position(|(key, _)| key.eq_ignore_ascii_case(name))?;
        Some(element.attrs.remove(pos).1)
    }

    // ===== 选择器查询 =====

    /// 文档顺序中第一个匹配的元素
    pub fn select_first(&self, selector: &Selector) -> Option<NodeId> {
        self.descendants(self.root())
            .into_iter()
            .find(|&n| selector.matches(self, n))
    }

    pub fn select_all(&self, selector: &Selector) -> Vec<NodeId> {
        self.descendants(self.root())
            .into_iter()
            .filter(|&n| selector.matches(self, n))
            .collect()
    }

    /// 与 querySelectorAll 相同，选择器无效时返回空列表
    pub fn query_selector_all(&self, selector: &str) -> Vec<NodeId> {
        match Selector::parse(selector) {
            Ok(parsed) => self.select_all(&parsed),
            Err(e) => {
                warn!("{}", e);
                Vec::new()
            }
        }
    }

    /// 元素的表单归属：有form属性时按id关联，否则取最近的form祖先
    fn form_owner(&self, node: NodeId) -> Option<NodeId> {
        let element = self.element(node)?;
        if let Some(form_id) = element.attr("form") {
            if !self.is_connected(node) {
                return None;
            }
            return self
                .get_element_by_id(form_id)
                .filter(|&f| self.element(f).map(|e| e.is("form")).unwrap_or(false));
        }
        self.ancestors(node)
            .find(|&a| self.element(a).map(|e| e.is("form")).unwrap_or(false))
    }

    fn is_listed_control(element: &ElementData) -> bool {
        if !LISTED_ELEMENTS.iter().any(|tag| element.is(tag)) {
            return false;
        }
        // 图片按钮不计入 form.elements
        !(element.is("input")
            && element
                .attr("type")
                .map(|t| t.eq_ignore_ascii_case("image"))
                .unwrap_or(false))
    }
}

impl Document for HtmlDocument {
    type Node = NodeId;

    fn query_selector(&self, selector: &str) -> Option<NodeId> {
        match Selector::parse(selector) {
            Ok(parsed) => self.select_first(&parsed),
            Err(e) => {
                warn!("{}", e);
                None
            }
        }
    }

    fn get_element_by_id(&self, id: &str) -> Option<NodeId> {
        if id.is_empty() {
            return None;
        }
        self.descendants(self.root())
            .into_iter()
            .find(|&n| self.attribute(n, "id") == Some(id))
    }

    fn node_name(&self, node: NodeId) -> Option<&str> {
        self.tag_name(node)
    }

    fn get_attribute(&self, node: NodeId, name: &str) -> Option<&str> {
        self.attribute(node, name)
    }

    fn form_elements(&self, form: NodeId) -> Vec<NodeId> {
        // 游离的表单只看自身子树，挂在文档上的表单还要考虑通过form属性关联的控件
        let scope = if self.is_connected(form) {
            self.descendants(self.root())
        } else {
            self.descendants(form)
        };

        scope
            .into_iter()
            .filter(|&n| {
                self.element(n).map(Self::is_listed_control).unwrap_or(false)
                    && self.form_owner(n) == Some(form)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_and_query() {
        let mut doc = HtmlDocument::new();
        let form = doc.create_element("form");
        doc.set_attribute(form, "class", "js-form signup").unwrap();
        doc.append_child(doc.root(), form).unwrap();
        let input = doc.create_element("input");
        doc.set_attribute(input, "id", "email").unwrap();
        doc.append_child(form, input).unwrap();

        assert_eq!(doc.query_selector(".js-form"), Some(form));
        assert_eq!(doc.query_selector("form.signup input"), Some(input));
        assert_eq!(doc.get_element_by_id("email"), Some(input));
        assert_eq!(doc.query_selector(".missing"), None);
        assert!(doc.is_connected(input));
    }

    #[test]
    fn test_invalid_selector_is_absent() {
        let doc = HtmlDocument::parse("<div class=\"a\"></div>");
        assert_eq!(doc.query_selector("div > .a"), None);
        assert!(doc.query_selector_all("").is_empty());
    }

    #[test]
    fn test_remove_detaches_subtree() {
        let mut doc = HtmlDocument::parse("<div id=\"outer\"><span id=\"inner\">hi</span></div>");
        let outer = doc.get_element_by_id("outer").unwrap();
        let inner = doc.get_element_by_id("inner").unwrap();

        doc.remove(outer);
        assert!(!doc.is_connected(outer));
        assert!(!doc.is_connected(inner));
        assert_eq!(doc.get_element_by_id("inner"), None);
        // 游离节点本身仍可读取
        assert_eq!(doc.text_content(outer), "hi");
    }

    #[test]
    fn test_append_child_rejects_cycles() {
        let mut doc = HtmlDocument::parse("<div id=\"a\"><div id=\"b\"></div></div>");
        let a = doc.get_element_by_id("a").unwrap();
        let b = doc.get_element_by_id("b").unwrap();
        assert!(doc.append_child(b, a).is_err());
        assert!(doc.append_child(a, a).is_err());
        assert!(doc.append_child(b, doc.root()).is_err());
    }

    #[test]
    fn test_append_child_moves_node() {
        let mut doc = HtmlDocument::parse("<div id=\"a\"><p id=\"p\"></p></div><div id=\"b\"></div>");
        let a = doc.get_element_by_id("a").unwrap();
        let b = doc.get_element_by_id("b").unwrap();
        let p = doc.get_element_by_id("p").unwrap();

        doc.append_child(b, p).unwrap();
        assert!(doc.children(a).is_empty());
        assert_eq!(doc.children(b), &[p]);
        assert_eq!(doc.parent(p), Some(b));
    }

    #[test]
    fn test_attributes() {
        let mut doc = HtmlDocument::parse("<input ID=\"x\" required>");
        let input = doc.get_element_by_id("x").unwrap();
        assert!(doc.has_attribute(input, "REQUIRED"));
        assert_eq!(doc.get_attribute(input, "required"), Some(""));

        doc.set_attribute(input, "data-validation", "email").unwrap();
        doc.set_attribute(input, "data-validation", "postcode").unwrap();
        assert_eq!(doc.attribute(input, "data-validation"), Some("postcode"));
        assert_eq!(doc.remove_attribute(input, "required"), Some(String::new()));
        assert!(!doc.has_attribute(input, "required"));

        let text = doc.create_text("hello");
        assert!(doc.set_attribute(text, "id", "t").is_err());
    }

    #[test]
    fn test_form_elements_collects_listed_controls() {
        let html = r#"
            <form id="signup" class="js-form">
              <fieldset><input name="a"><input type="image" name="img"></fieldset>
              <label>Country</label>
              <select name="country"><option>UK</option></select>
              <textarea name="notes"></textarea>
              <button type="submit">Go</button>
              <input name="elsewhere" form="other">
            </form>
            <input name="outside" form="signup">
            <input name="orphan">
        "#;
        let doc = HtmlDocument::parse(html);
        let form = doc.get_element_by_id("signup").unwrap();

        let names: Vec<String> = doc
            .form_elements(form)
            .into_iter()
            .map(|n| {
                doc.attribute(n, "name")
                    .map(str::to_string)
                    .unwrap_or_else(|| doc.tag_name(n).unwrap_or_default().to_string())
            })
            .collect();

        assert_eq!(names, vec!["fieldset", "a", "country", "notes", "button", "outside"]);
    }

    #[test]
    fn test_form_elements_of_detached_form() {
        let mut doc = HtmlDocument::parse(
            r#"<form id="f"><input name="inner"></form><input name="linked" form="f">"#,
        );
        let form = doc.get_element_by_id("f").unwrap();
        doc.remove(form);
        let controls = doc.form_elements(form);
        assert_eq!(controls.len(), 1);
        assert_eq!(doc.attribute(controls[0], "name"), Some("inner"));
    }

    #[test]
    fn test_node_count_and_is_empty() {
        let mut doc = HtmlDocument::new();
        assert!(doc.is_empty());
        assert_eq!(doc.node_count(), 1);

        let div = doc.create_element("div");
        assert!(doc.is_empty());
        doc.append_child(doc.root(), div).unwrap();
        assert!(!doc.is_empty());

        // 移除只断开关系，数组中的节点数不变
        doc.remove(div);
        assert!(doc.is_empty());
        assert_eq!(doc.node_count(), 2);
    }

    #[test]
    fn test_insert_before_and_move_children() {
        let mut doc = HtmlDocument::parse(r#"<div id="a"><span id="s"></span></div><div id="b"></div>"#);
        let a = doc.get_element_by_id("a").unwrap();
        let b = doc.get_element_by_id("b").unwrap();
        let s = doc.get_element_by_id("s").unwrap();

        doc.insert_text_before(s, "x");
        doc.insert_text_before(s, "y");
        assert_eq!(doc.children(a).len(), 2);
        assert_eq!(doc.text_content(a), "xy");

        doc.move_children(a, b);
        assert!(doc.children(a).is_empty());
        assert_eq!(doc.parent(s), Some(b));
        assert_eq!(doc.text_content(b), "xy");

        let detached = doc.create_element("p");
        doc.insert_before(detached, s);
        assert_eq!(doc.parent(s), Some(b));
    }
}
