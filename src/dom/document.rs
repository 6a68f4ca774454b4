//! 文档查询抽象
//! 表单检测只依赖这里的查询能力，测试中可以替换为任意伪造的DOM

use std::fmt::Debug;

/// DOM查询接口（对应浏览器中 querySelector / getElementById / form.elements 等能力）
pub trait Document {
    /// 节点句柄，必须可以廉价复制并比较
    type Node: Copy + Eq + Debug;

    /// 返回文档顺序中第一个匹配选择器的元素；选择器无效或无匹配时返回 None
    fn query_selector(&self, selector: &str) -> Option<Self::Node>;

    /// 按id查找元素
    fn get_element_by_id(&self, id: &str) -> Option<Self::Node>;

    /// 元素标签名（保持原始大小写），非元素节点返回 None
    fn node_name(&self, node: Self::Node) -> Option<&str>;

    /// 读取属性值
    fn get_attribute(&self, node: Self::Node, name: &str) -> Option<&str>;

    fn has_attribute(&self, node: Self::Node, name: &str) -> bool {
        self.get_attribute(node, name).is_some()
    }

    /// 表单控件集合，文档顺序
    fn form_elements(&self, form: Self::Node) -> Vec<Self::Node>;
}
