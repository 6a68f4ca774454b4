//! DOM模块：文档查询抽象、可变文档树与选择器
pub mod document;
pub mod html_document;
pub mod selector;

pub use self::document::Document;
pub use self::html_document::{ElementData, HtmlDocument, NodeId, NodeKind};
pub use self::selector::Selector;
