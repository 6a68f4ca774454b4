//! CSS选择器子集
//! 支持：类型选择器、*、#id、.class、[attr]、[attr=value]、复合选择器、后代组合符、逗号分隔的选择器列表

use super::html_document::{ElementData, HtmlDocument, NodeId};
use crate::error::{FormResult, RsFormError};

#[derive(Debug, Clone, PartialEq, Eq)]
enum AttrMatch {
    Exists,
    Equals(String),
}

/// 复合选择器，如 `form.js-form[data-step]`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Compound {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
    attrs: Vec<(String, AttrMatch)>,
}

impl Compound {
    fn matches(&self, element: &ElementData) -> bool {
        if let Some(tag) = &self.tag {
            if !element.is(tag) {
                return false;
            }
        }
        if let Some(id) = &self.id {
            if element.attr("id") != Some(id.as_str()) {
                return false;
            }
        }
        if !self.classes.iter().all(|c| element.has_class(c)) {
            return false;
        }
        self.attrs.iter().all(|(name, rule)| match (rule, element.attr(name)) {
            (_, None) => false,
            (AttrMatch::Exists, Some(_)) => true,
            (AttrMatch::Equals(expected), Some(actual)) => expected == actual,
        })
    }
}

/// 已解析的选择器
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    source: String,
    // 每一项是由后代组合符连接的复合选择器序列（从左到右）
    alternatives: Vec<Vec<Compound>>,
}

impl Selector {
    pub fn parse(source: &str) -> FormResult<Self> {
        let mut parser = Parser::new(source);
        let mut alternatives = Vec::new();

        loop {
            alternatives.push(parser.parse_complex()?);
            parser.skip_whitespace();
            match parser.peek() {
                None => break,
                Some(',') => parser.bump(),
                Some(c) => return Err(parser.error(format!("意外的字符 '{}'", c))),
            }
        }

        Ok(Self {
            source: source.to_string(),
            alternatives,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// 判断节点是否匹配，非元素节点总是不匹配
    pub fn matches(&self, doc: &HtmlDocument, node: NodeId) -> bool {
        self.alternatives
            .iter()
            .any(|complex| Self::matches_complex(complex, doc, node))
    }

    fn matches_complex(complex: &[Compound], doc: &HtmlDocument, node: NodeId) -> bool {
        let Some((last, rest)) = complex.split_last() else {
            return false;
        };
        let Some(element) = doc.element(node) else {
            return false;
        };
        if !last.matches(element) {
            return false;
        }

        // 只有后代组合符时，逐级取最近的匹配祖先即可
        let mut ancestors = doc.ancestors(node);
        for compound in rest.iter().rev() {
            let found = ancestors
                .by_ref()
                .any(|a| doc.element(a).map(|e| compound.matches(e)).unwrap_or(false));
            if !found {
                return false;
            }
        }
        true
    }
}

struct Parser<'a> {
    source: &'a str,
    chars: Vec<char>,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            source,
            chars: source.chars().collect(),
            pos: 0,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn bump(&mut self) {
        self.pos += 1;
    }

    fn error(&self, reason: impl Into<String>) -> RsFormError {
        RsFormError::selector(self.source, reason)
    }

    fn skip_whitespace(&mut self) -> bool {
        let start = self.pos;
        while self.peek().map(char::is_whitespace).unwrap_or(false) {
            self.bump();
        }
        self.pos > start
    }

    fn parse_complex(&mut self) -> FormResult<Vec<Compound>> {
        let mut compounds = Vec::new();
        self.skip_whitespace();

        while let Some(c) = self.peek() {
            if c == ',' {
                break;
            }
            if matches!(c, '>' | '+' | '~') {
                return Err(self.error(format!("不支持的组合符 '{}'", c)));
            }
            compounds.push(self.parse_compound()?);
            self.skip_whitespace();
        }

        if compounds.is_empty() {
            return Err(self.error("空选择器"));
        }
        Ok(compounds)
    }

    fn parse_compound(&mut self) -> FormResult<Compound> {
        let mut compound = Compound::default();
        let mut consumed = false;

        match self.peek() {
            Some('*') => {
                self.bump();
                consumed = true;
            }
            Some(c) if is_ident_char(c) => {
                compound.tag = Some(self.parse_ident()?.to_ascii_lowercase());
                consumed = true;
            }
            _ => {}
        }

        loop {
            match self.peek() {
                Some('#') => {
                    self.bump();
                    compound.id = Some(self.parse_ident()?);
                }
                Some('.') => {
                    self.bump();
                    compound.classes.push(self.parse_ident()?);
                }
                Some('[') => {
                    self.bump();
                    compound.attrs.push(self.parse_attribute()?);
                }
                _ => break,
            }
            consumed = true;
        }

        if !consumed {
            let found = self.peek().map(|c| c.to_string()).unwrap_or_default();
            return Err(self.error(format!("意外的字符 '{}'", found)));
        }
        Ok(compound)
    }

    fn parse_ident(&mut self) -> FormResult<String> {
        let start = self.pos;
        while self.peek().map(is_ident_char).unwrap_or(false) {
            self.bump();
        }
        if self.pos == start {
            return Err(self.error("缺少标识符"));
        }
        Ok(self.chars[start..self.pos].iter().collect())
    }

    fn parse_attribute(&mut self) -> FormResult<(String, AttrMatch)> {
        self.skip_whitespace();
        let name = self.parse_ident()?.to_ascii_lowercase();
        self.skip_whitespace();

        let rule = match self.peek() {
            Some(']') => AttrMatch::Exists,
            Some('=') => {
                self.bump();
                self.skip_whitespace();
                let value = match self.peek() {
                    Some(quote @ ('"' | '\'')) => self.parse_quoted(quote)?,
                    _ => self.parse_ident()?,
                };
                self.skip_whitespace();
                AttrMatch::Equals(value)
            }
            Some(c) => return Err(self.error(format!("不支持的属性运算符 '{}'", c))),
            None => return Err(self.error("属性选择器未闭合")),
        };

        if self.peek() != Some(']') {
            return Err(self.error("属性选择器未闭合"));
        }
        self.bump();
        Ok((name, rule))
    }

    fn parse_quoted(&mut self, quote: char) -> FormResult<String> {
        self.bump();
        let start = self.pos;
        while let Some(c) = self.peek() {
            if c == quote {
                let value = self.chars[start..self.pos].iter().collect();
                self.bump();
                return Ok(value);
            }
            self.bump();
        }
        Err(self.error("引号未闭合"))
    }
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_' || !c.is_ascii()
}
