//! 全局错误类型定义
//! 仅构造阶段（配置、选择器、正则、URL）会返回错误，检测本身不抛错

use thiserror::Error;
use regex::Error as RegexError;
use serde_json::Error as SerdeJsonError;
use std::io::Error as IoError;
use url::ParseError as UrlParseError;

#[derive(Error, Debug)]
pub enum RsFormError {
    // 选择器相关错误
    #[error("选择器解析失败：{selector}，原因：{reason}")]
    InvalidSelector { selector: String, reason: String },

    // 配置相关错误
    #[error("正则编译失败：{0}")]
    RegexCompileError(#[from] RegexError),
    #[error("配置无效：{0}")]
    ConfigError(String),

    // 页面生命周期错误
    #[error("模块初始化失败：{module}，原因：{reason}")]
    ModuleInitError { module: String, reason: String },

    // 序列化/反序列化错误
    #[error("JSON解析失败：{0}")]
    JsonError(#[from] SerdeJsonError),

    // 基础错误
    #[error("IO操作失败：{0}")]
    IoError(#[from] IoError),
    #[error("URL解析失败：{0}")]
    UrlError(#[from] UrlParseError),
    #[error("无效输入：{0}")]
    InvalidInput(String),
}

impl RsFormError {
    pub(crate) fn selector(selector: &str, reason: impl Into<String>) -> Self {
        Self::InvalidSelector {
            selector: selector.to_string(),
            reason: reason.into(),
        }
    }
}

// 全局Result类型
pub type FormResult<T> = Result<T, RsFormError>;
