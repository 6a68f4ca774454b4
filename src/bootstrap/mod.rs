//! 启动模块：页面功能模块的初始化顺序与同意管理流程选择
pub mod consent;
pub mod lifecycle;

pub use self::consent::{ConsentFlow, PageContext};
pub use self::lifecycle::{BootReport, Bootstrap, FnModule, InitPhase, PageModule};
