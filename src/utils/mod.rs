//! 工具模块：Cookie与查询参数读取
pub mod cookie;
pub mod query_string;

pub use self::cookie::{get_cookie, CookieReader};
pub use self::query_string::{get_query_parameter_by_name, PageLocation};
