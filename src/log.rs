//! 日志宏
//! 启用 logging 特性时转发到 tracing，关闭时只检查格式参数，不产生输出

#[cfg(feature = "logging")]
macro_rules! trace {
    ($($arg:tt)*) => { ::tracing::trace!($($arg)*) };
}

#[cfg(feature = "logging")]
macro_rules! debug {
    ($($arg:tt)*) => { ::tracing::debug!($($arg)*) };
}

#[cfg(feature = "logging")]
macro_rules! warn_ {
    ($($arg:tt)*) => { ::tracing::warn!($($arg)*) };
}

#[cfg(not(feature = "logging"))]
macro_rules! trace {
    ($($arg:tt)*) => {{ let _ = format_args!($($arg)*); }};
}

#[cfg(not(feature = "logging"))]
macro_rules! debug {
    ($($arg:tt)*) => {{ let _ = format_args!($($arg)*); }};
}

#[cfg(not(feature = "logging"))]
macro_rules! warn_ {
    ($($arg:tt)*) => {{ let _ = format_args!($($arg)*); }};
}

pub(crate) use {debug, trace};
pub(crate) use warn_ as warn;
