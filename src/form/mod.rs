//! 表单模块：主表单检测、快照与报告
pub mod inspector;
pub mod report;
pub mod snapshot;

// 导出核心接口
pub use self::inspector::FormInspector;
pub use self::report::{CapabilityFlags, FieldSummary, FormSummary, SnapshotReport};
pub use self::snapshot::FormSnapshot;

/// 测试日志，RUST_LOG=debug 时输出检测过程
#[cfg(test)]
pub(crate) fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
