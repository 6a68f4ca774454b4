//! 页面启动流程
//! 每个页面功能模块暴露一个 `init` 入口，启动时按固定阶段顺序各调用一次，
//! 同意管理模块最先初始化，并按国家Cookie只启用其中一个流程

use std::fmt;

use crate::log::{debug, warn};

use super::consent::{ConsentFlow, PageContext};
use crate::error::FormResult;

/// 页面功能模块
pub trait PageModule {
    fn name(&self) -> &str;

    fn init(&mut self, ctx: &PageContext) -> FormResult<()>;
}

/// 初始化阶段，按声明顺序执行
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum InitPhase {
    /// ajax、错误上报、统计初始化
    Platform,
    /// 页面框架与导航
    Global,
    Events,
    Filtering,
    Forms,
    Metrics,
    Landing,
    Patterns,
    Misc,
}

/// 用闭包实现的模块
pub struct FnModule<F> {
    name: String,
    init: F,
}

impl<F> FnModule<F>
where
    F: FnMut(&PageContext) -> FormResult<()>,
{
    pub fn new(name: impl Into<String>, init: F) -> Self {
        Self {
            name: name.into(),
            init,
        }
    }
}

impl<F> PageModule for FnModule<F>
where
    F: FnMut(&PageContext) -> FormResult<()>,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn init(&mut self, ctx: &PageContext) -> FormResult<()> {
        (self.init)(ctx)
    }
}

struct Registered {
    phase: InitPhase,
    module: Box<dyn PageModule>,
}

/// 启动结果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BootReport {
    pub consent_flow: Option<ConsentFlow>,
    pub initialized: Vec<String>,
    pub failed: Vec<(String, String)>,
}

impl BootReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// 模块注册表
#[derive(Default)]
pub struct Bootstrap {
    modules: Vec<Registered>,
    consent: Vec<(ConsentFlow, Box<dyn PageModule>)>,
    started: bool,
}

impl fmt::Debug for Bootstrap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bootstrap")
            .field("modules", &self.modules.iter().map(|r| (r.phase, r.module.name())).collect::<Vec<_>>())
            .field("consent", &self.consent.iter().map(|(flow, m)| (*flow, m.name())).collect::<Vec<_>>())
            .field("started", &self.started)
            .finish()
    }
}

impl Bootstrap {
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册模块，同一阶段内按注册顺序执行
    pub fn register(&mut self, phase: InitPhase, module: impl PageModule + 'static) -> &mut Self {
        self.modules.push(Registered {
            phase,
            module: Box::new(module),
        });
        self
    }

    /// 注册同意管理模块，只有与当前国家匹配的流程会被初始化
    pub fn register_consent(&mut self, flow: ConsentFlow, module: impl PageModule + 'static) -> &mut Self {
        self.consent.push((flow, Box::new(module)));
        self
    }

    pub fn len(&self) -> usize {
        self.modules.len() + self.consent.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 执行启动流程；单个模块失败只记录，不影响后续模块。重复调用不会再次初始化
    pub fn run(&mut self, ctx: &PageContext) -> BootReport {
        let mut report = BootReport::default();
        if self.started {
            debug!("启动流程已执行过，忽略重复调用");
            return report;
        }
        self.started = true;

        let flow = ctx.consent_flow();
        report.consent_flow = Some(flow);
        debug!("同意管理流程：{:?}，国家：{:?}", flow, ctx.country());

        for (_, module) in self.consent.iter_mut().filter(|(f, _)| *f == flow) {
            Self::init_module(module.as_mut(), ctx, &mut report);
        }

        // 稳定排序，保证同一阶段内的注册顺序
        self.modules.sort_by_key(|r| r.phase);
        for registered in self.modules.iter_mut() {
            Self::init_module(registered.module.as_mut(), ctx, &mut report);
        }

        debug!(
            "启动完成，成功：{}，失败：{}",
            report.initialized.len(),
            report.failed.len()
        );
        report
    }

    fn init_module(module: &mut dyn PageModule, ctx: &PageContext, report: &mut BootReport) {
        let name = module.name().to_string();
        match module.init(ctx) {
            Ok(()) => {
                debug!("模块初始化完成：{}", name);
                report.initialized.push(name);
            }
            Err(e) => {
                warn!("模块初始化失败：{}，错误：{}", name, e);
                report.failed.push((name, e.to_string()));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::error::RsFormError;
    use crate::utils::PageLocation;

    type Log = Rc<RefCell<Vec<String>>>;

    struct Recorder {
        name: String,
        log: Log,
    }

    impl PageModule for Recorder {
        fn name(&self) -> &str {
            &self.name
        }

        fn init(&mut self, _ctx: &PageContext) -> FormResult<()> {
            self.log.borrow_mut().push(self.name.clone());
            Ok(())
        }
    }

    fn recorder(log: &Log, name: &str) -> Recorder {
        Recorder {
            name: name.to_string(),
            log: Rc::clone(log),
        }
    }

    fn site_bootstrap(log: &Log) -> Bootstrap {
        let mut boot = Bootstrap::new();
        boot.register(InitPhase::Metrics, recorder(log, "metrics"))
            .register(InitPhase::Forms, recorder(log, "form"))
            .register(InitPhase::Forms, recorder(log, "processSubmit"))
            .register(InitPhase::Global, recorder(log, "welcome"))
            .register(InitPhase::Global, recorder(log, "navigation"))
            .register(InitPhase::Platform, recorder(log, "analytics"))
            .register(InitPhase::Misc, recorder(log, "faq"))
            .register_consent(ConsentFlow::Ccpa, recorder(log, "cmp"))
            .register_consent(ConsentFlow::Banner, recorder(log, "consentBanner"));
        boot
    }

    #[test]
    fn test_phase_order_for_non_us_visitor() {
        let log: Log = Rc::default();
        let mut boot = site_bootstrap(&log);
        let ctx = PageContext::new(PageLocation::blank(), "GU_country=GB");

        let report = boot.run(&ctx);
        assert_eq!(
            *log.borrow(),
            vec!["consentBanner", "analytics", "welcome", "navigation", "form", "processSubmit", "metrics", "faq"]
        );
        assert_eq!(report.consent_flow, Some(ConsentFlow::Banner));
        assert_eq!(report.initialized.len(), 8);
        assert!(report.is_clean());
    }

    #[test]
    fn test_us_visitor_gets_ccpa() {
        let log: Log = Rc::default();
        let mut boot = site_bootstrap(&log);
        let ctx = PageContext::new(PageLocation::blank(), "GU_country=US");

        boot.run(&ctx);
        let log = log.borrow();
        assert_eq!(log.first().map(String::as_str), Some("cmp"));
        assert!(!log.iter().any(|m| m == "consentBanner"));
    }

    #[test]
    fn test_failure_does_not_stop_later_modules() {
        let log: Log = Rc::default();
        let mut boot = Bootstrap::new();
        boot.register(InitPhase::Global, recorder(&log, "slideshow"))
            .register(
                InitPhase::Global,
                FnModule::new("sticky", |_ctx: &PageContext| {
                    Err(RsFormError::ModuleInitError {
                        module: "sticky".into(),
                        reason: "no header".into(),
                    })
                }),
            )
            .register(InitPhase::Events, recorder(&log, "cta"));

        let report = boot.run(&PageContext::new(PageLocation::blank(), ""));
        assert_eq!(*log.borrow(), vec!["slideshow", "cta"]);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].0, "sticky");
        assert!(!report.is_clean());
    }

    #[test]
    fn test_second_run_is_noop() {
        let log: Log = Rc::default();
        let mut boot = site_bootstrap(&log);
        let ctx = PageContext::new(PageLocation::blank(), "");

        boot.run(&ctx);
        let count = log.borrow().len();
        let second = boot.run(&ctx);
        assert_eq!(log.borrow().len(), count);
        assert_eq!(second, BootReport::default());
        assert_eq!(boot.len(), 9);
    }

    #[test]
    fn test_modules_see_page_context() {
        let seen: Rc<RefCell<Option<String>>> = Rc::default();
        let captured = Rc::clone(&seen);
        let mut boot = Bootstrap::new();
        boot.register(
            InitPhase::Landing,
            FnModule::new("landingBundles", move |ctx: &PageContext| {
                *captured.borrow_mut() = ctx.location().query_parameter("INTCMP");
                Ok(())
            }),
        );

        let location = PageLocation::parse("/bundles?INTCMP=landing").unwrap();
        boot.run(&PageContext::new(location, ""));
        assert_eq!(seen.borrow().as_deref(), Some("landing"));
    }
}
