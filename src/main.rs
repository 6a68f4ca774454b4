//! rsformutil 命令行入口

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use rsformutil::{
    ConfigManager, ConsentFlow, FormInspector, GlobalConfig, HtmlDocument, PageContext, PageLocation,
    SnapshotReport,
};

#[derive(Debug, Parser)]
#[command(name = "rsformutil", version, about = "检测页面主表单、待校验控件与支付能力")]
struct Cli {
    /// 输出调试日志（-v debug，-vv trace）
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// 检测HTML文件并输出JSON报告
    Inspect {
        /// HTML文件路径
        #[arg(long)]
        html: PathBuf,
        /// 页面地址（用于读取推广参数）
        #[arg(long)]
        url: Option<String>,
        /// JSON配置文件
        #[arg(long)]
        config: Option<PathBuf>,
        /// 格式化输出
        #[arg(long)]
        pretty: bool,
    },
    /// 根据Cookie头输出同意管理流程
    Consent {
        /// Cookie头，如 "GU_country=US; other=1"
        #[arg(long, default_value = "")]
        cookie: String,
        /// JSON配置文件（读取国家Cookie名）
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn load_config(path: Option<&PathBuf>, verbose: bool) -> anyhow::Result<GlobalConfig> {
    let config = match path {
        Some(path) => GlobalConfig::from_json_file(path)
            .with_context(|| format!("读取配置失败：{}", path.display()))?,
        None => ConfigManager::get_default(),
    };
    Ok(GlobalConfig {
        verbose: config.verbose || verbose,
        ..config
    })
}

fn consent_flow(cookie: String, config: &GlobalConfig) -> ConsentFlow {
    PageContext::with_config(PageLocation::blank(), cookie, config).consent_flow()
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Inspect { html, url, config, pretty } => {
            let config = load_config(config.as_ref(), cli.verbose > 0)?;
            let inspector = FormInspector::new(config)?;

            let source = std::fs::read_to_string(&html)
                .with_context(|| format!("读取HTML失败：{}", html.display()))?;
            let location = match url.as_deref() {
                Some(url) => PageLocation::parse(url)?,
                None => PageLocation::blank(),
            };

            let doc = HtmlDocument::parse(&source);
            match inspector.build(&doc, &location) {
                Some(snapshot) => {
                    let report = SnapshotReport::from_snapshot(&doc, &snapshot, &inspector);
                    println!("{}", report.to_json(pretty)?);
                }
                None => {
                    eprintln!("页面没有主表单（{}），无需校验", inspector.config().form_selector);
                    println!("null");
                }
            }
        }
        Commands::Consent { cookie, config } => {
            let config = load_config(config.as_ref(), cli.verbose > 0)?;
            let flow = consent_flow(cookie, &config);
            println!("{}", serde_json::to_string(&flow)?);
        }
    }

    Ok(())
}
