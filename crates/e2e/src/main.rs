//! Suite runner entry point
//!
//! Run with: cargo run --package webelements-e2e -- --driver sandbox

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, ValueEnum};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use webelements_e2e::config::{BrowserKind, SuiteConfig};
use webelements_e2e::driver::DriverLauncher;
use webelements_e2e::playwright::{PlaywrightConfig, PlaywrightLauncher};
use webelements_e2e::runner::{RunnerConfig, ScenarioFilter, TestRunner};
use webelements_e2e::sandbox::{SandboxLauncher, SandboxOptions};
use webelements_e2e::server::{AppServerConfig, AppServerHandle};
use webelements_e2e::suite::{web_elements_suite, SUITE_NAME};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum DriverKind {
    /// Real browser through the Playwright bridge
    Playwright,
    /// In-memory model of the application
    Sandbox,
}

#[derive(Parser, Debug)]
#[command(name = "webelements-e2e")]
#[command(author, version, about = "E2E suite for the ngx-admin web elements")]
struct Args {
    /// YAML configuration file
    #[arg(short, long, env = "WEBELEMENTS_CONFIG")]
    config: Option<PathBuf>,

    /// Base URL of the running application
    #[arg(long, env = "WEBELEMENTS_BASE_URL")]
    base_url: Option<String>,

    /// Browser backend
    #[arg(long, value_enum, default_value = "playwright", env = "WEBELEMENTS_DRIVER")]
    driver: DriverKind,

    /// Browser to use (chromium, firefox, webkit)
    #[arg(long, env = "WEBELEMENTS_BROWSER")]
    browser: Option<BrowserKind>,

    /// Show the browser window
    #[arg(long)]
    headed: bool,

    /// Run only scenarios whose name contains this text
    #[arg(short, long)]
    name: Option<String>,

    /// Run only scenarios of this context, e.g. "Toastr page"
    #[arg(long)]
    context: Option<String>,

    /// Output directory for results
    #[arg(short, long, env = "WEBELEMENTS_OUTPUT")]
    output: Option<PathBuf>,

    /// Start the application with the configured command before running
    #[arg(long)]
    start_app: bool,

    /// List the scenarios and exit
    #[arg(long)]
    list: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let args = Args::parse();

    // Initialize logging
    let log_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level)),
        )
        .with_target(false)
        .init();

    if args.list {
        for scenario in web_elements_suite() {
            println!("{}", scenario.title());
        }
        std::process::exit(0);
    }

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Error: failed to create tokio runtime: {}", e);
            std::process::exit(2);
        }
    };

    match rt.block_on(async_main(args)) {
        Ok(true) => std::process::exit(0),
        Ok(false) => std::process::exit(1),
        Err(e) => {
            error!("{:#}", e);
            eprintln!("Error: {:#}", e);
            std::process::exit(2);
        }
    }
}

fn load_config(args: &Args) -> anyhow::Result<SuiteConfig> {
    let mut config = match &args.config {
        Some(path) => SuiteConfig::from_file(path)?,
        None => SuiteConfig::default(),
    };
    if let Some(url) = &args.base_url {
        config.base_url = url.clone();
    }
    if let Some(browser) = args.browser {
        config.browser = browser;
    }
    if args.headed {
        config.headless = false;
    }
    if let Some(output) = &args.output {
        config.output_dir = output.clone();
    }
    if args.start_app && config.app.is_none() {
        config.app = Some(AppServerConfig::default());
    }
    config.validate()?;
    Ok(config)
}

async fn async_main(args: Args) -> anyhow::Result<bool> {
    let config = load_config(&args)?;

    // The application must be up before the first browser opens
    let _app = match (&config.app, args.start_app, args.driver) {
        (Some(app), true, DriverKind::Playwright) => {
            Some(AppServerHandle::spawn(app, &config.base_url).await?)
        }
        _ => None,
    };

    let launcher: Arc<dyn DriverLauncher> = match args.driver {
        DriverKind::Playwright => {
            Arc::new(PlaywrightLauncher::new(PlaywrightConfig::from_suite(&config))?)
        }
        DriverKind::Sandbox => Arc::new(SandboxLauncher::new(SandboxOptions::default())),
    };

    let mut runner_config = RunnerConfig::from_suite(&config);
    runner_config.filter = ScenarioFilter {
        name: args.name.clone(),
        context: args.context.clone(),
    };
    let runner = TestRunner::new(launcher, runner_config);

    let results = runner.run_suite(SUITE_NAME, &web_elements_suite()).await;
    let path = runner.write_results(&results)?;
    info!("Report: {}", path.display());

    Ok(results.failed == 0)
}
