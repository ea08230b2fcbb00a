use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

use pr_reviewer_lib::config::Config;

#[tokio::main]
async fn main() {
    let config = Config::parse();

    let filter = EnvFilter::try_new(config.log_filter()).unwrap_or_else(|e| {
        eprintln!("invalid log filter {:?}: {}", config.log_filter(), e);
        EnvFilter::new("info")
    });
    fmt().with_env_filter(filter).with_target(true).init();

    log::info!(
        "[app] Starting pr-reviewer v{} env={:?}",
        env!("CARGO_PKG_VERSION"),
        config.environment
    );

    if let Err(e) = pr_reviewer_lib::run(config).await {
        log::error!("[app] {}", e);
        std::process::exit(1);
    }
}
