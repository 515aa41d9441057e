use std::path::PathBuf;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use borrow_ledger::config::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config_path = std::env::args().nth(1).map(PathBuf::from);
    let config = AppConfig::load(config_path.as_deref())?;

    // stdoutはMCPプロトコル専用なのでログはstderrへ
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("borrow_ledger={}", config.logging.level).into());
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    tracing::info!("Starting borrow-ledger v{}", env!("CARGO_PKG_VERSION"));

    borrow_ledger::interface::mcp::run(config).await
}
