async fn real_main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    tracing::debug!("parsing config...");
    // An optional first argument names a TOML config file; otherwise the
    // configuration comes from the environment (or a .env file).
    let config = match std::env::args().nth(1) {
        Some(path) => urandom_bot::BotConfig::from_config(Some(path))?,
        None => urandom_bot::BotConfig::from_env()?,
    };

    tracing::debug!("creating client...");
    urandom_bot::run(config).await
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // just one trick to get rust-analyzer working in main :-)
    real_main().await
}
