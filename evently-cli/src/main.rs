use clap::Parser;
use evently_cli::cli::Cli;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "evently_cli=info,evently_qr=info,evently_client=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = evently_store::Config::load()?;
    tracing::debug!(base_url = %config.api.base_url, "Configuration loaded");

    evently_cli::commands::run(cli, config).await
}
