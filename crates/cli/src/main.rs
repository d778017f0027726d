mod config;

use clap::Parser;
use html_adapter::HtmlExportRepository;
use replay_core::application::ReplayServiceImpl;
use replay_core::ports::{DocumentRepository, OutboundChannel};
use telegram_adapter::{FixedDelayPacer, TelegramBotChannel};
use tracing::error;

use crate::config::{Cli, ReplayConfig};

#[tokio::main]
async fn main() {
    init_logging();

    if let Err(e) = run(Cli::parse()).await {
        error!("{e:#}");
        std::process::exit(1);
    }
}

/// `RUST_LOG` overrides the default `info` level
fn init_logging() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = ReplayConfig::from_cli(cli)?;

    // Instantiate concrete implementations of secondary adapters
    let documents: Box<dyn DocumentRepository> =
        Box::new(HtmlExportRepository::new(config.export_dir.clone())?);

    let primary: Box<dyn OutboundChannel> = Box::new(TelegramBotChannel::new(
        "client 1",
        config.api_base.clone(),
        config.primary_token.clone(),
        config.chat.clone(),
    ));
    let secondary: Box<dyn OutboundChannel> = Box::new(TelegramBotChannel::new(
        "client 2",
        config.api_base.clone(),
        config.secondary_token.clone(),
        config.chat.clone(),
    ));

    let mut service = ReplayServiceImpl::new(
        documents,
        primary,
        secondary,
        Box::new(FixedDelayPacer::new(config.delay)),
        config.overrides.clone(),
    );

    service.execute_replay().await?;
    Ok(())
}
