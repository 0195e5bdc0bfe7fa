mod config;
mod error;
mod homework;
mod platform;
mod poller;
mod practicum;
mod verdicts;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::{Config, Credentials};
use crate::platform::telegram::TelegramTransport;
use crate::platform::Notifier;
use crate::poller::Poller;
use crate::practicum::PracticumClient;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,homework_bot=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting homework bot");

    let credentials = match Credentials::from_env() {
        Ok(credentials) => credentials,
        Err(e) => {
            error!("CRITICAL: {}; the bot is stopped", e);
            eprintln!(
                "{}. Check that PRACTICUM_TOKEN, TELEGRAM_TOKEN and TELEGRAM_CHAT_ID are set",
                e
            );
            std::process::exit(1);
        }
    };

    let (config, config_path) = Config::resolve(std::env::args().nth(1).map(PathBuf::from))?;
    match &config_path {
        Some(path) => info!("Configuration loaded from: {}", path.display()),
        None => info!("No config file found, using defaults"),
    }
    info!("  Endpoint: {}", config.practicum.endpoint);
    info!("  Request timeout: {}s", config.practicum.request_timeout_secs);
    info!("  Retry period: {}s", config.polling.retry_period_secs);

    let api = PracticumClient::new(&config.practicum, credentials.practicum_token)?;
    let transport = Arc::new(TelegramTransport::new(&credentials.telegram_token));
    let notifier = Notifier::new(transport, credentials.telegram_chat_id);

    let poller = Poller::new(
        api,
        notifier,
        config.retry_period(),
        chrono::Utc::now().timestamp(),
    );
    poller.run().await;

    Ok(())
}
