use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use hybrid_relay_gateway::chain::ResponderChain;
use hybrid_relay_gateway::telegram::start_telegram_bot;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // .env may carry RUST_LOG, so load it before the subscriber
    hybrid_relay_core::load_dotenv();

    // Initialize tracing
    let env_filter =
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration; a missing TELEGRAM_TOKEN stops here
    let config = match hybrid_relay_core::Config::load() {
        Ok(config) => config,
        Err(e) => {
            error!("Configuration error: {e}");
            return Err(e.into());
        }
    };

    let chain = Arc::new(ResponderChain::from_config(&config));
    let enabled = chain.enabled_providers();
    if enabled.is_empty() {
        info!("No provider API key configured; every message will be echoed");
    } else {
        info!("Provider chain: {} -> echo", enabled.join(" -> "));
    }

    let bot = Arc::new(start_telegram_bot(&config, chain).await?);

    info!("Starting bot... (Ctrl+C to stop)");
    bot.run().await;
    info!("Bot stopped");

    Ok(())
}
