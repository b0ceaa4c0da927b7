use std::sync::Arc;

use anyhow::Result;
use sqlx::postgres::PgPoolOptions;
use teloxide::prelude::*;
use tracing::info;
use tracing_subscriber::EnvFilter;

use worldfood::bot;
use worldfood::config::BotConfig;
use worldfood::generation::GenerationClient;
use worldfood::session::{self, PgSessionStore, SessionStore};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("Starting WorldFood Telegram Bot");

    // Missing required variables are fatal before the dispatcher starts
    let config = BotConfig::from_env()?;

    info!("Connecting to session store");
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await?;
    session::init_schema(&pool).await?;

    let store: Arc<dyn SessionStore> = Arc::new(PgSessionStore::new(pool));
    let client = Arc::new(GenerationClient::new(&config));

    // Initialize the bot
    let bot = Bot::new(config.bot_token.clone());

    info!("Bot initialized, starting dispatcher");

    // Set up the dispatcher with shared session store and generation client
    let handler = dptree::entry()
        .branch(Update::filter_message().endpoint({
            let store = Arc::clone(&store);
            let client = Arc::clone(&client);
            move |bot: Bot, msg: Message| {
                let store = Arc::clone(&store);
                let client = Arc::clone(&client);
                async move { bot::message_handler(bot, msg, store, client).await }
            }
        }))
        .branch(Update::filter_callback_query().endpoint({
            let store = Arc::clone(&store);
            let client = Arc::clone(&client);
            move |bot: Bot, q: teloxide::types::CallbackQuery| {
                let store = Arc::clone(&store);
                let client = Arc::clone(&client);
                async move { bot::callback_handler(bot, q, store, client).await }
            }
        }));

    Dispatcher::builder(bot, handler)
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    Ok(())
}
