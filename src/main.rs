//! SubscriptionBot Telegram Bot
//!
//! Main application entry point

use std::sync::Arc;
use anyhow::Context;
use teloxide::{prelude::*, types::Update};
use teloxide::dispatching::UpdateHandler;
use teloxide::utils::command::BotCommands;
use tracing::{info, warn, error};

use SubscriptionBot::{
    config::Settings,
    utils::logging,
    services::ServiceFactory,
    flow::ConversationController,
    handlers::{Command, handle_command, handle_callback_query, handle_message},
};

type HandlerResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    // Load configuration
    let settings = Settings::new().context("failed to load configuration")?;
    settings.validate().context("invalid configuration")?;

    // Initialize logging; the guard flushes the log file on exit
    let _log_guard = logging::init_logging(&settings.logging)?;

    info!("Starting {}...", SubscriptionBot::info());

    let bot = Bot::new(&settings.bot.token);

    info!("Initializing services...");
    let mut services = ServiceFactory::new(bot.clone(), &settings).await?;

    if let Some(janitor) = services.janitor.as_mut() {
        janitor.start();
    }
    let promotion_expiry = services.promotion.spawn_expiry();

    let controller = Arc::new(services.controller(&settings));

    if let Err(e) = bot.set_my_commands(Command::bot_commands()).await {
        warn!(error = %e, "Failed to register bot commands");
    }

    let mut dispatcher = Dispatcher::builder(bot.clone(), create_handler())
        .dependencies(dptree::deps![controller])
        .default_handler(|upd| async move {
            warn!("Unhandled update: {:?}", upd);
        })
        .enable_ctrlc_handler()
        .build();

    info!("Starting bot with polling mode...");
    dispatcher.dispatch().await;

    if let Some(handle) = promotion_expiry {
        handle.abort();
    }
    if let Some(janitor) = services.janitor.as_mut() {
        janitor.stop();
    }

    info!("SubscriptionBot has been shut down.");

    Ok(())
}

/// Create the main update handler
fn create_handler() -> UpdateHandler<Box<dyn std::error::Error + Send + Sync + 'static>> {
    use teloxide::dispatching::UpdateFilterExt;

    dptree::entry()
        .branch(Update::filter_message()
            .branch(
                dptree::entry()
                    .filter_command::<Command>()
                    .endpoint(handle_commands)
            )
            .branch(dptree::endpoint(handle_messages))
        )
        .branch(
            Update::filter_callback_query()
                .endpoint(handle_callbacks)
        )
}

/// Handle bot commands
async fn handle_commands(
    bot: Bot,
    msg: Message,
    cmd: Command,
    controller: Arc<ConversationController>,
) -> HandlerResult {
    if let Err(e) = handle_command(bot, msg, cmd, controller).await {
        error!(error = %e, "Error handling command");
        return Err(e.into());
    }

    Ok(())
}

/// Handle regular messages
async fn handle_messages(
    bot: Bot,
    msg: Message,
    controller: Arc<ConversationController>,
) -> HandlerResult {
    if let Err(e) = handle_message(bot, msg, controller).await {
        error!(error = %e, "Error handling message");
        return Err(e.into());
    }

    Ok(())
}

/// Handle callback queries
async fn handle_callbacks(
    bot: Bot,
    query: teloxide::types::CallbackQuery,
    controller: Arc<ConversationController>,
) -> HandlerResult {
    let user_id = query.from.id.0 as i64;

    if let Err(e) = handle_callback_query(bot, query, controller).await {
        error!(user_id = user_id, error = %e, "Error handling callback query");
        return Err(e.into());
    }

    Ok(())
}
