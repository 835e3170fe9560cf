//! Callback query handlers module
//!
//! Inline button presses are answered immediately and forwarded to the controller.

use std::sync::Arc;
use teloxide::{Bot, types::{CallbackQuery, ChatId}, prelude::*};
use tracing::{debug, warn};
use crate::flow::{ConversationController, InboundEvent, Incoming};
use crate::handlers::render::TelegramOutbound;
use crate::utils::errors::Result;

pub async fn handle_callback_query(
    bot: Bot,
    query: CallbackQuery,
    controller: Arc<ConversationController>,
) -> Result<()> {
    let user_id = query.from.id.0 as i64;

    if let Err(e) = bot.answer_callback_query(query.id.clone()).await {
        warn!(error = %e, user_id = user_id, "Failed to answer callback query");
    }

    let Some(data) = query.data.clone() else {
        debug!(user_id = user_id, "Callback query without data");
        return Ok(());
    };

    let chat_id = query.message.as_ref()
        .map(|m| m.chat().id)
        .unwrap_or(ChatId(user_id));
    let message_id = query.message.as_ref()
        .and_then(|m| m.regular_message())
        .map(|m| m.id);

    debug!(user_id = user_id, callback_data = %data, "Processing callback query");

    let incoming = Incoming::new(user_id, InboundEvent::ButtonPress(data))
        .with_language(query.from.language_code.clone());
    let outbound = TelegramOutbound::for_callback(bot, chat_id, message_id);

    controller.handle(incoming, &outbound).await
}
