//! Message handlers module
//!
//! Text and photo messages in private chats become flow events. A screenshot sent
//! as an image file is treated like a photo.

use std::sync::Arc;
use teloxide::{Bot, types::Message};
use tracing::debug;
use crate::flow::{ConversationController, InboundEvent, Incoming, PhotoRef};
use crate::handlers::render::TelegramOutbound;
use crate::utils::errors::Result;

/// Translate a message into a flow event, if it carries anything the flow understands
pub fn inbound_event(msg: &Message) -> Option<InboundEvent> {
    if let Some(photos) = msg.photo() {
        let largest = photos.iter().max_by_key(|p| u64::from(p.width) * u64::from(p.height))?;
        return Some(InboundEvent::Photo(PhotoRef {
            file_id: largest.file.id.clone(),
            width: largest.width,
            height: largest.height,
            file_size: largest.file.size,
        }));
    }

    if let Some(document) = msg.document() {
        let is_image = document.mime_type.as_ref()
            .is_some_and(|mime| mime.essence_str().starts_with("image/"));
        if is_image {
            return Some(InboundEvent::Photo(PhotoRef {
                file_id: document.file.id.clone(),
                width: 0,
                height: 0,
                file_size: document.file.size,
            }));
        }
    }

    msg.text().map(|text| InboundEvent::Text(text.to_string()))
}

/// Handle incoming non-command messages
pub async fn handle_message(
    bot: Bot,
    msg: Message,
    controller: Arc<ConversationController>,
) -> Result<()> {
    if !msg.chat.id.is_user() {
        return Ok(());
    }

    let Some(user) = msg.from.as_ref() else {
        return Ok(());
    };

    let Some(event) = inbound_event(&msg) else {
        debug!(user_id = user.id.0, "Ignoring unsupported message kind");
        return Ok(());
    };

    let incoming = Incoming::new(user.id.0 as i64, event)
        .with_language(user.language_code.clone());
    let outbound = TelegramOutbound::for_message(bot, msg.chat.id);

    controller.handle(incoming, &outbound).await
}
