//! Command handlers module
//!
//! Bot commands are thin wrappers that forward to the conversation controller.

use std::sync::Arc;
use teloxide::{Bot, types::Message, utils::command::BotCommands};
use tracing::debug;
use crate::flow::{ConversationController, InboundEvent, Incoming};
use crate::handlers::render::TelegramOutbound;
use crate::utils::errors::{BotError, Result};

#[derive(BotCommands, Clone, Debug, PartialEq, Eq)]
#[command(rename_rule = "lowercase", description = "Subscription bot commands")]
pub enum Command {
    #[command(description = "Start a new subscription request")]
    Start,
    #[command(description = "Show help information")]
    Help,
    #[command(description = "Contact support")]
    Support,
    #[command(description = "Status of your latest request")]
    Status,
}

impl Command {
    pub fn event(&self) -> InboundEvent {
        match self {
            Command::Start => InboundEvent::Start,
            Command::Help => InboundEvent::Help,
            Command::Support => InboundEvent::Support,
            Command::Status => InboundEvent::Status,
        }
    }
}

/// Handle a bot command in a private chat
pub async fn handle_command(
    bot: Bot,
    msg: Message,
    cmd: Command,
    controller: Arc<ConversationController>,
) -> Result<()> {
    let user = msg.from.as_ref().ok_or_else(|| {
        BotError::InvalidInput("No user in message".to_string())
    })?;

    if !msg.chat.id.is_user() {
        debug!(chat_id = ?msg.chat.id, command = ?cmd, "Ignoring command outside private chat");
        return Ok(());
    }

    let incoming = Incoming::new(user.id.0 as i64, cmd.event())
        .with_language(user.language_code.clone());
    let outbound = TelegramOutbound::for_message(bot, msg.chat.id);

    controller.handle(incoming, &outbound).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands() {
        assert_eq!(Command::parse("/start", "subbot").unwrap(), Command::Start);
        assert_eq!(Command::parse("/support", "subbot").unwrap(), Command::Support);
        assert!(Command::parse("/admin", "subbot").is_err());
    }

    #[test]
    fn test_command_events() {
        assert_eq!(Command::Help.event(), InboundEvent::Help);
        assert_eq!(Command::Status.event(), InboundEvent::Status);
    }
}
