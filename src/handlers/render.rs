//! Renders flow replies as Telegram messages

use async_trait::async_trait;
use teloxide::{ApiError, RequestError};
use teloxide::prelude::*;
use teloxide::types::{ChatId, InlineKeyboardButton, InlineKeyboardMarkup, MessageId};
use tracing::{debug, warn};
use crate::flow::{Button, Outbound, Reply, ReplyMode};
use crate::utils::errors::Result;

/// Sends replies to one chat, editing the button's message when asked to
#[derive(Debug, Clone)]
pub struct TelegramOutbound {
    bot: Bot,
    chat_id: ChatId,
    editable: Option<MessageId>,
}

impl TelegramOutbound {
    pub fn for_message(bot: Bot, chat_id: ChatId) -> Self {
        Self {
            bot,
            chat_id,
            editable: None,
        }
    }

    pub fn for_callback(bot: Bot, chat_id: ChatId, message_id: Option<MessageId>) -> Self {
        Self {
            bot,
            chat_id,
            editable: message_id,
        }
    }

    async fn send(&self, text: String, markup: Option<InlineKeyboardMarkup>) -> Result<()> {
        let mut request = self.bot.send_message(self.chat_id, text);
        if let Some(markup) = markup {
            request = request.reply_markup(markup);
        }
        request.await?;
        Ok(())
    }
}

/// Inline keyboard for the reply's button rows, `None` when there are no buttons
pub fn keyboard(rows: &[Vec<Button>]) -> Result<Option<InlineKeyboardMarkup>> {
    if rows.iter().all(Vec::is_empty) {
        return Ok(None);
    }

    let rows = rows.iter()
        .map(|row| row.iter().map(|button| match button {
            Button::Callback { label, data } => Ok(InlineKeyboardButton::callback(label.clone(), data.clone())),
            Button::Url { label, url } => Ok(InlineKeyboardButton::url(label.clone(), url::Url::parse(url)?)),
        }).collect::<Result<Vec<_>>>())
        .collect::<Result<Vec<_>>>()?;

    Ok(Some(InlineKeyboardMarkup::new(rows)))
}

#[async_trait]
impl Outbound for TelegramOutbound {
    async fn deliver(&self, reply: Reply) -> Result<()> {
        let markup = keyboard(&reply.buttons)?;

        let message_id = match (reply.mode, self.editable) {
            (ReplyMode::EditLast, Some(message_id)) => message_id,
            _ => return self.send(reply.text, markup).await,
        };

        let mut request = self.bot.edit_message_text(self.chat_id, message_id, reply.text.clone());
        if let Some(markup) = markup.clone() {
            request = request.reply_markup(markup);
        }

        match request.await {
            Ok(_) => Ok(()),
            Err(RequestError::Api(ApiError::MessageNotModified)) => {
                debug!(chat_id = %self.chat_id, "Message already shows this prompt");
                Ok(())
            }
            Err(e) => {
                warn!(chat_id = %self.chat_id, error = %e, "Failed to edit message, sending a new one");
                self.send(reply.text, markup).await
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flow::ButtonAction;
    use crate::models::ProductType;

    #[test]
    fn test_empty_keyboard() {
        assert!(keyboard(&[]).unwrap().is_none());
        assert!(keyboard(&[vec![]]).unwrap().is_none());
    }

    #[test]
    fn test_keyboard_rows() {
        let rows = vec![
            vec![Button::action("Group", ButtonAction::Product(ProductType::Group))],
            vec![Button::url("Support", "https://t.me/support")],
        ];
        let markup = keyboard(&rows).unwrap().unwrap();
        assert_eq!(markup.inline_keyboard.len(), 2);
        assert_eq!(markup.inline_keyboard[0][0].text, "Group");
    }

    #[test]
    fn test_invalid_url_is_an_error() {
        let rows = vec![vec![Button::url("Broken", "not a url")]];
        assert!(keyboard(&rows).is_err());
    }
}
