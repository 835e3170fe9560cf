//! Downloads uploaded photos from Telegram

use async_trait::async_trait;
use teloxide::net::Download;
use teloxide::prelude::*;
use crate::flow::events::PhotoRef;
use crate::utils::errors::Result;
use crate::verification::ImageSource;

#[derive(Clone, Debug)]
pub struct TelegramImageSource {
    bot: Bot,
}

impl TelegramImageSource {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

#[async_trait]
impl ImageSource for TelegramImageSource {
    async fn fetch(&self, photo: &PhotoRef) -> Result<Vec<u8>> {
        let file = self.bot.get_file(photo.file_id.clone()).await?;

        let mut buffer = Vec::with_capacity(file.size as usize);
        self.bot.download_file(&file.path, &mut buffer).await?;

        tracing::debug!(file_id = %photo.file_id, bytes = buffer.len(), "Downloaded photo");
        Ok(buffer)
    }
}
