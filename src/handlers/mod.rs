//! Bot handlers module
//!
//! This module contains all Telegram bot handlers organized by type:
//! - Command handlers for bot commands
//! - Callback handlers for inline keyboard interactions
//! - Message handlers for text and photo messages
//!
//! Replies are rendered back to Telegram by [`render::TelegramOutbound`].

pub mod commands;
pub mod callbacks;
pub mod messages;
pub mod render;

// Re-export commonly used handler functions
pub use commands::{handle_command, Command};
pub use callbacks::handle_callback_query;
pub use messages::handle_message;
pub use render::TelegramOutbound;
