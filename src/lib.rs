//! SubscriptionBot Telegram Bot
//!
//! A Telegram bot that sells group and live subscriptions. Users pick a plan, pay
//! with Telegram Stars or mobile cash, confirm the amount they sent and upload a
//! payment screenshot that is checked before the invite link is handed out.

#![allow(non_snake_case)]

pub mod config;
pub mod handlers;
pub mod services;
pub mod models;
pub mod database;
pub mod state;
pub mod i18n;
pub mod utils;
pub mod pricing;
pub mod flow;
pub mod verification;

// Re-export commonly used types
pub use config::Settings;
pub use utils::errors::{BotError, Result};

// Re-export main components for easy access
pub use services::ServiceFactory;
pub use flow::ConversationController;
pub use i18n::I18n;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Get library information
pub fn info() -> String {
    format!("{} v{}", NAME, VERSION)
}
