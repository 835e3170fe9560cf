//! Error handling for SubscriptionBot
//!
//! This module defines the main error types used throughout the application
//! and provides a unified error handling strategy.

use thiserror::Error;

/// Main error type for SubscriptionBot application
#[derive(Error, Debug)]
pub enum BotError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Database migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Telegram API error: {0}")]
    Telegram(#[from] teloxide::RequestError),

    #[error("Telegram download error: {0}")]
    Download(#[from] teloxide::DownloadError),

    #[error("Pricing error: {0}")]
    Pricing(#[from] PricingError),

    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Configuration loading error: {0}")]
    ConfigLoad(#[from] config::ConfigError),

    #[error("Invalid state transition: {from} -> {to}")]
    InvalidStateTransition { from: String, to: String },

    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("URL parsing error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("OCR service error: {0}")]
    Ocr(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Pricing table lookup errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PricingError {
    #[error("Unknown plan: {product} / {duration}")]
    UnknownPlan { product: String, duration: String },

    #[error("Invalid pricing table: {0}")]
    InvalidTable(String),
}

/// Session mutation errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("Step {step} does not accept {action}")]
    WrongStep { step: String, action: String },

    #[error("Expected amount is not set")]
    MissingExpectedAmount,
}

/// Result type alias for SubscriptionBot operations
pub type Result<T> = std::result::Result<T, BotError>;

/// Result type alias for pricing lookups
pub type PricingResult<T> = std::result::Result<T, PricingError>;

impl BotError {
    /// Check if the error is recoverable
    pub fn is_recoverable(&self) -> bool {
        match self {
            BotError::Database(_) => true,
            BotError::Migration(_) => false,
            BotError::Telegram(_) => true,
            BotError::Download(_) => true,
            BotError::Pricing(_) => false,
            BotError::Session(_) => false,
            BotError::Config(_) => false,
            BotError::ConfigLoad(_) => false,
            BotError::InvalidStateTransition { .. } => false,
            BotError::Redis(_) => true,
            BotError::Http(_) => true,
            BotError::Serialization(_) => false,
            BotError::Io(_) => true,
            BotError::UrlParse(_) => false,
            BotError::Ocr(_) => true,
            BotError::Storage(_) => true,
            BotError::InvalidInput(_) => false,
        }
    }

    /// Get error severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            BotError::Migration(_) => ErrorSeverity::Critical,
            BotError::Config(_) => ErrorSeverity::Critical,
            BotError::ConfigLoad(_) => ErrorSeverity::Critical,
            BotError::Pricing(_) => ErrorSeverity::Critical,
            BotError::InvalidStateTransition { .. } => ErrorSeverity::Warning,
            BotError::Session(_) => ErrorSeverity::Warning,
            BotError::InvalidInput(_) => ErrorSeverity::Info,
            _ => ErrorSeverity::Error,
        }
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Info,
    Warning,
    Error,
    Critical,
}

impl std::fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorSeverity::Info => write!(f, "INFO"),
            ErrorSeverity::Warning => write!(f, "WARN"),
            ErrorSeverity::Error => write!(f, "ERROR"),
            ErrorSeverity::Critical => write!(f, "CRITICAL"),
        }
    }
}
