//! Configuration management module
//!
//! This module handles loading and validation of application configuration
//! from TOML files and environment variables.

pub mod settings;
pub mod validation;

pub use settings::{
    Settings, BotConfig, PaymentConfig, PricingConfig, PlanPriceConfig, PromotionConfig,
    SessionConfig, SessionBackend, RedisConfig, DatabaseConfig, PersistenceBackend,
    VerificationConfig, VerificationMode, OcrConfig, I18nConfig, LoggingConfig,
};
