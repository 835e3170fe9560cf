//! Configuration validation module
//!
//! This module provides validation functions for application configuration
//! to ensure all required settings are properly configured.

use crate::utils::errors::{BotError, Result};
use super::settings::{PersistenceBackend, SessionBackend, VerificationMode};
use super::Settings;

/// One year
const MAX_SESSION_TTL_SECONDS: u64 = 365 * 24 * 60 * 60;
const MAX_PROMOTION_MINUTES: u64 = 365 * 24 * 60;

/// Validate all configuration settings
pub fn validate_settings(settings: &Settings) -> Result<()> {
    validate_bot_config(&settings.bot)?;
    validate_payment_config(&settings.payment)?;
    validate_promotion_config(&settings.promotion)?;
    validate_session_config(settings)?;
    validate_database_config(&settings.database)?;
    validate_verification_config(settings)?;
    validate_i18n_config(&settings.i18n)?;
    validate_logging_config(&settings.logging)?;

    Ok(())
}

/// Validate bot configuration
fn validate_bot_config(config: &super::BotConfig) -> Result<()> {
    if config.token.is_empty() {
        return Err(BotError::Config(
            "Bot token is required".to_string()
        ));
    }

    Ok(())
}

/// Validate payment destinations
fn validate_payment_config(config: &super::PaymentConfig) -> Result<()> {
    if config.cash_number.trim().is_empty() {
        return Err(BotError::Config(
            "Mobile cash number is required".to_string()
        ));
    }

    if config.stars_handle.trim().is_empty() {
        return Err(BotError::Config(
            "Stars group handle is required".to_string()
        ));
    }

    url::Url::parse(&config.support_link)?;
    url::Url::parse(&config.delivery_link)?;

    Ok(())
}

/// Validate promotional offer configuration
fn validate_promotion_config(config: &super::PromotionConfig) -> Result<()> {
    if !config.enabled {
        return Ok(());
    }

    if config.months == 0 {
        return Err(BotError::Config(
            "Promotion tier must be at least one month".to_string()
        ));
    }

    if config.stars_price == 0 || config.cash_price == 0 {
        return Err(BotError::Config(
            "Promotion prices must be greater than 0".to_string()
        ));
    }

    if config.duration_minutes == 0 {
        return Err(BotError::Config(
            "Promotion duration must be greater than 0".to_string()
        ));
    }

    if config.duration_minutes > MAX_PROMOTION_MINUTES {
        return Err(BotError::Config(format!(
            "Promotion duration must not exceed {} minutes", MAX_PROMOTION_MINUTES
        )));
    }

    Ok(())
}

/// Validate session store configuration
fn validate_session_config(settings: &Settings) -> Result<()> {
    let config = &settings.sessions;

    if config.ttl_seconds == 0 {
        return Err(BotError::Config(
            "Session TTL must be greater than 0".to_string()
        ));
    }

    if config.ttl_seconds > MAX_SESSION_TTL_SECONDS {
        return Err(BotError::Config(format!(
            "Session TTL must not exceed {} seconds", MAX_SESSION_TTL_SECONDS
        )));
    }

    if config.backend == SessionBackend::Memory && config.cleanup_interval_seconds == 0 {
        return Err(BotError::Config(
            "Session cleanup interval must be greater than 0".to_string()
        ));
    }

    if config.backend == SessionBackend::Redis && settings.redis.url.is_empty() {
        return Err(BotError::Config(
            "Redis URL is required for the redis session backend".to_string()
        ));
    }

    Ok(())
}

/// Validate persistence configuration
fn validate_database_config(config: &super::DatabaseConfig) -> Result<()> {
    match config.backend {
        PersistenceBackend::Postgres => {
            if config.url.is_empty() {
                return Err(BotError::Config(
                    "Database URL is required".to_string()
                ));
            }

            if config.max_connections == 0 {
                return Err(BotError::Config(
                    "Max connections must be greater than 0".to_string()
                ));
            }

            if config.min_connections > config.max_connections {
                return Err(BotError::Config(
                    "Min connections cannot be greater than max connections".to_string()
                ));
            }
        }
        PersistenceBackend::JsonFile => {
            if config.json_path.is_empty() {
                return Err(BotError::Config(
                    "JSON storage path is required".to_string()
                ));
            }
        }
        PersistenceBackend::Memory | PersistenceBackend::Disabled => {}
    }

    Ok(())
}

/// Validate verification policy against the OCR settings
fn validate_verification_config(settings: &Settings) -> Result<()> {
    if settings.verification.mode != VerificationMode::Ocr {
        return Ok(());
    }

    let ocr = settings.ocr.as_ref().ok_or_else(|| {
        BotError::Config("OCR settings are required when verification mode is ocr".to_string())
    })?;

    url::Url::parse(&ocr.endpoint)?;

    if ocr.timeout_seconds == 0 {
        return Err(BotError::Config(
            "OCR timeout must be greater than 0".to_string()
        ));
    }

    if !settings.verification.require_marker && !settings.verification.require_total {
        return Err(BotError::Config(
            "OCR verification needs at least one of require_marker or require_total".to_string()
        ));
    }

    Ok(())
}

/// Validate internationalization configuration
fn validate_i18n_config(config: &super::I18nConfig) -> Result<()> {
    if config.default_language.is_empty() {
        return Err(BotError::Config(
            "Default language is required".to_string()
        ));
    }

    if config.supported_languages.is_empty() {
        return Err(BotError::Config(
            "At least one supported language is required".to_string()
        ));
    }

    if !config.supported_languages.contains(&config.default_language) {
        return Err(BotError::Config(
            "Default language must be in supported languages list".to_string()
        ));
    }

    Ok(())
}

/// Validate logging configuration
fn validate_logging_config(config: &super::LoggingConfig) -> Result<()> {
    if config.level.is_empty() {
        return Err(BotError::Config(
            "Log level is required".to_string()
        ));
    }

    let valid_levels = ["trace", "debug", "info", "warn", "error"];
    if !valid_levels.contains(&config.level.as_str()) {
        return Err(BotError::Config(
            format!("Invalid log level: {}. Valid levels: {:?}", config.level, valid_levels)
        ));
    }

    Ok(())
}
