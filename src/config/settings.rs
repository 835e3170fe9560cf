//! Application settings management
//!
//! This module defines the configuration structure and provides methods
//! for loading settings from TOML files and environment variables.

use serde::{Deserialize, Serialize};

/// Main application configuration structure
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Settings {
    pub bot: BotConfig,
    pub payment: PaymentConfig,
    #[serde(default)]
    pub pricing: PricingConfig,
    #[serde(default)]
    pub promotion: PromotionConfig,
    #[serde(default)]
    pub sessions: SessionConfig,
    #[serde(default)]
    pub redis: RedisConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub verification: VerificationConfig,
    pub ocr: Option<OcrConfig>,
    #[serde(default)]
    pub i18n: I18nConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Telegram bot configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BotConfig {
    pub token: String,
}

/// Where users send money and where paid users are sent afterwards
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PaymentConfig {
    /// Mobile cash transfer number (Vodafone Cash)
    pub cash_number: String,
    /// Group handle that receives Stars gifts
    pub stars_handle: String,
    pub support_link: String,
    pub delivery_link: String,
}

/// Optional pricing overrides; the built-in table is used when empty
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct PricingConfig {
    #[serde(default)]
    pub plans: Vec<PlanPriceConfig>,
}

/// One pricing row as written in the config file
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PlanPriceConfig {
    /// "group" or "live"
    pub product: String,
    /// Plan length in months; omitted for live
    pub months: Option<u32>,
    pub stars: u32,
    pub cash: u32,
    pub usd: Option<u32>,
}

/// Time-boxed promotional offer
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PromotionConfig {
    pub enabled: bool,
    /// Group duration tier the promotion replaces
    pub months: u32,
    pub stars_price: u32,
    pub cash_price: u32,
    /// How long after process start the offer stays active
    pub duration_minutes: u64,
}

/// Session store configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SessionConfig {
    pub backend: SessionBackend,
    pub ttl_seconds: u64,
    pub cleanup_interval_seconds: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionBackend {
    Memory,
    Redis,
}

/// Redis configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RedisConfig {
    pub url: String,
    pub prefix: String,
}

/// Persistence log configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    pub backend: PersistenceBackend,
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub json_path: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PersistenceBackend {
    Disabled,
    Memory,
    JsonFile,
    Postgres,
}

/// Screenshot verification policy
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct VerificationConfig {
    pub mode: VerificationMode,
    /// Require the payment destination (handle or number) in the screenshot text
    pub require_marker: bool,
    /// Require the numbers in the screenshot to add up to the expected amount
    pub require_total: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationMode {
    Receipt,
    Ocr,
}

/// OCR service configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OcrConfig {
    pub endpoint: String,
    pub api_key: Option<String>,
    pub timeout_seconds: u64,
}

/// Internationalization configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct I18nConfig {
    pub default_language: String,
    pub supported_languages: Vec<String>,
    pub translations_dir: String,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    pub level: String,
    pub directory: String,
    pub file_prefix: String,
}

impl Settings {
    /// Load settings from configuration file and environment variables
    pub fn new() -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name("config").required(false))
            .add_source(
                config::Environment::with_prefix("SUBBOT")
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?;

        settings.try_deserialize()
    }

    /// Validate configuration settings
    pub fn validate(&self) -> Result<(), crate::utils::errors::BotError> {
        super::validation::validate_settings(self)
    }
}

impl Default for PromotionConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            months: 1,
            stars_price: 100,
            cash_price: 50,
            duration_minutes: 60 * 24,
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            backend: SessionBackend::Memory,
            ttl_seconds: 60 * 60 * 24,
            cleanup_interval_seconds: 600,
        }
    }
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            url: "redis://localhost:6379".to_string(),
            prefix: "subbot:".to_string(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            backend: PersistenceBackend::JsonFile,
            url: "postgresql://localhost/subbot".to_string(),
            max_connections: 5,
            min_connections: 1,
            json_path: "data/subscriptions.json".to_string(),
        }
    }
}

impl Default for VerificationConfig {
    fn default() -> Self {
        Self {
            mode: VerificationMode::Receipt,
            require_marker: true,
            require_total: true,
        }
    }
}

impl Default for I18nConfig {
    fn default() -> Self {
        Self {
            default_language: "ar".to_string(),
            supported_languages: vec!["ar".to_string(), "en".to_string()],
            translations_dir: "translations".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            directory: "logs".to_string(),
            file_prefix: "subbot.log".to_string(),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bot: BotConfig {
                token: String::new(),
            },
            payment: PaymentConfig {
                cash_number: "01000000000".to_string(),
                stars_handle: "@subscriptions_gifts".to_string(),
                support_link: "https://t.me/subscriptions_support".to_string(),
                delivery_link: "https://t.me/+subscribers".to_string(),
            },
            pricing: PricingConfig::default(),
            promotion: PromotionConfig::default(),
            sessions: SessionConfig::default(),
            redis: RedisConfig::default(),
            database: DatabaseConfig::default(),
            verification: VerificationConfig::default(),
            ocr: None,
            i18n: I18nConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}
