//! Logging configuration and setup
//!
//! This module provides logging initialization and structured logging utilities
//! for the SubscriptionBot application.

use tracing::{info, warn, error, debug};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use crate::config::LoggingConfig;
use crate::utils::errors::{BotError, Result};

/// Initialize logging based on configuration.
///
/// The returned guard flushes the file writer on drop and must be held by the caller
/// for the lifetime of the process.
pub fn init_logging(config: &LoggingConfig) -> Result<WorkerGuard> {
    let file_appender = tracing_appender::rolling::daily(&config.directory, &config.file_prefix);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(&config.level))
        .map_err(|e| BotError::Config(format!("Invalid log filter: {}", e)))?;

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stdout))
        .with(tracing_subscriber::fmt::layer().json().with_writer(non_blocking))
        .try_init()
        .map_err(|e| BotError::Config(format!("Logging already initialized: {}", e)))?;

    info!("Logging initialized with level: {}", config.level);
    Ok(guard)
}

/// Log a conversation step change
pub fn log_transition(user_id: i64, from: &str, to: &str) {
    info!(
        user_id = user_id,
        from = from,
        to = to,
        "Conversation step changed"
    );
}

/// Log an event that is not valid for the current step
pub fn log_ignored_event(user_id: i64, step: &str, event: &str) {
    debug!(
        user_id = user_id,
        step = step,
        event = event,
        "Event ignored in current step"
    );
}

/// Log payment verification results
pub fn log_verification(user_id: i64, passed: bool, reason: Option<&str>) {
    if passed {
        info!(user_id = user_id, "Payment proof verified");
    } else {
        warn!(
            user_id = user_id,
            reason = reason,
            "Payment proof rejected"
        );
    }
}

/// Log persistence failures that the flow swallows
pub fn log_persistence_failure(user_id: i64, status: &str, error: &str) {
    error!(
        user_id = user_id,
        status = status,
        error = error,
        "Failed to write subscription record"
    );
}

/// Log API errors with context
pub fn log_api_error(api: &str, error: &str, context: Option<&str>) {
    error!(
        api = api,
        error = error,
        context = context,
        "API error occurred"
    );
}
