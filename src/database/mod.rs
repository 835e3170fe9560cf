//! Database module
//!
//! Persistence of subscription attempts, with Postgres, JSON file and in-memory backends

pub mod connection;
pub mod json_file;
pub mod log;
pub mod repositories;

// Re-export commonly used database components
pub use connection::{DatabasePool, create_pool, run_migrations, health_check};
pub use json_file::JsonFileSubscriptionLog;
pub use log::{AttemptIndex, MemorySubscriptionLog, SubscriptionLog, open_subscription_log};
pub use repositories::SubscriptionRepository;
