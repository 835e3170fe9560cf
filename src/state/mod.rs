//! State management module
//!
//! This module stores per-user conversation sessions

pub mod storage;
pub mod redis_store;

// Re-export commonly used state components
pub use storage::{InMemorySessionStore, SessionJanitor, SessionStore};
pub use redis_store::RedisSessionStore;
