//! Repository pattern implementations for database access

pub mod subscription;

pub use subscription::SubscriptionRepository;
