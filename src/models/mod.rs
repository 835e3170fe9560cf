//! Data models module
//!
//! Conversation sessions and the subscription records derived from them

pub mod session;
pub mod subscription;

// Re-export commonly used models
pub use session::{Awaiting, FlowStep, PaymentMethod, PlanDuration, ProductType, Session};
pub use subscription::{SubscriptionRecord, SubscriptionRow, SubscriptionStatus};
