//! Conversation flow
//!
//! The transport-independent purchase state machine and the types it exchanges
//! with the Telegram adapter.

pub mod controller;
pub mod events;
pub mod locks;
pub mod menus;

pub use controller::ConversationController;
pub use events::{Button, ButtonAction, InboundEvent, Incoming, Outbound, PhotoRef, Reply, ReplyMode};
pub use locks::UserLocks;
pub use menus::Menus;
