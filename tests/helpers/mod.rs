//! Test helpers module
//!
//! This module provides utilities for testing the SubscriptionBot conversation flow:
//! a controller wired to in-memory collaborators, a recording reply sink, fake
//! verification sources and shared test data.

#![allow(dead_code)]

pub mod test_context;
pub mod test_data;
pub mod fakes;

pub use test_context::*;
pub use test_data::*;
pub use fakes::*;
