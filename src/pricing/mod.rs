//! Prices and promotions

pub mod table;
pub mod promotion;

pub use table::{PricingEntry, PricingTable, PromotionalPrice, Quote};
pub use promotion::PromotionalOffer;
