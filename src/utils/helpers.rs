//! Helper functions and utilities
//!
//! This module contains common helper functions used throughout the application.

/// Replace Arabic-Indic and Eastern Arabic-Indic digits with ASCII digits
pub fn normalize_digits(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '\u{0660}'..='\u{0669}' => char::from(b'0' + (c as u32 - 0x0660) as u8),
            '\u{06F0}'..='\u{06F9}' => char::from(b'0' + (c as u32 - 0x06F0) as u8),
            _ => c,
        })
        .collect()
}

/// Number of 100-unit batches needed to send `amount`
pub fn batches_of_hundred(amount: u32) -> u32 {
    amount.div_ceil(100)
}
