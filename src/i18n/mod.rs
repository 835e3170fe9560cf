//! Internationalization module
//!
//! Arabic is the default language; English is shipped as a second locale.

pub mod loader;

// Re-export commonly used i18n components
pub use loader::{params, I18n, TranslationParams};
