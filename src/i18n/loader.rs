//! Translation loader and message formatting
//!
//! Translations are nested JSON objects, one file per language, addressed with
//! dotted keys such as `payment.stars_instructions`. Placeholders are written as
//! `{name}`. Missing keys fall back to the default language, then to the key itself.

use std::collections::HashMap;
use std::path::Path;
use serde_json::{Map, Value};
use tokio::fs;
use tracing::{debug, error, info, warn};
use crate::config::I18nConfig;
use crate::utils::errors::{BotError, Result};

/// Translation parameters for message formatting
pub type TranslationParams = HashMap<String, String>;

/// Build translation parameters from key/value pairs
pub fn params<const N: usize>(pairs: [(&str, String); N]) -> TranslationParams {
    pairs.into_iter().map(|(k, v)| (k.to_string(), v)).collect()
}

#[derive(Debug, Clone)]
pub struct I18n {
    translations: HashMap<String, Map<String, Value>>,
    default_language: String,
    supported_languages: Vec<String>,
}

impl I18n {
    /// Load every supported language from the configured directory.
    ///
    /// The default language file is mandatory; other languages are skipped with a warning.
    pub async fn load(config: &I18nConfig) -> Result<Self> {
        let mut i18n = Self {
            translations: HashMap::new(),
            default_language: config.default_language.clone(),
            supported_languages: config.supported_languages.clone(),
        };

        let dir = Path::new(&config.translations_dir);
        for lang_code in &config.supported_languages {
            let file_path = dir.join(format!("{}.json", lang_code));
            match load_language_file(&file_path).await {
                Ok(map) => {
                    debug!("Loaded {} top-level translation keys for {}", map.len(), lang_code);
                    i18n.translations.insert(lang_code.clone(), map);
                    info!("Loaded translations for language: {}", lang_code);
                }
                Err(e) if lang_code == &config.default_language => {
                    error!("Failed to load default translations from {}: {}", file_path.display(), e);
                    return Err(BotError::Config(format!(
                        "Failed to load default language translations: {}", e
                    )));
                }
                Err(e) => warn!("Skipping translations for {}: {}", lang_code, e),
            }
        }

        Ok(i18n)
    }

    /// Build directly from already-parsed translations
    pub fn from_translations(
        default_language: &str,
        translations: HashMap<String, Map<String, Value>>,
    ) -> Self {
        let mut supported_languages: Vec<String> = translations.keys().cloned().collect();
        supported_languages.sort();
        Self {
            translations,
            default_language: default_language.to_string(),
            supported_languages,
        }
    }

    /// Get a translated message
    pub fn t(&self, key: &str, lang: &str, params: Option<&TranslationParams>) -> String {
        let effective_lang = self.get_effective_language(lang);

        let text = self.lookup(key, effective_lang)
            .or_else(|| {
                (effective_lang != self.default_language)
                    .then(|| self.lookup(key, &self.default_language))
                    .flatten()
            });

        match text {
            Some(text) => format_message(&text, params),
            None => {
                warn!("Translation key '{}' not found", key);
                key.to_string()
            }
        }
    }

    /// Get a translated message with plural forms, `{count}` is filled in automatically
    pub fn tp(&self, key: &str, lang: &str, count: i64, params: Option<&TranslationParams>) -> String {
        let effective_lang = self.get_effective_language(lang);
        let plural_key = format!("{}.{}", key, plural_form(count, effective_lang));

        let mut final_params = params.cloned().unwrap_or_default();
        final_params.insert("count".to_string(), count.to_string());

        self.t(&plural_key, effective_lang, Some(&final_params))
    }

    pub fn is_language_supported(&self, lang: &str) -> bool {
        self.supported_languages.iter().any(|l| l == lang)
    }

    pub fn default_language(&self) -> &str {
        &self.default_language
    }

    /// Detect user language from Telegram language code ("en-US" -> "en")
    pub fn detect_user_language(&self, telegram_lang: Option<&str>) -> String {
        telegram_lang
            .map(|lang| lang.split('-').next().unwrap_or(lang))
            .filter(|code| self.is_language_supported(code) && self.translations.contains_key(*code))
            .map(str::to_string)
            .unwrap_or_else(|| self.default_language.clone())
    }

    fn get_effective_language<'a>(&'a self, lang: &'a str) -> &'a str {
        if self.is_language_supported(lang) && self.translations.contains_key(lang) {
            lang
        } else {
            &self.default_language
        }
    }

    fn lookup(&self, key: &str, lang: &str) -> Option<String> {
        let translations = self.translations.get(lang)?;
        let mut parts = key.split('.');
        let mut current = translations.get(parts.next()?)?;
        for part in parts {
            current = current.get(part)?;
        }
        extract_text(current)
    }
}

async fn load_language_file(file_path: &Path) -> Result<Map<String, Value>> {
    let content = fs::read_to_string(file_path).await?;
    match serde_json::from_str::<Value>(&content)? {
        Value::Object(map) => Ok(map),
        _ => Err(BotError::Config(format!(
            "Invalid translation file format: {}", file_path.display()
        ))),
    }
}

/// Strings are used as-is; plural objects fall back to their "other" form
fn extract_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Object(obj) => obj.get("other").and_then(extract_text),
        _ => None,
    }
}

fn format_message(template: &str, params: Option<&TranslationParams>) -> String {
    match params {
        Some(params) => params.iter().fold(template.to_string(), |text, (key, value)| {
            text.replace(&format!("{{{}}}", key), value)
        }),
        None => template.to_string(),
    }
}

/// CLDR plural category for a count
fn plural_form(count: i64, lang: &str) -> &'static str {
    let n = count.abs();
    match lang {
        "ar" => match n % 100 {
            _ if n == 0 => "zero",
            _ if n == 1 => "one",
            _ if n == 2 => "two",
            3..=10 => "few",
            11..=99 => "many",
            _ => "other",
        },
        _ => {
            if n == 1 { "one" } else { "other" }
        }
    }
}
