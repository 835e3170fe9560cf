//! Content-inspection policy
//!
//! The screenshot is downloaded, run through an OCR service and the extracted text
//! is checked for the payment destination and for a large enough total.

use std::sync::Arc;
use async_trait::async_trait;
use regex::Regex;
use tracing::{debug, warn};
use crate::flow::events::PhotoRef;
use crate::utils::errors::{BotError, Result};
use crate::utils::helpers::normalize_digits;
use crate::utils::logging::log_api_error;
use super::{PaymentVerifier, ProofExpectation, RejectionReason, VerificationOutcome};

/// Longest digit run counted towards the paid total; longer runs are phone numbers or ids
const MAX_AMOUNT_DIGITS: usize = 6;

/// Fetches the bytes of an uploaded photo
#[async_trait]
pub trait ImageSource: Send + Sync {
    async fn fetch(&self, photo: &PhotoRef) -> Result<Vec<u8>>;
}

/// Turns an image into text
#[async_trait]
pub trait TextExtractor: Send + Sync {
    async fn extract_text(&self, image: &[u8]) -> Result<String>;
}

pub struct OcrVerifier {
    images: Arc<dyn ImageSource>,
    extractor: Arc<dyn TextExtractor>,
    require_marker: bool,
    require_total: bool,
    number_pattern: Regex,
}

impl OcrVerifier {
    pub fn new(
        images: Arc<dyn ImageSource>,
        extractor: Arc<dyn TextExtractor>,
        require_marker: bool,
        require_total: bool,
    ) -> Result<Self> {
        let number_pattern = Regex::new(r"[0-9]+")
            .map_err(|e| BotError::Config(format!("Invalid amount pattern: {}", e)))?;

        Ok(Self {
            images,
            extractor,
            require_marker,
            require_total,
            number_pattern,
        })
    }

    /// Image text, or empty when any step fails
    async fn read_text(&self, proof: &PhotoRef) -> String {
        let image = match self.images.fetch(proof).await {
            Ok(image) => image,
            Err(e) => {
                log_api_error("telegram_file", &e.to_string(), Some(&proof.file_id));
                return String::new();
            }
        };

        match self.extractor.extract_text(&image).await {
            Ok(text) => text,
            Err(e) => {
                log_api_error("ocr", &e.to_string(), Some(&proof.file_id));
                String::new()
            }
        }
    }

    /// Sum of every standalone number of at most six digits
    pub fn total_in(&self, text: &str) -> u64 {
        let normalized = normalize_digits(text);
        self.number_pattern
            .find_iter(&normalized)
            .map(|m| m.as_str())
            .filter(|digits| digits.len() <= MAX_AMOUNT_DIGITS)
            .filter_map(|digits| digits.parse::<u64>().ok())
            .sum()
    }

    /// Apply the marker and total checks to extracted text
    pub fn inspect(&self, text: &str, expectation: &ProofExpectation) -> VerificationOutcome {
        if text.trim().is_empty() {
            return VerificationOutcome::Rejected(RejectionReason::Unreadable);
        }

        if self.require_marker && !contains_marker(text, &expectation.marker) {
            return VerificationOutcome::Rejected(RejectionReason::MarkerMissing);
        }

        if self.require_total {
            let found = self.total_in(text);
            if found < u64::from(expectation.expected_amount) {
                return VerificationOutcome::Rejected(RejectionReason::TotalTooLow { found });
            }
        }

        VerificationOutcome::Passed
    }
}

/// Case-insensitive match that ignores whitespace, so "010 0000 0000" matches "01000000000"
fn contains_marker(text: &str, marker: &str) -> bool {
    let squash = |s: &str| -> String {
        normalize_digits(s)
            .chars()
            .filter(|c| !c.is_whitespace())
            .flat_map(char::to_lowercase)
            .collect()
    };

    let marker = squash(marker);
    !marker.is_empty() && squash(text).contains(&marker)
}

#[async_trait]
impl PaymentVerifier for OcrVerifier {
    async fn verify(&self, proof: &PhotoRef, expectation: &ProofExpectation) -> VerificationOutcome {
        let text = self.read_text(proof).await;
        debug!(file_id = %proof.file_id, chars = text.chars().count(), "Extracted screenshot text");

        let outcome = self.inspect(&text, expectation);
        if let VerificationOutcome::Rejected(reason) = &outcome {
            warn!(file_id = %proof.file_id, reason = %reason.note(), "Screenshot failed inspection");
        }
        outcome
    }

    fn name(&self) -> &'static str {
        "ocr"
    }
}

impl std::fmt::Debug for OcrVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OcrVerifier")
            .field("require_marker", &self.require_marker)
            .field("require_total", &self.require_total)
            .finish_non_exhaustive()
    }
}
