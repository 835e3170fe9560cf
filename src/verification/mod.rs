//! Payment verification
//!
//! The amount the user types is compared exactly against the expected price. The
//! screenshot that follows goes through a [`PaymentVerifier`] chosen by configuration:
//! accept on receipt, or inspect the text extracted from the image.

pub mod amount;
pub mod ocr;
pub mod receipt;

use async_trait::async_trait;
use crate::flow::events::PhotoRef;
use crate::models::PaymentMethod;

pub use amount::{check_amount, parse_amount, AmountCheck};
pub use ocr::{ImageSource, OcrVerifier, TextExtractor};
pub use receipt::ReceiptVerifier;

/// What a screenshot has to show
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProofExpectation {
    pub method: PaymentMethod,
    pub expected_amount: u32,
    /// Payment destination that must appear in the proof (group handle or cash number)
    pub marker: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectionReason {
    MarkerMissing,
    TotalTooLow { found: u64 },
    Unreadable,
}

impl RejectionReason {
    /// Translation key of the user-facing explanation
    pub fn translation_key(&self) -> &'static str {
        match self {
            RejectionReason::MarkerMissing => "screenshot.rejected.marker_missing",
            RejectionReason::TotalTooLow { .. } => "screenshot.rejected.total_too_low",
            RejectionReason::Unreadable => "screenshot.rejected.unreadable",
        }
    }

    /// Short note stored with the subscription record
    pub fn note(&self) -> String {
        match self {
            RejectionReason::MarkerMissing => "marker missing".to_string(),
            RejectionReason::TotalTooLow { found } => format!("total too low: {}", found),
            RejectionReason::Unreadable => "no text extracted".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerificationOutcome {
    Passed,
    Rejected(RejectionReason),
}

impl VerificationOutcome {
    pub fn is_passed(&self) -> bool {
        matches!(self, VerificationOutcome::Passed)
    }
}

/// Screenshot verification policy
///
/// Downstream failures never surface as errors; they count as a failed check.
#[async_trait]
pub trait PaymentVerifier: Send + Sync {
    async fn verify(&self, proof: &PhotoRef, expectation: &ProofExpectation) -> VerificationOutcome;

    fn name(&self) -> &'static str;
}
