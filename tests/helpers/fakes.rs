//! Fake collaborators
//!
//! Reply sink, verifiers, image sources and logs that behave predictably in tests.

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use async_trait::async_trait;
use SubscriptionBot::database::SubscriptionLog;
use SubscriptionBot::flow::{Outbound, PhotoRef, Reply};
use SubscriptionBot::models::SubscriptionRecord;
use SubscriptionBot::verification::{
    ImageSource, PaymentVerifier, ProofExpectation, RejectionReason, VerificationOutcome,
};
use SubscriptionBot::{BotError, Result};

/// Collects every reply the controller delivers
#[derive(Debug, Default)]
pub struct RecordingOutbound {
    replies: Mutex<Vec<Reply>>,
}

impl RecordingOutbound {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn replies(&self) -> Vec<Reply> {
        self.replies.lock().unwrap().clone()
    }

    /// Drain the replies recorded so far
    pub fn take(&self) -> Vec<Reply> {
        std::mem::take(&mut *self.replies.lock().unwrap())
    }

    pub fn last_text(&self) -> Option<String> {
        self.replies.lock().unwrap().last().map(|r| r.text.clone())
    }

    pub fn len(&self) -> usize {
        self.replies.lock().unwrap().len()
    }
}

#[async_trait]
impl Outbound for RecordingOutbound {
    async fn deliver(&self, reply: Reply) -> Result<()> {
        self.replies.lock().unwrap().push(reply);
        Ok(())
    }
}

/// Rejects every screenshot for the same reason and counts calls
#[derive(Debug)]
pub struct RejectingVerifier {
    reason: RejectionReason,
    calls: AtomicUsize,
}

impl RejectingVerifier {
    pub fn new(reason: RejectionReason) -> Self {
        Self {
            reason,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PaymentVerifier for RejectingVerifier {
    async fn verify(&self, _proof: &PhotoRef, _expectation: &ProofExpectation) -> VerificationOutcome {
        self.calls.fetch_add(1, Ordering::SeqCst);
        VerificationOutcome::Rejected(self.reason.clone())
    }

    fn name(&self) -> &'static str {
        "rejecting"
    }
}

/// Serves the same bytes for every photo
#[derive(Debug, Clone)]
pub struct StaticImageSource(pub Vec<u8>);

#[async_trait]
impl ImageSource for StaticImageSource {
    async fn fetch(&self, _photo: &PhotoRef) -> Result<Vec<u8>> {
        Ok(self.0.clone())
    }
}

/// Log whose writes always fail
#[derive(Debug, Default)]
pub struct BrokenSubscriptionLog {
    attempts: AtomicUsize,
}

impl BrokenSubscriptionLog {
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SubscriptionLog for BrokenSubscriptionLog {
    async fn upsert(&self, _record: &SubscriptionRecord) -> Result<()> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(BotError::Storage("disk full".to_string()))
    }

    async fn current_for_user(&self, _user_id: i64) -> Result<Option<SubscriptionRecord>> {
        Err(BotError::Storage("disk full".to_string()))
    }

    async fn history_for_user(&self, _user_id: i64) -> Result<Vec<SubscriptionRecord>> {
        Err(BotError::Storage("disk full".to_string()))
    }
}
