//! Time-boxed promotional offer
//!
//! The offer is activated when the process starts and switches itself off once its
//! window has elapsed. [`PromotionalOffer::is_active`] also checks the clock, so a
//! stalled expiry task never extends the offer.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use chrono::{DateTime, Utc};
use tokio::task::JoinHandle;
use tracing::info;
use crate::config::PromotionConfig;

#[derive(Debug)]
pub struct PromotionalOffer {
    active: AtomicBool,
    months: u32,
    activated_at: DateTime<Utc>,
    window: Duration,
}

impl PromotionalOffer {
    /// Offer that starts now and lasts for `window`
    pub fn start(months: u32, window: Duration) -> Arc<Self> {
        Self::started_at(months, Utc::now(), window)
    }

    pub fn started_at(months: u32, activated_at: DateTime<Utc>, window: Duration) -> Arc<Self> {
        Arc::new(Self {
            active: AtomicBool::new(true),
            months,
            activated_at,
            window,
        })
    }

    /// An offer that never runs
    pub fn inactive() -> Arc<Self> {
        Arc::new(Self {
            active: AtomicBool::new(false),
            months: 0,
            activated_at: Utc::now(),
            window: Duration::ZERO,
        })
    }

    pub fn from_config(config: &PromotionConfig) -> Arc<Self> {
        if config.enabled {
            info!(
                months = config.months,
                minutes = config.duration_minutes,
                "Promotional offer activated"
            );
            Self::start(config.months, Duration::from_secs(config.duration_minutes.saturating_mul(60)))
        } else {
            Self::inactive()
        }
    }

    pub fn months(&self) -> u32 {
        self.months
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        let window = chrono::Duration::from_std(self.window).unwrap_or(chrono::Duration::MAX);
        self.activated_at.checked_add_signed(window).unwrap_or(DateTime::<Utc>::MAX_UTC)
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire) && Utc::now() < self.expires_at()
    }

    pub fn deactivate(&self) {
        if self.active.swap(false, Ordering::AcqRel) {
            info!("Promotional offer ended");
        }
    }

    /// Switch the offer off when its window elapses
    pub fn spawn_expiry(self: &Arc<Self>) -> Option<JoinHandle<()>> {
        if !self.active.load(Ordering::Acquire) {
            return None;
        }

        let offer = Arc::clone(self);
        let remaining = (offer.expires_at() - Utc::now()).to_std().unwrap_or(Duration::ZERO);
        Some(tokio::spawn(async move {
            tokio::time::sleep(remaining).await;
            offer.deactivate();
        }))
    }
}
