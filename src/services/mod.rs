//! Services module
//!
//! External collaborators (OCR, Telegram file downloads) and the factory that
//! wires every component of the bot from configuration.

pub mod ocr;
pub mod telegram_files;

pub use ocr::HttpOcrClient;
pub use telegram_files::TelegramImageSource;

use std::sync::Arc;
use std::time::Duration;
use teloxide::Bot;
use tracing::info;
use crate::config::{SessionBackend, Settings, VerificationMode};
use crate::database::{open_subscription_log, SubscriptionLog};
use crate::flow::ConversationController;
use crate::i18n::I18n;
use crate::pricing::{PricingTable, PromotionalOffer};
use crate::state::{InMemorySessionStore, RedisSessionStore, SessionJanitor, SessionStore};
use crate::utils::errors::{BotError, Result};
use crate::verification::{OcrVerifier, PaymentVerifier, ReceiptVerifier};

/// Every long-lived component of the bot
pub struct ServiceFactory {
    pub i18n: Arc<I18n>,
    pub pricing: Arc<PricingTable>,
    pub promotion: Arc<PromotionalOffer>,
    pub sessions: Arc<dyn SessionStore>,
    /// Present only for the in-memory session backend
    pub janitor: Option<SessionJanitor>,
    pub subscription_log: Option<Arc<dyn SubscriptionLog>>,
    pub verifier: Arc<dyn PaymentVerifier>,
}

impl ServiceFactory {
    /// Build every service from validated settings
    pub async fn new(bot: Bot, settings: &Settings) -> Result<Self> {
        let i18n = Arc::new(I18n::load(&settings.i18n).await?);
        let pricing = Arc::new(PricingTable::from_config(&settings.pricing, &settings.promotion)?);
        let promotion = PromotionalOffer::from_config(&settings.promotion);

        let (sessions, janitor): (Arc<dyn SessionStore>, Option<SessionJanitor>) = match settings.sessions.backend {
            SessionBackend::Memory => {
                let store = InMemorySessionStore::new(Duration::from_secs(settings.sessions.ttl_seconds));
                let janitor = SessionJanitor::new(
                    store.clone(),
                    Duration::from_secs(settings.sessions.cleanup_interval_seconds),
                );
                let sessions: Arc<dyn SessionStore> = Arc::new(store);
                (sessions, Some(janitor))
            }
            SessionBackend::Redis => {
                let store = RedisSessionStore::new(&settings.redis, settings.sessions.ttl_seconds).await?;
                store.test_connection().await?;
                let sessions: Arc<dyn SessionStore> = Arc::new(store);
                (sessions, None)
            }
        };

        let subscription_log = open_subscription_log(&settings.database).await?;
        let verifier = build_verifier(bot, settings)?;

        info!(
            sessions = ?settings.sessions.backend,
            persistence = ?settings.database.backend,
            verifier = verifier.name(),
            promotion_active = promotion.is_active(),
            "Services initialized"
        );

        Ok(Self {
            i18n,
            pricing,
            promotion,
            sessions,
            janitor,
            subscription_log,
            verifier,
        })
    }

    /// Controller sharing this factory's components
    pub fn controller(&self, settings: &Settings) -> ConversationController {
        ConversationController::new(
            Arc::clone(&self.sessions),
            Arc::clone(&self.pricing),
            Arc::clone(&self.promotion),
            Arc::clone(&self.verifier),
            self.subscription_log.clone(),
            Arc::clone(&self.i18n),
            settings.payment.clone(),
        )
    }
}

fn build_verifier(bot: Bot, settings: &Settings) -> Result<Arc<dyn PaymentVerifier>> {
    match settings.verification.mode {
        VerificationMode::Receipt => Ok(Arc::new(ReceiptVerifier)),
        VerificationMode::Ocr => {
            let ocr = settings.ocr.as_ref()
                .ok_or_else(|| BotError::Config("OCR verification requires an [ocr] section".to_string()))?;
            let verifier = OcrVerifier::new(
                Arc::new(TelegramImageSource::new(bot)),
                Arc::new(HttpOcrClient::new(ocr)?),
                settings.verification.require_marker,
                settings.verification.require_total,
            )?;
            Ok(Arc::new(verifier))
        }
    }
}
