//! Test context for unified test setup
//!
//! Wires a conversation controller to an in-memory session store, an in-memory
//! subscription log and a recording reply sink.

use std::sync::Arc;
use SubscriptionBot::database::{MemorySubscriptionLog, SubscriptionLog};
use SubscriptionBot::flow::{ConversationController, InboundEvent, Incoming};
use SubscriptionBot::i18n::{I18n, TranslationParams};
use SubscriptionBot::models::{Session, SubscriptionRecord};
use SubscriptionBot::pricing::{PricingTable, PromotionalOffer};
use SubscriptionBot::state::{InMemorySessionStore, SessionStore};
use SubscriptionBot::verification::{PaymentVerifier, ReceiptVerifier};

use super::fakes::RecordingOutbound;
use super::test_data::{test_i18n_config, test_payment_config, test_photo};

/// Language every test user speaks
pub const TEST_LANGUAGE: &str = "en";

/// Collaborators to plug into the controller
pub struct TestConfig {
    pub pricing: PricingTable,
    pub promotion: Arc<PromotionalOffer>,
    pub verifier: Arc<dyn PaymentVerifier>,
    /// Overrides the in-memory log; `Some(None)` disables persistence
    pub log: Option<Option<Arc<dyn SubscriptionLog>>>,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            pricing: PricingTable::default(),
            promotion: PromotionalOffer::inactive(),
            verifier: Arc::new(ReceiptVerifier),
            log: None,
        }
    }
}

/// Unified test context that manages all test components
pub struct TestContext {
    pub controller: ConversationController,
    pub sessions: InMemorySessionStore,
    pub log: Arc<MemorySubscriptionLog>,
    pub i18n: Arc<I18n>,
    pub out: RecordingOutbound,
}

impl TestContext {
    pub async fn new() -> Self {
        Self::new_with_config(TestConfig::default()).await
    }

    pub async fn new_with_config(config: TestConfig) -> Self {
        let _ = tracing_subscriber::fmt()
            .with_env_filter("debug")
            .with_test_writer()
            .try_init();

        let i18n = Arc::new(
            I18n::load(&test_i18n_config()).await.expect("shipped translations should load"),
        );
        let sessions = InMemorySessionStore::new(std::time::Duration::from_secs(3600));
        let log = Arc::new(MemorySubscriptionLog::new());
        let controller_log = match config.log {
            Some(log) => log,
            None => Some(Arc::clone(&log) as Arc<dyn SubscriptionLog>),
        };

        let controller = ConversationController::new(
            Arc::new(sessions.clone()),
            Arc::new(config.pricing),
            config.promotion,
            config.verifier,
            controller_log,
            Arc::clone(&i18n),
            test_payment_config(),
        );

        Self {
            controller,
            sessions,
            log,
            i18n,
            out: RecordingOutbound::new(),
        }
    }

    pub async fn send(&self, user_id: i64, event: InboundEvent) {
        let incoming = Incoming::new(user_id, event).with_language(Some(TEST_LANGUAGE.to_string()));
        self.controller.handle(incoming, &self.out).await
            .expect("recording outbound never fails");
    }

    pub async fn start(&self, user_id: i64) {
        self.send(user_id, InboundEvent::Start).await;
    }

    pub async fn press(&self, user_id: i64, data: &str) {
        self.send(user_id, InboundEvent::ButtonPress(data.to_string())).await;
    }

    pub async fn text(&self, user_id: i64, text: &str) {
        self.send(user_id, InboundEvent::Text(text.to_string())).await;
    }

    pub async fn photo(&self, user_id: i64, file_id: &str) {
        self.send(user_id, InboundEvent::Photo(test_photo(file_id))).await;
    }

    pub async fn session(&self, user_id: i64) -> Option<Session> {
        self.sessions.load(user_id).await.expect("in-memory store never fails")
    }

    pub async fn current_record(&self, user_id: i64) -> Option<SubscriptionRecord> {
        self.log.current_for_user(user_id).await.expect("in-memory log never fails")
    }

    /// English translation of `key`
    pub fn t(&self, key: &str) -> String {
        self.i18n.t(key, TEST_LANGUAGE, None)
    }

    pub fn t_with(&self, key: &str, params: &TranslationParams) -> String {
        self.i18n.t(key, TEST_LANGUAGE, Some(params))
    }

    /// Walk a user from /start to the amount prompt of a group plan
    pub async fn reach_amount_prompt(&self, user_id: i64, months: u32, method: &str) {
        self.start(user_id).await;
        self.press(user_id, "product:group").await;
        self.press(user_id, &format!("duration:{}", months)).await;
        self.press(user_id, &format!("pay:{}", method)).await;
    }
}
