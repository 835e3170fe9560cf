//! Conversation controller
//!
//! Maps (session, event) to replies and a new session. Events that do not belong
//! to the user's current step are dropped without a reply and without touching
//! the session.

use std::sync::Arc;
use tracing::{debug, error, info, warn};
use crate::config::PaymentConfig;
use crate::database::SubscriptionLog;
use crate::i18n::{params, I18n};
use crate::models::{FlowStep, PaymentMethod, PlanDuration, ProductType, Session, SubscriptionRecord, SubscriptionStatus};
use crate::pricing::{PricingTable, PromotionalOffer, PromotionalPrice};
use crate::state::SessionStore;
use crate::utils::errors::{BotError, Result, SessionError};
use crate::utils::logging::{log_ignored_event, log_persistence_failure, log_transition, log_verification};
use crate::verification::{check_amount, AmountCheck, PaymentVerifier, ProofExpectation, VerificationOutcome};
use super::events::{ButtonAction, InboundEvent, Incoming, Outbound, PhotoRef, Reply, ReplyMode};
use super::locks::UserLocks;
use super::menus::Menus;

pub struct ConversationController {
    sessions: Arc<dyn SessionStore>,
    pricing: Arc<PricingTable>,
    promotion: Arc<PromotionalOffer>,
    verifier: Arc<dyn PaymentVerifier>,
    log: Option<Arc<dyn SubscriptionLog>>,
    i18n: Arc<I18n>,
    payment: PaymentConfig,
    locks: UserLocks,
}

impl ConversationController {
    pub fn new(
        sessions: Arc<dyn SessionStore>,
        pricing: Arc<PricingTable>,
        promotion: Arc<PromotionalOffer>,
        verifier: Arc<dyn PaymentVerifier>,
        log: Option<Arc<dyn SubscriptionLog>>,
        i18n: Arc<I18n>,
        payment: PaymentConfig,
    ) -> Self {
        Self {
            sessions,
            pricing,
            promotion,
            verifier,
            log,
            i18n,
            payment,
            locks: UserLocks::new(),
        }
    }

    /// Process one event for one user.
    ///
    /// Internal faults are logged and answered with a generic message; only
    /// transport failures are returned to the caller.
    pub async fn handle(&self, incoming: Incoming, out: &dyn Outbound) -> Result<()> {
        let _guard = self.locks.acquire(incoming.user_id).await;

        let user_id = incoming.user_id;
        let kind = incoming.event.kind();
        let fallback_lang = self.i18n.detect_user_language(incoming.language_code.as_deref());

        match self.dispatch(incoming, out).await {
            Ok(()) => Ok(()),
            Err(e @ BotError::Telegram(_)) => Err(e),
            Err(e) => {
                error!(
                    user_id = user_id,
                    event = kind,
                    severity = %e.severity(),
                    recoverable = e.is_recoverable(),
                    error = %e,
                    "Internal fault while handling event"
                );
                out.deliver(Reply::send(self.i18n.t("errors.internal", &fallback_lang, None))).await
            }
        }
    }

    fn menus(&self) -> Menus<'_> {
        Menus {
            i18n: &self.i18n,
            pricing: &self.pricing,
            payment: &self.payment,
        }
    }

    /// Discounted tier, only while the offer is running
    fn active_promotion(&self) -> Option<PromotionalPrice> {
        if self.promotion.is_active() {
            self.pricing.promotion().copied()
        } else {
            None
        }
    }

    async fn dispatch(&self, incoming: Incoming, out: &dyn Outbound) -> Result<()> {
        let Incoming { user_id, language_code, event } = incoming;
        let stored = self.sessions.load(user_id).await?;
        let lang = match (&language_code, &stored) {
            (None, Some(session)) => session.language().to_string(),
            _ => self.i18n.detect_user_language(language_code.as_deref()),
        };

        debug!(user_id = user_id, event = event.kind(), step = ?stored.as_ref().map(Session::step), "Handling event");

        match event {
            InboundEvent::Start => self.restart(user_id, &lang, out).await,
            InboundEvent::Help => out.deliver(self.menus().help(&lang)).await,
            InboundEvent::Support => out.deliver(self.menus().support(&lang)).await,
            InboundEvent::Status => self.report_status(user_id, &lang, out).await,
            InboundEvent::ButtonPress(data) => {
                let Some(action) = ButtonAction::parse(&data) else {
                    warn!(user_id = user_id, data = %data, "Unknown button");
                    return Ok(());
                };
                if action == ButtonAction::Support {
                    let mut reply = self.menus().support(&lang);
                    reply.mode = ReplyMode::EditLast;
                    return out.deliver(reply).await;
                }
                let session = stored.unwrap_or_else(|| Session::new(user_id, lang));
                self.on_button(session, action, out).await
            }
            InboundEvent::Text(text) => match stored {
                Some(session) if session.step() == FlowStep::AwaitingAmount => {
                    self.on_amount(session, &text, out).await
                }
                other => {
                    ignore(user_id, other.as_ref(), "text");
                    Ok(())
                }
            },
            InboundEvent::Photo(photo) => match stored {
                Some(session) if session.step() == FlowStep::AwaitingScreenshot => {
                    self.on_screenshot(session, &photo, out).await
                }
                other => {
                    ignore(user_id, other.as_ref(), "photo");
                    Ok(())
                }
            },
        }
    }

    async fn restart(&self, user_id: i64, lang: &str, out: &dyn Outbound) -> Result<()> {
        let session = Session::new(user_id, lang);
        self.sessions.save(&session).await?;
        info!(user_id = user_id, attempt_id = %session.attempt_id(), "Session started");
        out.deliver(self.menus().start(lang)).await
    }

    async fn on_button(&self, mut session: Session, action: ButtonAction, out: &dyn Outbound) -> Result<()> {
        let from = session.step();
        let lang = session.language().to_string();
        let menus = self.menus();

        let reply = match action {
            ButtonAction::Product(product) => {
                if let Err(e) = session.choose_product(product) {
                    ignore_error(&session, e);
                    return Ok(());
                }
                let reply = match product {
                    ProductType::Group => menus.durations(&lang, self.active_promotion()),
                    ProductType::Live => menus.live_card(&lang)?,
                };
                self.commit(&session, from, SubscriptionRecord::from_session(&session, SubscriptionStatus::Pending)).await?;
                reply
            }
            ButtonAction::Duration(duration) => {
                let offered = self.active_promotion().is_none()
                    && self.pricing.entry(ProductType::Group, duration).is_some();
                if !offered {
                    ignore(session.user_id(), Some(&session), "duration not offered");
                    return Ok(());
                }
                if let Err(e) = session.choose_duration(duration, false) {
                    ignore_error(&session, e);
                    return Ok(());
                }
                self.commit(&session, from, SubscriptionRecord::from_session(&session, SubscriptionStatus::Pending)).await?;
                menus.payment_methods(duration, false, &lang)
            }
            ButtonAction::PromoDuration => {
                if from != FlowStep::ChoosingDuration {
                    ignore(session.user_id(), Some(&session), "promo duration");
                    return Ok(());
                }
                let Some(promo) = self.active_promotion() else {
                    debug!(user_id = session.user_id(), "Promotion ended, showing regular durations");
                    return out.deliver(menus.durations(&lang, None)).await;
                };
                let duration = PlanDuration::Months(promo.months);
                if let Err(e) = session.choose_duration(duration, true) {
                    ignore_error(&session, e);
                    return Ok(());
                }
                self.commit(&session, from, SubscriptionRecord::from_session(&session, SubscriptionStatus::Pending)).await?;
                menus.payment_methods(duration, true, &lang)
            }
            ButtonAction::Pay(method) => {
                if from != FlowStep::ChoosingPayment {
                    ignore(session.user_id(), Some(&session), "payment method");
                    return Ok(());
                }
                let (product, duration) = session.product_type()
                    .zip(session.duration())
                    .ok_or_else(|| BotError::InvalidStateTransition {
                        from: from.to_string(),
                        to: FlowStep::AwaitingAmount.to_string(),
                    })?;
                let quote = self.pricing.quote(product, duration, method, session.is_promotional())?;
                session.choose_payment(method, quote.amount)?;
                self.commit(&session, from, SubscriptionRecord::from_session(&session, SubscriptionStatus::AwaitingAmount)).await?;
                menus.payment_instructions(method, quote, &lang)
            }
            ButtonAction::Support => menus.support(&lang),
        };

        out.deliver(reply).await
    }

    async fn on_amount(&self, mut session: Session, text: &str, out: &dyn Outbound) -> Result<()> {
        let from = session.step();
        let lang = session.language().to_string();
        let expected = session.expected_amount().ok_or(SessionError::MissingExpectedAmount)?;
        let method = session.payment_method().unwrap_or(PaymentMethod::Stars);

        match check_amount(text, expected) {
            AmountCheck::NotANumber => {
                out.deliver(Reply::send(self.i18n.t("amount.not_a_number", &lang, None))).await
            }
            AmountCheck::Mismatch { submitted } => {
                info!(user_id = session.user_id(), expected = expected, submitted = submitted, "Amount mismatch");
                let record = SubscriptionRecord::from_session(&session, SubscriptionStatus::WrongAmount)
                    .with_submitted_amount(submitted);
                self.persist(record).await;

                let text = self.i18n.t("amount.mismatch", &lang, Some(&params([
                    ("expected", expected.to_string()),
                    ("unit", self.menus().unit(method, &lang)),
                ])));
                out.deliver(Reply::send(text)).await
            }
            AmountCheck::Match => {
                session.confirm_amount()?;
                let record = SubscriptionRecord::from_session(&session, SubscriptionStatus::AwaitingScreenshot)
                    .with_submitted_amount(i64::from(expected));
                self.commit(&session, from, record).await?;
                out.deliver(Reply::send(self.i18n.t("amount.confirmed", &lang, None))).await
            }
        }
    }

    async fn on_screenshot(&self, mut session: Session, photo: &PhotoRef, out: &dyn Outbound) -> Result<()> {
        let from = session.step();
        let lang = session.language().to_string();
        let expected_amount = session.expected_amount().ok_or(SessionError::MissingExpectedAmount)?;
        let method = session.payment_method().unwrap_or(PaymentMethod::Stars);

        out.deliver(Reply::send(self.i18n.t("screenshot.checking", &lang, None))).await?;

        let expectation = ProofExpectation {
            method,
            expected_amount,
            marker: match method {
                PaymentMethod::Stars => self.payment.stars_handle.clone(),
                PaymentMethod::MobileCash => self.payment.cash_number.clone(),
            },
        };

        match self.verifier.verify(photo, &expectation).await {
            VerificationOutcome::Passed => {
                log_verification(session.user_id(), true, None);
                session.complete()?;
                let record = SubscriptionRecord::from_session(&session, SubscriptionStatus::Verified)
                    .with_submitted_amount(i64::from(expected_amount))
                    .with_note(format!("{}: {}", self.verifier.name(), photo.file_id));
                self.commit(&session, from, record).await?;
                out.deliver(self.menus().delivery(&lang)).await
            }
            VerificationOutcome::Rejected(reason) => {
                log_verification(session.user_id(), false, Some(&reason.note()));
                let record = SubscriptionRecord::from_session(&session, SubscriptionStatus::Flagged)
                    .with_submitted_amount(i64::from(expected_amount))
                    .with_note(reason.note());
                self.persist(record).await;
                out.deliver(Reply::send(self.i18n.t(reason.translation_key(), &lang, None))).await
            }
        }
    }

    async fn report_status(&self, user_id: i64, lang: &str, out: &dyn Outbound) -> Result<()> {
        let text = match &self.log {
            None => self.i18n.t("status.unavailable", lang, None),
            Some(log) => match log.current_for_user(user_id).await? {
                Some(record) => {
                    let label = self.i18n.t(&format!("status.labels.{}", record.status.as_str()), lang, None);
                    self.i18n.t("status.current", lang, Some(&params([("status", label)])))
                }
                None => self.i18n.t("status.none", lang, None),
            },
        };
        out.deliver(Reply::send(text)).await
    }

    /// Save the session, then record the attempt
    async fn commit(&self, session: &Session, from: FlowStep, record: SubscriptionRecord) -> Result<()> {
        self.sessions.save(session).await?;
        if from != session.step() {
            log_transition(session.user_id(), from.as_str(), session.step().as_str());
        }
        self.persist(record).await;
        Ok(())
    }

    /// Persistence failures never interrupt the conversation
    async fn persist(&self, record: SubscriptionRecord) {
        let Some(log) = &self.log else {
            return;
        };
        if let Err(e) = log.upsert(&record).await {
            log_persistence_failure(record.user_id, record.status.as_str(), &e.to_string());
        }
    }
}

fn ignore(user_id: i64, session: Option<&Session>, event: &str) {
    let step = session.map(Session::step).unwrap_or_default();
    log_ignored_event(user_id, step.as_str(), event);
}

fn ignore_error(session: &Session, error: SessionError) {
    log_ignored_event(session.user_id(), session.step().as_str(), &error.to_string());
}
