//! Conversation session model
//!
//! A session is the per-user record of how far the purchase flow has progressed.
//! Fields are private so that every change goes through a step-checked mutator.

use std::fmt;
use std::str::FromStr;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use crate::utils::errors::SessionError;

/// What the user is buying
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductType {
    Group,
    Live,
}

impl ProductType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductType::Group => "group",
            ProductType::Live => "live",
        }
    }
}

impl fmt::Display for ProductType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProductType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "group" => Ok(ProductType::Group),
            "live" => Ok(ProductType::Live),
            other => Err(format!("unknown product: {}", other)),
        }
    }
}

/// Plan length. Group plans run for a number of months, a live purchase is a single unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanDuration {
    Months(u32),
    SingleLive,
}

impl PlanDuration {
    /// Compact key used in callback data and storage ("6", "live")
    pub fn as_key(&self) -> String {
        match self {
            PlanDuration::Months(months) => months.to_string(),
            PlanDuration::SingleLive => "live".to_string(),
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "live" => Some(PlanDuration::SingleLive),
            months => months.parse::<u32>().ok()
                .filter(|m| *m > 0)
                .map(PlanDuration::Months),
        }
    }

    pub fn months(&self) -> Option<u32> {
        match self {
            PlanDuration::Months(months) => Some(*months),
            PlanDuration::SingleLive => None,
        }
    }
}

impl fmt::Display for PlanDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlanDuration::Months(months) => write!(f, "{} months", months),
            PlanDuration::SingleLive => f.write_str("single live"),
        }
    }
}

/// How the user pays
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Telegram Stars sent as gifts to the payment group
    Stars,
    /// Mobile wallet transfer (Vodafone Cash)
    MobileCash,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Stars => "stars",
            PaymentMethod::MobileCash => "mobile_cash",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "stars" => Ok(PaymentMethod::Stars),
            "mobile_cash" | "cash" => Ok(PaymentMethod::MobileCash),
            other => Err(format!("unknown payment method: {}", other)),
        }
    }
}

/// Which kind of input is currently solicited
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Awaiting {
    #[default]
    None,
    Amount,
    Screenshot,
}

/// Position in the purchase flow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowStep {
    #[default]
    Start,
    ChoosingDuration,
    ChoosingPayment,
    AwaitingAmount,
    AwaitingScreenshot,
    Completed,
}

impl FlowStep {
    pub fn as_str(&self) -> &'static str {
        match self {
            FlowStep::Start => "start",
            FlowStep::ChoosingDuration => "choosing_duration",
            FlowStep::ChoosingPayment => "choosing_payment",
            FlowStep::AwaitingAmount => "awaiting_amount",
            FlowStep::AwaitingScreenshot => "awaiting_screenshot",
            FlowStep::Completed => "completed",
        }
    }

    /// Steps reachable from this one without a restart
    pub fn next_steps(&self) -> &'static [FlowStep] {
        match self {
            FlowStep::Start => &[FlowStep::ChoosingDuration, FlowStep::ChoosingPayment],
            FlowStep::ChoosingDuration => &[FlowStep::ChoosingPayment],
            FlowStep::ChoosingPayment => &[FlowStep::AwaitingAmount],
            FlowStep::AwaitingAmount => &[FlowStep::AwaitingScreenshot],
            FlowStep::AwaitingScreenshot => &[FlowStep::Completed],
            FlowStep::Completed => &[],
        }
    }

    pub fn can_advance_to(&self, next: FlowStep) -> bool {
        self.next_steps().contains(&next)
    }
}

impl fmt::Display for FlowStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-user conversation state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    user_id: i64,
    attempt_id: Uuid,
    language: String,
    step: FlowStep,
    product_type: Option<ProductType>,
    duration: Option<PlanDuration>,
    payment_method: Option<PaymentMethod>,
    expected_amount: Option<u32>,
    awaiting: Awaiting,
    is_promotional: bool,
    updated_at: DateTime<Utc>,
}

impl Session {
    /// Fresh session at the start of the flow with a new attempt id
    pub fn new(user_id: i64, language: impl Into<String>) -> Self {
        Self {
            user_id,
            attempt_id: Uuid::new_v4(),
            language: language.into(),
            step: FlowStep::Start,
            product_type: None,
            duration: None,
            payment_method: None,
            expected_amount: None,
            awaiting: Awaiting::None,
            is_promotional: false,
            updated_at: Utc::now(),
        }
    }

    pub fn user_id(&self) -> i64 {
        self.user_id
    }

    pub fn attempt_id(&self) -> Uuid {
        self.attempt_id
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn step(&self) -> FlowStep {
        self.step
    }

    pub fn product_type(&self) -> Option<ProductType> {
        self.product_type
    }

    pub fn duration(&self) -> Option<PlanDuration> {
        self.duration
    }

    pub fn payment_method(&self) -> Option<PaymentMethod> {
        self.payment_method
    }

    pub fn expected_amount(&self) -> Option<u32> {
        self.expected_amount
    }

    pub fn awaiting(&self) -> Awaiting {
        self.awaiting
    }

    pub fn is_promotional(&self) -> bool {
        self.is_promotional
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Pick Group or Live. Live has a single unit, so it skips the duration step.
    pub fn choose_product(&mut self, product: ProductType) -> Result<(), SessionError> {
        let next = match product {
            ProductType::Group => FlowStep::ChoosingDuration,
            ProductType::Live => FlowStep::ChoosingPayment,
        };
        self.ensure_can_advance(next, "product selection")?;
        if self.step != FlowStep::Start {
            return Err(self.wrong_step("product selection"));
        }

        self.product_type = Some(product);
        if product == ProductType::Live {
            self.duration = Some(PlanDuration::SingleLive);
        }
        self.advance(next);
        Ok(())
    }

    /// Pick a group plan length
    pub fn choose_duration(&mut self, duration: PlanDuration, promotional: bool) -> Result<(), SessionError> {
        self.ensure_can_advance(FlowStep::ChoosingPayment, "duration selection")?;
        if self.step != FlowStep::ChoosingDuration {
            return Err(self.wrong_step("duration selection"));
        }

        self.duration = Some(duration);
        self.is_promotional = promotional;
        self.advance(FlowStep::ChoosingPayment);
        Ok(())
    }

    /// Pick a payment method and start waiting for the paid amount
    pub fn choose_payment(&mut self, method: PaymentMethod, expected_amount: u32) -> Result<(), SessionError> {
        self.ensure_can_advance(FlowStep::AwaitingAmount, "payment selection")?;

        self.payment_method = Some(method);
        self.expected_amount = Some(expected_amount);
        self.awaiting = Awaiting::Amount;
        self.advance(FlowStep::AwaitingAmount);
        Ok(())
    }

    /// The submitted amount matched; ask for the screenshot next
    pub fn confirm_amount(&mut self) -> Result<(), SessionError> {
        self.ensure_can_advance(FlowStep::AwaitingScreenshot, "amount confirmation")?;
        if self.expected_amount.is_none() {
            return Err(SessionError::MissingExpectedAmount);
        }

        self.awaiting = Awaiting::Screenshot;
        self.advance(FlowStep::AwaitingScreenshot);
        Ok(())
    }

    /// Proof accepted; nothing else is awaited
    pub fn complete(&mut self) -> Result<(), SessionError> {
        self.ensure_can_advance(FlowStep::Completed, "completion")?;

        self.awaiting = Awaiting::None;
        self.advance(FlowStep::Completed);
        Ok(())
    }

    fn ensure_can_advance(&self, next: FlowStep, action: &str) -> Result<(), SessionError> {
        if self.step.can_advance_to(next) {
            Ok(())
        } else {
            Err(self.wrong_step(action))
        }
    }

    fn wrong_step(&self, action: &str) -> SessionError {
        SessionError::WrongStep {
            step: self.step.to_string(),
            action: action.to_string(),
        }
    }

    fn advance(&mut self, next: FlowStep) {
        self.step = next;
        self.updated_at = Utc::now();
    }
}
