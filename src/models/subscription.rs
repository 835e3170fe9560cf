//! Subscription attempt record

use std::fmt;
use std::str::FromStr;
use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;
use crate::models::session::{PaymentMethod, PlanDuration, ProductType, Session};
use crate::utils::errors::BotError;

/// Lifecycle status of a subscription attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    Pending,
    AwaitingAmount,
    AwaitingScreenshot,
    WrongAmount,
    Verified,
    Flagged,
}

impl SubscriptionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriptionStatus::Pending => "pending",
            SubscriptionStatus::AwaitingAmount => "awaiting_amount",
            SubscriptionStatus::AwaitingScreenshot => "awaiting_screenshot",
            SubscriptionStatus::WrongAmount => "wrong_amount",
            SubscriptionStatus::Verified => "verified",
            SubscriptionStatus::Flagged => "flagged",
        }
    }
}

impl fmt::Display for SubscriptionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SubscriptionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(SubscriptionStatus::Pending),
            "awaiting_amount" => Ok(SubscriptionStatus::AwaitingAmount),
            "awaiting_screenshot" => Ok(SubscriptionStatus::AwaitingScreenshot),
            "wrong_amount" => Ok(SubscriptionStatus::WrongAmount),
            "verified" => Ok(SubscriptionStatus::Verified),
            "flagged" => Ok(SubscriptionStatus::Flagged),
            other => Err(format!("unknown subscription status: {}", other)),
        }
    }
}

/// Durable snapshot of one purchase attempt, keyed by attempt id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubscriptionRecord {
    pub attempt_id: Uuid,
    pub user_id: i64,
    pub product_type: Option<ProductType>,
    pub duration: Option<PlanDuration>,
    pub payment_method: Option<PaymentMethod>,
    pub expected_amount: Option<u32>,
    pub is_promotional: bool,
    pub status: SubscriptionStatus,
    pub submitted_amount: Option<i64>,
    pub verification_note: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl SubscriptionRecord {
    /// Snapshot the selections currently held by `session`
    pub fn from_session(session: &Session, status: SubscriptionStatus) -> Self {
        Self {
            attempt_id: session.attempt_id(),
            user_id: session.user_id(),
            product_type: session.product_type(),
            duration: session.duration(),
            payment_method: session.payment_method(),
            expected_amount: session.expected_amount(),
            is_promotional: session.is_promotional(),
            status,
            submitted_amount: None,
            verification_note: None,
            updated_at: Utc::now(),
        }
    }

    pub fn with_submitted_amount(mut self, amount: i64) -> Self {
        self.submitted_amount = Some(amount);
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.verification_note = Some(note.into());
        self
    }
}

/// Row shape of the `subscription_attempts` table
#[derive(Debug, Clone, FromRow)]
pub struct SubscriptionRow {
    pub attempt_id: Uuid,
    pub user_id: i64,
    pub product_type: Option<String>,
    pub duration: Option<String>,
    pub payment_method: Option<String>,
    pub expected_amount: Option<i64>,
    pub is_promotional: bool,
    pub status: String,
    pub submitted_amount: Option<i64>,
    pub verification_note: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<SubscriptionRow> for SubscriptionRecord {
    type Error = BotError;

    fn try_from(row: SubscriptionRow) -> Result<Self, Self::Error> {
        let product_type = row.product_type
            .map(|p| p.parse::<ProductType>())
            .transpose()
            .map_err(BotError::Storage)?;
        let duration = row.duration
            .map(|d| PlanDuration::from_key(&d)
                .ok_or_else(|| BotError::Storage(format!("unknown duration: {}", d))))
            .transpose()?;
        let payment_method = row.payment_method
            .map(|m| m.parse::<PaymentMethod>())
            .transpose()
            .map_err(BotError::Storage)?;
        let expected_amount = row.expected_amount
            .map(u32::try_from)
            .transpose()
            .map_err(|e| BotError::Storage(format!("invalid expected amount: {}", e)))?;
        let status = row.status.parse::<SubscriptionStatus>().map_err(BotError::Storage)?;

        Ok(Self {
            attempt_id: row.attempt_id,
            user_id: row.user_id,
            product_type,
            duration,
            payment_method,
            expected_amount,
            is_promotional: row.is_promotional,
            status,
            submitted_amount: row.submitted_amount,
            verification_note: row.verification_note,
            updated_at: row.updated_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_from_session() {
        let mut session = Session::new(7, "ar");
        session.choose_product(ProductType::Live).unwrap();
        session.choose_payment(PaymentMethod::MobileCash, 700).unwrap();

        let record = SubscriptionRecord::from_session(&session, SubscriptionStatus::WrongAmount)
            .with_submitted_amount(500);

        assert_eq!(record.attempt_id, session.attempt_id());
        assert_eq!(record.product_type, Some(ProductType::Live));
        assert_eq!(record.duration, Some(PlanDuration::SingleLive));
        assert_eq!(record.expected_amount, Some(700));
        assert_eq!(record.submitted_amount, Some(500));
        assert_eq!(record.status, SubscriptionStatus::WrongAmount);
    }

    #[test]
    fn test_row_conversion() {
        let row = SubscriptionRow {
            attempt_id: Uuid::new_v4(),
            user_id: 1,
            product_type: Some("group".to_string()),
            duration: Some("6".to_string()),
            payment_method: Some("stars".to_string()),
            expected_amount: Some(900),
            is_promotional: false,
            status: "verified".to_string(),
            submitted_amount: Some(900),
            verification_note: None,
            updated_at: Utc::now(),
        };

        let record = SubscriptionRecord::try_from(row).unwrap();
        assert_eq!(record.duration, Some(PlanDuration::Months(6)));
        assert_eq!(record.payment_method, Some(PaymentMethod::Stars));
        assert_eq!(record.status, SubscriptionStatus::Verified);
    }

    #[test]
    fn test_row_with_unknown_status_is_rejected() {
        let row = SubscriptionRow {
            attempt_id: Uuid::new_v4(),
            user_id: 1,
            product_type: None,
            duration: None,
            payment_method: None,
            expected_amount: None,
            is_promotional: false,
            status: "refunded".to_string(),
            submitted_amount: None,
            verification_note: None,
            updated_at: Utc::now(),
        };

        assert!(SubscriptionRecord::try_from(row).is_err());
    }
}
