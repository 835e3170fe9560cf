//! Subscription attempt repository

use async_trait::async_trait;
use sqlx::PgPool;
use crate::database::log::SubscriptionLog;
use crate::models::{SubscriptionRecord, SubscriptionRow};
use crate::utils::errors::Result;

const SELECT_COLUMNS: &str = "a.attempt_id, a.user_id, a.product_type, a.duration, a.payment_method, \
    a.expected_amount, a.is_promotional, a.status, a.submitted_amount, a.verification_note, a.updated_at";

#[derive(Clone)]
#[derive(Debug)]
pub struct SubscriptionRepository {
    pool: PgPool,
}

impl SubscriptionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SubscriptionLog for SubscriptionRepository {
    async fn upsert(&self, record: &SubscriptionRecord) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO subscription_attempts
                (attempt_id, user_id, product_type, duration, payment_method, expected_amount,
                 is_promotional, status, submitted_amount, verification_note, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            ON CONFLICT (attempt_id) DO UPDATE
            SET product_type = EXCLUDED.product_type,
                duration = EXCLUDED.duration,
                payment_method = EXCLUDED.payment_method,
                expected_amount = EXCLUDED.expected_amount,
                is_promotional = EXCLUDED.is_promotional,
                status = EXCLUDED.status,
                submitted_amount = EXCLUDED.submitted_amount,
                verification_note = EXCLUDED.verification_note,
                updated_at = EXCLUDED.updated_at
            "#
        )
        .bind(record.attempt_id)
        .bind(record.user_id)
        .bind(record.product_type.map(|p| p.as_str()))
        .bind(record.duration.map(|d| d.as_key()))
        .bind(record.payment_method.map(|m| m.as_str()))
        .bind(record.expected_amount.map(i64::from))
        .bind(record.is_promotional)
        .bind(record.status.as_str())
        .bind(record.submitted_amount)
        .bind(record.verification_note.as_deref())
        .bind(record.updated_at)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO current_attempts (user_id, attempt_id, updated_at)
            VALUES ($1, $2, $3)
            ON CONFLICT (user_id) DO UPDATE
            SET attempt_id = EXCLUDED.attempt_id,
                updated_at = EXCLUDED.updated_at
            "#
        )
        .bind(record.user_id)
        .bind(record.attempt_id)
        .bind(record.updated_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn current_for_user(&self, user_id: i64) -> Result<Option<SubscriptionRecord>> {
        let row = sqlx::query_as::<_, SubscriptionRow>(&format!(
            "SELECT {} FROM current_attempts c JOIN subscription_attempts a ON a.attempt_id = c.attempt_id WHERE c.user_id = $1",
            SELECT_COLUMNS
        ))
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(SubscriptionRecord::try_from).transpose()
    }

    async fn history_for_user(&self, user_id: i64) -> Result<Vec<SubscriptionRecord>> {
        let rows = sqlx::query_as::<_, SubscriptionRow>(&format!(
            "SELECT {} FROM subscription_attempts a WHERE a.user_id = $1 ORDER BY a.updated_at ASC",
            SELECT_COLUMNS
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(SubscriptionRecord::try_from).collect()
    }
}
