//! PendingIntentStore implementation for PgStorage.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use school_assist_core::{IntentKind, IntentStatus, PendingIntent, RequiredField, StudentDraft};
use sqlx::Row;
use sqlx::postgres::PgRow;

use super::PgStorage;
use crate::error::StorageError;
use crate::traits::PendingIntentStore;

fn row_to_pending(row: &PgRow) -> Result<PendingIntent, StorageError> {
    let kind: IntentKind = row.try_get::<String, _>("kind")?.parse()?;
    let status: IntentStatus = row.try_get::<String, _>("status")?.parse()?;
    let draft: StudentDraft = serde_json::from_value(row.try_get("draft")?)?;
    let missing: Vec<RequiredField> = serde_json::from_value(row.try_get("missing")?)?;
    Ok(PendingIntent {
        user_id: row.try_get("user_id")?,
        kind,
        status,
        draft,
        missing,
        updated_at: row.try_get("updated_at")?,
        expires_at: row.try_get("expires_at")?,
    })
}

#[async_trait]
impl PendingIntentStore for PgStorage {
    async fn load_pending(
        &self,
        user_id: &str,
        kind: IntentKind,
        now: DateTime<Utc>,
    ) -> Result<Option<PendingIntent>, StorageError> {
        let row = sqlx::query(
            "SELECT user_id, kind, status, draft, missing, updated_at, expires_at
               FROM pending_intents WHERE user_id = $1 AND kind = $2",
        )
        .bind(user_id)
        .bind(kind.as_str())
        .fetch_optional(&self.pool)
        .await?;
        let Some(row) = row else {
            return Ok(None);
        };
        let intent = row_to_pending(&row)?;
        if intent.is_expired(now) {
            // Guard on expires_at so a concurrent save that refreshed the TTL survives.
            sqlx::query(
                "DELETE FROM pending_intents WHERE user_id = $1 AND kind = $2 AND expires_at <= $3",
            )
            .bind(user_id)
            .bind(kind.as_str())
            .bind(now)
            .execute(&self.pool)
            .await?;
            tracing::debug!(user_id, kind = kind.as_str(), "pending intent expired");
            return Ok(None);
        }
        Ok(Some(intent))
    }

    async fn save_pending(&self, intent: &PendingIntent) -> Result<(), StorageError> {
        sqlx::query(
            "INSERT INTO pending_intents
               (user_id, kind, status, draft, missing, updated_at, expires_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             ON CONFLICT (user_id, kind) DO UPDATE SET
               status = EXCLUDED.status,
               draft = EXCLUDED.draft,
               missing = EXCLUDED.missing,
               updated_at = EXCLUDED.updated_at,
               expires_at = EXCLUDED.expires_at",
        )
        .bind(&intent.user_id)
        .bind(intent.kind.as_str())
        .bind(intent.status.as_str())
        .bind(serde_json::to_value(&intent.draft)?)
        .bind(serde_json::to_value(&intent.missing)?)
        .bind(intent.updated_at)
        .bind(intent.expires_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn delete_pending(&self, user_id: &str, kind: IntentKind) -> Result<bool, StorageError> {
        let result = sqlx::query("DELETE FROM pending_intents WHERE user_id = $1 AND kind = $2")
            .bind(user_id)
            .bind(kind.as_str())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn purge_expired_pending(&self, now: DateTime<Utc>) -> Result<usize, StorageError> {
        let result = sqlx::query("DELETE FROM pending_intents WHERE expires_at <= $1")
            .bind(now)
            .execute(&self.pool)
            .await?;
        Ok(usize::try_from(result.rows_affected()).unwrap_or(usize::MAX))
    }
}
