//! ChatLogStore and AuditStore implementations for PgStorage.

use async_trait::async_trait;
use school_assist_core::{AuditEntry, ChatIntent, ChatLog};
use sqlx::Row;
use sqlx::postgres::PgRow;

use super::{PgStorage, usize_to_i64};
use crate::error::StorageError;
use crate::traits::{AuditStore, ChatLogStore};

fn row_to_chat_log(row: &PgRow) -> Result<ChatLog, StorageError> {
    let intent = row
        .try_get::<Option<String>, _>("intent")?
        .map(|s| s.parse::<ChatIntent>())
        .transpose()?;
    Ok(ChatLog {
        id: row.try_get("id")?,
        school_id: row.try_get("school_id")?,
        user_id: row.try_get("user_id")?,
        user_message: row.try_get("user_message")?,
        assistant_reply: row.try_get("assistant_reply")?,
        intent,
        created_at: row.try_get("created_at")?,
    })
}

#[async_trait]
impl ChatLogStore for PgStorage {
    async fn save_chat_log(&self, log: &ChatLog) -> Result<(), StorageError> {
        sqlx::query(
            "INSERT INTO ai_chat_logs
               (id, school_id, user_id, user_message, assistant_reply, intent, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(&log.id)
        .bind(&log.school_id)
        .bind(&log.user_id)
        .bind(&log.user_message)
        .bind(&log.assistant_reply)
        .bind(log.intent.map(|i| i.as_str()))
        .bind(log.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn recent_chat_logs(
        &self,
        school_id: &str,
        user_id: Option<&str>,
        limit: usize,
    ) -> Result<Vec<ChatLog>, StorageError> {
        let rows = sqlx::query(
            "SELECT id, school_id, user_id, user_message, assistant_reply, intent, created_at
               FROM ai_chat_logs
              WHERE school_id = $1 AND ($2::TEXT IS NULL OR user_id = $2)
              ORDER BY created_at DESC
              LIMIT $3",
        )
        .bind(school_id)
        .bind(user_id)
        .bind(usize_to_i64(limit))
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(row_to_chat_log).collect()
    }
}

#[async_trait]
impl AuditStore for PgStorage {
    async fn save_audit_entry(&self, entry: &AuditEntry) -> Result<(), StorageError> {
        sqlx::query(
            "INSERT INTO audit_logs (id, user_id, action, description, created_at)
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(&entry.id)
        .bind(&entry.user_id)
        .bind(&entry.action)
        .bind(&entry.description)
        .bind(entry.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn audit_entries_for_user(
        &self,
        user_id: &str,
        limit: usize,
    ) -> Result<Vec<AuditEntry>, StorageError> {
        let rows = sqlx::query(
            "SELECT id, user_id, action, description, created_at FROM audit_logs
              WHERE user_id = $1 ORDER BY created_at DESC LIMIT $2",
        )
        .bind(user_id)
        .bind(usize_to_i64(limit))
        .fetch_all(&self.pool)
        .await?;
        rows.iter()
            .map(|r| {
                Ok(AuditEntry {
                    id: r.try_get("id")?,
                    user_id: r.try_get("user_id")?,
                    action: r.try_get("action")?,
                    description: r.try_get("description")?,
                    created_at: r.try_get("created_at")?,
                })
            })
            .collect()
    }
}
