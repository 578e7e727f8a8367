use async_trait::async_trait;
use school_assist_core::{AuditEntry, ChatLog};

use crate::error::StorageError;

/// Chat exchange log.
#[async_trait]
pub trait ChatLogStore: Send + Sync {
    /// Append a chat log row.
    async fn save_chat_log(&self, log: &ChatLog) -> Result<(), StorageError>;

    /// Newest `limit` rows of a school, optionally narrowed to one user,
    /// ordered newest first.
    async fn recent_chat_logs(
        &self,
        school_id: &str,
        user_id: Option<&str>,
        limit: usize,
    ) -> Result<Vec<ChatLog>, StorageError>;
}

/// Append-only audit trail.
#[async_trait]
pub trait AuditStore: Send + Sync {
    /// Append an audit entry.
    async fn save_audit_entry(&self, entry: &AuditEntry) -> Result<(), StorageError>;

    /// Audit entries of one user, newest first.
    async fn audit_entries_for_user(
        &self,
        user_id: &str,
        limit: usize,
    ) -> Result<Vec<AuditEntry>, StorageError>;
}
