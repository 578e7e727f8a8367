use async_trait::async_trait;
use chrono::{DateTime, Utc};
use school_assist_core::{IntentKind, PendingIntent};

use crate::error::StorageError;

/// Keyed, TTL-bound store of in-progress intents.
///
/// Expiry is explicit: implementations compare `expires_at` against the
/// caller's `now` instead of relying on eviction.
#[async_trait]
pub trait PendingIntentStore: Send + Sync {
    /// Load the live intent for `(user_id, kind)`. An expired intent is
    /// deleted and reported as absent.
    async fn load_pending(
        &self,
        user_id: &str,
        kind: IntentKind,
        now: DateTime<Utc>,
    ) -> Result<Option<PendingIntent>, StorageError>;

    /// Insert or replace the intent for its `(user_id, kind)` key.
    async fn save_pending(&self, intent: &PendingIntent) -> Result<(), StorageError>;

    /// Forget the intent. Returns `true` if one was stored.
    async fn delete_pending(&self, user_id: &str, kind: IntentKind) -> Result<bool, StorageError>;

    /// Delete every intent whose `expires_at` is at or before `now`.
    async fn purge_expired_pending(&self, now: DateTime<Utc>) -> Result<usize, StorageError>;
}
