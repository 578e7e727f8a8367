//! Unified storage backend with enum dispatch.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use school_assist_core::{
    AuditEntry, ChatLog, ChatUser, ClassArm, IntentKind, NewStudent, PendingIntent, School,
    SchoolClass, Student,
};

use crate::error::StorageError;
use crate::memory::MemoryStorage;
use crate::pg_storage::PgStorage;
use crate::traits::{
    AuditStore, ChatLogStore, PendingIntentStore, SchoolStore, StudentStore, UserStore,
};

macro_rules! dispatch {
    ($self:expr, $trait:path, $method:ident ( $($arg:expr),* $(,)? )) => {
        match $self {
            StorageBackend::Memory(s) => <MemoryStorage as $trait>::$method(s, $($arg),*).await,
            StorageBackend::Postgres(s) => <PgStorage as $trait>::$method(s, $($arg),*).await,
        }
    };
}

#[derive(Clone, Debug)]
pub enum StorageBackend {
    Memory(MemoryStorage),
    Postgres(PgStorage),
}

impl StorageBackend {
    #[must_use]
    pub fn new_memory() -> Self {
        Self::Memory(MemoryStorage::new())
    }

    pub async fn new_postgres(database_url: &str) -> Result<Self, StorageError> {
        Ok(Self::Postgres(PgStorage::new(database_url).await?))
    }

    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Memory(_) => "memory",
            Self::Postgres(_) => "postgres",
        }
    }
}

// ── UserStore ────────────────────────────────────────────────────

#[async_trait]
impl UserStore for StorageBackend {
    async fn get_user(&self, id: &str) -> Result<Option<ChatUser>, StorageError> {
        dispatch!(self, UserStore, get_user(id))
    }

    async fn save_user(&self, user: &ChatUser) -> Result<(), StorageError> {
        dispatch!(self, UserStore, save_user(user))
    }
}

// ── SchoolStore ──────────────────────────────────────────────────

#[async_trait]
impl SchoolStore for StorageBackend {
    async fn get_school(&self, id: &str) -> Result<Option<School>, StorageError> {
        dispatch!(self, SchoolStore, get_school(id))
    }

    async fn save_school(&self, school: &School) -> Result<(), StorageError> {
        dispatch!(self, SchoolStore, save_school(school))
    }

    async fn list_classes(&self, school_id: &str) -> Result<Vec<SchoolClass>, StorageError> {
        dispatch!(self, SchoolStore, list_classes(school_id))
    }

    async fn list_arms(&self, school_id: &str) -> Result<Vec<ClassArm>, StorageError> {
        dispatch!(self, SchoolStore, list_arms(school_id))
    }

    async fn save_class(&self, class: &SchoolClass) -> Result<(), StorageError> {
        dispatch!(self, SchoolStore, save_class(class))
    }

    async fn save_arm(&self, arm: &ClassArm) -> Result<(), StorageError> {
        dispatch!(self, SchoolStore, save_arm(arm))
    }

    async fn delete_class(&self, id: &str) -> Result<bool, StorageError> {
        dispatch!(self, SchoolStore, delete_class(id))
    }
}

// ── StudentStore ─────────────────────────────────────────────────

#[async_trait]
impl StudentStore for StorageBackend {
    async fn create_student(&self, input: NewStudent) -> Result<Student, StorageError> {
        dispatch!(self, StudentStore, create_student(input))
    }

    async fn get_student(&self, id: &str) -> Result<Option<Student>, StorageError> {
        dispatch!(self, StudentStore, get_student(id))
    }

    async fn list_students(
        &self,
        school_id: &str,
        limit: usize,
    ) -> Result<Vec<Student>, StorageError> {
        dispatch!(self, StudentStore, list_students(school_id, limit))
    }
}

// ── ChatLogStore / AuditStore ────────────────────────────────────

#[async_trait]
impl ChatLogStore for StorageBackend {
    async fn save_chat_log(&self, log: &ChatLog) -> Result<(), StorageError> {
        dispatch!(self, ChatLogStore, save_chat_log(log))
    }

    async fn recent_chat_logs(
        &self,
        school_id: &str,
        user_id: Option<&str>,
        limit: usize,
    ) -> Result<Vec<ChatLog>, StorageError> {
        dispatch!(self, ChatLogStore, recent_chat_logs(school_id, user_id, limit))
    }
}

#[async_trait]
impl AuditStore for StorageBackend {
    async fn save_audit_entry(&self, entry: &AuditEntry) -> Result<(), StorageError> {
        dispatch!(self, AuditStore, save_audit_entry(entry))
    }

    async fn audit_entries_for_user(
        &self,
        user_id: &str,
        limit: usize,
    ) -> Result<Vec<AuditEntry>, StorageError> {
        dispatch!(self, AuditStore, audit_entries_for_user(user_id, limit))
    }
}

// ── PendingIntentStore ───────────────────────────────────────────

#[async_trait]
impl PendingIntentStore for StorageBackend {
    async fn load_pending(
        &self,
        user_id: &str,
        kind: IntentKind,
        now: DateTime<Utc>,
    ) -> Result<Option<PendingIntent>, StorageError> {
        dispatch!(self, PendingIntentStore, load_pending(user_id, kind, now))
    }

    async fn save_pending(&self, intent: &PendingIntent) -> Result<(), StorageError> {
        dispatch!(self, PendingIntentStore, save_pending(intent))
    }

    async fn delete_pending(&self, user_id: &str, kind: IntentKind) -> Result<bool, StorageError> {
        dispatch!(self, PendingIntentStore, delete_pending(user_id, kind))
    }

    async fn purge_expired_pending(&self, now: DateTime<Utc>) -> Result<usize, StorageError> {
        dispatch!(self, PendingIntentStore, purge_expired_pending(now))
    }
}
