//! In-memory storage backend.
//!
//! Backs tests and runs without `DATABASE_URL`. State is lost on restart,
//! which matches the ephemeral nature of pending intents but means chat
//! logs and students do not survive either.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use school_assist_core::{
    AuditEntry, ChatLog, ChatUser, ClassArm, IntentKind, NewStudent, PendingIntent, School,
    SchoolClass, Student,
};
use tokio::sync::RwLock;

use crate::error::StorageError;
use crate::traits::{
    AuditStore, ChatLogStore, PendingIntentStore, SchoolStore, StudentStore, UserStore,
};

#[derive(Debug, Default)]
struct MemoryState {
    users: HashMap<String, ChatUser>,
    schools: HashMap<String, School>,
    classes: HashMap<String, SchoolClass>,
    arms: HashMap<String, ClassArm>,
    students: HashMap<String, Student>,
    chat_logs: Vec<ChatLog>,
    audit: Vec<AuditEntry>,
    pending: HashMap<(String, IntentKind), PendingIntent>,
}

#[derive(Clone, Debug, Default)]
pub struct MemoryStorage {
    state: Arc<RwLock<MemoryState>>,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryStorage {
    async fn get_user(&self, id: &str) -> Result<Option<ChatUser>, StorageError> {
        Ok(self.state.read().await.users.get(id).cloned())
    }

    async fn save_user(&self, user: &ChatUser) -> Result<(), StorageError> {
        self.state.write().await.users.insert(user.id.clone(), user.clone());
        Ok(())
    }
}

#[async_trait]
impl SchoolStore for MemoryStorage {
    async fn get_school(&self, id: &str) -> Result<Option<School>, StorageError> {
        Ok(self.state.read().await.schools.get(id).cloned())
    }

    async fn save_school(&self, school: &School) -> Result<(), StorageError> {
        self.state.write().await.schools.insert(school.id.clone(), school.clone());
        Ok(())
    }

    async fn list_classes(&self, school_id: &str) -> Result<Vec<SchoolClass>, StorageError> {
        let state = self.state.read().await;
        let mut classes: Vec<SchoolClass> =
            state.classes.values().filter(|c| c.school_id == school_id).cloned().collect();
        classes.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(classes)
    }

    async fn list_arms(&self, school_id: &str) -> Result<Vec<ClassArm>, StorageError> {
        let state = self.state.read().await;
        let mut arms: Vec<ClassArm> = state
            .arms
            .values()
            .filter(|a| {
                state.classes.get(&a.school_class_id).is_some_and(|c| c.school_id == school_id)
            })
            .cloned()
            .collect();
        arms.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
        Ok(arms)
    }

    async fn save_class(&self, class: &SchoolClass) -> Result<(), StorageError> {
        self.state.write().await.classes.insert(class.id.clone(), class.clone());
        Ok(())
    }

    async fn save_arm(&self, arm: &ClassArm) -> Result<(), StorageError> {
        let mut state = self.state.write().await;
        if !state.classes.contains_key(&arm.school_class_id) {
            return Err(StorageError::NotFound {
                entity: "school_class",
                id: arm.school_class_id.clone(),
            });
        }
        state.arms.insert(arm.id.clone(), arm.clone());
        Ok(())
    }

    async fn delete_class(&self, id: &str) -> Result<bool, StorageError> {
        let mut state = self.state.write().await;
        let existed = state.classes.remove(id).is_some();
        state.arms.retain(|_, a| a.school_class_id != id);
        Ok(existed)
    }
}

#[async_trait]
impl StudentStore for MemoryStorage {
    async fn create_student(&self, input: NewStudent) -> Result<Student, StorageError> {
        let student = Student::from_new(input, Utc::now());
        self.state.write().await.students.insert(student.id.clone(), student.clone());
        Ok(student)
    }

    async fn get_student(&self, id: &str) -> Result<Option<Student>, StorageError> {
        Ok(self.state.read().await.students.get(id).cloned())
    }

    async fn list_students(
        &self,
        school_id: &str,
        limit: usize,
    ) -> Result<Vec<Student>, StorageError> {
        let state = self.state.read().await;
        let mut students: Vec<Student> =
            state.students.values().filter(|s| s.school_id == school_id).cloned().collect();
        students.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        students.truncate(limit);
        Ok(students)
    }
}

#[async_trait]
impl ChatLogStore for MemoryStorage {
    async fn save_chat_log(&self, log: &ChatLog) -> Result<(), StorageError> {
        self.state.write().await.chat_logs.push(log.clone());
        Ok(())
    }

    async fn recent_chat_logs(
        &self,
        school_id: &str,
        user_id: Option<&str>,
        limit: usize,
    ) -> Result<Vec<ChatLog>, StorageError> {
        let state = self.state.read().await;
        // Rows are appended in arrival order; walking backwards yields newest first
        // even when two rows share a timestamp.
        Ok(state
            .chat_logs
            .iter()
            .rev()
            .filter(|l| l.school_id == school_id)
            .filter(|l| user_id.is_none_or(|u| l.user_id == u))
            .take(limit)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl AuditStore for MemoryStorage {
    async fn save_audit_entry(&self, entry: &AuditEntry) -> Result<(), StorageError> {
        self.state.write().await.audit.push(entry.clone());
        Ok(())
    }

    async fn audit_entries_for_user(
        &self,
        user_id: &str,
        limit: usize,
    ) -> Result<Vec<AuditEntry>, StorageError> {
        let state = self.state.read().await;
        Ok(state.audit.iter().rev().filter(|e| e.user_id == user_id).take(limit).cloned().collect())
    }
}

#[async_trait]
impl PendingIntentStore for MemoryStorage {
    async fn load_pending(
        &self,
        user_id: &str,
        kind: IntentKind,
        now: DateTime<Utc>,
    ) -> Result<Option<PendingIntent>, StorageError> {
        let key = (user_id.to_owned(), kind);
        let mut state = self.state.write().await;
        match state.pending.get(&key) {
            Some(intent) if intent.is_expired(now) => {
                state.pending.remove(&key);
                tracing::debug!(user_id, kind = kind.as_str(), "pending intent expired");
                Ok(None)
            },
            Some(intent) => Ok(Some(intent.clone())),
            None => Ok(None),
        }
    }

    async fn save_pending(&self, intent: &PendingIntent) -> Result<(), StorageError> {
        self.state
            .write()
            .await
            .pending
            .insert((intent.user_id.clone(), intent.kind), intent.clone());
        Ok(())
    }

    async fn delete_pending(&self, user_id: &str, kind: IntentKind) -> Result<bool, StorageError> {
        Ok(self.state.write().await.pending.remove(&(user_id.to_owned(), kind)).is_some())
    }

    async fn purge_expired_pending(&self, now: DateTime<Utc>) -> Result<usize, StorageError> {
        let mut state = self.state.write().await;
        let before = state.pending.len();
        state.pending.retain(|_, intent| !intent.is_expired(now));
        Ok(before.saturating_sub(state.pending.len()))
    }
}
