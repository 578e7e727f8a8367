//! Multi-turn "create student" conversation.
//!
//! Each message either continues the caller's pending intent, starts a new
//! one when it reads like `add a student ...`, or falls through (`None`) to
//! the general chat reply.

use std::sync::{Arc, LazyLock};

use chrono::{DateTime, Utc};
use regex::Regex;
use school_assist_core::{
    ChatUser, IntentKind, IntentStatus, PendingIntent, Permission, RequiredField,
    STUDENTS_LIST_PATH, School, StudentDraft, normalize_text,
};
use school_assist_storage::StorageBackend;
use school_assist_storage::traits::{PendingIntentStore, StudentStore};

use crate::catalog::ClassCatalogCache;
use crate::error::ServiceError;
use crate::extractor::{ExtractionContext, RuleBasedExtractor, StudentExtractor};
use crate::guide::FrontendLinks;
use crate::policy::{Authorizer, RolePolicy};

pub(crate) const CANCELLED_REPLY: &str = "Okay, I cancelled that student creation.";
pub(crate) const AWAITING_REPLY: &str =
    "Please reply CONFIRM to create the student, or CANCEL to stop.";

#[expect(clippy::unwrap_used, reason = "static regex pattern is compile-time validated")]
static TRIGGER_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(add|create|register)\s+(a\s+)?student\b").unwrap());

#[expect(clippy::unwrap_used, reason = "static regex pattern is compile-time validated")]
static CANCEL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(cancel|no|stop)\b").unwrap());

#[expect(clippy::unwrap_used, reason = "static regex pattern is compile-time validated")]
static CONFIRM_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(confirm|yes|yep|sure|go ahead|proceed)\b").unwrap());

const KIND: IntentKind = IntentKind::CreateStudent;

pub struct StudentFlow {
    storage: Arc<StorageBackend>,
    catalog: Arc<ClassCatalogCache>,
    extractor: Arc<dyn StudentExtractor>,
    authorizer: Arc<dyn Authorizer>,
    links: FrontendLinks,
    pending_ttl: chrono::Duration,
}

impl StudentFlow {
    /// Flow with the rule-based extractor and the standard role policy.
    #[must_use]
    pub fn new(
        storage: Arc<StorageBackend>,
        catalog: Arc<ClassCatalogCache>,
        links: FrontendLinks,
        pending_ttl: chrono::Duration,
    ) -> Self {
        Self {
            storage,
            catalog,
            extractor: Arc::new(RuleBasedExtractor::new()),
            authorizer: Arc::new(RolePolicy::standard()),
            links,
            pending_ttl,
        }
    }

    #[must_use]
    pub fn with_extractor(mut self, extractor: Arc<dyn StudentExtractor>) -> Self {
        self.extractor = extractor;
        self
    }

    #[must_use]
    pub fn with_authorizer(mut self, authorizer: Arc<dyn Authorizer>) -> Self {
        self.authorizer = authorizer;
        self
    }

    /// Handle one chat message. `Ok(None)` means the message is not part of
    /// a student creation.
    pub async fn handle(
        &self,
        user: &ChatUser,
        school: &School,
        message: &str,
    ) -> Result<Option<String>, ServiceError> {
        self.handle_at(user, school, message, Utc::now()).await
    }

    pub async fn handle_at(
        &self,
        user: &ChatUser,
        school: &School,
        message: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<String>, ServiceError> {
        let normalized = normalize_text(message).to_lowercase();

        match self.storage.load_pending(&user.id, KIND, now).await? {
            Some(intent) if intent.status == IntentStatus::AwaitingConfirmation => {
                self.resolve(user, school, intent, &normalized).await.map(Some)
            },
            Some(intent) => self.collect(school, intent, &normalized, now).await.map(Some),
            None if TRIGGER_REGEX.is_match(&normalized) => {
                self.start(user, school, &normalized, now).await.map(Some)
            },
            None => Ok(None),
        }
    }

    async fn start(
        &self,
        user: &ChatUser,
        school: &School,
        normalized: &str,
        now: DateTime<Utc>,
    ) -> Result<String, ServiceError> {
        self.authorizer.authorize(user, Permission::StudentsCreate)?;

        let catalog = self.catalog.get(&school.id).await?;
        let mut draft = self.extractor.extract(normalized, &ExtractionContext::new(&catalog));
        draft.apply_school_defaults(school);
        draft.apply_default_status();

        let intent = PendingIntent::begin(&user.id, KIND, draft, now, self.pending_ttl);
        self.storage.save_pending(&intent).await?;
        tracing::info!(
            user_id = %user.id,
            school_id = %school.id,
            status = %intent.status,
            missing = intent.missing.len(),
            "student creation started"
        );
        Ok(prompt_for(&intent))
    }

    async fn collect(
        &self,
        school: &School,
        mut intent: PendingIntent,
        normalized: &str,
        now: DateTime<Utc>,
    ) -> Result<String, ServiceError> {
        let catalog = self.catalog.get(&school.id).await?;
        let context = ExtractionContext::new(&catalog)
            .with_known_class(intent.draft.school_class_id.as_deref());
        let extracted = self.extractor.extract(normalized, &context);

        intent.draft.apply_school_defaults(school);
        intent.draft.apply_default_status();
        let status = intent.absorb(extracted, now, self.pending_ttl)?;
        self.storage.save_pending(&intent).await?;
        tracing::debug!(
            user_id = %intent.user_id,
            status = %status,
            missing = intent.missing.len(),
            "student draft updated"
        );
        Ok(prompt_for(&intent))
    }

    async fn resolve(
        &self,
        user: &ChatUser,
        school: &School,
        intent: PendingIntent,
        normalized: &str,
    ) -> Result<String, ServiceError> {
        if CANCEL_REGEX.is_match(normalized) {
            intent.cancel()?;
            self.storage.delete_pending(&user.id, KIND).await?;
            tracing::info!(user_id = %user.id, "student creation cancelled");
            return Ok(CANCELLED_REPLY.to_owned());
        }
        if !CONFIRM_REGEX.is_match(normalized) {
            return Ok(AWAITING_REPLY.to_owned());
        }

        self.authorizer.authorize(user, Permission::StudentsCreate)?;
        let mut draft = intent.confirm()?;

        let catalog = self.catalog.load_fresh(&school.id).await?;
        let class_still_valid = match (&draft.school_class_id, &draft.class_arm_id) {
            (Some(class_id), Some(arm_id)) => catalog.contains_pair(class_id, arm_id),
            _ => false,
        };
        if !class_still_valid {
            draft.clear_class();
            self.catalog.invalidate(&school.id).await;
            tracing::debug!(
                user_id = %user.id,
                school_id = %school.id,
                "drafted class no longer exists"
            );
        }

        let input = match draft.to_new_student(&school.id) {
            Ok(input) => input,
            Err(missing) => {
                self.storage.delete_pending(&user.id, KIND).await?;
                tracing::info!(
                    user_id = %user.id,
                    missing = missing.len(),
                    "student creation no longer complete at confirmation"
                );
                return Ok(missing_reply(&draft, &missing));
            },
        };

        let student = self.storage.create_student(input).await?;
        self.storage.delete_pending(&user.id, KIND).await?;
        tracing::info!(
            user_id = %user.id,
            school_id = %school.id,
            student_id = %student.id,
            "student created from chat"
        );
        Ok(format!(
            "Student created successfully. View students: {}",
            self.links.url(STUDENTS_LIST_PATH)
        ))
    }
}

fn prompt_for(intent: &PendingIntent) -> String {
    if intent.is_complete() {
        confirm_reply(&intent.draft)
    } else {
        missing_reply(&intent.draft, &intent.missing)
    }
}

pub(crate) fn missing_reply(draft: &StudentDraft, missing: &[RequiredField]) -> String {
    let mut parts = Vec::new();
    if let Some(name) = draft.display_name() {
        parts.push(format!("Student: {name}"));
    }
    if let Some(label) = draft.class_label.as_deref().filter(|l| !l.is_empty()) {
        parts.push(format!("Class: {label}"));
    }
    let summary = if parts.is_empty() { String::new() } else { format!("{}. ", parts.join(" · ")) };
    let labels: Vec<&str> = missing.iter().map(RequiredField::label).collect();
    format!("{summary}Please provide: {}.", labels.join(", "))
}

pub(crate) fn confirm_reply(draft: &StudentDraft) -> String {
    format!(
        "Please CONFIRM to create student {} in {} (gender: {}, DOB: {}, admission date: {}).",
        draft.display_name().unwrap_or_default(),
        draft.class_label.as_deref().unwrap_or("the selected class"),
        draft.gender.map(|g| g.as_str()).unwrap_or_default(),
        draft.date_of_birth.map(|d| d.to_string()).unwrap_or_default(),
        draft.admission_date.map(|d| d.to_string()).unwrap_or_default(),
    )
}
