//! Pending intents: the state machine behind multi-turn slot filling.
//!
//! A [`PendingIntent`] is keyed by `(user_id, kind)` and moves through
//!
//! ```text
//! collecting ──absorb──▶ collecting ──absorb──▶ awaiting_confirmation
//!                                                     │
//!                               confirm / cancel / expire (terminal)
//! ```
//!
//! Missing fields are recomputed from the whole draft on every turn.

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::CoreError;
use crate::school::School;
use crate::student::{DEFAULT_STUDENT_STATUS, Gender, NewStudent};

/// The kind of multi-turn action being collected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntentKind {
    CreateStudent,
}

impl IntentKind {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match *self {
            Self::CreateStudent => "create_student",
        }
    }
}

impl FromStr for IntentKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "create_student" => Ok(Self::CreateStudent),
            other => Err(CoreError::InvalidInput(format!("Invalid intent kind: {other}"))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntentStatus {
    Collecting,
    AwaitingConfirmation,
}

impl IntentStatus {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match *self {
            Self::Collecting => "collecting",
            Self::AwaitingConfirmation => "awaiting_confirmation",
        }
    }
}

impl Display for IntentStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

impl FromStr for IntentStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "collecting" => Ok(Self::Collecting),
            "awaiting_confirmation" => Ok(Self::AwaitingConfirmation),
            other => Err(CoreError::InvalidInput(format!("Invalid intent status: {other}"))),
        }
    }
}

/// How a pending intent left the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntentOutcome {
    Created,
    Cancelled,
    Expired,
}

/// Fields that must be present before a student can be created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequiredField {
    FirstName,
    LastName,
    Gender,
    DateOfBirth,
    CurrentSession,
    CurrentTerm,
    SchoolClass,
    ClassArm,
    AdmissionDate,
    Status,
}

impl RequiredField {
    /// Check order, which is also the order missing fields are reported in.
    pub const ALL: [RequiredField; 10] = [
        RequiredField::FirstName,
        RequiredField::LastName,
        RequiredField::Gender,
        RequiredField::DateOfBirth,
        RequiredField::CurrentSession,
        RequiredField::CurrentTerm,
        RequiredField::SchoolClass,
        RequiredField::ClassArm,
        RequiredField::AdmissionDate,
        RequiredField::Status,
    ];

    /// Column name of the field on the student record.
    #[must_use]
    pub const fn key(&self) -> &'static str {
        match *self {
            Self::FirstName => "first_name",
            Self::LastName => "last_name",
            Self::Gender => "gender",
            Self::DateOfBirth => "date_of_birth",
            Self::CurrentSession => "current_session_id",
            Self::CurrentTerm => "current_term_id",
            Self::SchoolClass => "school_class_id",
            Self::ClassArm => "class_arm_id",
            Self::AdmissionDate => "admission_date",
            Self::Status => "status",
        }
    }

    /// Human-readable label used when asking for the field.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match *self {
            Self::FirstName => "first name",
            Self::LastName => "last name",
            Self::Gender => "gender",
            Self::DateOfBirth => "date of birth (YYYY-MM-DD)",
            Self::CurrentSession => "current session (set in School Settings)",
            Self::CurrentTerm => "current term (set in School Settings)",
            Self::SchoolClass => "class",
            Self::ClassArm => "class arm",
            Self::AdmissionDate => "admission date (YYYY-MM-DD)",
            Self::Status => "status",
        }
    }
}

/// Partially collected student fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentDraft {
    pub first_name: Option<String>,
    pub middle_name: Option<String>,
    pub last_name: Option<String>,
    pub gender: Option<Gender>,
    pub date_of_birth: Option<NaiveDate>,
    pub admission_date: Option<NaiveDate>,
    pub current_session_id: Option<String>,
    pub current_term_id: Option<String>,
    pub school_class_id: Option<String>,
    pub class_arm_id: Option<String>,
    /// Display label of the matched class and arm, e.g. `Grade 3 A`.
    pub class_label: Option<String>,
    pub status: Option<String>,
}

fn present(value: Option<&String>) -> bool {
    value.is_some_and(|v| !v.trim().is_empty())
}

fn overwrite<T>(slot: &mut Option<T>, newer: Option<T>) {
    if let Some(value) = newer {
        *slot = Some(value);
    }
}

impl StudentDraft {
    /// Merge a newer extraction into this draft. Fields found in `newer`
    /// replace the stored ones; absent fields leave the stored value alone.
    pub fn merge(&mut self, newer: StudentDraft) {
        overwrite(&mut self.first_name, newer.first_name);
        overwrite(&mut self.middle_name, newer.middle_name);
        overwrite(&mut self.last_name, newer.last_name);
        overwrite(&mut self.gender, newer.gender);
        overwrite(&mut self.date_of_birth, newer.date_of_birth);
        overwrite(&mut self.admission_date, newer.admission_date);
        overwrite(&mut self.current_session_id, newer.current_session_id);
        overwrite(&mut self.current_term_id, newer.current_term_id);
        overwrite(&mut self.school_class_id, newer.school_class_id);
        overwrite(&mut self.class_arm_id, newer.class_arm_id);
        overwrite(&mut self.class_label, newer.class_label);
        overwrite(&mut self.status, newer.status);
    }

    /// Fill session and term from the school's current settings when the
    /// draft has none yet.
    pub fn apply_school_defaults(&mut self, school: &School) {
        if !present(self.current_session_id.as_ref()) {
            self.current_session_id.clone_from(&school.current_session_id);
        }
        if !present(self.current_term_id.as_ref()) {
            self.current_term_id.clone_from(&school.current_term_id);
        }
    }

    pub fn apply_default_status(&mut self) {
        if !present(self.status.as_ref()) {
            self.status = Some(DEFAULT_STUDENT_STATUS.to_owned());
        }
    }

    /// Forget the class selection, e.g. after it stopped resolving.
    pub fn clear_class(&mut self) {
        self.school_class_id = None;
        self.class_arm_id = None;
        self.class_label = None;
    }

    #[must_use]
    pub fn has(&self, field: RequiredField) -> bool {
        match field {
            RequiredField::FirstName => present(self.first_name.as_ref()),
            RequiredField::LastName => present(self.last_name.as_ref()),
            RequiredField::Gender => self.gender.is_some(),
            RequiredField::DateOfBirth => self.date_of_birth.is_some(),
            RequiredField::CurrentSession => present(self.current_session_id.as_ref()),
            RequiredField::CurrentTerm => present(self.current_term_id.as_ref()),
            RequiredField::SchoolClass => present(self.school_class_id.as_ref()),
            RequiredField::ClassArm => present(self.class_arm_id.as_ref()),
            RequiredField::AdmissionDate => self.admission_date.is_some(),
            RequiredField::Status => present(self.status.as_ref()),
        }
    }

    #[must_use]
    pub fn missing_fields(&self) -> Vec<RequiredField> {
        RequiredField::ALL.into_iter().filter(|f| !self.has(*f)).collect()
    }

    /// `First Last`, or `None` when neither part is known.
    #[must_use]
    pub fn display_name(&self) -> Option<String> {
        let name = format!(
            "{} {}",
            self.first_name.as_deref().unwrap_or(""),
            self.last_name.as_deref().unwrap_or("")
        );
        let name = name.trim();
        (!name.is_empty()).then(|| name.to_owned())
    }

    /// Build the insert payload, or report which fields are still missing.
    pub fn to_new_student(&self, school_id: &str) -> Result<NewStudent, Vec<RequiredField>> {
        match (
            &self.first_name,
            &self.last_name,
            self.gender,
            self.date_of_birth,
            &self.current_session_id,
            &self.current_term_id,
            &self.school_class_id,
            &self.class_arm_id,
            self.admission_date,
            &self.status,
        ) {
            (
                Some(first_name),
                Some(last_name),
                Some(gender),
                Some(date_of_birth),
                Some(current_session_id),
                Some(current_term_id),
                Some(school_class_id),
                Some(class_arm_id),
                Some(admission_date),
                Some(status),
            ) if self.missing_fields().is_empty() => Ok(NewStudent {
                school_id: school_id.to_owned(),
                first_name: first_name.clone(),
                middle_name: self.middle_name.clone().filter(|m| !m.trim().is_empty()),
                last_name: last_name.clone(),
                gender,
                date_of_birth,
                current_session_id: current_session_id.clone(),
                current_term_id: current_term_id.clone(),
                school_class_id: school_class_id.clone(),
                class_arm_id: class_arm_id.clone(),
                admission_date,
                status: status.to_lowercase(),
            }),
            _ => Err(self.missing_fields()),
        }
    }
}

/// A transition was requested from a state that does not allow it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("invalid pending intent transition: {action} while {status}")]
pub struct TransitionError {
    pub status: IntentStatus,
    pub action: &'static str,
}

/// In-progress slot-filling state for one user and one intent kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingIntent {
    pub user_id: String,
    pub kind: IntentKind,
    pub status: IntentStatus,
    pub draft: StudentDraft,
    pub missing: Vec<RequiredField>,
    pub updated_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// `now + ttl`, saturating at the latest representable instant.
fn expiry_after(now: DateTime<Utc>, ttl: Duration) -> DateTime<Utc> {
    now.checked_add_signed(ttl).unwrap_or(DateTime::<Utc>::MAX_UTC)
}

impl PendingIntent {
    /// Open a new intent from the first extraction. Lands directly in
    /// `awaiting_confirmation` when the first message was already complete.
    #[must_use]
    pub fn begin(
        user_id: &str,
        kind: IntentKind,
        draft: StudentDraft,
        now: DateTime<Utc>,
        ttl: Duration,
    ) -> Self {
        let mut intent = Self {
            user_id: user_id.to_owned(),
            kind,
            status: IntentStatus::Collecting,
            draft,
            missing: Vec::new(),
            updated_at: now,
            expires_at: expiry_after(now, ttl),
        };
        intent.recompute();
        intent
    }

    /// Merge another turn's extraction. Only valid while collecting.
    pub fn absorb(
        &mut self,
        newer: StudentDraft,
        now: DateTime<Utc>,
        ttl: Duration,
    ) -> Result<IntentStatus, TransitionError> {
        if self.status != IntentStatus::Collecting {
            return Err(TransitionError { status: self.status, action: "absorb" });
        }
        self.draft.merge(newer);
        self.touch(now, ttl);
        self.recompute();
        Ok(self.status)
    }

    /// Refresh the expiry without touching the collected data.
    pub fn touch(&mut self, now: DateTime<Utc>, ttl: Duration) {
        self.updated_at = now;
        self.expires_at = expiry_after(now, ttl);
    }

    /// Accept the collected draft. Only valid while awaiting confirmation.
    pub fn confirm(self) -> Result<StudentDraft, TransitionError> {
        match self.status {
            IntentStatus::AwaitingConfirmation => Ok(self.draft),
            status => Err(TransitionError { status, action: "confirm" }),
        }
    }

    /// Abandon the intent. Only valid while awaiting confirmation.
    pub fn cancel(self) -> Result<IntentOutcome, TransitionError> {
        match self.status {
            IntentStatus::AwaitingConfirmation => Ok(IntentOutcome::Cancelled),
            status => Err(TransitionError { status, action: "cancel" }),
        }
    }

    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.missing.is_empty()
    }

    fn recompute(&mut self) {
        self.missing = self.draft.missing_fields();
        self.status = if self.missing.is_empty() {
            IntentStatus::AwaitingConfirmation
        } else {
            IntentStatus::Collecting
        };
    }
}
