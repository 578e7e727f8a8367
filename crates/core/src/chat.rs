//! Chat intents, chat logs and audit entries.

use std::str::FromStr;
use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::constants::AUDIT_MESSAGE_MAX_CHARS;
use crate::error::CoreError;
use crate::text::truncate_chars;

/// Coarse purpose of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatIntent {
    Create,
    Edit,
    Delete,
}

#[expect(clippy::unwrap_used, reason = "static regex pattern is compile-time validated")]
static DELETE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(delete|remove|erase)\b").unwrap());

#[expect(clippy::unwrap_used, reason = "static regex pattern is compile-time validated")]
static CREATE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(create|add|new)\b").unwrap());

#[expect(clippy::unwrap_used, reason = "static regex pattern is compile-time validated")]
static EDIT_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(edit|update|change)\b").unwrap());

impl ChatIntent {
    /// Classify a message. Delete wins over create, create over edit.
    #[must_use]
    pub fn detect(message: &str) -> Option<Self> {
        if DELETE_REGEX.is_match(message) {
            Some(Self::Delete)
        } else if CREATE_REGEX.is_match(message) {
            Some(Self::Create)
        } else if EDIT_REGEX.is_match(message) {
            Some(Self::Edit)
        } else {
            None
        }
    }

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match *self {
            Self::Create => "create",
            Self::Edit => "edit",
            Self::Delete => "delete",
        }
    }
}

impl FromStr for ChatIntent {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "create" => Ok(Self::Create),
            "edit" => Ok(Self::Edit),
            "delete" => Ok(Self::Delete),
            other => Err(CoreError::InvalidInput(format!("Invalid chat intent: {other}"))),
        }
    }
}

/// One persisted exchange between a user and the assistant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatLog {
    pub id: String,
    pub school_id: String,
    pub user_id: String,
    pub user_message: String,
    pub assistant_reply: String,
    pub intent: Option<ChatIntent>,
    pub created_at: DateTime<Utc>,
}

impl ChatLog {
    #[must_use]
    pub fn new(
        school_id: &str,
        user_id: &str,
        user_message: &str,
        assistant_reply: &str,
        intent: Option<ChatIntent>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            school_id: school_id.to_owned(),
            user_id: user_id.to_owned(),
            user_message: user_message.to_owned(),
            assistant_reply: assistant_reply.to_owned(),
            intent,
            created_at: Utc::now(),
        }
    }
}

/// Audit trail row written for every chat request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEntry {
    pub id: String,
    pub user_id: String,
    pub action: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl AuditEntry {
    pub const CHAT_ACTION: &'static str = "ai.chat";

    #[must_use]
    pub fn chat(user_id: &str, school_id: &str, intent: Option<ChatIntent>, message: &str) -> Self {
        let description = format!(
            "school_id={}; intent={}; message={}",
            school_id,
            intent.map_or("none", |i| i.as_str()),
            truncate_chars(message, AUDIT_MESSAGE_MAX_CHARS),
        );
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: user_id.to_owned(),
            action: Self::CHAT_ACTION.to_owned(),
            description: Some(description),
            created_at: Utc::now(),
        }
    }
}

/// Which rows a history request asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HistoryScope {
    #[default]
    School,
    Mine,
}

impl FromStr for HistoryScope {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "school" => Ok(Self::School),
            "mine" | "user" | "self" => Ok(Self::Mine),
            other => Err(CoreError::InvalidInput(format!("Invalid history scope: {other}"))),
        }
    }
}
