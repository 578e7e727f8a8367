//! Users, roles and permissions.

use std::collections::BTreeSet;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Dashboard role of a user account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Staff,
    Parent,
    SuperAdmin,
    Accountant,
    Admin,
    Teacher,
}

impl Role {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match *self {
            Self::Staff => "staff",
            Self::Parent => "parent",
            Self::SuperAdmin => "super_admin",
            Self::Accountant => "accountant",
            Self::Admin => "admin",
            Self::Teacher => "teacher",
        }
    }
}

impl Display for Role {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "staff" => Ok(Self::Staff),
            "parent" => Ok(Self::Parent),
            "super_admin" => Ok(Self::SuperAdmin),
            "accountant" => Ok(Self::Accountant),
            "admin" => Ok(Self::Admin),
            "teacher" => Ok(Self::Teacher),
            other => Err(CoreError::InvalidInput(format!("Invalid role: {other}"))),
        }
    }
}

/// Capabilities checked by the authorization policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Permission {
    #[serde(rename = "students.view")]
    StudentsView,
    #[serde(rename = "students.create")]
    StudentsCreate,
    #[serde(rename = "students.update")]
    StudentsUpdate,
    #[serde(rename = "students.delete")]
    StudentsDelete,
    #[serde(rename = "ai.chat.history.school")]
    ChatHistorySchool,
}

impl Permission {
    pub const ALL: &'static [Permission] = &[
        Permission::StudentsView,
        Permission::StudentsCreate,
        Permission::StudentsUpdate,
        Permission::StudentsDelete,
        Permission::ChatHistorySchool,
    ];

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match *self {
            Self::StudentsView => "students.view",
            Self::StudentsCreate => "students.create",
            Self::StudentsUpdate => "students.update",
            Self::StudentsDelete => "students.delete",
            Self::ChatHistorySchool => "ai.chat.history.school",
        }
    }
}

impl Display for Permission {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

impl FromStr for Permission {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|p| p.as_str() == s.trim())
            .ok_or_else(|| CoreError::InvalidInput(format!("Invalid permission: {s}")))
    }
}

/// The authenticated caller of a chat request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatUser {
    pub id: String,
    pub school_id: Option<String>,
    pub role: Role,
    /// Grants held directly by the user, on top of the role's grants.
    #[serde(default)]
    pub permissions: BTreeSet<Permission>,
}

impl ChatUser {
    #[must_use]
    pub fn new(id: impl Into<String>, school_id: Option<String>, role: Role) -> Self {
        Self { id: id.into(), school_id, role, permissions: BTreeSet::new() }
    }

    #[must_use]
    pub fn with_permission(mut self, permission: Permission) -> Self {
        self.permissions.insert(permission);
        self
    }

    #[must_use]
    pub fn has_direct_permission(&self, permission: Permission) -> bool {
        self.permissions.contains(&permission)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_round_trip_through_str() {
        for role in [
            Role::Staff,
            Role::Parent,
            Role::SuperAdmin,
            Role::Accountant,
            Role::Admin,
            Role::Teacher,
        ] {
            assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
        }
        assert_eq!(" ADMIN ".parse::<Role>().unwrap(), Role::Admin);
        assert!("principal".parse::<Role>().is_err());
    }

    #[test]
    fn test_permission_serde_uses_dotted_names() {
        let json = serde_json::to_string(&Permission::StudentsCreate).unwrap();
        assert_eq!(json, "\"students.create\"");
        let parsed: Permission = "ai.chat.history.school".parse().unwrap();
        assert_eq!(parsed, Permission::ChatHistorySchool);
    }

    #[test]
    fn test_direct_permission() {
        let user = ChatUser::new("u1", Some("s1".to_owned()), Role::Teacher)
            .with_permission(Permission::StudentsCreate);
        assert!(user.has_direct_permission(Permission::StudentsCreate));
        assert!(!user.has_direct_permission(Permission::StudentsDelete));
    }
}
