//! Student records.

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Status given to students when none was stated.
pub const DEFAULT_STUDENT_STATUS: &str = "active";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl Gender {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match *self {
            Self::Male => "male",
            Self::Female => "female",
            Self::Other => "other",
        }
    }
}

impl Display for Gender {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

impl FromStr for Gender {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "male" => Ok(Self::Male),
            "female" => Ok(Self::Female),
            "other" => Ok(Self::Other),
            other => Err(CoreError::InvalidInput(format!("Invalid gender: {other}"))),
        }
    }
}

/// Fully validated input for a new student row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewStudent {
    pub school_id: String,
    pub first_name: String,
    pub middle_name: Option<String>,
    pub last_name: String,
    pub gender: Gender,
    pub date_of_birth: NaiveDate,
    pub current_session_id: String,
    pub current_term_id: String,
    pub school_class_id: String,
    pub class_arm_id: String,
    pub admission_date: NaiveDate,
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    pub id: String,
    pub school_id: String,
    pub first_name: String,
    pub middle_name: Option<String>,
    pub last_name: String,
    pub gender: Gender,
    pub date_of_birth: NaiveDate,
    pub current_session_id: String,
    pub current_term_id: String,
    pub school_class_id: String,
    pub class_arm_id: String,
    pub admission_date: NaiveDate,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

impl Student {
    /// Materialize a new record with a fresh id.
    #[must_use]
    pub fn from_new(input: NewStudent, created_at: DateTime<Utc>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            school_id: input.school_id,
            first_name: input.first_name,
            middle_name: input.middle_name,
            last_name: input.last_name,
            gender: input.gender,
            date_of_birth: input.date_of_birth,
            current_session_id: input.current_session_id,
            current_term_id: input.current_term_id,
            school_class_id: input.school_class_id,
            class_arm_id: input.class_arm_id,
            admission_date: input.admission_date,
            status: input.status.to_lowercase(),
            created_at,
        }
    }

    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}
