//! Schools and their class catalog.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct School {
    pub id: String,
    pub name: String,
    pub current_session_id: Option<String>,
    pub current_term_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchoolClass {
    pub id: String,
    pub school_id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassArm {
    pub id: String,
    pub school_class_id: String,
    pub name: String,
}

/// Read-only snapshot of a school's classes and arms.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassCatalog {
    pub classes: Vec<SchoolClass>,
    pub arms: Vec<ClassArm>,
}

impl ClassCatalog {
    #[must_use]
    pub fn new(classes: Vec<SchoolClass>, arms: Vec<ClassArm>) -> Self {
        Self { classes, arms }
    }

    #[must_use]
    pub fn class_by_id(&self, id: &str) -> Option<&SchoolClass> {
        self.classes.iter().find(|c| c.id == id)
    }

    #[must_use]
    pub fn arm_by_id(&self, id: &str) -> Option<&ClassArm> {
        self.arms.iter().find(|a| a.id == id)
    }

    pub fn arms_of<'a>(&'a self, class_id: &'a str) -> impl Iterator<Item = &'a ClassArm> + 'a {
        self.arms.iter().filter(move |a| a.school_class_id == class_id)
    }

    /// Whether `arm_id` exists and belongs to `class_id`.
    #[must_use]
    pub fn contains_pair(&self, class_id: &str, arm_id: &str) -> bool {
        self.class_by_id(class_id).is_some()
            && self.arm_by_id(arm_id).is_some_and(|a| a.school_class_id == class_id)
    }
}
