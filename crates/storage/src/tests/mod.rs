//! Test utilities and module declarations for storage tests.

use school_assist_core::{ClassArm, School, SchoolClass};

use crate::MemoryStorage;
use crate::traits::SchoolStore;

pub fn test_school(id: &str) -> School {
    School {
        id: id.to_owned(),
        name: format!("School {id}"),
        current_session_id: Some("session-2024".to_owned()),
        current_term_id: Some("term-1".to_owned()),
    }
}

#[expect(clippy::unwrap_used, reason = "test code")]
pub async fn seeded_storage(school_id: &str) -> MemoryStorage {
    let storage = MemoryStorage::new();
    storage.save_school(&test_school(school_id)).await.unwrap();
    storage
        .save_class(&SchoolClass {
            id: format!("{school_id}-grade3"),
            school_id: school_id.to_owned(),
            name: "Grade 3".to_owned(),
        })
        .await
        .unwrap();
    storage
        .save_arm(&ClassArm {
            id: format!("{school_id}-grade3-a"),
            school_class_id: format!("{school_id}-grade3"),
            name: "A".to_owned(),
        })
        .await
        .unwrap();
    storage
}

mod chat_tests;
mod school_tests;
