use chrono::NaiveDate;
use school_assist_core::{ClassArm, Gender, NewStudent};

use super::seeded_storage;
use crate::MemoryStorage;
use crate::traits::{SchoolStore, StudentStore};

#[tokio::test]
#[expect(clippy::unwrap_used, reason = "test code")]
async fn list_arms_is_scoped_to_school() {
    let storage = seeded_storage("s1").await;
    let classes = storage.list_classes("s1").await.unwrap();
    assert_eq!(classes.len(), 1);
    assert_eq!(classes[0].name, "Grade 3");

    let arms = storage.list_arms("s1").await.unwrap();
    assert_eq!(arms.len(), 1);
    assert!(storage.list_arms("s2").await.unwrap().is_empty());
}

#[tokio::test]
#[expect(clippy::unwrap_used, reason = "test code")]
async fn save_arm_requires_existing_class() {
    let storage = MemoryStorage::new();
    let err = storage
        .save_arm(&ClassArm {
            id: "arm".to_owned(),
            school_class_id: "missing".to_owned(),
            name: "A".to_owned(),
        })
        .await
        .unwrap_err();
    assert!(err.to_string().contains("missing"));
}

#[tokio::test]
#[expect(clippy::unwrap_used, reason = "test code")]
async fn delete_class_cascades_to_arms() {
    let storage = seeded_storage("s1").await;
    assert!(storage.delete_class("s1-grade3").await.unwrap());
    assert!(storage.list_arms("s1").await.unwrap().is_empty());
    assert!(!storage.delete_class("s1-grade3").await.unwrap());
}

#[tokio::test]
#[expect(clippy::unwrap_used, reason = "test code")]
async fn create_student_assigns_id_and_lowercases_status() {
    let storage = seeded_storage("s1").await;
    let student = storage
        .create_student(NewStudent {
            school_id: "s1".to_owned(),
            first_name: "John".to_owned(),
            middle_name: None,
            last_name: "Doe".to_owned(),
            gender: Gender::Male,
            date_of_birth: NaiveDate::from_ymd_opt(2010, 5, 1).unwrap(),
            current_session_id: "session-2024".to_owned(),
            current_term_id: "term-1".to_owned(),
            school_class_id: "s1-grade3".to_owned(),
            class_arm_id: "s1-grade3-a".to_owned(),
            admission_date: NaiveDate::from_ymd_opt(2024, 9, 1).unwrap(),
            status: "Active".to_owned(),
        })
        .await
        .unwrap();

    assert!(!student.id.is_empty());
    assert_eq!(student.status, "active");
    let fetched = storage.get_student(&student.id).await.unwrap().unwrap();
    assert_eq!(fetched.full_name(), "John Doe");
    assert_eq!(storage.list_students("s1", 10).await.unwrap().len(), 1);
}
