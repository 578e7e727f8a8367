//! Shared fixtures for service tests.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};
use school_assist_core::{ChatUser, ClassArm, Role, School, SchoolClass};
use school_assist_storage::StorageBackend;
use school_assist_storage::traits::{SchoolStore, UserStore};

use crate::catalog::ClassCatalogCache;
use crate::guide::FrontendLinks;
use crate::settings::AssistantSettings;
use crate::student_flow::StudentFlow;

pub(crate) const SCHOOL_ID: &str = "school-1";
pub(crate) const FRONTEND: &str = "https://app.example.com";
pub(crate) const ADMIN_ID: &str = "user-admin";
pub(crate) const TEACHER_ID: &str = "user-teacher";

pub(crate) fn school() -> School {
    School {
        id: SCHOOL_ID.to_owned(),
        name: "Sunrise Academy".to_owned(),
        current_session_id: Some("session-2024".to_owned()),
        current_term_id: Some("term-1".to_owned()),
    }
}

pub(crate) fn admin() -> ChatUser {
    ChatUser::new(ADMIN_ID, Some(SCHOOL_ID.to_owned()), Role::Admin)
}

pub(crate) fn teacher() -> ChatUser {
    ChatUser::new(TEACHER_ID, Some(SCHOOL_ID.to_owned()), Role::Teacher)
}

pub(crate) fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, 6, 9, 0, 0).single().unwrap_or_default()
}

/// Storage with the school, its users and one class holding `arms`.
#[expect(clippy::unwrap_used, reason = "test code")]
pub(crate) async fn seeded_storage(class_name: &str, arms: &[&str]) -> Arc<StorageBackend> {
    let storage = Arc::new(StorageBackend::new_memory());
    storage.save_school(&school()).await.unwrap();
    storage.save_user(&admin()).await.unwrap();
    storage.save_user(&teacher()).await.unwrap();
    add_class(&storage, class_name, arms).await;
    storage
}

#[expect(clippy::unwrap_used, reason = "test code")]
pub(crate) async fn add_class(storage: &StorageBackend, class_name: &str, arms: &[&str]) -> String {
    let class_id = class_id(class_name);
    storage
        .save_class(&SchoolClass {
            id: class_id.clone(),
            school_id: SCHOOL_ID.to_owned(),
            name: class_name.to_owned(),
        })
        .await
        .unwrap();
    for arm in arms {
        storage
            .save_arm(&ClassArm {
                id: format!("{class_id}-{}", arm.to_lowercase()),
                school_class_id: class_id.clone(),
                name: (*arm).to_owned(),
            })
            .await
            .unwrap();
    }
    class_id
}

pub(crate) fn class_id(class_name: &str) -> String {
    class_name.to_lowercase().replace(' ', "-")
}

pub(crate) fn flow(storage: &Arc<StorageBackend>) -> StudentFlow {
    let catalog = Arc::new(ClassCatalogCache::new(Arc::clone(storage), Duration::ZERO));
    StudentFlow::new(
        Arc::clone(storage),
        catalog,
        FrontendLinks::new(FRONTEND),
        chrono::Duration::minutes(30),
    )
}

pub(crate) fn settings() -> AssistantSettings {
    AssistantSettings {
        frontend_url: FRONTEND.to_owned(),
        class_cache_ttl: Duration::ZERO,
        app_info_path: std::env::temp_dir().join("school-assist-missing-app-info.md"),
        ..AssistantSettings::default()
    }
}
