//! Integration tests for PgStorage.
//! Run with: DATABASE_URL=... cargo test -p school-assist-storage -- --ignored pg_

#![allow(clippy::unwrap_used, reason = "integration test code")]

use chrono::{Duration, NaiveDate, Utc};
use school_assist_core::{
    AuditEntry, ChatIntent, ChatLog, ChatUser, ClassArm, Gender, IntentKind, IntentStatus,
    NewStudent, PendingIntent, Permission, Role, School, SchoolClass, StudentDraft,
};
use school_assist_storage::PgStorage;
use school_assist_storage::traits::{
    AuditStore, ChatLogStore, PendingIntentStore, SchoolStore, StudentStore, UserStore,
};
use uuid::Uuid;

async fn create_pg_storage() -> PgStorage {
    let url = std::env::var("DATABASE_URL")
        .expect("DATABASE_URL must be set for PgStorage integration tests");
    PgStorage::new(&url).await.expect("Failed to connect to PostgreSQL")
}

fn unique_id() -> String {
    format!("test-{}", Uuid::new_v4())
}

async fn seed_school(storage: &PgStorage) -> (School, SchoolClass, ClassArm) {
    let school = School {
        id: unique_id(),
        name: "Integration School".to_owned(),
        current_session_id: Some("session-2024".to_owned()),
        current_term_id: Some("term-1".to_owned()),
    };
    storage.save_school(&school).await.unwrap();
    let class =
        SchoolClass { id: unique_id(), school_id: school.id.clone(), name: "Grade 3".to_owned() };
    storage.save_class(&class).await.unwrap();
    let arm = ClassArm { id: unique_id(), school_class_id: class.id.clone(), name: "A".to_owned() };
    storage.save_arm(&arm).await.unwrap();
    (school, class, arm)
}

// ── Users & Schools ──────────────────────────────────────────────

#[tokio::test]
#[ignore]
async fn pg_user_roundtrip_keeps_permissions() {
    let storage = create_pg_storage().await;
    let (school, _, _) = seed_school(&storage).await;
    let user = ChatUser::new(unique_id(), Some(school.id.clone()), Role::Teacher)
        .with_permission(Permission::StudentsCreate);
    storage.save_user(&user).await.unwrap();

    let fetched = storage.get_user(&user.id).await.unwrap().unwrap();
    assert_eq!(fetched.role, Role::Teacher);
    assert_eq!(fetched.school_id.as_deref(), Some(school.id.as_str()));
    assert!(fetched.has_direct_permission(Permission::StudentsCreate));
    assert!(!fetched.has_direct_permission(Permission::StudentsDelete));
}

#[tokio::test]
#[ignore]
async fn pg_delete_class_cascades_arms() {
    let storage = create_pg_storage().await;
    let (school, class, _) = seed_school(&storage).await;
    assert_eq!(storage.list_arms(&school.id).await.unwrap().len(), 1);

    assert!(storage.delete_class(&class.id).await.unwrap());
    assert!(storage.list_arms(&school.id).await.unwrap().is_empty());
}

// ── Students ─────────────────────────────────────────────────────

#[tokio::test]
#[ignore]
async fn pg_create_and_get_student() {
    let storage = create_pg_storage().await;
    let (school, class, arm) = seed_school(&storage).await;
    let student = storage
        .create_student(NewStudent {
            school_id: school.id.clone(),
            first_name: "John".to_owned(),
            middle_name: Some("Michael".to_owned()),
            last_name: "Doe".to_owned(),
            gender: Gender::Male,
            date_of_birth: NaiveDate::from_ymd_opt(2010, 5, 1).unwrap(),
            current_session_id: "session-2024".to_owned(),
            current_term_id: "term-1".to_owned(),
            school_class_id: class.id.clone(),
            class_arm_id: arm.id.clone(),
            admission_date: NaiveDate::from_ymd_opt(2024, 9, 1).unwrap(),
            status: "active".to_owned(),
        })
        .await
        .unwrap();

    let fetched = storage.get_student(&student.id).await.unwrap().unwrap();
    assert_eq!(fetched.full_name(), "John Doe");
    assert_eq!(fetched.gender, Gender::Male);
    assert_eq!(fetched.date_of_birth, student.date_of_birth);
    assert_eq!(storage.list_students(&school.id, 5).await.unwrap().len(), 1);
}

// ── Chat logs & audit ────────────────────────────────────────────

#[tokio::test]
#[ignore]
async fn pg_recent_chat_logs_filter_by_user() {
    let storage = create_pg_storage().await;
    let (school, _, _) = seed_school(&storage).await;
    let school_id = school.id;
    let alice = unique_id();
    let bob = unique_id();
    for id in [&alice, &bob] {
        let user = ChatUser::new(id.clone(), Some(school_id.clone()), Role::Staff);
        storage.save_user(&user).await.unwrap();
    }
    for user in [&alice, &bob, &alice] {
        let log = ChatLog::new(&school_id, user, "hello", "hi", Some(ChatIntent::Create));
        storage.save_chat_log(&log).await.unwrap();
    }

    assert_eq!(storage.recent_chat_logs(&school_id, None, 10).await.unwrap().len(), 3);
    let mine = storage.recent_chat_logs(&school_id, Some(&alice), 10).await.unwrap();
    assert_eq!(mine.len(), 2);
    assert!(mine.iter().all(|l| l.intent == Some(ChatIntent::Create)));
}

#[tokio::test]
#[ignore]
async fn pg_audit_entry_roundtrip() {
    let storage = create_pg_storage().await;
    let user_id = unique_id();
    let entry = AuditEntry::chat(&user_id, "s1", None, "hello");
    storage.save_audit_entry(&entry).await.unwrap();

    let entries = storage.audit_entries_for_user(&user_id, 5).await.unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].description, entry.description);
}

// ── Pending intents ──────────────────────────────────────────────

#[tokio::test]
#[ignore]
async fn pg_pending_intent_upsert_and_expiry() {
    let storage = create_pg_storage().await;
    let user_id = unique_id();
    let now = Utc::now();
    let draft = StudentDraft {
        first_name: Some("John".to_owned()),
        last_name: Some("Doe".to_owned()),
        ..StudentDraft::default()
    };
    let mut intent =
        PendingIntent::begin(&user_id, IntentKind::CreateStudent, draft, now, Duration::minutes(30));
    storage.save_pending(&intent).await.unwrap();

    intent
        .absorb(
            StudentDraft { gender: Some(Gender::Female), ..StudentDraft::default() },
            now,
            Duration::minutes(30),
        )
        .unwrap();
    storage.save_pending(&intent).await.unwrap();

    let loaded =
        storage.load_pending(&user_id, IntentKind::CreateStudent, now).await.unwrap().unwrap();
    assert_eq!(loaded.draft.gender, Some(Gender::Female));
    assert_eq!(loaded.status, IntentStatus::Collecting);
    assert_eq!(loaded.missing, intent.missing);

    let later = now + Duration::minutes(31);
    assert!(storage.load_pending(&user_id, IntentKind::CreateStudent, later).await.unwrap().is_none());
    assert!(!storage.delete_pending(&user_id, IntentKind::CreateStudent).await.unwrap());
}
