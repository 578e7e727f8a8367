use std::sync::Arc;
use std::time::Duration;

use chrono::Duration as ChronoDuration;
use school_assist_core::{
    ChatIntent, ChatLog, ChatUser, HistoryScope, IntentKind, Permission, Role,
};
use school_assist_storage::StorageBackend;
use school_assist_storage::traits::{AuditStore, ChatLogStore, PendingIntentStore};
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::chat_service::{ChatService, DELETE_DENIED_REPLY};
use crate::error::ServiceError;
use crate::settings::AssistantSettings;
use crate::test_support::{
    ADMIN_ID, SCHOOL_ID, TEACHER_ID, admin, seeded_storage, settings, t0, teacher,
};

const FULL_MESSAGE: &str = "add student John Michael Doe male dob 2010-05-01 admission 2024-09-01";

#[expect(clippy::unwrap_used, reason = "test code")]
fn service(storage: &Arc<StorageBackend>, settings: AssistantSettings) -> ChatService {
    ChatService::new(Arc::clone(storage), settings).unwrap()
}

fn ai_settings(uri: &str) -> AssistantSettings {
    let mut settings = settings();
    settings.ai.enabled = true;
    settings.ai.api_key = Some("test-key".to_owned());
    settings.ai.base_url = uri.to_owned();
    settings.ai.timeout = Duration::from_secs(5);
    settings
}

fn completion(content: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(serde_json::json!({
        "choices": [{ "message": { "role": "assistant", "content": content } }]
    }))
}

#[tokio::test]
#[expect(clippy::unwrap_used, reason = "test code")]
async fn student_flow_reply_is_returned_and_logged() {
    let storage = seeded_storage("Grade 3", &["A"]).await;
    let service = service(&storage, settings());

    let reply = service.handle_at(&admin(), FULL_MESSAGE, t0()).await.unwrap();
    assert!(reply.reply.starts_with("Please CONFIRM to create student John Doe in Grade 3 A"));
    assert_eq!(reply.intent, Some(ChatIntent::Create));
    assert!(reply.can_delete);
    assert_eq!(
        reply.suggestions,
        vec!["Add a new student", "Create a new class", "Add a new staff member"]
    );

    let logs = storage.recent_chat_logs(SCHOOL_ID, Some(ADMIN_ID), 10).await.unwrap();
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].user_message, FULL_MESSAGE);
    assert_eq!(logs[0].assistant_reply, reply.reply);
    assert_eq!(logs[0].intent, Some(ChatIntent::Create));

    let audit = storage.audit_entries_for_user(ADMIN_ID, 10).await.unwrap();
    assert_eq!(audit.len(), 1);
    assert_eq!(audit[0].action, "ai.chat");
    assert_eq!(
        audit[0].description.as_deref(),
        Some(format!("school_id={SCHOOL_ID}; intent=create; message={FULL_MESSAGE}").as_str())
    );
}

#[tokio::test]
#[expect(clippy::unwrap_used, reason = "test code")]
async fn message_is_trimmed_before_handling() {
    let storage = seeded_storage("Grade 3", &["A"]).await;
    let service = service(&storage, settings());

    service.handle_at(&admin(), "   hello   ", t0()).await.unwrap();
    let logs = storage.recent_chat_logs(SCHOOL_ID, None, 10).await.unwrap();
    assert_eq!(logs[0].user_message, "hello");
}

#[tokio::test]
#[expect(clippy::unwrap_used, reason = "test code")]
async fn delete_without_permission_is_refused() {
    let storage = seeded_storage("Grade 3", &["A"]).await;
    let service = service(&storage, settings());

    let reply = service.handle_at(&teacher(), "Delete student John Doe", t0()).await.unwrap();
    assert_eq!(reply.reply, DELETE_DENIED_REPLY);
    assert_eq!(reply.intent, Some(ChatIntent::Delete));
    assert!(!reply.can_delete);
    assert_eq!(reply.suggestions, vec!["Contact your admin to approve the delete request"]);

    let admin_reply = service.handle_at(&admin(), "Delete student John Doe", t0()).await.unwrap();
    assert_ne!(admin_reply.reply, DELETE_DENIED_REPLY);
    assert!(admin_reply.reply.starts_with("Hi! I'm your assistant for Sunrise Academy. "));
}

#[tokio::test]
#[expect(clippy::unwrap_used, reason = "test code")]
async fn default_reply_when_assistant_disabled() {
    let storage = seeded_storage("Grade 3", &["A"]).await;
    let service = service(&storage, settings());
    assert!(!service.assistant_enabled());

    let reply = service.handle_at(&teacher(), "Where can I view students?", t0()).await.unwrap();
    assert_eq!(
        reply.reply,
        "Hi! I'm your assistant for Sunrise Academy. \
         Open https://app.example.com/v14/all-students to view students."
    );
    assert_eq!(reply.intent, None);
    assert_eq!(reply.suggestions[0], "How do I add a student?");
}

#[tokio::test]
#[expect(clippy::unwrap_used, reason = "test code")]
async fn invalid_messages_are_rejected() {
    let storage = seeded_storage("Grade 3", &["A"]).await;
    let service = service(&storage, settings());

    let err = service.handle_at(&admin(), "   ", t0()).await.unwrap_err();
    assert!(matches!(err, ServiceError::InvalidInput(_)), "{err}");

    let too_long = "a".repeat(2001);
    let err = service.handle_at(&admin(), &too_long, t0()).await.unwrap_err();
    assert!(matches!(err, ServiceError::InvalidInput(_)), "{err}");

    service.handle_at(&admin(), &"b".repeat(2000), t0()).await.unwrap();
    assert_eq!(storage.recent_chat_logs(SCHOOL_ID, None, 10).await.unwrap().len(), 1);
}

#[tokio::test]
#[expect(clippy::unwrap_used, reason = "test code")]
async fn callers_without_a_school_are_unauthorized() {
    let storage = seeded_storage("Grade 3", &["A"]).await;
    let service = service(&storage, settings());

    let orphan = ChatUser::new("user-orphan", None, Role::Admin);
    let err = service.handle_at(&orphan, "hello", t0()).await.unwrap_err();
    assert!(matches!(err, ServiceError::Unauthorized(_)), "{err}");

    let unknown_school = ChatUser::new("user-x", Some("school-missing".to_owned()), Role::Admin);
    let err = service.handle_at(&unknown_school, "hello", t0()).await.unwrap_err();
    assert!(matches!(err, ServiceError::Unauthorized(_)), "{err}");

    let err = service.history(&orphan, None, HistoryScope::School).await.unwrap_err();
    assert!(matches!(err, ServiceError::Unauthorized(_)), "{err}");
}

#[tokio::test]
#[expect(clippy::unwrap_used, reason = "test code")]
async fn forbidden_student_creation_writes_no_log() {
    let storage = seeded_storage("Grade 3", &["A"]).await;
    let service = service(&storage, settings());

    let err = service.handle_at(&teacher(), FULL_MESSAGE, t0()).await.unwrap_err();
    assert!(matches!(err, ServiceError::Forbidden(Permission::StudentsCreate)), "{err}");
    assert!(storage.recent_chat_logs(SCHOOL_ID, None, 10).await.unwrap().is_empty());
}

#[tokio::test]
#[expect(clippy::unwrap_used, reason = "test code")]
async fn resolve_user_reads_storage() {
    let storage = seeded_storage("Grade 3", &["A"]).await;
    let service = service(&storage, settings());

    let user = service.resolve_user(TEACHER_ID).await.unwrap();
    assert_eq!(user.role, Role::Teacher);
    let err = service.resolve_user("nobody").await.unwrap_err();
    assert!(matches!(err, ServiceError::Unauthorized(_)), "{err}");
}

#[expect(clippy::unwrap_used, reason = "test code")]
async fn seed_history(storage: &StorageBackend) {
    let base = t0();
    let rows = [
        (ADMIN_ID, "admin first", 1),
        (TEACHER_ID, "teacher first", 2),
        (ADMIN_ID, "admin second", 3),
        (TEACHER_ID, "teacher second", 4),
    ];
    for (user_id, message, minute) in rows {
        let mut log = ChatLog::new(SCHOOL_ID, user_id, message, "ok", None);
        log.created_at = base + ChronoDuration::minutes(minute);
        storage.save_chat_log(&log).await.unwrap();
    }
}

fn messages(logs: &[ChatLog]) -> Vec<&str> {
    logs.iter().map(|l| l.user_message.as_str()).collect()
}

#[tokio::test]
#[expect(clippy::unwrap_used, reason = "test code")]
async fn history_is_chronological_and_scoped() {
    let storage = seeded_storage("Grade 3", &["A"]).await;
    seed_history(&storage).await;
    let service = service(&storage, settings());

    let school_wide = service.history(&admin(), None, HistoryScope::School).await.unwrap();
    assert_eq!(
        messages(&school_wide),
        vec!["admin first", "teacher first", "admin second", "teacher second"]
    );

    let own = service.history(&admin(), None, HistoryScope::Mine).await.unwrap();
    assert_eq!(messages(&own), vec!["admin first", "admin second"]);

    let teacher_view = service.history(&teacher(), None, HistoryScope::School).await.unwrap();
    assert_eq!(messages(&teacher_view), vec!["teacher first", "teacher second"]);

    let granted = teacher().with_permission(Permission::ChatHistorySchool);
    assert_eq!(service.history(&granted, None, HistoryScope::School).await.unwrap().len(), 4);
}

#[tokio::test]
#[expect(clippy::unwrap_used, reason = "test code")]
async fn history_limit_keeps_newest_rows() {
    let storage = seeded_storage("Grade 3", &["A"]).await;
    seed_history(&storage).await;
    let service = service(&storage, settings());

    let newest = service.history(&admin(), Some(2), HistoryScope::School).await.unwrap();
    assert_eq!(messages(&newest), vec!["admin second", "teacher second"]);

    let at_least_one = service.history(&admin(), Some(0), HistoryScope::School).await.unwrap();
    assert_eq!(messages(&at_least_one), vec!["teacher second"]);
}

#[tokio::test]
#[expect(clippy::unwrap_used, reason = "test code")]
async fn purge_drops_only_expired_intents() {
    let storage = seeded_storage("Grade 3", &["A"]).await;
    let service = service(&storage, settings());
    service.handle_at(&admin(), FULL_MESSAGE, t0()).await.unwrap();

    assert_eq!(service.purge_expired_pending(t0() + ChronoDuration::minutes(10)).await.unwrap(), 0);
    assert_eq!(service.purge_expired_pending(t0() + ChronoDuration::minutes(30)).await.unwrap(), 1);
    assert!(storage.load_pending(ADMIN_ID, IntentKind::CreateStudent, t0()).await.unwrap().is_none());
}

#[tokio::test]
#[expect(clippy::unwrap_used, reason = "test code")]
async fn oversized_pending_ttl_is_capped_to_a_week() {
    let storage = seeded_storage("Grade 3", &["A"]).await;
    let mut settings = settings();
    settings.pending_ttl_minutes = 1_000_000_000_000;
    let service = service(&storage, settings);

    let reply = service.handle_at(&admin(), FULL_MESSAGE, t0()).await.unwrap();
    assert!(reply.reply.starts_with("Please CONFIRM to create student John Doe in Grade 3 A"));

    let intent =
        storage.load_pending(ADMIN_ID, IntentKind::CreateStudent, t0()).await.unwrap().unwrap();
    assert_eq!(intent.expires_at, t0() + ChronoDuration::days(7));
}

#[tokio::test]
#[expect(clippy::unwrap_used, reason = "test code")]
async fn assistant_reply_is_used_when_enabled() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(body_string_contains("Setup order links"))
        .and(body_string_contains("App Info Guide:"))
        .respond_with(completion("  Open the Classes page to add arms.  "))
        .expect(1)
        .mount(&server)
        .await;

    let guide_path =
        std::env::temp_dir().join(format!("school-assist-app-info-{}.md", std::process::id()));
    std::fs::write(&guide_path, "# Guide\nClasses hold arms.\n").unwrap();
    let mut settings = ai_settings(&server.uri());
    settings.app_info_path = guide_path.clone();

    let storage = seeded_storage("Grade 3", &["A"]).await;
    let service = service(&storage, settings);
    assert!(service.assistant_enabled());

    let reply = service.handle_at(&teacher(), "How do class arms work?", t0()).await.unwrap();
    std::fs::remove_file(&guide_path).unwrap();
    assert_eq!(reply.reply, "Open the Classes page to add arms.");
}

#[tokio::test]
#[expect(clippy::unwrap_used, reason = "test code")]
async fn assistant_failure_falls_back_to_default_reply() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream down"))
        .expect(1)
        .mount(&server)
        .await;

    let storage = seeded_storage("Grade 3", &["A"]).await;
    let service = service(&storage, ai_settings(&server.uri()));

    let reply = service.handle_at(&teacher(), "hello", t0()).await.unwrap();
    assert_eq!(
        reply.reply,
        "Hi! I'm your assistant for Sunrise Academy. Tell me what you need help with \
         (add students, enter results, assign teachers, etc.)."
    );
}

#[tokio::test]
#[expect(clippy::unwrap_used, reason = "test code")]
async fn blank_assistant_reply_falls_back_to_default_reply() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(completion("   "))
        .mount(&server)
        .await;

    let storage = seeded_storage("Grade 3", &["A"]).await;
    let service = service(&storage, ai_settings(&server.uri()));

    let reply = service.handle_at(&teacher(), "where do i start", t0()).await.unwrap();
    assert!(reply.reply.contains("Here is a good setup order:"), "{}", reply.reply);
}

#[tokio::test]
#[expect(clippy::unwrap_used, reason = "test code")]
async fn delete_guard_and_student_flow_skip_the_assistant() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(completion("should not be used"))
        .expect(0)
        .mount(&server)
        .await;

    let storage = seeded_storage("Grade 3", &["A"]).await;
    let service = service(&storage, ai_settings(&server.uri()));

    let denied = service.handle_at(&teacher(), "remove this class", t0()).await.unwrap();
    assert_eq!(denied.reply, DELETE_DENIED_REPLY);
    let flow = service.handle_at(&admin(), FULL_MESSAGE, t0()).await.unwrap();
    assert!(flow.reply.starts_with("Please CONFIRM"));
}

#[test]
fn blank_api_key_keeps_assistant_off() {
    let storage = Arc::new(StorageBackend::new_memory());
    let mut settings = ai_settings("http://127.0.0.1:9");
    settings.ai.api_key = Some(String::new());
    assert!(!service(&storage, settings).assistant_enabled());
}

#[test]
fn unreadable_routes_file_fails_construction() {
    let storage = Arc::new(StorageBackend::new_memory());
    let mut settings = settings();
    settings.routes_file = Some(std::path::PathBuf::from("/nonexistent/routes.json"));
    assert!(matches!(
        ChatService::new(storage, settings),
        Err(ServiceError::NotConfigured(_))
    ));
}
