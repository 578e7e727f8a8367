use school_assist_core::{AuditEntry, ChatIntent, ChatLog};

use crate::MemoryStorage;
use crate::traits::{AuditStore, ChatLogStore};

#[tokio::test]
#[expect(clippy::unwrap_used, reason = "test code")]
async fn recent_chat_logs_are_newest_first_and_scoped() {
    let storage = MemoryStorage::new();
    for (i, user) in ["alice", "bob", "alice"].iter().enumerate() {
        let log = ChatLog::new("s1", user, &format!("message {i}"), "reply", None);
        storage.save_chat_log(&log).await.unwrap();
    }
    let other_school = ChatLog::new("s2", "alice", "elsewhere", "reply", None);
    storage.save_chat_log(&other_school).await.unwrap();

    let all = storage.recent_chat_logs("s1", None, 10).await.unwrap();
    let messages: Vec<&str> = all.iter().map(|l| l.user_message.as_str()).collect();
    assert_eq!(messages, vec!["message 2", "message 1", "message 0"]);

    let alice = storage.recent_chat_logs("s1", Some("alice"), 10).await.unwrap();
    assert_eq!(alice.len(), 2);
    assert!(alice.iter().all(|l| l.user_id == "alice" && l.school_id == "s1"));

    let limited = storage.recent_chat_logs("s1", None, 1).await.unwrap();
    assert_eq!(limited.len(), 1);
    assert_eq!(limited[0].user_message, "message 2");
}

#[tokio::test]
#[expect(clippy::unwrap_used, reason = "test code")]
async fn audit_entries_record_chat_action() {
    let storage = MemoryStorage::new();
    let entry = AuditEntry::chat("alice", "s1", Some(ChatIntent::Create), "add a student");
    storage.save_audit_entry(&entry).await.unwrap();

    let entries = storage.audit_entries_for_user("alice", 10).await.unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].action, AuditEntry::CHAT_ACTION);
    assert_eq!(
        entries[0].description.as_deref(),
        Some("school_id=s1; intent=create; message=add a student")
    );
    assert!(storage.audit_entries_for_user("bob", 10).await.unwrap().is_empty());
}
