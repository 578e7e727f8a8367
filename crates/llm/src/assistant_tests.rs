use std::time::Duration;

use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::assistant::{AssistantContext, RouteLine, build_system_prompt};
use crate::client::LlmClient;

fn sample_context() -> AssistantContext {
    AssistantContext {
        routes: vec![
            RouteLine {
                label: "Add Student".to_owned(),
                url: "https://school.example.com/v14/add-student".to_owned(),
            },
            RouteLine {
                label: "All Classes".to_owned(),
                url: "https://school.example.com/v12/all-classes".to_owned(),
            },
        ],
        setup_links: vec![
            "https://school.example.com/v10/profile".to_owned(),
            "https://school.example.com/v11/all-sessions".to_owned(),
        ],
        app_info: None,
    }
}

#[test]
fn system_prompt_lists_setup_links_and_routes() {
    let prompt = build_system_prompt(&sample_context());
    assert!(prompt.starts_with("You are a school-scoped dashboard assistant.\n"));
    assert!(prompt.contains(
        "Setup order links: 1) https://school.example.com/v10/profile | 2) https://school.example.com/v11/all-sessions"
    ));
    assert!(prompt.ends_with(
        "Routes:\n- Add Student: https://school.example.com/v14/add-student\n- All Classes: https://school.example.com/v12/all-classes"
    ));
}

#[test]
fn clip_app_info_drops_blank_and_marks_truncation() {
    assert_eq!(AssistantContext::clip_app_info("   \n", 100), None);
    assert_eq!(AssistantContext::clip_app_info("  short guide ", 100).as_deref(), Some("short guide"));
    let clipped = AssistantContext::clip_app_info("abcdefghij", 4);
    assert_eq!(clipped.as_deref(), Some("abcd\n\n(Truncated)"));
}

#[tokio::test]
#[expect(clippy::unwrap_used, reason = "test code")]
async fn assistant_reply_sends_guide_as_second_system_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(body_partial_json(serde_json::json!({
            "model": "gpt-4o-mini",
            "temperature": 0.2,
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "choices": [{ "message": { "content": "Go to Add Student." } }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = LlmClient::new("k".to_owned(), &server.uri(), Duration::from_secs(5)).unwrap();
    let mut context = sample_context();
    context.app_info = Some("Students live under Students > Add.".to_owned());
    let reply = client.assistant_reply(&context, "how do I enroll a child?").await.unwrap();
    assert_eq!(reply, "Go to Add Student.");

    let requests = server.received_requests().await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    let messages = body["messages"].as_array().unwrap();
    assert_eq!(messages.len(), 3);
    assert_eq!(messages[0]["role"], "system");
    assert_eq!(messages[1]["content"], "App Info Guide:\nStudents live under Students > Add.");
    assert_eq!(messages[2]["role"], "user");
    assert_eq!(messages[2]["content"], "how do I enroll a child?");
}

#[tokio::test]
#[expect(clippy::unwrap_used, reason = "test code")]
async fn assistant_reply_without_guide_sends_two_messages() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "choices": [{ "message": { "content": "Hello" } }]
        })))
        .mount(&server)
        .await;

    let client = LlmClient::new("k".to_owned(), &server.uri(), Duration::from_secs(5)).unwrap();
    client.assistant_reply(&sample_context(), "hi").await.unwrap();

    let requests = server.received_requests().await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(body["messages"].as_array().unwrap().len(), 2);
}
