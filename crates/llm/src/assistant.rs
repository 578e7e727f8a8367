//! Dashboard assistant prompt and completion call.

use crate::ai_types::{ChatRequest, Message};
use crate::client::{LlmClient, truncate};
use crate::error::LlmError;

const TEMPERATURE: f64 = 0.2;
const TRUNCATION_MARKER: &str = "\n\n(Truncated)";

const RULES: [&str; 6] = [
    "You are a school-scoped dashboard assistant.",
    "Only respond using the routes provided; do not invent URLs.",
    "If the user asks how to do something, give brief steps and include the best matching link.",
    "Use the App Info Guide below as the source of truth for how-to steps and page usage.",
    "Do not discuss architecture, backend logic, or database details; say it is not covered in the guide.",
    "If unclear, ask a clarifying question.",
];

/// A navigable page the assistant may link to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteLine {
    pub label: String,
    pub url: String,
}

/// Everything the assistant is allowed to know about the dashboard.
#[derive(Debug, Clone, Default)]
pub struct AssistantContext {
    pub routes: Vec<RouteLine>,
    /// Absolute links of the setup steps, in order.
    pub setup_links: Vec<String>,
    /// Contents of the app info guide, already trimmed to size.
    pub app_info: Option<String>,
}

impl AssistantContext {
    /// Trim a guide document for inclusion in the prompt. Blank guides are dropped.
    #[must_use]
    pub fn clip_app_info(content: &str, max_bytes: usize) -> Option<String> {
        let content = content.trim();
        if content.is_empty() {
            return None;
        }
        if content.len() > max_bytes {
            return Some(format!("{}{TRUNCATION_MARKER}", truncate(content, max_bytes)));
        }
        Some(content.to_owned())
    }
}

/// Render the system prompt: fixed rules, setup order, then the route list.
#[must_use]
pub fn build_system_prompt(context: &AssistantContext) -> String {
    let setup = context
        .setup_links
        .iter()
        .enumerate()
        .map(|(index, url)| format!("{}) {url}", index.saturating_add(1)))
        .collect::<Vec<_>>()
        .join(" | ");
    let routes = context
        .routes
        .iter()
        .map(|route| format!("- {}: {}", route.label, route.url))
        .collect::<Vec<_>>()
        .join("\n");

    let mut lines: Vec<String> = RULES.iter().map(|rule| (*rule).to_owned()).collect();
    lines.push(format!("Setup order links: {setup}"));
    lines.push("Routes:".to_owned());
    lines.push(routes);
    lines.join("\n")
}

impl LlmClient {
    /// Ask the assistant about a user message.
    ///
    /// # Errors
    /// Propagates any [`LlmError`] from the completion call, including an
    /// empty reply.
    pub async fn assistant_reply(
        &self,
        context: &AssistantContext,
        message: &str,
    ) -> Result<String, LlmError> {
        let mut messages = vec![Message::system(build_system_prompt(context))];
        if let Some(guide) = &context.app_info {
            messages.push(Message::system(format!("App Info Guide:\n{guide}")));
        }
        messages.push(Message::user(message));

        let request = ChatRequest { model: self.model.clone(), messages, temperature: Some(TEMPERATURE) };
        let reply = self.chat_completion(&request).await?;
        tracing::debug!(model = %self.model, chars = reply.chars().count(), "assistant replied");
        Ok(reply)
    }
}
