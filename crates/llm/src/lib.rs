//! OpenAI-compatible chat completion client for the school assistant.

mod ai_types;
mod assistant;
mod client;
pub mod error;

#[cfg(test)]
mod assistant_tests;

pub use ai_types::{ChatRequest, Message};
pub use assistant::{AssistantContext, RouteLine, build_system_prompt};
pub use client::{
    DEFAULT_BASE_URL, DEFAULT_MODEL, LlmClient, SUPPORTED_PROVIDERS, normalize_provider, truncate,
};
pub use error::LlmError;
