//! Service layer for school-assist
//!
//! Centralizes business logic between HTTP/CLI handlers and storage/llm.

#![allow(missing_docs, reason = "Internal crate with self-explanatory API")]
#![allow(clippy::missing_errors_doc, reason = "Errors are self-explanatory from Result types")]
#![allow(missing_debug_implementations, reason = "Internal types")]
#![allow(clippy::missing_docs_in_private_items, reason = "Internal crate")]
#![allow(clippy::implicit_return, reason = "Implicit return is idiomatic Rust")]
#![allow(clippy::question_mark_used, reason = "? operator is idiomatic Rust")]
#![allow(clippy::min_ident_chars, reason = "Short error vars are idiomatic")]

mod catalog;
mod chat_service;
mod error;
pub mod extractor;
mod guide;
mod policy;
mod settings;
mod student_flow;

#[cfg(test)]
mod chat_service_tests;
#[cfg(test)]
mod test_support;

pub use catalog::ClassCatalogCache;
pub use chat_service::{ChatReply, ChatService};
pub use error::ServiceError;
pub use guide::{FrontendLinks, ONBOARDING_STEPS, OnboardingStep, RouteEntry, RouteGuide, suggestions_for};
pub use policy::{Authorizer, RolePolicy};
pub use settings::{AiSettings, AssistantSettings};
pub use student_flow::StudentFlow;
