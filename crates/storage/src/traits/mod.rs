//! Storage backend trait abstraction
//!
//! Async domain traits for storage operations, implemented by the
//! PostgreSQL and in-memory backends and dispatched through
//! [`crate::StorageBackend`].

pub mod chat;
pub mod pending;
pub mod school;
pub mod student;

pub use chat::{AuditStore, ChatLogStore};
pub use pending::PendingIntentStore;
pub use school::{SchoolStore, UserStore};
pub use student::StudentStore;
