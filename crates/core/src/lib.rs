//! Core types for school-assist
//!
//! Domain types shared across all other crates: users and permissions,
//! schools and their class catalog, students, chat logs and the
//! pending-intent state machine that drives multi-turn student creation.

mod chat;
pub mod constants;
pub mod env_config;
mod error;
mod pending;
mod school;
mod student;
mod text;
mod user;

pub use chat::*;
pub use constants::*;
pub use error::*;
pub use pending::*;
pub use school::*;
pub use student::*;
pub use text::*;
pub use user::*;
