//! Storage layer for school-assist
//!
//! PostgreSQL storage via sqlx, plus an in-memory backend for tests and
//! database-less runs. Both sit behind [`StorageBackend`].

mod backend;
pub mod error;
mod memory;
mod pg_migrations;
mod pg_storage;
#[cfg(test)]
mod tests;
pub mod traits;

pub use backend::StorageBackend;
pub use error::StorageError;
pub use memory::MemoryStorage;
pub use pg_storage::PgStorage;
