//! Schema migration command.
//!
//! Connecting runs the idempotent migrations; running it twice is a no-op.

use school_assist_storage::StorageBackend;

use crate::database_url;

pub(crate) async fn run() -> anyhow::Result<()> {
    let url = database_url()?;
    println!("Migrating PostgreSQL schema...");
    let storage = StorageBackend::new_postgres(&url).await?;
    println!("Migration complete ({} backend)", storage.kind());
    Ok(())
}
