//! One-shot chat from the terminal, mainly for checking a deployment.

use std::sync::Arc;

use anyhow::Result;
use school_assist_service::{AssistantSettings, ChatService};

use crate::open_storage;

pub(crate) async fn run(user_id: &str, message: &str) -> Result<()> {
    let storage = Arc::new(open_storage().await?);
    let service = ChatService::new(storage, AssistantSettings::from_env())?;
    let user = service.resolve_user(user_id).await?;
    let reply = service.handle(&user, message).await?;
    println!("{}", serde_json::to_string_pretty(&reply)?);
    Ok(())
}
