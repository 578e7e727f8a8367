//! Response types (Serialize)

use school_assist_core::ChatLog;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct VersionResponse {
    pub version: &'static str,
}

#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub data: Vec<ChatLog>,
}
