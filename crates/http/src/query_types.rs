//! Request/query types (Deserialize)

use school_assist_core::HistoryScope;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct HistoryQuery {
    pub limit: Option<String>,
    pub scope: Option<String>,
}

impl HistoryQuery {
    /// Leading integer of the raw value; text without one counts as zero
    /// and is clamped to the minimum later.
    pub fn limit(&self) -> Option<i64> {
        self.limit.as_deref().map(leading_int)
    }

    /// Absent scope means the whole school; anything unrecognized narrows
    /// to the caller's own rows.
    pub fn scope(&self) -> HistoryScope {
        match self.scope.as_deref().map(str::trim) {
            None | Some("") => HistoryScope::School,
            Some(raw) => raw.to_lowercase().parse().unwrap_or(HistoryScope::Mine),
        }
    }
}

fn leading_int(raw: &str) -> i64 {
    let raw = raw.trim();
    let (negative, digits) = match raw.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, raw.strip_prefix('+').unwrap_or(raw)),
    };
    let magnitude = digits
        .chars()
        .map_while(|c| c.to_digit(10))
        .fold(0_i64, |acc, d| acc.saturating_mul(10).saturating_add(i64::from(d)));
    if negative { magnitude.saturating_neg() } else { magnitude }
}
