//! Shared constants for school-assist.

/// Minutes a pending intent survives without a new message.
pub const PENDING_INTENT_TTL_MINUTES: i64 = 30;

/// Upper bound for a configured pending-intent TTL (one week).
pub const MAX_PENDING_INTENT_TTL_MINUTES: i64 = 7 * 24 * 60;

/// Minutes a school's class/arm catalog stays cached.
pub const CLASS_CACHE_TTL_MINUTES: u64 = 10;

/// Seconds between background sweeps of expired pending intents.
pub const PENDING_SWEEP_INTERVAL_SECS: u64 = 300;

/// Maximum accepted chat message length, in characters.
pub const MAX_MESSAGE_CHARS: usize = 2000;

/// Audit descriptions keep at most this many characters of the message.
pub const AUDIT_MESSAGE_MAX_CHARS: usize = 500;

/// Default number of chat history rows returned.
pub const DEFAULT_HISTORY_LIMIT: usize = 100;

/// Upper bound for chat history rows (DoS protection).
pub const MAX_HISTORY_LIMIT: usize = 200;

/// Timeout for the outbound assistant completion call.
pub const AI_TIMEOUT_SECS: u64 = 20;

/// App info guide is cut to this many bytes before being sent to the model.
pub const APP_INFO_MAX_BYTES: usize = 12_000;

/// PostgreSQL connection pool: maximum connections.
pub const PG_POOL_MAX_CONNECTIONS: u32 = 10;

/// PostgreSQL connection pool: acquire timeout in seconds.
pub const PG_POOL_ACQUIRE_TIMEOUT_SECS: u64 = 10;

/// PostgreSQL connection pool: idle timeout in seconds.
pub const PG_POOL_IDLE_TIMEOUT_SECS: u64 = 300;

/// Frontend page listing all students, linked after creation.
pub const STUDENTS_LIST_PATH: &str = "/v14/all-students";
