//! Runtime settings for the chat assistant, read from the environment.

use std::path::PathBuf;
use std::time::Duration;

use school_assist_core::env_config::{env_flag, env_parse_with_default, env_string};
use school_assist_core::{
    AI_TIMEOUT_SECS, CLASS_CACHE_TTL_MINUTES, MAX_PENDING_INTENT_TTL_MINUTES,
    PENDING_INTENT_TTL_MINUTES,
};
use school_assist_llm::{DEFAULT_BASE_URL, DEFAULT_MODEL, normalize_provider};

const DEFAULT_APP_INFO_PATH: &str = "App-info.md";

/// Settings of the optional LLM completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AiSettings {
    pub enabled: bool,
    pub api_key: Option<String>,
    pub provider: &'static str,
    pub model: String,
    pub base_url: String,
    pub timeout: Duration,
}

impl Default for AiSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            api_key: None,
            provider: normalize_provider(""),
            model: DEFAULT_MODEL.to_owned(),
            base_url: DEFAULT_BASE_URL.to_owned(),
            timeout: Duration::from_secs(AI_TIMEOUT_SECS),
        }
    }
}

impl AiSettings {
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            enabled: env_flag("AI_ENABLED"),
            api_key: env_string("AI_API_KEY"),
            provider: normalize_provider(&env_string("AI_PROVIDER").unwrap_or_default()),
            model: env_string("AI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_owned()),
            base_url: env_string("AI_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_owned()),
            timeout: Duration::from_secs(env_parse_with_default("AI_TIMEOUT_SECS", AI_TIMEOUT_SECS)),
        }
    }

    /// The assistant is used only when switched on and given a key.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.enabled && self.api_key.as_deref().is_some_and(|k| !k.trim().is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssistantSettings {
    /// Raw frontend URL; links are built from its origin.
    pub frontend_url: String,
    pub pending_ttl_minutes: i64,
    pub class_cache_ttl: Duration,
    pub ai: AiSettings,
    /// JSON route catalog replacing the built-in one.
    pub routes_file: Option<PathBuf>,
    pub app_info_path: PathBuf,
}

impl Default for AssistantSettings {
    fn default() -> Self {
        Self {
            frontend_url: "/".to_owned(),
            pending_ttl_minutes: PENDING_INTENT_TTL_MINUTES,
            class_cache_ttl: Duration::from_secs(CLASS_CACHE_TTL_MINUTES.saturating_mul(60)),
            ai: AiSettings::default(),
            routes_file: None,
            app_info_path: PathBuf::from(DEFAULT_APP_INFO_PATH),
        }
    }
}

impl AssistantSettings {
    #[must_use]
    pub fn from_env() -> Self {
        let frontend_url = env_string("FRONTEND_URL")
            .or_else(|| env_string("FRONTEND_LOGIN_URL"))
            .unwrap_or_else(|| "/".to_owned());
        let cache_minutes: u64 =
            env_parse_with_default("CLASS_CACHE_TTL_MINUTES", CLASS_CACHE_TTL_MINUTES);
        Self {
            frontend_url,
            pending_ttl_minutes: env_parse_with_default(
                "PENDING_INTENT_TTL_MINUTES",
                PENDING_INTENT_TTL_MINUTES,
            ),
            class_cache_ttl: Duration::from_secs(cache_minutes.saturating_mul(60)),
            ai: AiSettings::from_env(),
            routes_file: env_string("SCHOOL_ASSIST_ROUTES_FILE").map(PathBuf::from),
            app_info_path: env_string("SCHOOL_ASSIST_APP_INFO")
                .map_or_else(|| PathBuf::from(DEFAULT_APP_INFO_PATH), PathBuf::from),
        }
    }

    /// Configured TTL clamped to one minute .. one week.
    #[must_use]
    pub fn pending_ttl(&self) -> chrono::Duration {
        let minutes = self.pending_ttl_minutes.clamp(1, MAX_PENDING_INTENT_TTL_MINUTES);
        chrono::Duration::try_minutes(minutes)
            .unwrap_or_else(|| chrono::Duration::minutes(PENDING_INTENT_TTL_MINUTES))
    }
}
