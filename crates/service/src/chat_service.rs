//! Chat endpoint logic: student flow, delete guard, assistant or canned
//! reply, then chat and audit logging.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use school_assist_core::{
    APP_INFO_MAX_BYTES, AuditEntry, ChatIntent, ChatLog, ChatUser, DEFAULT_HISTORY_LIMIT,
    HistoryScope, MAX_HISTORY_LIMIT, MAX_MESSAGE_CHARS, Permission,
};
use school_assist_llm::{AssistantContext, LlmClient};
use school_assist_storage::StorageBackend;
use school_assist_storage::traits::{
    AuditStore, ChatLogStore, PendingIntentStore, SchoolStore, UserStore,
};
use serde::Serialize;

use crate::catalog::ClassCatalogCache;
use crate::error::ServiceError;
use crate::extractor::StudentExtractor;
use crate::guide::{FrontendLinks, RouteGuide, suggestions_for};
use crate::policy::{Authorizer, RolePolicy};
use crate::settings::AssistantSettings;
use crate::student_flow::StudentFlow;

pub(crate) const DELETE_DENIED_REPLY: &str =
    "Only school admins can delete. Please contact your admin.";

/// Response to one chat message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatReply {
    pub reply: String,
    pub intent: Option<ChatIntent>,
    pub can_delete: bool,
    pub suggestions: Vec<String>,
}

pub struct ChatService {
    storage: Arc<StorageBackend>,
    authorizer: Arc<dyn Authorizer>,
    flow: StudentFlow,
    guide: RouteGuide,
    llm: Option<LlmClient>,
    settings: AssistantSettings,
}

impl ChatService {
    /// Build the service from settings. Fails when the route file cannot be
    /// read or the assistant client cannot be created.
    pub fn new(
        storage: Arc<StorageBackend>,
        settings: AssistantSettings,
    ) -> Result<Self, ServiceError> {
        let links = FrontendLinks::new(&settings.frontend_url);
        let routes = match &settings.routes_file {
            Some(path) => RouteGuide::load_routes(path)?,
            None => RouteGuide::builtin_routes(),
        };
        let guide = RouteGuide::new(routes, links.clone());

        let llm = match &settings.ai.api_key {
            Some(api_key) if settings.ai.is_active() => {
                let client = LlmClient::new(
                    api_key.clone(),
                    &settings.ai.base_url,
                    settings.ai.timeout,
                )
                .map_err(|e| ServiceError::NotConfigured(e.to_string()))?
                .with_model(&settings.ai.model);
                tracing::info!(
                    provider = settings.ai.provider,
                    model = client.model(),
                    "assistant completions enabled"
                );
                Some(client)
            },
            _ => None,
        };

        let catalog =
            Arc::new(ClassCatalogCache::new(Arc::clone(&storage), settings.class_cache_ttl));
        let flow = StudentFlow::new(Arc::clone(&storage), catalog, links, settings.pending_ttl());

        Ok(Self {
            storage,
            authorizer: Arc::new(RolePolicy::standard()),
            flow,
            guide,
            llm,
            settings,
        })
    }

    #[must_use]
    pub fn with_authorizer(mut self, authorizer: Arc<dyn Authorizer>) -> Self {
        self.flow = self.flow.with_authorizer(Arc::clone(&authorizer));
        self.authorizer = authorizer;
        self
    }

    #[must_use]
    pub fn with_extractor(mut self, extractor: Arc<dyn StudentExtractor>) -> Self {
        self.flow = self.flow.with_extractor(extractor);
        self
    }

    #[must_use]
    pub fn assistant_enabled(&self) -> bool {
        self.llm.is_some()
    }

    /// Look up the caller of a request.
    pub async fn resolve_user(&self, user_id: &str) -> Result<ChatUser, ServiceError> {
        self.storage
            .get_user(user_id)
            .await?
            .ok_or_else(|| ServiceError::Unauthorized(format!("unknown user {user_id}")))
    }

    pub async fn handle(&self, user: &ChatUser, message: &str) -> Result<ChatReply, ServiceError> {
        self.handle_at(user, message, Utc::now()).await
    }

    pub async fn handle_at(
        &self,
        user: &ChatUser,
        message: &str,
        now: DateTime<Utc>,
    ) -> Result<ChatReply, ServiceError> {
        let school_id = school_scope(user)?;
        let message = message.trim();
        if message.is_empty() {
            return Err(ServiceError::InvalidInput("message is required".to_owned()));
        }
        if message.chars().count() > MAX_MESSAGE_CHARS {
            return Err(ServiceError::InvalidInput(format!(
                "message must be at most {MAX_MESSAGE_CHARS} characters"
            )));
        }
        let school = self.storage.get_school(school_id).await?.ok_or_else(|| {
            ServiceError::Unauthorized("account is not linked to a school".to_owned())
        })?;

        let intent = ChatIntent::detect(message);
        let can_delete = self.authorizer.allows(user, Permission::StudentsDelete);

        let reply = match self.flow.handle_at(user, &school, message, now).await? {
            Some(reply) => reply,
            None if intent == Some(ChatIntent::Delete) && !can_delete => {
                DELETE_DENIED_REPLY.to_owned()
            },
            None => match self.ask_assistant(message).await {
                Some(reply) => reply,
                None => self.guide.default_reply(Some(&school.name), message),
            },
        };

        self.record(&school.id, user, message, &reply, intent).await;

        Ok(ChatReply { reply, intent, can_delete, suggestions: suggestions_for(intent) })
    }

    /// Newest `limit` chat rows, oldest first. School-wide rows need the
    /// history permission; everyone else sees their own rows.
    pub async fn history(
        &self,
        user: &ChatUser,
        limit: Option<i64>,
        scope: HistoryScope,
    ) -> Result<Vec<ChatLog>, ServiceError> {
        let school_id = school_scope(user)?;
        let limit = clamp_history_limit(limit);
        let school_wide = scope == HistoryScope::School
            && self.authorizer.allows(user, Permission::ChatHistorySchool);
        let user_filter = (!school_wide).then_some(user.id.as_str());

        let mut logs = self.storage.recent_chat_logs(school_id, user_filter, limit).await?;
        logs.reverse();
        Ok(logs)
    }

    /// Drop pending intents whose TTL has passed.
    pub async fn purge_expired_pending(&self, now: DateTime<Utc>) -> Result<usize, ServiceError> {
        let purged = self.storage.purge_expired_pending(now).await?;
        if purged > 0 {
            tracing::info!(purged, "expired pending intents purged");
        }
        Ok(purged)
    }

    async fn ask_assistant(&self, message: &str) -> Option<String> {
        let llm = self.llm.as_ref()?;
        let context = self.guide.assistant_context(self.load_app_info().await);
        match llm.assistant_reply(&context, message).await {
            Ok(reply) => Some(reply),
            Err(e) => {
                tracing::warn!(error = %e, "assistant completion failed, using default reply");
                None
            },
        }
    }

    async fn load_app_info(&self) -> Option<String> {
        let path = &self.settings.app_info_path;
        match tokio::fs::read_to_string(path).await {
            Ok(content) => AssistantContext::clip_app_info(&content, APP_INFO_MAX_BYTES),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "cannot read app info guide");
                None
            },
        }
    }

    async fn record(
        &self,
        school_id: &str,
        user: &ChatUser,
        message: &str,
        reply: &str,
        intent: Option<ChatIntent>,
    ) {
        let log = ChatLog::new(school_id, &user.id, message, reply, intent);
        if let Err(e) = self.storage.save_chat_log(&log).await {
            tracing::warn!(user_id = %user.id, school_id, error = %e, "failed to save chat log");
        }
        let entry = AuditEntry::chat(&user.id, school_id, intent, message);
        if let Err(e) = self.storage.save_audit_entry(&entry).await {
            tracing::warn!(user_id = %user.id, school_id, error = %e, "failed to save audit entry");
        }
    }
}

fn school_scope(user: &ChatUser) -> Result<&str, ServiceError> {
    user.school_id
        .as_deref()
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| ServiceError::Unauthorized("account is not linked to a school".to_owned()))
}

fn clamp_history_limit(limit: Option<i64>) -> usize {
    match limit {
        None => DEFAULT_HISTORY_LIMIT,
        Some(requested) => usize::try_from(requested.max(1))
            .unwrap_or(MAX_HISTORY_LIMIT)
            .min(MAX_HISTORY_LIMIT),
    }
}
