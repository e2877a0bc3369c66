//! Session context. A login issues a bearer token; handlers receive the resolved
//! [`Session`] through the [`CurrentSession`] / [`JobSeekerSession`] extractors instead of
//! reading ambient state. Token storage is pluggable via [`TokenStore`].

use std::collections::HashMap;

use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::http::{header::AUTHORIZATION, request::Parts, HeaderMap};
use chrono::{DateTime, Utc};
use redis::AsyncCommands;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::user::User;
use crate::state::AppState;

pub const JOB_SEEKERS_ONLY: &str = "Profile creation is only available for job seekers";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub token: String,
    pub user: User,
    pub issued_at: DateTime<Utc>,
}

impl Session {
    pub fn issue(user: User) -> Self {
        Session {
            token: format!("cb_{}", Uuid::new_v4().simple()),
            user,
            issued_at: Utc::now(),
        }
    }
}

#[async_trait]
pub trait TokenStore: Send + Sync {
    async fn store(&self, session: &Session) -> Result<(), AppError>;

    async fn load(&self, token: &str) -> Result<Option<Session>, AppError>;

    /// Forgets the token. Unknown tokens are not an error.
    async fn revoke(&self, token: &str) -> Result<(), AppError>;

    fn backend(&self) -> &'static str;
}

/// Process-local token store. Sessions live until logout or restart.
#[derive(Default)]
pub struct InMemoryTokenStore {
    sessions: RwLock<HashMap<String, Session>>,
}

impl InMemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TokenStore for InMemoryTokenStore {
    async fn store(&self, session: &Session) -> Result<(), AppError> {
        self.sessions
            .write()
            .await
            .insert(session.token.clone(), session.clone());
        Ok(())
    }

    async fn load(&self, token: &str) -> Result<Option<Session>, AppError> {
        Ok(self.sessions.read().await.get(token).cloned())
    }

    async fn revoke(&self, token: &str) -> Result<(), AppError> {
        self.sessions.write().await.remove(token);
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}

/// Redis-backed token store; sessions expire after `ttl_secs`.
pub struct RedisTokenStore {
    client: redis::Client,
    ttl_secs: u64,
}

impl RedisTokenStore {
    pub fn new(client: redis::Client, ttl_secs: u64) -> Self {
        Self { client, ttl_secs }
    }

    fn key(token: &str) -> String {
        format!("careerbridge:session:{token}")
    }
}

#[async_trait]
impl TokenStore for RedisTokenStore {
    async fn store(&self, session: &Session) -> Result<(), AppError> {
        let payload = serde_json::to_string(session).map_err(anyhow::Error::from)?;
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        conn.set_ex::<_, _, ()>(Self::key(&session.token), payload, self.ttl_secs)
            .await?;
        Ok(())
    }

    async fn load(&self, token: &str) -> Result<Option<Session>, AppError> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let payload: Option<String> = conn.get(Self::key(token)).await?;
        payload
            .map(|p| serde_json::from_str(&p).map_err(|e| AppError::Internal(e.into())))
            .transpose()
    }

    async fn revoke(&self, token: &str) -> Result<(), AppError> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        conn.del::<_, ()>(Self::key(token)).await?;
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "redis"
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// The authenticated caller. Rejects with 401 when the token is missing or unknown.
#[derive(Debug, Clone)]
pub struct CurrentSession(pub Session);

#[async_trait]
impl FromRequestParts<AppState> for CurrentSession {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers).ok_or(AppError::Unauthorized)?;
        let session = state
            .tokens
            .load(token)
            .await?
            .ok_or(AppError::Unauthorized)?;
        Ok(CurrentSession(session))
    }
}

/// An authenticated job seeker. Any other account type gets 403.
#[derive(Debug, Clone)]
pub struct JobSeekerSession(pub Session);

#[async_trait]
impl FromRequestParts<AppState> for JobSeekerSession {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let CurrentSession(session) = CurrentSession::from_request_parts(parts, state).await?;
        if !session.user.is_job_seeker() {
            return Err(AppError::Forbidden(JOB_SEEKERS_ONLY.to_string()));
        }
        Ok(JobSeekerSession(session))
    }
}
