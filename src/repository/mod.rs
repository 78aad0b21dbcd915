//! Entries repository boundary.
//!
//! Wins live in a hosted Postgres exposed over PostgREST, with a GoTrue auth
//! front. This service only ever reads them: resolve the caller from their
//! bearer credential, then fetch that caller's most recent wins. Both
//! operations sit behind the [`EntriesRepository`] trait so the Spark
//! generator is testable against fakes, independent of the hosted platform.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;

use crate::config::SparkConfig;
use crate::error::SparkError;

/// A single journaled win. Immutable — this service never writes wins.
#[derive(Debug, Clone, Deserialize)]
pub struct Win {
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// A resolved caller: the authenticated user id plus the credential that
/// proved it.
///
/// The credential rides along so the wins query runs under the caller's own
/// token — row-level security scopes rows server-side on top of the explicit
/// owner filter in the query string. A Spark message must never be built
/// from another user's wins.
#[derive(Debug, Clone)]
pub struct Caller {
    pub id: Uuid,
    token: String,
}

impl Caller {
    pub fn new(id: Uuid, token: impl Into<String>) -> Self {
        Self {
            id,
            token: token.into(),
        }
    }

    pub fn token(&self) -> &str {
        &self.token
    }
}

#[async_trait]
pub trait EntriesRepository: Send + Sync {
    /// Resolve a bearer credential to exactly one user.
    ///
    /// A credential the auth backend rejects is `Unauthenticated`; a backend
    /// that cannot be reached is `Repository`.
    async fn resolve_caller(&self, bearer: &str) -> Result<Caller, SparkError>;

    /// Up to `limit` of the caller's own wins, most recent first.
    ///
    /// An empty result is valid and distinct from a `Repository` failure.
    async fn recent_wins(&self, caller: &Caller, limit: usize) -> Result<Vec<Win>, SparkError>;
}

// ─── Hosted backend client ────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct AuthUser {
    id: Uuid,
}

/// PostgREST query for a caller's most recent wins.
///
/// `order=created_at.desc` puts the newest first; `user_id=eq.<owner>` keeps
/// the scoping invariant even if the backend's row-level policy were ever
/// misconfigured.
fn wins_query_url(base: &str, owner: Uuid, limit: usize) -> String {
    format!(
        "{base}/rest/v1/wins?select=content,created_at&user_id=eq.{owner}&order=created_at.desc&limit={limit}"
    )
}

/// `EntriesRepository` over the hosted backend's REST surface.
pub struct RestRepository {
    client: reqwest::Client,
    base_url: String,
    anon_key: String,
}

impl RestRepository {
    pub fn new(config: &SparkConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .timeout(Duration::from_secs(config.repository_timeout_secs))
            .build()?;
        Ok(Self {
            client,
            base_url: config.entries_url.clone(),
            anon_key: config.entries_anon_key.clone(),
        })
    }
}

#[async_trait]
impl EntriesRepository for RestRepository {
    async fn resolve_caller(&self, bearer: &str) -> Result<Caller, SparkError> {
        let resp = self
            .client
            .get(format!("{}/auth/v1/user", self.base_url))
            .bearer_auth(bearer)
            .header("apikey", &self.anon_key)
            .send()
            .await
            .map_err(|e| SparkError::Repository(e.to_string()))?;

        let status = resp.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN
        {
            return Err(SparkError::Unauthenticated);
        }
        let resp = resp
            .error_for_status()
            .map_err(|e| SparkError::Repository(e.to_string()))?;

        // A 200 without a user id means the token did not map to a user.
        let user: AuthUser = resp.json().await.map_err(|_| SparkError::Unauthenticated)?;
        Ok(Caller::new(user.id, bearer))
    }

    async fn recent_wins(&self, caller: &Caller, limit: usize) -> Result<Vec<Win>, SparkError> {
        let url = wins_query_url(&self.base_url, caller.id, limit);
        let resp = self
            .client
            .get(&url)
            .bearer_auth(caller.token())
            .header("apikey", &self.anon_key)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| SparkError::Repository(e.to_string()))?;

        resp.json::<Vec<Win>>()
            .await
            .map_err(|e| SparkError::Repository(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wins_query_is_owner_scoped_and_ordered() {
        let owner = Uuid::nil();
        let url = wins_query_url("https://x.supabase.co", owner, 10);
        assert!(url.contains("user_id=eq.00000000-0000-0000-0000-000000000000"));
        assert!(url.contains("order=created_at.desc"));
        assert!(url.contains("limit=10"));
        assert!(url.starts_with("https://x.supabase.co/rest/v1/wins?"));
    }

    #[test]
    fn win_deserializes_backend_timestamps() {
        let json = r#"{"content":"shipped v1","created_at":"2025-08-01T12:30:00.123456+00:00"}"#;
        let win: Win = serde_json::from_str(json).unwrap();
        assert_eq!(win.content, "shipped v1");
        assert_eq!(win.created_at.timezone(), Utc);
    }
}
