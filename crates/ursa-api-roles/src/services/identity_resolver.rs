//! Identity directory client and per-run login-id resolution.
//!
//! Resolution is either delegated to the external identity directory or,
//! when `require_inline_user_id` is set, short-circuited to the
//! `keycloak-userId` column. Successful resolutions are cached for the rest
//! of the batch; the cache never outlives one reconciliation run.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::error::RolesApiError;
use crate::models::{ChangeRow, ReconcilerConfig};
use crate::services::reconciler::RowFailure;

/// One match returned by the identity directory.
#[derive(Debug, Clone, Deserialize)]
pub struct IdentityRecord {
    /// The canonical user identifier issued by the directory.
    #[serde(rename = "userLoginId")]
    pub user_login_id: String,
}

/// Lookup access to the external identity directory.
#[async_trait]
pub trait IdentityDirectory: Send + Sync {
    /// Look up a login identifier. An empty result means no match.
    async fn lookup_by_login_id(
        &self,
        token: &str,
        login_id: &str,
    ) -> Result<Vec<IdentityRecord>, RolesApiError>;
}

/// Wire shape of the directory's lookup response.
#[derive(Debug, Deserialize)]
struct LookupResponse {
    #[serde(default)]
    result: Vec<IdentityRecord>,
}

/// HTTP implementation of [`IdentityDirectory`] (reqwest-based).
#[derive(Debug, Clone)]
pub struct HttpIdentityDirectory {
    base_url: String,
    http_client: Client,
}

impl HttpIdentityDirectory {
    /// Create a new directory client.
    pub fn new(base_url: String, timeout: Duration) -> Result<Self, RolesApiError> {
        let http_client = Client::builder()
            .timeout(timeout)
            .user_agent("ursa-api-roles/1.0")
            .build()
            .map_err(|e| {
                RolesApiError::Internal(format!("Failed to build HTTP client: {e}"))
            })?;

        Ok(Self::with_http_client(base_url, http_client))
    }

    /// Create a client with a pre-built `reqwest::Client` (for testing).
    #[must_use]
    pub fn with_http_client(base_url: String, http_client: Client) -> Self {
        let base_url = base_url.trim_end_matches('/').to_string();
        Self {
            base_url,
            http_client,
        }
    }
}

#[async_trait]
impl IdentityDirectory for HttpIdentityDirectory {
    async fn lookup_by_login_id(
        &self,
        token: &str,
        login_id: &str,
    ) -> Result<Vec<IdentityRecord>, RolesApiError> {
        let url = format!("{}/v1/users/lookup", self.base_url);

        let response = self
            .http_client
            .get(&url)
            .query(&[("loginId", login_id)])
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| RolesApiError::IdentityDirectory(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(RolesApiError::IdentityDirectory(format!(
                "Lookup returned HTTP {status}"
            )));
        }

        let body: LookupResponse = response
            .json()
            .await
            .map_err(|e| RolesApiError::IdentityDirectory(e.to_string()))?;

        tracing::debug!(login_id, matches = body.result.len(), "Identity lookup");
        Ok(body.result)
    }
}

/// Per-run resolver from login identifiers to canonical user ids.
pub struct IdentityResolver {
    directory: Arc<dyn IdentityDirectory>,
    require_inline_user_id: bool,
    cache: HashMap<String, String>,
}

impl IdentityResolver {
    /// Create a resolver for one reconciliation run.
    #[must_use]
    pub fn new(directory: Arc<dyn IdentityDirectory>, config: &ReconcilerConfig) -> Self {
        Self {
            directory,
            require_inline_user_id: config.require_inline_user_id,
            cache: HashMap::new(),
        }
    }

    /// Resolve a row's login identifier to its canonical user id.
    ///
    /// Consults the per-run cache first. In inline mode the `keycloak-userId`
    /// column is mandatory and the directory is never called.
    pub async fn resolve(&mut self, row: &ChangeRow, token: &str) -> Result<String, RowFailure> {
        if let Some(cached) = self.cache.get(&row.user) {
            return Ok(cached.clone());
        }

        let user_id = if self.require_inline_user_id {
            match row.keycloak_user_id.as_deref() {
                Some(inline) if !inline.is_empty() => inline.to_string(),
                _ => return Err(RowFailure::InlineUserIdMissing),
            }
        } else {
            let matches = self
                .directory
                .lookup_by_login_id(token, &row.user)
                .await
                .map_err(|e| RowFailure::Directory(e.to_string()))?;

            match matches.first() {
                Some(record) if !record.user_login_id.is_empty() => {
                    record.user_login_id.clone()
                }
                _ => return Err(RowFailure::UserNotFound),
            }
        };

        self.cache.insert(row.user.clone(), user_id.clone());
        Ok(user_id)
    }
}
