//! Role directory client and the per-run catalog snapshot.
//!
//! The catalog is loaded once per reconciliation run and projected into a
//! code-keyed map. A load failure is fatal to the whole batch: without the
//! catalog, no role code can be validated.

use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::PgPool;

use crate::error::RolesApiError;
use ursa_db::models::{PlatformRole, RoleRef};

/// Read access to the active role catalog.
#[async_trait]
pub trait RoleDirectory: Send + Sync {
    /// List the active catalog roles.
    async fn list_active(&self) -> Result<Vec<PlatformRole>, RolesApiError>;
}

/// Role directory backed by the `platform_roles` table.
#[derive(Debug, Clone)]
pub struct PgRoleDirectory {
    pool: PgPool,
}

impl PgRoleDirectory {
    /// Create a directory over an existing connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RoleDirectory for PgRoleDirectory {
    async fn list_active(&self) -> Result<Vec<PlatformRole>, RolesApiError> {
        PlatformRole::list_active(&self.pool)
            .await
            .map_err(|e| RolesApiError::RoleDirectory(e.to_string()))
    }
}

/// Immutable snapshot of the active catalog, keyed by role code.
#[derive(Debug, Clone)]
pub struct RoleCatalog {
    by_code: HashMap<String, RoleRef>,
}

impl RoleCatalog {
    /// Load the catalog through a directory and project it for O(1) lookup.
    pub async fn load(directory: &dyn RoleDirectory) -> Result<Self, RolesApiError> {
        let roles = directory.list_active().await?;
        tracing::debug!(roles = roles.len(), "Loaded active role catalog");
        Ok(Self::from_roles(&roles))
    }

    /// Build a snapshot from already-fetched catalog entries.
    #[must_use]
    pub fn from_roles(roles: &[PlatformRole]) -> Self {
        let by_code = roles
            .iter()
            .map(|role| {
                (
                    role.code.clone(),
                    RoleRef {
                        role_id: role.id,
                        code: role.code.clone(),
                    },
                )
            })
            .collect();
        Self { by_code }
    }

    /// Look up the role reference for a code.
    #[must_use]
    pub fn get(&self, code: &str) -> Option<&RoleRef> {
        self.by_code.get(code)
    }
}
