//! Abstract access to persisted user-role assignment records.
//!
//! The reconciliation engine only sees this trait; the Postgres
//! implementation delegates to the ursa-db models. Tests substitute an
//! in-memory implementation.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::RolesApiError;
use ursa_db::models::{CreateUserRoleAssignment, UpdateUserRoleAssignment, UserRoleAssignment};

/// Read/write access to assignment records, keyed by canonical user id.
#[async_trait]
pub trait UserRoleRepository: Send + Sync {
    /// Find a record by canonical user id, regardless of status.
    async fn find_by_user_id(
        &self,
        user_id: &str,
    ) -> Result<Option<UserRoleAssignment>, RolesApiError>;

    /// Find the active record for a canonical user id.
    async fn find_active_by_user_id(
        &self,
        user_id: &str,
    ) -> Result<Option<UserRoleAssignment>, RolesApiError>;

    /// Create a new assignment record.
    async fn create(
        &self,
        draft: CreateUserRoleAssignment,
    ) -> Result<UserRoleAssignment, RolesApiError>;

    /// Apply a patch to an existing record.
    async fn update(&self, id: Uuid, patch: UpdateUserRoleAssignment)
        -> Result<(), RolesApiError>;
}

/// Postgres-backed repository.
#[derive(Debug, Clone)]
pub struct PgUserRoleRepository {
    pool: PgPool,
}

impl PgUserRoleRepository {
    /// Create a repository over an existing connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRoleRepository for PgUserRoleRepository {
    async fn find_by_user_id(
        &self,
        user_id: &str,
    ) -> Result<Option<UserRoleAssignment>, RolesApiError> {
        Ok(UserRoleAssignment::find_by_user_id(&self.pool, user_id).await?)
    }

    async fn find_active_by_user_id(
        &self,
        user_id: &str,
    ) -> Result<Option<UserRoleAssignment>, RolesApiError> {
        Ok(UserRoleAssignment::find_active_by_user_id(&self.pool, user_id).await?)
    }

    async fn create(
        &self,
        draft: CreateUserRoleAssignment,
    ) -> Result<UserRoleAssignment, RolesApiError> {
        Ok(UserRoleAssignment::create(&self.pool, draft).await?)
    }

    async fn update(
        &self,
        id: Uuid,
        patch: UpdateUserRoleAssignment,
    ) -> Result<(), RolesApiError> {
        Ok(UserRoleAssignment::update(&self.pool, id, patch).await?)
    }
}
