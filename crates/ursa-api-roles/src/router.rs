//! Router and shared state for the platform user-role API.

use axum::{
    routing::{get, post},
    Extension, Router,
};
use sqlx::PgPool;
use std::sync::Arc;

use crate::handlers;
use crate::models::ReconcilerConfig;
use crate::repository::{PgUserRoleRepository, UserRoleRepository};
use crate::services::identity_resolver::IdentityDirectory;
use crate::services::reconciler::Reconciler;
use crate::services::role_catalog::{PgRoleDirectory, RoleDirectory};

/// Shared state for user-role routes.
#[derive(Clone)]
pub struct RolesState {
    /// Assignment record access, used by the profile surface.
    pub repository: Arc<dyn UserRoleRepository>,
    /// The reconciliation engine, used by the bulk surfaces.
    pub reconciler: Arc<Reconciler>,
}

impl RolesState {
    /// Build state over a Postgres pool, with the identity directory as the
    /// only external collaborator.
    pub fn new(
        pool: PgPool,
        identity_directory: Arc<dyn IdentityDirectory>,
        config: ReconcilerConfig,
    ) -> Self {
        let repository: Arc<dyn UserRoleRepository> =
            Arc::new(PgUserRoleRepository::new(pool.clone()));
        let role_directory: Arc<dyn RoleDirectory> = Arc::new(PgRoleDirectory::new(pool));
        Self::with_parts(repository, role_directory, identity_directory, config)
    }

    /// Build state from explicit collaborators (used by tests).
    pub fn with_parts(
        repository: Arc<dyn UserRoleRepository>,
        role_directory: Arc<dyn RoleDirectory>,
        identity_directory: Arc<dyn IdentityDirectory>,
        config: ReconcilerConfig,
    ) -> Self {
        let reconciler = Arc::new(Reconciler::new(
            repository.clone(),
            role_directory,
            identity_directory,
            config,
        ));
        Self {
            repository,
            reconciler,
        }
    }
}

/// Create the user-roles router.
///
/// All routes expect a `CallerIdentity` request extension installed by the
/// deployment's authentication middleware.
///
/// - GET  /v1/platform-user-roles/profile
/// - GET  /`v1/platform-user-roles/profile/:user_id`
/// - POST /v1/platform-user-roles/bulk-create
/// - POST /v1/platform-user-roles/bulk-update
pub fn user_roles_router(state: RolesState) -> Router {
    Router::new()
        .route(
            "/v1/platform-user-roles/profile",
            get(handlers::profile::get_own_profile),
        )
        .route(
            "/v1/platform-user-roles/profile/:user_id",
            get(handlers::profile::get_profile),
        )
        .route(
            "/v1/platform-user-roles/bulk-create",
            post(handlers::bulk::bulk_create),
        )
        .route(
            "/v1/platform-user-roles/bulk-update",
            post(handlers::bulk::bulk_update),
        )
        .layer(Extension(state))
}
