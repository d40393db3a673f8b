//! Bulk role reconciliation engine.
//!
//! Consumes an ordered batch of change rows on behalf of a caller. Per row:
//! validate the role code against the catalog snapshot, validate the action
//! token, resolve the login identifier to a canonical user id, then apply the
//! requested merge to the user's assignment record and persist it.
//!
//! Row failures are confined to the row: the failure message becomes that
//! row's `status` and the loop continues. Only a catalog load failure rejects
//! the whole batch, because without the catalog no role code is checkable.

use std::sync::Arc;

use thiserror::Error;
use uuid::Uuid;

use crate::error::RolesApiError;
use crate::models::{
    merge_extra_attributes, Action, CallerIdentity, ChangeRow, OutcomeRow, ReconcilerConfig,
};
use crate::repository::UserRoleRepository;
use crate::services::identity_resolver::{IdentityDirectory, IdentityResolver};
use crate::services::role_catalog::{RoleCatalog, RoleDirectory};
use ursa_db::models::{CreateUserRoleAssignment, RoleRef, UpdateUserRoleAssignment};

/// A failure confined to one row of the batch.
///
/// The display string is the observable row `status`, so the message texts
/// here are part of the report contract.
#[derive(Debug, Error)]
pub enum RowFailure {
    /// Role code not present in the active catalog.
    #[error("Invalid role code.")]
    InvalidRoleCode,

    /// Action token not one of REPLACE/ADD/APPEND/REMOVE.
    #[error("Invalid action.")]
    InvalidAction,

    /// Inline-id mode is on and the `keycloak-userId` column is missing or empty.
    #[error("Keycloak user ID is mandatory.")]
    InlineUserIdMissing,

    /// The identity directory had no match for the login identifier.
    #[error("User not found in the identity directory.")]
    UserNotFound,

    /// Creating the new assignment record failed.
    #[error("Failed to create the user role.")]
    CreateFailed,

    /// The identity directory call itself failed.
    #[error("{0}")]
    Directory(String),

    /// A repository read or update failed for this row.
    #[error("{0}")]
    Repository(String),
}

/// The bulk reconciliation engine.
///
/// All collaborators are injected; the engine owns no ambient state. Rows are
/// processed sequentially in input order, which keeps the per-run identity
/// cache coherent and makes the output deterministic. Two rows targeting the
/// same user are therefore applied as a strict sequence, preserving the
/// read-modify-write invariant on `roles`.
pub struct Reconciler {
    repository: Arc<dyn UserRoleRepository>,
    role_directory: Arc<dyn RoleDirectory>,
    identity_directory: Arc<dyn IdentityDirectory>,
    config: ReconcilerConfig,
}

impl Reconciler {
    /// Create an engine with explicit collaborators.
    #[must_use]
    pub fn new(
        repository: Arc<dyn UserRoleRepository>,
        role_directory: Arc<dyn RoleDirectory>,
        identity_directory: Arc<dyn IdentityDirectory>,
        config: ReconcilerConfig,
    ) -> Self {
        Self {
            repository,
            role_directory,
            identity_directory,
            config,
        }
    }

    /// Reconcile a batch of change rows.
    ///
    /// Returns one outcome per input row, in input order. Serves both the
    /// bulk-create and bulk-update entry points, which are today the same
    /// reconciliation. There is no up-front storage check: a repository
    /// outage surfaces as a failure status on each affected row, so the
    /// report still accounts for every row (see DESIGN.md).
    pub async fn run(
        &self,
        rows: Vec<ChangeRow>,
        caller: &CallerIdentity,
    ) -> Result<Vec<OutcomeRow>, RolesApiError> {
        let catalog = RoleCatalog::load(self.role_directory.as_ref()).await?;
        let mut resolver = IdentityResolver::new(self.identity_directory.clone(), &self.config);

        tracing::info!(rows = rows.len(), "Starting role reconciliation run");

        let mut outcomes = Vec::with_capacity(rows.len());
        let mut failures = 0usize;

        for (index, row) in rows.into_iter().enumerate() {
            match self.process_row(&row, &catalog, &mut resolver, caller).await {
                Ok(record_id) => outcomes.push(OutcomeRow::success(row, record_id)),
                Err(failure) => {
                    tracing::warn!(
                        row = index,
                        user = %row.user,
                        error = %failure,
                        "Row reconciliation failed"
                    );
                    failures += 1;
                    outcomes.push(OutcomeRow::failed(row, failure.to_string()));
                }
            }
        }

        tracing::info!(
            rows = outcomes.len(),
            failed = failures,
            "Reconciliation run complete"
        );

        Ok(outcomes)
    }

    /// Process one row. Any `Err` is that row's outcome, never the batch's.
    async fn process_row(
        &self,
        row: &ChangeRow,
        catalog: &RoleCatalog,
        resolver: &mut IdentityResolver,
        caller: &CallerIdentity,
    ) -> Result<Uuid, RowFailure> {
        let role_ref = catalog.get(&row.code).ok_or(RowFailure::InvalidRoleCode)?;

        let action = Action::from_token(&row.action).ok_or(RowFailure::InvalidAction)?;

        let user_id = resolver.resolve(row, &caller.token).await?;

        let existing = self
            .repository
            .find_by_user_id(&user_id)
            .await
            .map_err(|e| RowFailure::Repository(e.to_string()))?;

        match existing {
            Some(record) => {
                let mut roles = record.roles.clone();
                apply_action(&mut roles, action, role_ref);

                let patch = UpdateUserRoleAssignment {
                    roles,
                    custom_attributes: merge_extra_attributes(
                        &record.custom_attributes,
                        &row.extra,
                    ),
                    updated_by: caller.user_id.clone(),
                };

                self.repository
                    .update(record.id, patch)
                    .await
                    .map_err(|e| RowFailure::Repository(e.to_string()))?;

                Ok(record.id)
            }
            None => {
                let draft = CreateUserRoleAssignment {
                    user_id,
                    username: row.user.clone(),
                    roles: vec![role_ref.clone()],
                    custom_attributes: merge_extra_attributes(
                        &serde_json::Value::Null,
                        &row.extra,
                    ),
                    created_by: caller.user_id.clone(),
                };

                let created = self.repository.create(draft).await.map_err(|e| {
                    tracing::error!(user = %row.user, error = %e, "Assignment creation failed");
                    RowFailure::CreateFailed
                })?;

                Ok(created.id)
            }
        }
    }
}

/// Merge one role reference into a `roles` array under the row's action.
///
/// REPLACE overwrites at the index found by code match and deliberately
/// no-ops when there is no match (see DESIGN.md). ADD/APPEND insert if
/// absent; REMOVE deletes if present. None of the arms can introduce a
/// duplicate code.
fn apply_action(roles: &mut Vec<RoleRef>, action: Action, role_ref: &RoleRef) {
    let position = roles.iter().position(|r| r.code == role_ref.code);

    match action {
        Action::Replace => {
            if let Some(index) = position {
                roles[index] = role_ref.clone();
            }
        }
        Action::Add | Action::Append => {
            if position.is_none() {
                roles.push(role_ref.clone());
            }
        }
        Action::Remove => {
            if let Some(index) = position {
                roles.remove(index);
            }
        }
    }
}
