//! User-role assignment model.
//!
//! One row per platform user, keyed by the canonical user id issued by the
//! external identity directory. The `roles` column is a JSONB array of
//! [`RoleRef`] entries; role codes are unique within the array.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

/// Minimal role reference stored on an assignment record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleRef {
    /// Catalog identifier of the role.
    #[serde(rename = "roleId")]
    pub role_id: Uuid,

    /// Role code, unique within an assignment's `roles` array.
    pub code: String,
}

/// Assignment record status.
///
/// Records are never deleted; a retired user is flipped to `Inactive`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "assignment_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum AssignmentStatus {
    Active,
    Inactive,
}

/// A user's persisted role assignment record.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct UserRoleAssignment {
    /// Unique identifier for the record.
    pub id: Uuid,

    /// Canonical user identifier from the identity directory. Unique.
    pub user_id: String,

    /// Login/display identifier the user was first imported under.
    pub username: String,

    /// Current role references. Codes are unique within the array.
    #[sqlx(json)]
    pub roles: Vec<RoleRef>,

    /// Record status.
    pub status: AssignmentStatus,

    /// Extra row-supplied attributes merged in during reconciliation.
    #[sqlx(json)]
    pub custom_attributes: serde_json::Value,

    /// Caller identity that created the record.
    pub created_by: String,

    /// Caller identity that last updated the record.
    pub updated_by: String,

    /// When the record was created.
    pub created_at: DateTime<Utc>,

    /// When the record was last updated.
    pub updated_at: DateTime<Utc>,
}

/// Draft for creating a new assignment record.
#[derive(Debug, Clone)]
pub struct CreateUserRoleAssignment {
    pub user_id: String,
    pub username: String,
    pub roles: Vec<RoleRef>,
    pub custom_attributes: serde_json::Value,
    pub created_by: String,
}

/// Patch applied to an existing assignment record.
#[derive(Debug, Clone)]
pub struct UpdateUserRoleAssignment {
    pub roles: Vec<RoleRef>,
    pub custom_attributes: serde_json::Value,
    pub updated_by: String,
}

impl UserRoleAssignment {
    /// Find a record by canonical user id, regardless of status.
    pub async fn find_by_user_id(
        pool: &PgPool,
        user_id: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            r#"
            SELECT id, user_id, username, roles, status, custom_attributes,
                   created_by, updated_by, created_at, updated_at
            FROM user_role_assignments
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(pool)
        .await
    }

    /// Find the active record for a canonical user id.
    pub async fn find_active_by_user_id(
        pool: &PgPool,
        user_id: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            r#"
            SELECT id, user_id, username, roles, status, custom_attributes,
                   created_by, updated_by, created_at, updated_at
            FROM user_role_assignments
            WHERE user_id = $1 AND status = 'active'
            "#,
        )
        .bind(user_id)
        .fetch_optional(pool)
        .await
    }

    /// Insert a new assignment record. New records start active, and the
    /// creating caller is also the initial updater.
    pub async fn create(
        pool: &PgPool,
        draft: CreateUserRoleAssignment,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            r#"
            INSERT INTO user_role_assignments
                (user_id, username, roles, custom_attributes, created_by, updated_by)
            VALUES ($1, $2, $3, $4, $5, $5)
            RETURNING id, user_id, username, roles, status, custom_attributes,
                      created_by, updated_by, created_at, updated_at
            "#,
        )
        .bind(&draft.user_id)
        .bind(&draft.username)
        .bind(Json(&draft.roles))
        .bind(&draft.custom_attributes)
        .bind(&draft.created_by)
        .fetch_one(pool)
        .await
    }

    /// Apply a reconciliation patch to an existing record.
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        patch: UpdateUserRoleAssignment,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            UPDATE user_role_assignments
            SET roles = $2,
                custom_attributes = $3,
                updated_by = $4,
                updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(Json(&patch.roles))
        .bind(&patch.custom_attributes)
        .bind(&patch.updated_by)
        .execute(pool)
        .await?;

        Ok(())
    }
}
