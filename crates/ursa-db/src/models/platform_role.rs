//! Platform role catalog model.
//!
//! A `PlatformRole` is one entry in the catalog of assignable roles. The
//! reconciliation engine only ever reads the active slice of this table.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

/// Role catalog entry status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "role_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum RoleStatus {
    /// Role can be assigned.
    Active,
    /// Role is retired; no new assignments.
    Inactive,
}

/// One entry in the platform role catalog.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct PlatformRole {
    /// Unique identifier for the role.
    pub id: Uuid,

    /// Short unique role code (e.g. "OBS_DESIGNER").
    pub code: String,

    /// Human-readable role title.
    pub title: String,

    /// Whether the role is currently assignable.
    pub status: RoleStatus,

    /// When the role was created.
    pub created_at: DateTime<Utc>,

    /// When the role was last updated.
    pub updated_at: DateTime<Utc>,
}

impl PlatformRole {
    /// List all active catalog roles.
    pub async fn list_active(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            r#"
            SELECT id, code, title, status, created_at, updated_at
            FROM platform_roles
            WHERE status = 'active'
            ORDER BY code
            "#,
        )
        .fetch_all(pool)
        .await
    }
}
