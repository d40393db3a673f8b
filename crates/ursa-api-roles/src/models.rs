//! Request/response models and the change-row data contract.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use ursa_db::models::UserRoleAssignment;

/// Source column carrying the login identifier.
pub const COL_USER: &str = "user";
/// Source column carrying the role code.
pub const COL_CODE: &str = "code";
/// Source column carrying the action token.
pub const COL_ACTION: &str = "action";
/// Optional source column carrying the canonical user id inline.
pub const COL_KEYCLOAK_USER_ID: &str = "keycloak-userId";
/// Report column carrying the persisted record id.
pub const COL_SYSTEM_ID: &str = "_SYSTEM_ID";
/// Report column carrying the per-row outcome.
pub const COL_STATUS: &str = "status";

/// Row fields that are never overwritten from row-supplied extras when
/// merging into a persisted assignment record. The structured columns
/// (`user`, `code`, `action`, `keycloak-userId`) are consumed by the engine
/// rather than persisted.
pub const EXCLUDED_MERGE_FIELDS: &[&str] = &[
    "username",
    "userId",
    "createdBy",
    "updatedBy",
    "createdAt",
    "updatedAt",
    "status",
    "roles",
    COL_USER,
    COL_CODE,
    COL_ACTION,
    COL_KEYCLOAK_USER_ID,
];

/// One role-change request decoded from the uploaded file.
///
/// Transient: consumed by the reconciliation engine, never persisted as-is.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeRow {
    /// Login identifier (username/email) as entered in the source file.
    pub user: String,

    /// Requested role code.
    pub code: String,

    /// Raw action token; validated against [`Action`] per row.
    pub action: String,

    /// Canonical user id supplied inline, when the file carries one.
    pub keycloak_user_id: Option<String>,

    /// Any additional source columns, in deterministic order.
    pub extra: BTreeMap<String, String>,
}

/// Merge semantics requested by a change row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Overwrite the matching role reference in place; no-op when absent.
    Replace,
    /// Insert the role reference if absent (idempotent).
    Add,
    /// Alias of [`Action::Add`].
    Append,
    /// Delete the matching role reference if present (idempotent).
    Remove,
}

impl Action {
    /// Map an input token to an action. Tokens are case-sensitive.
    #[must_use]
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "REPLACE" => Some(Self::Replace),
            "ADD" => Some(Self::Add),
            "APPEND" => Some(Self::Append),
            "REMOVE" => Some(Self::Remove),
            _ => None,
        }
    }
}

/// A change row augmented with its reconciliation outcome.
#[derive(Debug, Clone)]
pub struct OutcomeRow {
    /// The original row, unchanged.
    pub row: ChangeRow,

    /// Persisted record id when the row succeeded.
    pub system_id: Option<Uuid>,

    /// `"Success"` or the row-local failure message.
    pub status: String,
}

impl OutcomeRow {
    /// Build a successful outcome.
    #[must_use]
    pub fn success(row: ChangeRow, system_id: Uuid) -> Self {
        Self {
            row,
            system_id: Some(system_id),
            status: "Success".to_string(),
        }
    }

    /// Build a failed outcome with the failure message as the row status.
    #[must_use]
    pub fn failed(row: ChangeRow, status: String) -> Self {
        Self {
            row,
            system_id: None,
            status,
        }
    }
}

/// The already-authenticated caller on whose behalf a request runs.
///
/// Installed as a request extension by the deployment's auth middleware;
/// this crate does not authenticate.
#[derive(Debug, Clone)]
pub struct CallerIdentity {
    /// Caller's own canonical user id; recorded as `createdBy`/`updatedBy`.
    pub user_id: String,

    /// Bearer token forwarded to the identity directory.
    pub token: String,
}

/// Reconciliation engine configuration.
#[derive(Debug, Clone, Default)]
pub struct ReconcilerConfig {
    /// When set, the canonical user id must be supplied inline in the
    /// `keycloak-userId` column and the identity directory is never called.
    pub require_inline_user_id: bool,
}

/// Response body for the profile read surface.
///
/// A missing profile is a non-fatal result with an explanatory message,
/// not an HTTP error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileResponse {
    /// Human-readable outcome message.
    pub message: String,

    /// The active assignment record, when one exists.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<UserRoleAssignment>,
}

/// Merge row-supplied extra attributes into an attribute document,
/// enforcing the fixed exclusion list.
#[must_use]
pub fn merge_extra_attributes(
    existing: &serde_json::Value,
    extra: &BTreeMap<String, String>,
) -> serde_json::Value {
    let mut map = match existing {
        serde_json::Value::Object(m) => m.clone(),
        _ => serde_json::Map::new(),
    };

    for (key, value) in extra {
        if EXCLUDED_MERGE_FIELDS.contains(&key.as_str()) {
            continue;
        }
        map.insert(key.clone(), serde_json::Value::String(value.clone()));
    }

    serde_json::Value::Object(map)
}
