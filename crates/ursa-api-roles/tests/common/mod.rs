//! Integration test helpers for ursa-api-roles.
//!
//! Provides in-memory fakes for the repository and both directories so the
//! reconciliation engine can be exercised without a database or network.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, Once};

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use ursa_api_roles::error::RolesApiError;
use ursa_api_roles::models::{CallerIdentity, ChangeRow};
use ursa_api_roles::repository::UserRoleRepository;
use ursa_api_roles::services::identity_resolver::{IdentityDirectory, IdentityRecord};
use ursa_api_roles::services::role_catalog::RoleDirectory;
use ursa_db::models::{
    AssignmentStatus, CreateUserRoleAssignment, PlatformRole, RoleRef, RoleStatus,
    UpdateUserRoleAssignment, UserRoleAssignment,
};

static INIT: Once = Once::new();

/// Initialize logging for tests (once).
pub fn init_test_logging() {
    INIT.call_once(|| {
        if std::env::var("RUST_LOG").is_ok() {
            tracing_subscriber::fmt()
                .with_test_writer()
                .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
                .try_init()
                .ok();
        }
    });
}

/// The caller identity used across tests.
pub fn test_caller() -> CallerIdentity {
    CallerIdentity {
        user_id: "admin-1".to_string(),
        token: "test-token".to_string(),
    }
}

/// Build a change row with no inline id and no extras.
pub fn make_row(user: &str, code: &str, action: &str) -> ChangeRow {
    ChangeRow {
        user: user.to_string(),
        code: code.to_string(),
        action: action.to_string(),
        keycloak_user_id: None,
        extra: Default::default(),
    }
}

/// Build a catalog role.
pub fn make_role(code: &str) -> PlatformRole {
    PlatformRole {
        id: Uuid::new_v4(),
        code: code.to_string(),
        title: code.to_string(),
        status: RoleStatus::Active,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

/// Build an assignment record as it would exist in storage.
pub fn make_assignment(user_id: &str, roles: Vec<RoleRef>) -> UserRoleAssignment {
    UserRoleAssignment {
        id: Uuid::new_v4(),
        user_id: user_id.to_string(),
        username: user_id.to_string(),
        roles,
        status: AssignmentStatus::Active,
        custom_attributes: serde_json::json!({}),
        created_by: "seed".to_string(),
        updated_by: "seed".to_string(),
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

/// In-memory assignment repository with call counters and failure toggles.
#[derive(Default)]
pub struct InMemoryUserRoleRepository {
    records: Mutex<HashMap<String, UserRoleAssignment>>,
    pub creates: AtomicUsize,
    pub updates: AtomicUsize,
    pub fail_create: AtomicBool,
    pub fail_update: AtomicBool,
}

impl InMemoryUserRoleRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an existing record.
    pub fn insert(&self, record: UserRoleAssignment) {
        self.records
            .lock()
            .unwrap()
            .insert(record.user_id.clone(), record);
    }

    /// Fetch the stored record for a canonical user id.
    pub fn get(&self, user_id: &str) -> Option<UserRoleAssignment> {
        self.records.lock().unwrap().get(user_id).cloned()
    }

    pub fn len(&self) -> usize {
        self.records.lock().unwrap().len()
    }

    pub fn write_count(&self) -> usize {
        self.creates.load(Ordering::SeqCst) + self.updates.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl UserRoleRepository for InMemoryUserRoleRepository {
    async fn find_by_user_id(
        &self,
        user_id: &str,
    ) -> Result<Option<UserRoleAssignment>, RolesApiError> {
        Ok(self.get(user_id))
    }

    async fn find_active_by_user_id(
        &self,
        user_id: &str,
    ) -> Result<Option<UserRoleAssignment>, RolesApiError> {
        Ok(self
            .get(user_id)
            .filter(|r| r.status == AssignmentStatus::Active))
    }

    async fn create(
        &self,
        draft: CreateUserRoleAssignment,
    ) -> Result<UserRoleAssignment, RolesApiError> {
        self.creates.fetch_add(1, Ordering::SeqCst);
        if self.fail_create.load(Ordering::SeqCst) {
            return Err(RolesApiError::Internal("insert failed".to_string()));
        }

        let now = Utc::now();
        let record = UserRoleAssignment {
            id: Uuid::new_v4(),
            user_id: draft.user_id,
            username: draft.username,
            roles: draft.roles,
            status: AssignmentStatus::Active,
            custom_attributes: draft.custom_attributes,
            created_by: draft.created_by.clone(),
            updated_by: draft.created_by,
            created_at: now,
            updated_at: now,
        };
        self.insert(record.clone());
        Ok(record)
    }

    async fn update(
        &self,
        id: Uuid,
        patch: UpdateUserRoleAssignment,
    ) -> Result<(), RolesApiError> {
        self.updates.fetch_add(1, Ordering::SeqCst);
        if self.fail_update.load(Ordering::SeqCst) {
            return Err(RolesApiError::Internal("update failed".to_string()));
        }

        let mut records = self.records.lock().unwrap();
        let record = records
            .values_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| RolesApiError::Internal("record not found".to_string()))?;

        record.roles = patch.roles;
        record.custom_attributes = patch.custom_attributes;
        record.updated_by = patch.updated_by;
        record.updated_at = Utc::now();
        Ok(())
    }
}

/// Role directory serving a fixed catalog, with a failure toggle.
#[derive(Default)]
pub struct StubRoleDirectory {
    pub roles: Vec<PlatformRole>,
    pub fail: bool,
}

impl StubRoleDirectory {
    pub fn with_roles(roles: Vec<PlatformRole>) -> Self {
        Self { roles, fail: false }
    }

    pub fn failing() -> Self {
        Self {
            roles: Vec::new(),
            fail: true,
        }
    }
}

#[async_trait]
impl RoleDirectory for StubRoleDirectory {
    async fn list_active(&self) -> Result<Vec<PlatformRole>, RolesApiError> {
        if self.fail {
            return Err(RolesApiError::RoleDirectory(
                "directory unreachable".to_string(),
            ));
        }
        Ok(self.roles.clone())
    }
}

/// Identity directory over a fixed login-id mapping, counting lookups.
#[derive(Default)]
pub struct StubIdentityDirectory {
    entries: Mutex<HashMap<String, String>>,
    pub lookups: AtomicUsize,
}

impl StubIdentityDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a login id → canonical id mapping.
    pub fn register(&self, login_id: &str, user_id: &str) {
        self.entries
            .lock()
            .unwrap()
            .insert(login_id.to_string(), user_id.to_string());
    }

    pub fn lookup_count(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl IdentityDirectory for StubIdentityDirectory {
    async fn lookup_by_login_id(
        &self,
        _token: &str,
        login_id: &str,
    ) -> Result<Vec<IdentityRecord>, RolesApiError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .entries
            .lock()
            .unwrap()
            .get(login_id)
            .map(|id| {
                vec![IdentityRecord {
                    user_login_id: id.clone(),
                }]
            })
            .unwrap_or_default())
    }
}
