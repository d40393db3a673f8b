//! Database entity models for ursa-db.

pub mod platform_role;
pub mod user_role_assignment;

pub use platform_role::{PlatformRole, RoleStatus};
pub use user_role_assignment::{
    AssignmentStatus, CreateUserRoleAssignment, RoleRef, UpdateUserRoleAssignment,
    UserRoleAssignment,
};
