//! Database layer for the ursa platform user-role service.
//!
//! Provides the connection pool wrapper, embedded SQL migrations, and
//! type-safe models for the `platform_roles` catalog and the
//! `user_role_assignments` table.

pub mod error;
pub mod migrations;
pub mod models;
pub mod pool;

pub use error::DbError;
pub use migrations::run_migrations;
pub use pool::DbPool;
