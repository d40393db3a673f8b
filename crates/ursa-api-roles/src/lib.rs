//! Platform user-role API.
//!
//! This crate provides:
//! - The bulk role reconciliation engine: consumes ordered change rows,
//!   resolves each user to a canonical identity, merges the requested role
//!   change into the user's assignment record, and reports a per-row outcome.
//! - CSV row decoding and report encoding for the upload/download surfaces.
//! - REST endpoints for profile lookup and bulk create/update uploads.
//!
//! # Example
//!
//! ```rust,ignore
//! use ursa_api_roles::{user_roles_router, RolesState};
//! use axum::Router;
//!
//! let state = RolesState::new(pool, identity_directory, config);
//! let app = Router::new().merge(user_roles_router(state));
//! ```

pub mod error;
pub mod handlers;
pub mod models;
pub mod repository;
pub mod router;
pub mod services;

pub use error::RolesApiError;
pub use models::{Action, CallerIdentity, ChangeRow, OutcomeRow, ReconcilerConfig};
pub use router::{user_roles_router, RolesState};
pub use services::reconciler::Reconciler;
