//! Services for the platform user-role API.

pub mod identity_resolver;
pub mod reconciler;
pub mod report;
pub mod role_catalog;
pub mod row_decoder;
