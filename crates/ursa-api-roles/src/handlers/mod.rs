//! HTTP handlers for the platform user-role API.

pub mod bulk;
pub mod profile;
