//! Profile read handlers.
//!
//! - GET /v1/platform-user-roles/profile — caller's own profile
//! - GET /`v1/platform-user-roles/profile/:user_id` — profile by user id
//!
//! A missing profile is reported in the body with an explanatory message,
//! not as an HTTP error.

use axum::{extract::Path, Extension, Json};

use crate::error::RolesApiError;
use crate::models::{CallerIdentity, ProfileResponse};
use crate::router::RolesState;

/// GET /v1/platform-user-roles/profile
pub async fn get_own_profile(
    Extension(state): Extension<RolesState>,
    Extension(caller): Extension<CallerIdentity>,
) -> Result<Json<ProfileResponse>, RolesApiError> {
    fetch_profile(&state, &caller.user_id).await
}

/// GET /`v1/platform-user-roles/profile/:user_id`
pub async fn get_profile(
    Extension(state): Extension<RolesState>,
    Extension(caller): Extension<CallerIdentity>,
    Path(user_id): Path<String>,
) -> Result<Json<ProfileResponse>, RolesApiError> {
    let target = if user_id.is_empty() {
        caller.user_id.clone()
    } else {
        user_id
    };
    fetch_profile(&state, &target).await
}

async fn fetch_profile(
    state: &RolesState,
    user_id: &str,
) -> Result<Json<ProfileResponse>, RolesApiError> {
    match state.repository.find_active_by_user_id(user_id).await? {
        Some(record) => Ok(Json(ProfileResponse {
            message: "Platform user profile fetched successfully.".to_string(),
            result: Some(record),
        })),
        None => Ok(Json(ProfileResponse {
            message: "No platform user for given params".to_string(),
            result: None,
        })),
    }
}
