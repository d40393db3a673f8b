//! Bulk upload handlers.
//!
//! - POST /v1/platform-user-roles/bulk-create — CSV upload, reconcile, report
//! - POST /v1/platform-user-roles/bulk-update — same routine
//!
//! Both entry points run the same reconciliation today; they are kept as
//! separate routes for API compatibility with the upstream consumers.

use axum::{
    http::header,
    response::{IntoResponse, Response},
    Extension,
};
use axum_extra::extract::Multipart;

use crate::error::RolesApiError;
use crate::models::CallerIdentity;
use crate::router::RolesState;
use crate::services::report::REPORT_FILE_NAME;
use crate::services::{report, row_decoder};

/// POST /v1/platform-user-roles/bulk-create
pub async fn bulk_create(
    Extension(state): Extension<RolesState>,
    Extension(caller): Extension<CallerIdentity>,
    multipart: Multipart,
) -> Result<Response, RolesApiError> {
    reconcile_upload(&state, &caller, multipart).await
}

/// POST /v1/platform-user-roles/bulk-update
pub async fn bulk_update(
    Extension(state): Extension<RolesState>,
    Extension(caller): Extension<CallerIdentity>,
    multipart: Multipart,
) -> Result<Response, RolesApiError> {
    reconcile_upload(&state, &caller, multipart).await
}

/// Shared upload path: read the file, decode rows, reconcile, return the
/// row-by-row report as a CSV attachment.
async fn reconcile_upload(
    state: &RolesState,
    caller: &CallerIdentity,
    multipart: Multipart,
) -> Result<Response, RolesApiError> {
    let data = read_upload(multipart).await?;
    let rows = row_decoder::decode(&data)?;

    tracing::info!(rows = rows.len(), "Received bulk role upload");

    let outcomes = state.reconciler.run(rows, caller).await?;
    let body = report::encode(&outcomes)?;

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{REPORT_FILE_NAME}\""),
            ),
        ],
        body,
    )
        .into_response())
}

/// Extract the uploaded file bytes from the multipart body (`file` field).
async fn read_upload(mut multipart: Multipart) -> Result<Vec<u8>, RolesApiError> {
    let mut file_data: Option<Vec<u8>> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| RolesApiError::Internal(format!("Multipart read error: {e}")))?
    {
        if field.name().unwrap_or("") == "file" {
            let bytes = field
                .bytes()
                .await
                .map_err(|e| RolesApiError::Internal(format!("Failed to read file: {e}")))?;
            file_data = Some(bytes.to_vec());
        }
    }

    file_data.ok_or(RolesApiError::MissingFile)
}
