//! CSV report encoder.
//!
//! Renders the outcome rows back into a downloadable CSV: the original
//! columns followed by `_SYSTEM_ID` and `status`. Row order matches the
//! upload; extra columns are emitted in sorted order so the report layout is
//! deterministic.

use std::collections::BTreeSet;

use crate::error::RolesApiError;
use crate::models::{
    OutcomeRow, COL_ACTION, COL_CODE, COL_KEYCLOAK_USER_ID, COL_STATUS, COL_SYSTEM_ID, COL_USER,
};

/// Default filename for the downloadable report.
pub const REPORT_FILE_NAME: &str = "UserRole-Upload.csv";

/// Encode outcome rows as a CSV report.
pub fn encode(rows: &[OutcomeRow]) -> Result<Vec<u8>, RolesApiError> {
    let has_inline_id = rows.iter().any(|r| r.row.keycloak_user_id.is_some());

    let extra_columns: BTreeSet<&str> = rows
        .iter()
        .flat_map(|r| r.row.extra.keys().map(String::as_str))
        .collect();

    let mut writer = csv::Writer::from_writer(Vec::new());

    let mut header: Vec<&str> = vec![COL_USER, COL_CODE, COL_ACTION];
    header.extend(extra_columns.iter().copied());
    if has_inline_id {
        header.push(COL_KEYCLOAK_USER_ID);
    }
    header.push(COL_SYSTEM_ID);
    header.push(COL_STATUS);

    writer
        .write_record(&header)
        .map_err(|e| RolesApiError::Internal(format!("Failed to write report header: {e}")))?;

    for outcome in rows {
        let mut record: Vec<String> = vec![
            outcome.row.user.clone(),
            outcome.row.code.clone(),
            outcome.row.action.clone(),
        ];
        for column in &extra_columns {
            record.push(
                outcome
                    .row
                    .extra
                    .get(*column)
                    .cloned()
                    .unwrap_or_default(),
            );
        }
        if has_inline_id {
            record.push(outcome.row.keycloak_user_id.clone().unwrap_or_default());
        }
        record.push(
            outcome
                .system_id
                .map(|id| id.to_string())
                .unwrap_or_default(),
        );
        record.push(outcome.status.clone());

        writer
            .write_record(&record)
            .map_err(|e| RolesApiError::Internal(format!("Failed to write report row: {e}")))?;
    }

    writer
        .into_inner()
        .map_err(|e| RolesApiError::Internal(format!("Failed to finish report: {e}")))
}
