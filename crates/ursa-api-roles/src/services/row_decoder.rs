//! CSV row decoder for bulk uploads.
//!
//! Turns an uploaded byte stream into ordered [`ChangeRow`]s. Only structural
//! problems (empty file, unreadable header, missing mandatory columns, no
//! data rows) fail the decode; row *content* problems such as an unknown role
//! code are left for the reconciliation engine to report per row.

use std::collections::{BTreeMap, HashMap};

use crate::error::RolesApiError;
use crate::models::{ChangeRow, COL_ACTION, COL_CODE, COL_KEYCLOAK_USER_ID, COL_USER};

/// UTF-8 BOM bytes.
const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// Strip UTF-8 BOM from the beginning of data if present.
fn strip_utf8_bom(data: &[u8]) -> &[u8] {
    if data.starts_with(UTF8_BOM) {
        &data[UTF8_BOM.len()..]
    } else {
        data
    }
}

/// Decode an uploaded CSV file into ordered change rows.
pub fn decode(data: &[u8]) -> Result<Vec<ChangeRow>, RolesApiError> {
    let data = strip_utf8_bom(data);

    if data.is_empty() {
        return Err(RolesApiError::MissingFile);
    }

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(data);

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| RolesApiError::InvalidCsv(format!("Failed to read CSV headers: {e}")))?
        .iter()
        .map(std::string::ToString::to_string)
        .collect();

    let columns: HashMap<&str, usize> = headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (name.as_str(), idx))
        .collect();

    for required in [COL_USER, COL_CODE, COL_ACTION] {
        if !columns.contains_key(required) {
            return Err(RolesApiError::InvalidCsv(format!(
                "Missing required column '{required}'"
            )));
        }
    }

    let mut rows = Vec::new();

    for record in reader.records() {
        let record =
            record.map_err(|e| RolesApiError::InvalidCsv(format!("Failed to parse CSV row: {e}")))?;

        let get = |name: &str| -> Option<String> {
            columns
                .get(name)
                .and_then(|&idx| record.get(idx))
                .map(|s| s.trim().to_string())
        };

        let keycloak_user_id = get(COL_KEYCLOAK_USER_ID).filter(|s| !s.is_empty());

        let mut extra = BTreeMap::new();
        for (name, &idx) in &columns {
            if matches!(*name, COL_USER | COL_CODE | COL_ACTION | COL_KEYCLOAK_USER_ID) {
                continue;
            }
            if let Some(value) = record.get(idx) {
                let trimmed = value.trim();
                if !trimmed.is_empty() {
                    extra.insert((*name).to_string(), trimmed.to_string());
                }
            }
        }

        rows.push(ChangeRow {
            user: get(COL_USER).unwrap_or_default(),
            code: get(COL_CODE).unwrap_or_default(),
            action: get(COL_ACTION).unwrap_or_default(),
            keycloak_user_id,
            extra,
        });
    }

    if rows.is_empty() {
        return Err(RolesApiError::MissingFile);
    }

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_valid_rows() {
        let csv = b"user,code,action\na1,OBS_DESIGNER,ADD\nb2,OBS_REVIEWER,REMOVE";
        let rows = decode(csv).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].user, "a1");
        assert_eq!(rows[0].code, "OBS_DESIGNER");
        assert_eq!(rows[0].action, "ADD");
        assert_eq!(rows[1].action, "REMOVE");
    }

    #[test]
    fn test_decode_captures_extra_columns() {
        let csv = b"user,code,action,org,program\na1,OBS_DESIGNER,ADD,obs,teach";
        let rows = decode(csv).unwrap();
        assert_eq!(rows[0].extra.get("org"), Some(&"obs".to_string()));
        assert_eq!(rows[0].extra.get("program"), Some(&"teach".to_string()));
    }

    #[test]
    fn test_decode_keycloak_user_id_column() {
        let csv = b"user,code,action,keycloak-userId\na1,OBS_DESIGNER,ADD,uid-1";
        let rows = decode(csv).unwrap();
        assert_eq!(rows[0].keycloak_user_id.as_deref(), Some("uid-1"));
        assert!(rows[0].extra.is_empty());
    }

    #[test]
    fn test_decode_empty_keycloak_user_id_is_none() {
        let csv = b"user,code,action,keycloak-userId\na1,OBS_DESIGNER,ADD,";
        let rows = decode(csv).unwrap();
        assert!(rows[0].keycloak_user_id.is_none());
    }

    #[test]
    fn test_decode_trims_values() {
        let csv = b"user,code,action\n a1 , OBS_DESIGNER , ADD ";
        let rows = decode(csv).unwrap();
        assert_eq!(rows[0].user, "a1");
        assert_eq!(rows[0].code, "OBS_DESIGNER");
        assert_eq!(rows[0].action, "ADD");
    }

    #[test]
    fn test_decode_strips_utf8_bom() {
        let mut csv = vec![0xEF, 0xBB, 0xBF];
        csv.extend_from_slice(b"user,code,action\na1,OBS_DESIGNER,ADD");
        let rows = decode(&csv).unwrap();
        assert_eq!(rows[0].user, "a1");
    }

    #[test]
    fn test_decode_missing_required_column_fails() {
        let csv = b"user,action\na1,ADD";
        let err = decode(csv).unwrap_err();
        assert!(err.to_string().contains("code"));
    }

    #[test]
    fn test_decode_empty_file_fails() {
        assert!(decode(b"").is_err());
    }

    #[test]
    fn test_decode_header_only_file_fails() {
        assert!(decode(b"user,code,action").is_err());
    }

    #[test]
    fn test_decode_preserves_row_order() {
        let csv = b"user,code,action\nu3,C,ADD\nu1,A,ADD\nu2,B,ADD";
        let rows = decode(csv).unwrap();
        let users: Vec<_> = rows.iter().map(|r| r.user.as_str()).collect();
        assert_eq!(users, vec!["u3", "u1", "u2"]);
    }
}
