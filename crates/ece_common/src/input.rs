//! Input files: JSON payloads and organization/space CSV rows

use crate::error::InputError;
use serde::de::DeserializeOwned;
use std::collections::HashSet;
use std::fs;
use std::io::Read;
use std::path::Path;

/// Read and decode a JSON file
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, InputError> {
    let contents = fs::read_to_string(path).map_err(|source| InputError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&contents).map_err(|source| InputError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// One row of the organization/space file.
///
/// Columns: Kibana space name, organization, cloud (PCF/GCP) space.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrgSpaceRow {
    pub kibana_space: String,
    pub organization: String,
    pub cloud_space: String,
}

const ORG_SPACE_COLUMNS: usize = 3;

/// Read the organization/space CSV file.
///
/// The first line is a header. Lines starting with `#` and blank lines are
/// skipped. Fields are trimmed.
pub fn read_org_spaces(path: &Path) -> Result<Vec<OrgSpaceRow>, InputError> {
    let file = fs::File::open(path).map_err(|source| InputError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_org_spaces(file, path)
}

fn parse_org_spaces<R: Read>(reader: R, path: &Path) -> Result<Vec<OrgSpaceRow>, InputError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .comment(Some(b'#'))
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| InputError::Csv {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        if record.iter().all(|field| field.is_empty()) {
            continue;
        }

        if record.len() < ORG_SPACE_COLUMNS {
            return Err(InputError::MalformedRow {
                path: path.to_path_buf(),
                line: record.position().map(|p| p.line()).unwrap_or(0),
                expected: ORG_SPACE_COLUMNS,
                found: record.len(),
            });
        }

        rows.push(OrgSpaceRow {
            kibana_space: record[0].to_string(),
            organization: record[1].to_string(),
            cloud_space: record[2].to_string(),
        });
    }

    Ok(rows)
}

/// Organizations in first-seen order, without duplicates
pub fn distinct_organizations(rows: &[OrgSpaceRow]) -> Vec<&str> {
    let mut seen = HashSet::new();
    rows.iter()
        .map(|row| row.organization.as_str())
        .filter(|org| seen.insert(*org))
        .collect()
}
