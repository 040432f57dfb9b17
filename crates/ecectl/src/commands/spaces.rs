//! delete-rbac and delete-index-patterns

use crate::output;
use anyhow::Result;
use ece_common::cleanup::{self, IndexPatternTarget};
use ece_common::config::SpaceSettings;
use ece_common::input::read_org_spaces;
use ece_common::{EceError, RestClient};
use std::path::Path;
use tracing::info;

pub fn rbac_paths(org_space_file: &Path) -> Result<Vec<String>> {
    let rows = read_org_spaces(org_space_file).map_err(EceError::from)?;
    info!("Read {} organization/space rows", rows.len());
    Ok(cleanup::rbac_plan(&rows))
}

pub fn index_pattern_paths(org_space_file: &Path, settings: &SpaceSettings) -> Result<Vec<String>> {
    let rows = read_org_spaces(org_space_file).map_err(EceError::from)?;
    info!("Read {} organization/space rows", rows.len());
    Ok(cleanup::index_pattern_plan(&rows, settings)
        .iter()
        .map(IndexPatternTarget::path)
        .collect())
}

pub fn print_plan(what: &str, paths: &[String]) {
    output::header(&format!("{} (dry run)", what));
    for path in paths {
        println!("DELETE {}", path);
    }
}

pub fn delete(client: &dyn RestClient, what: &str, paths: &[String]) -> Result<()> {
    let report = cleanup::delete_all(client, paths)?;

    output::header(what);
    for path in &report.deleted {
        output::ok(path);
    }
    for path in &report.not_found {
        output::skipped(&format!("{} not found", path));
    }
    output::kv("deleted", &report.deleted.len().to_string());
    output::kv("not found", &report.not_found.len().to_string());
    Ok(())
}
