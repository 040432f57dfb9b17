//! Offline reconcile of a template or deployment file

use anyhow::Result;
use ece_common::input::read_json;
use ece_common::model::{DeploymentRequest, DeploymentTemplate};
use ece_common::reconcile::ensure_complete;
use ece_common::{reconcile, EceError, InputError, RoleMap};
use serde_json::Value;
use std::path::Path;
use tracing::info;

/// Fill in the instance configuration ids of `file` from a role map file
/// and print the result to stdout.
///
/// Files with a `cluster_template` are deployment templates, anything else
/// is read as a deployment.
pub fn reconcile_file(file: &Path, roles_file: &Path) -> Result<()> {
    let document: Value = read_json(file).map_err(EceError::from)?;
    let roles: RoleMap = read_json(roles_file).map_err(EceError::from)?;
    info!("Loaded {} role mappings", roles.len());

    let reconciled = if document.get("cluster_template").is_some() {
        let mut template: DeploymentTemplate = decode(file, document)?;
        apply(&mut template.topology_mut().map_err(EceError::from)?, &roles)?;
        serde_json::to_value(&template)?
    } else {
        let mut deployment: DeploymentRequest = decode(file, document)?;
        apply(&mut deployment.topology_mut().map_err(EceError::from)?, &roles)?;
        serde_json::to_value(&deployment)?
    };

    crate::output::json(&reconciled);
    Ok(())
}

fn decode<T: serde::de::DeserializeOwned>(file: &Path, document: Value) -> Result<T> {
    serde_json::from_value(document).map_err(|source| {
        anyhow::Error::from(EceError::from(InputError::Json {
            path: file.to_path_buf(),
            source,
        }))
    })
}

fn apply(topology: &mut ece_common::Topology<'_>, roles: &RoleMap) -> Result<()> {
    ensure_complete(topology, roles).map_err(EceError::from)?;
    reconcile(topology, roles).map_err(EceError::from)?;
    Ok(())
}
