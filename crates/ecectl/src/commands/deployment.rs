//! create-deployment and delete-deployment

use crate::output;
use anyhow::Result;
use ece_common::config::ShutdownSettings;
use ece_common::input::read_json;
use ece_common::lifecycle;
use ece_common::model::DeploymentRequest;
use ece_common::{EceError, RestClient};
use std::path::Path;

pub fn create(client: &dyn RestClient, template_name: &str, deployment_file: &Path) -> Result<()> {
    let deployment: DeploymentRequest = read_json(deployment_file).map_err(EceError::from)?;

    let created = lifecycle::create_deployment(client, template_name, deployment)?;

    output::header("deployment");
    output::kv("template", &format!("{} ({})", template_name, created.template_id));
    for (role, id) in created.roles.iter() {
        output::kv(role, id);
    }
    output::json(&created.response);
    Ok(())
}

pub fn delete(client: &dyn RestClient, name: &str, shutdown: &ShutdownSettings) -> Result<()> {
    let deleted = lifecycle::delete_deployment(client, name, shutdown)?;

    output::header("deployment");
    output::kv("id", &deleted.id);
    match (&deleted.final_status, &deleted.delete_response) {
        (Some(status), Some(_)) => {
            output::kv("status", status);
            output::ok(&format!("deleted {}", name));
        }
        _ => output::skipped(&format!("{} disappeared after shutdown", name)),
    }
    Ok(())
}
