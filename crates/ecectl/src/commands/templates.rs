//! create-templates and delete-template

use crate::output;
use anyhow::Result;
use ece_common::input::read_json;
use ece_common::lifecycle::{self, DeleteOutcome};
use ece_common::model::{DeploymentTemplate, InstanceConfigurationSet};
use ece_common::{EceError, RestClient};
use std::path::Path;

pub fn create(
    client: &dyn RestClient,
    template_file: &Path,
    instance_configurations_file: &Path,
) -> Result<()> {
    let template: DeploymentTemplate = read_json(template_file).map_err(EceError::from)?;
    let configurations: InstanceConfigurationSet =
        read_json(instance_configurations_file).map_err(EceError::from)?;

    let created = lifecycle::create_templates(client, &configurations, template)?;

    output::header("instance configurations");
    for (name, id) in &created.instance_configurations {
        output::kv(name, id);
    }
    output::header("deployment template");
    output::json(&created.response);
    Ok(())
}

pub fn delete(client: &dyn RestClient, template_name: &str) -> Result<()> {
    let deleted = lifecycle::delete_template(client, template_name)?;

    output::header("deployment template");
    report(&format!("{} ({})", template_name, deleted.template_id), &deleted.template);

    output::header("instance configurations");
    for (id, outcome) in &deleted.instance_configurations {
        report(id, outcome);
    }
    Ok(())
}

fn report(what: &str, outcome: &DeleteOutcome) {
    match outcome {
        DeleteOutcome::Deleted(_) => output::ok(&format!("deleted {}", what)),
        DeleteOutcome::NotFound => output::skipped(&format!("{} not found", what)),
    }
}
