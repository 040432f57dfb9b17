//! Deployment and deployment template lifecycle workflows
//!
//! Each workflow is a fixed, sequential series of ECE calls. Payloads are
//! passed in already parsed; results are returned for the caller to print.

use crate::api::EceApi;
use crate::client::RestClient;
use crate::config::ShutdownSettings;
use crate::error::{EceError, Result};
use crate::model::{DeploymentRequest, DeploymentTemplate, InstanceConfigurationSet};
use crate::reconcile::{ensure_complete, reconcile};
use crate::role::RoleMap;
use serde_json::Value;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// Status reported by ECE once a deployment has been shut down
pub const STOPPED: &str = "stopped";

/// Result of [`create_templates`]
#[derive(Debug, Clone)]
pub struct TemplateCreation {
    /// Instance configuration name and new id, in creation order
    pub instance_configurations: Vec<(String, String)>,
    pub roles: RoleMap,
    pub template: DeploymentTemplate,
    pub response: Value,
}

/// Create instance configurations, then a deployment template that uses them.
///
/// The template's roles are checked against the configuration names before
/// anything is created.
pub fn create_templates<C: RestClient + ?Sized>(
    client: &C,
    configurations: &InstanceConfigurationSet,
    mut template: DeploymentTemplate,
) -> Result<TemplateCreation> {
    let planned: RoleMap = configurations
        .instance_configurations
        .iter()
        .map(|c| (c.name.clone(), c.name.clone()))
        .collect();
    ensure_complete(&template.topology_mut()?, &planned)?;

    let api = EceApi::new(client);
    let mut created = Vec::new();
    for configuration in &configurations.instance_configurations {
        let object = api.create_instance_configuration(configuration)?;
        info!("Created instance configuration {} ({})", configuration.name, object.id);
        created.push((configuration.name.clone(), object.id));
    }

    let roles: RoleMap = created.iter().cloned().collect();
    reconcile(&mut template.topology_mut()?, &roles)?;

    let response = api.create_deployment_template(&template)?;
    info!("Created deployment template");

    Ok(TemplateCreation {
        instance_configurations: created,
        roles,
        template,
        response,
    })
}

/// Result of [`create_deployment`]
#[derive(Debug, Clone)]
pub struct DeploymentCreation {
    pub template_id: String,
    pub roles: RoleMap,
    pub deployment: DeploymentRequest,
    pub response: Value,
}

/// Create a deployment based on a named deployment template.
///
/// The instance configuration ids are taken from the template and written
/// into the deployment's topology before it is submitted.
pub fn create_deployment<C: RestClient + ?Sized>(
    client: &C,
    template_name: &str,
    mut deployment: DeploymentRequest,
) -> Result<DeploymentCreation> {
    let api = EceApi::new(client);

    let summary = api.find_deployment_template(template_name)?;
    info!("Using deployment template {} ({})", template_name, summary.id);

    let mut template = api.get_deployment_template(&summary.id)?;
    let roles = RoleMap::harvest(&template.topology_mut()?);

    {
        let mut topology = deployment.topology_mut()?;
        ensure_complete(&topology, &roles)?;
        reconcile(&mut topology, &roles)?;
    }
    deployment.set_template_id(&summary.id)?;

    let response = api.create_deployment(&deployment)?;
    info!("Submitted deployment");

    Ok(DeploymentCreation {
        template_id: summary.id,
        roles,
        deployment,
        response,
    })
}

/// Result of [`delete_deployment`]
#[derive(Debug, Clone)]
pub struct DeploymentDeletion {
    pub id: String,
    pub shutdown_response: Value,
    /// Last status seen while waiting; `None` if the deployment vanished
    pub final_status: Option<String>,
    /// Response of the delete call; `None` if there was nothing left to delete
    pub delete_response: Option<Value>,
}

/// Shut down a named deployment, wait for it to stop, then delete it.
pub fn delete_deployment<C: RestClient + ?Sized>(
    client: &C,
    name: &str,
    settings: &ShutdownSettings,
) -> Result<DeploymentDeletion> {
    let api = EceApi::new(client);

    let summary = api.find_deployment(name)?;
    info!("Shutting down deployment {} ({})", name, summary.id);
    let shutdown_response = api.shutdown_deployment(&summary.id)?;

    let final_status = wait_until_stopped(&api, &summary.id, settings)?;

    let delete_response = match final_status {
        Some(_) => Some(api.delete_deployment(&summary.id)?),
        None => {
            info!("Deployment {} no longer exists", summary.id);
            None
        }
    };

    Ok(DeploymentDeletion {
        id: summary.id,
        shutdown_response,
        final_status,
        delete_response,
    })
}

fn wait_until_stopped<C: RestClient + ?Sized>(
    api: &EceApi<'_, C>,
    id: &str,
    settings: &ShutdownSettings,
) -> Result<Option<String>> {
    let started = Instant::now();
    let deadline = Duration::from_secs(settings.timeout_secs);

    loop {
        let Some(status) = api.deployment_status(id)? else {
            return Ok(None);
        };
        info!("Deployment {} status: {}", id, status);

        if status == STOPPED {
            return Ok(Some(status));
        }

        if started.elapsed() >= deadline {
            return Err(EceError::ShutdownTimedOut {
                id: id.to_string(),
                secs: settings.timeout_secs,
                status,
            });
        }

        thread::sleep(Duration::from_secs(settings.poll_interval_secs));
    }
}

/// Outcome of one DELETE call in a cleanup
#[derive(Debug, Clone, PartialEq)]
pub enum DeleteOutcome {
    Deleted(Value),
    NotFound,
}

/// Result of [`delete_template`]
#[derive(Debug, Clone)]
pub struct TemplateDeletion {
    pub template_id: String,
    pub template: DeleteOutcome,
    /// Instance configuration id and what happened to it
    pub instance_configurations: Vec<(String, DeleteOutcome)>,
}

/// Delete a named deployment template and every instance configuration it
/// references.
pub fn delete_template<C: RestClient + ?Sized>(client: &C, name: &str) -> Result<TemplateDeletion> {
    let api = EceApi::new(client);

    let summary = api.find_deployment_template(name)?;
    let template = api.get_deployment_template(&summary.id)?;

    let template_outcome = tolerate_missing(api.delete_deployment_template(&summary.id))?;
    info!("Deleted deployment template {} ({})", name, summary.id);

    let mut instance_configurations = Vec::new();
    for configuration in &template.instance_configurations {
        let outcome = tolerate_missing(api.delete_instance_configuration(&configuration.id))?;
        if outcome == DeleteOutcome::NotFound {
            warn!("Instance configuration {} not found", configuration.id);
        }
        instance_configurations.push((configuration.id.clone(), outcome));
    }

    Ok(TemplateDeletion {
        template_id: summary.id,
        template: template_outcome,
        instance_configurations,
    })
}

/// Treat a 404 as "already gone"
pub(crate) fn tolerate_missing(result: Result<Value>) -> Result<DeleteOutcome> {
    match result {
        Ok(body) => Ok(DeleteOutcome::Deleted(body)),
        Err(EceError::Api(e)) if e.is_not_found() => Ok(DeleteOutcome::NotFound),
        Err(e) => Err(e),
    }
}
