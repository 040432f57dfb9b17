//! Command dispatch
//!
//! Each command reads its input files first, then builds an HTTP client
//! from the environment's credentials. Library errors are kept as
//! [`EceError`] inside the `anyhow::Error` so `main` can pick an exit code.

mod deployment;
mod reconcile;
mod spaces;
mod templates;

use crate::cli::{Cli, Commands};
use anyhow::Result;
use ece_common::config::load_env_file;
use ece_common::{Credentials, EceError, Environment, HttpClient, Service, ToolConfig};
use std::path::Path;
use tracing::debug;

pub use reconcile::reconcile_file;

/// Run the parsed command
pub fn run(cli: &Cli, config: &ToolConfig) -> Result<()> {
    let env_file = cli.env_file.as_deref();

    match &cli.command {
        Commands::CreateTemplates {
            template_file,
            instance_configurations_file,
            environment,
        } => {
            let client = connect(env_file, (*environment).into(), Service::Elasticsearch, config)?;
            templates::create(&client, template_file, instance_configurations_file)
        }
        Commands::CreateDeployment {
            template_name,
            deployment_file,
            environment,
        } => {
            let client = connect(env_file, (*environment).into(), Service::Elasticsearch, config)?;
            deployment::create(&client, template_name, deployment_file)
        }
        Commands::DeleteDeployment {
            deployment_name,
            environment,
        } => {
            let client = connect(env_file, (*environment).into(), Service::Elasticsearch, config)?;
            deployment::delete(&client, deployment_name, &config.shutdown)
        }
        Commands::DeleteTemplate {
            template_name,
            environment,
        } => {
            let client = connect(env_file, (*environment).into(), Service::Elasticsearch, config)?;
            templates::delete(&client, template_name)
        }
        Commands::DeleteRbac {
            org_space_file,
            environment,
            dry_run,
        } => {
            let paths = spaces::rbac_paths(org_space_file)?;
            if *dry_run {
                spaces::print_plan("rbac", &paths);
                return Ok(());
            }
            let client = connect(env_file, (*environment).into(), Service::Elasticsearch, config)?;
            spaces::delete(&client, "rbac", &paths)
        }
        Commands::DeleteIndexPatterns {
            org_space_file,
            environment,
            dry_run,
        } => {
            let paths = spaces::index_pattern_paths(org_space_file, &config.spaces)?;
            if *dry_run {
                spaces::print_plan("index patterns", &paths);
                return Ok(());
            }
            let client = connect(env_file, (*environment).into(), Service::Kibana, config)?;
            spaces::delete(&client, "index patterns", &paths)
        }
        Commands::Reconcile { file, roles } => reconcile_file(file, roles),
    }
}

fn connect(
    env_file: Option<&Path>,
    environment: Environment,
    service: Service,
    config: &ToolConfig,
) -> Result<HttpClient> {
    load_env_file(env_file).map_err(EceError::from)?;
    let credentials = Credentials::from_env(environment, service).map_err(EceError::from)?;
    let username = credentials.username.clone();

    let client = HttpClient::new(credentials, &config.http).map_err(EceError::from)?;
    debug!("Connecting to {} as {}", client.base_url(), username);
    Ok(client)
}
