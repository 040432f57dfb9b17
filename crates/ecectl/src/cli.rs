//! CLI - Command-line argument parsing
//!
//! Defines the CLI structure using clap.
//! Keeps argument parsing separate from execution logic.

use clap::{Parser, Subcommand, ValueEnum};
use ece_common::Environment;
use std::path::PathBuf;

/// ECE lifecycle tooling
#[derive(Parser, Debug)]
#[command(name = "ecectl")]
#[command(about = "Create and delete ECE deployments, templates, RBAC roles and index patterns", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Env file with credentials (overrides $ELASTIC_ENV_PATH)
    #[arg(long, global = true, value_name = "PATH")]
    pub env_file: Option<PathBuf>,

    /// Settings file (defaults to ~/.config/ecectl/config.toml)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Debug logging
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only log warnings and errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create instance configurations and a deployment template using them
    CreateTemplates {
        /// Deployment template JSON file
        template_file: PathBuf,

        /// Instance configurations JSON file
        instance_configurations_file: PathBuf,

        #[arg(value_enum)]
        environment: EnvArg,
    },

    /// Create a deployment from a deployment file and a named template
    CreateDeployment {
        /// Name of the deployment template to base the deployment on
        template_name: String,

        /// Deployment JSON file
        deployment_file: PathBuf,

        #[arg(value_enum)]
        environment: EnvArg,
    },

    /// Shut down and delete a deployment
    DeleteDeployment {
        deployment_name: String,

        #[arg(value_enum)]
        environment: EnvArg,
    },

    /// Delete a deployment template and its instance configurations
    DeleteTemplate {
        template_name: String,

        #[arg(value_enum)]
        environment: EnvArg,
    },

    /// Delete organization and space roles and role mappings
    DeleteRbac {
        /// CSV of kibana space, organization, cloud space
        org_space_file: PathBuf,

        #[arg(value_enum)]
        environment: EnvArg,

        /// Print the objects that would be deleted
        #[arg(long)]
        dry_run: bool,
    },

    /// Delete the index patterns of every organization's Kibana space
    DeleteIndexPatterns {
        /// CSV of kibana space, organization, cloud space
        org_space_file: PathBuf,

        #[arg(value_enum)]
        environment: EnvArg,

        /// Print the objects that would be deleted
        #[arg(long)]
        dry_run: bool,
    },

    /// Fill in instance configuration ids offline and print the result
    Reconcile {
        /// Deployment template or deployment JSON file
        file: PathBuf,

        /// JSON object of role name to instance configuration id
        #[arg(long, value_name = "PATH")]
        roles: PathBuf,
    },
}

/// Target environment
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum EnvArg {
    /// Production
    Prd,
    /// Non-production
    Np,
    /// Sandbox
    Sbx,
}

impl From<EnvArg> for Environment {
    fn from(arg: EnvArg) -> Self {
        match arg {
            EnvArg::Prd => Environment::Production,
            EnvArg::Np => Environment::NonProduction,
            EnvArg::Sbx => Environment::Sandbox,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_delete_rbac_dry_run() {
        let cli = Cli::try_parse_from(["ecectl", "delete-rbac", "spaces.csv", "np", "--dry-run"])
            .unwrap();

        match cli.command {
            Commands::DeleteRbac {
                org_space_file,
                environment,
                dry_run,
            } => {
                assert_eq!(org_space_file, PathBuf::from("spaces.csv"));
                assert_eq!(environment, EnvArg::Np);
                assert!(dry_run);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_invalid_environment_is_rejected() {
        let result = Cli::try_parse_from(["ecectl", "delete-deployment", "obs", "dev"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_env_arg_maps_to_environment() {
        assert_eq!(Environment::from(EnvArg::Prd), Environment::Production);
        assert_eq!(Environment::from(EnvArg::Sbx), Environment::Sandbox);
    }
}
