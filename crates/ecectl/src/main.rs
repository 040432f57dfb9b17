//! ecectl - ECE lifecycle tooling
//!
//! Creates and deletes deployment templates and deployments, and cleans up
//! the RBAC objects and index patterns of organization spaces.

use clap::Parser;
use ece_common::ToolConfig;
use ecectl::cli::Cli;
use ecectl::{commands, errors, logging, output};

fn main() {
    let cli = Cli::parse();

    let config = match ToolConfig::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(err) => {
            logging::init(&logging::level(cli.verbose, cli.quiet, "info"));
            let err = anyhow::Error::from(ece_common::EceError::from(err));
            eprintln!("{}", output::error_line(&format!("{:#}", err)));
            std::process::exit(errors::exit_code(&err));
        }
    };

    logging::init(&logging::level(cli.verbose, cli.quiet, &config.log.level));
    tracing::debug!("ecectl v{} starting", env!("CARGO_PKG_VERSION"));

    if let Err(err) = commands::run(&cli, &config) {
        eprintln!("{}", output::error_line(&format!("{:#}", err)));
        std::process::exit(errors::exit_code(&err));
    }

    std::process::exit(errors::EXIT_SUCCESS);
}
