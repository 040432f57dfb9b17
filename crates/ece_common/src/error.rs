//! Error types for the ECE tooling.

use crate::client::ApiError;
use crate::config::ConfigError;
use crate::reconcile::ReconcileError;
use std::path::PathBuf;
use thiserror::Error;

/// Problems with a user-supplied input file
#[derive(Error, Debug)]
pub enum InputError {
    #[error("cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid CSV in {path}: {message}")]
    Csv { path: PathBuf, message: String },

    #[error("{path} line {line}: expected {expected} columns, found {found}")]
    MalformedRow {
        path: PathBuf,
        line: u64,
        expected: usize,
        found: usize,
    },
}

#[derive(Error, Debug)]
pub enum EceError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Reconcile(#[from] ReconcileError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Input(#[from] InputError),

    #[error("unexpected {what} from the API: {message}")]
    Payload { what: &'static str, message: String },

    #[error("{kind} '{name}' not found")]
    NotFound { kind: &'static str, name: String },

    #[error("deployment {id} did not stop within {secs}s (last status: {status})")]
    ShutdownTimedOut {
        id: String,
        secs: u64,
        status: String,
    },
}

pub type Result<T, E = EceError> = std::result::Result<T, E>;
