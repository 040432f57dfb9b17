//! ECE Common - shared types and workflows for the ECE lifecycle tooling
//!
//! - `reconcile` / `role`: map node groups to instance configurations
//! - `api` / `client`: ECE REST calls behind the `RestClient` seam
//! - `lifecycle` / `cleanup`: the deployment, template and space workflows

pub mod api;
pub mod cleanup;
pub mod client;
pub mod config;
pub mod error;
pub mod input;
pub mod lifecycle;
pub mod model;
pub mod reconcile;
pub mod role;

pub use client::{ApiError, FakeRestClient, HttpClient, RestClient};
pub use config::{Credentials, Environment, Service, ToolConfig};
pub use error::{EceError, InputError};
pub use reconcile::{reconcile, Position, ReconcileError, Topology};
pub use role::{Role, RoleMap};
