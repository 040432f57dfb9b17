//! Topology reconciliation
//!
//! Points every node group of a deployment (or deployment template) at the
//! instance configuration that matches its role:
//!
//! - the first Kibana and APM node groups always get `obs-kibana` / `obs-apm`
//! - Elasticsearch node groups get the id of their classified [`Role`]
//! - unclassified node groups are left alone
//!
//! All roles are resolved before anything is written, so a failed
//! reconciliation leaves the payload untouched.

use crate::model::{DeploymentRequest, DeploymentTemplate, NodeGroup, TemplateReference};
use crate::role::{Role, RoleMap};
use std::fmt;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReconcileError {
    #[error("no instance configuration for {role} at {position}")]
    UnresolvedRole { role: Role, position: Position },

    #[error("instance configurations missing for: {}", .missing.join(", "))]
    IncompleteRoleMap { missing: Vec<String> },

    #[error("payload has no node group at {path}")]
    MissingNodeGroup { path: &'static str },
}

/// Location of a node group within a topology
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Position {
    Elasticsearch(usize),
    Kibana,
    Apm,
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Position::Elasticsearch(index) => write!(f, "elasticsearch[{}]", index),
            Position::Kibana => write!(f, "kibana[0]"),
            Position::Apm => write!(f, "apm[0]"),
        }
    }
}

/// Mutable view over the node groups of one payload
pub struct Topology<'a> {
    pub elasticsearch: &'a mut [NodeGroup],
    pub kibana: &'a mut NodeGroup,
    pub apm: &'a mut NodeGroup,
}

impl<'a> Topology<'a> {
    /// Node group at `position`, or `None` past the end of the Elasticsearch groups
    pub fn group(&self, position: Position) -> Option<&NodeGroup> {
        match position {
            Position::Elasticsearch(index) => self.elasticsearch.get(index),
            Position::Kibana => Some(&*self.kibana),
            Position::Apm => Some(&*self.apm),
        }
    }

    fn group_mut(&mut self, position: Position) -> &mut NodeGroup {
        match position {
            Position::Elasticsearch(index) => &mut self.elasticsearch[index],
            Position::Kibana => &mut *self.kibana,
            Position::Apm => &mut *self.apm,
        }
    }

    /// Every node group with its role: Kibana, APM, then Elasticsearch in order
    pub fn roles(&self) -> impl Iterator<Item = (Position, Role)> + '_ {
        let fixed = [(Position::Kibana, Role::Kibana), (Position::Apm, Role::Apm)];
        let elasticsearch = self
            .elasticsearch
            .iter()
            .enumerate()
            .map(|(index, group)| (Position::Elasticsearch(index), Role::classify(group)));
        fixed.into_iter().chain(elasticsearch)
    }
}

/// Assign instance configuration ids to every classified node group.
pub fn reconcile(topology: &mut Topology<'_>, roles: &RoleMap) -> Result<(), ReconcileError> {
    let mut assignments = Vec::new();

    for (position, role) in topology.roles() {
        if role == Role::Unclassified {
            warn!("node group at {} has no tier label or node type; left unchanged", position);
            continue;
        }
        let id = roles
            .resolve(&role)
            .ok_or_else(|| ReconcileError::UnresolvedRole {
                role: role.clone(),
                position,
            })?;
        assignments.push((position, role, id.to_string()));
    }

    for (position, role, id) in assignments {
        debug!("{} ({}) -> {}", position, role, id);
        topology.group_mut(position).instance_configuration_id = Some(id);
    }

    Ok(())
}

/// Fail with every role the map cannot resolve, before any request is sent
pub fn ensure_complete(topology: &Topology<'_>, roles: &RoleMap) -> Result<(), ReconcileError> {
    let missing = roles.missing(topology);
    if missing.is_empty() {
        return Ok(());
    }

    let mut names: Vec<String> = Vec::new();
    for (_, role) in missing {
        if let Some(name) = role.name() {
            if !names.contains(&name) {
                names.push(name);
            }
        }
    }
    Err(ReconcileError::IncompleteRoleMap { missing: names })
}

impl DeploymentTemplate {
    /// Node groups under `cluster_template`
    pub fn topology_mut(&mut self) -> Result<Topology<'_>, ReconcileError> {
        let cluster = &mut self.cluster_template;
        let kibana = cluster
            .kibana
            .as_mut()
            .and_then(|r| r.plan.cluster_topology.first_mut())
            .ok_or(ReconcileError::MissingNodeGroup {
                path: "cluster_template.kibana.plan.cluster_topology[0]",
            })?;
        let apm = cluster
            .apm
            .as_mut()
            .and_then(|r| r.plan.cluster_topology.first_mut())
            .ok_or(ReconcileError::MissingNodeGroup {
                path: "cluster_template.apm.plan.cluster_topology[0]",
            })?;

        Ok(Topology {
            elasticsearch: &mut cluster.plan.cluster_topology,
            kibana,
            apm,
        })
    }
}

impl DeploymentRequest {
    /// Node groups under `resources`, using the first resource of each kind
    pub fn topology_mut(&mut self) -> Result<Topology<'_>, ReconcileError> {
        let resources = &mut self.resources;
        let elasticsearch = resources
            .elasticsearch
            .first_mut()
            .map(|r| r.plan.cluster_topology.as_mut_slice())
            .ok_or(ReconcileError::MissingNodeGroup {
                path: "resources.elasticsearch[0]",
            })?;
        let kibana = resources
            .kibana
            .first_mut()
            .and_then(|r| r.plan.cluster_topology.first_mut())
            .ok_or(ReconcileError::MissingNodeGroup {
                path: "resources.kibana[0].plan.cluster_topology[0]",
            })?;
        let apm = resources
            .apm
            .first_mut()
            .and_then(|r| r.plan.cluster_topology.first_mut())
            .ok_or(ReconcileError::MissingNodeGroup {
                path: "resources.apm[0].plan.cluster_topology[0]",
            })?;

        Ok(Topology {
            elasticsearch,
            kibana,
            apm,
        })
    }

    /// Point the Elasticsearch plan at a deployment template
    pub fn set_template_id(&mut self, template_id: &str) -> Result<(), ReconcileError> {
        let plan = &mut self
            .resources
            .elasticsearch
            .first_mut()
            .ok_or(ReconcileError::MissingNodeGroup {
                path: "resources.elasticsearch[0]",
            })?
            .plan;

        match plan.deployment_template.as_mut() {
            Some(reference) => reference.id = template_id.to_string(),
            None => {
                plan.deployment_template = Some(TemplateReference {
                    id: template_id.to_string(),
                    extra: Default::default(),
                })
            }
        }
        Ok(())
    }
}
