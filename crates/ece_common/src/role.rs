//! Node roles and the role map
//!
//! Every node group of a topology is classified once into a [`Role`]. The
//! role's name (`obs-master`, `obs-hot-logs`, ...) is the key under which
//! the instance configuration id is kept in a [`RoleMap`].

use crate::model::NodeGroup;
use crate::reconcile::{Position, Topology};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use tracing::{debug, warn};

/// Prefix shared by all instance configuration names
pub const ROLE_PREFIX: &str = "obs-";

/// Data tiers used by the observability templates
pub const KNOWN_TIERS: [&str; 5] = [
    "hot_metrics",
    "warm_metrics",
    "hot_logs",
    "warm_logs",
    "cold_logs",
];

/// Role of a node group within a deployment
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Role {
    Master,
    Ml,
    /// Ingest-only node group
    Coordinator,
    /// Data node carrying a `node_attributes.data` tier label
    DataTier(String),
    Kibana,
    Apm,
    /// No tier label and no true node type flag
    Unclassified,
}

impl Role {
    /// Classify an Elasticsearch node group.
    ///
    /// The tier label wins over node type flags. Flags are checked in the
    /// order master, ml, ingest and the first true flag decides.
    pub fn classify(group: &NodeGroup) -> Role {
        if let Some(label) = group.tier_label() {
            if !Role::is_known_tier(label) {
                debug!("tier label {:?} is not one of the standard tiers", label);
            }
            return Role::DataTier(label.to_string());
        }

        match &group.node_type {
            Some(flags) if flags.is_master() => Role::Master,
            Some(flags) if flags.is_ml() => Role::Ml,
            Some(flags) if flags.is_ingest() => Role::Coordinator,
            _ => Role::Unclassified,
        }
    }

    /// Whether `label` is one of [`KNOWN_TIERS`]
    pub fn is_known_tier(label: &str) -> bool {
        KNOWN_TIERS.contains(&label)
    }

    /// Instance configuration name for this role
    pub fn name(&self) -> Option<String> {
        let suffix = match self {
            Role::Master => "master".to_string(),
            Role::Ml => "ml".to_string(),
            Role::Coordinator => "coordinator".to_string(),
            Role::DataTier(label) => label.replace('_', "-"),
            Role::Kibana => "kibana".to_string(),
            Role::Apm => "apm".to_string(),
            Role::Unclassified => return None,
        };
        Some(format!("{}{}", ROLE_PREFIX, suffix))
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Master => write!(f, "master"),
            Role::Ml => write!(f, "ml"),
            Role::Coordinator => write!(f, "coordinator"),
            Role::DataTier(label) => write!(f, "data tier \"{}\"", label),
            Role::Kibana => write!(f, "kibana"),
            Role::Apm => write!(f, "apm"),
            Role::Unclassified => write!(f, "unclassified"),
        }
    }
}

/// Role name to instance configuration id.
///
/// Built once (from created instance configurations or harvested from an
/// existing template) and read-only afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoleMap {
    entries: BTreeMap<String, String>,
}

impl RoleMap {
    /// Instance configuration id for a role. Empty ids count as missing.
    pub fn resolve(&self, role: &Role) -> Option<&str> {
        role.name().and_then(|name| self.get(&name))
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .get(name)
            .map(String::as_str)
            .filter(|id| !id.is_empty())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Build a role map from the ids already present in a topology.
    ///
    /// Used on a template fetched from the API: each classified node group
    /// contributes its role name and current id. If two groups share a role
    /// with different ids the first one is kept.
    pub fn harvest(topology: &Topology<'_>) -> RoleMap {
        let mut entries = BTreeMap::new();

        for (position, role) in topology.roles() {
            let Some(name) = role.name() else { continue };
            let Some(id) = topology
                .group(position)
                .and_then(|group| group.instance_configuration_id.as_deref())
                .filter(|id| !id.is_empty())
            else {
                continue;
            };

            match entries.get(&name) {
                Some(existing) if existing != id => {
                    warn!(
                        "{} at {} uses {} but {} is already mapped to {}; keeping the first",
                        role, position, id, name, existing
                    );
                }
                Some(_) => {}
                None => {
                    entries.insert(name, id.to_string());
                }
            }
        }

        RoleMap { entries }
    }

    /// Roles the topology needs that this map cannot resolve, in topology order
    pub fn missing(&self, topology: &Topology<'_>) -> Vec<(Position, Role)> {
        topology
            .roles()
            .filter(|(_, role)| *role != Role::Unclassified)
            .filter(|(_, role)| self.resolve(role).is_none())
            .collect()
    }
}

impl FromIterator<(String, String)> for RoleMap {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        RoleMap {
            entries: iter.into_iter().collect(),
        }
    }
}
