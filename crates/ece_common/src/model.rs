//! ECE payload types
//!
//! Only the fields the tooling reads or writes are modelled. Everything else
//! is carried in `extra` so a template or deployment loaded from disk (or
//! fetched from the API) is sent back upstream unchanged apart from the
//! instance configuration ids.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One node group of a cluster topology
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeGroup {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance_configuration_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_type: Option<NodeType>,

    /// Elasticsearch-specific settings; carries `node_attributes`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elasticsearch: Option<NodeSettings>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl NodeGroup {
    /// Data tier label from `elasticsearch.node_attributes.data`, if any
    pub fn tier_label(&self) -> Option<&str> {
        self.elasticsearch
            .as_ref()
            .and_then(|es| es.node_attributes.as_ref())
            .and_then(|attrs| attrs.data.as_deref())
            .filter(|label| !label.is_empty())
    }
}

/// Boolean node type flags. A missing flag means false.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeType {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub master: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ml: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ingest: Option<bool>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl NodeType {
    pub fn is_master(&self) -> bool {
        self.master.unwrap_or(false)
    }

    pub fn is_ml(&self) -> bool {
        self.ml.unwrap_or(false)
    }

    pub fn is_ingest(&self) -> bool {
        self.ingest.unwrap_or(false)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_attributes: Option<NodeAttributes>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeAttributes {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A resource plan (`plan` of an Elasticsearch, Kibana or APM resource)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    #[serde(default)]
    pub cluster_topology: Vec<NodeGroup>,

    /// Only present on the Elasticsearch plan of a deployment request
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deployment_template: Option<TemplateReference>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TemplateReference {
    pub id: String,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A Kibana, APM or Elasticsearch resource wrapping a plan
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    pub plan: Plan,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Deployment template, as read from a template file or returned by
/// `GET /platform/configuration/templates/deployments/{id}`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeploymentTemplate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    pub cluster_template: ClusterTemplate,

    /// Filled in by the API when `show_instance_configurations=true`
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub instance_configurations: Vec<InstanceConfigurationRef>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClusterTemplate {
    pub plan: Plan,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kibana: Option<Resource>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub apm: Option<Resource>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InstanceConfigurationRef {
    pub id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Body of `POST /api/v1/deployments`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeploymentRequest {
    pub resources: Resources,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Resources {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub elasticsearch: Vec<Resource>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub kibana: Vec<Resource>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub apm: Vec<Resource>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// An instance configuration definition to be created
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstanceConfiguration {
    pub name: String,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Instance configurations file: `{"instance_configurations": [...]}`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InstanceConfigurationSet {
    #[serde(default)]
    pub instance_configurations: Vec<InstanceConfiguration>,
}

/// Response of a create call that returns the new object's id
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CreatedObject {
    pub id: String,
}

/// Entry of the deployment template listing
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TemplateSummary {
    pub id: String,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DeploymentSummary {
    pub id: String,
    #[serde(default)]
    pub name: String,
}

/// Body of `GET /api/v1/deployments`
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct DeploymentListing {
    #[serde(default)]
    pub deployments: Vec<DeploymentSummary>,
}
