//! Typed ECE control-plane calls on top of a [`RestClient`]

use crate::client::RestClient;
use crate::error::{EceError, Result};
use crate::model::{
    CreatedObject, DeploymentListing, DeploymentRequest, DeploymentSummary, DeploymentTemplate,
    InstanceConfiguration, TemplateSummary,
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

const DEPLOYMENTS: &str = "/api/v1/deployments";
const TEMPLATES: &str = "/api/v1/platform/configuration/templates/deployments";
const INSTANCES: &str = "/api/v1/platform/configuration/instances";

/// ECE API bound to one client
pub struct EceApi<'a, C: RestClient + ?Sized> {
    client: &'a C,
}

impl<'a, C: RestClient + ?Sized> EceApi<'a, C> {
    pub fn new(client: &'a C) -> Self {
        Self { client }
    }

    pub fn list_deployment_templates(&self) -> Result<Vec<TemplateSummary>> {
        decode(self.client.get(TEMPLATES)?, "deployment template list")
    }

    /// First template whose name matches exactly
    pub fn find_deployment_template(&self, name: &str) -> Result<TemplateSummary> {
        self.list_deployment_templates()?
            .into_iter()
            .find(|t| t.name == name)
            .ok_or_else(|| EceError::NotFound {
                kind: "deployment template",
                name: name.to_string(),
            })
    }

    /// Template with its instance configurations expanded
    pub fn get_deployment_template(&self, id: &str) -> Result<DeploymentTemplate> {
        let path = format!("{}/{}?show_instance_configurations=true", TEMPLATES, id);
        decode(self.client.get(&path)?, "deployment template")
    }

    pub fn create_deployment_template(&self, template: &DeploymentTemplate) -> Result<Value> {
        Ok(self.client.post(TEMPLATES, Some(&encode(template)?))?)
    }

    pub fn delete_deployment_template(&self, id: &str) -> Result<Value> {
        Ok(self.client.delete(&format!("{}/{}", TEMPLATES, id))?)
    }

    pub fn create_instance_configuration(
        &self,
        configuration: &InstanceConfiguration,
    ) -> Result<CreatedObject> {
        let response = self.client.post(INSTANCES, Some(&encode(configuration)?))?;
        debug!("Created instance configuration {}", configuration.name);
        decode(response, "instance configuration")
    }

    pub fn delete_instance_configuration(&self, id: &str) -> Result<Value> {
        Ok(self.client.delete(&format!("{}/{}", INSTANCES, id))?)
    }

    pub fn list_deployments(&self) -> Result<Vec<DeploymentSummary>> {
        let listing: DeploymentListing = decode(self.client.get(DEPLOYMENTS)?, "deployment list")?;
        Ok(listing.deployments)
    }

    /// First deployment whose name matches exactly
    pub fn find_deployment(&self, name: &str) -> Result<DeploymentSummary> {
        self.list_deployments()?
            .into_iter()
            .find(|d| d.name == name)
            .ok_or_else(|| EceError::NotFound {
                kind: "deployment",
                name: name.to_string(),
            })
    }

    pub fn create_deployment(&self, request: &DeploymentRequest) -> Result<Value> {
        Ok(self.client.post(DEPLOYMENTS, Some(&encode(request)?))?)
    }

    /// Terminate a deployment, releasing all of its resources
    pub fn shutdown_deployment(&self, id: &str) -> Result<Value> {
        Ok(self
            .client
            .post(&format!("{}/{}/_shutdown", DEPLOYMENTS, id), None)?)
    }

    /// Status of the deployment's Elasticsearch resource; `None` once the
    /// deployment no longer exists
    pub fn deployment_status(&self, id: &str) -> Result<Option<String>> {
        let body = match self.client.get(&format!("{}/{}", DEPLOYMENTS, id)) {
            Ok(body) => body,
            Err(e) if e.is_not_found() => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        if body.get("errors").is_some() {
            return Ok(None);
        }

        body.pointer("/resources/elasticsearch/0/info/status")
            .and_then(Value::as_str)
            .map(|status| Some(status.to_string()))
            .ok_or_else(|| EceError::Payload {
                what: "deployment",
                message: "missing resources.elasticsearch[0].info.status".to_string(),
            })
    }

    pub fn delete_deployment(&self, id: &str) -> Result<Value> {
        Ok(self.client.delete(&format!("{}/{}", DEPLOYMENTS, id))?)
    }
}

fn decode<T: DeserializeOwned>(value: Value, what: &'static str) -> Result<T> {
    serde_json::from_value(value).map_err(|e| EceError::Payload {
        what,
        message: e.to_string(),
    })
}

fn encode<T: Serialize>(payload: &T) -> Result<Value> {
    serde_json::to_value(payload).map_err(|e| EceError::Payload {
        what: "request body",
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{ApiError, FakeRestClient, Method};
    use serde_json::json;

    #[test]
    fn test_find_template_by_exact_name() {
        let client = FakeRestClient::new(vec![Ok(json!([
            { "id": "t1", "name": "observability-small" },
            { "id": "t2", "name": "observability" }
        ]))]);

        let template = EceApi::new(&client)
            .find_deployment_template("observability")
            .unwrap();

        assert_eq!(template.id, "t2");
        assert_eq!(
            client.call_log(),
            vec!["GET /api/v1/platform/configuration/templates/deployments"]
        );
    }

    #[test]
    fn test_missing_template_is_not_found() {
        let client = FakeRestClient::new(vec![Ok(json!([]))]);

        let err = EceApi::new(&client)
            .find_deployment_template("observability")
            .unwrap_err();

        assert!(matches!(err, EceError::NotFound { kind: "deployment template", .. }));
    }

    #[test]
    fn test_get_template_requests_instance_configurations() {
        let client = FakeRestClient::new(vec![Ok(json!({
            "id": "t2",
            "cluster_template": { "plan": { "cluster_topology": [] } },
            "instance_configurations": [{ "id": "ic-1", "name": "obs-master" }]
        }))]);

        let template = EceApi::new(&client).get_deployment_template("t2").unwrap();

        assert_eq!(template.instance_configurations[0].id, "ic-1");
        assert_eq!(
            client.calls()[0].path,
            "/api/v1/platform/configuration/templates/deployments/t2?show_instance_configurations=true"
        );
    }

    #[test]
    fn test_created_instance_configuration_id() {
        let client = FakeRestClient::new(vec![Ok(json!({ "id": "9f1c" }))]);
        let configuration: InstanceConfiguration =
            serde_json::from_value(json!({ "name": "obs-ml", "instance_type": "elasticsearch" }))
                .unwrap();

        let created = EceApi::new(&client)
            .create_instance_configuration(&configuration)
            .unwrap();

        assert_eq!(created.id, "9f1c");
        let call = &client.calls()[0];
        assert_eq!(call.method, Method::POST);
        assert_eq!(call.body.as_ref().unwrap()["instance_type"], "elasticsearch");
    }

    #[test]
    fn test_deployment_status_values() {
        let client = FakeRestClient::new(vec![
            Ok(json!({ "resources": { "elasticsearch": [{ "info": { "status": "stopping" } }] } })),
            Ok(json!({ "errors": [{ "code": "deployments.deployment_not_found" }] })),
            Err(ApiError::NotFound {
                method: "GET".into(),
                url: "/api/v1/deployments/d1".into(),
            }),
            Ok(json!({ "resources": {} })),
        ]);
        let api = EceApi::new(&client);

        assert_eq!(api.deployment_status("d1").unwrap().as_deref(), Some("stopping"));
        assert_eq!(api.deployment_status("d1").unwrap(), None);
        assert_eq!(api.deployment_status("d1").unwrap(), None);
        assert!(matches!(
            api.deployment_status("d1"),
            Err(EceError::Payload { .. })
        ));
    }

    #[test]
    fn test_shutdown_path() {
        let client = FakeRestClient::new(vec![Ok(json!({}))]);
        EceApi::new(&client).shutdown_deployment("d1").unwrap();
        assert_eq!(client.call_log(), vec!["POST /api/v1/deployments/d1/_shutdown"]);
    }
}
