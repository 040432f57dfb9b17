//! Space-driven cleanup: RBAC roles, role mappings and Kibana index patterns
//!
//! Plans are computed from the organization/space rows without touching the
//! network, then executed one DELETE at a time. A 404 means the object is
//! already gone and does not stop the run.

use crate::client::RestClient;
use crate::config::SpaceSettings;
use crate::error::Result;
use crate::input::{distinct_organizations, OrgSpaceRow};
use crate::lifecycle::{tolerate_missing, DeleteOutcome};
use std::collections::HashSet;
use tracing::{info, warn};

const ROLE_API: &str = "/_security/role";
const ROLE_MAPPING_API: &str = "/_security/role_mapping";

/// Elasticsearch security objects to delete, in order.
///
/// Per organization (once): `{org}_user_role`, `{org}_admin_role` and the
/// `{org}_user_rolemapping` role mapping. Per row: the
/// `{org}_{space}_user_rolemapping` and `{org}_{space}_admin_rolemapping`
/// role mappings. Names are lower-cased.
pub fn rbac_plan(rows: &[OrgSpaceRow]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut paths = Vec::new();

    for row in rows {
        let org = row.organization.to_lowercase();
        let space = row.cloud_space.to_lowercase();

        if seen.insert(org.clone()) {
            paths.push(format!("{}/{}_user_role", ROLE_API, org));
            paths.push(format!("{}/{}_admin_role", ROLE_API, org));
            paths.push(format!("{}/{}_user_rolemapping", ROLE_MAPPING_API, org));
        }

        paths.push(format!("{}/{}_{}_user_rolemapping", ROLE_MAPPING_API, org, space));
        paths.push(format!("{}/{}_{}_admin_rolemapping", ROLE_MAPPING_API, org, space));
    }

    paths
}

/// Kibana index pattern saved object in a space
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexPatternTarget {
    pub space: String,
    pub pattern: String,
}

impl IndexPatternTarget {
    pub fn path(&self) -> String {
        format!(
            "/s/{}/api/saved_objects/index-pattern/{}",
            self.space, self.pattern
        )
    }
}

/// Index patterns to delete, in order.
///
/// Each organization's space loses the common pattern and one
/// `{type}-{org}-*` pattern per configured type. The custom patterns follow.
pub fn index_pattern_plan(rows: &[OrgSpaceRow], settings: &SpaceSettings) -> Vec<IndexPatternTarget> {
    let mut targets = Vec::new();

    for org in distinct_organizations(rows) {
        targets.push(IndexPatternTarget {
            space: org.to_string(),
            pattern: settings.common_index_pattern.clone(),
        });
        for kind in &settings.index_pattern_types {
            targets.push(IndexPatternTarget {
                space: org.to_string(),
                pattern: format!("{}-{}-*", kind, org),
            });
        }
    }

    for custom in &settings.custom_index_patterns {
        targets.push(IndexPatternTarget {
            space: custom.space.clone(),
            pattern: custom.pattern.clone(),
        });
    }

    targets
}

/// What a cleanup run did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleanupReport {
    pub deleted: Vec<String>,
    pub not_found: Vec<String>,
}

/// DELETE every path in order. Stops at the first error other than 404.
pub fn delete_all<C: RestClient + ?Sized>(client: &C, paths: &[String]) -> Result<CleanupReport> {
    let mut report = CleanupReport::default();

    for path in paths {
        match tolerate_missing(client.delete(path).map_err(Into::into))? {
            DeleteOutcome::Deleted(_) => {
                info!("Deleted {}", path);
                report.deleted.push(path.clone());
            }
            DeleteOutcome::NotFound => {
                warn!("Not found: {}", path);
                report.not_found.push(path.clone());
            }
        }
    }

    Ok(report)
}
