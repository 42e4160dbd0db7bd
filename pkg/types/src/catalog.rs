use serde::{Deserialize, Serialize};

/// Where a catalog entry was learned from.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ResourceSource {
    Builtin,
    Crd,
}

impl std::fmt::Display for ResourceSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResourceSource::Builtin => write!(f, "builtin"),
            ResourceSource::Crd => write!(f, "crd"),
        }
    }
}

/// One grantable resource type discovered on the cluster.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ResourceEntry {
    /// `group/version/resource`; the core group is empty, so pods are `/v1/pods`.
    pub id: String,
    pub group: String,
    pub version: String,
    /// Plural resource name, e.g. "deployments".
    pub resource: String,
    pub namespaced: bool,
    pub source: ResourceSource,
}

impl ResourceEntry {
    pub fn new(
        group: &str,
        version: &str,
        resource: &str,
        namespaced: bool,
        source: ResourceSource,
    ) -> Self {
        Self {
            id: resource_id(group, version, resource),
            group: group.to_string(),
            version: version.to_string(),
            resource: resource.to_string(),
            namespaced,
            source,
        }
    }
}

/// Build the catalog key for a group/version/resource triple.
pub fn resource_id(group: &str, version: &str, resource: &str) -> String {
    format!("{}/{}/{}", group, version, resource)
}
