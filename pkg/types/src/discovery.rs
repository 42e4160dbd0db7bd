//! Wire models for the Kubernetes discovery endpoints.
//!
//! Only the fields rbacgen reads are modelled; everything else in the
//! payload is ignored, and missing fields fall back to their defaults.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// --- Generic lists ---

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemMeta {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub namespace: Option<String>,
    #[serde(default)]
    pub creation_timestamp: Option<DateTime<Utc>>,
}

/// Any object where only the metadata matters (namespaces, service accounts,
/// OpenShift users and groups).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NamedItem {
    #[serde(default)]
    pub metadata: ItemMeta,
}

/// `{"items": [...]}` as returned by every list endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemList<T> {
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
}

impl<T> Default for ItemList<T> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl ItemList<NamedItem> {
    /// Non-empty item names, sorted and deduplicated.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .items
            .iter()
            .map(|i| i.metadata.name.clone())
            .filter(|n| !n.is_empty())
            .collect();
        names.sort();
        names.dedup();
        names
    }
}

pub type NamespaceList = ItemList<NamedItem>;
pub type ServiceAccountList = ItemList<NamedItem>;
pub type UserList = ItemList<NamedItem>;
pub type GroupList = ItemList<NamedItem>;

// --- CustomResourceDefinition ---

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CrdNames {
    #[serde(default)]
    pub plural: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CrdVersion {
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CrdSpec {
    #[serde(default)]
    pub group: String,
    #[serde(default)]
    pub names: CrdNames,
    /// "Namespaced" or "Cluster".
    #[serde(default)]
    pub scope: String,
    #[serde(default)]
    pub versions: Vec<CrdVersion>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CustomResourceDefinition {
    #[serde(default)]
    pub spec: CrdSpec,
}

impl CustomResourceDefinition {
    pub fn is_namespaced(&self) -> bool {
        self.spec.scope == "Namespaced"
    }
}

pub type CustomResourceDefinitionList = ItemList<CustomResourceDefinition>;

// --- APIResourceList (/api/v1, /apis/{group}/{version}) ---

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResource {
    pub name: String,
    #[serde(default)]
    pub namespaced: bool,
    #[serde(default)]
    pub kind: String,
    #[serde(default)]
    pub verbs: Vec<String>,
}

impl ApiResource {
    /// Subresources such as `pods/log` carry a slash in their name.
    pub fn is_subresource(&self) -> bool {
        self.name.contains('/')
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResourceList {
    #[serde(default)]
    pub group_version: String,
    #[serde(default)]
    pub resources: Vec<ApiResource>,
}

// --- APIGroupList (/apis) ---

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupVersionForDiscovery {
    /// `group/version`, e.g. "apps/v1".
    pub group_version: String,
    pub version: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiGroup {
    pub name: String,
    #[serde(default)]
    pub versions: Vec<GroupVersionForDiscovery>,
    #[serde(default)]
    pub preferred_version: Option<GroupVersionForDiscovery>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiGroupList {
    #[serde(default)]
    pub groups: Vec<ApiGroup>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crd_list_parses_scope_and_versions() {
        let json = r#"{
            "kind": "CustomResourceDefinitionList",
            "items": [{
                "metadata": {"name": "widgets.example.com"},
                "spec": {
                    "group": "example.com",
                    "names": {"plural": "widgets", "kind": "Widget"},
                    "scope": "Namespaced",
                    "versions": [{"name": "v1", "served": true}, {"name": "v1beta1"}]
                }
            }]
        }"#;
        let list: CustomResourceDefinitionList = serde_json::from_str(json).unwrap();
        assert_eq!(list.items.len(), 1);
        let crd = &list.items[0];
        assert!(crd.is_namespaced());
        assert_eq!(crd.spec.names.plural, "widgets");
        assert_eq!(crd.spec.versions.len(), 2);
    }

    #[test]
    fn api_resource_list_flags_subresources() {
        let json = r#"{
            "groupVersion": "v1",
            "resources": [
                {"name": "pods", "namespaced": true, "kind": "Pod", "verbs": ["get"]},
                {"name": "pods/log", "namespaced": true, "kind": "Pod"},
                {"name": "nodes", "namespaced": false, "kind": "Node"}
            ]
        }"#;
        let list: ApiResourceList = serde_json::from_str(json).unwrap();
        assert_eq!(list.group_version, "v1");
        assert!(!list.resources[0].is_subresource());
        assert!(list.resources[1].is_subresource());
        assert!(!list.resources[2].namespaced);
    }

    #[test]
    fn group_list_exposes_preferred_version() {
        let json = r#"{
            "groups": [{
                "name": "apps",
                "versions": [{"groupVersion": "apps/v1", "version": "v1"}],
                "preferredVersion": {"groupVersion": "apps/v1", "version": "v1"}
            }]
        }"#;
        let list: ApiGroupList = serde_json::from_str(json).unwrap();
        let preferred = list.groups[0].preferred_version.as_ref().unwrap();
        assert_eq!(preferred.group_version, "apps/v1");
    }

    #[test]
    fn names_are_sorted_and_skip_blanks() {
        let json = r#"{"items": [
            {"metadata": {"name": "kube-system", "creationTimestamp": "2024-01-02T03:04:05Z"}},
            {"metadata": {}},
            {"metadata": {"name": "default"}}
        ]}"#;
        let list: NamespaceList = serde_json::from_str(json).unwrap();
        assert_eq!(list.names(), vec!["default", "kube-system"]);
        assert!(list.items[0].metadata.creation_timestamp.is_some());
    }

    #[test]
    fn missing_items_is_an_empty_list() {
        let list: UserList = serde_json::from_str("{}").unwrap();
        assert!(list.items.is_empty());
    }
}
