//! Namespace and subject-name suggestions.

use pkg_constants::api;
use pkg_types::discovery::{GroupList, ItemMeta, NamespaceList, ServiceAccountList, UserList};
use pkg_types::rbac::SubjectKind;
use tracing::debug;

use crate::client::ClusterClient;

/// All namespace names, sorted.
pub async fn list_namespaces(client: &ClusterClient) -> anyhow::Result<Vec<String>> {
    let list: NamespaceList = client.get_json(api::NAMESPACES).await?;
    Ok(list.names())
}

/// Namespace metadata (name, creation time), sorted by name.
pub async fn namespace_details(client: &ClusterClient) -> anyhow::Result<Vec<ItemMeta>> {
    let list: NamespaceList = client.get_json(api::NAMESPACES).await?;
    let mut details: Vec<ItemMeta> = list
        .items
        .into_iter()
        .map(|i| i.metadata)
        .filter(|m| !m.name.is_empty())
        .collect();
    details.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(details)
}

/// Service account names in `namespace`, sorted.
pub async fn list_service_accounts(
    client: &ClusterClient,
    namespace: &str,
) -> anyhow::Result<Vec<String>> {
    let list: ServiceAccountList = client.get_json(&api::service_accounts(namespace)).await?;
    Ok(list.names())
}

/// OpenShift users; empty on clusters without the `user.openshift.io` API.
pub async fn list_users(client: &ClusterClient) -> anyhow::Result<Vec<String>> {
    let list: Option<UserList> = client.get_json_optional(api::OPENSHIFT_USERS).await?;
    if list.is_none() {
        debug!("user.openshift.io not served; no user suggestions");
    }
    Ok(list.map(|l| l.names()).unwrap_or_default())
}

/// OpenShift groups; empty on clusters without the `user.openshift.io` API.
pub async fn list_groups(client: &ClusterClient) -> anyhow::Result<Vec<String>> {
    let list: Option<GroupList> = client.get_json_optional(api::OPENSHIFT_GROUPS).await?;
    if list.is_none() {
        debug!("user.openshift.io not served; no group suggestions");
    }
    Ok(list.map(|l| l.names()).unwrap_or_default())
}

/// Name suggestions for a subject of `kind`. `namespace` only matters for
/// service accounts.
pub async fn suggest_subjects(
    client: &ClusterClient,
    kind: SubjectKind,
    namespace: &str,
) -> anyhow::Result<Vec<String>> {
    match kind {
        SubjectKind::ServiceAccount => list_service_accounts(client, namespace).await,
        SubjectKind::User => list_users(client).await,
        SubjectKind::Group => list_groups(client).await,
    }
}
