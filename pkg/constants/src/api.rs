//! Kubernetes API endpoint paths queried during discovery.
//!
//! Every path is relative to the cluster base URL (trailing slash trimmed).

// ─── Core ─────────────────────────────────────────────────────────────────

/// Core (legacy, groupless) resource list.
pub const CORE_V1: &str = "/api/v1";

/// Namespace list.
pub const NAMESPACES: &str = "/api/v1/namespaces";

/// Service accounts in a namespace. Full path = `namespaces/{ns}/serviceaccounts`.
pub fn service_accounts(namespace: &str) -> String {
    format!("/api/v1/namespaces/{}/serviceaccounts", namespace)
}

// ─── Groups ───────────────────────────────────────────────────────────────

/// API group list with preferred versions.
pub const API_GROUPS: &str = "/apis";

/// Resource list of one group-version, e.g. `apps/v1`.
pub fn group_version(group_version: &str) -> String {
    format!("/apis/{}", group_version)
}

/// CustomResourceDefinition list.
pub const CRDS: &str = "/apis/apiextensions.k8s.io/v1/customresourcedefinitions";

// ─── OpenShift extensions (404 on vanilla clusters) ─────────────────────

pub const OPENSHIFT_USERS: &str = "/apis/user.openshift.io/v1/users";

pub const OPENSHIFT_GROUPS: &str = "/apis/user.openshift.io/v1/groups";

// ─── Client ───────────────────────────────────────────────────────────────

/// Endpoint suggested for local use via `kubectl proxy --port=8001`.
pub const KUBECTL_PROXY_URL: &str = "http://localhost:8001";
