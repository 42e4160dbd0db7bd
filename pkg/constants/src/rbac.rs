//! RBAC manifest constants.

/// API group of every RBAC object and of `roleRef.apiGroup`.
pub const RBAC_API_GROUP: &str = "rbac.authorization.k8s.io";

/// `apiVersion` written on generated roles and bindings.
pub const RBAC_API_VERSION: &str = "rbac.authorization.k8s.io/v1";

/// Wildcard used by the fallback rule when no resource resolves.
pub const WILDCARD: &str = "*";

/// Namespace used when a namespaced role is requested without namespaces.
pub const DEFAULT_NAMESPACE: &str = "default";

/// ClusterRole name used when the subject name slugs to nothing.
pub const FALLBACK_CLUSTER_ROLE_NAME: &str = "generated-clusterrole";

/// Role name prefix used when the subject name slugs to nothing.
/// Full name = `FALLBACK_ROLE_PREFIX + namespace`.
pub const FALLBACK_ROLE_PREFIX: &str = "generated-role-";

/// Binding name = role name + `BINDING_SUFFIX`.
pub const BINDING_SUFFIX: &str = "-binding";

/// Base-name suffix for cluster-scoped roles.
pub const CLUSTER_SUFFIX: &str = "cluster";
