use pkg_constants::rbac::{
    BINDING_SUFFIX, CLUSTER_SUFFIX, FALLBACK_CLUSTER_ROLE_NAME, FALLBACK_ROLE_PREFIX,
};
use pkg_types::validate::slugify;

/// Name for the ClusterRole granted to `subject_name`.
pub fn cluster_role_name(subject_name: &str) -> String {
    base_name(subject_name, CLUSTER_SUFFIX)
        .unwrap_or_else(|| FALLBACK_CLUSTER_ROLE_NAME.to_string())
}

/// Name for the Role granted to `subject_name` in `namespace`.
pub fn role_name(subject_name: &str, namespace: &str) -> String {
    base_name(subject_name, namespace)
        .unwrap_or_else(|| format!("{}{}", FALLBACK_ROLE_PREFIX, namespace))
}

pub fn binding_name(role_name: &str) -> String {
    format!("{}{}", role_name, BINDING_SUFFIX)
}

/// Slug of `<subject>-<suffix>`, or `None` when the subject contributes
/// nothing name-safe.
fn base_name(subject_name: &str, suffix: &str) -> Option<String> {
    if slugify(subject_name).is_empty() {
        return None;
    }
    Some(slugify(&format!("{}-{}", subject_name, suffix)))
}
