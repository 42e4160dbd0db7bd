use serde::{Deserialize, Serialize};

// --- Policy rules ---

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PolicyRule {
    /// API groups this rule applies to (e.g., "" for core, "*" for all)
    pub api_groups: Vec<String>,
    /// Resource types (e.g., "pods", "services", "*" for all)
    pub resources: Vec<String>,
    /// Allowed verbs (e.g., "get", "list", "create", "update", "delete")
    pub verbs: Vec<String>,
}

// --- Metadata ---

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ObjectMeta {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
}

// --- Role / ClusterRole ---

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum RoleKind {
    Role,
    ClusterRole,
}

impl RoleKind {
    /// The binding kind that may reference this role kind.
    pub fn binding_kind(self) -> BindingKind {
        match self {
            RoleKind::Role => BindingKind::RoleBinding,
            RoleKind::ClusterRole => BindingKind::ClusterRoleBinding,
        }
    }
}

impl std::fmt::Display for RoleKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RoleKind::Role => write!(f, "Role"),
            RoleKind::ClusterRole => write!(f, "ClusterRole"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Role {
    pub api_version: String,
    pub kind: RoleKind,
    pub metadata: ObjectMeta,
    pub rules: Vec<PolicyRule>,
}

// --- Subject ---

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SubjectKind {
    ServiceAccount,
    User,
    Group,
}

impl std::fmt::Display for SubjectKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SubjectKind::ServiceAccount => write!(f, "ServiceAccount"),
            SubjectKind::User => write!(f, "User"),
            SubjectKind::Group => write!(f, "Group"),
        }
    }
}

impl std::str::FromStr for SubjectKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "serviceaccount" | "sa" => Ok(SubjectKind::ServiceAccount),
            "user" => Ok(SubjectKind::User),
            "group" => Ok(SubjectKind::Group),
            _ => anyhow::bail!(
                "unknown subject kind '{}' (expected ServiceAccount, User or Group)",
                s
            ),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Subject {
    pub kind: SubjectKind,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
}

// --- RoleBinding / ClusterRoleBinding ---

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum BindingKind {
    RoleBinding,
    ClusterRoleBinding,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RoleRef {
    pub api_group: String,
    pub kind: RoleKind,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RoleBinding {
    pub api_version: String,
    pub kind: BindingKind,
    pub metadata: ObjectMeta,
    pub subjects: Vec<Subject>,
    pub role_ref: RoleRef,
}

// --- Document stream ---

/// One document of a generated manifest stream.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum Manifest {
    Role(Role),
    Binding(RoleBinding),
}

impl Manifest {
    pub fn name(&self) -> &str {
        match self {
            Manifest::Role(r) => &r.metadata.name,
            Manifest::Binding(b) => &b.metadata.name,
        }
    }

    pub fn namespace(&self) -> Option<&str> {
        match self {
            Manifest::Role(r) => r.metadata.namespace.as_deref(),
            Manifest::Binding(b) => b.metadata.namespace.as_deref(),
        }
    }
}
