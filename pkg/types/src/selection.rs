use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::rbac::SubjectKind;

/// Whether the generated role is a namespaced Role or a ClusterRole.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum Scope {
    #[default]
    Namespaced,
    Cluster,
}

// --- Verbs ---

/// The fixed verb vocabulary offered for selection.
/// Variant order is the order verbs are written into rules.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Verb {
    Get,
    List,
    Watch,
    Create,
    Update,
    Patch,
    Delete,
    DeleteCollection,
}

impl Verb {
    pub const ALL: [Verb; 8] = [
        Verb::Get,
        Verb::List,
        Verb::Watch,
        Verb::Create,
        Verb::Update,
        Verb::Patch,
        Verb::Delete,
        Verb::DeleteCollection,
    ];

    /// Read-only verbs selected when nothing else is configured.
    pub const DEFAULTS: [Verb; 3] = [Verb::Get, Verb::List, Verb::Watch];

    pub fn as_str(self) -> &'static str {
        match self {
            Verb::Get => "get",
            Verb::List => "list",
            Verb::Watch => "watch",
            Verb::Create => "create",
            Verb::Update => "update",
            Verb::Patch => "patch",
            Verb::Delete => "delete",
            Verb::DeleteCollection => "deletecollection",
        }
    }
}

impl std::fmt::Display for Verb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Verb {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        Verb::ALL
            .into_iter()
            .find(|v| v.as_str() == s)
            .ok_or_else(|| anyhow::anyhow!("unknown verb '{}'", s))
    }
}

// --- Subject ---

/// The identity the generated binding grants permissions to.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SubjectRef {
    pub kind: SubjectKind,
    pub name: String,
    /// Only meaningful for `ServiceAccount`.
    #[serde(default)]
    pub namespace: Option<String>,
}

// --- Selection ---

/// Everything the user picked; input to manifest synthesis.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Selection {
    pub scope: Scope,
    /// Insertion-ordered; duplicates are ignored. Unused for cluster scope.
    #[serde(default)]
    pub namespaces: Vec<String>,
    /// Catalog ids (`group/version/resource`).
    #[serde(default)]
    pub resource_ids: BTreeSet<String>,
    pub verbs: BTreeSet<Verb>,
    pub subject: SubjectRef,
}

impl Selection {
    /// Add a namespace, keeping insertion order and skipping duplicates.
    pub fn add_namespace(&mut self, namespace: &str) {
        if !self.namespaces.iter().any(|n| n == namespace) {
            self.namespaces.push(namespace.to_string());
        }
    }

    /// Toggle a verb on or off, mirroring a checkbox.
    pub fn toggle_verb(&mut self, verb: Verb) {
        if !self.verbs.remove(&verb) {
            self.verbs.insert(verb);
        }
    }

    pub fn verb_strings(&self) -> Vec<String> {
        self.verbs.iter().map(|v| v.as_str().to_string()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn selection() -> Selection {
        Selection {
            scope: Scope::Namespaced,
            namespaces: vec![],
            resource_ids: BTreeSet::new(),
            verbs: Verb::DEFAULTS.into_iter().collect(),
            subject: SubjectRef {
                kind: SubjectKind::User,
                name: "alice".into(),
                namespace: None,
            },
        }
    }

    #[test]
    fn verbs_round_trip_through_strings() {
        for v in Verb::ALL {
            assert_eq!(v.as_str().parse::<Verb>().unwrap(), v);
        }
        assert!("escalate".parse::<Verb>().is_err());
    }

    #[test]
    fn verbs_are_written_in_vocabulary_order() {
        let mut sel = selection();
        sel.verbs.clear();
        sel.verbs.insert(Verb::DeleteCollection);
        sel.verbs.insert(Verb::Get);
        sel.verbs.insert(Verb::Patch);
        assert_eq!(sel.verb_strings(), vec!["get", "patch", "deletecollection"]);
    }

    #[test]
    fn toggle_verb_adds_then_removes() {
        let mut sel = selection();
        sel.toggle_verb(Verb::Create);
        assert!(sel.verbs.contains(&Verb::Create));
        sel.toggle_verb(Verb::Create);
        assert!(!sel.verbs.contains(&Verb::Create));
    }

    #[test]
    fn namespaces_keep_insertion_order_without_duplicates() {
        let mut sel = selection();
        sel.add_namespace("staging");
        sel.add_namespace("dev");
        sel.add_namespace("staging");
        assert_eq!(sel.namespaces, vec!["staging", "dev"]);
    }
}
