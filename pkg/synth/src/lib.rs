//! RBAC manifest synthesis.
//!
//! Turns a [`Selection`] plus a snapshot of the resource catalog into an
//! ordered list of Role/ClusterRole + binding documents and renders them as
//! a YAML stream. Pure: no I/O, and identical input gives identical output.

pub mod naming;
pub mod rules;

use pkg_constants::rbac::{DEFAULT_NAMESPACE, RBAC_API_GROUP, RBAC_API_VERSION};
use pkg_types::catalog::ResourceEntry;
use pkg_types::rbac::{
    Manifest, ObjectMeta, PolicyRule, Role, RoleBinding, RoleKind, RoleRef, Subject, SubjectKind,
};
use pkg_types::selection::{Scope, Selection, SubjectRef};
use tracing::debug;

/// Build the manifest documents for `selection`.
///
/// Cluster scope yields one ClusterRole/ClusterRoleBinding pair. Namespaced
/// scope yields one Role/RoleBinding pair per selected namespace, or a single
/// pair in `default` when none is selected. Each role is followed directly
/// by its binding.
pub fn synthesize(selection: &Selection, catalog: &[ResourceEntry]) -> Vec<Manifest> {
    let verbs = selection.verb_strings();
    let resolved = rules::resolve(&selection.resource_ids, catalog);
    let rules = rules::build_rules(&resolved, &verbs);
    let subject = binding_subject(&selection.subject);

    let docs: Vec<Manifest> = match selection.scope {
        Scope::Cluster => {
            let name = naming::cluster_role_name(&selection.subject.name);
            Vec::from(role_pair(RoleKind::ClusterRole, name, None, rules, subject))
        }
        Scope::Namespaced => target_namespaces(selection)
            .into_iter()
            .flat_map(|ns| {
                let name = naming::role_name(&selection.subject.name, &ns);
                role_pair(RoleKind::Role, name, Some(ns), rules.clone(), subject.clone())
            })
            .collect(),
    };

    debug!(
        "synthesized {} documents from {} of {} selected resources",
        docs.len(),
        resolved.len(),
        selection.resource_ids.len()
    );
    docs
}

/// Render documents as a YAML stream: every document starts with a `---`
/// line and documents are separated by one blank line.
pub fn to_yaml_stream(docs: &[Manifest]) -> anyhow::Result<String> {
    let mut parts = Vec::with_capacity(docs.len());
    for doc in docs {
        parts.push(format!("---\n{}", serde_yaml::to_string(doc)?));
    }
    Ok(parts.join("\n"))
}

/// [`synthesize`] followed by [`to_yaml_stream`].
pub fn generate_yaml(selection: &Selection, catalog: &[ResourceEntry]) -> anyhow::Result<String> {
    to_yaml_stream(&synthesize(selection, catalog))
}

fn target_namespaces(selection: &Selection) -> Vec<String> {
    let mut namespaces: Vec<String> = Vec::new();
    for ns in &selection.namespaces {
        if !namespaces.contains(ns) {
            namespaces.push(ns.clone());
        }
    }
    if namespaces.is_empty() {
        namespaces.push(DEFAULT_NAMESPACE.to_string());
    }
    namespaces
}

/// Service accounts always carry their own namespace, whatever the role scope.
fn binding_subject(subject: &SubjectRef) -> Subject {
    let namespace = match subject.kind {
        SubjectKind::ServiceAccount => Some(
            subject
                .namespace
                .clone()
                .filter(|ns| !ns.is_empty())
                .unwrap_or_else(|| DEFAULT_NAMESPACE.to_string()),
        ),
        SubjectKind::User | SubjectKind::Group => None,
    };
    Subject {
        kind: subject.kind,
        name: subject.name.clone(),
        namespace,
    }
}

fn role_pair(
    kind: RoleKind,
    name: String,
    namespace: Option<String>,
    rules: Vec<PolicyRule>,
    subject: Subject,
) -> [Manifest; 2] {
    let binding = RoleBinding {
        api_version: RBAC_API_VERSION.to_string(),
        kind: kind.binding_kind(),
        metadata: ObjectMeta {
            name: naming::binding_name(&name),
            namespace: namespace.clone(),
        },
        subjects: vec![subject],
        role_ref: RoleRef {
            api_group: RBAC_API_GROUP.to_string(),
            kind,
            name: name.clone(),
        },
    };
    let role = Role {
        api_version: RBAC_API_VERSION.to_string(),
        kind,
        metadata: ObjectMeta { name, namespace },
        rules,
    };
    [Manifest::Role(role), Manifest::Binding(binding)]
}

#[cfg(test)]
mod tests {
    use super::*;
    use pkg_types::catalog::ResourceSource;
    use pkg_types::rbac::BindingKind;
    use pkg_types::selection::Verb;
    use serde::Deserialize;
    use std::collections::BTreeSet;

    fn catalog() -> Vec<ResourceEntry> {
        vec![
            ResourceEntry::new("apps", "v1", "deployments", true, ResourceSource::Builtin),
            ResourceEntry::new("", "v1", "pods", true, ResourceSource::Builtin),
            ResourceEntry::new("example.com", "v1", "widgets", true, ResourceSource::Crd),
        ]
    }

    fn selection(scope: Scope, kind: SubjectKind, name: &str) -> Selection {
        Selection {
            scope,
            namespaces: vec![],
            resource_ids: BTreeSet::new(),
            verbs: [Verb::Get].into(),
            subject: SubjectRef {
                kind,
                name: name.to_string(),
                namespace: None,
            },
        }
    }

    fn role(doc: &Manifest) -> &Role {
        match doc {
            Manifest::Role(r) => r,
            other => panic!("expected a role, got {:?}", other),
        }
    }

    fn binding(doc: &Manifest) -> &RoleBinding {
        match doc {
            Manifest::Binding(b) => b,
            other => panic!("expected a binding, got {:?}", other),
        }
    }

    #[test]
    fn cluster_scope_for_a_user() {
        let mut sel = selection(Scope::Cluster, SubjectKind::User, "alice");
        sel.verbs = [Verb::Get, Verb::List].into();
        sel.resource_ids = ["/v1/pods".to_string()].into();

        let docs = synthesize(&sel, &catalog());
        assert_eq!(docs.len(), 2);

        let r = role(&docs[0]);
        assert_eq!(r.kind, RoleKind::ClusterRole);
        assert_eq!(r.metadata.name, "alice-cluster");
        assert!(r.metadata.namespace.is_none());
        assert_eq!(
            r.rules,
            vec![PolicyRule {
                api_groups: vec!["".to_string()],
                resources: vec!["pods".to_string()],
                verbs: vec!["get".to_string(), "list".to_string()],
            }]
        );

        let b = binding(&docs[1]);
        assert_eq!(b.kind, BindingKind::ClusterRoleBinding);
        assert_eq!(b.metadata.name, "alice-cluster-binding");
        assert_eq!(
            b.subjects,
            vec![Subject {
                kind: SubjectKind::User,
                name: "alice".to_string(),
                namespace: None,
            }]
        );
        assert_eq!(b.role_ref.api_group, "rbac.authorization.k8s.io");
        assert_eq!(b.role_ref.kind, RoleKind::ClusterRole);
        assert_eq!(b.role_ref.name, "alice-cluster");
    }

    #[test]
    fn namespaced_service_account_across_two_namespaces() {
        let mut sel = selection(Scope::Namespaced, SubjectKind::ServiceAccount, "sa1");
        sel.namespaces = vec!["dev".to_string(), "staging".to_string()];
        sel.subject.namespace = Some("dev".to_string());

        let docs = synthesize(&sel, &catalog());
        assert_eq!(docs.len(), 4);

        for (pair, ns) in docs.chunks(2).zip(["dev", "staging"]) {
            let r = role(&pair[0]);
            assert_eq!(r.kind, RoleKind::Role);
            assert_eq!(r.metadata.namespace.as_deref(), Some(ns));
            assert_eq!(r.metadata.name, format!("sa1-{}", ns));
            assert_eq!(r.rules, vec![rules::wildcard_rule(&["get".to_string()])]);

            let b = binding(&pair[1]);
            assert_eq!(b.kind, BindingKind::RoleBinding);
            assert_eq!(b.metadata.namespace.as_deref(), Some(ns));
            assert_eq!(b.metadata.name, format!("sa1-{}-binding", ns));
            assert_eq!(b.role_ref.name, r.metadata.name);
            assert_eq!(
                b.subjects,
                vec![Subject {
                    kind: SubjectKind::ServiceAccount,
                    name: "sa1".to_string(),
                    namespace: Some("dev".to_string()),
                }]
            );
        }
    }

    #[test]
    fn cluster_scope_ignores_namespaces() {
        let mut sel = selection(Scope::Cluster, SubjectKind::Group, "ops");
        sel.namespaces = vec!["a".into(), "b".into(), "c".into()];
        let docs = synthesize(&sel, &catalog());
        assert_eq!(docs.len(), 2);
        assert!(docs.iter().all(|d| d.namespace().is_none()));
    }

    #[test]
    fn namespaced_cardinality_is_two_per_namespace() {
        for k in 1..=4 {
            let mut sel = selection(Scope::Namespaced, SubjectKind::User, "bob");
            sel.namespaces = (0..k).map(|i| format!("ns-{}", i)).collect();
            assert_eq!(synthesize(&sel, &catalog()).len(), 2 * k);
        }
    }

    #[test]
    fn no_namespaces_means_default() {
        let sel = selection(Scope::Namespaced, SubjectKind::User, "bob");
        let docs = synthesize(&sel, &catalog());
        assert_eq!(docs.len(), 2);
        assert!(docs.iter().all(|d| d.namespace() == Some("default")));
        assert_eq!(docs[0].name(), "bob-default");
    }

    #[test]
    fn service_account_in_cluster_scope_keeps_its_namespace() {
        let sel = selection(Scope::Cluster, SubjectKind::ServiceAccount, "builder");
        let docs = synthesize(&sel, &catalog());
        assert_eq!(binding(&docs[1]).subjects[0].namespace.as_deref(), Some("default"));
    }

    #[test]
    fn unresolvable_selection_falls_back_to_wildcard() {
        let mut sel = selection(Scope::Cluster, SubjectKind::User, "alice");
        sel.resource_ids = ["removed.example.com/v1/gadgets".to_string()].into();
        sel.verbs = [Verb::Watch, Verb::Get].into();
        let docs = synthesize(&sel, &catalog());
        assert_eq!(
            role(&docs[0]).rules,
            vec![PolicyRule {
                api_groups: vec!["*".to_string()],
                resources: vec!["*".to_string()],
                verbs: vec!["get".to_string(), "watch".to_string()],
            }]
        );
    }

    #[test]
    fn subject_name_is_slugged() {
        let sel = selection(Scope::Cluster, SubjectKind::User, "My.User@Org");
        let docs = synthesize(&sel, &catalog());
        assert_eq!(docs[0].name(), "my-user-org-cluster");
        assert_eq!(binding(&docs[1]).subjects[0].name, "My.User@Org");
    }

    #[test]
    fn yaml_is_deterministic() {
        let mut sel = selection(Scope::Namespaced, SubjectKind::ServiceAccount, "ci");
        sel.namespaces = vec!["dev".into(), "prod".into()];
        sel.resource_ids = [
            "apps/v1/deployments".to_string(),
            "example.com/v1/widgets".to_string(),
            "/v1/pods".to_string(),
        ]
        .into();
        let first = generate_yaml(&sel, &catalog()).unwrap();
        let second = generate_yaml(&sel, &catalog()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn yaml_stream_layout() {
        let mut sel = selection(Scope::Cluster, SubjectKind::User, "alice");
        sel.resource_ids = ["/v1/pods".to_string()].into();
        let yaml = generate_yaml(&sel, &catalog()).unwrap();

        assert!(yaml.starts_with("---\napiVersion: rbac.authorization.k8s.io/v1\nkind: ClusterRole\n"));
        assert!(yaml.contains("\n\n---\napiVersion: rbac.authorization.k8s.io/v1\nkind: ClusterRoleBinding\n"));
        assert!(yaml.contains("roleRef:"));
        assert!(yaml.contains("apiGroups:"));
        assert!(yaml.ends_with('\n'));

        let docs: Vec<serde_yaml::Value> = serde_yaml::Deserializer::from_str(&yaml)
            .map(serde_yaml::Value::deserialize)
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0]["metadata"]["name"], "alice-cluster");
        assert_eq!(docs[0]["rules"][0]["apiGroups"][0], "");
        assert_eq!(docs[1]["subjects"][0]["kind"], "User");
        assert!(docs[1]["subjects"][0].get("namespace").is_none());
        assert_eq!(docs[1]["roleRef"]["name"], "alice-cluster");
    }
}
