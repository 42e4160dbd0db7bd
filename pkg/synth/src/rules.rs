use pkg_constants::rbac::WILDCARD;
use pkg_types::catalog::ResourceEntry;
use pkg_types::rbac::PolicyRule;
use std::collections::BTreeSet;

/// Catalog entries whose id was selected, in catalog order.
/// Ids missing from the catalog are dropped.
pub fn resolve<'a>(selected: &BTreeSet<String>, catalog: &'a [ResourceEntry]) -> Vec<&'a ResourceEntry> {
    catalog.iter().filter(|e| selected.contains(&e.id)).collect()
}

/// One rule per API group, groups and resources in first-seen order.
/// Falls back to a single wildcard rule when nothing resolved.
pub fn build_rules(resolved: &[&ResourceEntry], verbs: &[String]) -> Vec<PolicyRule> {
    let mut groups: Vec<(&str, Vec<String>)> = Vec::new();
    for entry in resolved {
        let idx = match groups.iter().position(|(g, _)| *g == entry.group) {
            Some(i) => i,
            None => {
                groups.push((entry.group.as_str(), Vec::new()));
                groups.len() - 1
            }
        };
        let resources = &mut groups[idx].1;
        if !resources.contains(&entry.resource) {
            resources.push(entry.resource.clone());
        }
    }

    if groups.is_empty() {
        return vec![wildcard_rule(verbs)];
    }

    groups
        .into_iter()
        .map(|(group, resources)| PolicyRule {
            api_groups: vec![group.to_string()],
            resources,
            verbs: verbs.to_vec(),
        })
        .collect()
}

pub fn wildcard_rule(verbs: &[String]) -> PolicyRule {
    PolicyRule {
        api_groups: vec![WILDCARD.to_string()],
        resources: vec![WILDCARD.to_string()],
        verbs: verbs.to_vec(),
    }
}
