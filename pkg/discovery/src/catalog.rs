//! Resource catalog aggregation.
//!
//! Three sources feed the catalog: CustomResourceDefinitions, the core
//! `/api/v1` list, and the preferred version of every API group. They are
//! fetched concurrently and merged in that order, later sources overwriting
//! earlier ones on id collision, so built-in definitions win over CRDs and
//! the group pass wins over core v1.

use anyhow::bail;
use futures_util::future::join_all;
use pkg_constants::api;
use pkg_types::catalog::{ResourceEntry, ResourceSource};
use pkg_types::discovery::{ApiGroupList, ApiResourceList, CustomResourceDefinitionList};
use std::collections::HashMap;
use tracing::{debug, info, warn};

use crate::client::ClusterClient;
use crate::generation::{Fetched, Ticket};

/// Outcome of one aggregation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Discovery {
    /// Deduplicated by id, sorted by resource name.
    pub entries: Vec<ResourceEntry>,
    /// Sources (or single group-versions) that failed and were treated as empty.
    pub warnings: usize,
}

/// Entries from one source plus the failures it absorbed internally.
#[derive(Debug, Default)]
struct SourceOutput {
    entries: Vec<ResourceEntry>,
    warnings: usize,
}

/// Build the resource catalog for the cluster behind `client`.
///
/// An empty base URL does no work and yields an empty catalog. A failing
/// source is logged and skipped; only when every source fails is an error
/// returned. If `ticket` went stale while the fetches were in flight the
/// merged result is discarded.
pub async fn discover_resources(
    client: &ClusterClient,
    ticket: &Ticket,
) -> anyhow::Result<Fetched<Discovery>> {
    if client.base_url().is_empty() {
        return Ok(ticket.settle(Discovery::default()));
    }

    let (crds, core, groups) = tokio::join!(
        crd_entries(client),
        core_entries(client),
        group_entries(client)
    );

    if !ticket.is_current() {
        debug!("discarding stale resource discovery for {}", client.base_url());
        return Ok(Fetched::Stale);
    }

    let mut merged = CatalogBuilder::default();
    let mut warnings = 0;
    let mut failed = 0;
    for (source, result) in [("crds", crds), ("core/v1", core), ("api groups", groups)] {
        match result {
            Ok(output) => {
                debug!("{}: {} resources", source, output.entries.len());
                warnings += output.warnings;
                merged.extend(output.entries);
            }
            Err(e) => {
                warn!("resource discovery source '{}' failed: {:#}", source, e);
                warnings += 1;
                failed += 1;
            }
        }
    }

    if failed == 3 {
        bail!(
            "resource discovery against {} failed: all sources errored",
            client.base_url()
        );
    }

    let entries = merged.into_sorted();
    info!(
        "Discovered {} resources from {} ({} warnings)",
        entries.len(),
        client.base_url(),
        warnings
    );
    Ok(ticket.settle(Discovery { entries, warnings }))
}

async fn crd_entries(client: &ClusterClient) -> anyhow::Result<SourceOutput> {
    let list: CustomResourceDefinitionList = client.get_json(api::CRDS).await?;
    Ok(SourceOutput {
        entries: entries_from_crds(&list),
        warnings: 0,
    })
}

async fn core_entries(client: &ClusterClient) -> anyhow::Result<SourceOutput> {
    let list: ApiResourceList = client.get_json(api::CORE_V1).await?;
    Ok(SourceOutput {
        entries: entries_from_resource_list("", "v1", &list),
        warnings: 0,
    })
}

async fn group_entries(client: &ClusterClient) -> anyhow::Result<SourceOutput> {
    let groups: ApiGroupList = client.get_json(api::API_GROUPS).await?;

    let preferred: Vec<(String, String, String)> = groups
        .groups
        .iter()
        .filter_map(|g| {
            g.preferred_version
                .as_ref()
                .map(|pv| (g.name.clone(), pv.version.clone(), pv.group_version.clone()))
        })
        .collect();

    let fetches = preferred.iter().map(|(_, _, gv)| async move {
        client
            .get_json::<ApiResourceList>(&api::group_version(gv))
            .await
    });
    let results = join_all(fetches).await;

    let mut output = SourceOutput::default();
    for ((group, version, gv), result) in preferred.iter().zip(results) {
        match result {
            Ok(list) => output
                .entries
                .extend(entries_from_resource_list(group, version, &list)),
            Err(e) => {
                warn!("skipping group-version {}: {:#}", gv, e);
                output.warnings += 1;
            }
        }
    }
    Ok(output)
}

/// One entry per (declared version, plural) of every CRD.
pub fn entries_from_crds(list: &CustomResourceDefinitionList) -> Vec<ResourceEntry> {
    let mut entries = Vec::new();
    for crd in &list.items {
        let plural = &crd.spec.names.plural;
        if plural.is_empty() {
            continue;
        }
        for version in &crd.spec.versions {
            entries.push(ResourceEntry::new(
                &crd.spec.group,
                &version.name,
                plural,
                crd.is_namespaced(),
                ResourceSource::Crd,
            ));
        }
    }
    entries
}

/// Built-in entries from an `APIResourceList`, subresources excluded.
pub fn entries_from_resource_list(
    group: &str,
    version: &str,
    list: &ApiResourceList,
) -> Vec<ResourceEntry> {
    list.resources
        .iter()
        .filter(|r| !r.is_subresource())
        .map(|r| ResourceEntry::new(group, version, &r.name, r.namespaced, ResourceSource::Builtin))
        .collect()
}

/// Id-keyed merge that keeps first-insertion position on overwrite.
#[derive(Debug, Default)]
pub struct CatalogBuilder {
    entries: Vec<ResourceEntry>,
    index: HashMap<String, usize>,
}

impl CatalogBuilder {
    pub fn insert(&mut self, entry: ResourceEntry) {
        match self.index.get(&entry.id) {
            Some(&i) => self.entries[i] = entry,
            None => {
                self.index.insert(entry.id.clone(), self.entries.len());
                self.entries.push(entry);
            }
        }
    }

    pub fn extend(&mut self, entries: impl IntoIterator<Item = ResourceEntry>) {
        for entry in entries {
            self.insert(entry);
        }
    }

    /// Entries sorted by resource name; equal names keep merge order.
    pub fn into_sorted(self) -> Vec<ResourceEntry> {
        let mut entries = self.entries;
        entries.sort_by(|a, b| a.resource.cmp(&b.resource));
        entries
    }
}

/// Merge the three sources in precedence order (CRDs, core v1, groups).
pub fn merge_catalog(
    crds: Vec<ResourceEntry>,
    core: Vec<ResourceEntry>,
    groups: Vec<ResourceEntry>,
) -> Vec<ResourceEntry> {
    let mut builder = CatalogBuilder::default();
    builder.extend(crds);
    builder.extend(core);
    builder.extend(groups);
    builder.into_sorted()
}
