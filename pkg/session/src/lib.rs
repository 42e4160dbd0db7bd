//! Session state shared by every rbacgen front end.
//!
//! Holds the endpoint, the latest discovery results and the YAML buffer.
//! Each discovery trigger (endpoint, subject kind/namespace) has its own
//! [`Generation`], so a fetch overtaken by a newer one is dropped on arrival
//! instead of overwriting newer state.

use pkg_discovery::subjects;
use pkg_discovery::{ClientOptions, ClusterClient, Discovery, Fetched, Generation};
use pkg_types::catalog::ResourceEntry;
use pkg_types::rbac::SubjectKind;
use pkg_types::selection::Selection;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

/// Buffer contents before anything has been generated.
pub const YAML_PLACEHOLDER: &str =
    "# YAML will appear here. Use `rbacgen generate`, or edit directly.\n";

/// Subject names last fetched for a given kind and namespace.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubjectSuggestions {
    pub kind: Option<SubjectKind>,
    pub namespace: String,
    pub names: Vec<String>,
}

#[derive(Clone)]
pub struct AppState {
    options: ClientOptions,
    client: Arc<RwLock<Option<ClusterClient>>>,
    catalog: Arc<RwLock<Discovery>>,
    namespaces: Arc<RwLock<Vec<String>>>,
    subjects: Arc<RwLock<SubjectSuggestions>>,
    yaml: Arc<RwLock<String>>,
    catalog_gen: Generation,
    namespaces_gen: Generation,
    subjects_gen: Generation,
}

impl AppState {
    pub fn new(options: ClientOptions) -> Self {
        Self {
            options,
            client: Arc::new(RwLock::new(None)),
            catalog: Arc::new(RwLock::new(Discovery::default())),
            namespaces: Arc::new(RwLock::new(Vec::new())),
            subjects: Arc::new(RwLock::new(SubjectSuggestions::default())),
            yaml: Arc::new(RwLock::new(YAML_PLACEHOLDER.to_string())),
            catalog_gen: Generation::new(),
            namespaces_gen: Generation::new(),
            subjects_gen: Generation::new(),
        }
    }

    /// Point the session at a new endpoint. Outstanding fetches for the old
    /// endpoint become stale and everything discovered so far is cleared.
    /// An empty URL disconnects.
    pub async fn set_base_url(&self, base_url: &str) -> anyhow::Result<()> {
        let client = if base_url.trim().is_empty() {
            None
        } else {
            Some(ClusterClient::new(base_url, &self.options)?)
        };

        self.catalog_gen.invalidate();
        self.namespaces_gen.invalidate();
        self.subjects_gen.invalidate();

        match &client {
            Some(c) => info!("API endpoint set to {}", c.base_url()),
            None => info!("API endpoint cleared"),
        }
        *self.client.write().await = client;
        *self.catalog.write().await = Discovery::default();
        self.namespaces.write().await.clear();
        *self.subjects.write().await = SubjectSuggestions::default();
        Ok(())
    }

    /// Current endpoint, or an empty string when disconnected.
    pub async fn base_url(&self) -> String {
        self.client
            .read()
            .await
            .as_ref()
            .map(|c| c.base_url().to_string())
            .unwrap_or_default()
    }

    pub async fn client(&self) -> Option<ClusterClient> {
        self.client.read().await.clone()
    }

    /// Rebuild the resource catalog from the current endpoint.
    pub async fn refresh_catalog(&self) -> anyhow::Result<Fetched<Discovery>> {
        let ticket = self.catalog_gen.begin();
        let Some(client) = self.client.read().await.clone() else {
            debug!("no API endpoint configured; catalog stays empty");
            return Ok(ticket.settle(Discovery::default()));
        };

        let Fetched::Current(discovery) = pkg_discovery::discover_resources(&client, &ticket).await?
        else {
            return Ok(Fetched::Stale);
        };

        let mut slot = self.catalog.write().await;
        if !ticket.is_current() {
            debug!("catalog for {} overtaken before commit", client.base_url());
            return Ok(Fetched::Stale);
        }
        *slot = discovery.clone();
        Ok(Fetched::Current(discovery))
    }

    /// Snapshot of the resource catalog.
    pub async fn catalog(&self) -> Vec<ResourceEntry> {
        self.catalog.read().await.entries.clone()
    }

    /// Warnings absorbed by the last committed catalog refresh.
    pub async fn catalog_warnings(&self) -> usize {
        self.catalog.read().await.warnings
    }

    pub async fn refresh_namespaces(&self) -> anyhow::Result<Fetched<Vec<String>>> {
        let ticket = self.namespaces_gen.begin();
        let Some(client) = self.client.read().await.clone() else {
            return Ok(ticket.settle(Vec::new()));
        };

        let names = subjects::list_namespaces(&client).await?;

        let mut slot = self.namespaces.write().await;
        if !ticket.is_current() {
            debug!("discarding stale namespace list for {}", client.base_url());
            return Ok(Fetched::Stale);
        }
        *slot = names.clone();
        Ok(Fetched::Current(names))
    }

    pub async fn namespaces(&self) -> Vec<String> {
        self.namespaces.read().await.clone()
    }

    /// Fetch name suggestions for `kind`. Calling again with another kind or
    /// namespace while a fetch is in flight makes the earlier one stale.
    pub async fn refresh_subjects(
        &self,
        kind: SubjectKind,
        namespace: &str,
    ) -> anyhow::Result<Fetched<Vec<String>>> {
        let ticket = self.subjects_gen.begin();
        let Some(client) = self.client.read().await.clone() else {
            return Ok(ticket.settle(Vec::new()));
        };

        let names = subjects::suggest_subjects(&client, kind, namespace).await?;

        let mut slot = self.subjects.write().await;
        if !ticket.is_current() {
            debug!("discarding stale {} suggestions for '{}'", kind, namespace);
            return Ok(Fetched::Stale);
        }
        *slot = SubjectSuggestions {
            kind: Some(kind),
            namespace: namespace.to_string(),
            names: names.clone(),
        };
        Ok(Fetched::Current(names))
    }

    pub async fn subject_suggestions(&self) -> SubjectSuggestions {
        self.subjects.read().await.clone()
    }

    /// Synthesize manifests for `selection` against the current catalog and
    /// replace the YAML buffer with them.
    pub async fn generate(&self, selection: &Selection) -> anyhow::Result<String> {
        let catalog = self.catalog().await;
        let yaml = pkg_synth::generate_yaml(selection, &catalog)?;
        *self.yaml.write().await = yaml.clone();
        Ok(yaml)
    }

    pub async fn yaml(&self) -> String {
        self.yaml.read().await.clone()
    }

    /// Replace the buffer with hand-edited text.
    pub async fn set_yaml(&self, yaml: &str) {
        *self.yaml.write().await = yaml.to_string();
    }

    /// Write the buffer, including manual edits, to `path` verbatim.
    pub async fn write_yaml(&self, path: &Path) -> anyhow::Result<()> {
        let yaml = self.yaml().await;
        tokio::fs::write(path, yaml.as_bytes()).await?;
        info!("Wrote {} bytes to {}", yaml.len(), path.display());
        Ok(())
    }
}
