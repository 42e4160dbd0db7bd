//! In-process fake of the Kubernetes discovery API.
//!
//! Serves canned JSON per path from an axum router bound to an ephemeral
//! port. Unregistered paths answer 404, which is how a vanilla cluster
//! answers the OpenShift user/group endpoints.

use axum::{
    Router,
    extract::State,
    http::{StatusCode, Uri, header},
    response::{IntoResponse, Response},
};
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tracing::debug;

#[derive(Debug, Clone)]
struct Canned {
    status: StatusCode,
    body: String,
    delay: Option<Duration>,
}

/// Builder for a fake cluster.
#[derive(Debug, Clone, Default)]
pub struct MockCluster {
    routes: HashMap<String, Canned>,
}

impl MockCluster {
    pub fn new() -> Self {
        Self::default()
    }

    /// A small but realistic cluster: a couple of CRDs (one shadowing a
    /// built-in), core v1, `apps` and `batch`, three namespaces and some
    /// service accounts in `dev`.
    pub fn standard() -> Self {
        Self::new()
            .json(
                "/apis/apiextensions.k8s.io/v1/customresourcedefinitions",
                crd_list(&[
                    ("example.com", "widgets", "Namespaced", &["v1", "v1beta1"][..]),
                    ("apps", "deployments", "Cluster", &["v1"][..]),
                ]),
            )
            .json(
                "/api/v1",
                resource_list(
                    "v1",
                    &[
                        ("pods", true),
                        ("pods/log", true),
                        ("configmaps", true),
                        ("namespaces", false),
                        ("serviceaccounts", true),
                    ],
                ),
            )
            .json(
                "/apis",
                group_list(&[("apps", "v1"), ("batch", "v1")]),
            )
            .json(
                "/apis/apps/v1",
                resource_list(
                    "apps/v1",
                    &[
                        ("deployments", true),
                        ("deployments/scale", true),
                        ("statefulsets", true),
                    ],
                ),
            )
            .json(
                "/apis/batch/v1",
                resource_list("batch/v1", &[("jobs", true), ("cronjobs", true)]),
            )
            .json(
                "/api/v1/namespaces",
                named_list(&["kube-system", "default", "dev"]),
            )
            .json(
                "/api/v1/namespaces/dev/serviceaccounts",
                named_list(&["default", "ci-bot", "builder"]),
            )
    }

    /// Answer `path` with 200 and `body`.
    pub fn json(mut self, path: &str, body: Value) -> Self {
        self.routes.insert(
            path.to_string(),
            Canned {
                status: StatusCode::OK,
                body: body.to_string(),
                delay: None,
            },
        );
        self
    }

    /// Answer `path` with a bare status code.
    pub fn status(mut self, path: &str, status: u16) -> Self {
        let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        self.routes.insert(
            path.to_string(),
            Canned {
                status,
                body: json!({"kind": "Status", "code": status.as_u16()}).to_string(),
                delay: None,
            },
        );
        self
    }

    /// Hold the response for `path` back by `delay`.
    pub fn delay(mut self, path: &str, delay: Duration) -> Self {
        if let Some(canned) = self.routes.get_mut(path) {
            canned.delay = Some(delay);
        }
        self
    }

    /// Drop a route so that it answers 404.
    pub fn without(mut self, path: &str) -> Self {
        self.routes.remove(path);
        self
    }

    /// Bind to an ephemeral localhost port and start serving.
    pub async fn start(self) -> anyhow::Result<RunningCluster> {
        let app = Router::new()
            .fallback(serve_canned)
            .with_state(Arc::new(self.routes));
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let handle = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });
        Ok(RunningCluster {
            base_url: format!("http://{}", addr),
            handle,
        })
    }
}

/// A started fake cluster; stops serving when dropped.
pub struct RunningCluster {
    pub base_url: String,
    handle: JoinHandle<()>,
}

impl Drop for RunningCluster {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn serve_canned(
    State(routes): State<Arc<HashMap<String, Canned>>>,
    uri: Uri,
) -> Response {
    let Some(canned) = routes.get(uri.path()) else {
        debug!("mock cluster: 404 {}", uri.path());
        return StatusCode::NOT_FOUND.into_response();
    };
    if let Some(delay) = canned.delay {
        tokio::time::sleep(delay).await;
    }
    (
        canned.status,
        [(header::CONTENT_TYPE, "application/json")],
        canned.body.clone(),
    )
        .into_response()
}

// --- Payload helpers ---

/// `CustomResourceDefinitionList` from `(group, plural, scope, versions)`.
pub fn crd_list(crds: &[(&str, &str, &str, &[&str])]) -> Value {
    let items: Vec<Value> = crds
        .iter()
        .map(|(group, plural, scope, versions)| {
            json!({
                "metadata": {"name": format!("{}.{}", plural, group)},
                "spec": {
                    "group": group,
                    "names": {"plural": plural},
                    "scope": scope,
                    "versions": versions.iter().map(|v| json!({"name": v, "served": true})).collect::<Vec<_>>(),
                }
            })
        })
        .collect();
    json!({"kind": "CustomResourceDefinitionList", "items": items})
}

/// `APIResourceList` for one group-version from `(name, namespaced)`.
pub fn resource_list(group_version: &str, resources: &[(&str, bool)]) -> Value {
    let resources: Vec<Value> = resources
        .iter()
        .map(|(name, namespaced)| {
            json!({"name": name, "namespaced": namespaced, "kind": "", "verbs": ["get", "list"]})
        })
        .collect();
    json!({"kind": "APIResourceList", "groupVersion": group_version, "resources": resources})
}

/// `APIGroupList` from `(group, preferred version)`.
pub fn group_list(groups: &[(&str, &str)]) -> Value {
    let groups: Vec<Value> = groups
        .iter()
        .map(|(name, version)| {
            let gv = json!({"groupVersion": format!("{}/{}", name, version), "version": version});
            json!({"name": name, "versions": [gv.clone()], "preferredVersion": gv})
        })
        .collect();
    json!({"kind": "APIGroupList", "groups": groups})
}

/// Any `*List` whose items only carry `metadata.name`.
pub fn named_list(names: &[&str]) -> Value {
    let items: Vec<Value> = names
        .iter()
        .map(|n| json!({"metadata": {"name": n}}))
        .collect();
    json!({"items": items})
}
