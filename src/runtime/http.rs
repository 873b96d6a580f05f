//! HttpRuntime — the runtime shipped with the `lds-testserver` binary.
//!
//! Each server owns an [`AddressSpace`] shared with an axum router. `run`
//! binds `host:port` and serves a read-only JSON view of the application
//! description, namespaces and variables until the shutdown token fires:
//!
//! - `GET /application`
//! - `GET /namespaces`
//! - `GET /variables`
//! - `GET /variables/:namespace/:identifier`

use std::sync::{Arc, RwLock};

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use tokio_util::sync::CancellationToken;

use crate::runtime::address_space::AddressSpace;
use crate::runtime::{NodeId, RuntimeConfig, RuntimeError, ServerRuntime, Variant};

/// Bind host used by [`HttpRuntime::default`].
pub const DEFAULT_BIND_HOST: &str = "0.0.0.0";

/// Runtime serving each server's address space over HTTP.
#[derive(Debug, Clone)]
pub struct HttpRuntime {
    host: String,
}

impl HttpRuntime {
    pub fn new(host: impl Into<String>) -> Self {
        Self { host: host.into() }
    }
}

impl Default for HttpRuntime {
    fn default() -> Self {
        Self::new(DEFAULT_BIND_HOST)
    }
}

/// A created server: its config plus the address space it publishes.
pub struct HttpServer {
    config: Arc<RuntimeConfig>,
    space: Arc<RwLock<AddressSpace>>,
}

impl HttpServer {
    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// Current value of `node`, if it exists.
    pub fn read(&self, node: NodeId) -> Result<Option<Variant>, RuntimeError> {
        let space = self.space.read().map_err(|_| RuntimeError::Poisoned)?;
        Ok(space.read(node).cloned())
    }

    pub fn namespaces(&self) -> Result<Vec<String>, RuntimeError> {
        let space = self.space.read().map_err(|_| RuntimeError::Poisoned)?;
        Ok(space.namespaces().to_vec())
    }

    fn router(&self) -> Router {
        Router::new()
            .route("/application", get(application))
            .route("/namespaces", get(namespaces))
            .route("/variables", get(variables))
            .route("/variables/:namespace/:identifier", get(variable))
            .with_state(AppState {
                config: self.config.clone(),
                space: self.space.clone(),
            })
    }
}

impl ServerRuntime for HttpRuntime {
    type Server = HttpServer;

    fn new_server(&self, config: RuntimeConfig) -> Result<HttpServer, RuntimeError> {
        if config.port == 0 {
            return Err(RuntimeError::InvalidConfig(
                "port must be non-zero".to_string(),
            ));
        }

        let space = AddressSpace::new(&config.application_uri);
        tracing::debug!(
            port = config.port,
            application_uri = %config.application_uri,
            "server created"
        );
        Ok(HttpServer {
            config: Arc::new(config),
            space: Arc::new(RwLock::new(space)),
        })
    }

    fn write_variable(
        &self,
        server: &mut HttpServer,
        node: NodeId,
        value: Variant,
    ) -> Result<(), RuntimeError> {
        let mut space = server.space.write().map_err(|_| RuntimeError::Poisoned)?;
        space.write(node, value)
    }

    fn add_namespace(&self, server: &mut HttpServer, uri: &str) -> Result<u16, RuntimeError> {
        let mut space = server.space.write().map_err(|_| RuntimeError::Poisoned)?;
        space.add_namespace(uri)
    }

    async fn run(
        &self,
        server: &mut HttpServer,
        shutdown: CancellationToken,
    ) -> Result<(), RuntimeError> {
        let addr = format!("{}:{}", self.host, server.config.port);
        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .map_err(|source| RuntimeError::Bind {
                addr: addr.clone(),
                source,
            })?;

        tracing::info!(address = %addr, "server listening");

        axum::serve(listener, server.router())
            .with_graceful_shutdown(shutdown.cancelled_owned())
            .await
            .map_err(RuntimeError::Serve)?;

        tracing::info!(address = %addr, "server stopped");
        Ok(())
    }

    fn destroy(&self, server: &mut HttpServer) {
        tracing::debug!(port = server.config.port, "server released");
    }
}

#[derive(Clone)]
struct AppState {
    config: Arc<RuntimeConfig>,
    space: Arc<RwLock<AddressSpace>>,
}

#[derive(Debug, Serialize)]
struct VariableView {
    node_id: String,
    value: Variant,
}

impl VariableView {
    fn new(node: NodeId, value: &Variant) -> Self {
        Self {
            node_id: node.to_string(),
            value: value.clone(),
        }
    }
}

async fn application(State(state): State<AppState>) -> Json<RuntimeConfig> {
    Json(state.config.as_ref().clone())
}

async fn namespaces(State(state): State<AppState>) -> Result<Json<Vec<String>>, StatusCode> {
    let space = state
        .space
        .read()
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
    Ok(Json(space.namespaces().to_vec()))
}

async fn variables(State(state): State<AppState>) -> Result<Json<Vec<VariableView>>, StatusCode> {
    let space = state
        .space
        .read()
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
    let views = space
        .variables()
        .map(|(node, value)| VariableView::new(node, value))
        .collect();
    Ok(Json(views))
}

async fn variable(
    State(state): State<AppState>,
    Path((namespace, identifier)): Path<(u16, u32)>,
) -> Result<Json<VariableView>, StatusCode> {
    let node = NodeId::numeric(namespace, identifier);
    let space = state
        .space
        .read()
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
    space
        .read(node)
        .map(|value| Json(VariableView::new(node, value)))
        .ok_or(StatusCode::NOT_FOUND)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::{
        DI_NAMESPACE_URI, LocalizedText, SERVER_CAPABILITIES, SERVER_SERVICE_LEVEL,
    };
    use axum::body::Body;
    use axum::http::Request;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    fn test_config(port: u16) -> RuntimeConfig {
        RuntimeConfig {
            port,
            application_uri: "urn:test".to_string(),
            application_name: LocalizedText::new("de", "srv"),
        }
    }

    async fn get_json(server: &HttpServer, uri: &str) -> (StatusCode, Value) {
        let response = server
            .router()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    #[test]
    fn test_new_server_rejects_port_zero() {
        let runtime = HttpRuntime::default();
        let result = runtime.new_server(test_config(0));
        assert!(matches!(result, Err(RuntimeError::InvalidConfig(_))));
    }

    #[test]
    fn test_writes_reach_address_space() {
        let runtime = HttpRuntime::default();
        let mut server = runtime.new_server(test_config(4840)).unwrap();

        runtime
            .write_variable(&mut server, SERVER_SERVICE_LEVEL, Variant::Byte(255))
            .unwrap();
        let index = runtime
            .add_namespace(&mut server, DI_NAMESPACE_URI)
            .unwrap();

        assert_eq!(index, 2);
        assert_eq!(
            server.read(SERVER_SERVICE_LEVEL).unwrap(),
            Some(Variant::Byte(255))
        );
        assert_eq!(server.namespaces().unwrap()[2], DI_NAMESPACE_URI);
    }

    #[tokio::test]
    async fn test_application_view() {
        let runtime = HttpRuntime::default();
        let server = runtime.new_server(test_config(4840)).unwrap();

        let (status, body) = get_json(&server, "/application").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({
                "port": 4840,
                "application_uri": "urn:test",
                "application_name": {"locale": "de", "text": "srv"}
            })
        );
    }

    #[tokio::test]
    async fn test_variable_views() {
        let runtime = HttpRuntime::default();
        let mut server = runtime.new_server(test_config(4840)).unwrap();
        runtime
            .write_variable(
                &mut server,
                SERVER_CAPABILITIES,
                Variant::StringArray(vec!["cap1".to_string(), "cap2".to_string()]),
            )
            .unwrap();

        let (status, body) = get_json(&server, "/variables/0/12710").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({
                "node_id": "ns=0;i=12710",
                "value": {"type": "StringArray", "value": ["cap1", "cap2"]}
            })
        );

        let (status, body) = get_json(&server, "/variables").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 3);
        assert_eq!(body[1]["node_id"], "ns=0;i=2267");

        let (status, _) = get_json(&server, "/variables/3/1").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_namespaces_view() {
        let runtime = HttpRuntime::default();
        let server = runtime.new_server(test_config(4840)).unwrap();

        let (status, body) = get_json(&server, "/namespaces").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!(["http://opcfoundation.org/UA/", "urn:test"]));
    }

    #[tokio::test]
    async fn test_run_reports_bind_failure() {
        let occupied = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = occupied.local_addr().unwrap().port();

        let runtime = HttpRuntime::new("127.0.0.1");
        let mut server = runtime.new_server(test_config(port)).unwrap();
        let result = runtime.run(&mut server, CancellationToken::new()).await;

        assert!(matches!(result, Err(RuntimeError::Bind { .. })));
    }

    #[tokio::test]
    async fn test_run_returns_after_shutdown() {
        let port = {
            let probe = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            probe.local_addr().unwrap().port()
        };

        let runtime = HttpRuntime::new("127.0.0.1");
        let mut server = runtime.new_server(test_config(port)).unwrap();
        let shutdown = CancellationToken::new();

        let trigger = shutdown.clone();
        tokio::spawn(async move {
            tokio::time::sleep(std::time::Duration::from_millis(50)).await;
            trigger.cancel();
        });

        let result = runtime.run(&mut server, shutdown).await;
        assert!(result.is_ok());
    }
}
