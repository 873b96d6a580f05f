//! Server runtime seam.
//!
//! The bootstrapper never talks to a protocol stack directly. It drives a
//! [`ServerRuntime`]: build a config, create a server, write variables,
//! register namespaces, run until shutdown, destroy. `http` holds the
//! runtime shipped with the binary; tests plug in their own.

pub mod address_space;
pub mod http;
pub mod service_level;

use std::fmt;
use std::future::Future;

use serde::Serialize;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

/// Namespace 0, always present.
pub const UA_NAMESPACE_URI: &str = "http://opcfoundation.org/UA/";

/// Device Integration companion namespace.
pub const DI_NAMESPACE_URI: &str = "http://opcfoundation.org/UA/DI/";

/// `Server.NamespaceArray`
pub const NAMESPACE_ARRAY: NodeId = NodeId::numeric(0, 2255);

/// `Server.ServiceLevel`
pub const SERVER_SERVICE_LEVEL: NodeId = NodeId::numeric(0, 2267);

/// `ServerConfiguration.ServerCapabilities`
pub const SERVER_CAPABILITIES: NodeId = NodeId::numeric(0, 12710);

/// Numeric node identifier within a namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId {
    pub namespace: u16,
    pub identifier: u32,
}

impl NodeId {
    pub const fn numeric(namespace: u16, identifier: u32) -> Self {
        Self {
            namespace,
            identifier,
        }
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ns={};i={}", self.namespace, self.identifier)
    }
}

/// Text tagged with a locale.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LocalizedText {
    pub locale: String,
    pub text: String,
}

impl LocalizedText {
    pub fn new(locale: &str, text: &str) -> Self {
        Self {
            locale: locale.to_string(),
            text: text.to_string(),
        }
    }
}

/// Value stored in a variable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "value")]
pub enum Variant {
    Byte(u8),
    StringArray(Vec<String>),
}

impl Variant {
    /// Name of the value's data type, used in type mismatch errors.
    pub fn type_name(&self) -> &'static str {
        match self {
            Variant::Byte(_) => "Byte",
            Variant::StringArray(_) => "String[]",
        }
    }
}

/// Configuration a server instance is created from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuntimeConfig {
    pub port: u16,
    pub application_uri: String,
    pub application_name: LocalizedText,
}

impl RuntimeConfig {
    /// Config listening on `port` with empty application identity.
    pub fn minimal(port: u16) -> Self {
        Self {
            port,
            application_uri: String::new(),
            application_name: LocalizedText::default(),
        }
    }
}

/// Failures reported by a server runtime.
#[derive(Error, Debug)]
pub enum RuntimeError {
    #[error("node {0} does not exist")]
    NodeIdUnknown(NodeId),

    #[error("node {node} holds {expected} values, got {actual}")]
    TypeMismatch {
        node: NodeId,
        expected: &'static str,
        actual: &'static str,
    },

    #[error("node {0} is not writable")]
    NotWritable(NodeId),

    #[error("namespace table is full")]
    NamespaceTableFull,

    #[error("invalid server config: {0}")]
    InvalidConfig(String),

    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("server stopped with error: {0}")]
    Serve(#[source] std::io::Error),

    #[error("address space lock poisoned")]
    Poisoned,
}

/// The server stack driven during bootstrap.
///
/// All calls except [`run`](ServerRuntime::run) are synchronous. `run` returns
/// once `shutdown` is cancelled; it never stops on its own.
pub trait ServerRuntime {
    /// Handle to a created server instance.
    type Server;

    /// Minimal configuration for a server listening on `port`.
    fn minimal_config(&self, port: u16) -> RuntimeConfig {
        RuntimeConfig::minimal(port)
    }

    fn new_server(&self, config: RuntimeConfig) -> Result<Self::Server, RuntimeError>;

    fn write_variable(
        &self,
        server: &mut Self::Server,
        node: NodeId,
        value: Variant,
    ) -> Result<(), RuntimeError>;

    /// Register a namespace URI and return its index.
    fn add_namespace(&self, server: &mut Self::Server, uri: &str) -> Result<u16, RuntimeError>;

    fn run(
        &self,
        server: &mut Self::Server,
        shutdown: CancellationToken,
    ) -> impl Future<Output = Result<(), RuntimeError>> + Send;

    /// Release everything the server holds. Called exactly once per server.
    fn destroy(&self, server: &mut Self::Server);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_id_display() {
        assert_eq!(SERVER_SERVICE_LEVEL.to_string(), "ns=0;i=2267");
        assert_eq!(NodeId::numeric(2, 15001).to_string(), "ns=2;i=15001");
    }

    #[test]
    fn test_node_id_ordering() {
        assert!(NodeId::numeric(0, 12710) < NodeId::numeric(1, 1));
        assert!(NAMESPACE_ARRAY < SERVER_SERVICE_LEVEL);
    }

    #[test]
    fn test_variant_serialization() {
        let json = serde_json::to_value(Variant::Byte(255)).unwrap();
        assert_eq!(json, serde_json::json!({"type": "Byte", "value": 255}));

        let json = serde_json::to_value(Variant::StringArray(vec!["DA".to_string()])).unwrap();
        assert_eq!(json, serde_json::json!({"type": "StringArray", "value": ["DA"]}));
    }

    #[test]
    fn test_minimal_config_has_empty_identity() {
        let config = RuntimeConfig::minimal(4840);
        assert_eq!(config.port, 4840);
        assert!(config.application_uri.is_empty());
        assert_eq!(config.application_name, LocalizedText::default());
    }
}
