//! In-memory address space backing the HTTP runtime.
//!
//! Holds the namespace table and a fixed set of typed variables. Writes must
//! target an existing, writable node and keep its data type.

use std::collections::BTreeMap;

use crate::runtime::{
    NAMESPACE_ARRAY, NodeId, RuntimeError, SERVER_CAPABILITIES, SERVER_SERVICE_LEVEL,
    UA_NAMESPACE_URI, Variant,
};

struct Variable {
    value: Variant,
    writable: bool,
}

/// Namespaces plus the variables a test server publishes.
pub struct AddressSpace {
    namespaces: Vec<String>,
    variables: BTreeMap<NodeId, Variable>,
}

impl AddressSpace {
    /// Namespace 0 is the UA namespace, namespace 1 the application URI.
    pub fn new(application_uri: &str) -> Self {
        let namespaces = vec![UA_NAMESPACE_URI.to_string(), application_uri.to_string()];

        let mut variables = BTreeMap::new();
        variables.insert(
            NAMESPACE_ARRAY,
            Variable {
                value: Variant::StringArray(namespaces.clone()),
                writable: false,
            },
        );
        variables.insert(
            SERVER_SERVICE_LEVEL,
            Variable {
                value: Variant::Byte(0),
                writable: true,
            },
        );
        variables.insert(
            SERVER_CAPABILITIES,
            Variable {
                value: Variant::StringArray(Vec::new()),
                writable: true,
            },
        );

        Self {
            namespaces,
            variables,
        }
    }

    pub fn namespaces(&self) -> &[String] {
        &self.namespaces
    }

    /// Register `uri`, returning its index. Known URIs keep their index.
    pub fn add_namespace(&mut self, uri: &str) -> Result<u16, RuntimeError> {
        if let Some(index) = self.namespaces.iter().position(|ns| ns == uri) {
            return u16::try_from(index).map_err(|_| RuntimeError::NamespaceTableFull);
        }

        let index =
            u16::try_from(self.namespaces.len()).map_err(|_| RuntimeError::NamespaceTableFull)?;
        self.namespaces.push(uri.to_string());
        if let Some(array) = self.variables.get_mut(&NAMESPACE_ARRAY) {
            array.value = Variant::StringArray(self.namespaces.clone());
        }
        Ok(index)
    }

    pub fn read(&self, node: NodeId) -> Option<&Variant> {
        self.variables.get(&node).map(|variable| &variable.value)
    }

    pub fn write(&mut self, node: NodeId, value: Variant) -> Result<(), RuntimeError> {
        let variable = self
            .variables
            .get_mut(&node)
            .ok_or(RuntimeError::NodeIdUnknown(node))?;

        if !variable.writable {
            return Err(RuntimeError::NotWritable(node));
        }
        if variable.value.type_name() != value.type_name() {
            return Err(RuntimeError::TypeMismatch {
                node,
                expected: variable.value.type_name(),
                actual: value.type_name(),
            });
        }

        variable.value = value;
        Ok(())
    }

    /// All variables ordered by node id.
    pub fn variables(&self) -> impl Iterator<Item = (NodeId, &Variant)> {
        self.variables
            .iter()
            .map(|(node, variable)| (*node, &variable.value))
    }
}
