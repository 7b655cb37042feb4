// SPDX-License-Identifier: MIT OR Apache-2.0
//! Registry of data types and node types.
//!
//! Loaded once and read-only afterwards. Lookups are exact id matches; when
//! an id appears more than once the first entry wins.

use crate::node::{NodeType, NodeTypeId};
use crate::port::{DataType, DataTypeId, PortDirection};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Catalog of available data types and node types
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeRegistry {
    /// Registered node types, in catalog order
    pub node_types: Vec<NodeType>,
    /// Registered data types
    pub data_types: Vec<DataType>,
}

impl TypeRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a data type
    pub fn with_data_type(mut self, data_type: DataType) -> Self {
        self.data_types.push(data_type);
        self
    }

    /// Register a node type
    pub fn with_node_type(mut self, node_type: NodeType) -> Self {
        self.node_types.push(node_type);
        self
    }

    /// Get a node type by ID
    pub fn node_type(&self, id: NodeTypeId) -> Option<&NodeType> {
        self.node_types.iter().find(|t| t.id == id)
    }

    /// Get a data type by ID
    pub fn data_type(&self, id: DataTypeId) -> Option<&DataType> {
        self.data_types.iter().find(|t| t.id == id)
    }

    /// Check referential integrity.
    ///
    /// Loading never calls this; hosts decide whether a failure matters.
    pub fn validate(&self) -> Result<(), RegistryError> {
        let mut data_ids = HashSet::new();
        for data_type in &self.data_types {
            if !data_ids.insert(data_type.id) {
                return Err(RegistryError::DuplicateDataType(data_type.id));
            }
        }

        let mut node_ids = HashSet::new();
        for node_type in &self.node_types {
            if !node_ids.insert(node_type.id) {
                return Err(RegistryError::DuplicateNodeType(node_type.id));
            }
            for direction in [PortDirection::Input, PortDirection::Output] {
                for port in node_type.ports(direction) {
                    if !data_ids.contains(&port.data_type) {
                        return Err(RegistryError::UnknownDataType {
                            node_type: node_type.id,
                            port: port.name.clone(),
                            data_type: port.data_type,
                        });
                    }
                }
            }
        }

        Ok(())
    }
}

/// Referential integrity failure inside a registry
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// A port refers to a data type that is not registered
    #[error("Node type {node_type} port {port:?} uses unknown data type {data_type}")]
    UnknownDataType {
        /// Node type owning the port
        node_type: NodeTypeId,
        /// Port name
        port: String,
        /// The missing data type
        data_type: DataTypeId,
    },

    /// Two node types share an id
    #[error("Duplicate node type: {0}")]
    DuplicateNodeType(NodeTypeId),

    /// Two data types share an id
    #[error("Duplicate data type: {0}")]
    DuplicateDataType(DataTypeId),
}
