// SPDX-License-Identifier: MIT OR Apache-2.0
//! Data types and the named ports that carry them.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for a data type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DataTypeId(pub i64);

impl fmt::Display for DataTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A kind of value that can flow through a port
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataType {
    /// Registry-wide identifier
    #[serde(rename = "guid")]
    pub id: DataTypeId,
    /// Display name
    pub name: String,
}

impl DataType {
    /// Create a new data type
    pub fn new(id: i64, name: impl Into<String>) -> Self {
        Self {
            id: DataTypeId(id),
            name: name.into(),
        }
    }
}

/// Port direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PortDirection {
    /// Input port (a slot)
    Input,
    /// Output port (a signal)
    Output,
}

impl fmt::Display for PortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Input => f.write_str("input"),
            Self::Output => f.write_str("output"),
        }
    }
}

/// A named, typed connection point on a node type.
///
/// Ports are addressed by name in persisted graphs and by their position
/// within the owning node type's input or output list at runtime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Port {
    /// Port name, unique among the ports of one direction
    pub name: String,
    /// Data type carried by this port
    #[serde(rename = "type")]
    pub data_type: DataTypeId,
}

impl Port {
    /// Create a new port
    pub fn new(name: impl Into<String>, data_type: DataTypeId) -> Self {
        Self {
            name: name.into(),
            data_type,
        }
    }
}

/// Position of the first port called `name`
pub(crate) fn position_of(ports: &[Port], name: &str) -> Option<usize> {
    ports.iter().position(|p| p.name == name)
}
