// SPDX-License-Identifier: MIT OR Apache-2.0
//! Node type definitions and node instances.

use crate::layout::Point;
use crate::port::{position_of, Port, PortDirection};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for a node type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeTypeId(pub i64);

impl NodeTypeId {
    /// Width in bytes of a drag-and-drop payload
    pub const PAYLOAD_LEN: usize = 8;

    /// Encode as the fixed-width drag-and-drop payload
    pub fn to_payload(self) -> [u8; Self::PAYLOAD_LEN] {
        self.0.to_le_bytes()
    }

    /// Decode a drag-and-drop payload.
    ///
    /// Returns `None` unless `bytes` is exactly [`Self::PAYLOAD_LEN`] long.
    pub fn from_payload(bytes: &[u8]) -> Option<Self> {
        let bytes: [u8; Self::PAYLOAD_LEN] = bytes.try_into().ok()?;
        Some(Self(i64::from_le_bytes(bytes)))
    }
}

impl fmt::Display for NodeTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Node type definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeType {
    /// Unique type identifier
    #[serde(rename = "guid")]
    pub id: NodeTypeId,
    /// Display name
    pub name: String,
    /// Catalog category
    pub category: String,
    /// Input ports, in runtime order
    pub inputs: Vec<Port>,
    /// Output ports, in runtime order
    pub outputs: Vec<Port>,
}

impl NodeType {
    /// Create a node type without ports
    pub fn new(id: i64, name: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            id: NodeTypeId(id),
            name: name.into(),
            category: category.into(),
            inputs: Vec::new(),
            outputs: Vec::new(),
        }
    }

    /// Append an input port
    pub fn with_input(mut self, port: Port) -> Self {
        self.inputs.push(port);
        self
    }

    /// Append an output port
    pub fn with_output(mut self, port: Port) -> Self {
        self.outputs.push(port);
        self
    }

    /// Ports of one direction
    pub fn ports(&self, direction: PortDirection) -> &[Port] {
        match direction {
            PortDirection::Input => &self.inputs,
            PortDirection::Output => &self.outputs,
        }
    }

    /// Get a port by direction and index
    pub fn port(&self, direction: PortDirection, index: usize) -> Option<&Port> {
        self.ports(direction).get(index)
    }

    /// Index of the input called `name`
    pub fn input_index(&self, name: &str) -> Option<usize> {
        position_of(&self.inputs, name)
    }

    /// Index of the output called `name`
    pub fn output_index(&self, name: &str) -> Option<usize> {
        position_of(&self.outputs, name)
    }
}

/// Unique identifier for a node instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeInstanceId(pub i64);

impl fmt::Display for NodeInstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A node as stored in a persisted graph
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    /// Instance ID
    pub uid: NodeInstanceId,
    /// Node type ID
    #[serde(rename = "type")]
    pub node_type: NodeTypeId,
}

impl Node {
    /// Create a new persisted node
    pub fn new(uid: i64, node_type: i64) -> Self {
        Self {
            uid: NodeInstanceId(uid),
            node_type: NodeTypeId(node_type),
        }
    }
}

/// A live node owned by a [`Scene`](crate::scene::Scene).
///
/// The node type is copied when the instance is created and never
/// re-resolved against the registry afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeInstance {
    /// Position in the scene
    pub position: Point,
    type_info: NodeType,
}

impl NodeInstance {
    pub(crate) fn new(type_info: NodeType, position: Point) -> Self {
        Self {
            position,
            type_info,
        }
    }

    /// The node type this instance was created from
    pub fn type_info(&self) -> &NodeType {
        &self.type_info
    }

    /// Number of ports in one direction
    pub fn port_count(&self, direction: PortDirection) -> usize {
        self.type_info.ports(direction).len()
    }
}
