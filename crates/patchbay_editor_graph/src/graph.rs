// SPDX-License-Identifier: MIT OR Apache-2.0
//! Persisted graph snapshot: nodes and the connections between them.

use crate::connection::Connection;
use crate::node::Node;
use serde::{Deserialize, Serialize};

/// A node graph as stored on disk
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Graph {
    /// Nodes in the graph
    pub nodes: Vec<Node>,
    /// Connections between nodes
    pub connections: Vec<Connection>,
}

impl Graph {
    /// Create a new empty graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node
    pub fn with_node(mut self, node: Node) -> Self {
        self.nodes.push(node);
        self
    }

    /// Add a connection
    pub fn with_connection(mut self, connection: Connection) -> Self {
        self.connections.push(connection);
        self
    }

    /// Check if the graph has no nodes and no connections
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.connections.is_empty()
    }
}
