// SPDX-License-Identifier: MIT OR Apache-2.0
//! The live, editable graph.
//!
//! A [`Scene`] owns every node and connection instance and hands out fresh
//! ids for them. Connections refer to their endpoint nodes by id, so
//! removing a node never leaves a dangling reference behind: the
//! connection simply points at an id that is no longer present.
//!
//! Removing a node does not remove the connections touching it. Callers
//! remove those first, or use [`Scene::remove_node_cascade`].

use crate::connection::{
    Connection, ConnectionInstance, ConnectionInstanceId, ConnectionPath, Endpoint, PortLocator,
};
use crate::graph::Graph;
use crate::layout::{GraphLayout, NodeLayout, Point};
use crate::node::{Node, NodeInstance, NodeInstanceId, NodeTypeId};
use crate::port::PortDirection;
use crate::registry::TypeRegistry;
use std::collections::BTreeMap;

/// Scene operation failure
#[derive(Debug, thiserror::Error)]
pub enum SceneError {
    /// No node type with this id is registered
    #[error("Unknown node type: {0}")]
    UnknownNodeType(NodeTypeId),

    /// No live node with this id
    #[error("Unknown node: {0}")]
    UnknownNodeReference(NodeInstanceId),

    /// No live connection with this id
    #[error("Unknown connection: {0}")]
    UnknownConnection(ConnectionInstanceId),

    /// A port name does not exist on the node's type
    #[error("Unknown port {port:?} on node {node}")]
    UnknownPort {
        /// Node whose type was searched
        node: NodeInstanceId,
        /// The missing port name
        port: String,
    },

    /// A port index is outside the node's port list
    #[error("Node {node} has no {direction} at index {index}")]
    InvalidPortIndex {
        /// Node whose type was searched
        node: NodeInstanceId,
        /// Input or output
        direction: PortDirection,
        /// The offending index
        index: usize,
    },

    /// A loaded graph uses a node id twice
    #[error("Duplicate node: {0}")]
    DuplicateNode(NodeInstanceId),

    /// A loaded graph uses a connection id twice
    #[error("Duplicate connection: {0}")]
    DuplicateConnection(ConnectionInstanceId),

    /// A position has a NaN or infinite coordinate
    #[error("Position ({}, {}) is not finite", .0.x, .0.y)]
    NonFinitePosition(Point),

    /// Every id has been handed out
    #[error("Exceeded id space")]
    IdSpaceExhausted,
}

/// Result type for scene operations
pub type Result<T> = std::result::Result<T, SceneError>;

/// Owner of all live nodes and connections
#[derive(Debug, Clone)]
pub struct Scene {
    registry: TypeRegistry,
    nodes: BTreeMap<NodeInstanceId, NodeInstance>,
    connections: BTreeMap<ConnectionInstanceId, ConnectionInstance>,
    last_node_uid: i64,
    last_connection_uid: i64,
}

impl Scene {
    /// Create an empty scene for a registry
    pub fn new(registry: TypeRegistry) -> Self {
        Self {
            registry,
            nodes: BTreeMap::new(),
            connections: BTreeMap::new(),
            last_node_uid: 0,
            last_connection_uid: 0,
        }
    }

    /// The registry nodes are created from
    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    /// Remove everything. Id counters keep their values.
    pub fn clear(&mut self) {
        // connections reference nodes, so they go first
        self.connections.clear();
        self.nodes.clear();
    }

    /// Load a persisted graph into the scene.
    ///
    /// Every node type, node reference and port name is resolved before
    /// anything is committed. On failure the scene is cleared and the error
    /// returned; a half-loaded graph is never left behind.
    pub fn set_content(&mut self, content: Graph) -> Result<()> {
        match self.resolve_content(content) {
            Ok((nodes, connections)) => {
                let node_count = nodes.len();
                let connection_count = connections.len();
                for (id, node) in nodes {
                    self.last_node_uid = self.last_node_uid.max(id.0);
                    self.nodes.insert(id, node);
                }
                for (id, connection) in connections {
                    self.last_connection_uid = self.last_connection_uid.max(id.0);
                    self.connections.insert(id, connection);
                }
                tracing::debug!(node_count, connection_count, "Loaded scene content");
                Ok(())
            }
            Err(err) => {
                tracing::debug!("Scene content rejected: {err}");
                self.clear();
                Err(err)
            }
        }
    }

    fn resolve_content(
        &self,
        content: Graph,
    ) -> Result<(
        BTreeMap<NodeInstanceId, NodeInstance>,
        BTreeMap<ConnectionInstanceId, ConnectionInstance>,
    )> {
        let mut nodes = BTreeMap::new();
        for node in content.nodes {
            let type_info = self
                .registry
                .node_type(node.node_type)
                .ok_or(SceneError::UnknownNodeType(node.node_type))?;
            if self.nodes.contains_key(&node.uid) || nodes.contains_key(&node.uid) {
                return Err(SceneError::DuplicateNode(node.uid));
            }
            nodes.insert(node.uid, NodeInstance::new(type_info.clone(), Point::default()));
        }

        let lookup = |id: NodeInstanceId| {
            nodes
                .get(&id)
                .or_else(|| self.nodes.get(&id))
                .ok_or(SceneError::UnknownNodeReference(id))
        };

        let mut connections = BTreeMap::new();
        for connection in content.connections {
            let source = lookup(connection.source)?;
            let source_port = source.type_info().output_index(&connection.signal).ok_or_else(|| {
                SceneError::UnknownPort {
                    node: connection.source,
                    port: connection.signal.clone(),
                }
            })?;

            let destination = lookup(connection.destination)?;
            let destination_port = destination
                .type_info()
                .input_index(&connection.slot)
                .ok_or_else(|| SceneError::UnknownPort {
                    node: connection.destination,
                    port: connection.slot.clone(),
                })?;

            if self.connections.contains_key(&connection.uid)
                || connections.contains_key(&connection.uid)
            {
                return Err(SceneError::DuplicateConnection(connection.uid));
            }
            connections.insert(
                connection.uid,
                ConnectionInstance::bound(
                    Endpoint::new(connection.source, source_port),
                    Endpoint::new(connection.destination, destination_port),
                ),
            );
        }

        Ok((nodes, connections))
    }

    /// Project the scene back to its persisted form.
    ///
    /// Pending connections are left out. Port names are looked up from each
    /// endpoint node's type at the recorded index. Fails if a bound
    /// connection still points at a removed node.
    pub fn get_content(&self) -> Result<Graph> {
        let nodes = self
            .nodes
            .iter()
            .map(|(id, node)| Node {
                uid: *id,
                node_type: node.type_info().id,
            })
            .collect();

        let mut connections = Vec::new();
        for (id, connection) in &self.connections {
            let Some(destination) = connection.destination() else {
                continue;
            };
            let source = connection.source();
            connections.push(Connection {
                uid: *id,
                source: source.node,
                signal: self.port_name(source, PortDirection::Output)?.to_owned(),
                destination: destination.node,
                slot: self.port_name(destination, PortDirection::Input)?.to_owned(),
            });
        }

        Ok(Graph { nodes, connections })
    }

    fn port_name(&self, endpoint: Endpoint, direction: PortDirection) -> Result<&str> {
        let node = self.node_or_err(endpoint.node)?;
        node.type_info()
            .port(direction, endpoint.port)
            .map(|p| p.name.as_str())
            .ok_or(SceneError::InvalidPortIndex {
                node: endpoint.node,
                direction,
                index: endpoint.port,
            })
    }

    /// Positions of every node
    pub fn get_layout(&self) -> GraphLayout {
        GraphLayout {
            node_layouts: self
                .nodes
                .iter()
                .map(|(id, node)| NodeLayout {
                    node: *id,
                    position: node.position,
                })
                .collect(),
        }
    }

    /// Move nodes to the recorded positions.
    ///
    /// Fails without moving anything if any entry names a node that is not
    /// live or carries a non-finite position.
    pub fn set_layout(&mut self, layout: GraphLayout) -> Result<()> {
        for l in &layout.node_layouts {
            if !self.nodes.contains_key(&l.node) {
                return Err(SceneError::UnknownNodeReference(l.node));
            }
            check_position(l.position)?;
        }
        for l in layout.node_layouts {
            if let Some(node) = self.nodes.get_mut(&l.node) {
                node.position = l.position;
            }
        }
        Ok(())
    }

    /// Instantiate a node type at a position.
    ///
    /// Positions must be finite, as for every other way of placing a node.
    pub fn create_node(&mut self, node_type: NodeTypeId, position: Point) -> Result<NodeInstanceId> {
        check_position(position)?;
        let type_info = self
            .registry
            .node_type(node_type)
            .ok_or(SceneError::UnknownNodeType(node_type))?
            .clone();
        let id = NodeInstanceId(next_uid(&mut self.last_node_uid)?);
        self.nodes.insert(id, NodeInstance::new(type_info, position));
        tracing::debug!(%id, %node_type, "Created node");
        Ok(id)
    }

    /// Start a new pending connection from a node's output
    pub fn create_connection(
        &mut self,
        source: NodeInstanceId,
        source_port: usize,
    ) -> Result<ConnectionInstanceId> {
        self.check_port(source, PortDirection::Output, source_port)?;
        let id = ConnectionInstanceId(next_uid(&mut self.last_connection_uid)?);
        self.connections.insert(
            id,
            ConnectionInstance::pending(Endpoint::new(source, source_port)),
        );
        tracing::debug!(%id, %source, source_port, "Created connection");
        Ok(id)
    }

    /// Rebind a connection's destination.
    ///
    /// `None` returns the connection to the pending state; it stays
    /// registered but is left out of [`Scene::get_content`].
    pub fn set_destination(
        &mut self,
        connection: ConnectionInstanceId,
        destination: Option<Endpoint>,
    ) -> Result<()> {
        if let Some(d) = destination {
            self.check_port(d.node, PortDirection::Input, d.port)?;
        }
        let instance = self
            .connections
            .get_mut(&connection)
            .ok_or(SceneError::UnknownConnection(connection))?;
        instance.set_destination(destination);
        Ok(())
    }

    /// End a drag: a connection that is still pending is removed.
    ///
    /// Returns whether the connection was removed.
    pub fn finish_drag(&mut self, connection: ConnectionInstanceId) -> bool {
        let pending = self
            .connections
            .get(&connection)
            .is_some_and(|c| !c.is_bound());
        if pending {
            self.remove_connection(connection);
        }
        pending
    }

    /// Remove a node. Connections touching it are left in place.
    pub fn remove_node(&mut self, id: NodeInstanceId) -> Option<NodeInstance> {
        let removed = self.nodes.remove(&id);
        if removed.is_some() {
            tracing::debug!(%id, "Removed node");
        }
        removed
    }

    /// Remove a connection
    pub fn remove_connection(&mut self, id: ConnectionInstanceId) -> Option<ConnectionInstance> {
        let removed = self.connections.remove(&id);
        if removed.is_some() {
            tracing::debug!(%id, "Removed connection");
        }
        removed
    }

    /// Remove a node together with every connection touching it
    pub fn remove_node_cascade(&mut self, id: NodeInstanceId) -> Option<NodeInstance> {
        let attached: Vec<_> = self.connections_for_node(id).map(|(cid, _)| cid).collect();
        for cid in attached {
            self.remove_connection(cid);
        }
        self.remove_node(id)
    }

    /// Check if any connection ends at this input
    pub fn is_input_connected(&self, node: NodeInstanceId, port: usize) -> bool {
        let endpoint = Endpoint::new(node, port);
        self.connections
            .values()
            .any(|c| c.destination() == Some(endpoint))
    }

    /// Check if any connection starts at this output
    pub fn is_output_connected(&self, node: NodeInstanceId, port: usize) -> bool {
        let endpoint = Endpoint::new(node, port);
        self.connections.values().any(|c| c.source() == endpoint)
    }

    /// Route the drawn path of a connection
    pub fn connection_path(
        &self,
        connection: ConnectionInstanceId,
        locator: &dyn PortLocator,
        cursor: Point,
    ) -> Result<ConnectionPath> {
        let instance = self
            .connections
            .get(&connection)
            .ok_or(SceneError::UnknownConnection(connection))?;
        instance.recompute_path(self, locator, cursor).ok_or_else(|| {
            let missing = [Some(instance.source()), instance.destination()]
                .into_iter()
                .flatten()
                .map(|e| e.node)
                .find(|n| !self.nodes.contains_key(n))
                .unwrap_or(instance.source().node);
            SceneError::UnknownNodeReference(missing)
        })
    }

    /// Move a single node
    pub fn set_node_position(&mut self, id: NodeInstanceId, position: Point) -> Result<()> {
        check_position(position)?;
        let node = self
            .nodes
            .get_mut(&id)
            .ok_or(SceneError::UnknownNodeReference(id))?;
        node.position = position;
        Ok(())
    }

    /// Get a node by ID
    pub fn node(&self, id: NodeInstanceId) -> Option<&NodeInstance> {
        self.nodes.get(&id)
    }

    /// All nodes, ordered by id
    pub fn nodes(&self) -> impl Iterator<Item = (NodeInstanceId, &NodeInstance)> {
        self.nodes.iter().map(|(id, n)| (*id, n))
    }

    /// Get a connection by ID
    pub fn connection(&self, id: ConnectionInstanceId) -> Option<&ConnectionInstance> {
        self.connections.get(&id)
    }

    /// All connections, ordered by id
    pub fn connections(&self) -> impl Iterator<Item = (ConnectionInstanceId, &ConnectionInstance)> {
        self.connections.iter().map(|(id, c)| (*id, c))
    }

    /// Connections with either end on a node
    pub fn connections_for_node(
        &self,
        node: NodeInstanceId,
    ) -> impl Iterator<Item = (ConnectionInstanceId, &ConnectionInstance)> {
        self.connections().filter(move |(_, c)| c.involves_node(node))
    }

    /// Get the number of nodes
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Get the number of connections, pending ones included
    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    fn node_or_err(&self, id: NodeInstanceId) -> Result<&NodeInstance> {
        self.nodes.get(&id).ok_or(SceneError::UnknownNodeReference(id))
    }

    fn check_port(&self, node: NodeInstanceId, direction: PortDirection, index: usize) -> Result<()> {
        if index < self.node_or_err(node)?.port_count(direction) {
            Ok(())
        } else {
            Err(SceneError::InvalidPortIndex {
                node,
                direction,
                index,
            })
        }
    }
}

fn next_uid(last: &mut i64) -> Result<i64> {
    *last = last.checked_add(1).ok_or(SceneError::IdSpaceExhausted)?;
    Ok(*last)
}

fn check_position(position: Point) -> Result<()> {
    if position.is_finite() {
        Ok(())
    } else {
        Err(SceneError::NonFinitePosition(position))
    }
}
