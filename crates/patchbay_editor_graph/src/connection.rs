// SPDX-License-Identifier: MIT OR Apache-2.0
//! Connection (edge) definitions for the graph.

use crate::layout::Point;
use crate::node::{NodeInstance, NodeInstanceId};
use crate::port::PortDirection;
use crate::scene::Scene;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Horizontal lead-out of a routed path at each end
pub const INSERTION_WIDTH: f64 = 20.0;

/// Unique identifier for a connection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConnectionInstanceId(pub i64);

impl fmt::Display for ConnectionInstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A connection as stored in a persisted graph.
///
/// Ports are referenced by name so a saved graph survives reordering of a
/// node type's ports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Connection {
    /// Connection ID
    pub uid: ConnectionInstanceId,
    /// Source node
    pub source: NodeInstanceId,
    /// Name of the source output
    pub signal: String,
    /// Destination node
    pub destination: NodeInstanceId,
    /// Name of the destination input
    pub slot: String,
}

impl Connection {
    /// Create a new persisted connection
    pub fn new(
        uid: i64,
        source: i64,
        signal: impl Into<String>,
        destination: i64,
        slot: impl Into<String>,
    ) -> Self {
        Self {
            uid: ConnectionInstanceId(uid),
            source: NodeInstanceId(source),
            signal: signal.into(),
            destination: NodeInstanceId(destination),
            slot: slot.into(),
        }
    }
}

/// One end of a live connection: a node and a port index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Endpoint {
    /// The node
    pub node: NodeInstanceId,
    /// Port index within the node's inputs or outputs
    pub port: usize,
}

impl Endpoint {
    /// Create a new endpoint
    pub fn new(node: NodeInstanceId, port: usize) -> Self {
        Self { node, port }
    }
}

/// Whether a connection has a destination yet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// Source only, e.g. while being dragged
    Pending,
    /// Source and destination both set
    Bound,
}

/// A live connection owned by a [`Scene`].
///
/// Endpoints refer to nodes by id. A connection whose endpoint node has
/// been removed stays registered until it is removed itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionInstance {
    source: Endpoint,
    destination: Option<Endpoint>,
}

impl ConnectionInstance {
    /// A connection with no destination
    pub fn pending(source: Endpoint) -> Self {
        Self {
            source,
            destination: None,
        }
    }

    /// A connection with both ends set
    pub fn bound(source: Endpoint, destination: Endpoint) -> Self {
        Self {
            source,
            destination: Some(destination),
        }
    }

    /// The output end
    pub fn source(&self) -> Endpoint {
        self.source
    }

    /// The input end, if bound
    pub fn destination(&self) -> Option<Endpoint> {
        self.destination
    }

    pub(crate) fn set_destination(&mut self, destination: Option<Endpoint>) {
        self.destination = destination;
    }

    /// Current state
    pub fn state(&self) -> ConnectionState {
        match self.destination {
            Some(_) => ConnectionState::Bound,
            None => ConnectionState::Pending,
        }
    }

    /// Check if the destination is set
    pub fn is_bound(&self) -> bool {
        self.destination.is_some()
    }

    /// Check if this connection involves a specific node
    pub fn involves_node(&self, node_id: NodeInstanceId) -> bool {
        self.source.node == node_id || self.destination.is_some_and(|d| d.node == node_id)
    }

    /// Route the path drawn for this connection.
    ///
    /// A pending connection ends at `cursor`. Returns `None` if an endpoint
    /// node is no longer part of `scene`.
    pub fn recompute_path(
        &self,
        scene: &Scene,
        locator: &dyn PortLocator,
        cursor: Point,
    ) -> Option<ConnectionPath> {
        let source_node = scene.node(self.source.node)?;
        let start = locator.port_position(source_node, PortDirection::Output, self.source.port);
        let end = match self.destination {
            Some(d) => {
                let node = scene.node(d.node)?;
                locator.port_position(node, PortDirection::Input, d.port)
            }
            None => cursor,
        };
        Some(ConnectionPath::route(start, end))
    }
}

/// Resolves where a port is drawn. Implemented by the rendering layer.
pub trait PortLocator {
    /// Scene position of a port anchor
    fn port_position(&self, node: &NodeInstance, direction: PortDirection, index: usize) -> Point;
}

/// Orthogonal polyline from an output anchor to an input anchor
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConnectionPath {
    points: [Point; 6],
}

impl ConnectionPath {
    /// Route between two anchors.
    ///
    /// The path leaves `start` to the right and enters `end` from the left,
    /// each by [`INSERTION_WIDTH`]. The middle turns vertically when the span
    /// is wider than tall and horizontally otherwise.
    pub fn route(start: Point, end: Point) -> Self {
        let start_offset = start.shifted_x(INSERTION_WIDTH);
        let end_offset = end.shifted_x(-INSERTION_WIDTH);

        let dx = end_offset.x - start_offset.x;
        let dy = end_offset.y - start_offset.y;
        let mid = Point::new(start_offset.x + 0.5 * dx, start_offset.y + 0.5 * dy);

        let (bend_a, bend_b) = if dx.abs() > dy.abs() {
            (
                Point::new(mid.x, start_offset.y),
                Point::new(mid.x, end_offset.y),
            )
        } else {
            (
                Point::new(start_offset.x, mid.y),
                Point::new(end_offset.x, mid.y),
            )
        };

        Self {
            points: [start, start_offset, bend_a, bend_b, end_offset, end],
        }
    }

    /// All points of the polyline
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// First point (the source anchor)
    pub fn start(&self) -> Point {
        self.points[0]
    }

    /// Last point (the destination anchor or cursor)
    pub fn end(&self) -> Point {
        self.points[5]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_follows_destination() {
        let source = Endpoint::new(NodeInstanceId(1), 0);
        let mut c = ConnectionInstance::pending(source);
        assert_eq!(c.state(), ConnectionState::Pending);
        assert!(c.involves_node(NodeInstanceId(1)));
        assert!(!c.involves_node(NodeInstanceId(2)));

        c.set_destination(Some(Endpoint::new(NodeInstanceId(2), 1)));
        assert_eq!(c.state(), ConnectionState::Bound);
        assert!(c.involves_node(NodeInstanceId(2)));

        c.set_destination(None);
        assert_eq!(c.state(), ConnectionState::Pending);
    }

    #[test]
    fn test_route_wide_span_bends_vertically() {
        let path = ConnectionPath::route(Point::new(0.0, 0.0), Point::new(200.0, 40.0));
        assert_eq!(
            path.points(),
            &[
                Point::new(0.0, 0.0),
                Point::new(20.0, 0.0),
                Point::new(100.0, 0.0),
                Point::new(100.0, 40.0),
                Point::new(180.0, 40.0),
                Point::new(200.0, 40.0),
            ]
        );
    }

    #[test]
    fn test_route_tall_span_bends_horizontally() {
        let path = ConnectionPath::route(Point::new(0.0, 0.0), Point::new(40.0, 200.0));
        assert_eq!(path.points()[2], Point::new(20.0, 100.0));
        assert_eq!(path.points()[3], Point::new(20.0, 100.0));
        assert_eq!(path.start(), Point::new(0.0, 0.0));
        assert_eq!(path.end(), Point::new(40.0, 200.0));
    }

    #[test]
    fn test_connection_schema_keys() {
        let value = serde_json::to_value(Connection::new(9, 1, "out", 2, "in")).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "uid": 9,
                "source": 1,
                "signal": "out",
                "destination": 2,
                "slot": "in"
            })
        );
    }
}
