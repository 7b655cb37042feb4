// SPDX-License-Identifier: MIT OR Apache-2.0
//! Node positions, persisted separately from the graph topology.
//!
//! Keeping layout apart from the graph lets a layout fail to load without
//! losing the nodes and connections it describes.

use crate::node::NodeInstanceId;
use serde::{Deserialize, Serialize};

/// A 2-D position in scene coordinates.
///
/// Encoded as a two element array `[x, y]`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Point {
    /// Horizontal coordinate
    pub x: f64,
    /// Vertical coordinate
    pub y: f64,
}

impl Point {
    /// Create a new point
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Check that both coordinates are finite.
    ///
    /// NaN and infinities have no JSON form, so a scene only accepts
    /// finite positions.
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// Offset this point horizontally
    pub fn shifted_x(self, dx: f64) -> Self {
        Self::new(self.x + dx, self.y)
    }
}

impl From<[f64; 2]> for Point {
    fn from([x, y]: [f64; 2]) -> Self {
        Self { x, y }
    }
}

impl From<Point> for [f64; 2] {
    fn from(p: Point) -> Self {
        [p.x, p.y]
    }
}

/// Position of a single node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeLayout {
    /// The node being placed
    #[serde(rename = "uid")]
    pub node: NodeInstanceId,
    /// Its position in the scene
    pub position: Point,
}

/// Positions of every node in a graph
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphLayout {
    /// One entry per placed node
    #[serde(rename = "node_layout")]
    pub node_layouts: Vec<NodeLayout>,
}

impl GraphLayout {
    /// Position recorded for `node`, if any
    pub fn position_of(&self, node: NodeInstanceId) -> Option<Point> {
        self.node_layouts
            .iter()
            .find(|l| l.node == node)
            .map(|l| l.position)
    }
}
