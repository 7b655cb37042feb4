// SPDX-License-Identifier: MIT OR Apache-2.0
//! Execution of editor commands against an open session.

use crate::cli::Commands;
use crate::session::{Session, SessionError};
use patchbay_editor_graph::{
    Catalog, CatalogFilter, CatalogItem, ConnectionInstanceId, Endpoint, NodeInstance,
    NodeInstanceId, NodeTypeId, Point, PortDirection, PortLocator, Scene, SceneError, Slot,
};
use thiserror::Error;

/// Vertical distance between port rows in the text view
const PORT_SPACING: f64 = 20.0;
/// Width of a node in the text view
const NODE_WIDTH: f64 = 160.0;

/// Command execution errors
#[derive(Debug, Error)]
pub enum CommandError {
    /// The session rejected the command
    #[error(transparent)]
    Session(#[from] SessionError),

    /// The catalog filter is not a valid pattern
    #[error("Invalid filter pattern: {0}")]
    InvalidFilter(#[from] regex::Error),

    /// A node still has connections and cascade was not requested
    #[error("Node {node} has {count} connection(s), use --cascade to remove them too")]
    NodeHasConnections {
        /// The node
        node: NodeInstanceId,
        /// Number of attached connections
        count: usize,
    },
}

impl From<SceneError> for CommandError {
    fn from(e: SceneError) -> Self {
        Self::Session(SessionError::Scene(e))
    }
}

/// Result type for command execution
pub type Result<T> = std::result::Result<T, CommandError>;

/// What a command produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    /// Text to print
    pub output: String,
    /// Whether the scene changed and should be saved
    pub modified: bool,
}

impl Outcome {
    fn report(output: String) -> Self {
        Self {
            output,
            modified: false,
        }
    }

    fn edit(output: String) -> Self {
        Self {
            output,
            modified: true,
        }
    }
}

/// Run a command
pub fn execute(session: &mut Session, command: Commands) -> Result<Outcome> {
    tracing::debug!(?command, "Executing command");
    match command {
        Commands::Show { paths } => Ok(Outcome::report(render_scene(session.scene(), paths)?)),
        Commands::Catalog { filter } => {
            let catalog = session.catalog();
            let filter = filter.as_deref().map(|p| catalog.filter(p)).transpose()?;
            Ok(Outcome::report(render_catalog(catalog, filter.as_ref())))
        }
        Commands::AddNode { node_type, x, y } => {
            let id = session
                .scene_mut()
                .create_node(NodeTypeId(node_type), Point::new(x, y))?;
            Ok(Outcome::edit(format!("Added node {id}")))
        }
        Commands::Connect {
            source,
            signal,
            destination,
            slot,
        } => {
            let id = session.connect(
                NodeInstanceId(source),
                &signal,
                NodeInstanceId(destination),
                &slot,
            )?;
            Ok(Outcome::edit(format!("Added connection {id}")))
        }
        Commands::RemoveNode { uid, cascade } => {
            let node = NodeInstanceId(uid);
            let scene = session.scene_mut();
            if scene.node(node).is_none() {
                return Err(SceneError::UnknownNodeReference(node).into());
            }
            let attached = scene.connections_for_node(node).count();
            if cascade {
                scene.remove_node_cascade(node);
                Ok(Outcome::edit(format!(
                    "Removed node {node} and {attached} connection(s)"
                )))
            } else if attached > 0 {
                Err(CommandError::NodeHasConnections {
                    node,
                    count: attached,
                })
            } else {
                scene.remove_node(node);
                Ok(Outcome::edit(format!("Removed node {node}")))
            }
        }
        Commands::Disconnect { uid } => {
            let id = ConnectionInstanceId(uid);
            session
                .scene_mut()
                .remove_connection(id)
                .ok_or(SceneError::UnknownConnection(id))?;
            Ok(Outcome::edit(format!("Removed connection {id}")))
        }
        Commands::Move { uid, x, y } => {
            let node = NodeInstanceId(uid);
            session
                .scene_mut()
                .set_node_position(node, Point::new(x, y))?;
            Ok(Outcome::edit(format!("Moved node {node} to ({x}, {y})")))
        }
    }
}

/// Ports stacked down the left (inputs) and right (outputs) edges of a node
struct RowLocator;

impl PortLocator for RowLocator {
    fn port_position(&self, node: &NodeInstance, direction: PortDirection, index: usize) -> Point {
        let x = match direction {
            PortDirection::Input => node.position.x,
            PortDirection::Output => node.position.x + NODE_WIDTH,
        };
        Point::new(x, node.position.y + PORT_SPACING * (index as f64 + 1.0))
    }
}

fn port_label(scene: &Scene, endpoint: Endpoint, direction: PortDirection) -> String {
    let name = scene
        .node(endpoint.node)
        .and_then(|n| n.type_info().port(direction, endpoint.port))
        .map_or("?", |p| p.name.as_str());
    format!("{}.{}", endpoint.node, name)
}

fn render_scene(scene: &Scene, paths: bool) -> Result<String> {
    let mut lines = vec![format!("nodes ({}):", scene.node_count())];
    for (id, node) in scene.nodes() {
        lines.push(format!(
            "  {id} {} [{}] at ({}, {})",
            node.type_info().name,
            node.type_info().category,
            node.position.x,
            node.position.y
        ));
    }

    lines.push(format!("connections ({}):", scene.connection_count()));
    for (id, connection) in scene.connections() {
        let source = port_label(scene, connection.source(), PortDirection::Output);
        let destination = connection.destination().map_or_else(
            || "(pending)".to_owned(),
            |d| port_label(scene, d, PortDirection::Input),
        );
        lines.push(format!("  {id} {source} -> {destination}"));

        if paths && connection.is_bound() {
            let path = scene.connection_path(id, &RowLocator, Point::default())?;
            let points: Vec<String> = path
                .points()
                .iter()
                .map(|p| format!("({}, {})", p.x, p.y))
                .collect();
            lines.push(format!("    path {}", points.join(" ")));
        }
    }

    Ok(lines.join("\n"))
}

fn render_catalog(catalog: &Catalog, filter: Option<&CatalogFilter>) -> String {
    let children = |parent: Option<Slot>| -> Vec<Slot> {
        match filter {
            Some(filter) => filter.visible_children(catalog, parent),
            None => (0..catalog.row_count(parent))
                .filter_map(|row| catalog.child(parent, row))
                .collect(),
        }
    };

    let mut lines = Vec::new();
    for category in children(None) {
        lines.push(catalog.name(category).to_owned());
        for slot in children(Some(category)) {
            if let CatalogItem::NodeType { id, name } = catalog.item(slot) {
                lines.push(format!("  {name} ({id})"));
            }
        }
    }
    lines.join("\n")
}
