// SPDX-License-Identifier: MIT OR Apache-2.0
//! An open document: the file, its scene and its catalog.
//!
//! Opening fails only if the file cannot be read or its type registry
//! cannot be decoded. A graph that fails to load is logged and replaced by
//! an empty graph over the same registry. A layout that fails to load is
//! logged and the nodes keep their default positions. The file itself is
//! only rewritten by [`Session::save`].

use patchbay_editor_graph::{
    Catalog, ConnectionInstanceId, Document, Endpoint, NodeInstanceId, PortDirection, Scene,
    SceneError, SchemaError,
};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Session errors
#[derive(Debug, Error)]
pub enum SessionError {
    /// Reading or writing the document failed
    #[error("I/O error on {path:?}: {source}")]
    Io {
        /// The document path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// The document does not match the schema
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// A scene edit was rejected
    #[error(transparent)]
    Scene(#[from] SceneError),

    /// A port name is not defined on a node
    #[error("Node {node} has no {direction} named {name:?}")]
    UnknownPortName {
        /// Node whose type was searched
        node: NodeInstanceId,
        /// Input or output
        direction: PortDirection,
        /// The missing name
        name: String,
    },
}

/// Result type for session operations
pub type Result<T> = std::result::Result<T, SessionError>;

/// On-disk text format of a document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    /// JSON text
    Json,
    /// RON text
    Ron,
}

impl DocumentFormat {
    /// Pick the format from a file extension, defaulting to JSON
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("ron") => Self::Ron,
            _ => Self::Json,
        }
    }

    fn parse(self, text: &str) -> std::result::Result<Document, SchemaError> {
        match self {
            Self::Json => Document::from_json_str(text),
            Self::Ron => Document::from_ron_str(text),
        }
    }

    fn write(self, document: &Document) -> std::result::Result<String, SchemaError> {
        match self {
            Self::Json => document.to_json_string(),
            Self::Ron => document.to_ron_string(),
        }
    }
}

/// An open document
pub struct Session {
    path: PathBuf,
    format: DocumentFormat,
    document: Document,
    scene: Scene,
    catalog: Catalog,
    recovered: bool,
}

impl Session {
    /// Open a document file
    pub fn open(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| SessionError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let format = DocumentFormat::from_path(path);
        let document = format.parse(&text)?;
        let session = Self::from_document(path.to_path_buf(), format, document)?;
        tracing::info!(
            "Opened {:?}: {} nodes, {} connections",
            path,
            session.scene.node_count(),
            session.scene.connection_count()
        );
        Ok(session)
    }

    /// Build a session around an already parsed document
    pub fn from_document(path: PathBuf, format: DocumentFormat, document: Document) -> Result<Self> {
        let registry = document.type_registry()?;
        if let Err(e) = registry.validate() {
            tracing::warn!("Type registry is inconsistent: {e}");
        }

        let catalog = Catalog::new(&registry);
        let mut scene = Scene::new(registry);
        let recovered = match load_graph(&mut scene, &document) {
            Ok(()) => {
                if let Err(e) = load_layout(&mut scene, &document) {
                    tracing::warn!("Failed to load layout, keeping default positions: {e}");
                }
                false
            }
            Err(e) => {
                tracing::warn!("Failed to load graph, starting with an empty one: {e}");
                scene.clear();
                true
            }
        };

        Ok(Self {
            path,
            format,
            document,
            scene,
            catalog,
            recovered,
        })
    }

    /// Write the scene back into the document and the document to disk
    pub fn save(&mut self) -> Result<()> {
        self.document.set_graph(&self.scene.get_content()?)?;
        self.document.set_layout(&self.scene.get_layout())?;
        let text = self.format.write(&self.document)?;
        std::fs::write(&self.path, text).map_err(|source| SessionError::Io {
            path: self.path.clone(),
            source,
        })?;
        tracing::info!("Saved {:?}", self.path);
        Ok(())
    }

    /// Connect two nodes by port names
    pub fn connect(
        &mut self,
        source: NodeInstanceId,
        signal: &str,
        destination: NodeInstanceId,
        slot: &str,
    ) -> Result<ConnectionInstanceId> {
        let source_port = self.port_index(source, PortDirection::Output, signal)?;
        let destination_port = self.port_index(destination, PortDirection::Input, slot)?;
        let id = self.scene.create_connection(source, source_port)?;
        if let Err(e) = self
            .scene
            .set_destination(id, Some(Endpoint::new(destination, destination_port)))
        {
            self.scene.remove_connection(id);
            return Err(e.into());
        }
        Ok(id)
    }

    fn port_index(&self, node: NodeInstanceId, direction: PortDirection, name: &str) -> Result<usize> {
        let instance = self
            .scene
            .node(node)
            .ok_or(SceneError::UnknownNodeReference(node))?;
        let index = match direction {
            PortDirection::Input => instance.type_info().input_index(name),
            PortDirection::Output => instance.type_info().output_index(name),
        };
        index.ok_or_else(|| SessionError::UnknownPortName {
            node,
            direction,
            name: name.to_owned(),
        })
    }

    /// The live scene
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// The live scene, for editing
    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    /// The node type catalog
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Whether the stored graph failed to load and was replaced
    pub fn recovered(&self) -> bool {
        self.recovered
    }
}

fn load_graph(scene: &mut Scene, document: &Document) -> Result<()> {
    scene.set_content(document.graph()?)?;
    Ok(())
}

fn load_layout(scene: &mut Scene, document: &Document) -> Result<()> {
    scene.set_layout(document.layout()?)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use patchbay_editor_graph::{
        Connection, DataType, DataTypeId, Graph, Node, NodeType, Point, Port, TypeRegistry,
    };
    use std::io::Write;

    fn registry() -> TypeRegistry {
        TypeRegistry::new()
            .with_data_type(DataType::new(1, "float"))
            .with_node_type(NodeType::new(1, "Constant", "Input").with_output(Port::new("value", DataTypeId(1))))
            .with_node_type(NodeType::new(2, "Print", "Output").with_input(Port::new("value", DataTypeId(1))))
    }

    fn write_document(dir: &Path, name: &str, document: &Document) -> PathBuf {
        let path = dir.join(name);
        let text = DocumentFormat::from_path(&path).write(document).unwrap();
        std::fs::File::create(&path)
            .unwrap()
            .write_all(text.as_bytes())
            .unwrap();
        path
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(DocumentFormat::from_path(Path::new("a.ron")), DocumentFormat::Ron);
        assert_eq!(DocumentFormat::from_path(Path::new("a.RON")), DocumentFormat::Ron);
        assert_eq!(DocumentFormat::from_path(Path::new("a.json")), DocumentFormat::Json);
        assert_eq!(DocumentFormat::from_path(Path::new("graph")), DocumentFormat::Json);
    }

    #[test]
    fn test_open_edit_save() {
        let dir = tempfile::tempdir().unwrap();
        let mut document = Document::new(&registry()).unwrap();
        document
            .set_graph(&Graph::new().with_node(Node::new(1, 1)).with_node(Node::new(2, 2)))
            .unwrap();
        let path = write_document(dir.path(), "graph.json", &document);

        let mut session = Session::open(&path).unwrap();
        assert!(!session.recovered());
        assert_eq!(session.scene().node_count(), 2);

        let id = session.connect(NodeInstanceId(1), "value", NodeInstanceId(2), "value").unwrap();
        session.scene_mut().set_node_position(NodeInstanceId(2), Point::new(5.0, 6.0)).unwrap();
        session.save().unwrap();

        let reopened = Session::open(&path).unwrap();
        assert!(reopened.scene().connection(id).unwrap().is_bound());
        assert_eq!(reopened.scene().node(NodeInstanceId(2)).unwrap().position, Point::new(5.0, 6.0));
    }

    #[test]
    fn test_broken_graph_recovers_empty() {
        let dir = tempfile::tempdir().unwrap();
        let mut document = Document::new(&registry()).unwrap();
        document.set_graph(&Graph::new().with_node(Node::new(1, 99))).unwrap();
        let path = write_document(dir.path(), "broken.json", &document);

        let session = Session::open(&path).unwrap();
        assert!(session.recovered());
        assert_eq!(session.scene().node_count(), 0);
        assert_eq!(session.catalog().row_count(None), 2);
    }

    #[test]
    fn test_missing_layout_keeps_graph() {
        let dir = tempfile::tempdir().unwrap();
        let mut document = Document::new(&registry()).unwrap();
        document.set_graph(&Graph::new().with_node(Node::new(1, 1))).unwrap();
        let mut value = document.to_value();
        value.as_object_mut().unwrap().remove("layout");
        let path = write_document(dir.path(), "no_layout.json", &Document::from_value(value).unwrap());

        let session = Session::open(&path).unwrap();
        assert!(!session.recovered());
        assert_eq!(session.scene().node_count(), 1);
        assert_eq!(session.scene().node(NodeInstanceId(1)).unwrap().position, Point::default());
    }

    #[test]
    fn test_broken_layout_keeps_graph_through_save() {
        let dir = tempfile::tempdir().unwrap();
        let graph = Graph::new()
            .with_node(Node::new(1, 1))
            .with_node(Node::new(2, 2))
            .with_connection(Connection::new(3, 1, "value", 2, "value"));
        let mut document = Document::new(&registry()).unwrap();
        document.set_graph(&graph).unwrap();
        let mut value = document.to_value();
        value["layout"] = serde_json::json!({ "node_layout": "garbage" });
        let path = write_document(dir.path(), "bad_layout.json", &Document::from_value(value).unwrap());

        let mut session = Session::open(&path).unwrap();
        assert!(!session.recovered());
        assert_eq!(session.scene().node_count(), 2);
        assert_eq!(session.scene().connection_count(), 1);

        session.scene_mut().set_node_position(NodeInstanceId(1), Point::new(7.0, 8.0)).unwrap();
        session.save().unwrap();

        let reopened = Session::open(&path).unwrap();
        assert_eq!(reopened.scene().get_content().unwrap(), graph);
        assert_eq!(reopened.scene().node(NodeInstanceId(1)).unwrap().position, Point::new(7.0, 8.0));
    }

    #[test]
    fn test_missing_registry_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.json");
        std::fs::write(&path, "{}").unwrap();
        assert!(matches!(Session::open(&path), Err(SessionError::Schema(SchemaError::MissingField(_)))));
        assert!(matches!(
            Session::open(&dir.path().join("absent.json")),
            Err(SessionError::Io { .. })
        ));
    }

    #[test]
    fn test_connect_unknown_port_name() {
        let document = Document::new(&registry()).unwrap();
        let mut session = Session::from_document(PathBuf::from("x.json"), DocumentFormat::Json, document).unwrap();
        let a = session.scene_mut().create_node(patchbay_editor_graph::NodeTypeId(1), Point::default()).unwrap();
        let b = session.scene_mut().create_node(patchbay_editor_graph::NodeTypeId(2), Point::default()).unwrap();
        assert!(matches!(
            session.connect(a, "nope", b, "value"),
            Err(SessionError::UnknownPortName { direction: PortDirection::Output, .. })
        ));
        assert_eq!(session.scene().connection_count(), 0);
    }

    #[test]
    fn test_save_refuses_dangling_connection() {
        let dir = tempfile::tempdir().unwrap();
        let mut document = Document::new(&registry()).unwrap();
        document
            .set_graph(&Graph::new().with_node(Node::new(1, 1)).with_node(Node::new(2, 2)))
            .unwrap();
        let path = write_document(dir.path(), "graph.ron", &document);
        let before = std::fs::read_to_string(&path).unwrap();

        let mut session = Session::open(&path).unwrap();
        session.connect(NodeInstanceId(1), "value", NodeInstanceId(2), "value").unwrap();
        session.scene_mut().remove_node(NodeInstanceId(2));
        assert!(matches!(session.save(), Err(SessionError::Scene(SceneError::UnknownNodeReference(_)))));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), before);
    }
}
