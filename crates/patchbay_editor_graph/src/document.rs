// SPDX-License-Identifier: MIT OR Apache-2.0
//! Top-level persisted document.
//!
//! A document is an object with `type_registry`, `graph` and `layout`
//! entries. Any other keys are carried through untouched, in their
//! original position.

use crate::codec::{Persist, Result, SchemaError};
use crate::graph::Graph;
use crate::layout::GraphLayout;
use crate::registry::TypeRegistry;
use serde_json::{Map, Value};

const TYPE_REGISTRY: &str = "type_registry";
const GRAPH: &str = "graph";
const LAYOUT: &str = "layout";

/// A persisted editor document
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    entries: Map<String, Value>,
}

impl Document {
    /// Create a document holding a registry, an empty graph and an empty layout
    pub fn new(registry: &TypeRegistry) -> Result<Self> {
        let mut doc = Self::default();
        doc.set_type_registry(registry)?;
        doc.set_graph(&Graph::new())?;
        doc.set_layout(&GraphLayout::default())?;
        Ok(doc)
    }

    /// Wrap a value tree, which must be an object
    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Object(entries) => Ok(Self { entries }),
            _ => Err(SchemaError::NotAnObject),
        }
    }

    /// The whole document as a value tree
    pub fn to_value(&self) -> Value {
        Value::Object(self.entries.clone())
    }

    /// Parse JSON text
    pub fn from_json_str(text: &str) -> Result<Self> {
        Self::from_value(serde_json::from_str(text)?)
    }

    /// Write pretty-printed JSON text
    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.entries)?)
    }

    /// Parse RON text
    pub fn from_ron_str(text: &str) -> Result<Self> {
        let value: Value = ron::from_str(text)?;
        Self::from_value(value)
    }

    /// Write pretty-printed RON text
    pub fn to_ron_string(&self) -> Result<String> {
        Ok(ron::ser::to_string_pretty(
            &self.entries,
            ron::ser::PrettyConfig::default(),
        )?)
    }

    /// Decode the type registry
    pub fn type_registry(&self) -> Result<TypeRegistry> {
        TypeRegistry::decode(self.field(TYPE_REGISTRY)?)
    }

    /// Decode the graph
    pub fn graph(&self) -> Result<Graph> {
        Graph::decode(self.field(GRAPH)?)
    }

    /// Decode the layout
    pub fn layout(&self) -> Result<GraphLayout> {
        GraphLayout::decode(self.field(LAYOUT)?)
    }

    /// Replace the type registry
    pub fn set_type_registry(&mut self, registry: &TypeRegistry) -> Result<()> {
        self.entries.insert(TYPE_REGISTRY.to_owned(), registry.encode()?);
        Ok(())
    }

    /// Replace the graph
    pub fn set_graph(&mut self, graph: &Graph) -> Result<()> {
        self.entries.insert(GRAPH.to_owned(), graph.encode()?);
        Ok(())
    }

    /// Replace the layout
    pub fn set_layout(&mut self, layout: &GraphLayout) -> Result<()> {
        self.entries.insert(LAYOUT.to_owned(), layout.encode()?);
        Ok(())
    }

    /// A raw entry, including passthrough keys
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    fn field(&self, key: &'static str) -> Result<Value> {
        self.entries
            .get(key)
            .cloned()
            .ok_or(SchemaError::MissingField(key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{Node, NodeType};
    use serde_json::json;

    #[test]
    fn test_passthrough_keys_survive() {
        let mut doc = Document::from_value(json!({
            "window": { "width": 1280 },
            "type_registry": { "node_types": [], "data_types": [] },
            "graph": { "nodes": [], "connections": [] },
            "layout": { "node_layout": [] }
        }))
        .unwrap();

        doc.set_graph(&Graph::new().with_node(Node::new(1, 2))).unwrap();

        let value = doc.to_value();
        assert_eq!(value["window"]["width"], 1280);
        assert_eq!(value["graph"]["nodes"][0]["uid"], 1);
        let keys: Vec<_> = value.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys, vec!["window", "type_registry", "graph", "layout"]);
    }

    #[test]
    fn test_missing_entry() {
        let doc = Document::from_value(json!({ "graph": { "nodes": [], "connections": [] } }))
            .unwrap();
        assert!(doc.graph().unwrap().is_empty());
        assert!(matches!(doc.layout(), Err(SchemaError::MissingField("layout"))));
        assert!(matches!(doc.type_registry(), Err(SchemaError::MissingField("type_registry"))));
    }

    #[test]
    fn test_non_object_rejected() {
        assert!(matches!(Document::from_value(json!([1, 2])), Err(SchemaError::NotAnObject)));
        assert!(Document::from_json_str("not json").is_err());
    }

    #[test]
    fn test_json_text_round_trip() {
        let registry = TypeRegistry::new().with_node_type(NodeType::new(5, "Noise", "Texture"));
        let doc = Document::new(&registry).unwrap();
        let text = doc.to_json_string().unwrap();
        let parsed = Document::from_json_str(&text).unwrap();
        assert_eq!(parsed, doc);
        assert_eq!(parsed.type_registry().unwrap(), registry);
    }

    #[test]
    fn test_ron_text_round_trip() {
        let registry = TypeRegistry::new().with_node_type(NodeType::new(5, "Noise", "Texture"));
        let mut doc = Document::new(&registry).unwrap();
        doc.set_graph(&Graph::new().with_node(Node::new(3, 5))).unwrap();

        let text = doc.to_ron_string().unwrap();
        let parsed = Document::from_ron_str(&text).unwrap();
        assert_eq!(parsed.type_registry().unwrap(), registry);
        assert_eq!(parsed.graph().unwrap(), doc.graph().unwrap());
    }
}
