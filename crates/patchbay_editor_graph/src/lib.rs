// SPDX-License-Identifier: MIT OR Apache-2.0
//! Node graph document model for the Patchbay editor.
//!
//! This crate provides everything below the drawing layer:
//! - A read-only registry of data types and node types
//! - The persisted graph and layout schema
//! - A strict codec to and from a generic value tree
//! - The scene engine that owns and edits live nodes and connections
//! - A flat category tree for browsing node types
//!
//! ## Architecture
//!
//! A [`TypeRegistry`] is loaded once. A [`Scene`] is built against it and
//! receives a [`Graph`] and [`GraphLayout`] decoded from a [`Document`].
//! Edits go through the scene, which can project its state back into a
//! graph and layout for saving. The [`Catalog`] is built from the same
//! registry and never changes afterwards.

pub mod port;
pub mod node;
pub mod connection;
pub mod graph;
pub mod layout;
pub mod registry;
pub mod codec;
pub mod document;
pub mod scene;
pub mod catalog;

pub use port::{DataType, DataTypeId, Port, PortDirection};
pub use node::{Node, NodeInstance, NodeInstanceId, NodeType, NodeTypeId};
pub use connection::{
    Connection, ConnectionInstance, ConnectionInstanceId, ConnectionPath, ConnectionState,
    Endpoint, PortLocator,
};
pub use graph::Graph;
pub use layout::{GraphLayout, NodeLayout, Point};
pub use registry::{RegistryError, TypeRegistry};
pub use codec::{Persist, SchemaError};
pub use document::Document;
pub use scene::{Scene, SceneError};
pub use catalog::{Catalog, CatalogFilter, CatalogItem, DragPayload, ItemFlags, Slot};
