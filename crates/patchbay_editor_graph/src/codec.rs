// SPDX-License-Identifier: MIT OR Apache-2.0
//! Conversion between the document model and a generic value tree.
//!
//! Every persisted entity encodes to a [`serde_json::Value`] and decodes
//! back from one. Decoding is strict: a missing field or a scalar of the
//! wrong kind fails the whole decode, nothing is defaulted.

use crate::connection::Connection;
use crate::graph::Graph;
use crate::layout::{GraphLayout, NodeLayout};
use crate::node::{Node, NodeType};
use crate::port::DataType;
use crate::registry::TypeRegistry;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

/// Decode failure
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    /// Value tree did not match the schema
    #[error("Schema mismatch: {0}")]
    Json(#[from] serde_json::Error),

    /// RON text could not be parsed
    #[error("RON parse error: {0}")]
    Ron(#[from] ron::error::SpannedError),

    /// Value could not be written as RON
    #[error("RON encode error: {0}")]
    RonEncode(#[from] ron::Error),

    /// A required top-level field is absent
    #[error("Missing field: {0}")]
    MissingField(&'static str),

    /// The value is not an object
    #[error("Expected an object")]
    NotAnObject,
}

/// Result type for codec operations
pub type Result<T> = std::result::Result<T, SchemaError>;

/// An entity with a fixed persisted schema.
///
/// `decode(encode(x)) == x` holds for every implementor.
pub trait Persist: Serialize + DeserializeOwned {
    /// Encode into a value tree
    fn encode(&self) -> Result<Value> {
        Ok(serde_json::to_value(self)?)
    }

    /// Decode from a value tree
    fn decode(value: Value) -> Result<Self> {
        Ok(serde_json::from_value(value)?)
    }
}

impl Persist for DataType {}
impl Persist for NodeType {}
impl Persist for TypeRegistry {}
impl Persist for Node {}
impl Persist for Connection {}
impl Persist for Graph {}
impl Persist for NodeLayout {}
impl Persist for GraphLayout {}
