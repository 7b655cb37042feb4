// SPDX-License-Identifier: MIT OR Apache-2.0
//! Command line interface.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Patchbay node graph editor
#[derive(Debug, Parser)]
#[command(name = "patchbay_editor")]
#[command(about = "Inspect and edit Patchbay node graph documents")]
#[command(version)]
pub struct Cli {
    /// Document to open (.json or .ron)
    #[arg(short, long, default_value = "graph.json", global = true)]
    pub document: PathBuf,

    /// What to do with the document
    #[command(subcommand)]
    pub command: Commands,
}

/// Editor commands
#[derive(Debug, Clone, PartialEq, Subcommand)]
pub enum Commands {
    /// Print nodes and connections
    Show {
        /// Also print the routed path of each connection
        #[arg(long)]
        paths: bool,
    },

    /// Print the node type catalog
    Catalog {
        /// Wildcard pattern on node type names (`*`, `?` and `[...]` sets)
        #[arg(short, long)]
        filter: Option<String>,
    },

    /// Add a node of a registered type
    AddNode {
        /// Node type id
        node_type: i64,

        /// Horizontal position
        #[arg(allow_negative_numbers = true)]
        x: f64,

        /// Vertical position
        #[arg(allow_negative_numbers = true)]
        y: f64,
    },

    /// Connect an output port to an input port
    Connect {
        /// Source node id
        source: i64,

        /// Output port name on the source
        signal: String,

        /// Destination node id
        destination: i64,

        /// Input port name on the destination
        slot: String,
    },

    /// Remove a node
    RemoveNode {
        /// Node id
        uid: i64,

        /// Also remove every connection touching the node
        #[arg(long)]
        cascade: bool,
    },

    /// Remove a connection
    Disconnect {
        /// Connection id
        uid: i64,
    },

    /// Move a node
    Move {
        /// Node id
        uid: i64,

        /// Horizontal position
        #[arg(allow_negative_numbers = true)]
        x: f64,

        /// Vertical position
        #[arg(allow_negative_numbers = true)]
        y: f64,
    },
}
