// SPDX-License-Identifier: MIT OR Apache-2.0
//! Patchbay Editor - node graph document shell
//!
//! Opens a graph document, runs one editing or inspection command against
//! its scene, and writes the document back when the command changed it.
//!
//! ## Architecture
//!
//! The document model, scene engine and catalog live in
//! `patchbay_editor_graph`. This binary only wires them to a file and the
//! command line. Logs go to stderr, command output to stdout.

mod cli;
mod commands;
mod session;

use clap::Parser;
use cli::Cli;
use session::Session;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

fn main() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("patchbay_editor_app=info,patchbay_editor_graph=info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    tracing::debug!("Starting Patchbay Editor v{}", env!("CARGO_PKG_VERSION"));

    if let Err(e) = run(cli) {
        tracing::error!("{e}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), commands::CommandError> {
    let mut session = Session::open(&cli.document)?;
    let outcome = commands::execute(&mut session, cli.command)?;
    if !outcome.output.is_empty() {
        println!("{}", outcome.output);
    }
    if outcome.modified {
        if session.recovered() {
            tracing::warn!("Replacing the unreadable stored graph in {:?}", cli.document);
        }
        session.save()?;
    }
    Ok(())
}
