//! Extension host and document-tree runtime for the Docpane
//! documentation viewer.
//!
//! The host loads extensions (shared objects) at runtime, probes each
//! one for either a Rust-native entry point or a C function table,
//! normalizes both behind the [`Extension`] trait, and mediates every
//! later call through a [`Registry`] that maps document nodes back to
//! the extension that produced them.
//!
//! The embedding application talks to exactly one surface:
//!
//! - [`Registry::load_ext`] / [`Registry::unload_ext`] /
//!   [`Registry::is_loaded`] drive the extension lifecycle,
//! - [`Registry::get_doc_tree`] asks loaded extensions to parse a
//!   documentation path, narrowest claim first,
//! - [`Registry::doc`], [`Registry::brief`], [`Registry::details`],
//!   and [`Registry::section`] fetch content for a node,
//! - [`Registry::search`] prefix-matches titles and synonyms across
//!   every registered tree,
//! - [`Registry::validate`] tells whether a previously obtained node
//!   survived later unloads.
//!
//! Nodes are handed out as copyable [`NodeId`]s backed by a
//! registry-owned arena, so unloading an extension invalidates its
//! nodes without leaving dangling references anywhere.
//!
//! The host is single-threaded by design: all mutation goes through
//! `&mut Registry`, which also rules out a query racing a load or
//! unload in safe code.

pub mod error;
pub mod foreign;
mod loader;
pub mod registry;
mod search;
pub mod tree;

pub use error::{HostError, Result};
pub use foreign::ForeignExtension;
pub use registry::Registry;
pub use tree::NodeId;

pub use docpane_extension_sdk::{Applicability, DocNode, DocRef, Document, Extension};
