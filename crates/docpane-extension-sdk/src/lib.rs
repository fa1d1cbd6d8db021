//! Docpane Extension SDK
//!
//! Everything an extension needs to present documentation to a Docpane
//! host: the [`Extension`] trait and its data types, the fixed-layout
//! C ABI for extensions written in C, and the [`export_extension!`]
//! macro that wires a Rust type up as a loadable shared object.
//!
//! # Quick start
//!
//! ```
//! use docpane_extension_sdk::prelude::*;
//! use std::path::Path;
//!
//! #[derive(Default)]
//! struct ManPages;
//!
//! impl Extension for ManPages {
//!     fn applicability(&self) -> Applicability {
//!         Applicability::Small
//!     }
//!
//!     fn doc_tree(&mut self, path: &Path) -> Option<DocNode> {
//!         path.ends_with("man").then(|| {
//!             DocNode::new("Manual pages")
//!                 .with_child(DocNode::new("ls").with_doc_ref(DocRef(1)))
//!         })
//!     }
//!
//!     fn doc(&self, node: DocRef) -> Document {
//!         Document::uri(format!("man:{}", node.0))
//!     }
//! }
//! ```
//!
//! Finish with `export_extension!(ManPages);` in a `cdylib` crate and
//! the host will find it by probing the `docpane_extension` symbol.

pub mod descriptor;
#[macro_use]
pub mod macros;
pub mod types;

pub use descriptor::{
    CreateFn, DestroyFn, ExtensionDescriptor, RawApplicabilityFn, RawDocFn, RawDocNode,
    RawDocTreeFn, RawDocument, RawExtensionTable, RawSectionFn, RawTextFn, FOREIGN_SYMBOL,
    NATIVE_SYMBOL,
};
pub use types::{Applicability, DocNode, DocRef, Document, Extension};

/// Common imports for extension authors.
pub mod prelude {
    pub use crate::types::{Applicability, DocNode, DocRef, Document, Extension};
}
