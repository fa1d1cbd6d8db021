//! Core types shared between the host and extensions.

use std::path::Path;

use serde::{Deserialize, Serialize};

/// How broad a slice of the documentation world an extension claims.
///
/// The registry tries narrower extensions first when asking who can
/// parse a path, so a single-project extension gets a chance before a
/// catch-all HTML extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Applicability {
    /// Applies to a tiny amount of documentation.
    Tiny = 0,

    /// Applies to a small amount of documentation, more than tiny.
    Small = 1,

    /// Applies to a moderate amount of documentation.
    Medium = 2,

    /// Applies to a reasonable amount of documentation.
    Big = 3,

    /// Applies to a huge amount of documentation.
    Huge = 4,
}

impl Applicability {
    /// Every level, narrowest first. This is the trial order the host
    /// uses when building document trees.
    pub const ALL: [Applicability; 5] = [
        Applicability::Tiny,
        Applicability::Small,
        Applicability::Medium,
        Applicability::Big,
        Applicability::Huge,
    ];

    /// Map a raw level code from the C ABI. Out-of-range codes clamp
    /// to [`Applicability::Huge`].
    pub fn from_raw(raw: u32) -> Self {
        match raw {
            0 => Applicability::Tiny,
            1 => Applicability::Small,
            2 => Applicability::Medium,
            3 => Applicability::Big,
            _ => Applicability::Huge,
        }
    }
}

/// Opaque per-node token chosen by an extension when it builds a tree.
///
/// The host stores the token alongside each registered node and hands
/// it back verbatim on every content query, so an extension can find
/// its own data again. Extensions are free to encode an index, a hash,
/// or (as the host's C adapter does) a raw pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct DocRef(pub u64);

/// Content of one document: either inline HTML or a URI to load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// HTML markup, or a URI when `is_uri` is set.
    pub content: String,

    /// Whether `content` is a URI rather than inline markup.
    pub is_uri: bool,
}

impl Document {
    /// Inline HTML content.
    pub fn html(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            is_uri: false,
        }
    }

    /// A URI the viewer should load.
    pub fn uri(uri: impl Into<String>) -> Self {
        Self {
            content: uri.into(),
            is_uri: true,
        }
    }
}

/// Blueprint for one node of a document tree.
///
/// Extensions return these from [`Extension::doc_tree`]; the host
/// interns them into its own arena and owns the memory from then on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocNode {
    /// Title of the document.
    pub title: String,

    /// Alternate search keys for the title.
    pub synonyms: Vec<String>,

    /// Token handed back to the extension on content queries.
    pub doc_ref: DocRef,

    /// Child documents, in display order.
    pub children: Vec<DocNode>,
}

impl DocNode {
    /// Create a leaf node with the given title.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            synonyms: Vec::new(),
            doc_ref: DocRef::default(),
            children: Vec::new(),
        }
    }

    /// Set the token handed back on content queries.
    pub fn with_doc_ref(mut self, doc_ref: DocRef) -> Self {
        self.doc_ref = doc_ref;
        self
    }

    /// Add an alternate search key.
    pub fn with_synonym(mut self, synonym: impl Into<String>) -> Self {
        self.synonyms.push(synonym.into());
        self
    }

    /// Append a child document.
    pub fn with_child(mut self, child: DocNode) -> Self {
        self.children.push(child);
        self
    }
}

/// The capability set every extension must satisfy.
///
/// Implement this directly for extensions written in Rust; extensions
/// written in C export a [`RawExtensionTable`] instead and are adapted
/// onto this trait by the host.
///
/// [`RawExtensionTable`]: crate::descriptor::RawExtensionTable
pub trait Extension {
    /// Breadth of documentation this extension claims to handle.
    fn applicability(&self) -> Applicability;

    /// Parse `path` into a document tree, or `None` to decline the path.
    fn doc_tree(&mut self, path: &Path) -> Option<DocNode>;

    /// Content of the document behind `node`.
    fn doc(&self, node: DocRef) -> Document;

    /// One-line summary of the document. Empty when unimplemented.
    fn brief(&self, _node: DocRef) -> String {
        String::new()
    }

    /// Long-form description of the document. Empty when unimplemented.
    fn details(&self, _node: DocRef) -> String {
        String::new()
    }

    /// A named section of the document. Empty when unimplemented.
    fn section(&self, _node: DocRef, _name: &str) -> String {
        String::new()
    }
}
