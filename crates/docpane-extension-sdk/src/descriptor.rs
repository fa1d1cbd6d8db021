//! Fixed-layout ABI structures exported by extension libraries.
//!
//! A host probes a freshly loaded shared object for two symbols, in
//! order: [`NATIVE_SYMBOL`] (a Rust-native [`ExtensionDescriptor`])
//! and [`FOREIGN_SYMBOL`] (a C [`RawExtensionTable`]). Exactly one of
//! them must be present for the object to count as an extension.

use std::os::raw::c_char;

use crate::types::Extension;

/// Symbol a Rust-native extension exports, NUL-terminated for lookup.
pub const NATIVE_SYMBOL: &[u8] = b"docpane_extension\0";

/// Symbol a C extension exports, NUL-terminated for lookup.
pub const FOREIGN_SYMBOL: &[u8] = b"docpane_extension_functions\0";

/// Creates the extension instance. Returns null on failure.
pub type CreateFn = unsafe extern "C" fn() -> *mut ();

/// Destroys an instance produced by [`CreateFn`].
pub type DestroyFn = unsafe extern "C" fn(*mut ());

/// Entry point exported by Rust-native extensions under [`NATIVE_SYMBOL`].
///
/// `create` returns the raw form of a `Box<Box<dyn Extension>>` (see
/// [`into_raw_extension`]); `destroy` reclaims it. The
/// [`export_extension!`](crate::export_extension) macro writes all of
/// this for you.
#[repr(C)]
pub struct ExtensionDescriptor {
    /// Constructor for the extension instance.
    pub create: Option<CreateFn>,

    /// Destructor paired with `create`.
    pub destroy: Option<DestroyFn>,
}

/// Leak a newly built extension into the raw representation returned
/// by [`CreateFn`].
pub fn into_raw_extension(extension: Box<dyn Extension>) -> *mut () {
    Box::into_raw(Box::new(extension)) as *mut ()
}

/// Reclaim and drop an instance produced by [`into_raw_extension`].
///
/// # Safety
///
/// `raw` must have come from [`into_raw_extension`] and must not be
/// used afterwards.
pub unsafe fn drop_raw_extension(raw: *mut ()) {
    if !raw.is_null() {
        drop(unsafe { Box::from_raw(raw as *mut Box<dyn Extension>) });
    }
}

/// One node of the plain tree shape a C extension returns.
#[repr(C)]
pub struct RawDocNode {
    /// NUL-terminated title. Null is treated as an empty title.
    pub title: *const c_char,

    /// NULL-terminated array of NUL-terminated synonyms. May be null.
    pub synonyms: *const *const c_char,

    /// NULL-terminated array of child node pointers. May be null.
    pub children: *const *const RawDocNode,
}

/// Document content returned by a C extension.
#[repr(C)]
pub struct RawDocument {
    /// NUL-terminated HTML markup, or a URI when `is_uri` is set.
    pub content_or_uri: *const c_char,

    /// Whether `content_or_uri` is a URI rather than inline markup.
    pub is_uri: bool,
}

/// Reports the extension's applicability level as a raw code.
pub type RawApplicabilityFn = unsafe extern "C" fn() -> u32;

/// Builds a document tree for a path, or returns null to decline.
pub type RawDocTreeFn = unsafe extern "C" fn(path: *const c_char) -> *const RawDocNode;

/// Returns the content of the document behind a node.
pub type RawDocFn = unsafe extern "C" fn(node: *const RawDocNode) -> RawDocument;

/// Returns brief or detail text for a node.
pub type RawTextFn = unsafe extern "C" fn(node: *const RawDocNode) -> *const c_char;

/// Returns a named section of a node's document.
pub type RawSectionFn =
    unsafe extern "C" fn(node: *const RawDocNode, name: *const c_char) -> *const c_char;

/// Function table exported by C extensions under [`FOREIGN_SYMBOL`].
///
/// `applicability`, `doc_tree`, and `doc` are required; a table with
/// any of them null is rejected at load time. The text queries may be
/// null, in which case the host answers them with empty text.
#[repr(C)]
pub struct RawExtensionTable {
    /// Required: applicability level of the extension.
    pub applicability: Option<RawApplicabilityFn>,

    /// Required: tree builder.
    pub doc_tree: Option<RawDocTreeFn>,

    /// Required: document content getter.
    pub doc: Option<RawDocFn>,

    /// Optional: one-line summary.
    pub brief: Option<RawTextFn>,

    /// Optional: long-form description.
    pub details: Option<RawTextFn>,

    /// Optional: named-section getter.
    pub section: Option<RawSectionFn>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Applicability, DocNode, DocRef, Document};
    use std::path::Path;

    struct Stub;

    impl Extension for Stub {
        fn applicability(&self) -> Applicability {
            Applicability::Medium
        }

        fn doc_tree(&mut self, _path: &Path) -> Option<DocNode> {
            Some(DocNode::new("root"))
        }

        fn doc(&self, node: DocRef) -> Document {
            Document::html(format!("doc {}", node.0))
        }
    }

    #[test]
    fn raw_extension_round_trip() {
        let raw = into_raw_extension(Box::new(Stub));
        assert!(!raw.is_null());

        let extension = unsafe { &mut *(raw as *mut Box<dyn Extension>) };
        assert_eq!(extension.applicability(), Applicability::Medium);
        assert_eq!(extension.doc(DocRef(3)).content, "doc 3");

        unsafe { drop_raw_extension(raw) };
    }

    #[test]
    fn drop_raw_extension_ignores_null() {
        unsafe { drop_raw_extension(std::ptr::null_mut()) };
    }

    #[test]
    fn symbols_are_nul_terminated() {
        assert_eq!(NATIVE_SYMBOL.last(), Some(&0));
        assert_eq!(FOREIGN_SYMBOL.last(), Some(&0));
    }
}
