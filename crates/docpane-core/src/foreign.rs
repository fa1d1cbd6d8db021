//! Foreign-function adapter: lets an extension written in C satisfy
//! the same [`Extension`] contract as a Rust-native one.
//!
//! The C side hands out plain node structs with NULL-terminated
//! synonym and child arrays. The adapter translates that shape into
//! owned [`DocNode`]s at tree-construction time, copying every string
//! out of C memory, and records the original C node pointer as each
//! translated node's [`DocRef`]. Content queries cast the token back
//! into the pointer the plugin expects. Foreign-owned memory is never
//! freed by the host; it goes away when the module is unmapped.

use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::path::Path;

use docpane_extension_sdk::{
    Applicability, DocNode, DocRef, Document, Extension, RawApplicabilityFn, RawDocFn, RawDocNode,
    RawDocTreeFn, RawExtensionTable, RawSectionFn, RawTextFn,
};
use tracing::warn;

use crate::error::{HostError, Result};

/// Adapter wrapping the function table of a C extension.
pub struct ForeignExtension {
    applicability: RawApplicabilityFn,
    doc_tree: RawDocTreeFn,
    doc: RawDocFn,
    brief: Option<RawTextFn>,
    details: Option<RawTextFn>,
    section: Option<RawSectionFn>,
}

impl ForeignExtension {
    /// Build the adapter, rejecting tables with null required pointers.
    pub fn from_table(table: &RawExtensionTable) -> Result<Self> {
        let applicability = table.applicability.ok_or_else(|| missing("applicability"))?;
        let doc_tree = table.doc_tree.ok_or_else(|| missing("doc_tree"))?;
        let doc = table.doc.ok_or_else(|| missing("doc"))?;

        Ok(Self {
            applicability,
            doc_tree,
            doc,
            brief: table.brief,
            details: table.details,
            section: table.section,
        })
    }

    /// Recursively translate a C node graph into an owned tree,
    /// stamping each node's [`DocRef`] with its source pointer.
    fn translate(&self, raw: *const RawDocNode) -> Option<DocNode> {
        if raw.is_null() {
            return None;
        }

        // SAFETY: non-null node pointers handed out by the extension
        // stay valid until its library is unmapped, and the arrays are
        // NULL-terminated by the ABI contract.
        unsafe {
            let node = &*raw;
            let mut translated =
                DocNode::new(text_or_empty(node.title)).with_doc_ref(DocRef(raw as u64));

            let mut synonym = node.synonyms;
            while !synonym.is_null() && !(*synonym).is_null() {
                translated.synonyms.push(text_or_empty(*synonym));
                synonym = synonym.add(1);
            }

            let mut child = node.children;
            while !child.is_null() && !(*child).is_null() {
                if let Some(subtree) = self.translate(*child) {
                    translated.children.push(subtree);
                }
                child = child.add(1);
            }

            Some(translated)
        }
    }

    fn node_ptr(node: DocRef) -> *const RawDocNode {
        node.0 as *const RawDocNode
    }
}

impl Extension for ForeignExtension {
    fn applicability(&self) -> Applicability {
        // SAFETY: required pointer, validated at construction.
        let raw = unsafe { (self.applicability)() };
        if raw as usize >= Applicability::ALL.len() {
            warn!(raw, "extension reported an unknown applicability level, treating as huge");
        }
        Applicability::from_raw(raw)
    }

    fn doc_tree(&mut self, path: &Path) -> Option<DocNode> {
        let path = CString::new(path.to_string_lossy().into_owned()).ok()?;
        // SAFETY: required pointer, validated at construction.
        let root = unsafe { (self.doc_tree)(path.as_ptr()) };
        self.translate(root)
    }

    fn doc(&self, node: DocRef) -> Document {
        // SAFETY: the DocRef was stamped by translate() from a pointer
        // this extension handed out, and the extension is still loaded.
        let raw = unsafe { (self.doc)(Self::node_ptr(node)) };
        Document {
            content: unsafe { text_or_empty(raw.content_or_uri) },
            is_uri: raw.is_uri,
        }
    }

    fn brief(&self, node: DocRef) -> String {
        match self.brief {
            // SAFETY: see doc().
            Some(brief) => unsafe { text_or_empty(brief(Self::node_ptr(node))) },
            None => String::new(),
        }
    }

    fn details(&self, node: DocRef) -> String {
        match self.details {
            // SAFETY: see doc().
            Some(details) => unsafe { text_or_empty(details(Self::node_ptr(node))) },
            None => String::new(),
        }
    }

    fn section(&self, node: DocRef, name: &str) -> String {
        let Some(section) = self.section else {
            return String::new();
        };
        let Ok(name) = CString::new(name) else {
            return String::new();
        };
        // SAFETY: see doc().
        unsafe { text_or_empty(section(Self::node_ptr(node), name.as_ptr())) }
    }
}

fn missing(function: &str) -> HostError {
    HostError::InvalidExtension(format!("function table has a null `{function}` pointer"))
}

/// Copy a NUL-terminated C string into owned text; null becomes empty.
///
/// # Safety
///
/// A non-null `ptr` must point to a NUL-terminated string valid for
/// the duration of the call.
unsafe fn text_or_empty(ptr: *const c_char) -> String {
    if ptr.is_null() {
        return String::new();
    }
    unsafe { CStr::from_ptr(ptr) }.to_string_lossy().into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use docpane_extension_sdk::RawDocument;
    use std::ptr;
    use std::sync::OnceLock;

    // An in-process stand-in for a C extension: a two-level node graph
    // built once and leaked, served through extern "C" functions with
    // the exact shapes the ABI demands.

    fn leak_cstr(text: &str) -> *const c_char {
        CString::new(text).unwrap().into_raw()
    }

    fn leak_node(
        title: &str,
        synonyms: &[&str],
        children: Vec<*const RawDocNode>,
    ) -> *const RawDocNode {
        let mut synonym_array: Vec<*const c_char> =
            synonyms.iter().map(|s| leak_cstr(s)).collect();
        synonym_array.push(ptr::null());

        let mut child_array = children;
        child_array.push(ptr::null());

        Box::leak(Box::new(RawDocNode {
            title: leak_cstr(title),
            synonyms: Box::leak(synonym_array.into_boxed_slice()).as_ptr(),
            children: Box::leak(child_array.into_boxed_slice()).as_ptr(),
        }))
    }

    fn sample_root() -> *const RawDocNode {
        static ROOT: OnceLock<usize> = OnceLock::new();
        *ROOT.get_or_init(|| {
            let leaf = leak_node("Getting Started", &["Tutorial"], Vec::new());
            let sibling = leak_node("Reference", &[], Vec::new());
            leak_node("User Guide", &[], vec![leaf, sibling]) as usize
        }) as *const RawDocNode
    }

    unsafe extern "C" fn applicability_fn() -> u32 {
        1
    }

    unsafe extern "C" fn out_of_range_applicability_fn() -> u32 {
        17
    }

    unsafe extern "C" fn doc_tree_fn(path: *const c_char) -> *const RawDocNode {
        let path = unsafe { CStr::from_ptr(path) }.to_string_lossy().into_owned();
        if path.ends_with("guide") {
            sample_root()
        } else {
            ptr::null()
        }
    }

    unsafe extern "C" fn doc_fn(node: *const RawDocNode) -> RawDocument {
        // Echo the node's own title back as the document body.
        RawDocument {
            content_or_uri: unsafe { (*node).title },
            is_uri: false,
        }
    }

    unsafe extern "C" fn brief_fn(node: *const RawDocNode) -> *const c_char {
        unsafe { (*node).title }
    }

    fn full_table() -> RawExtensionTable {
        RawExtensionTable {
            applicability: Some(applicability_fn),
            doc_tree: Some(doc_tree_fn),
            doc: Some(doc_fn),
            brief: Some(brief_fn),
            details: None,
            section: None,
        }
    }

    #[test]
    fn rejects_table_with_null_required_pointer() {
        let mut table = full_table();
        table.doc = None;

        let err = ForeignExtension::from_table(&table).err().unwrap();
        assert!(matches!(err, HostError::InvalidExtension(_)));
    }

    #[test]
    fn reports_applicability_from_raw_code() {
        let adapter = ForeignExtension::from_table(&full_table()).unwrap();
        assert_eq!(adapter.applicability(), Applicability::Small);
    }

    #[test]
    fn out_of_range_applicability_clamps_to_huge() {
        let mut table = full_table();
        table.applicability = Some(out_of_range_applicability_fn);

        let adapter = ForeignExtension::from_table(&table).unwrap();
        assert_eq!(adapter.applicability(), Applicability::Huge);
    }

    #[test]
    fn translates_the_foreign_tree_shape() {
        let mut adapter = ForeignExtension::from_table(&full_table()).unwrap();

        let tree = adapter.doc_tree(Path::new("/docs/guide")).unwrap();
        assert_eq!(tree.title, "User Guide");
        assert_eq!(tree.doc_ref, DocRef(sample_root() as u64));
        assert_eq!(tree.children.len(), 2);

        let leaf = &tree.children[0];
        assert_eq!(leaf.title, "Getting Started");
        assert_eq!(leaf.synonyms, vec!["Tutorial".to_string()]);
        assert!(leaf.children.is_empty());
    }

    #[test]
    fn declined_path_translates_to_no_tree() {
        let mut adapter = ForeignExtension::from_table(&full_table()).unwrap();
        assert!(adapter.doc_tree(Path::new("/docs/other")).is_none());
    }

    #[test]
    fn queries_hand_the_original_pointer_back() {
        let mut adapter = ForeignExtension::from_table(&full_table()).unwrap();
        let tree = adapter.doc_tree(Path::new("/docs/guide")).unwrap();

        let doc = adapter.doc(tree.children[0].doc_ref);
        assert_eq!(doc.content, "Getting Started");
        assert!(!doc.is_uri);

        assert_eq!(adapter.brief(tree.doc_ref), "User Guide");
    }

    #[test]
    fn unimplemented_queries_answer_with_empty_text() {
        let mut adapter = ForeignExtension::from_table(&full_table()).unwrap();
        let tree = adapter.doc_tree(Path::new("/docs/guide")).unwrap();

        assert_eq!(adapter.details(tree.doc_ref), "");
        assert_eq!(adapter.section(tree.doc_ref, "SYNOPSIS"), "");
    }
}
