//! Dynamic module handles and entry-point probing.
//!
//! Loading runs in two stages: open the shared object, then probe it
//! for the Rust-native descriptor first and the C function table
//! second. Whichever is found, the result is a plain
//! `Box<dyn Extension>` so the registry never branches on extension
//! kind again.

use std::path::{Path, PathBuf};

use docpane_extension_sdk::{
    Applicability, DestroyFn, DocNode, DocRef, Document, Extension, ExtensionDescriptor,
    RawExtensionTable, FOREIGN_SYMBOL, NATIVE_SYMBOL,
};
use libloading::Library;
use tracing::debug;

use crate::error::{HostError, Result};
use crate::foreign::ForeignExtension;

/// Identity of one loaded extension within a registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct ExtensionId(pub(crate) u64);

/// One loaded module: its paths, its extension instance, and the OS
/// library handle keeping the code mapped.
pub(crate) struct LoadedModule {
    pub(crate) id: ExtensionId,

    /// Path exactly as passed to `load_ext`; the idempotence key.
    pub(crate) path: PathBuf,

    /// The extension instance. Declared before the library so it drops
    /// first: its code and data live in the mapped object.
    pub(crate) extension: Box<dyn Extension>,

    /// `None` for built-in extensions registered without a library.
    pub(crate) _library: Option<Library>,
}

/// Resolve symlinks and require a regular file, the shape an
/// extension module must have on disk.
pub(crate) fn resolve_module_path(path: &Path) -> Result<PathBuf> {
    let resolved =
        std::fs::canonicalize(path).map_err(|_| HostError::NotFound(path.to_path_buf()))?;
    if !resolved.is_file() {
        return Err(HostError::NotFound(path.to_path_buf()));
    }
    Ok(resolved)
}

/// Open the shared object at `resolved` and probe its entry points.
///
/// On any failure after the open, the returned error drops the library
/// and the module is unmapped again.
pub(crate) fn open_module(resolved: &Path) -> Result<(Box<dyn Extension>, Library)> {
    // SAFETY: loading a shared object runs its initializers.
    // Extensions run with full process privileges by contract; there
    // is no sandbox to uphold here.
    let library = unsafe { Library::new(resolved)? };
    let extension = probe(&library, resolved)?;
    Ok((extension, library))
}

fn probe(library: &Library, path: &Path) -> Result<Box<dyn Extension>> {
    // Both entry points are exported data, so the symbols resolve to
    // the address of the static and are read through a pointer.

    // SAFETY: the symbol's type is fixed by the loading convention the
    // extension opted into by exporting it.
    if let Ok(symbol) = unsafe { library.get::<*const ExtensionDescriptor>(NATIVE_SYMBOL) } {
        debug!(path = %path.display(), "found native extension descriptor");
        if symbol.is_null() {
            return Err(HostError::InvalidExtension(
                "native descriptor symbol resolved to null".into(),
            ));
        }
        // SAFETY: non-null, and the library stays mapped for the call.
        let descriptor = unsafe { &**symbol };
        return native_from_descriptor(descriptor);
    }

    // SAFETY: as above, for the C convention.
    if let Ok(symbol) = unsafe { library.get::<*const RawExtensionTable>(FOREIGN_SYMBOL) } {
        debug!(path = %path.display(), "found C extension function table");
        if symbol.is_null() {
            return Err(HostError::InvalidExtension(
                "extension function table symbol resolved to null".into(),
            ));
        }
        // SAFETY: as above.
        let table = unsafe { &**symbol };
        let adapter = ForeignExtension::from_table(table)?;
        return Ok(Box::new(adapter));
    }

    Err(HostError::InvalidExtension(format!(
        "{} exposes neither extension entry point",
        path.display()
    )))
}

fn native_from_descriptor(descriptor: &ExtensionDescriptor) -> Result<Box<dyn Extension>> {
    let create = descriptor.create.ok_or_else(|| {
        HostError::InvalidExtension("native descriptor has a null create function".into())
    })?;
    let destroy = descriptor.destroy.ok_or_else(|| {
        HostError::InvalidExtension("native descriptor has a null destroy function".into())
    })?;

    // SAFETY: create comes from a descriptor the library itself
    // exported under the native convention.
    let instance = unsafe { create() };
    if instance.is_null() {
        return Err(HostError::InvalidExtension(
            "native extension constructor returned null".into(),
        ));
    }

    Ok(Box::new(NativeExtension {
        instance: instance as *mut Box<dyn Extension>,
        destroy,
    }))
}

/// A Rust-native extension instance owned through its raw
/// create/destroy pair. Delegates every trait call to the boxed
/// instance the plugin's constructor produced.
struct NativeExtension {
    instance: *mut Box<dyn Extension>,
    destroy: DestroyFn,
}

impl NativeExtension {
    fn inner(&self) -> &dyn Extension {
        // SAFETY: instance is non-null for the life of self and points
        // at the Box produced by the extension's create function.
        unsafe { &**self.instance }
    }

    fn inner_mut(&mut self) -> &mut dyn Extension {
        // SAFETY: as above, and &mut self gives exclusive access.
        unsafe { &mut **self.instance }
    }
}

impl Extension for NativeExtension {
    fn applicability(&self) -> Applicability {
        self.inner().applicability()
    }

    fn doc_tree(&mut self, path: &Path) -> Option<DocNode> {
        self.inner_mut().doc_tree(path)
    }

    fn doc(&self, node: DocRef) -> Document {
        self.inner().doc(node)
    }

    fn brief(&self, node: DocRef) -> String {
        self.inner().brief(node)
    }

    fn details(&self, node: DocRef) -> String {
        self.inner().details(node)
    }

    fn section(&self, node: DocRef, name: &str) -> String {
        self.inner().section(node, name)
    }
}

impl Drop for NativeExtension {
    fn drop(&mut self) {
        // SAFETY: destroy pairs with the create that produced instance,
        // and the module is still mapped while this wrapper exists.
        unsafe { (self.destroy)(self.instance as *mut ()) };
    }
}
