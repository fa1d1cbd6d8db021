//! The extension registry: load/unload lifecycle, tree ownership, and
//! query routing.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use docpane_extension_sdk::{Applicability, DocRef, Document, Extension};
use tracing::{debug, info};

use crate::error::{HostError, Result};
use crate::loader::{self, ExtensionId, LoadedModule};
use crate::search;
use crate::tree::{NodeArena, NodeId};

/// Process-wide table of loaded modules, their extension instances,
/// and which document trees belong to which extension.
///
/// One registry per host process is the expected shape, but nothing
/// here is global: independent registries are fully isolated, which is
/// also what makes the host testable.
///
/// All mutation goes through `&mut self`; queries take `&self`. In
/// safe single-threaded use that rules out a lookup crossing a load or
/// unload boundary.
pub struct Registry {
    /// Load order is preserved; it is the trial order within an
    /// applicability level.
    modules: Vec<LoadedModule>,

    /// Every node of every registered tree.
    arena: NodeArena,

    /// Root node -> owning extension. A node is valid exactly while
    /// its root is present here.
    roots: HashMap<NodeId, ExtensionId>,

    next_extension: u64,
}

impl Registry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            modules: Vec::new(),
            arena: NodeArena::default(),
            roots: HashMap::new(),
            next_extension: 0,
        }
    }

    /// Load an extension module from `path`.
    ///
    /// Loading the same input path twice is a no-op. The target is
    /// resolved through symlinks and must be a regular file. The
    /// module must expose one of the two extension entry points;
    /// otherwise it is unmapped again and the registry is unchanged.
    pub fn load_ext(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if self.is_loaded(path) {
            debug!(path = %path.display(), "extension already loaded");
            return Ok(());
        }

        let resolved = loader::resolve_module_path(path)?;
        let (extension, library) = loader::open_module(&resolved)?;

        let id = self.alloc_extension_id();
        self.modules.push(LoadedModule {
            id,
            path: path.to_path_buf(),
            extension,
            _library: Some(library),
        });
        info!(path = %path.display(), "loaded extension");
        Ok(())
    }

    /// Register an extension compiled into the host.
    ///
    /// `name` takes the place of a filesystem path in [`is_loaded`]
    /// and [`unload_ext`]; all other bookkeeping is shared with loaded
    /// modules. Registering an already-registered name is a no-op,
    /// matching [`load_ext`].
    ///
    /// [`is_loaded`]: Registry::is_loaded
    /// [`unload_ext`]: Registry::unload_ext
    /// [`load_ext`]: Registry::load_ext
    pub fn register_builtin(&mut self, name: impl Into<PathBuf>, extension: Box<dyn Extension>) {
        let name = name.into();
        if self.is_loaded(&name) {
            debug!(name = %name.display(), "built-in extension already registered");
            return;
        }

        let id = self.alloc_extension_id();
        info!(name = %name.display(), "registered built-in extension");
        self.modules.push(LoadedModule {
            id,
            path: name,
            extension,
            _library: None,
        });
    }

    /// Unload the extension loaded from `path`. Unknown paths are
    /// silently ignored.
    ///
    /// Registry bookkeeping is purged before the module handle is
    /// released, so no lookup can cross the unmap: every tree the
    /// extension produced disappears from the root index and the
    /// arena, then the extension instance is destroyed, then the
    /// library is unmapped.
    pub fn unload_ext(&mut self, path: impl AsRef<Path>) {
        let path = path.as_ref();
        let Some(index) = self.modules.iter().position(|m| m.path == path) else {
            debug!(path = %path.display(), "unload requested for extension that is not loaded");
            return;
        };
        let id = self.modules[index].id;

        let owned: Vec<NodeId> = self
            .roots
            .iter()
            .filter_map(|(&root, &owner)| (owner == id).then_some(root))
            .collect();
        for root in owned {
            self.roots.remove(&root);
            self.arena.remove_tree(root);
        }

        // Last action: dropping the module destroys the extension
        // instance and only then unmaps the library.
        drop(self.modules.remove(index));
        info!(path = %path.display(), "unloaded extension");
    }

    /// Whether an extension is loaded under exactly this input path.
    /// No symlink resolution is performed.
    pub fn is_loaded(&self, path: impl AsRef<Path>) -> bool {
        let path = path.as_ref();
        self.modules.iter().any(|m| m.path == path)
    }

    /// Ask loaded extensions to parse `path` into a document tree.
    ///
    /// Applicability levels are tried narrowest first so specific
    /// extensions claim a path before general-purpose ones; within a
    /// level, load order decides. The first non-empty tree is interned
    /// and its root registered to the producing extension. `Ok(None)`
    /// means every extension declined, which is not an error.
    pub fn get_doc_tree(&mut self, path: impl AsRef<Path>) -> Result<Option<NodeId>> {
        let path = path.as_ref();
        let resolved =
            std::fs::canonicalize(path).map_err(|_| HostError::NotFound(path.to_path_buf()))?;

        for level in Applicability::ALL {
            for index in 0..self.modules.len() {
                if self.modules[index].extension.applicability() != level {
                    continue;
                }
                let Some(tree) = self.modules[index].extension.doc_tree(&resolved) else {
                    continue;
                };

                let owner = self.modules[index].id;
                let root = self.arena.insert_tree(tree);
                self.roots.insert(root, owner);
                debug!(path = %resolved.display(), ?level, "extension produced a document tree");
                return Ok(Some(root));
            }
        }

        Ok(None)
    }

    /// Content of the document behind `node`.
    pub fn doc(&self, node: NodeId) -> Result<Document> {
        let (module, doc_ref) = self.owner_of(node)?;
        Ok(module.extension.doc(doc_ref))
    }

    /// One-line summary of the document behind `node`. Empty when the
    /// extension does not implement it.
    pub fn brief(&self, node: NodeId) -> Result<String> {
        let (module, doc_ref) = self.owner_of(node)?;
        Ok(module.extension.brief(doc_ref))
    }

    /// Long-form description of the document behind `node`. Empty when
    /// the extension does not implement it.
    pub fn details(&self, node: NodeId) -> Result<String> {
        let (module, doc_ref) = self.owner_of(node)?;
        Ok(module.extension.details(doc_ref))
    }

    /// A named section of the document behind `node`. Empty when the
    /// extension does not implement it.
    pub fn section(&self, node: NodeId, name: &str) -> Result<String> {
        let (module, doc_ref) = self.owner_of(node)?;
        Ok(module.extension.section(doc_ref, name))
    }

    /// Whether `node` still belongs to a registered tree.
    ///
    /// Call this on retained nodes after any unload; a `false` answer
    /// means the node must be discarded.
    pub fn validate(&self, node: NodeId) -> bool {
        self.arena
            .root_of(node)
            .is_some_and(|root| self.roots.contains_key(&root))
    }

    /// Prefix search across every registered tree.
    ///
    /// A node matches when `query` is a literal, case-sensitive prefix
    /// of its title or of any synonym; the empty query matches every
    /// node. Within one tree the matches come back in pre-order; order
    /// across trees is unspecified.
    pub fn search(&self, query: &str) -> Vec<NodeId> {
        let mut matches = Vec::new();
        for &root in self.roots.keys() {
            search::collect_matches(&self.arena, root, query, &mut matches);
        }
        matches
    }

    /// Title of a node.
    pub fn title(&self, node: NodeId) -> Result<&str> {
        let record = self.arena.get(node).ok_or(HostError::InvalidNode)?;
        Ok(&record.title)
    }

    /// Alternate search keys of a node.
    pub fn synonyms(&self, node: NodeId) -> Result<&[String]> {
        let record = self.arena.get(node).ok_or(HostError::InvalidNode)?;
        Ok(&record.synonyms)
    }

    /// Parent of a node; `None` for roots.
    pub fn parent(&self, node: NodeId) -> Result<Option<NodeId>> {
        let record = self.arena.get(node).ok_or(HostError::InvalidNode)?;
        Ok(record.parent)
    }

    /// Children of a node, in display order.
    pub fn children(&self, node: NodeId) -> Result<&[NodeId]> {
        let record = self.arena.get(node).ok_or(HostError::InvalidNode)?;
        Ok(&record.children)
    }

    /// Paths (or built-in names) of everything currently loaded, in
    /// load order.
    pub fn loaded_paths(&self) -> Vec<&Path> {
        self.modules.iter().map(|m| m.path.as_path()).collect()
    }

    /// Number of loaded extensions.
    pub fn extension_count(&self) -> usize {
        self.modules.len()
    }

    /// Number of nodes across all registered trees.
    pub fn node_count(&self) -> usize {
        self.arena.len()
    }

    /// Resolve the extension owning `node` by walking parent links to
    /// the root and consulting the root index.
    fn owner_of(&self, node: NodeId) -> Result<(&LoadedModule, DocRef)> {
        let record = self.arena.get(node).ok_or(HostError::InvalidNode)?;
        let root = self.arena.root_of(node).ok_or(HostError::InvalidNode)?;
        let owner = self.roots.get(&root).ok_or(HostError::InvalidNode)?;
        let module = self
            .modules
            .iter()
            .find(|m| m.id == *owner)
            .ok_or(HostError::InvalidNode)?;
        Ok((module, record.doc_ref))
    }

    fn alloc_extension_id(&mut self) -> ExtensionId {
        self.next_extension += 1;
        ExtensionId(self.next_extension)
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}
