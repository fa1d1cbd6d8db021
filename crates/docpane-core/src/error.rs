//! Error taxonomy for the extension host.

use std::path::PathBuf;

use thiserror::Error;

/// Errors surfaced by the extension host.
///
/// Every variant is recoverable: a failed load leaves the registry
/// exactly as it was, and a stale node reference only fails the call
/// that used it.
#[derive(Debug, Error)]
pub enum HostError {
    /// The input path or its resolved symlink target does not exist or
    /// is not a regular file.
    #[error("extension path not found or not a file: {0}")]
    NotFound(PathBuf),

    /// The OS loader could not open the shared object.
    #[error("failed to load extension library: {0}")]
    LoadFailed(#[from] libloading::Error),

    /// The module loaded but exposes neither extension entry point, or
    /// its function table is missing required pointers.
    #[error("not a valid extension: {0}")]
    InvalidExtension(String),

    /// The node does not resolve to any currently registered tree,
    /// either because it never existed or because its extension was
    /// unloaded.
    #[error("node does not belong to any registered document tree")]
    InvalidNode,
}

/// Result type for host operations.
pub type Result<T> = std::result::Result<T, HostError>;
