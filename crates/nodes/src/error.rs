//! Node-level error type.

use std::path::PathBuf;

use thiserror::Error;

/// Errors returned by a `ModuleExecutor` while loading or invoking one module.
///
/// The engine tags each variant with the id of the node being executed:
/// - `Load`:              the module bytes could not be read, compiled or instantiated.
/// - `MissingEntryPoint`: the module has no invocable `(i32) -> i32` entry export.
/// - `Trap`:              the entry point started but trapped.
#[derive(Debug, Error, Clone)]
pub enum NodeError {
    /// Unreadable file, malformed module, or a module that needs host imports.
    #[error("failed to load module '{}': {message}", path.display())]
    Load { path: PathBuf, message: String },

    /// The export is absent or has the wrong signature.
    #[error("module '{}' does not export an invocable '{entry}(i32) -> i32'", path.display())]
    MissingEntryPoint { path: PathBuf, entry: String },

    /// The guest trapped while running.
    #[error("module '{}' trapped: {message}", path.display())]
    Trap { path: PathBuf, message: String },
}
