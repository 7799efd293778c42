//! The `ModuleExecutor` trait: the contract every sandbox backend must fulfil.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::NodeError;

/// Per-node context passed to the executor.
///
/// Defined here (in the nodes crate) so both the engine and individual
/// executor implementations can import it without a circular dependency.
#[derive(Debug, Clone)]
pub struct ExecutionContext {
    /// ID of the current graph run.
    pub run_id: uuid::Uuid,
    /// ID of the node being executed.
    pub node_id: String,
    /// Directory that relative module paths are resolved against.
    pub base_dir: PathBuf,
}

impl ExecutionContext {
    /// Resolve a node's `modulePath` against [`Self::base_dir`].
    ///
    /// Absolute paths are returned unchanged.
    pub fn resolve_module_path(&self, module_path: &str) -> PathBuf {
        let path = Path::new(module_path);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        }
    }
}

/// The core execution trait.
///
/// Implementations load the module named by `module_path`, invoke its entry
/// point exactly once with `input`, and release every sandbox resource before
/// returning, on success and on failure alike.
#[async_trait]
pub trait ModuleExecutor: Send + Sync {
    /// Run the module at `module_path` (relative to `ctx.base_dir`) with the
    /// given scalar input and return its scalar output.
    async fn execute(
        &self,
        module_path: &str,
        input: i32,
        ctx: &ExecutionContext,
    ) -> Result<i32, NodeError>;
}
