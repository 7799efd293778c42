//! `WasmExecutor`: runs a node's WebAssembly module with Wasmtime.
//!
//! Module contract:
//!
//! ```text
//! (export "main" (func (param i32) (result i32)))
//! ```
//!
//! Modules are instantiated with no imports. Every call gets a fresh
//! `Store` and `Instance`; both are dropped before `execute` returns, so no
//! guest state survives from one node to the next.

use std::path::Path;

use async_trait::async_trait;
use tracing::debug;
use wasmtime::{Engine, Instance, Module, Store, TypedFunc};

use crate::{traits::ExecutionContext, ModuleExecutor, NodeError};

/// Name of the export invoked when no other entry point is configured.
pub const DEFAULT_ENTRY_POINT: &str = "main";

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Tuning knobs for the executor.
#[derive(Debug, Clone)]
pub struct WasmExecutorConfig {
    /// Exported function called with the node's input.
    pub entry_point: String,
}

impl Default for WasmExecutorConfig {
    fn default() -> Self {
        Self {
            entry_point: DEFAULT_ENTRY_POINT.to_owned(),
        }
    }
}

impl WasmExecutorConfig {
    /// Call `entry_point` instead of `main`.
    pub fn with_entry_point(mut self, entry_point: impl Into<String>) -> Self {
        self.entry_point = entry_point.into();
        self
    }
}

// ---------------------------------------------------------------------------
// WasmExecutor
// ---------------------------------------------------------------------------

/// Wasmtime-backed [`ModuleExecutor`].
///
/// The `Engine` is shared by every call; modules, stores and instances are
/// created per call.
pub struct WasmExecutor {
    engine: Engine,
    config: WasmExecutorConfig,
}

impl WasmExecutor {
    /// Create a new executor.
    pub fn new(config: WasmExecutorConfig) -> Self {
        Self {
            engine: Engine::default(),
            config,
        }
    }

    /// Create an executor that calls `main`.
    pub fn with_defaults() -> Self {
        Self::new(WasmExecutorConfig::default())
    }

    /// Get the executor configuration.
    pub fn config(&self) -> &WasmExecutorConfig {
        &self.config
    }

    /// Compile module bytes (binary or text format).
    fn compile(&self, path: &Path, bytes: &[u8]) -> Result<Module, NodeError> {
        let module = Module::new(&self.engine, bytes).map_err(|e| NodeError::Load {
            path: path.to_path_buf(),
            message: format!("invalid module: {e}"),
        })?;

        let imports = module.imports().len();
        if imports > 0 {
            return Err(NodeError::Load {
                path: path.to_path_buf(),
                message: format!(
                    "module requires {imports} host import(s); compute units must be self-contained"
                ),
            });
        }

        Ok(module)
    }

    /// Instantiate `module` in a throwaway store and call the entry point once.
    fn invoke(&self, path: &Path, module: &Module, input: i32) -> Result<i32, NodeError> {
        let mut store = Store::new(&self.engine, ());

        let instance = Instance::new(&mut store, module, &[]).map_err(|e| NodeError::Load {
            path: path.to_path_buf(),
            message: format!("failed to instantiate module: {e}"),
        })?;

        let entry: TypedFunc<i32, i32> = instance
            .get_typed_func(&mut store, &self.config.entry_point)
            .map_err(|_| NodeError::MissingEntryPoint {
                path: path.to_path_buf(),
                entry: self.config.entry_point.clone(),
            })?;

        entry.call(&mut store, input).map_err(|e| NodeError::Trap {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }
}

#[async_trait]
impl ModuleExecutor for WasmExecutor {
    async fn execute(
        &self,
        module_path: &str,
        input: i32,
        ctx: &ExecutionContext,
    ) -> Result<i32, NodeError> {
        let path = ctx.resolve_module_path(module_path);
        debug!(run_id = %ctx.run_id, node_id = %ctx.node_id, path = %path.display(), "loading module");

        let bytes = tokio::fs::read(&path).await.map_err(|e| NodeError::Load {
            path: path.clone(),
            message: e.to_string(),
        })?;

        let module = self.compile(&path, &bytes)?;
        let output = self.invoke(&path, &module, input)?;

        debug!(run_id = %ctx.run_id, node_id = %ctx.node_id, input, output, "module returned");
        Ok(output)
    }
}
