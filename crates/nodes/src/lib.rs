//! `nodes` crate: the `ModuleExecutor` trait and its sandbox backends.
//!
//! Every backend, the Wasmtime one and test doubles alike, implements
//! [`ModuleExecutor`]. The engine crate dispatches execution through this
//! trait object.

pub mod error;
pub mod traits;
pub mod wasm;
pub mod mock;

pub use error::NodeError;
pub use traits::{ExecutionContext, ModuleExecutor};
pub use wasm::{WasmExecutor, WasmExecutorConfig};
