//! `engine` crate: graph models, loading, dependency resolution, input
//! resolution, and the sequential graph runner.

pub mod models;
pub mod error;
pub mod loader;
pub mod dag;
pub mod input;
pub mod executor;

pub use models::{ExecutionRecord, ExecutionState, GraphSpec, NodeSpec};
pub use error::EngineError;
pub use dag::{resolve_order, validate_dag};
pub use input::{input_with, resolve_input, InputPolicy, LastDependency};
pub use executor::{GraphRunner, RunnerConfig};

#[cfg(test)]
mod executor_tests;
