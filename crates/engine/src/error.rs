//! Engine-level error types.

use std::path::PathBuf;

use thiserror::Error;

/// Errors produced by the graph engine (loading, resolution, execution).
///
/// Every variant is fatal to the run.
#[derive(Debug, Error)]
pub enum EngineError {
    // ------ Loading errors ------

    /// The graph file could not be read.
    #[error("cannot read graph '{}': {source}", path.display())]
    GraphRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The document is not valid JSON or has no `nodes` array.
    #[error("malformed graph '{}': {message}", path.display())]
    MalformedGraph { path: PathBuf, message: String },

    // ------ Resolution errors ------

    /// Two or more nodes share the same ID.
    #[error("duplicate node ID: '{0}'")]
    DuplicateNode(String),

    /// A `dependsOn` entry names a node that doesn't exist in the graph.
    #[error("node '{node_id}' depends on unknown node '{dependency}'")]
    UnknownDependency { node_id: String, dependency: String },

    /// Topological sort could not order these nodes.
    #[error("dependency graph contains a cycle involving: {}", .0.join(", "))]
    CyclicGraph(Vec<String>),

    /// Internal: the resolver's in-degree bookkeeping went negative.
    #[error("resolver fault: {0}")]
    ResolverFault(String),

    // ------ Execution errors ------

    /// Internal: a node ran before its last-declared dependency was recorded.
    #[error("node '{node_id}' has no recorded state for upstream '{dependency}'")]
    MissingUpstreamState { node_id: String, dependency: String },

    /// Internal: a node was recorded twice.
    #[error("node '{0}' already has an execution record")]
    DuplicateRecord(String),

    /// The node's module could not be read, compiled or instantiated.
    #[error("node '{node_id}': failed to load module '{}': {message}", path.display())]
    ModuleLoadFailure {
        node_id: String,
        path: PathBuf,
        message: String,
    },

    /// The node's module has no invocable entry point.
    #[error("node '{node_id}': module '{}' does not export '{entry}(i32) -> i32'", path.display())]
    MissingEntryPoint {
        node_id: String,
        path: PathBuf,
        entry: String,
    },

    /// The node's module trapped during invocation.
    #[error("node '{node_id}': module trapped: {message}")]
    ModuleTrap { node_id: String, message: String },
}

impl EngineError {
    /// Tag a [`nodes::NodeError`] with the node that produced it.
    pub fn from_node(node_id: &str, err: nodes::NodeError) -> Self {
        let node_id = node_id.to_owned();
        match err {
            nodes::NodeError::Load { path, message } => Self::ModuleLoadFailure { node_id, path, message },
            nodes::NodeError::MissingEntryPoint { path, entry } => {
                Self::MissingEntryPoint { node_id, path, entry }
            }
            nodes::NodeError::Trap { message, .. } => Self::ModuleTrap { node_id, message },
        }
    }

    /// `true` for invariant violations that well-formed input cannot trigger.
    pub fn is_internal(&self) -> bool {
        matches!(
            self,
            Self::ResolverFault(_) | Self::MissingUpstreamState { .. } | Self::DuplicateRecord(_)
        )
    }
}
