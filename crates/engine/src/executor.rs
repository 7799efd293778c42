//! Graph execution engine.
//!
//! `GraphRunner` is the central orchestrator:
//! 1. Loads the graph document (or takes an already-loaded `GraphSpec`).
//! 2. Resolves a deterministic topological order.
//! 3. Iterates through nodes in order, one at a time, dispatching each via
//!    `ModuleExecutor`.
//! 4. Feeds each node the input chosen by the configured `InputPolicy`.
//! 5. Records an `ExecutionRecord` per node; the first failure aborts the run.

use std::path::Path;
use std::sync::Arc;

use tracing::{debug, error, info, instrument};
use uuid::Uuid;

use nodes::{ExecutionContext, ModuleExecutor};

use crate::dag::resolve_order;
use crate::input::{input_with, InputPolicy, LastDependency};
use crate::{loader, EngineError, ExecutionRecord, ExecutionState, GraphSpec};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Tuning knobs for the runner.
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    /// How a node's input is derived from its upstream outputs.
    pub input_policy: Arc<dyn InputPolicy>,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            input_policy: Arc::new(LastDependency),
        }
    }
}

impl RunnerConfig {
    pub fn with_input_policy(mut self, policy: impl InputPolicy + 'static) -> Self {
        self.input_policy = Arc::new(policy);
        self
    }
}

// ---------------------------------------------------------------------------
// GraphRunner
// ---------------------------------------------------------------------------

/// Stateless orchestrator that runs one graph per call.
///
/// Construct one runner per process and call [`GraphRunner::run`] with the
/// path of a graph document.
pub struct GraphRunner {
    executor: Arc<dyn ModuleExecutor>,
    config: RunnerConfig,
}

impl GraphRunner {
    /// Create a new runner.
    pub fn new(executor: Arc<dyn ModuleExecutor>, config: RunnerConfig) -> Self {
        Self { executor, config }
    }

    /// Create a runner with the default configuration.
    pub fn with_executor(executor: Arc<dyn ModuleExecutor>) -> Self {
        Self::new(executor, RunnerConfig::default())
    }

    /// Load the graph at `graph_path` and run it.
    ///
    /// # Errors
    /// Any loading, resolution or node failure; no state is returned then.
    pub async fn run(&self, graph_path: &Path) -> Result<ExecutionState, EngineError> {
        let graph = loader::load(graph_path).await?;
        self.run_spec(&graph).await
    }

    /// Run an already-loaded graph.
    pub async fn run_spec(&self, graph: &GraphSpec) -> Result<ExecutionState, EngineError> {
        self.run_with_id(graph, Uuid::new_v4()).await
    }

    #[instrument(skip(self, graph), fields(base_dir = %graph.base_dir.display()))]
    async fn run_with_id(&self, graph: &GraphSpec, run_id: Uuid) -> Result<ExecutionState, EngineError> {
        // ------------------------------------------------------------------
        // Resolve the execution order.
        // ------------------------------------------------------------------
        info!("run {} started: {} nodes", run_id, graph.nodes.len());
        let order = resolve_order(&graph.nodes)?;
        debug!(
            "graph resolved, executing {} nodes in order: {:?}",
            order.len(),
            order.iter().map(|n| n.id.as_str()).collect::<Vec<_>>()
        );

        // ------------------------------------------------------------------
        // Execute nodes sequentially.
        // ------------------------------------------------------------------
        let mut state = ExecutionState::new();

        for node in order {
            let input = input_with(self.config.input_policy.as_ref(), node, &state)?;

            let ctx = ExecutionContext {
                run_id,
                node_id: node.id.clone(),
                base_dir: graph.base_dir.clone(),
            };

            debug!("node '{}' executing with input {}", node.id, input);
            let output = match self.executor.execute(&node.module_path, input, &ctx).await {
                Ok(output) => output,
                Err(node_err) => {
                    let err = EngineError::from_node(&node.id, node_err);
                    error!("node '{}' failed: {}", node.id, err);
                    return Err(err);
                }
            };

            state.insert(
                node.id.clone(),
                ExecutionRecord {
                    input,
                    output,
                    dependencies: node.depends_on.clone(),
                },
            )?;

            info!("node '{}' succeeded ({} -> {})", node.id, input, output);
        }

        info!("run {} completed: {} nodes recorded", run_id, state.len());
        Ok(state)
    }
}
