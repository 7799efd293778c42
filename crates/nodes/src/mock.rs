//! `MockExecutor`: a test double for `ModuleExecutor`.
//!
//! Useful in unit and integration tests where compiling a real module is
//! either unavailable or irrelevant. Behaviours are registered per
//! `modulePath`, exactly as they appear in the graph document.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::{traits::ExecutionContext, ModuleExecutor, NodeError};

/// Behaviour injected into a mocked module at registration time.
#[derive(Clone)]
pub enum MockBehaviour {
    /// Compute the output from the input.
    Compute(Arc<dyn Fn(i32) -> i32 + Send + Sync>),
    /// Fail as if the module file were unreadable or malformed.
    FailLoad(String),
    /// Fail as if the module had no entry point.
    MissingEntryPoint,
    /// Fail as if the guest trapped.
    Trap(String),
}

/// One recorded invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockCall {
    pub run_id: uuid::Uuid,
    pub node_id: String,
    pub module_path: String,
    pub input: i32,
}

/// A mock executor that records every call it receives and returns a
/// programmer-specified result per module path.
///
/// Unregistered paths fail with [`NodeError::Load`], mirroring a missing file.
#[derive(Default)]
pub struct MockExecutor {
    behaviours: HashMap<String, MockBehaviour>,
    /// All calls seen by this executor (in call order).
    pub calls: Arc<Mutex<Vec<MockCall>>>,
}

impl MockExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a module that computes its output with `f`.
    pub fn computing(
        mut self,
        module_path: impl Into<String>,
        f: impl Fn(i32) -> i32 + Send + Sync + 'static,
    ) -> Self {
        self.behaviours
            .insert(module_path.into(), MockBehaviour::Compute(Arc::new(f)));
        self
    }

    /// Register a module that ignores its input and returns `value`.
    pub fn returning(self, module_path: impl Into<String>, value: i32) -> Self {
        self.computing(module_path, move |_| value)
    }

    /// Register a module with an arbitrary behaviour.
    pub fn with_behaviour(mut self, module_path: impl Into<String>, behaviour: MockBehaviour) -> Self {
        self.behaviours.insert(module_path.into(), behaviour);
        self
    }

    /// Number of invocations so far.
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Node ids in the order they were executed.
    pub fn executed_nodes(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|c| c.node_id.clone())
            .collect()
    }

    /// Distinct run ids seen, in first-seen order.
    pub fn run_ids(&self) -> Vec<uuid::Uuid> {
        let mut ids = Vec::new();
        for call in self.calls.lock().unwrap().iter() {
            if !ids.contains(&call.run_id) {
                ids.push(call.run_id);
            }
        }
        ids
    }

    /// Inputs received by `node_id`.
    pub fn inputs_for(&self, node_id: &str) -> Vec<i32> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.node_id == node_id)
            .map(|c| c.input)
            .collect()
    }
}

#[async_trait]
impl ModuleExecutor for MockExecutor {
    async fn execute(
        &self,
        module_path: &str,
        input: i32,
        ctx: &ExecutionContext,
    ) -> Result<i32, NodeError> {
        self.calls.lock().unwrap().push(MockCall {
            run_id: ctx.run_id,
            node_id: ctx.node_id.clone(),
            module_path: module_path.to_owned(),
            input,
        });

        let path: PathBuf = ctx.resolve_module_path(module_path);
        match self.behaviours.get(module_path) {
            Some(MockBehaviour::Compute(f)) => Ok(f(input)),
            Some(MockBehaviour::FailLoad(msg)) => Err(NodeError::Load {
                path,
                message: msg.clone(),
            }),
            Some(MockBehaviour::MissingEntryPoint) => Err(NodeError::MissingEntryPoint {
                path,
                entry: crate::wasm::DEFAULT_ENTRY_POINT.to_owned(),
            }),
            Some(MockBehaviour::Trap(msg)) => Err(NodeError::Trap {
                path,
                message: msg.clone(),
            }),
            None => Err(NodeError::Load {
                path,
                message: "no such file".into(),
            }),
        }
    }
}
