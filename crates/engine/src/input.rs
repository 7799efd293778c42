//! Input resolution: what scalar a node receives, given prior state.
//!
//! Nodes without dependencies always receive `0`. For everything else the
//! runner asks an [`InputPolicy`]; the default [`LastDependency`] forwards the
//! output of the last-declared dependency and ignores the rest.

use std::fmt;

use crate::{EngineError, ExecutionState, NodeSpec};

/// Reduction from a node's upstream outputs to its single input.
pub trait InputPolicy: Send + Sync + fmt::Debug {
    /// Compute the input for `node`. Called only for nodes with at least one
    /// dependency, after every dependency has been recorded in `state`.
    fn resolve(&self, node: &NodeSpec, state: &ExecutionState) -> Result<i32, EngineError>;
}

/// Forward the output of the last entry in `dependsOn`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LastDependency;

impl InputPolicy for LastDependency {
    fn resolve(&self, node: &NodeSpec, state: &ExecutionState) -> Result<i32, EngineError> {
        match node.depends_on.last() {
            None => Ok(0),
            Some(dep) => upstream_output(node, dep, state),
        }
    }
}

/// Wrapping sum of every upstream output, each listed entry counted once per
/// listing.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sum;

impl InputPolicy for Sum {
    fn resolve(&self, node: &NodeSpec, state: &ExecutionState) -> Result<i32, EngineError> {
        node.depends_on.iter().try_fold(0i32, |acc, dep| {
            Ok(acc.wrapping_add(upstream_output(node, dep, state)?))
        })
    }
}

/// Resolve `node`'s input with the default [`LastDependency`] policy.
pub fn resolve_input(node: &NodeSpec, state: &ExecutionState) -> Result<i32, EngineError> {
    input_with(&LastDependency, node, state)
}

/// Resolve `node`'s input with `policy`. Roots receive `0` without
/// consulting the policy.
pub fn input_with(
    policy: &dyn InputPolicy,
    node: &NodeSpec,
    state: &ExecutionState,
) -> Result<i32, EngineError> {
    if node.depends_on.is_empty() {
        return Ok(0);
    }
    policy.resolve(node, state)
}

/// Recorded output of `dep`, or `MissingUpstreamState` if it has not run.
pub fn upstream_output(node: &NodeSpec, dep: &str, state: &ExecutionState) -> Result<i32, EngineError> {
    state
        .get(dep)
        .map(|record| record.output)
        .ok_or_else(|| EngineError::MissingUpstreamState {
            node_id: node.id.clone(),
            dependency: dep.to_owned(),
        })
}
