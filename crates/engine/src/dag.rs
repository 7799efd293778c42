//! DAG resolution: run this before executing a graph.
//!
//! Rules enforced:
//! 1. Node IDs must be unique within the graph.
//! 2. Every `dependsOn` entry must name an existing node.
//! 3. The dependency relation must be acyclic (topological sort must succeed).
//!
//! Returns the nodes in topological execution order on success. Ties are
//! broken by declaration order, so the same input always yields the same
//! order.

use std::collections::{HashMap, VecDeque};

use crate::{EngineError, GraphSpec, NodeSpec};

/// Order `nodes` so that every dependency precedes its dependents.
///
/// # Errors
/// - [`EngineError::DuplicateNode`] if two nodes share an ID.
/// - [`EngineError::UnknownDependency`] if a node depends on a missing ID.
/// - [`EngineError::CyclicGraph`] if the graph is not acyclic.
/// - [`EngineError::ResolverFault`] if in-degree bookkeeping goes negative.
pub fn resolve_order(nodes: &[NodeSpec]) -> Result<Vec<&NodeSpec>, EngineError> {
    // -----------------------------------------------------------------------
    // 1. Ensure node IDs are unique
    // -----------------------------------------------------------------------
    let mut position: HashMap<&str, usize> = HashMap::with_capacity(nodes.len());
    for (i, node) in nodes.iter().enumerate() {
        if position.insert(node.id.as_str(), i).is_some() {
            return Err(EngineError::DuplicateNode(node.id.clone()));
        }
    }

    // -----------------------------------------------------------------------
    // 2. Build adjacency list and in-degrees, validating references
    // -----------------------------------------------------------------------
    // dependents[d] lists every node that depends on node d, in declaration
    // order. A dependency listed twice contributes two edges.
    let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); nodes.len()];
    let mut in_degree: Vec<usize> = vec![0; nodes.len()];

    for (i, node) in nodes.iter().enumerate() {
        for dep in &node.depends_on {
            let &d = position.get(dep.as_str()).ok_or_else(|| EngineError::UnknownDependency {
                node_id: node.id.clone(),
                dependency: dep.clone(),
            })?;
            dependents[d].push(i);
            in_degree[i] += 1;
        }
    }

    // -----------------------------------------------------------------------
    // 3. Topological sort (Kahn's algorithm)
    // -----------------------------------------------------------------------
    // Seed the queue with roots in declaration order.
    let mut queue: VecDeque<usize> = (0..nodes.len()).filter(|&i| in_degree[i] == 0).collect();
    let mut sorted: Vec<&NodeSpec> = Vec::with_capacity(nodes.len());

    while let Some(i) = queue.pop_front() {
        sorted.push(&nodes[i]);

        for &dependent in &dependents[i] {
            let deg = &mut in_degree[dependent];
            *deg = deg.checked_sub(1).ok_or_else(|| {
                EngineError::ResolverFault(format!(
                    "in-degree of '{}' dropped below zero after '{}'",
                    nodes[dependent].id, nodes[i].id
                ))
            })?;
            if *deg == 0 {
                queue.push_back(dependent);
            }
        }
    }

    // If we didn't visit every node the graph contains a cycle.
    if sorted.len() != nodes.len() {
        let stuck = nodes
            .iter()
            .zip(&in_degree)
            .filter(|(_, &d)| d > 0)
            .map(|(n, _)| n.id.clone())
            .collect();
        return Err(EngineError::CyclicGraph(stuck));
    }

    Ok(sorted)
}

/// Validate the graph and return node IDs in execution order.
pub fn validate_dag(graph: &GraphSpec) -> Result<Vec<String>, EngineError> {
    Ok(resolve_order(&graph.nodes)?
        .into_iter()
        .map(|n| n.id.clone())
        .collect())
}
