//! Core domain models for the graph engine.
//!
//! `NodeSpec`/`GraphSpec` are the source of truth for what a graph looks
//! like in memory and deserialise straight from the graph JSON document.
//! `ExecutionRecord`/`ExecutionState` are what a run produces.

use std::collections::HashMap;
use std::path::PathBuf;

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

use crate::EngineError;

// ---------------------------------------------------------------------------
// NodeSpec
// ---------------------------------------------------------------------------

/// A single compute unit in the graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeSpec {
    /// Unique identifier within this graph (referenced by `depends_on`).
    pub id: String,
    /// Module location, relative to the graph file's directory.
    pub module_path: String,
    /// Upstream node ids. Order matters: the last entry feeds the input.
    #[serde(default)]
    pub depends_on: Vec<String>,
}

impl NodeSpec {
    /// Convenience constructor for testing.
    pub fn new(id: impl Into<String>, module_path: impl Into<String>, depends_on: &[&str]) -> Self {
        Self {
            id: id.into(),
            module_path: module_path.into(),
            depends_on: depends_on.iter().map(|d| (*d).to_owned()).collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// GraphSpec
// ---------------------------------------------------------------------------

/// A complete graph definition, in declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphSpec {
    pub nodes: Vec<NodeSpec>,
    /// Root for resolving `module_path`; the graph file's directory.
    pub base_dir: PathBuf,
}

impl GraphSpec {
    pub fn new(nodes: Vec<NodeSpec>, base_dir: impl Into<PathBuf>) -> Self {
        Self {
            nodes,
            base_dir: base_dir.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// ExecutionRecord
// ---------------------------------------------------------------------------

/// The result of running one node. Never updated after insertion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExecutionRecord {
    pub input: i32,
    pub output: i32,
    /// Snapshot of the node's declared dependencies at execution time.
    pub dependencies: Vec<String>,
}

// ---------------------------------------------------------------------------
// ExecutionState
// ---------------------------------------------------------------------------

/// Node id → record, iterated in insertion (execution) order.
///
/// Append-only: a key can be inserted once and records cannot be mutated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecutionState {
    entries: Vec<(String, ExecutionRecord)>,
    index: HashMap<String, usize>,
}

impl ExecutionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append the record for `node_id`.
    ///
    /// # Errors
    /// [`EngineError::DuplicateRecord`] if `node_id` already has a record.
    pub fn insert(&mut self, node_id: impl Into<String>, record: ExecutionRecord) -> Result<(), EngineError> {
        let node_id = node_id.into();
        if self.index.contains_key(&node_id) {
            return Err(EngineError::DuplicateRecord(node_id));
        }
        self.index.insert(node_id.clone(), self.entries.len());
        self.entries.push((node_id, record));
        Ok(())
    }

    pub fn get(&self, node_id: &str) -> Option<&ExecutionRecord> {
        self.index.get(node_id).map(|&i| &self.entries[i].1)
    }

    pub fn contains(&self, node_id: &str) -> bool {
        self.index.contains_key(node_id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Records in execution order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ExecutionRecord)> {
        self.entries.iter().map(|(id, rec)| (id.as_str(), rec))
    }

    /// Node ids in execution order.
    pub fn node_ids(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(id, _)| id.as_str())
    }
}

impl Serialize for ExecutionState {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (id, record) in &self.entries {
            map.serialize_entry(id, record)?;
        }
        map.end()
    }
}
