//! Graph loading: structural decoding only.
//!
//! The loader checks that the document is JSON with a `nodes` array of node
//! objects. Ids and dependencies are not validated here; see [`crate::dag`].

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::{EngineError, GraphSpec, NodeSpec};

/// On-disk shape of a graph document. Unknown top-level fields are ignored.
#[derive(Debug, Deserialize)]
struct GraphDocument {
    nodes: Vec<NodeSpec>,
}

/// Read and decode the graph at `path`.
///
/// Module paths in the result resolve against `path`'s parent directory.
///
/// # Errors
/// - [`EngineError::GraphRead`] if the file cannot be read.
/// - [`EngineError::MalformedGraph`] if it is not a valid graph document.
pub async fn load(path: &Path) -> Result<GraphSpec, EngineError> {
    let bytes = tokio::fs::read(path).await.map_err(|source| EngineError::GraphRead {
        path: path.to_path_buf(),
        source,
    })?;

    let spec = parse_slice(&bytes, path, base_dir_of(path))?;
    debug!(path = %path.display(), nodes = spec.nodes.len(), "graph loaded");
    Ok(spec)
}

/// Decode an in-memory graph document.
///
/// `source` only labels errors; `base_dir` becomes [`GraphSpec::base_dir`].
pub fn parse(text: &str, source: &Path, base_dir: impl Into<PathBuf>) -> Result<GraphSpec, EngineError> {
    parse_slice(text.as_bytes(), source, base_dir)
}

fn parse_slice(bytes: &[u8], source: &Path, base_dir: impl Into<PathBuf>) -> Result<GraphSpec, EngineError> {
    let doc: GraphDocument = serde_json::from_slice(bytes).map_err(|e| EngineError::MalformedGraph {
        path: source.to_path_buf(),
        message: e.to_string(),
    })?;
    Ok(GraphSpec::new(doc.nodes, base_dir))
}

/// Directory containing `path`, or `.` for a bare file name.
fn base_dir_of(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}
