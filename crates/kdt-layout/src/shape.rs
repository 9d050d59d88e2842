use std::fmt;
use std::path::Path;

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::debug;

use crate::node::{is_key_entry, parse_node, LayoutNode};
use crate::LayoutError;

/// Where the nodes array was found in the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeSource {
    /// The document itself is the array.
    Array,
    /// `layout.nodes`, optionally under a top-level `data` object.
    LayoutNodes,
    /// `nodes`, optionally under a top-level `data` object.
    Nodes,
}

impl fmt::Display for NodeSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeSource::Array => write!(f, "array"),
            NodeSource::LayoutNodes => write!(f, "layout.nodes"),
            NodeSource::Nodes => write!(f, "nodes"),
        }
    }
}

/// Locate the nodes array in one of the accepted document shapes.
pub fn find_nodes(doc: &Value) -> Result<(NodeSource, &[Value]), LayoutError> {
    let obj = match doc {
        Value::Array(nodes) => return Ok((NodeSource::Array, nodes.as_slice())),
        Value::Object(obj) => obj,
        other => {
            return Err(LayoutError::NotContainer {
                found: json_type_name(other),
            })
        }
    };

    if let Some(found) = find_in_object(obj) {
        return Ok(found);
    }
    if let Some(Value::Object(data)) = obj.get("data") {
        if let Some(found) = find_in_object(data) {
            return Ok(found);
        }
    }

    Err(LayoutError::UnrecognizedShape {
        keys: obj.keys().cloned().collect(),
    })
}

fn find_in_object(obj: &Map<String, Value>) -> Option<(NodeSource, &[Value])> {
    if let Some(Value::Object(layout)) = obj.get("layout") {
        if let Some(Value::Array(nodes)) = layout.get("nodes") {
            return Some((NodeSource::LayoutNodes, nodes.as_slice()));
        }
    }
    if let Some(Value::Array(nodes)) = obj.get("nodes") {
        return Some((NodeSource::Nodes, nodes.as_slice()));
    }
    None
}

/// Parse every key in `doc`. Non-key entries are skipped and do not take up
/// an index.
pub fn parse_layout_value(doc: &Value) -> Result<Vec<LayoutNode>, LayoutError> {
    let (source, raw) = find_nodes(doc)?;
    let nodes = raw
        .iter()
        .filter(|entry| is_key_entry(entry))
        .enumerate()
        .map(|(i, node)| parse_node(i + 1, node))
        .collect::<Result<Vec<_>, _>>()?;
    if nodes.is_empty() {
        return Err(LayoutError::Empty);
    }
    let skipped = raw.len() - nodes.len();
    debug!(%source, count = nodes.len(), skipped, "parsed layout nodes");
    Ok(nodes)
}

pub fn parse_layout_str(json: &str) -> Result<Vec<LayoutNode>, LayoutError> {
    let doc: Value = serde_json::from_str(json)?;
    parse_layout_value(&doc)
}

pub fn parse_layout_file(path: &Path) -> Result<Vec<LayoutNode>, LayoutError> {
    let raw = std::fs::read_to_string(path).map_err(|source| LayoutError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_layout_str(&raw)
}

/// Structural facts about a layout document, for reporting before a run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayoutSummary {
    pub source: NodeSource,
    pub node_count: usize,
    /// Nodes carrying a non-empty label.
    pub labelled: usize,
}

impl fmt::Display for LayoutSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Valid JSON with {} keys ({} labelled, nodes from {})",
            self.node_count, self.labelled, self.source
        )
    }
}

/// Check that `doc` parses into at least one key without computing placements.
pub fn inspect_layout(doc: &Value) -> Result<LayoutSummary, LayoutError> {
    let (source, _) = find_nodes(doc)?;
    let nodes = parse_layout_value(doc)?;
    Ok(LayoutSummary {
        source,
        node_count: nodes.len(),
        labelled: nodes.iter().filter(|n| n.label.is_some()).count(),
    })
}

fn json_type_name(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
