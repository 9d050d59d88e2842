use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LayoutError {
    #[error("could not read layout {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("expected JSON object or array, got {found}")]
    NotContainer { found: &'static str },

    #[error(
        "could not find nodes array in JSON. Tried: 'layout.nodes', 'nodes'. \
         Available top-level keys: [{}]",
        keys.join(", ")
    )]
    UnrecognizedShape { keys: Vec<String> },

    #[error("no nodes found in layout")]
    Empty,

    #[error("node {index} is not a JSON object")]
    NodeNotObject { index: usize },

    #[error("node {index} is missing required field \"{field}\"")]
    MissingField { index: usize, field: &'static str },

    #[error("node {index} field \"{field}\" must be a number")]
    NotANumber { index: usize, field: &'static str },
}
