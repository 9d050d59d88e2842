//! Normalisation of KDT layout exports into flat key records.

mod error;
mod node;
mod shape;

pub use error::LayoutError;
pub use node::{is_key_entry, parse_node, LayoutNode, DEFAULT_NODE_SIZE_PX};
pub use shape::{
    find_nodes, inspect_layout, parse_layout_file, parse_layout_str, parse_layout_value,
    LayoutSummary, NodeSource,
};
