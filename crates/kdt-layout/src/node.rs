use serde::Serialize;
use serde_json::{Map, Value};

use crate::LayoutError;

/// Pixel size assumed for ReactFlow nodes that omit `width`/`height`.
pub const DEFAULT_NODE_SIZE_PX: f64 = 60.0;

/// One keyboard key taken from the layout export.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayoutNode {
    /// 1-based position in the normalised node list.
    pub index: usize,
    pub label: Option<String>,
    /// Centre in pixels.
    pub x: f64,
    pub y: f64,
    pub width_u: f64,
    pub height_u: f64,
    /// Degrees, 0 when the export has none.
    pub rotation: f64,
}

/// Parse a single node entry. `index` is 1-based and only used for the
/// returned record and error messages.
///
/// Two entry forms are accepted:
/// - flat: `x`/`y` are the key centre, `widthU`/`heightU` are required;
/// - ReactFlow: `position` is the top-left corner, `width`/`height` are the
///   rendered pixel size and key properties live under a required `data`.
pub fn parse_node(index: usize, node: &Value) -> Result<LayoutNode, LayoutError> {
    let Value::Object(obj) = node else {
        return Err(LayoutError::NodeNotObject { index });
    };

    if obj.contains_key("position") {
        parse_reactflow_node(index, obj)
    } else {
        parse_flat_node(index, obj)
    }
}

fn parse_flat_node(index: usize, obj: &Map<String, Value>) -> Result<LayoutNode, LayoutError> {
    Ok(LayoutNode {
        index,
        label: label(obj.get("label")),
        x: required(index, obj, "x")?,
        y: required(index, obj, "y")?,
        width_u: required(index, obj, "widthU")?,
        height_u: required(index, obj, "heightU")?,
        rotation: optional(index, obj, "rotation")?.unwrap_or(0.0),
    })
}

fn parse_reactflow_node(
    index: usize,
    obj: &Map<String, Value>,
) -> Result<LayoutNode, LayoutError> {
    let Some(Value::Object(position)) = obj.get("position") else {
        return Err(LayoutError::MissingField {
            index,
            field: "position",
        });
    };
    let left = required(index, position, "x")?;
    let top = required(index, position, "y")?;
    let width_px = optional(index, obj, "width")?.unwrap_or(DEFAULT_NODE_SIZE_PX);
    let height_px = optional(index, obj, "height")?.unwrap_or(DEFAULT_NODE_SIZE_PX);

    let Some(Value::Object(data)) = obj.get("data") else {
        return Err(LayoutError::MissingField {
            index,
            field: "data",
        });
    };

    Ok(LayoutNode {
        index,
        label: label(data.get("label")),
        x: left + width_px / 2.0,
        y: top + height_px / 2.0,
        width_u: optional(index, data, "widthU")?.unwrap_or(1.0),
        height_u: optional(index, data, "heightU")?.unwrap_or(1.0),
        rotation: optional(index, data, "rotation")?.unwrap_or(0.0),
    })
}

/// Whether `entry` describes a key. ReactFlow groups and annotations carry a
/// `position` but no `data` object and are not keys.
pub fn is_key_entry(entry: &Value) -> bool {
    match entry {
        Value::Object(obj) if obj.contains_key("position") => {
            matches!(obj.get("data"), Some(Value::Object(_)))
        }
        _ => true,
    }
}

fn required(
    index: usize,
    obj: &Map<String, Value>,
    field: &'static str,
) -> Result<f64, LayoutError> {
    optional(index, obj, field)?.ok_or(LayoutError::MissingField { index, field })
}

fn optional(
    index: usize,
    obj: &Map<String, Value>,
    field: &'static str,
) -> Result<Option<f64>, LayoutError> {
    match obj.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(v) => value_f64(v)
            .map(Some)
            .ok_or(LayoutError::NotANumber { index, field }),
    }
}

fn value_f64(v: &Value) -> Option<f64> {
    let n = match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    n.is_finite().then_some(n)
}

fn label(v: Option<&Value>) -> Option<String> {
    match v {
        Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    }
}
