use kdt_core::Point;
use kdt_layout::LayoutNode;
use serde::Serialize;
use tracing::{debug, warn};

use crate::config::{ConfigError, DesignatorSource, PlacementConfig, Side};

/// One planned footprint move, in board millimetres.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Placement {
    /// 1-based index of the layout node this placement belongs to.
    pub node: usize,
    pub component: String,
    pub reference: String,
    pub x_mm: f64,
    pub y_mm: f64,
    /// Degrees in `[0, 360)`.
    pub rotation_deg: f64,
    pub side: Side,
}

impl Placement {
    #[must_use]
    pub fn position(&self) -> [f64; 2] {
        [self.x_mm, self.y_mm]
    }
}

/// Key centre in board millimetres, carrying the node's effective rotation.
#[must_use]
pub fn node_centre(node: &LayoutNode, config: &PlacementConfig) -> Point {
    let x = node.x / config.ref_unit_px * config.step_x_mm + config.offset_x_mm;
    let y = node.y / config.ref_unit_px * config.step_y_mm + config.offset_y_mm;
    let r = if config.invert_rotation {
        -node.rotation
    } else {
        node.rotation
    };
    Point::new(x, y, r)
}

/// Compute every placement for `nodes`: the switch first, then each enabled
/// associated component, node by node.
///
/// The rotation pivot is always the node centre; key size does not move it.
pub fn compute_placements(
    nodes: &[LayoutNode],
    config: &PlacementConfig,
) -> Result<Vec<Placement>, ConfigError> {
    config.validate()?;

    let mut placements = Vec::with_capacity(nodes.len() * (1 + config.associated.len()));
    for node in nodes {
        let centre = node_centre(node, config);
        let key = designator_key(node, config.designator);
        for component in config.components() {
            let at = centre.local(component.offset(), component.orientation_deg);
            let placement = Placement {
                node: node.index,
                component: component.name.clone(),
                reference: component.reference(&key),
                x_mm: at.x,
                y_mm: at.y,
                rotation_deg: at.r,
                side: component.side,
            };
            debug!(
                reference = %placement.reference,
                x = placement.x_mm,
                y = placement.y_mm,
                r = placement.rotation_deg,
                "planned placement"
            );
            placements.push(placement);
        }
    }
    Ok(placements)
}

fn designator_key(node: &LayoutNode, source: DesignatorSource) -> String {
    match (source, &node.label) {
        (DesignatorSource::Label, Some(label)) => label.clone(),
        (DesignatorSource::Label, None) => {
            warn!(node = node.index, "node has no label, designating it by index");
            node.index.to_string()
        }
        (DesignatorSource::Index, _) => node.index.to_string(),
    }
}
