use std::collections::HashSet;

use approx::assert_abs_diff_eq;
use kdt_layout::{parse_layout_str, LayoutNode};
use kdt_pcb::{
    apply_placements, compute_placements, ComponentSpec, FailureReason, Footprint, MemoryBoard,
    Outcome, PlacementConfig, Side,
};
use proptest::prelude::*;
use serde_json::json;

fn config() -> PlacementConfig {
    PlacementConfig {
        associated: vec![
            ComponentSpec::new("Diode", "D{}")
                .with_offset(5.0, 0.0)
                .on_side(Side::Back),
            ComponentSpec::new("LED", "LED{}")
                .with_offset(0.0, -4.7)
                .with_orientation(180.0)
                .on_side(Side::Back),
        ],
        ..PlacementConfig::default()
    }
}

fn keys() -> serde_json::Value {
    json!([
        {"x": 60, "y": 60, "widthU": 1, "heightU": 1, "rotation": 0},
        {"x": 120, "y": 60, "widthU": 1, "heightU": 1, "rotation": 90},
        {"x": 180, "y": 60, "widthU": 2, "heightU": 1, "rotation": -30}
    ])
}

#[test]
fn worked_example_places_switch_and_rotated_diode() {
    let nodes = parse_layout_str(
        r#"[{"x": 60, "y": 60, "widthU": 1, "heightU": 1, "rotation": 90}]"#,
    )
    .unwrap();
    let placements = compute_placements(&nodes, &config()).unwrap();

    let sw = &placements[0];
    assert_eq!(sw.reference, "SW1");
    assert_abs_diff_eq!(sw.x_mm, 19.05, epsilon = 1e-9);
    assert_abs_diff_eq!(sw.y_mm, 19.05, epsilon = 1e-9);

    let d = &placements[1];
    assert_eq!(d.reference, "D1");
    assert_abs_diff_eq!(d.x_mm, 19.05, epsilon = 1e-9);
    assert_abs_diff_eq!(d.y_mm, 24.05, epsilon = 1e-9);
    assert_abs_diff_eq!(d.rotation_deg, 90.0, epsilon = 1e-9);
}

#[test]
fn every_accepted_shape_gives_identical_placements() {
    let docs = [
        keys(),
        json!({"nodes": keys()}),
        json!({"layout": {"nodes": keys()}}),
        json!({"data": {"layout": {"nodes": keys()}}}),
        json!({"data": {"nodes": keys()}}),
    ];
    let results: Vec<_> = docs
        .iter()
        .map(|doc| {
            let nodes = parse_layout_str(&doc.to_string()).unwrap();
            compute_placements(&nodes, &config()).unwrap()
        })
        .collect();
    for other in &results[1..] {
        assert_eq!(&results[0], other);
    }
}

#[test]
fn designators_are_index_based_and_distinct() {
    let nodes = parse_layout_str(&keys().to_string()).unwrap();
    let placements = compute_placements(&nodes, &config()).unwrap();
    let refs: Vec<_> = placements.iter().map(|p| p.reference.as_str()).collect();
    assert_eq!(
        refs,
        ["SW1", "D1", "LED1", "SW2", "D2", "LED2", "SW3", "D3", "LED3"]
    );
    let unique: HashSet<_> = refs.iter().collect();
    assert_eq!(unique.len(), refs.len());
}

#[test]
fn failures_do_not_shrink_the_report() {
    let nodes = parse_layout_str(&keys().to_string()).unwrap();
    let placements = compute_placements(&nodes, &config()).unwrap();

    // Only switches and one locked diode exist on this board.
    let mut board = MemoryBoard::with_footprints([
        Footprint::new("SW1"),
        Footprint::new("SW2"),
        Footprint::new("SW3"),
        Footprint::new("D2").locked(),
    ])
    .unwrap();
    let report = apply_placements(&mut board, &placements, nodes.len());

    assert_eq!(report.results.len(), nodes.len() * 3);
    assert_eq!(report.placed().count(), 3);
    assert_eq!(report.missing().count(), 5);
    assert_eq!(report.errors().count(), 1);
    assert_eq!(
        report.results[4].outcome,
        Outcome::Failed {
            reason: FailureReason::Rejected("footprint is locked".into())
        }
    );

    let sw2 = board.get("SW2").unwrap();
    assert_abs_diff_eq!(sw2.x, 38.1, epsilon = 1e-9);
    assert_abs_diff_eq!(sw2.rotation, 90.0, epsilon = 1e-9);
}

#[test]
fn applied_board_matches_plan() {
    let nodes = parse_layout_str(&keys().to_string()).unwrap();
    let placements = compute_placements(&nodes, &config()).unwrap();
    let mut board = MemoryBoard::with_footprints(
        placements.iter().map(|p| Footprint::new(p.reference.clone())),
    )
    .unwrap();
    let report = apply_placements(&mut board, &placements, nodes.len());
    assert!(!report.has_failures());

    for p in &placements {
        let fp = board.get(&p.reference).unwrap();
        assert_eq!((fp.x, fp.y, fp.rotation, fp.side), (p.x_mm, p.y_mm, p.rotation_deg, p.side));
    }
    // Every diode and LED started on the front.
    assert_eq!(board.flips(), 6);
}

#[test]
fn placed_board_survives_a_file_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("board.json");
    std::fs::write(
        &path,
        r#"{"footprints": [
            {"reference": "SW1", "footprint": "MX_1U"},
            {"reference": "D1", "footprint": "SOD-123"}
        ]}"#,
    )
    .unwrap();

    let nodes = parse_layout_str(r#"[{"x": 60, "y": 60, "widthU": 1, "heightU": 1}]"#).unwrap();
    let config = PlacementConfig::default();
    let placements = compute_placements(&nodes, &config).unwrap();

    let mut board = MemoryBoard::load(&path).unwrap();
    let report = apply_placements(&mut board, &placements, nodes.len());
    assert!(!report.has_failures());
    board.save(&path).unwrap();

    let reloaded = MemoryBoard::load(&path).unwrap();
    let d1 = reloaded.get("D1").unwrap();
    assert_abs_diff_eq!(d1.x, 19.05, epsilon = 1e-9);
    assert_abs_diff_eq!(d1.y, 24.05, epsilon = 1e-9);
    assert_eq!(d1.side, Side::Back);
    assert_eq!(d1.extra["footprint"], "SOD-123");
    assert_eq!(reloaded.get("SW1").unwrap().extra["footprint"], "MX_1U");
}

fn single(rotation: f64) -> Vec<LayoutNode> {
    vec![LayoutNode {
        index: 1,
        label: None,
        x: 300.0,
        y: -120.0,
        width_u: 1.0,
        height_u: 1.0,
        rotation,
    }]
}

proptest! {
    #[test]
    fn offsets_rotate_about_the_key_centre(
        theta in -360.0f64..360.0,
        dx in -10.0f64..10.0,
        dy in -10.0f64..10.0,
    ) {
        let config = PlacementConfig {
            associated: vec![ComponentSpec::new("Diode", "D{}").with_offset(dx, dy)],
            ..PlacementConfig::default()
        };
        let p = compute_placements(&single(theta), &config).unwrap();
        let offset = [p[1].x_mm - p[0].x_mm, p[1].y_mm - p[0].y_mm];

        // Undo the node rotation and compare with the configured offset.
        let back = kdt_core::rotate_vec(offset, -theta);
        prop_assert!((back[0] - dx).abs() < 1e-6);
        prop_assert!((back[1] - dy).abs() < 1e-6);
        prop_assert!((0.0..360.0).contains(&p[1].rotation_deg));
    }

    #[test]
    fn switch_position_ignores_rotation(theta in -720.0f64..720.0) {
        let p = compute_placements(&single(theta), &config()).unwrap();
        prop_assert!((p[0].x_mm - 95.25).abs() < 1e-9);
        prop_assert!((p[0].y_mm + 38.1).abs() < 1e-9);
    }
}
