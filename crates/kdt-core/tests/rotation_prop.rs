use kdt_core::{normalize_degrees, rotate_vec, Point};
use proptest::prelude::*;

fn close(a: [f64; 2], b: [f64; 2]) -> bool {
    let eps = 1e-6;
    (a[0] - b[0]).abs() < eps && (a[1] - b[1]).abs() < eps
}

proptest! {
    #[test]
    fn rotating_back_restores_offset(
        x in -50.0f64..50.0,
        y in -50.0f64..50.0,
        theta in -720.0f64..720.0,
    ) {
        let there = rotate_vec([x, y], theta);
        let back = rotate_vec(there, -theta);
        prop_assert!(close(back, [x, y]));
    }

    #[test]
    fn local_offset_keeps_its_distance_from_the_centre(
        cx in -100.0f64..100.0,
        cy in -100.0f64..100.0,
        dx in -20.0f64..20.0,
        dy in -20.0f64..20.0,
        theta in 0.0f64..360.0,
    ) {
        let centre = Point::new(cx, cy, theta);
        let p = centre.local([dx, dy], 0.0);
        let after = ((p.x - cx).powi(2) + (p.y - cy).powi(2)).sqrt();
        prop_assert!((dx.hypot(dy) - after).abs() < 1e-6);
    }

    #[test]
    fn local_with_zero_rotation_is_plain_translation(
        cx in -200.0f64..200.0,
        cy in -200.0f64..200.0,
        dx in -20.0f64..20.0,
        dy in -20.0f64..20.0,
    ) {
        let p = Point::new(cx, cy, 0.0).local([dx, dy], 0.0);
        prop_assert!(close([p.x, p.y], [cx + dx, cy + dy]));
    }

    #[test]
    fn normalized_angle_is_in_range(deg in -10_000.0f64..10_000.0) {
        let r = normalize_degrees(deg);
        prop_assert!((0.0..360.0).contains(&r));
    }
}
