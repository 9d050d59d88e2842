use serde::{Deserialize, Serialize};

/// A position in board millimetres with an orientation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
    /// Rotation in degrees.
    pub r: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64, r: f64) -> Self {
        Self { x, y, r }
    }

    /// Translate by `shift`, read in the point's own rotated frame.
    pub fn shift(&mut self, shift: [f64; 2]) -> &mut Self {
        let [dx, dy] = rotate_vec(shift, self.r);
        self.x += dx;
        self.y += dy;
        self
    }

    /// Copy of this point moved by `offset` in its local frame, with `turn_deg`
    /// added to its rotation. The result's rotation is normalised.
    #[must_use]
    pub fn local(&self, offset: [f64; 2], turn_deg: f64) -> Self {
        let mut p = *self;
        p.shift(offset);
        p.r = normalize_degrees(p.r + turn_deg);
        p
    }
}

/// Rotate `v` counter-clockwise by `angle_deg` in the standard orientation.
#[must_use]
pub fn rotate_vec(v: [f64; 2], angle_deg: f64) -> [f64; 2] {
    let (sin, cos) = angle_deg.to_radians().sin_cos();
    [v[0] * cos - v[1] * sin, v[0] * sin + v[1] * cos]
}

/// Map any finite angle into `[0, 360)`.
///
/// Negative zero and values that round up to a full turn both come back as `0.0`.
#[must_use]
pub fn normalize_degrees(deg: f64) -> f64 {
    let r = deg.rem_euclid(360.0);
    if r >= 360.0 || r == 0.0 {
        0.0
    } else {
        r
    }
}
