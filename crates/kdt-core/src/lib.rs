//! Shared geometry for layout-to-board placement.

pub mod point;

pub use point::{normalize_degrees, rotate_vec, Point};
