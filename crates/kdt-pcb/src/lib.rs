//! Footprint placement for KDT keyboard layouts.
//!
//! [`compute_placements`] is a pure transform from layout nodes to board
//! coordinates. [`apply_placements`] replays the result against a [`Board`],
//! recording per-footprint failures instead of aborting.

pub mod apply;
pub mod board;
pub mod config;
pub mod transform;

pub use apply::{
    apply_placements, plan_report, FailureReason, Outcome, PlacementReport, PlacementResult,
};
pub use board::{Board, BoardError, BoardFileError, Footprint, MemoryBoard};
pub use config::{ComponentSpec, ConfigError, DesignatorSource, PlacementConfig, Side};
pub use transform::{compute_placements, node_centre, Placement};
