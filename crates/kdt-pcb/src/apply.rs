use std::collections::HashSet;
use std::fmt;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::board::{Board, BoardError};
use crate::transform::Placement;

const MAX_LISTED_MISSING: usize = 10;
const MAX_LISTED_ERRORS: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "message", rename_all = "snake_case")]
pub enum FailureReason {
    /// No footprint with this reference on the board.
    Missing,
    /// The reference was already placed earlier in the same run.
    Duplicate,
    /// The host refused one of the operations.
    Rejected(String),
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureReason::Missing => write!(f, "footprint not found on board"),
            FailureReason::Duplicate => write!(f, "reference already placed in this run"),
            FailureReason::Rejected(message) => write!(f, "{message}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    /// Computed but not applied to any board.
    Planned,
    Placed,
    Failed { reason: FailureReason },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlacementResult {
    #[serde(flatten)]
    pub placement: Placement,
    #[serde(flatten)]
    pub outcome: Outcome,
}

impl PlacementResult {
    #[must_use]
    pub fn success(&self) -> bool {
        !matches!(self.outcome, Outcome::Failed { .. })
    }

    #[must_use]
    pub fn reason(&self) -> Option<&FailureReason> {
        match &self.outcome {
            Outcome::Failed { reason } => Some(reason),
            _ => None,
        }
    }

    #[must_use]
    pub fn message(&self) -> String {
        let p = &self.placement;
        match &self.outcome {
            Outcome::Planned | Outcome::Placed => format!(
                "{} at ({:.2}, {:.2}) mm, {}°, {}",
                p.reference, p.x_mm, p.y_mm, p.rotation_deg, p.side
            ),
            Outcome::Failed {
                reason: FailureReason::Missing,
            } => format!("Footprint not found: {}", p.reference),
            Outcome::Failed { reason } => format!("Error placing {}: {reason}", p.reference),
        }
    }
}

/// Every result of one run, in placement order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlacementReport {
    pub total_keys: usize,
    pub results: Vec<PlacementResult>,
}

impl PlacementReport {
    pub fn placed(&self) -> impl Iterator<Item = &PlacementResult> {
        self.results
            .iter()
            .filter(|r| matches!(r.outcome, Outcome::Placed))
    }

    pub fn planned(&self) -> impl Iterator<Item = &PlacementResult> {
        self.results
            .iter()
            .filter(|r| matches!(r.outcome, Outcome::Planned))
    }

    pub fn missing(&self) -> impl Iterator<Item = &PlacementResult> {
        self.results
            .iter()
            .filter(|r| r.reason() == Some(&FailureReason::Missing))
    }

    /// Failures other than missing footprints.
    pub fn errors(&self) -> impl Iterator<Item = &PlacementResult> {
        self.results
            .iter()
            .filter(|r| matches!(r.reason(), Some(reason) if *reason != FailureReason::Missing))
    }

    #[must_use]
    pub fn has_failures(&self) -> bool {
        self.results.iter().any(|r| !r.success())
    }
}

impl fmt::Display for PlacementReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let missing: Vec<_> = self.missing().collect();
        let errors: Vec<_> = self.errors().collect();
        let planned = self.planned().count();

        writeln!(f, "Placement complete for {} keys.", self.total_keys)?;
        writeln!(f)?;
        if planned > 0 {
            writeln!(f, "Planned (not applied): {planned}")?;
        }
        writeln!(f, "Successfully placed: {}", self.placed().count())?;
        writeln!(f, "Missing footprints: {}", missing.len())?;
        write!(f, "Errors: {}", errors.len())?;

        if !missing.is_empty() {
            write!(f, "\n\nMissing footprints:")?;
            for r in missing.iter().take(MAX_LISTED_MISSING) {
                write!(f, "\n  - {}", r.placement.reference)?;
            }
            if missing.len() > MAX_LISTED_MISSING {
                write!(f, "\n  ... and {} more", missing.len() - MAX_LISTED_MISSING)?;
            }
        }
        if !errors.is_empty() {
            write!(f, "\n\nErrors:")?;
            for r in errors.iter().take(MAX_LISTED_ERRORS) {
                write!(f, "\n  - {}", r.message())?;
            }
            if errors.len() > MAX_LISTED_ERRORS {
                write!(f, "\n  ... and {} more", errors.len() - MAX_LISTED_ERRORS)?;
            }
        }
        Ok(())
    }
}

/// Report for placements that were computed but not applied.
#[must_use]
pub fn plan_report(placements: &[Placement], total_keys: usize) -> PlacementReport {
    PlacementReport {
        total_keys,
        results: placements
            .iter()
            .map(|p| PlacementResult {
                placement: p.clone(),
                outcome: Outcome::Planned,
            })
            .collect(),
    }
}

/// Apply `placements` to `board` in order.
///
/// A failure is recorded for its footprint and the run carries on, so the
/// report always holds one result per placement.
pub fn apply_placements<B>(
    board: &mut B,
    placements: &[Placement],
    total_keys: usize,
) -> PlacementReport
where
    B: Board + ?Sized,
{
    let mut seen = HashSet::with_capacity(placements.len());
    let mut results = Vec::with_capacity(placements.len());

    for p in placements {
        let outcome = if !seen.insert(p.reference.as_str()) {
            Outcome::Failed {
                reason: FailureReason::Duplicate,
            }
        } else if !board.contains(&p.reference) {
            Outcome::Failed {
                reason: FailureReason::Missing,
            }
        } else {
            match place_one(board, p) {
                Ok(flipped) => {
                    debug!(reference = %p.reference, flipped, "placed footprint");
                    Outcome::Placed
                }
                Err(BoardError::NotFound(_)) => Outcome::Failed {
                    reason: FailureReason::Missing,
                },
                Err(BoardError::Rejected { message, .. }) => Outcome::Failed {
                    reason: FailureReason::Rejected(message),
                },
            }
        };
        if let Outcome::Failed { reason } = &outcome {
            warn!(reference = %p.reference, %reason, "placement failed");
        }
        results.push(PlacementResult {
            placement: p.clone(),
            outcome,
        });
    }

    let report = PlacementReport {
        total_keys,
        results,
    };
    info!(
        keys = total_keys,
        placed = report.placed().count(),
        missing = report.missing().count(),
        errors = report.errors().count(),
        "applied placements"
    );
    report
}

fn place_one<B>(board: &mut B, p: &Placement) -> Result<bool, BoardError>
where
    B: Board + ?Sized,
{
    board.move_to(&p.reference, p.position())?;
    board.set_rotation(&p.reference, p.rotation_deg)?;
    board.set_side(&p.reference, p.side)
}
