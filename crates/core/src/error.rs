//! Error taxonomy for a model run
//!
//! Every failure is categorical: the first error encountered aborts the run
//! and is surfaced to the caller with a human-readable category. No partial
//! result is ever produced alongside an error; callers wanting a uniform
//! output shape can pair the error with [`crate::model::nan_field`].

use serde::{Deserialize, Serialize};
use std::fmt;

/// Which of the two cross-canyon orientations a geometry error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Orientation {
    /// Wind blowing left to right across the drawn cross-section.
    Forward,
    /// Wind blowing right to left (the reflected cross-section).
    Mirrored,
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Orientation::Forward => write!(f, "left to right"),
            Orientation::Mirrored => write!(f, "right to left"),
        }
    }
}

/// Vertical discretization failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RowDimensioningError {
    /// Neither building height is positive.
    NoBuildings,
    /// Exactly one building height is positive.
    SingleBuilding,
    /// The proposed barrier is as tall as or taller than a building.
    BarrierTallerThanBuilding,
    /// An existing barrier is as tall as or taller than the shorter building.
    ExistingBarrierTallerThanBuilding,
}

impl fmt::Display for RowDimensioningError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowDimensioningError::NoBuildings => write!(f, "no buildings present"),
            RowDimensioningError::SingleBuilding => write!(f, "only one building present"),
            RowDimensioningError::BarrierTallerThanBuilding => write!(
                f,
                "proposed barrier is the same height or taller than at least one building"
            ),
            RowDimensioningError::ExistingBarrierTallerThanBuilding => write!(
                f,
                "existing barrier is the same height or taller than at least one building"
            ),
        }
    }
}

/// Horizontal discretization failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColumnDimensioningError {
    /// A column boundary overruns the far edge of the emission zone.
    BoundaryOverrunAtEmissionZone,
    /// A column boundary overruns the downwind building face.
    BoundaryOverrunAtDownwindBuilding,
    /// A barrier recirculation extends beyond the far limit of the emission zone.
    RecircExceedsZoneLimit,
    /// A barrier upwind is taller than the upwind building.
    BarrierTallerThanBuilding,
}

impl fmt::Display for ColumnDimensioningError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnDimensioningError::BoundaryOverrunAtEmissionZone => {
                write!(f, "column boundary overruns the far edge of the emission zone")
            }
            ColumnDimensioningError::BoundaryOverrunAtDownwindBuilding => {
                write!(f, "column boundary overruns the downwind building")
            }
            ColumnDimensioningError::RecircExceedsZoneLimit => write!(
                f,
                "barrier recirculation extends beyond the far limit of the emission zone"
            ),
            ColumnDimensioningError::BarrierTallerThanBuilding => {
                write!(f, "upwind barrier is taller than the upwind building")
            }
        }
    }
}

/// Any failure a model run can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModelError {
    /// Vertical discretization failed.
    RowDimensioning(RowDimensioningError),
    /// Horizontal discretization failed for the given orientation.
    ColumnDimensioning(Orientation, ColumnDimensioningError),
    /// Resolved column widths do not sum to the road width, or a width is negative.
    WidthSumMismatch(Orientation),
    /// Partitioned emissions do not reproduce the total emission rate.
    EmissionPartitionMismatch,
    /// The mass-balance matrix was singular for some scenario.
    SingularSystem,
}

impl fmt::Display for ModelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelError::RowDimensioning(e) => write!(f, "row dimensioning error: {e}"),
            ModelError::ColumnDimensioning(o, e) => {
                write!(f, "column dimensioning error (wind {o}): {e}")
            }
            ModelError::WidthSumMismatch(o) => write!(
                f,
                "column dimensioning error: total column widths do not equal road width (wind {o})"
            ),
            ModelError::EmissionPartitionMismatch => {
                write!(f, "emissions error: partitioned emissions do not equal total emissions")
            }
            ModelError::SingularSystem => {
                write!(f, "solver error: mass-balance matrix is singular")
            }
        }
    }
}

impl std::error::Error for ModelError {}

impl From<RowDimensioningError> for ModelError {
    fn from(e: RowDimensioningError) -> Self {
        ModelError::RowDimensioning(e)
    }
}
