//! Vertical discretization
//!
//! Row 1 reaches the top of the proposed barrier (tree crown, hedge or wall,
//! in that precedence), defaulting to 2 m when nothing is proposed. Rows 2
//! and 3 divide the remaining depth: row 2 tops out at the shorter building
//! and row 3 at the taller, splitting evenly when the buildings match. The
//! canyon needs two buildings, and every barrier must sit below both
//! building tops.

use super::OrientedLayout;
use crate::core_types::numeric::round4;
use crate::error::RowDimensioningError;
use serde::{Deserialize, Serialize};

/// Default row-1 height when no barrier is proposed (m).
const DEFAULT_GROUND_ROW: f64 = 2.0;

/// Row heights of the canyon grid. Index 0 is unused so that indices 1..=3
/// match the row numbering used throughout the model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RowGrid {
    /// Individual row heights (m), indices 1..=3.
    pub heights: [f64; 4],
    /// Cumulative heights from the ground (m), indices 1..=3.
    pub cumulative: [f64; 4],
}

/// Resolve the three row heights for one orientation.
///
/// # Errors
///
/// Returns the first applicable [`RowDimensioningError`]: missing buildings,
/// a proposed barrier reaching a building top, or an existing barrier
/// reaching the shorter building.
pub fn dimension(layout: &OrientedLayout) -> Result<RowGrid, RowDimensioningError> {
    let upwind = layout.upwind_building;
    let downwind = layout.downwind_building;

    let mut heights = [0.0; 4];
    heights[1] = if layout.new_crown_top > 0.0 {
        layout.new_crown_top
    } else if layout.new_hedge > 0.0 {
        layout.new_hedge
    } else if layout.new_wall > 0.0 {
        layout.new_wall
    } else {
        DEFAULT_GROUND_ROW
    };

    if upwind == 0.0 && downwind == 0.0 {
        return Err(RowDimensioningError::NoBuildings);
    } else if upwind == 0.0 || downwind == 0.0 {
        return Err(RowDimensioningError::SingleBuilding);
    } else if upwind > downwind {
        if heights[1] < upwind && heights[1] < downwind {
            heights[2] = downwind - heights[1];
            heights[3] = upwind - (heights[1] + heights[2]);
        } else {
            return Err(RowDimensioningError::BarrierTallerThanBuilding);
        }
    } else if downwind > upwind {
        if heights[1] < upwind && heights[1] < downwind {
            heights[2] = upwind - heights[1];
            heights[3] = downwind - (heights[1] + heights[2]);
        } else {
            return Err(RowDimensioningError::BarrierTallerThanBuilding);
        }
    } else if heights[1] < upwind {
        heights[2] = (upwind - heights[1]) / 2.0;
        heights[3] = (downwind - heights[1]) / 2.0;
    } else {
        return Err(RowDimensioningError::BarrierTallerThanBuilding);
    }

    let shorter = upwind.min(downwind);
    if layout.existing_upwind_height >= shorter || layout.existing_downwind_height >= shorter {
        return Err(RowDimensioningError::ExistingBarrierTallerThanBuilding);
    }

    for h in &mut heights[1..] {
        *h = round4(*h);
    }
    let cumulative = [
        0.0,
        round4(heights[1]),
        round4(heights[1] + heights[2]),
        round4(heights[1] + heights[2] + heights[3]),
    ];

    Ok(RowGrid { heights, cumulative })
}
