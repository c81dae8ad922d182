//! Canyon discretization
//!
//! Resolves a [`CrossSection`] into the fixed 3x5 grid of control volumes
//! for one wind orientation: row heights, column widths, recirculation
//! extents, barrier placement flags and height-scaled obstruction values.
//!
//! The resolver runs once per cross-canyon orientation. The mirrored
//! orientation is produced by reflecting every position as
//! `road_width - x` and swapping upwind/downwind roles, then re-running the
//! full procedure - asymmetric barrier placement can change which
//! dimensioning case applies, so the mirrored grid is never derived by
//! index-flipping the forward one.

pub mod columns;
pub mod rows;

pub use columns::ColumnGrid;
pub use rows::RowGrid;

use crate::core_types::cross_section::CrossSection;
use crate::core_types::numeric::{round4, same_position};
use crate::error::{ModelError, Orientation};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Slot indices into the barrier-aligned arrays (`positions`, `present`,
/// `obstructions` and the tail of `touchdowns`): existing-upwind, new-upwind,
/// existing-downwind, new-downwind.
pub const EXISTING_UPWIND: usize = 0;
/// New barrier placed upwind of the emission zone.
pub const NEW_UPWIND: usize = 1;
/// Existing barrier on the downwind side.
pub const EXISTING_DOWNWIND: usize = 2;
/// New barrier placed downwind of the emission zone.
pub const NEW_DOWNWIND: usize = 3;

/// Cross-section measurements arranged for one wind orientation.
///
/// All positions are metres from the upwind building face *for this
/// orientation* and are rounded to the geometry grid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OrientedLayout {
    /// Upwind building height (m).
    pub upwind_building: f64,
    /// Downwind building height (m).
    pub downwind_building: f64,
    /// New-barrier hedge height (m); zero without one.
    pub new_hedge: f64,
    /// New-barrier wall height (m); zero without one.
    pub new_wall: f64,
    /// New-barrier tree crown base height (m); zero without trees.
    pub new_crown_base: f64,
    /// New-barrier tree crown top height (m); zero without trees.
    pub new_crown_top: f64,
    /// Existing upwind barrier height (m); zero without one.
    pub existing_upwind_height: f64,
    /// Existing downwind barrier height (m); zero without one.
    pub existing_downwind_height: f64,
    /// Reference positions across the street (m): upwind street boundary,
    /// near emission-zone edge, far emission-zone edge, downwind street
    /// boundary, downwind building face.
    pub marks: [f64; 5],
    /// Barrier positions by slot; zero in an empty slot.
    pub positions: [f64; 4],
    /// Barrier presence by slot.
    pub present: [bool; 4],
    /// Recirculation touchdown positions: index 0 is the upwind building's
    /// touchdown distance, indices 1..=4 are absolute touchdown positions of
    /// the barrier in the corresponding slot.
    pub touchdowns: [f64; 5],
    /// Raw obstruction fraction by slot.
    pub obstructions: [f64; 4],
    /// Road width (m).
    pub road_width: f64,
}

/// Touchdown distance of the wake behind an obstruction of height `h`:
/// `3h - 3`, floored just above zero so a short obstruction still produces a
/// distinct (if tiny) wake.
#[must_use]
pub fn touchdown_distance(height: f64) -> f64 {
    let reach = 3.0 * height - 3.0;
    if reach <= 0.0 {
        0.01
    } else {
        reach
    }
}

impl OrientedLayout {
    /// Arrange a cross-section for the forward (left-to-right) orientation.
    #[must_use]
    pub fn forward(section: &CrossSection) -> Self {
        let road_width = round4(section.road_width);

        let mut upwind_boundary = round4(section.left_boundary);
        if upwind_boundary == 0.0 {
            upwind_boundary = 0.01;
        }
        let mut downwind_boundary = round4(section.right_boundary);
        if same_position(downwind_boundary, road_width) {
            downwind_boundary = road_width - 0.01;
        }
        let marks = [
            upwind_boundary,
            round4(section.emission_zones.near_edge()),
            round4(section.emission_zones.far_edge()),
            downwind_boundary,
            road_width,
        ];

        let (new_hedge, new_wall, new_crown_base, new_crown_top, new_position, new_obstruction) =
            match section.new_barrier {
                Some(barrier) => (
                    barrier.profile.hedge_height(),
                    barrier.profile.wall_height(),
                    barrier.profile.crown_base(),
                    barrier.profile.crown_top(),
                    round4(barrier.position),
                    barrier.profile.effective_obstruction(),
                ),
                None => (0.0, 0.0, 0.0, 0.0, 0.0, 0.0),
            };

        let mut positions = [0.0; 4];
        let mut present = [false; 4];
        let mut obstructions = [0.0; 4];

        if let Some(barrier) = section.existing_left {
            positions[EXISTING_UPWIND] = round4(barrier.position);
            present[EXISTING_UPWIND] = positions[EXISTING_UPWIND] > 0.0;
            obstructions[EXISTING_UPWIND] = barrier.obstruction;
        }
        if let Some(barrier) = section.existing_right {
            positions[EXISTING_DOWNWIND] = round4(barrier.position);
            present[EXISTING_DOWNWIND] = positions[EXISTING_DOWNWIND] > 0.0;
            obstructions[EXISTING_DOWNWIND] = barrier.obstruction;
        }
        // A proposed barrier is placed upwind or downwind of the emission
        // zone; a position strictly inside the zone leaves both slots empty
        // (its height still constrains row dimensioning).
        if section.new_barrier.is_some() {
            if new_position <= marks[1] {
                positions[NEW_UPWIND] = new_position;
                present[NEW_UPWIND] = new_position > 0.0;
                obstructions[NEW_UPWIND] = new_obstruction;
            } else if new_position >= marks[2] {
                positions[NEW_DOWNWIND] = new_position;
                present[NEW_DOWNWIND] = new_position > 0.0;
                obstructions[NEW_DOWNWIND] = new_obstruction;
            }
        }

        let mut layout = OrientedLayout {
            upwind_building: round4(section.left_building_height),
            downwind_building: round4(section.right_building_height),
            new_hedge: round4(new_hedge),
            new_wall: round4(new_wall),
            new_crown_base: round4(new_crown_base),
            new_crown_top: round4(new_crown_top),
            existing_upwind_height: section.existing_left.map_or(0.0, |b| round4(b.height)),
            existing_downwind_height: section.existing_right.map_or(0.0, |b| round4(b.height)),
            marks,
            positions,
            present,
            touchdowns: [0.0; 5],
            obstructions,
            road_width,
        };
        layout.assign_touchdowns();
        layout
    }

    /// Reflect this layout for the opposite cross-canyon wind direction.
    ///
    /// Positions reflect as `road_width - x`, building and barrier roles
    /// swap upwind<->downwind, and recirculation touchdowns are recomputed
    /// from the reflected positions.
    #[must_use]
    pub fn mirrored(&self) -> Self {
        let w = self.road_width;
        let marks = [
            round4(w - self.marks[3]),
            round4(w - self.marks[2]),
            round4(w - self.marks[1]),
            round4(w - self.marks[0]),
            w,
        ];

        let present = [
            self.present[EXISTING_DOWNWIND],
            self.present[NEW_DOWNWIND],
            self.present[EXISTING_UPWIND],
            self.present[NEW_UPWIND],
        ];
        let mut positions = [0.0; 4];
        if present[EXISTING_UPWIND] {
            positions[EXISTING_UPWIND] = round4(w - self.positions[EXISTING_DOWNWIND]);
        }
        if present[NEW_UPWIND] {
            positions[NEW_UPWIND] = round4(w - self.positions[NEW_DOWNWIND]);
        }
        if present[EXISTING_DOWNWIND] {
            positions[EXISTING_DOWNWIND] = round4(w - self.positions[EXISTING_UPWIND]);
        }
        if present[NEW_DOWNWIND] {
            positions[NEW_DOWNWIND] = round4(w - self.positions[NEW_UPWIND]);
        }

        let obstructions = [
            self.obstructions[EXISTING_DOWNWIND],
            self.obstructions[NEW_DOWNWIND],
            self.obstructions[EXISTING_UPWIND],
            self.obstructions[NEW_UPWIND],
        ];

        let mut layout = OrientedLayout {
            upwind_building: self.downwind_building,
            downwind_building: self.upwind_building,
            new_hedge: self.new_hedge,
            new_wall: self.new_wall,
            new_crown_base: self.new_crown_base,
            new_crown_top: self.new_crown_top,
            existing_upwind_height: self.existing_downwind_height,
            existing_downwind_height: self.existing_upwind_height,
            marks,
            positions,
            present,
            touchdowns: [0.0; 5],
            obstructions,
            road_width: w,
        };
        layout.assign_touchdowns();
        layout
    }

    /// Crest height of the proposed barrier (m); zero without one.
    #[must_use]
    pub fn new_crest(&self) -> f64 {
        self.new_hedge.max(self.new_wall).max(self.new_crown_base).max(self.new_crown_top)
    }

    fn assign_touchdowns(&mut self) {
        self.touchdowns[0] = if self.upwind_building > 0.0 {
            round4(touchdown_distance(self.upwind_building))
        } else {
            0.0
        };
        let crest = self.new_crest();
        let slot_heights = [
            self.existing_upwind_height,
            crest,
            self.existing_downwind_height,
            crest,
        ];
        for slot in 0..4 {
            self.touchdowns[slot + 1] = if self.present[slot] {
                round4(touchdown_distance(slot_heights[slot]) + self.positions[slot])
            } else {
                0.0
            };
        }
    }
}

/// Fully resolved canyon grid for one wind orientation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CanyonGeometry {
    /// The oriented input measurements (with any touchdown nudges applied).
    pub layout: OrientedLayout,
    /// Row heights and cumulative boundaries.
    pub rows: RowGrid,
    /// Column widths and cumulative boundaries.
    pub columns: ColumnGrid,
    /// Number of canyon rows the upwind building spans (2 or 3).
    pub building_rows: usize,
    /// Number of columns fully spanned by the upwind building's wake (0..=5).
    pub recirc_columns: usize,
    /// Obstruction fraction by barrier slot, scaled to the row-1 height and
    /// clamped away from full blockage.
    pub obstructions: [f64; 4],
    /// Which orientation this grid was resolved for.
    pub orientation: Orientation,
}

impl CanyonGeometry {
    /// Run the full resolver for one orientation.
    ///
    /// # Errors
    ///
    /// Any row- or column-dimensioning failure, or a width-sum violation,
    /// aborts with the corresponding [`ModelError`] category.
    pub fn resolve(layout: &OrientedLayout, orientation: Orientation) -> Result<Self, ModelError> {
        let rows = rows::dimension(layout).map_err(ModelError::RowDimensioning)?;

        let resolved = columns::dimension(layout)
            .map_err(|e| ModelError::ColumnDimensioning(orientation, e))?;
        let columns = resolved.grid;

        let mut layout = *layout;
        layout.touchdowns[0] = resolved.building_touchdown;

        let width_sum = round4(columns.widths[1..].iter().sum());
        if !same_position(width_sum, layout.road_width)
            || columns.widths[1..].iter().any(|&w| w < 0.0)
        {
            return Err(ModelError::WidthSumMismatch(orientation));
        }

        // The upwind building top coincides with a row boundary by
        // construction: the second boundary when it is the shorter building,
        // the canyon top otherwise.
        let building_rows =
            if same_position(layout.upwind_building, rows.cumulative[2]) { 2 } else { 3 };
        let recirc_columns = recirc_column_count(layout.touchdowns[0], &columns.cumulative);

        let h1 = rows.heights[1];
        let crest = layout.new_crest();
        let slot_heights = [
            layout.existing_upwind_height,
            crest,
            layout.existing_downwind_height,
            crest,
        ];
        let mut obstructions = [0.0; 4];
        for slot in 0..4 {
            let scaled = layout.obstructions[slot] * (slot_heights[slot] / h1);
            // Full blockage would zero an advection face and make the mass
            // balance singular; 99% keeps the system regular.
            obstructions[slot] = if same_position(scaled, 1.0) {
                warn!(slot, "barrier obstruction of 100% clamped to 99%");
                0.99
            } else {
                scaled
            };
        }

        debug!(
            ?orientation,
            widths = ?&columns.widths[1..],
            heights = ?&rows.heights[1..],
            building_rows,
            recirc_columns,
            "canyon geometry resolved"
        );

        Ok(CanyonGeometry {
            layout,
            rows,
            columns,
            building_rows,
            recirc_columns,
            obstructions,
            orientation,
        })
    }
}

/// Number of whole columns a wake spans, found by locating its touchdown
/// among the cumulative column boundaries.
#[must_use]
pub fn recirc_column_count(touchdown: f64, cumulative: &[f64; 6]) -> usize {
    for k in (1..=5).rev() {
        if touchdown > cumulative[k] || same_position(touchdown, cumulative[k]) {
            return k;
        }
    }
    0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_types::cross_section::{CrossSection, EmissionZones, ExistingBarrier, Span};
    use approx::assert_relative_eq;

    fn plain_section() -> CrossSection {
        CrossSection {
            left_building_height: 18.0,
            right_building_height: 18.0,
            road_width: 36.0,
            left_boundary: 6.0,
            right_boundary: 30.0,
            emission_zones: EmissionZones::single(Span::new(10.0, 26.0)),
            existing_left: None,
            existing_right: None,
            new_barrier: None,
        }
    }

    #[test]
    fn test_touchdown_distance_rule() {
        assert_relative_eq!(touchdown_distance(18.0), 51.0);
        assert_relative_eq!(touchdown_distance(1.0), 0.01);
        assert_relative_eq!(touchdown_distance(0.5), 0.01);
    }

    #[test]
    fn test_forward_layout_marks() {
        let layout = OrientedLayout::forward(&plain_section());
        assert_eq!(layout.marks, [6.0, 10.0, 26.0, 30.0, 36.0]);
        assert_relative_eq!(layout.touchdowns[0], 51.0);
        assert!(!layout.present.iter().any(|&p| p));
    }

    #[test]
    fn test_boundary_nudges() {
        let mut section = plain_section();
        section.left_boundary = 0.0;
        section.right_boundary = 36.0;
        let layout = OrientedLayout::forward(&section);
        assert_relative_eq!(layout.marks[0], 0.01);
        assert_relative_eq!(layout.marks[3], 35.99);
    }

    #[test]
    fn test_mirror_swaps_roles_and_reflects() {
        let mut section = plain_section();
        section.left_building_height = 24.0;
        section.existing_left =
            Some(ExistingBarrier { position: 6.0, height: 2.0, obstruction: 0.8 });
        let forward = OrientedLayout::forward(&section);
        let mirrored = forward.mirrored();

        assert_relative_eq!(mirrored.upwind_building, 18.0);
        assert_relative_eq!(mirrored.downwind_building, 24.0);
        // The left existing barrier becomes the downwind one, reflected.
        assert!(mirrored.present[EXISTING_DOWNWIND]);
        assert!(!mirrored.present[EXISTING_UPWIND]);
        assert_relative_eq!(mirrored.positions[EXISTING_DOWNWIND], 30.0);
        assert_relative_eq!(mirrored.obstructions[EXISTING_DOWNWIND], 0.8);
        // Marks reflect end-for-end.
        assert_eq!(mirrored.marks, [6.0, 10.0, 26.0, 30.0, 36.0]);
    }

    #[test]
    fn test_mirror_of_symmetric_section_round_trips() {
        let forward = OrientedLayout::forward(&plain_section());
        let mirrored = forward.mirrored();
        assert_eq!(forward, mirrored);
    }

    #[test]
    fn test_recirc_column_count_boundaries() {
        let cumulative = [0.0, 6.0, 10.0, 26.0, 30.0, 36.0];
        assert_eq!(recirc_column_count(3.0, &cumulative), 0);
        assert_eq!(recirc_column_count(6.0, &cumulative), 1);
        assert_eq!(recirc_column_count(7.0, &cumulative), 1);
        assert_eq!(recirc_column_count(26.0, &cumulative), 3);
        assert_eq!(recirc_column_count(35.0, &cumulative), 4);
        assert_eq!(recirc_column_count(36.0, &cumulative), 5);
        assert_eq!(recirc_column_count(51.0, &cumulative), 5);
    }

    #[test]
    fn test_resolve_plain_canyon() {
        let layout = OrientedLayout::forward(&plain_section());
        let geometry = CanyonGeometry::resolve(&layout, Orientation::Forward).unwrap();
        // 18 m buildings over a 36 m street: wake reaches past the downwind
        // face, the canyon is a single recirculation cell.
        assert_eq!(geometry.recirc_columns, 5);
        assert_eq!(geometry.building_rows, 3);
        let total: f64 = geometry.columns.widths[1..].iter().sum();
        assert_relative_eq!(total, 36.0, epsilon = 1e-4);
    }

    #[test]
    fn test_resolve_is_idempotent() {
        let layout = OrientedLayout::forward(&plain_section());
        let a = CanyonGeometry::resolve(&layout, Orientation::Forward).unwrap();
        let b = CanyonGeometry::resolve(&layout, Orientation::Forward).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_full_obstruction_clamped() {
        let mut section = plain_section();
        // Barrier height equal to the default 2 m row so the scaled
        // obstruction stays exactly 1.
        section.existing_left =
            Some(ExistingBarrier { position: 6.0, height: 2.0, obstruction: 1.0 });
        let layout = OrientedLayout::forward(&section);
        let geometry = CanyonGeometry::resolve(&layout, Orientation::Forward).unwrap();
        assert_relative_eq!(geometry.obstructions[EXISTING_UPWIND], 0.99);
    }
}
