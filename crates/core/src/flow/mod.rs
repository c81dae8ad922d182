//! Staggered advection/dispersion fields
//!
//! A [`FlowField`] holds the four face-value arrays driving the mass
//! balance. Horizontal values live on the vertical faces between columns
//! (`[row][face]`, face `c` separating columns `c-1` and `c`), vertical
//! values on the horizontal faces between rows (`[face][column]`, face `r`
//! below row `r`; face 4 is the canyon top). Index 0 of either axis is
//! unused padding so indices match the 1-based row/column numbering of the
//! model formulation.
//!
//! Sign convention: positive horizontal advection flows left to right,
//! positive vertical advection flows upward. Dispersion values are
//! magnitudes (bidirectional exchange).
//!
//! Fields are layered: a no-barrier baseline, an existing-barrier layer and
//! a new-barrier layer. Each layer derives from a *copy* of the baseline so
//! earlier layers stay available for before/after differencing.

pub mod barriers;
pub mod baseline;
pub mod parallel;

use serde::{Deserialize, Serialize};

/// One face-value array: 5 usable rows x 6 usable positions, 1-based.
pub type FaceArray = [[f64; 6]; 5];

/// Advection and dispersion values on every face of the canyon grid.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FlowField {
    /// Horizontal advection on vertical faces (m/s, positive rightward).
    pub ua: FaceArray,
    /// Vertical advection on horizontal faces (m/s, positive upward).
    pub wa: FaceArray,
    /// Horizontal dispersion on vertical faces (m/s).
    pub ue: FaceArray,
    /// Vertical dispersion on horizontal faces (m/s).
    pub we: FaceArray,
}

impl FlowField {
    /// A field with every face at rest.
    #[must_use]
    pub fn zeros() -> Self {
        FlowField::default()
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::core_types::cross_section::{CrossSection, EmissionZones, Span};
    use crate::error::Orientation;
    use crate::geometry::{CanyonGeometry, OrientedLayout};
    use crate::wind::{CanopyAnchor, CanyonWinds, DisplacementModel, RecirculationSpeed, WindProfile};

    /// Two equal 18 m buildings across a 36 m street, no barriers: a true
    /// street canyon (the recirculation spans all five columns).
    pub fn street_canyon_section() -> CrossSection {
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

    /// A low upwind building whose wake touches down inside the emission
    /// zone, giving distinct throughflow and recirculation regions.
    pub fn open_street_section() -> CrossSection {
        CrossSection {
            left_building_height: 5.0,
            right_building_height: 20.0,
            road_width: 36.0,
            left_boundary: 6.0,
            right_boundary: 30.0,
            emission_zones: EmissionZones::single(Span::new(10.0, 26.0)),
            existing_left: None,
            existing_right: None,
            new_barrier: None,
        }
    }

    pub fn resolve_forward(section: &CrossSection) -> (CanyonGeometry, CanyonWinds) {
        let layout = OrientedLayout::forward(section);
        let geometry = CanyonGeometry::resolve(&layout, Orientation::Forward).unwrap();
        let profile = WindProfile {
            background: 4.0,
            building_height: geometry.layout.upwind_building,
            road_width: geometry.layout.road_width,
            displacement: DisplacementModel::OpenRelation,
            anchor: CanopyAnchor::Computed,
        };
        let winds = CanyonWinds::evaluate(
            &profile,
            &geometry.rows.cumulative,
            geometry.layout.upwind_building.max(geometry.layout.downwind_building),
            geometry.building_rows,
            geometry.rows.heights[geometry.building_rows],
            RecirculationSpeed::TenthOfCanopy,
        );
        (geometry, winds)
    }
}
