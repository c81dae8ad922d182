//! Street cross-section description
//!
//! A [`CrossSection`] is the immutable per-run configuration: two building
//! faces, the road width between them, up to two traffic emission zones, up
//! to two existing barriers (one per side) and at most one proposed new
//! barrier. All positions are metres from the left (upwind, in the forward
//! orientation) building face; barrier and zone extents must lie within
//! `[0, road_width]`.

use serde::{Deserialize, Serialize};

/// A horizontal extent in metres from the left building face.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Span {
    /// Near edge (m).
    pub start: f64,
    /// Far edge (m).
    pub end: f64,
}

impl Span {
    /// Construct a span.
    #[must_use]
    pub fn new(start: f64, end: f64) -> Self {
        Span { start, end }
    }

    /// Width of the span (m).
    #[must_use]
    pub fn width(&self) -> f64 {
        self.end - self.start
    }
}

/// Traffic emission zones across the carriageway.
///
/// The model supports one or two line-source zones; when two are present the
/// primary zone is the one nearer the left building face.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EmissionZones {
    /// Zone nearest the left building face.
    pub primary: Span,
    /// Optional second zone, further from the left building face.
    pub secondary: Option<Span>,
}

impl EmissionZones {
    /// Single-zone layout.
    #[must_use]
    pub fn single(zone: Span) -> Self {
        EmissionZones { primary: zone, secondary: None }
    }

    /// Two-zone layout.
    #[must_use]
    pub fn pair(near: Span, far: Span) -> Self {
        EmissionZones { primary: near, secondary: Some(far) }
    }

    /// Near edge of the combined emission region (m).
    #[must_use]
    pub fn near_edge(&self) -> f64 {
        self.primary.start
    }

    /// Far edge of the combined emission region (m).
    #[must_use]
    pub fn far_edge(&self) -> f64 {
        self.secondary.map_or(self.primary.end, |z| z.end)
    }
}

/// Vertical make-up of a proposed barrier.
///
/// Tree-topped variants combine the solid element, an open gap up to the
/// crown base, and the crown itself; their blocking fractions combine
/// harmonically, height-weighted, so a porous gap dominates the column's
/// effective obstruction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum BarrierProfile {
    /// A hedge of the given height (m) blocking the given fraction of flow.
    Hedge { height: f64, obstruction: f64 },
    /// A wall or fence of the given height (m).
    Wall { height: f64, obstruction: f64 },
    /// A hedge with a tree line above it.
    HedgeWithTrees {
        /// Hedge height (m).
        hedge_height: f64,
        /// Fraction of flow the hedge blocks.
        hedge_obstruction: f64,
        /// Height of the tree crown base at maturity (m).
        crown_base: f64,
        /// Height of the tree crown top at maturity (m).
        crown_top: f64,
        /// Fraction of flow the crown blocks.
        tree_obstruction: f64,
    },
    /// A wall or fence with a tree line above it.
    WallWithTrees {
        /// Wall height (m).
        wall_height: f64,
        /// Fraction of flow the wall blocks.
        wall_obstruction: f64,
        /// Height of the tree crown base at maturity (m).
        crown_base: f64,
        /// Height of the tree crown top at maturity (m).
        crown_top: f64,
        /// Fraction of flow the crown blocks.
        tree_obstruction: f64,
    },
}

/// Assumed blocking fraction of the open gap between barrier top and crown base.
const GAP_OBSTRUCTION: f64 = 0.1;

impl BarrierProfile {
    /// Hedge element height, zero when the solid element is a wall (m).
    #[must_use]
    pub fn hedge_height(&self) -> f64 {
        match *self {
            BarrierProfile::Hedge { height, .. } => height,
            BarrierProfile::HedgeWithTrees { hedge_height, .. } => hedge_height,
            _ => 0.0,
        }
    }

    /// Wall element height, zero when the solid element is a hedge (m).
    #[must_use]
    pub fn wall_height(&self) -> f64 {
        match *self {
            BarrierProfile::Wall { height, .. } => height,
            BarrierProfile::WallWithTrees { wall_height, .. } => wall_height,
            _ => 0.0,
        }
    }

    /// Tree crown base height at maturity, zero without trees (m).
    #[must_use]
    pub fn crown_base(&self) -> f64 {
        match *self {
            BarrierProfile::HedgeWithTrees { crown_base, .. }
            | BarrierProfile::WallWithTrees { crown_base, .. } => crown_base,
            _ => 0.0,
        }
    }

    /// Tree crown top height at maturity, zero without trees (m).
    #[must_use]
    pub fn crown_top(&self) -> f64 {
        match *self {
            BarrierProfile::HedgeWithTrees { crown_top, .. }
            | BarrierProfile::WallWithTrees { crown_top, .. } => crown_top,
            _ => 0.0,
        }
    }

    /// Overall crest height of the barrier (m).
    #[must_use]
    pub fn crest_height(&self) -> f64 {
        if self.crown_top() > 0.0 {
            self.crown_top()
        } else if self.hedge_height() > 0.0 {
            self.hedge_height()
        } else {
            self.wall_height()
        }
    }

    /// Effective blocking fraction of the whole barrier column.
    ///
    /// For tree-topped barriers the solid element, the gap and the crown are
    /// combined as a height-weighted harmonic mean of their blocking
    /// fractions, rounded to two decimals.
    #[must_use]
    pub fn effective_obstruction(&self) -> f64 {
        match *self {
            BarrierProfile::Hedge { obstruction, .. }
            | BarrierProfile::Wall { obstruction, .. } => obstruction,
            BarrierProfile::HedgeWithTrees {
                hedge_height: solid_height,
                hedge_obstruction: solid_obstruction,
                crown_base,
                crown_top,
                tree_obstruction,
            }
            | BarrierProfile::WallWithTrees {
                wall_height: solid_height,
                wall_obstruction: solid_obstruction,
                crown_base,
                crown_top,
                tree_obstruction,
            } => {
                let total = crown_top;
                let crown = crown_top - crown_base;
                let gap = crown_base - solid_height;
                let combined = ((1.0 / solid_obstruction) * (solid_height / total)
                    + (1.0 / GAP_OBSTRUCTION) * (gap / total)
                    + (1.0 / tree_obstruction) * (crown / total))
                    .recip();
                (combined * 100.0).round() / 100.0
            }
        }
    }
}

/// A proposed new barrier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Barrier {
    /// Position, metres from the left building face.
    pub position: f64,
    /// Vertical make-up.
    pub profile: BarrierProfile,
}

/// A barrier that already exists in the street.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExistingBarrier {
    /// Position, metres from the left building face.
    pub position: f64,
    /// Height (m).
    pub height: f64,
    /// Fraction of oncoming flow the barrier blocks.
    pub obstruction: f64,
}

/// Immutable per-run street description.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CrossSection {
    /// Height of the left building in the drawn orientation (m).
    pub left_building_height: f64,
    /// Height of the right building (m).
    pub right_building_height: f64,
    /// Distance between the building faces (m).
    pub road_width: f64,
    /// Left street boundary: edge of the footway nearest the left building (m).
    pub left_boundary: f64,
    /// Right street boundary (m).
    pub right_boundary: f64,
    /// Traffic emission zones.
    pub emission_zones: EmissionZones,
    /// Existing barrier on the left side, if any.
    pub existing_left: Option<ExistingBarrier>,
    /// Existing barrier on the right side, if any.
    pub existing_right: Option<ExistingBarrier>,
    /// Proposed new barrier, if any.
    pub new_barrier: Option<Barrier>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_span_width() {
        assert_relative_eq!(Span::new(4.3, 16.7).width(), 12.4);
    }

    #[test]
    fn test_simple_profile_obstruction() {
        let hedge = BarrierProfile::Hedge { height: 2.0, obstruction: 0.75 };
        assert_relative_eq!(hedge.effective_obstruction(), 0.75);
        assert_relative_eq!(hedge.crest_height(), 2.0);
    }

    #[test]
    fn test_tree_topped_obstruction_dominated_by_gap() {
        // 1.6 m hedge, gap to 5 m, crown up to 10 m; the open gap pulls the
        // harmonic combination well below the solid elements' fractions.
        let profile = BarrierProfile::HedgeWithTrees {
            hedge_height: 1.6,
            hedge_obstruction: 0.8,
            crown_base: 5.0,
            crown_top: 10.0,
            tree_obstruction: 0.6,
        };
        let combined = profile.effective_obstruction();
        assert!(combined < 0.8 && combined > 0.0);
        // Height-weighted harmonic mean computed by hand:
        // (1/0.8*0.16 + 1/0.1*0.34 + 1/0.6*0.5)^-1 = 0.2276... -> 0.23
        assert_relative_eq!(combined, 0.23, epsilon = 1e-12);
        assert_relative_eq!(profile.crest_height(), 10.0);
    }

    #[test]
    fn test_emission_zone_edges() {
        let zones = EmissionZones::pair(Span::new(4.3, 16.7), Span::new(19.3, 29.7));
        assert_relative_eq!(zones.near_edge(), 4.3);
        assert_relative_eq!(zones.far_edge(), 29.7);
        let single = EmissionZones::single(Span::new(4.3, 16.7));
        assert_relative_eq!(single.far_edge(), 16.7);
    }
}
