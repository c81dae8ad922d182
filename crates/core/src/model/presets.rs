//! Wind-profile configuration presets
//!
//! The published applications of this model differ only in their wind
//! parameterization; each is a configuration of the same core rather than
//! its own implementation.

use super::WindProfileConfig;
use crate::wind::{CanopyAnchor, DisplacementModel, RecirculationSpeed};

impl WindProfileConfig {
    /// Open-terrain configuration: the open-street displacement relation,
    /// computed canopy speed and the plain recirculation formula.
    #[must_use]
    pub fn open_terrain() -> Self {
        WindProfileConfig {
            displacement: DisplacementModel::OpenRelation,
            anchor: CanopyAnchor::Computed,
            recirculation: RecirculationSpeed::TenthOfCanopy,
        }
    }

    /// Wind-tunnel configuration: canyon displacement relation, a measured
    /// canopy-top speed and the height-scaled recirculation formula.
    #[must_use]
    pub fn wind_tunnel(canopy_speed: f64) -> Self {
        WindProfileConfig {
            displacement: DisplacementModel::CanyonRelation,
            anchor: CanopyAnchor::Measured(canopy_speed),
            recirculation: RecirculationSpeed::HeightRatioScaled,
        }
    }

    /// Kerbside configuration: canyon displacement relation with computed
    /// canopy speed and the height-scaled recirculation formula.
    #[must_use]
    pub fn kerbside() -> Self {
        WindProfileConfig {
            displacement: DisplacementModel::CanyonRelation,
            anchor: CanopyAnchor::Computed,
            recirculation: RecirculationSpeed::HeightRatioScaled,
        }
    }
}
