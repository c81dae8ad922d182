//! Wind climatology reduction
//!
//! The model needs exactly four directional scenarios: cross-canyon flow in
//! each direction and along-canyon ("parallel") flow, aligned and opposed.
//! [`SectorClimatology::from_observations`] reduces a wind rose - a set of
//! `(direction, speed, fractional occurrence)` observations for one
//! representative site - to those four sectors for a street of a given
//! orientation.
//!
//! Observations are first rotated so the street points north. Directions
//! within 45 degrees of the cross-street perpendicular (270 degrees for
//! left-to-right, 90 degrees for right-to-left) belong to the corresponding
//! cross-canyon sector; everything else is along-street. Each cross-canyon
//! sector's representative speed is the occurrence-weighted mean of the
//! perpendicular (cosine-projected) component of its member observations.

use serde::{Deserialize, Serialize};

/// One wind-rose entry for the representative site.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WindObservation {
    /// Direction the wind blows from (degrees, meteorological convention).
    pub direction_deg: f64,
    /// Mean speed for this direction bin (m/s).
    pub speed: f64,
    /// Fraction of the time this bin occurs.
    pub fractional_occurrence: f64,
}

/// Four mutually exclusive, together-exhaustive wind sectors.
///
/// Invariant: the four frequencies sum to 1 (within tolerance). The two
/// parallel sub-sectors pool the along-street remainder and split it evenly.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SectorClimatology {
    /// Occurrence-weighted cross-canyon speed, left to right (m/s).
    pub left_to_right_speed: f64,
    /// Occurrence-weighted cross-canyon speed, right to left (m/s).
    pub right_to_left_speed: f64,
    /// Fraction of time the wind crosses left to right.
    pub left_to_right_freq: f64,
    /// Fraction of time the wind crosses right to left.
    pub right_to_left_freq: f64,
    /// Fraction of time the wind runs along the street, aligned.
    pub parallel_forward_freq: f64,
    /// Fraction of time the wind runs along the street, opposed.
    pub parallel_mirrored_freq: f64,
}

impl SectorClimatology {
    /// Half-width of a cross-canyon sector around the perpendicular (degrees).
    const SECTOR_HALF_WIDTH: f64 = 45.0;

    /// Reduce a wind rose to the four directional sectors for a street
    /// pointing in `street_direction_deg`.
    ///
    /// Observations with direction exactly 0 are treated as calm/parallel
    /// and contribute only to the parallel remainder.
    #[must_use]
    pub fn from_observations(observations: &[WindObservation], street_direction_deg: f64) -> Self {
        let mut lr_freq = 0.0;
        let mut rl_freq = 0.0;
        let mut lr_weighted = 0.0;
        let mut rl_weighted = 0.0;

        for obs in observations {
            if obs.direction_deg == 0.0 {
                continue;
            }
            let relative = rotate_to_street(obs.direction_deg, street_direction_deg);

            let lr_difference = (270.0 - relative).abs();
            if lr_difference <= Self::SECTOR_HALF_WIDTH {
                lr_freq += obs.fractional_occurrence;
                lr_weighted +=
                    obs.fractional_occurrence * lr_difference.to_radians().cos() * obs.speed;
            }

            let rl_difference = (90.0 - relative).abs();
            if rl_difference <= Self::SECTOR_HALF_WIDTH {
                rl_freq += obs.fractional_occurrence;
                rl_weighted +=
                    obs.fractional_occurrence * rl_difference.to_radians().cos() * obs.speed;
            }
        }

        let parallel = (1.0 - lr_freq - rl_freq) / 2.0;
        SectorClimatology {
            left_to_right_speed: if lr_freq > 0.0 { lr_weighted / lr_freq } else { 0.0 },
            right_to_left_speed: if rl_freq > 0.0 { rl_weighted / rl_freq } else { 0.0 },
            left_to_right_freq: lr_freq,
            right_to_left_freq: rl_freq,
            parallel_forward_freq: parallel,
            parallel_mirrored_freq: parallel,
        }
    }

    /// Build a climatology directly from pre-derived sector values.
    #[must_use]
    pub fn from_sectors(
        left_to_right_speed: f64,
        right_to_left_speed: f64,
        left_to_right_freq: f64,
        right_to_left_freq: f64,
        parallel_forward_freq: f64,
        parallel_mirrored_freq: f64,
    ) -> Self {
        SectorClimatology {
            left_to_right_speed,
            right_to_left_speed,
            left_to_right_freq,
            right_to_left_freq,
            parallel_forward_freq,
            parallel_mirrored_freq,
        }
    }

    /// Sum of the four sector frequencies; 1 within tolerance for any valid
    /// climatology.
    #[must_use]
    pub fn total_frequency(&self) -> f64 {
        self.left_to_right_freq
            + self.right_to_left_freq
            + self.parallel_forward_freq
            + self.parallel_mirrored_freq
    }
}

/// Rotate a wind direction into street-relative coordinates (street pointing
/// north), wrapping into `[0, 360)`.
fn rotate_to_street(wind_direction_deg: f64, street_direction_deg: f64) -> f64 {
    let angle = wind_direction_deg - street_direction_deg;
    if angle >= 360.0 {
        angle - 360.0
    } else if angle < 0.0 {
        angle + 360.0
    } else {
        angle
    }
}
