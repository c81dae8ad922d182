//! Emission partitioning
//!
//! Each traffic zone is a uniform line source across its extent; the share
//! a column receives is the linear overlap of the column interval with the
//! zone interval, normalized by zone width. The five per-column fractions
//! of a zone therefore sum to 1, and the summed per-column emission must
//! reproduce the total input rate - checked, not assumed.

pub mod factors;

use crate::core_types::cross_section::{EmissionZones, Span};
use crate::core_types::numeric::round4;
use crate::error::ModelError;

/// Per-column fractions of one zone's emission (indices 1..=5).
#[must_use]
pub fn partition_zone(cumulative: &[f64; 6], zone: Span) -> [f64; 6] {
    let width = zone.width();
    let mut fractions = [0.0; 6];
    if width <= 0.0 {
        return fractions;
    }
    for c in 1..=5 {
        let lo = cumulative[c - 1].max(zone.start);
        let hi = cumulative[c].min(zone.end);
        fractions[c] = (hi - lo).max(0.0) / width;
    }
    fractions
}

/// Per-column emission totals for up to two zones (indices 1..=5).
#[must_use]
pub fn column_emissions(
    cumulative: &[f64; 6],
    zones: &EmissionZones,
    primary_rate: f64,
    secondary_rate: f64,
) -> [f64; 6] {
    let primary = partition_zone(cumulative, zones.primary);
    let secondary = zones
        .secondary
        .map_or([0.0; 6], |zone| partition_zone(cumulative, zone));
    let mut totals = [0.0; 6];
    for c in 1..=5 {
        totals[c] = primary[c] * primary_rate + secondary[c] * secondary_rate;
    }
    totals
}

/// Emission zones reflected for the mirrored orientation: extents reflect
/// across the street and the zone roles swap so the primary zone stays
/// nearest the (new) upwind side.
#[must_use]
pub fn mirrored_zones(zones: &EmissionZones, road_width: f64) -> EmissionZones {
    match zones.secondary {
        Some(far) => EmissionZones::pair(
            Span::new(round4(road_width - far.end), round4(road_width - far.start)),
            Span::new(
                round4(road_width - zones.primary.end),
                round4(road_width - zones.primary.start),
            ),
        ),
        None => EmissionZones::single(Span::new(
            round4(road_width - zones.primary.end),
            round4(road_width - zones.primary.start),
        )),
    }
}

/// Verify that the partitioned emissions reproduce the input total.
///
/// Tolerance follows the integer-rounding policy of the reference data
/// (rates are order 1-100 ug/m/s).
///
/// # Errors
///
/// [`ModelError::EmissionPartitionMismatch`] when the sums disagree.
pub fn check_conservation(totals: &[f64; 6], input_total: f64) -> Result<(), ModelError> {
    let partitioned: f64 = totals[1..].iter().sum();
    if partitioned.round() == input_total.round() {
        Ok(())
    } else {
        Err(ModelError::EmissionPartitionMismatch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const CUMULATIVE: [f64; 6] = [0.0, 6.0, 10.0, 26.0, 30.0, 36.0];

    #[test]
    fn test_zone_fractions_sum_to_one() {
        let fractions = partition_zone(&CUMULATIVE, Span::new(10.0, 26.0));
        assert_relative_eq!(fractions[1..].iter().sum::<f64>(), 1.0, epsilon = 1e-12);
        // The zone coincides with column 3.
        assert_relative_eq!(fractions[3], 1.0);
        assert_relative_eq!(fractions[2], 0.0);
    }

    #[test]
    fn test_zone_straddling_columns() {
        let fractions = partition_zone(&CUMULATIVE, Span::new(8.0, 28.0));
        assert_relative_eq!(fractions[2], 2.0 / 20.0);
        assert_relative_eq!(fractions[3], 16.0 / 20.0);
        assert_relative_eq!(fractions[4], 2.0 / 20.0);
        assert_relative_eq!(fractions[1..].iter().sum::<f64>(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_degenerate_zone_contributes_nothing() {
        let fractions = partition_zone(&CUMULATIVE, Span::new(12.0, 12.0));
        assert_eq!(fractions, [0.0; 6]);
    }

    #[test]
    fn test_two_zone_totals_conserve() {
        let zones = EmissionZones::pair(Span::new(8.0, 16.0), Span::new(20.0, 28.0));
        let totals = column_emissions(&CUMULATIVE, &zones, 30.0, 12.0);
        assert_relative_eq!(totals[1..].iter().sum::<f64>(), 42.0, epsilon = 1e-9);
        check_conservation(&totals, 42.0).unwrap();
    }

    #[test]
    fn test_conservation_mismatch_detected() {
        let totals = [0.0, 10.0, 10.0, 10.0, 5.0, 5.0];
        assert_eq!(check_conservation(&totals, 42.0), Err(ModelError::EmissionPartitionMismatch));
    }

    #[test]
    fn test_mirrored_zones_reflect_and_swap() {
        let zones = EmissionZones::pair(Span::new(8.0, 16.0), Span::new(20.0, 28.0));
        let mirrored = mirrored_zones(&zones, 36.0);
        // The far zone becomes the near one under reflection.
        assert_relative_eq!(mirrored.primary.start, 8.0);
        assert_relative_eq!(mirrored.primary.end, 16.0);
        let secondary = mirrored.secondary.unwrap();
        assert_relative_eq!(secondary.start, 20.0);
        assert_relative_eq!(secondary.end, 28.0);

        // An asymmetric single zone reflects to the other side.
        let single = EmissionZones::single(Span::new(4.0, 10.0));
        let mirrored = mirrored_zones(&single, 36.0);
        assert_relative_eq!(mirrored.primary.start, 26.0);
        assert_relative_eq!(mirrored.primary.end, 32.0);
    }
}
