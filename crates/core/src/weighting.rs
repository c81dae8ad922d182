//! Climatological combination of directional scenarios
//!
//! Mirrored solutions are computed on the reflected street, so before they
//! can be combined with the forward ones every mirrored field is reflected
//! back box-by-box (row-local left/right reversal) and the mirrored column
//! boundaries are re-expressed from the forward-street origin.
//!
//! Forward and mirrored geometries may legitimately disagree on column
//! boundaries when barriers sit asymmetrically. The combination therefore
//! works on the sorted union of both boundary sets: each union sub-interval
//! takes, from each geometry, the value of the column containing it, and
//! the four sector frequencies weight those values into one merged row.

use crate::core_types::climatology::SectorClimatology;
use crate::core_types::numeric::round4;
use crate::solver::BOX_COUNT;
use serde::{Deserialize, Serialize};

/// Reflect a solved 15-box field back onto the forward orientation.
#[must_use]
pub fn reflect_boxes(values: &[f64; BOX_COUNT]) -> [f64; BOX_COUNT] {
    let mut out = [0.0; BOX_COUNT];
    for row in 0..3 {
        for col in 0..5 {
            out[row * 5 + col] = values[row * 5 + (4 - col)];
        }
    }
    out
}

/// Re-express mirrored column boundaries from the forward-street origin.
///
/// The mirrored grid's widths are accumulated in reverse order so the
/// returned cumulative boundaries refer to the same physical positions as
/// the forward grid's.
#[must_use]
pub fn reflect_boundaries(widths: &[f64; 6]) -> [f64; 6] {
    let mut out = [0.0; 6];
    let mut running = 0.0;
    for (slot, k) in (1..=5).rev().enumerate() {
        running += widths[k];
        out[slot + 1] = round4(running);
    }
    out
}

/// Sorted union of two cumulative boundary sets.
#[must_use]
pub fn merged_boundaries(a: &[f64; 6], b: &[f64; 6]) -> Vec<f64> {
    let mut all: Vec<f64> = a.iter().chain(b.iter()).map(|&x| round4(x)).collect();
    all.sort_by(f64::total_cmp);
    all.dedup_by(|x, y| (*x - *y).abs() < 1e-6);
    all
}

/// One row of per-scenario values on its own column grid.
struct GeometryRow<'a> {
    boundaries: &'a [f64; 6],
    values: &'a [f64],
}

impl GeometryRow<'_> {
    /// Value of the column containing the sub-interval whose right edge is
    /// `edge`.
    fn value_at(&self, edge: f64) -> f64 {
        for c in 1..=5 {
            if edge <= self.boundaries[c] + 1e-6 {
                return self.values[c - 1];
            }
        }
        self.values[4]
    }
}

/// Frequency-weighted merge of the four directional scenarios.
///
/// All mirrored inputs must already be reflected back to the forward
/// orientation. Values are length-15 box fields; the result is row-major
/// over the union sub-intervals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightedField {
    /// Union column boundaries, starting at 0 (m).
    pub column_edges: Vec<f64>,
    /// Weighted values, row-major: `rows x (column_edges.len() - 1)`.
    pub values: Vec<f64>,
}

/// Combine the four scenario fields with their sector frequencies.
#[must_use]
pub fn combine(
    forward_boundaries: &[f64; 6],
    mirrored_boundaries: &[f64; 6],
    forward: &[f64; BOX_COUNT],
    forward_parallel: &[f64; BOX_COUNT],
    mirrored: &[f64; BOX_COUNT],
    mirrored_parallel: &[f64; BOX_COUNT],
    climatology: &SectorClimatology,
) -> WeightedField {
    let edges = merged_boundaries(forward_boundaries, mirrored_boundaries);
    let intervals = edges.len() - 1;

    let mut values = Vec::with_capacity(3 * intervals);
    for row in 0..3 {
        let fwd = GeometryRow {
            boundaries: forward_boundaries,
            values: &forward[row * 5..(row + 1) * 5],
        };
        let fwd_par = GeometryRow {
            boundaries: forward_boundaries,
            values: &forward_parallel[row * 5..(row + 1) * 5],
        };
        let mir = GeometryRow {
            boundaries: mirrored_boundaries,
            values: &mirrored[row * 5..(row + 1) * 5],
        };
        let mir_par = GeometryRow {
            boundaries: mirrored_boundaries,
            values: &mirrored_parallel[row * 5..(row + 1) * 5],
        };

        for interval in 0..intervals {
            let right_edge = edges[interval + 1];
            values.push(
                fwd.value_at(right_edge) * climatology.left_to_right_freq
                    + mir.value_at(right_edge) * climatology.right_to_left_freq
                    + fwd_par.value_at(right_edge) * climatology.parallel_forward_freq
                    + mir_par.value_at(right_edge) * climatology.parallel_mirrored_freq,
            );
        }
    }

    WeightedField { column_edges: edges, values }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn sectors(lr: f64, rl: f64, par: f64) -> SectorClimatology {
        SectorClimatology::from_sectors(4.0, 4.0, lr, rl, par, par)
    }

    #[test]
    fn test_reflect_boxes_reverses_each_row() {
        let mut field = [0.0; BOX_COUNT];
        for (i, v) in field.iter_mut().enumerate() {
            *v = i as f64;
        }
        let reflected = reflect_boxes(&field);
        assert_eq!(&reflected[0..5], &[4.0, 3.0, 2.0, 1.0, 0.0]);
        assert_eq!(&reflected[5..10], &[9.0, 8.0, 7.0, 6.0, 5.0]);
        assert_eq!(&reflected[10..15], &[14.0, 13.0, 12.0, 11.0, 10.0]);
        // Reflection is an involution.
        assert_eq!(reflect_boxes(&reflected), field);
    }

    #[test]
    fn test_reflect_boundaries() {
        let widths = [0.0, 5.0, 2.5, 7.5, 6.0, 4.0];
        let reflected = reflect_boundaries(&widths);
        assert_eq!(reflected, [0.0, 4.0, 10.0, 17.5, 20.0, 25.0]);
    }

    #[test]
    fn test_merged_boundaries_dedupes() {
        let a = [0.0, 5.0, 7.5, 15.0, 21.0, 25.0];
        let b = [0.0, 2.5, 7.5, 13.0, 15.0, 25.0];
        let merged = merged_boundaries(&a, &b);
        assert_eq!(merged, vec![0.0, 2.5, 5.0, 7.5, 13.0, 15.0, 21.0, 25.0]);
    }

    #[test]
    fn test_identical_boundaries_weight_exactly() {
        // Spec scenario: aligned grids, frequencies {0.5, 0.3, 0.1, 0.1} -
        // every aligned box is the exact weighted sum, no interpolation
        // artifact.
        let boundaries = [0.0, 6.0, 10.0, 26.0, 30.0, 36.0];
        let mut forward = [0.0; BOX_COUNT];
        let mut mirrored = [0.0; BOX_COUNT];
        let mut forward_par = [0.0; BOX_COUNT];
        let mut mirrored_par = [0.0; BOX_COUNT];
        for i in 0..BOX_COUNT {
            forward[i] = i as f64;
            mirrored[i] = 2.0 * i as f64;
            forward_par[i] = -(i as f64);
            mirrored_par[i] = 10.0;
        }
        let climatology = sectors(0.5, 0.3, 0.1);
        let merged = combine(
            &boundaries,
            &boundaries,
            &forward,
            &forward_par,
            &mirrored,
            &mirrored_par,
            &climatology,
        );
        assert_eq!(merged.column_edges.len(), 6);
        assert_eq!(merged.values.len(), 15);
        for i in 0..BOX_COUNT {
            let expected =
                0.5 * forward[i] + 0.3 * mirrored[i] + 0.1 * forward_par[i] + 0.1 * mirrored_par[i];
            assert_relative_eq!(merged.values[i], expected, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_differing_boundaries_resolve_sub_intervals() {
        let forward_bounds = [0.0, 10.0, 15.0, 20.0, 25.0, 30.0];
        let mirrored_bounds = [0.0, 5.0, 15.0, 20.0, 25.0, 30.0];
        let forward = [1.0; BOX_COUNT];
        let mut mirrored = [0.0; BOX_COUNT];
        // Mirrored row 1: first column 100, rest 0.
        mirrored[0] = 100.0;
        let climatology = sectors(0.5, 0.5, 0.0);
        let merged = combine(
            &forward_bounds,
            &mirrored_bounds,
            &forward,
            &forward,
            &mirrored,
            &mirrored,
            &climatology,
        );
        // Union edges: 0, 5, 10, 15, 20, 25, 30 -> 6 intervals per row.
        assert_eq!(merged.column_edges, vec![0.0, 5.0, 10.0, 15.0, 20.0, 25.0, 30.0]);
        // Interval [0,5): forward col 1 (1.0), mirrored col 1 (100.0).
        assert_relative_eq!(merged.values[0], 0.5 * 1.0 + 0.5 * 100.0);
        // Interval [5,10): forward col 1 (1.0), mirrored col 2 (0.0).
        assert_relative_eq!(merged.values[1], 0.5);
    }
}
