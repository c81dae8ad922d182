//! Steady-state mass balance over the 15 boxes
//!
//! Each box's row in the system matrix encodes its net flux: outgoing
//! advection and dispersion to every neighbouring face minus incoming flux
//! from the neighbours. Advection contributes only in the direction the
//! flow actually moves - selected by indicator functions on the signed face
//! value (an upwind scheme) - while dispersion exchanges both ways
//! regardless of sign.
//!
//! Box ordering is row-major from the bottom-left: indices 0-4 are the
//! ground row, 5-9 the middle row, 10-14 the top row. The source vector
//! carries the area-normalized ground emissions and the background inflow
//! through the canyon top; a singular system is surfaced as an explicit
//! error, never as a degenerate zero solution.

use crate::error::ModelError;
use crate::flow::FlowField;
use crate::geometry::CanyonGeometry;
use nalgebra::{SMatrix, SVector};

/// Number of control volumes.
pub const BOX_COUNT: usize = 15;

/// 1 when the signed face value flows positive (rightward/upward), else 0.
#[inline]
fn is_positive(x: f64) -> f64 {
    if x > 0.0 {
        1.0
    } else {
        0.0
    }
}

/// 1 when the signed face value flows negative (leftward/downward), else 0.
#[inline]
fn is_negative(x: f64) -> f64 {
    if x < 0.0 {
        1.0
    } else {
        0.0
    }
}

/// Box index for 1-based row `r` and column `c`.
#[inline]
fn box_index(r: usize, c: usize) -> usize {
    (r - 1) * 5 + (c - 1)
}

/// Assemble the 15x15 coefficient matrix from a flow field.
///
/// Horizontal terms are scaled by the box aspect ratio `h_r / l_c` so every
/// equation balances flux per unit of ground footprint.
#[must_use]
pub fn assemble_matrix(geometry: &CanyonGeometry, field: &FlowField) -> SMatrix<f64, 15, 15> {
    let h = &geometry.rows.heights;
    let l = &geometry.columns.widths;
    let mut a = SMatrix::<f64, 15, 15>::zeros();

    for r in 1..=3 {
        for c in 1..=5 {
            let i = box_index(r, c);
            let ratio = h[r] / l[c];
            let mut diag = 0.0;

            // Left face (r, c): outflow leftward, inflow from the left box.
            if c > 1 {
                let adv = field.ua[r][c];
                let dis = field.ue[r][c];
                diag += ratio * (dis - is_negative(adv) * adv);
                a[(i, box_index(r, c - 1))] = ratio * (-is_positive(adv) * adv - dis);
            }

            // Right face (r, c+1).
            if c < 5 {
                let adv = field.ua[r][c + 1];
                let dis = field.ue[r][c + 1];
                diag += ratio * (is_positive(adv) * adv + dis);
                a[(i, box_index(r, c + 1))] = ratio * (is_negative(adv) * adv - dis);
            }

            // Bottom face (r, c): row 1 sits on the ground, no exchange.
            if r > 1 {
                let adv = field.wa[r][c];
                let dis = field.we[r][c];
                diag += dis - is_negative(adv) * adv;
                a[(i, box_index(r - 1, c))] = -is_positive(adv) * adv - dis;
            }

            // Top face (r+1, c): for the top row this is the canyon top,
            // which contributes to the diagonal but has no neighbour.
            {
                let adv = field.wa[r + 1][c];
                let dis = field.we[r + 1][c];
                diag += dis + is_positive(adv) * adv;
                if r < 3 {
                    a[(i, box_index(r + 1, c))] = is_negative(adv) * adv - dis;
                }
            }

            a[(i, i)] = diag;
        }
    }
    a
}

/// Assemble the source vector: ground-row emissions normalized by column
/// footprint, and background inflow where net canyon-top flow is inward.
#[must_use]
pub fn assemble_sources(
    geometry: &CanyonGeometry,
    field: &FlowField,
    column_emissions: &[f64; 6],
    background: f64,
) -> SVector<f64, 15> {
    let l = &geometry.columns.widths;
    let mut d = SVector::<f64, 15>::zeros();

    for c in 1..=5 {
        d[box_index(1, c)] = column_emissions[c] / l[c];
    }
    // Middle-row boxes receive nothing directly.
    for c in 1..=5 {
        let adv = field.wa[4][c];
        let dis = field.we[4][c];
        // Downward top advection carries background in; its negative sign
        // cancels against the inflow convention.
        d[box_index(3, c)] = (dis - is_negative(adv) * adv) * background;
    }
    d
}

/// Solve the steady-state balance for the 15 box concentrations.
///
/// # Errors
///
/// [`ModelError::SingularSystem`] when the matrix cannot be factorized -
/// historically the signature of a fully obstructed face that escaped the
/// upstream clamp.
pub fn solve(
    a: &SMatrix<f64, 15, 15>,
    d: &SVector<f64, 15>,
) -> Result<[f64; BOX_COUNT], ModelError> {
    let solution = a.lu().solve(d).ok_or(ModelError::SingularSystem)?;
    let mut out = [0.0; BOX_COUNT];
    for (slot, value) in out.iter_mut().zip(solution.iter()) {
        *slot = *value;
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flow::test_support::{open_street_section, resolve_forward, street_canyon_section};
    use crate::flow::{baseline, FlowField};
    use approx::assert_relative_eq;

    fn uniform_emissions() -> [f64; 6] {
        [0.0, 20.0, 20.0, 20.0, 20.0, 20.0]
    }

    #[test]
    fn test_indicators() {
        assert_eq!(is_positive(2.0), 1.0);
        assert_eq!(is_positive(-2.0), 0.0);
        assert_eq!(is_positive(0.0), 0.0);
        assert_eq!(is_negative(-2.0), 1.0);
        assert_eq!(is_negative(2.0), 0.0);
        assert_eq!(is_negative(0.0), 0.0);
    }

    #[test]
    fn test_street_canyon_solve_is_finite() {
        let (geometry, winds) = resolve_forward(&street_canyon_section());
        let field = baseline::assemble(&geometry, &winds);
        let a = assemble_matrix(&geometry, &field);
        let d = assemble_sources(&geometry, &field, &uniform_emissions(), 40.0);
        let c = solve(&a, &d).unwrap();
        for value in c {
            assert!(value.is_finite());
            assert!(value > 0.0, "concentrations stay positive: {value}");
        }
    }

    #[test]
    fn test_open_street_solve_is_finite() {
        let (geometry, winds) = resolve_forward(&open_street_section());
        let field = baseline::assemble(&geometry, &winds);
        let a = assemble_matrix(&geometry, &field);
        let d = assemble_sources(&geometry, &field, &uniform_emissions(), 40.0);
        let c = solve(&a, &d).unwrap();
        for value in c {
            assert!(value.is_finite());
        }
    }

    #[test]
    fn test_no_emissions_relaxes_to_background() {
        // With no sources, every box must settle at the background value:
        // transport in equals transport out at C = background.
        let (geometry, winds) = resolve_forward(&street_canyon_section());
        let field = baseline::assemble(&geometry, &winds);
        let a = assemble_matrix(&geometry, &field);
        let background = 40.0;
        let d = assemble_sources(&geometry, &field, &[0.0; 6], background);
        let c = solve(&a, &d).unwrap();
        for value in c {
            assert_relative_eq!(value, background, epsilon = 1e-8);
        }
    }

    #[test]
    fn test_empty_field_is_singular() {
        let (geometry, _) = resolve_forward(&street_canyon_section());
        let field = FlowField::zeros();
        let a = assemble_matrix(&geometry, &field);
        let d = SVector::<f64, 15>::zeros();
        assert_eq!(solve(&a, &d), Err(crate::error::ModelError::SingularSystem));
    }

    #[test]
    fn test_emissions_raise_ground_row_above_top_row() {
        let (geometry, winds) = resolve_forward(&street_canyon_section());
        let field = baseline::assemble(&geometry, &winds);
        let a = assemble_matrix(&geometry, &field);
        let d = assemble_sources(&geometry, &field, &uniform_emissions(), 40.0);
        let c = solve(&a, &d).unwrap();
        let ground_mean: f64 = c[0..5].iter().sum::<f64>() / 5.0;
        let top_mean: f64 = c[10..15].iter().sum::<f64>() / 5.0;
        assert!(ground_mean > top_mean);
    }
}
