//! No-barrier baseline flow pattern
//!
//! Deterministic face assignments keyed on how many rows the upwind
//! building spans (2 or 3) and how many columns its wake fully covers.
//! Outside the wake, throughflow crosses the canyon and turns: downward
//! into the canyon at the wake's trailing edge, upward out of it at the
//! downwind wall. Inside the wake, a closed recirculating cell runs along
//! the wake top, drops at the trailing edge, returns along the ground and
//! rises at the upwind wall.
//!
//! Dispersion at each face is 10% of the local advection magnitude. The
//! canyon-top exchange is instead driven by the above-roof speed, and faces
//! bordering the wake get a reduced fixed value so the exchange across the
//! shear layer is not double-counted.

use super::FlowField;
use crate::geometry::CanyonGeometry;
use crate::wind::CanyonWinds;

/// Assemble the no-barrier baseline field for one scenario.
#[must_use]
pub fn assemble(geometry: &CanyonGeometry, winds: &CanyonWinds) -> FlowField {
    let mut f = FlowField::zeros();
    let h = &geometry.rows.heights;
    let l = &geometry.columns.widths;
    let rc = geometry.recirc_columns;
    let CanyonWinds { u1, u2, u3, uh, ur, ut } = *winds;

    // Flow outside the wake.
    if geometry.building_rows == 2 {
        if rc < 4 {
            if rc == 0 {
                f.wa[4][1] = -((u1 * h[1]) / l[1] + (u2 * h[2]) / l[1] + (u3 * h[3]) / l[1]);
            } else {
                f.wa[4][1] = -((u3 * h[3]) / l[1]);
                f.wa[4][rc + 1] = -((u1 * h[1]) / l[rc + 1] + (u2 * h[2]) / l[rc + 1]);
            }

            // Throughflow turns down into the canyon past the wake.
            f.wa[2][rc + 1] = -((u1 * h[1]) / l[rc + 1]);
            f.wa[3][rc + 1] = -((u2 * h[2]) / l[rc + 1] + f.wa[2][rc + 1].abs());

            f.we[4][1] = f.wa[4][1].abs() * 0.1;
            f.we[3][rc + 1] = f.wa[3][rc + 1].abs() * 0.1;
            f.we[2][rc + 1] = f.wa[2][rc + 1].abs() * 0.1;

            // Upward outflow at the downwind wall.
            f.wa[2][5] = (u1 * h[1]) / l[5];
            f.wa[3][5] = (u2 * h[2]) / l[5] + f.wa[2][5];
            f.wa[4][5] = (u3 * h[3]) / l[5] + f.wa[3][5];

            f.we[4][5] = f.wa[4][5].abs() * 0.1;
            f.we[3][5] = f.wa[3][5].abs() * 0.1;
            f.we[2][5] = f.wa[2][5].abs() * 0.1;

            // Vertical exchange between the down- and up-flow columns.
            if rc < 3 {
                for c in (rc + 2)..5 {
                    f.we[3][c] = (f.wa[3][rc + 1].abs() + f.wa[3][5].abs()) / 2.0 * 0.1;
                    f.we[2][c] = (f.wa[2][rc + 1].abs() + f.wa[2][5].abs()) / 2.0 * 0.1;
                }
            }

            // Canyon-top exchange above the covered rows.
            for c in 2..5 {
                f.we[4][c] = 0.1 * ut;
            }
            f.we[4][rc + 1] = f.wa[4][rc + 1].abs() * 0.1;

            for c in 2..=5 {
                f.ua[3][c] = u3;
            }
            for c in (rc + 2)..=5 {
                f.ua[2][c] = u2;
                f.ua[1][c] = u1;
            }

            for c in (rc + 2)..=5 {
                f.ue[1][c] = f.ua[1][c].abs() * 0.1;
                f.ue[2][c] = f.ua[2][c].abs() * 0.1;
            }
            for c in 0..6 {
                f.ue[3][c] = f.ua[3][c].abs() * 0.1;
            }
        } else {
            // Wake spans (almost) the whole street: only row 3 flows.
            f.wa[4][1] = -((u3 * h[3]) / l[1]);
            for c in 2..=5 {
                f.ua[3][c] = u3;
            }
            f.wa[4][5] = (u3 * h[3]) / l[5];

            for c in 0..6 {
                f.we[4][c] = 0.1 * ut;
            }
            f.we[4][1] = f.wa[4][1].abs() * 0.1;
            f.we[4][5] = f.wa[4][5].abs() * 0.1;

            for c in 2..=5 {
                f.ue[3][c] = f.ua[3][c].abs() * 0.1;
            }

            if rc == 4 {
                // Slack region under the outflow column.
                f.we[2][5] = f.wa[4][5].abs() * 0.1;
                f.we[3][5] = f.wa[4][5].abs() * 0.1;
            }
        }
    } else if rc < 4 {
        // Three-row building: inflow turns down through all rows.
        f.wa[2][rc + 1] = -((u1 * h[1]) / l[rc + 1]);
        f.wa[3][rc + 1] = -((u2 * h[2]) / l[rc + 1] + f.wa[2][rc + 1].abs());
        f.wa[4][rc + 1] = -((u3 * h[3]) / l[rc + 1] + f.wa[3][rc + 1].abs());

        f.we[4][rc + 1] = f.wa[4][rc + 1].abs() * 0.1;
        f.we[3][rc + 1] = f.wa[3][rc + 1].abs() * 0.1;
        f.we[2][rc + 1] = f.wa[2][rc + 1].abs() * 0.1;

        f.wa[2][5] = (u1 * h[1]) / l[5];
        f.wa[3][5] = (u2 * h[2]) / l[5] + f.wa[2][5];
        f.wa[4][5] = (u3 * h[3]) / l[5] + f.wa[3][5];

        f.we[2][5] = f.wa[2][5] * 0.1;
        f.we[3][5] = f.wa[3][5] * 0.1;
        f.we[4][5] = f.wa[4][5] * 0.1;

        if rc < 3 {
            for c in (rc + 2)..5 {
                f.we[4][c] = 0.1 * uh;
                f.we[3][c] = (f.we[3][rc + 1] + f.we[3][5]) / 2.0;
                f.we[2][c] = (f.we[2][rc + 1] + f.we[2][5]) / 2.0;
            }
        }

        for c in (rc + 2)..=5 {
            f.ua[3][c] = u3;
            f.ua[2][c] = u2;
            f.ua[1][c] = u1;
        }
        for c in (rc + 2)..=5 {
            f.ue[3][c] = f.ua[3][c].abs() * 0.1;
            f.ue[2][c] = f.ua[2][c].abs() * 0.1;
            f.ue[1][c] = f.ua[1][c].abs() * 0.1;
        }
    } else if rc == 4 {
        // No advective flow outside the wake; the last column only
        // exchanges with the air above.
        f.we[2][5] = 0.1 * uh;
        f.we[3][5] = 0.1 * uh;
        f.we[4][5] = 0.1 * uh;
    }

    // The recirculating cell itself.
    if geometry.building_rows == 2 {
        if rc >= 2 {
            for c in 2..=rc {
                f.ua[2][c] = ur;
            }
            f.wa[2][rc] = -((ur * h[2]) / l[rc]);
            for c in 2..=rc {
                f.ua[1][c] = -((f.wa[2][rc].abs() * l[rc]) / h[1]);
            }
            f.wa[2][1] = (f.ua[1][2].abs() * h[1]) / l[1];

            for c in 2..=rc {
                f.ue[2][c] = f.ua[2][c].abs() * 0.1;
                f.ue[1][c] = f.ua[1][c].abs() * 0.1;
            }

            f.we[2][1] = f.wa[2][1].abs() * 0.1;
            f.we[2][rc] = f.wa[2][rc].abs() * 0.1;
            for c in 2..rc {
                f.we[2][c] = (f.we[2][1] + f.we[2][rc]) / 2.0;
            }
        } else if rc == 1 {
            f.we[2][1] = 0.1 * ur;
        }
    } else if rc >= 2 {
        for c in 2..=rc {
            f.ua[3][c] = ur;
        }
        f.wa[3][rc] = -((ur * h[3]) / l[rc]);
        f.wa[2][rc] = f.wa[3][rc];
        for c in 2..=rc {
            f.ua[1][c] = -((f.wa[2][rc].abs() * l[rc]) / h[1]);
        }
        f.wa[2][1] = (f.ua[1][2].abs() * h[1]) / l[1];
        f.wa[3][1] = f.wa[2][1];

        for c in 2..=rc {
            f.ue[3][c] = f.ua[3][c].abs() * 0.1;
            f.ue[1][c] = f.ua[1][c].abs() * 0.1;
        }
        // Slack middle row: average of the active rows around it.
        for c in 2..=rc {
            f.ue[2][c] = (f.ue[3][c] + f.ue[1][c]) / 2.0;
        }

        for c in 1..=rc {
            f.we[2][c] = (f.wa[2][rc].abs() + f.wa[2][1].abs()) / 2.0 * 0.1;
            f.we[3][c] = (f.wa[3][rc].abs() + f.wa[3][1].abs()) / 2.0 * 0.1;
        }
        f.we[2][rc] = f.wa[2][rc].abs() * 0.1;
        f.we[3][rc] = f.wa[3][rc].abs() * 0.1;
        f.we[2][1] = f.wa[2][1].abs() * 0.1;
        f.we[3][1] = f.wa[3][1].abs() * 0.1;
    } else if rc == 1 {
        f.we[2][1] = 0.1 * ur;
        f.we[3][1] = 0.1 * ur;
    }

    // Reduced exchange across the wake boundary.
    let dis = 0.01 * uh;
    if rc > 0 && rc < 5 {
        if geometry.building_rows == 2 {
            f.ue[1][rc + 1] = dis;
            f.ue[2][rc + 1] = dis;
            for c in 1..=rc {
                f.we[3][c] = dis;
            }
        } else {
            f.ue[1][rc + 1] = dis;
            f.ue[2][rc + 1] = dis;
            f.ue[3][rc + 1] = dis;
            for c in 1..=rc {
                f.we[4][c] = dis;
            }
        }
    } else if rc == 5 {
        if geometry.building_rows == 2 {
            for c in 1..6 {
                f.we[3][c] = dis;
            }
        } else {
            for c in 1..6 {
                f.we[4][c] = dis;
            }
        }
    }

    apply_boundary_masks(&mut f);
    f
}

/// Zero the faces that never carry exchange: walls, ground, and above-roof
/// horizontal transport.
pub(crate) fn apply_boundary_masks(f: &mut FlowField) {
    for r in 0..5 {
        f.ue[r][0] = 0.0;
        f.ue[r][1] = 0.0; // upwind building wall
        f.we[r][0] = 0.0;
    }
    for c in 0..6 {
        f.ue[0][c] = 0.0; // within ground
        f.ue[4][c] = 0.0; // above street level
        f.we[0][c] = 0.0;
        f.we[1][c] = 0.0; // ground face
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flow::test_support::{open_street_section, resolve_forward, street_canyon_section};
    use approx::assert_relative_eq;

    #[test]
    fn test_street_canyon_is_single_recirculating_cell() {
        let (geometry, winds) = resolve_forward(&street_canyon_section());
        assert_eq!(geometry.recirc_columns, 5);
        assert_eq!(geometry.building_rows, 3);
        let f = assemble(&geometry, &winds);

        // Top row carries the recirculation speed rightward, the ground row
        // returns leftward.
        for c in 2..=5 {
            assert_relative_eq!(f.ua[3][c], winds.ur);
            assert!(f.ua[1][c] < 0.0);
        }
        // Downflow at the trailing edge, upflow at the upwind wall.
        assert!(f.wa[3][5] < 0.0);
        assert!(f.wa[2][1] > 0.0);
        // Canyon-top exchange reduced across the whole shear layer.
        for c in 1..6 {
            assert_relative_eq!(f.we[4][c], 0.01 * winds.uh);
        }
    }

    #[test]
    fn test_recirculating_cell_conserves_mass() {
        let (geometry, winds) = resolve_forward(&street_canyon_section());
        let f = assemble(&geometry, &winds);
        let h = &geometry.rows.heights;
        let l = &geometry.columns.widths;
        let rc = geometry.recirc_columns;

        // Flux along the wake top equals the drop at its trailing edge and
        // the return flow along the ground.
        let top_flux = f.ua[3][2] * h[3];
        let down_flux = f.wa[3][rc].abs() * l[rc];
        let return_flux = f.ua[1][2].abs() * h[1];
        let up_flux = f.wa[2][1] * l[1];
        assert_relative_eq!(top_flux, down_flux, epsilon = 1e-10);
        assert_relative_eq!(down_flux, return_flux, epsilon = 1e-10);
        assert_relative_eq!(return_flux, up_flux, epsilon = 1e-10);
    }

    #[test]
    fn test_open_street_has_throughflow_and_turning() {
        let (geometry, winds) = resolve_forward(&open_street_section());
        assert_eq!(geometry.building_rows, 2);
        let rc = geometry.recirc_columns;
        assert!(rc < 4);
        let f = assemble(&geometry, &winds);

        // Downward inflow just past the wake, upward outflow at the wall.
        assert!(f.wa[2][rc + 1] < 0.0);
        assert!(f.wa[3][rc + 1] < 0.0);
        assert!(f.wa[2][5] > 0.0);
        assert!(f.wa[4][5] > 0.0);
        // Throughflow in rows 1 and 2 beyond the wake.
        for c in (rc + 2)..=5 {
            assert_relative_eq!(f.ua[1][c], winds.u1);
            assert_relative_eq!(f.ua[2][c], winds.u2);
        }
        // Reduced dispersion on the wake edge.
        assert_relative_eq!(f.ue[1][rc + 1], 0.01 * winds.uh);
    }

    #[test]
    fn test_boundary_masks_hold() {
        let (geometry, winds) = resolve_forward(&open_street_section());
        let f = assemble(&geometry, &winds);
        for r in 0..5 {
            assert_eq!(f.ue[r][0], 0.0);
            assert_eq!(f.ue[r][1], 0.0);
            assert_eq!(f.we[r][0], 0.0);
        }
        for c in 0..6 {
            assert_eq!(f.ue[0][c], 0.0);
            assert_eq!(f.ue[4][c], 0.0);
            assert_eq!(f.we[0][c], 0.0);
            assert_eq!(f.we[1][c], 0.0);
        }
    }

    #[test]
    fn test_dispersion_tracks_advection_at_ten_percent() {
        let (geometry, winds) = resolve_forward(&open_street_section());
        let rc = geometry.recirc_columns;
        let f = assemble(&geometry, &winds);
        for c in (rc + 2)..=5 {
            assert_relative_eq!(f.ue[1][c], f.ua[1][c].abs() * 0.1);
            assert_relative_eq!(f.ue[2][c], f.ua[2][c].abs() * 0.1);
        }
        assert_relative_eq!(f.we[2][rc + 1], f.wa[2][rc + 1].abs() * 0.1);
    }
}
