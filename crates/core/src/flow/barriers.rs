//! Barrier perturbations on the baseline flow field
//!
//! Two mechanisms, chosen by where a barrier stands relative to the upwind
//! building's wake:
//!
//! - **Outside the wake** the barrier intercepts a share of the ground-row
//!   throughflow proportional to its obstruction. That share is lifted over
//!   the barrier, carried along row 2 until the barrier's own wake
//!   reattaches, then returned to the ground - every intermediate face
//!   balance is preserved exactly.
//! - **Inside the wake** barriers do not slow the recirculating advection;
//!   they only cut the horizontal dispersion across their own face by
//!   `1 - obstruction`. A barrier sitting exactly on the wake boundary cuts
//!   the dispersion on that boundary face instead.
//!
//! The existing-barrier layer and the new-barrier layer each start from a
//! fresh copy of the baseline. The new-barrier layer additionally orders up
//! to three barriers along the canyon and runs a height cascade to decide
//! which one governs the advection perturbation; the rest contribute only
//! dispersion cuts.

use super::FlowField;
use crate::core_types::numeric::same_position;
use crate::geometry::{
    recirc_column_count, CanyonGeometry, EXISTING_DOWNWIND, EXISTING_UPWIND, NEW_DOWNWIND,
    NEW_UPWIND,
};

/// `a` strictly before `b` on the geometry grid.
fn before(a: f64, b: f64) -> bool {
    a < b && !same_position(a, b)
}

/// Column face a barrier position coincides with, if any.
fn face_at(position: f64, cumulative: &[f64; 6]) -> Option<usize> {
    (1..=4).find(|&k| same_position(position, cumulative[k]))
}

/// Mass-conserving perturbation for a barrier standing outside the wake at
/// column face `face`.
fn perturb_outside(
    f: &mut FlowField,
    geometry: &CanyonGeometry,
    obstruction: f64,
    face: usize,
    barrier_touchdown: f64,
) {
    let h = &geometry.rows.heights;
    let l = &geometry.columns.widths;

    // Share of the ground-row flow the barrier intercepts.
    let delta_u1 = obstruction * f.ua[1][face + 1];

    // Lift it over the barrier.
    let delta_up = (delta_u1 * h[1]) / l[face];
    f.wa[2][face] += delta_up;
    f.we[2][face] = f.wa[2][face].abs() * 0.1;

    // Carry it along row 2.
    let delta_u2 = (delta_up * l[face]) / h[2];

    let barrier_columns = recirc_column_count(barrier_touchdown, &geometry.columns.cumulative);
    if barrier_columns <= 3 {
        for c in (face + 1)..=(barrier_columns + 1) {
            f.ua[2][c] += delta_u2;
            f.ue[2][c] = f.ua[2][c].abs() * 0.1;
            f.ua[1][c] -= delta_u1;
            f.ue[1][c] = f.ua[1][c].abs() * 0.1;
        }

        // Return the carried share to the ground where the barrier wake
        // reattaches; flows downstream are back to pre-barrier values.
        let delta_down = (delta_u2 * h[2]) / l[barrier_columns + 1];
        f.wa[2][barrier_columns + 1] = -delta_down;
        f.we[2][barrier_columns + 1] = f.wa[2][barrier_columns + 1].abs() * 0.1;
    } else {
        // The barrier wake reaches the end wall: the carried share never
        // returns, so the wall upflow is reduced instead.
        for c in (face + 1)..=5 {
            f.ua[2][c] += delta_u2;
            f.ue[2][c] = f.ua[2][c].abs() * 0.1;
            f.ua[1][c] -= delta_u1;
            f.ue[1][c] = f.ua[1][c].abs() * 0.1;
        }
        let delta_wall = (delta_u1 * h[1]) / l[5];
        f.wa[2][5] -= delta_wall;
        f.we[2][5] = f.wa[2][5].abs() * 0.1;
    }
}

/// Dispersion-only treatment for a barrier inside the wake at `face`.
///
/// The recirculating advection is left unmodified by design; the
/// within-wake dispersion values are restated from the (unchanged) local
/// advection, and the barrier's own face loses `obstruction` of its
/// exchange.
fn perturb_inside(f: &mut FlowField, geometry: &CanyonGeometry, obstruction: f64, face: usize) {
    let rc = geometry.recirc_columns;

    if geometry.building_rows == 2 {
        for c in 2..=rc {
            f.ue[2][c] = f.ua[2][c].abs() * 0.1;
            f.ue[1][c] = f.ua[1][c].abs() * 0.1;
        }
        f.we[2][1] = f.wa[2][1].abs() * 0.1;
        f.we[2][rc] = f.wa[2][rc].abs() * 0.1;
        for c in 2..rc {
            f.we[2][c] = (f.we[2][1] + f.we[2][rc]) / 2.0;
        }
    } else {
        for c in 2..=rc {
            f.ue[3][c] = f.ua[3][c].abs() * 0.1;
            f.ue[1][c] = f.ua[1][c].abs() * 0.1;
        }
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
    }

    f.ue[1][face + 1] *= 1.0 - obstruction;
}

/// Apply the outside-wake perturbation if the barrier pins a column face.
fn outside_if_pinned(
    f: &mut FlowField,
    geometry: &CanyonGeometry,
    position: f64,
    obstruction: f64,
    touchdown: f64,
) {
    if let Some(face) = face_at(position, &geometry.columns.cumulative) {
        perturb_outside(f, geometry, obstruction, face, touchdown);
    }
}

/// Apply the inside-wake treatment if the barrier pins a column face.
fn inside_if_pinned(f: &mut FlowField, geometry: &CanyonGeometry, position: f64, obstruction: f64) {
    if let Some(face) = face_at(position, &geometry.columns.cumulative) {
        perturb_inside(f, geometry, obstruction, face);
    }
}

/// Cut only the dispersion across a barrier's face by `1 - obstruction`.
pub(crate) fn dispersion_cut_if_pinned(
    f: &mut FlowField,
    cumulative: &[f64; 6],
    position: f64,
    obstruction: f64,
) {
    if let Some(face) = face_at(position, cumulative) {
        f.ue[1][face + 1] *= 1.0 - obstruction;
    }
}

/// Layer the existing barriers onto a copy of the baseline field.
#[must_use]
pub fn with_existing_barriers(baseline: &FlowField, geometry: &CanyonGeometry) -> FlowField {
    let mut f = *baseline;
    let layout = &geometry.layout;
    let bar = layout.positions;
    let present = layout.present;
    let obs = geometry.obstructions;
    let rec = layout.touchdowns;
    let wake_edge = geometry.columns.cumulative[geometry.recirc_columns];

    // Outside the wake, in order of encounter.
    if present[EXISTING_UPWIND] && before(wake_edge, bar[EXISTING_UPWIND]) {
        outside_if_pinned(
            &mut f,
            geometry,
            bar[EXISTING_UPWIND],
            obs[EXISTING_UPWIND],
            rec[1],
        );
    }
    if present[EXISTING_DOWNWIND] && before(wake_edge, bar[EXISTING_DOWNWIND]) {
        outside_if_pinned(
            &mut f,
            geometry,
            bar[EXISTING_DOWNWIND],
            obs[EXISTING_DOWNWIND],
            rec[3],
        );
    }

    // Inside the wake. With both barriers covered, the taller one governs
    // the advection treatment and the shorter contributes only a dispersion
    // cut; ties go to the downwind barrier, which outgoing flow meets first.
    match (present[EXISTING_UPWIND], present[EXISTING_DOWNWIND]) {
        (true, false) => {
            if before(bar[EXISTING_UPWIND], wake_edge) {
                inside_if_pinned(&mut f, geometry, bar[EXISTING_UPWIND], obs[EXISTING_UPWIND]);
            }
        }
        (false, true) => {
            if before(bar[EXISTING_DOWNWIND], wake_edge) {
                inside_if_pinned(&mut f, geometry, bar[EXISTING_DOWNWIND], obs[EXISTING_DOWNWIND]);
            }
        }
        (true, true) => {
            if before(bar[EXISTING_UPWIND], wake_edge) && before(bar[EXISTING_DOWNWIND], wake_edge)
            {
                if layout.existing_upwind_height > layout.existing_downwind_height {
                    inside_if_pinned(&mut f, geometry, bar[EXISTING_UPWIND], obs[EXISTING_UPWIND]);
                    dispersion_cut_if_pinned(
                        &mut f,
                        &geometry.columns.cumulative,
                        bar[EXISTING_DOWNWIND],
                        obs[EXISTING_DOWNWIND],
                    );
                } else {
                    inside_if_pinned(
                        &mut f,
                        geometry,
                        bar[EXISTING_DOWNWIND],
                        obs[EXISTING_DOWNWIND],
                    );
                    dispersion_cut_if_pinned(
                        &mut f,
                        &geometry.columns.cumulative,
                        bar[EXISTING_UPWIND],
                        obs[EXISTING_UPWIND],
                    );
                }
            } else if before(bar[EXISTING_UPWIND], wake_edge)
                && before(wake_edge, bar[EXISTING_DOWNWIND])
            {
                inside_if_pinned(&mut f, geometry, bar[EXISTING_UPWIND], obs[EXISTING_UPWIND]);
            }
        }
        (false, false) => {}
    }

    // A barrier sitting exactly on the wake boundary cuts the exchange
    // across that boundary face.
    if same_position(wake_edge, bar[EXISTING_UPWIND]) && present[EXISTING_UPWIND] {
        f.ue[1][geometry.recirc_columns + 1] *= 1.0 - obs[EXISTING_UPWIND];
    } else if same_position(wake_edge, bar[EXISTING_DOWNWIND]) && present[EXISTING_DOWNWIND] {
        f.ue[1][geometry.recirc_columns + 1] *= 1.0 - obs[EXISTING_DOWNWIND];
    }

    f
}

/// Layer the proposed barrier (and the existing ones around it) onto a copy
/// of the baseline field.
#[must_use]
pub fn with_new_barrier(baseline: &FlowField, geometry: &CanyonGeometry) -> FlowField {
    let mut f = *baseline;
    let layout = &geometry.layout;
    let bar = layout.positions;
    let present = layout.present;
    let obs = geometry.obstructions;
    let rec = layout.touchdowns;
    let cumulative = geometry.columns.cumulative;
    let wake_edge = cumulative[geometry.recirc_columns];
    let crest = layout.new_crest();
    let up = layout.existing_upwind_height;
    let down = layout.existing_downwind_height;
    let downwind_boundary = layout.marks[3];

    // With all three present they sit in canyon order: existing-upwind, new,
    // existing-downwind. Treat each in turn when it stands beyond the wake.
    for slot in [EXISTING_UPWIND, NEW_UPWIND, NEW_DOWNWIND, EXISTING_DOWNWIND] {
        if present[slot] && before(wake_edge, bar[slot]) {
            outside_if_pinned(&mut f, geometry, bar[slot], obs[slot], rec[slot + 1]);
        }
    }

    let tallest = crest.max(up).max(down);

    // Treat the proposed barrier as governing: it takes the advection
    // treatment, existing barriers contribute dispersion cuts.
    let new_governs = |f: &mut FlowField| {
        let slot = if present[NEW_UPWIND] {
            NEW_UPWIND
        } else if present[NEW_DOWNWIND] {
            NEW_DOWNWIND
        } else {
            return;
        };
        inside_if_pinned(f, geometry, bar[slot], obs[slot]);
        dispersion_cut_if_pinned(f, &cumulative, bar[EXISTING_UPWIND], obs[EXISTING_UPWIND]);
        dispersion_cut_if_pinned(f, &cumulative, bar[EXISTING_DOWNWIND], obs[EXISTING_DOWNWIND]);
    };

    // Wake beyond the downwind street boundary: every barrier is covered.
    // The height cascade decides which one governs the advection treatment;
    // ties between the existing pair go to the downwind barrier, which the
    // outgoing flow meets first.
    if before(downwind_boundary, wake_edge) {
        if (crest == up && up == down) || crest == up.max(down) {
            // All equal, or the new barrier matches the tallest existing.
            new_governs(&mut f);
        } else if up == down && up > crest {
            inside_if_pinned(&mut f, geometry, bar[EXISTING_DOWNWIND], obs[EXISTING_DOWNWIND]);
            dispersion_cut_if_pinned(&mut f, &cumulative, bar[EXISTING_UPWIND], obs[EXISTING_UPWIND]);
            dispersion_cut_if_pinned(&mut f, &cumulative, bar[NEW_UPWIND], obs[NEW_UPWIND]);
            dispersion_cut_if_pinned(&mut f, &cumulative, bar[NEW_DOWNWIND], obs[NEW_DOWNWIND]);
        } else if up == tallest {
            inside_if_pinned(&mut f, geometry, bar[EXISTING_UPWIND], obs[EXISTING_UPWIND]);
            dispersion_cut_if_pinned(&mut f, &cumulative, bar[NEW_UPWIND], obs[NEW_UPWIND]);
            dispersion_cut_if_pinned(
                &mut f,
                &cumulative,
                bar[EXISTING_DOWNWIND],
                obs[EXISTING_DOWNWIND],
            );
            dispersion_cut_if_pinned(&mut f, &cumulative, bar[NEW_DOWNWIND], obs[NEW_DOWNWIND]);
        } else if down == tallest {
            inside_if_pinned(&mut f, geometry, bar[EXISTING_DOWNWIND], obs[EXISTING_DOWNWIND]);
            dispersion_cut_if_pinned(&mut f, &cumulative, bar[EXISTING_UPWIND], obs[EXISTING_UPWIND]);
            dispersion_cut_if_pinned(&mut f, &cumulative, bar[NEW_UPWIND], obs[NEW_UPWIND]);
            dispersion_cut_if_pinned(&mut f, &cumulative, bar[NEW_DOWNWIND], obs[NEW_DOWNWIND]);
        } else if crest == tallest {
            new_governs(&mut f);
        }
    }

    // Wake covers the upwind existing barrier and the new barrier placed
    // downwind, but not the downwind existing barrier.
    if present[NEW_DOWNWIND]
        && before(bar[NEW_DOWNWIND], wake_edge)
        && !before(downwind_boundary, wake_edge)
    {
        if up > crest {
            inside_if_pinned(&mut f, geometry, bar[EXISTING_UPWIND], obs[EXISTING_UPWIND]);
            dispersion_cut_if_pinned(&mut f, &cumulative, bar[NEW_DOWNWIND], obs[NEW_DOWNWIND]);
        } else {
            inside_if_pinned(&mut f, geometry, bar[NEW_DOWNWIND], obs[NEW_DOWNWIND]);
            dispersion_cut_if_pinned(&mut f, &cumulative, bar[EXISTING_UPWIND], obs[EXISTING_UPWIND]);
        }
    }

    // Same, with the new barrier placed upwind.
    if present[NEW_UPWIND]
        && before(bar[NEW_UPWIND], wake_edge)
        && !before(downwind_boundary, wake_edge)
    {
        if up > crest {
            inside_if_pinned(&mut f, geometry, bar[EXISTING_UPWIND], obs[EXISTING_UPWIND]);
            dispersion_cut_if_pinned(&mut f, &cumulative, bar[NEW_UPWIND], obs[NEW_UPWIND]);
        } else {
            inside_if_pinned(&mut f, geometry, bar[NEW_UPWIND], obs[NEW_UPWIND]);
            dispersion_cut_if_pinned(&mut f, &cumulative, bar[EXISTING_UPWIND], obs[EXISTING_UPWIND]);
        }
    }

    // Wake covers only the upwind existing barrier.
    if present[EXISTING_UPWIND]
        && before(bar[EXISTING_UPWIND], wake_edge)
        && ((present[NEW_UPWIND] && !before(bar[NEW_UPWIND], wake_edge))
            || (present[NEW_DOWNWIND] && !before(bar[NEW_DOWNWIND], wake_edge)))
    {
        inside_if_pinned(&mut f, geometry, bar[EXISTING_UPWIND], obs[EXISTING_UPWIND]);
    }

    // Barrier exactly on the wake boundary: cut the boundary face exchange.
    let boundary_slots = [EXISTING_UPWIND, NEW_UPWIND, NEW_DOWNWIND, EXISTING_DOWNWIND];
    for slot in boundary_slots {
        if present[slot] && same_position(wake_edge, bar[slot]) {
            f.ue[1][geometry.recirc_columns + 1] *= 1.0 - obs[slot];
            break;
        }
    }

    f
}
