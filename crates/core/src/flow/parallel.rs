//! Along-street wind fields
//!
//! When the wind runs along the canyon there is no cross-canyon advection
//! and no recirculation; transport across the section is dispersion only,
//! driven by the air-exchange rate at the canyon top. The exchange rate is
//! interpolated from a published curve against the canyon aspect ratio and
//! decays linearly towards the ground (80% in row 1, 90% in row 2, 100% at
//! roof level). Barriers reduce the exchange across their own face exactly
//! as inside a recirculation zone.

use super::barriers::dispersion_cut_if_pinned;
use super::FlowField;
use crate::geometry::{CanyonGeometry, EXISTING_DOWNWIND, EXISTING_UPWIND, NEW_DOWNWIND, NEW_UPWIND};

/// Canyon height-to-width ratios of the published exchange-rate curve.
const ASPECT_RATIO: [f64; 17] = [
    0.0502204452426217,
    0.0807971096600009,
    0.111328282401003,
    0.141943399449608,
    0.16935309231015,
    0.200935732866006,
    0.23447311340516,
    0.266150280242971,
    0.297194329907045,
    0.391626162624066,
    0.337397471774469,
    0.502105843133297,
    0.76832527822983,
    1.25624050192332,
    1.99819983763524,
    3.32185959693182,
    5.00031480959442,
];

/// Roof-level air-exchange velocities (m/s) matching [`ASPECT_RATIO`].
const EXCHANGE_VELOCITY: [f64; 17] = [
    0.0727961068441183,
    0.0752573152150254,
    0.0747908828010821,
    0.0713859261792966,
    0.0671476103112659,
    0.0624887278833297,
    0.0569894897229391,
    0.0514941384993315,
    0.0485291831213657,
    0.0425914984918686,
    0.0451405516340682,
    0.0396071084299885,
    0.0370191859199602,
    0.0335792468671289,
    0.0314072265928667,
    0.0283862993252278,
    0.0279074287135794,
];

/// Interpolate the roof-level exchange velocity at a canyon aspect ratio,
/// clamping to the curve's ends.
#[must_use]
pub fn exchange_velocity(aspect_ratio: f64) -> f64 {
    if aspect_ratio <= ASPECT_RATIO[0] {
        return EXCHANGE_VELOCITY[0];
    }
    let last = ASPECT_RATIO.len() - 1;
    if aspect_ratio >= ASPECT_RATIO[last] {
        return EXCHANGE_VELOCITY[last];
    }
    for i in 0..last {
        let (x0, x1) = (ASPECT_RATIO[i], ASPECT_RATIO[i + 1]);
        if (x0..=x1).contains(&aspect_ratio) {
            let t = (aspect_ratio - x0) / (x1 - x0);
            return EXCHANGE_VELOCITY[i] + t * (EXCHANGE_VELOCITY[i + 1] - EXCHANGE_VELOCITY[i]);
        }
    }
    EXCHANGE_VELOCITY[last]
}

/// Canyon aspect ratio: mean building height over street width.
#[must_use]
pub fn aspect_ratio(upwind_building: f64, downwind_building: f64, road_width: f64) -> f64 {
    ((upwind_building + downwind_building) / 2.0) / road_width
}

/// Dispersion-only field before the proposed barrier: the exchange profile
/// plus the existing barriers' face cuts.
#[must_use]
pub fn before_new_barrier(geometry: &CanyonGeometry, ach: f64) -> FlowField {
    let mut f = FlowField::zeros();

    for c in 2..=5 {
        f.ue[1][c] = ach * 0.8;
        f.ue[2][c] = ach * 0.9;
        f.ue[3][c] = ach;
    }
    for c in 1..=5 {
        f.we[2][c] = ach * 0.8;
        f.we[3][c] = ach * 0.9;
        f.we[4][c] = ach;
    }

    let layout = &geometry.layout;
    for slot in [EXISTING_UPWIND, EXISTING_DOWNWIND] {
        if layout.present[slot] {
            dispersion_cut_if_pinned(
                &mut f,
                &geometry.columns.cumulative,
                layout.positions[slot],
                geometry.obstructions[slot],
            );
        }
    }
    f
}

/// Dispersion-only field after the proposed barrier: a copy of the before
/// field with the new barrier's face cut layered on.
#[must_use]
pub fn with_new_barrier(before: &FlowField, geometry: &CanyonGeometry) -> FlowField {
    let mut f = *before;
    let layout = &geometry.layout;
    for slot in [NEW_UPWIND, NEW_DOWNWIND] {
        if layout.present[slot] {
            dispersion_cut_if_pinned(
                &mut f,
                &geometry.columns.cumulative,
                layout.positions[slot],
                geometry.obstructions[slot],
            );
        }
    }
    f
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_types::cross_section::{Barrier, BarrierProfile};
    use crate::flow::test_support::{resolve_forward, street_canyon_section};
    use approx::assert_relative_eq;

    #[test]
    fn test_exchange_velocity_endpoints_and_clamping() {
        assert_relative_eq!(exchange_velocity(0.0), EXCHANGE_VELOCITY[0]);
        assert_relative_eq!(exchange_velocity(ASPECT_RATIO[0]), EXCHANGE_VELOCITY[0]);
        assert_relative_eq!(exchange_velocity(10.0), EXCHANGE_VELOCITY[16]);
        // Exactly on an interior knot.
        assert_relative_eq!(exchange_velocity(ASPECT_RATIO[5]), EXCHANGE_VELOCITY[5]);
    }

    #[test]
    fn test_exchange_velocity_interpolates_between_knots() {
        let mid = (ASPECT_RATIO[2] + ASPECT_RATIO[3]) / 2.0;
        let expected = (EXCHANGE_VELOCITY[2] + EXCHANGE_VELOCITY[3]) / 2.0;
        assert_relative_eq!(exchange_velocity(mid), expected, epsilon = 1e-12);
    }

    #[test]
    fn test_aspect_ratio() {
        assert_relative_eq!(aspect_ratio(18.0, 18.0, 36.0), 0.5);
    }

    #[test]
    fn test_parallel_field_profile() {
        let (geometry, _) = resolve_forward(&street_canyon_section());
        let ach = exchange_velocity(0.5);
        let f = before_new_barrier(&geometry, ach);

        // No advection anywhere.
        assert_eq!(f.ua, FlowField::zeros().ua);
        assert_eq!(f.wa, FlowField::zeros().wa);
        // Linear decay of the exchange towards the ground.
        for c in 2..=5 {
            assert_relative_eq!(f.ue[1][c], ach * 0.8);
            assert_relative_eq!(f.ue[2][c], ach * 0.9);
            assert_relative_eq!(f.ue[3][c], ach);
        }
        for c in 1..=5 {
            assert_relative_eq!(f.we[4][c], ach);
        }
        // Wall faces carry nothing.
        for r in 0..5 {
            assert_eq!(f.ue[r][1], 0.0);
        }
    }

    #[test]
    fn test_new_barrier_cuts_parallel_exchange_at_its_face() {
        let mut section = street_canyon_section();
        section.new_barrier = Some(Barrier {
            position: 10.0,
            profile: BarrierProfile::Hedge { height: 2.0, obstruction: 0.75 },
        });
        let (geometry, _) = resolve_forward(&section);
        let ach = exchange_velocity(0.5);
        let before = before_new_barrier(&geometry, ach);
        let after = with_new_barrier(&before, &geometry);

        // The hedge pins the 10 m face (face 2 -> exchange column 3).
        assert_relative_eq!(after.ue[1][3], before.ue[1][3] * 0.25);
        // Everything else is untouched.
        assert_relative_eq!(after.ue[1][2], before.ue[1][2]);
        assert_eq!(after.we, before.we);
    }
}
