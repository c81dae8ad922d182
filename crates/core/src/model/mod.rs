//! Full assessment orchestration
//!
//! One call runs the whole pipeline for a cross-section: resolve the
//! forward and mirrored geometries, build the wind profiles and the layered
//! flow fields, partition emissions, solve the six mass balances per
//! pollutant ({before, after} x {forward, mirrored, parallel on each
//! geometry}), difference them into percent changes and weight the
//! directional results with the climatological sector frequencies.
//!
//! Each invocation is synchronous and side-effect-free: it consumes one
//! [`CrossSection`] plus climatology and produces one [`Assessment`] or one
//! [`ModelError`]. Nothing persists across runs.

pub mod presets;

use crate::core_types::climatology::SectorClimatology;
use crate::core_types::cross_section::{CrossSection, EmissionZones};
use crate::core_types::pollutant::{Pollutant, PollutantLoad};
use crate::emissions;
use crate::error::{ModelError, Orientation};
use crate::flow::{baseline, barriers, parallel, FlowField};
use crate::geometry::{CanyonGeometry, OrientedLayout};
use crate::solver::{self, BOX_COUNT};
use crate::weighting::{self, WeightedField};
use crate::wind::{CanopyAnchor, CanyonWinds, DisplacementModel, RecirculationSpeed, WindProfile};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Wind-profile configuration for a model run.
///
/// The variants exist because two displacement-height relations and two
/// recirculation-speed formulas are in circulation for this model family;
/// see [`presets`] for the combinations used by the published case studies.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct WindProfileConfig {
    /// Displacement-height relation.
    pub displacement: DisplacementModel,
    /// Canopy-top speed anchor.
    pub anchor: CanopyAnchor,
    /// Recirculation-cell speed formula.
    pub recirculation: RecirculationSpeed,
}

/// Solved box concentrations for one scenario pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScenarioConcentrations {
    /// Concentrations with only the existing barriers (ug/m3).
    pub before: [f64; BOX_COUNT],
    /// Concentrations with the proposed barrier added (ug/m3).
    pub after: [f64; BOX_COUNT],
}

impl ScenarioConcentrations {
    /// Percent change per box, after relative to before.
    #[must_use]
    pub fn percent_change(&self) -> [f64; BOX_COUNT] {
        let mut out = [0.0; BOX_COUNT];
        for i in 0..BOX_COUNT {
            out[i] = (self.after[i] - self.before[i]) / self.before[i] * 100.0;
        }
        out
    }

    fn reflected(&self) -> Self {
        ScenarioConcentrations {
            before: weighting::reflect_boxes(&self.before),
            after: weighting::reflect_boxes(&self.after),
        }
    }
}

/// Results for one pollutant. Mirrored scenarios are reflected back onto
/// the forward orientation, so every field refers to the same physical
/// street positions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PollutantAssessment {
    /// Species.
    pub pollutant: Pollutant,
    /// Cross-canyon wind, forward orientation.
    pub forward: ScenarioConcentrations,
    /// Cross-canyon wind, mirrored orientation (reflected back).
    pub mirrored: ScenarioConcentrations,
    /// Along-street wind on the forward geometry.
    pub forward_parallel: ScenarioConcentrations,
    /// Along-street wind on the mirrored geometry (reflected back).
    pub mirrored_parallel: ScenarioConcentrations,
    /// Climatology-weighted percent change on the merged column grid.
    pub percent_change: WeightedField,
}

/// Output of a successful model run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assessment {
    /// Cumulative row boundaries of the forward grid, from the ground (m).
    pub row_edges: [f64; 4],
    /// Forward-grid column boundaries (m).
    pub forward_column_edges: [f64; 6],
    /// Per-pollutant results.
    pub pollutants: Vec<PollutantAssessment>,
}

/// The uniform 3x5 NaN shape returned to transport layers alongside any
/// error, so downstream consumers never mistake a failure for a zero field.
#[must_use]
pub fn nan_field() -> [[f64; 5]; 3] {
    [[f64::NAN; 5]; 3]
}

/// Everything derived for one wind orientation.
struct OrientedScenario {
    geometry: CanyonGeometry,
    with_existing: FlowField,
    with_new: FlowField,
    parallel_before: FlowField,
    parallel_after: FlowField,
    emission_zones: EmissionZones,
}

impl OrientedScenario {
    fn build(
        layout: &OrientedLayout,
        orientation: Orientation,
        background_speed: f64,
        zones: EmissionZones,
        config: &WindProfileConfig,
        exchange_velocity: f64,
    ) -> Result<Self, ModelError> {
        let geometry = CanyonGeometry::resolve(layout, orientation)?;

        let profile = WindProfile {
            background: background_speed,
            building_height: geometry.layout.upwind_building,
            road_width: geometry.layout.road_width,
            displacement: config.displacement,
            anchor: config.anchor,
        };
        let winds = CanyonWinds::evaluate(
            &profile,
            &geometry.rows.cumulative,
            geometry.layout.upwind_building.max(geometry.layout.downwind_building),
            geometry.building_rows,
            geometry.rows.heights[geometry.building_rows],
            config.recirculation,
        );
        debug!(?orientation, ?winds, "canyon wind speeds");

        let base = baseline::assemble(&geometry, &winds);
        let with_existing = barriers::with_existing_barriers(&base, &geometry);
        let with_new = barriers::with_new_barrier(&base, &geometry);
        let parallel_before = parallel::before_new_barrier(&geometry, exchange_velocity);
        let parallel_after = parallel::with_new_barrier(&parallel_before, &geometry);

        Ok(OrientedScenario {
            geometry,
            with_existing,
            with_new,
            parallel_before,
            parallel_after,
            emission_zones: zones,
        })
    }

    /// Solve before/after for one field pair and one pollutant.
    fn solve_pair(
        &self,
        before_field: &FlowField,
        after_field: &FlowField,
        column_emissions: &[f64; 6],
        background: f64,
    ) -> Result<ScenarioConcentrations, ModelError> {
        let a_before = solver::assemble_matrix(&self.geometry, before_field);
        let d_before =
            solver::assemble_sources(&self.geometry, before_field, column_emissions, background);
        let a_after = solver::assemble_matrix(&self.geometry, after_field);
        let d_after =
            solver::assemble_sources(&self.geometry, after_field, column_emissions, background);
        Ok(ScenarioConcentrations {
            before: solver::solve(&a_before, &d_before)?,
            after: solver::solve(&a_after, &d_after)?,
        })
    }
}

/// Run a complete assessment.
///
/// # Errors
///
/// The first geometry, emission or solver failure aborts the run; see
/// [`ModelError`] for the taxonomy. No numeric field accompanies an error
/// ([`nan_field`] provides the uniform placeholder shape).
pub fn run_assessment(
    section: &CrossSection,
    climatology: &SectorClimatology,
    pollutants: &[PollutantLoad],
    config: &WindProfileConfig,
) -> Result<Assessment, ModelError> {
    let forward_layout = OrientedLayout::forward(section);
    let mirrored_layout = forward_layout.mirrored();

    let exchange = parallel::exchange_velocity(parallel::aspect_ratio(
        forward_layout.upwind_building,
        forward_layout.downwind_building,
        forward_layout.road_width,
    ));

    let forward = OrientedScenario::build(
        &forward_layout,
        Orientation::Forward,
        climatology.left_to_right_speed,
        section.emission_zones,
        config,
        exchange,
    )?;
    let mirrored = OrientedScenario::build(
        &mirrored_layout,
        Orientation::Mirrored,
        climatology.right_to_left_speed,
        emissions::mirrored_zones(&section.emission_zones, forward_layout.road_width),
        config,
        exchange,
    )?;

    let mirrored_edges_reflected = weighting::reflect_boundaries(&mirrored.geometry.columns.widths);

    let mut results = Vec::with_capacity(pollutants.len());
    for load in pollutants {
        let forward_emissions = emissions::column_emissions(
            &forward.geometry.columns.cumulative,
            &forward.emission_zones,
            load.primary_emission,
            load.secondary_emission,
        );
        // The mirrored primary zone is the reflected far zone, so the zone
        // rates swap with it.
        let (mirror_primary, mirror_secondary) = if section.emission_zones.secondary.is_some() {
            (load.secondary_emission, load.primary_emission)
        } else {
            (load.primary_emission, 0.0)
        };
        let mirrored_emissions = emissions::column_emissions(
            &mirrored.geometry.columns.cumulative,
            &mirrored.emission_zones,
            mirror_primary,
            mirror_secondary,
        );
        emissions::check_conservation(&forward_emissions, load.total_emission())?;
        emissions::check_conservation(&mirrored_emissions, load.total_emission())?;

        let forward_cross = forward.solve_pair(
            &forward.with_existing,
            &forward.with_new,
            &forward_emissions,
            load.background,
        )?;
        let mirrored_cross = mirrored.solve_pair(
            &mirrored.with_existing,
            &mirrored.with_new,
            &mirrored_emissions,
            load.background,
        )?;
        let forward_parallel = forward.solve_pair(
            &forward.parallel_before,
            &forward.parallel_after,
            &forward_emissions,
            load.background,
        )?;
        let mirrored_parallel = mirrored.solve_pair(
            &mirrored.parallel_before,
            &mirrored.parallel_after,
            &mirrored_emissions,
            load.background,
        )?;

        let mirrored_cross = mirrored_cross.reflected();
        let mirrored_parallel = mirrored_parallel.reflected();

        let percent_change = weighting::combine(
            &forward.geometry.columns.cumulative,
            &mirrored_edges_reflected,
            &forward_cross.percent_change(),
            &forward_parallel.percent_change(),
            &mirrored_cross.percent_change(),
            &mirrored_parallel.percent_change(),
            climatology,
        );

        results.push(PollutantAssessment {
            pollutant: load.pollutant.clone(),
            forward: forward_cross,
            mirrored: mirrored_cross,
            forward_parallel,
            mirrored_parallel,
            percent_change,
        });
    }

    Ok(Assessment {
        row_edges: forward.geometry.rows.cumulative,
        forward_column_edges: forward.geometry.columns.cumulative,
        pollutants: results,
    })
}
