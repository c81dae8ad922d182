//! Street Canyon Air Quality Core Library
//!
//! A reduced-order box model estimating how street-level pollutant
//! concentrations (NO2, PM2.5, or an inert tracer) respond to physical
//! barriers (hedges, walls, tree lines) placed in an urban street canyon.
//!
//! The canyon cross-section is discretized into a fixed 3x5 grid of control
//! volumes. For each wind scenario a staggered advection/dispersion flow
//! field is assigned from canyon geometry and an in-canyon wind profile, a
//! steady-state mass balance is assembled into a 15x15 linear system and
//! solved, and the directional solutions are combined using climatological
//! sector frequencies.
//!
//! ## Pipeline
//!
//! Geometry -> Wind Profile & Emission Partition -> Flow Field ->
//! Mass Balance -> Solve -> Climatological Weighting

// Core types and inputs
pub mod core_types;

// Canyon discretization
pub mod geometry;

// In-canyon wind parameterization
pub mod wind;

// Staggered advection/dispersion fields
pub mod flow;

// Traffic emissions and zone partitioning
pub mod emissions;

// Mass-balance assembly and dense solve
pub mod solver;

// Scenario combination
pub mod weighting;

// Full assessment orchestration
pub mod model;

pub mod error;

// Re-export core types
pub use core_types::{
    Barrier, BarrierProfile, CrossSection, EmissionZones, ExistingBarrier, Pollutant,
    PollutantLoad, SectorClimatology, Span, WindObservation,
};

// Re-export model entry points
pub use error::{ColumnDimensioningError, ModelError, Orientation, RowDimensioningError};
pub use model::{
    nan_field, Assessment, PollutantAssessment, ScenarioConcentrations, WindProfileConfig,
};
pub use wind::{CanopyAnchor, DisplacementModel, RecirculationSpeed};
