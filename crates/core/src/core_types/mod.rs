//! Input data model and shared numeric conventions

pub mod climatology;
pub mod cross_section;
pub mod numeric;
pub mod pollutant;

pub use climatology::{SectorClimatology, WindObservation};
pub use cross_section::{Barrier, BarrierProfile, CrossSection, EmissionZones, ExistingBarrier, Span};
pub use pollutant::{Pollutant, PollutantLoad};
