//! Pollutant inputs
//!
//! The transport is linear in concentration, so the model treats every
//! species as an inert tracer; a pollutant is fully described by its
//! background concentration and the line-source emission rate of each
//! traffic zone.

use serde::{Deserialize, Serialize};

/// Species label carried through to the output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Pollutant {
    /// Nitrogen dioxide.
    No2,
    /// Fine particulate matter.
    Pm25,
    /// Any other inert tracer, identified by name.
    Tracer(String),
}

impl Pollutant {
    /// Display label.
    #[must_use]
    pub fn label(&self) -> &str {
        match self {
            Pollutant::No2 => "NO2",
            Pollutant::Pm25 => "PM2.5",
            Pollutant::Tracer(name) => name,
        }
    }
}

/// Per-pollutant model inputs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PollutantLoad {
    /// Species.
    pub pollutant: Pollutant,
    /// Background concentration above roof level (ug/m3).
    pub background: f64,
    /// Line-source emission rate of the primary zone (ug/m/s).
    pub primary_emission: f64,
    /// Line-source emission rate of the secondary zone (ug/m/s); zero when
    /// the street has a single zone.
    pub secondary_emission: f64,
}

impl PollutantLoad {
    /// Total emitted line-source rate across both zones (ug/m/s).
    #[must_use]
    pub fn total_emission(&self) -> f64 {
        self.primary_emission + self.secondary_emission
    }
}
