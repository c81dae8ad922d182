//! Fleet-average vehicle emission factors
//!
//! Converts an hourly traffic count into NO2 and PM2.5 line-source rates
//! using UK fleet-composition shares and published per-category emission
//! factors (fleet-weighted road transport factors, primary NO2 fractions,
//! combined hot and cold start emissions; PM2.5 includes exhaust, tyre
//! wear, brake wear and road abrasion). Used when a caller has traffic
//! counts but no measured emission rates.

/// Vehicle categories in fleet order: cars and taxis, LGVs, HGVs, buses and
/// coaches, motorcycles.
const FLEET_SHARE: [f64; 5] = [0.81, 0.15, 0.015, 0.015, 0.01];

/// NO2 emission factors (g/km per vehicle).
///
/// Cars average a 50:50 petrol/diesel split of NOx factor times primary-NO2
/// fraction; HGVs average rigid and articulated.
const NO2_FACTOR: [f64; 5] = [
    ((0.082 * 0.030) + (0.573 * 0.333)) / 2.0,
    1.241 * 0.327,
    ((1.400 * 0.096) + (0.693 * 0.081)) / 2.0,
    3.119 * 0.096,
    0.190 * 0.040,
];

/// PM2.5 emission factors (g/km per vehicle): exhaust + tyre + brake +
/// road abrasion.
const PM25_FACTOR: [f64; 5] = [
    ((0.001 + 0.011) / 2.0) + 0.005 + 0.003 + 0.004,
    0.018 + 0.008 + 0.004 + 0.004,
    ((0.020 + 0.012 + 0.010 + 0.021) + (0.013 + 0.024 + 0.007 + 0.021)) / 2.0,
    0.036 + 0.013 + 0.016 + 0.021,
    0.008 + 0.002 + 0.002 + 0.002,
];

/// Line-source rates for one emission zone.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineSourceRates {
    /// NO2 rate (ug/m/s).
    pub no2: f64,
    /// PM2.5 rate (ug/m/s).
    pub pm25: f64,
}

/// Fleet-average line-source rates for a traffic flow of `vehicles_per_hour`.
#[must_use]
pub fn rates_from_traffic(vehicles_per_hour: f64) -> LineSourceRates {
    let mut no2_g_km_hr = 0.0;
    let mut pm25_g_km_hr = 0.0;
    for category in 0..5 {
        let activity = vehicles_per_hour * FLEET_SHARE[category];
        no2_g_km_hr += NO2_FACTOR[category] * activity;
        pm25_g_km_hr += PM25_FACTOR[category] * activity;
    }
    // g/km/h -> ug/m/s: x1e6 for grams, /1e3 for the metre, /3600 for the
    // second.
    LineSourceRates { no2: no2_g_km_hr * 1e3 / 3600.0, pm25: pm25_g_km_hr * 1e3 / 3600.0 }
}
