//! Data used in tests.
use metfor::{Celsius, HectoPascal, Kelvin};
use optional::{some, Optioned};

/// Temperature of the analytic sounding at a pressure.
///
/// A stable lapse rate below 200 hPa and isothermal above.
pub fn temperature_at(p: f64) -> Kelvin {
    let p = p.max(200.0);
    Kelvin(303.15 * (p / 1000.0).powf(0.2))
}

/// Dew point depression of the analytic sounding, widening with height.
pub fn dew_point_depression_at(p: f64) -> f64 {
    8.0 + 20.0 * (1000.0 - p.min(1000.0)) / 900.0
}

/// A moist sounding with a surface at 1000 hPa and a top at 100 hPa, every 25 hPa.
pub fn synthetic_sounding() -> (
    Vec<Optioned<HectoPascal>>,
    Vec<Optioned<Celsius>>,
    Vec<Optioned<Celsius>>,
) {
    let ps: Vec<f64> = (0..=36).map(|i| 1000.0 - 25.0 * f64::from(i)).collect();

    let p = ps.iter().map(|&p| some(HectoPascal(p))).collect();
    let t = ps
        .iter()
        .map(|&p| some(Celsius::from(temperature_at(p))))
        .collect();
    let dp = ps
        .iter()
        .map(|&p| {
            let Kelvin(t) = temperature_at(p);
            some(Celsius::from(Kelvin(t - dew_point_depression_at(p))))
        })
        .collect();

    (p, t, dp)
}
