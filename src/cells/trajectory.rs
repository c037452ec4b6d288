//! Lift a parcel along a dry adiabat or a pseudo-adiabat.
//!
//! A lift is integrated in geometric pressure steps. The number of steps is chosen so that no step
//! drops the pressure by more than 5%, and each step asks a [`TemperatureCalculator`] for the
//! temperature at the new pressure.
use crate::{
    cell::Cell,
    cells::{pressure_input, temperature_input},
    error::{AnalysisError, Result},
    network::Ref,
    quantity::{Kind, Profile, Quantity},
};
use metfor::{HectoPascal, Kelvin, Quantity as _};
use optional::some;
use tracing::trace;

/// The smallest allowed ratio between consecutive pressures of a trajectory.
pub const MIN_STEP_RATIO: f64 = 0.95;

// Latent heat of vaporization of water at 0C (J/kg).
const LV: f64 = 2.501e6;

/// Computes the temperature of a lifted parcel at the end of one pressure step.
pub trait TemperatureCalculator {
    /// The temperature at `p1` of a parcel that was at `t0` at `p0`.
    fn next_temperature(&self, p0: HectoPascal, t0: Kelvin, p1: HectoPascal) -> Result<Kelvin>;
}

/// Unsaturated lifting, the potential temperature is conserved.
#[derive(Debug, Clone, Copy, Default)]
pub struct DryAdiabat;

impl TemperatureCalculator for DryAdiabat {
    fn next_temperature(&self, p0: HectoPascal, t0: Kelvin, p1: HectoPascal) -> Result<Kelvin> {
        let theta = metfor::potential_temperature(p0, t0);
        Ok(metfor::temperature_from_pot_temp(theta, p1))
    }
}

/// Saturated lifting with all condensate removed.
///
/// Each step is a predictor-corrector on the pseudo-adiabatic lapse rate: an Euler estimate of
/// the new temperature, then a step using the mean of the lapse rates at the old state and at the
/// estimate.
#[derive(Debug, Clone, Copy, Default)]
pub struct Pseudoadiabat;

impl Pseudoadiabat {
    /// The pseudo-adiabatic lapse rate, dT/dp in K/Pa.
    pub fn lapse_rate(p: HectoPascal, t: Kelvin) -> Result<f64> {
        let t_k = t.unpack();
        if t_k <= 0.0 || p.unpack() <= 0.0 {
            return Err(AnalysisError::InvalidInput(
                "non-positive pressure or temperature",
            ));
        }

        // Too cold for the vapor pressure fit means nothing is left to condense.
        let rs = metfor::mixing_ratio(t, p).unwrap_or(0.0);
        let density = p.unpack() * 100.0 / (metfor::Rd.unpack() * t_k);

        let numerator = (1.0 + LV * rs / (metfor::Rd.unpack() * t_k)) / density;
        let denominator = metfor::cpd.unpack() + LV * LV * rs * metfor::epsilon / (metfor::Rd.unpack() * t_k * t_k);

        Ok(numerator / denominator)
    }
}

impl TemperatureCalculator for Pseudoadiabat {
    fn next_temperature(&self, p0: HectoPascal, t0: Kelvin, p1: HectoPascal) -> Result<Kelvin> {
        let dp = (p1 - p0).unpack() * 100.0;

        let first = Pseudoadiabat::lapse_rate(p0, t0)?;
        let estimate = Kelvin(t0.unpack() + first * dp);
        let second = Pseudoadiabat::lapse_rate(p1, estimate)?;

        Ok(Kelvin(t0.unpack() + 0.5 * (first + second) * dp))
    }
}

/// The number of steps used to lift from `start` to `end`.
///
/// Both pressures must be positive and finite with `end` below `start`.
pub fn step_count(start: HectoPascal, end: HectoPascal) -> Result<usize> {
    let steps = ((end.unpack() / start.unpack()).ln() / MIN_STEP_RATIO.ln()).round();
    if !steps.is_finite() || steps < 0.0 || steps >= (u32::MAX as f64) {
        return Err(AnalysisError::InvalidInput("unusable lift pressures"));
    }

    Ok(1 + steps as usize)
}

fn usable_pressure(p: HectoPascal) -> bool {
    p.unpack().is_finite() && p.unpack() > 0.0
}

/// Lift a parcel from `(start_p, start_t)` to `end_p`.
///
/// Returns `None` unless `end_p` is strictly less than `start_p`. The first sample is the starting
/// state exactly and the last sample is at `end_p` exactly. Pressures that are not positive and
/// finite are an error.
pub fn lift<C>(
    calc: &C,
    start_p: HectoPascal,
    start_t: Kelvin,
    end_p: HectoPascal,
) -> Result<Option<Profile>>
where
    C: TemperatureCalculator + ?Sized,
{
    if !usable_pressure(start_p) || !usable_pressure(end_p) {
        return Err(AnalysisError::InvalidInput("lift pressures must be positive"));
    }

    if !(end_p < start_p) {
        return Ok(None);
    }

    let steps = step_count(start_p, end_p)?;
    let ratio = ((end_p.unpack() / start_p.unpack()).ln() / steps as f64).exp();
    trace!(steps, ratio, "lifting parcel");

    let mut pressures = Vec::with_capacity(steps + 1);
    let mut temperatures = Vec::with_capacity(steps + 1);
    pressures.push(start_p);
    temperatures.push(some(start_t.unpack()));

    let (mut p, mut t) = (start_p, start_t);
    for step in 1..=steps {
        let next_p = if step == steps {
            end_p
        } else {
            HectoPascal(p.unpack() * ratio)
        };

        t = calc.next_temperature(p, t, next_p)?;
        p = next_p;

        pressures.push(p);
        temperatures.push(some(t.unpack()));
    }

    Profile::new(Kind::AirTemperature, pressures, temperatures).map(Some)
}

/// Create a cell lifting a parcel along the path computed by `calc`.
///
/// Inputs are the starting pressure, the starting temperature and the target pressure. The output
/// is an `AirTemperature` profile.
pub fn trajectory<S, C>(
    name: S,
    calc: C,
    start_p: Ref,
    start_t: Ref,
    end_p: Ref,
) -> Result<Cell>
where
    S: Into<String>,
    C: TemperatureCalculator + 'static,
{
    Cell::new(
        name,
        &[start_p, start_t, end_p],
        Quantity::Profile(Profile::missing(Kind::AirTemperature)),
        move |inputs: &[&Quantity]| -> Result<Quantity> {
            let start_p = pressure_input(inputs[0])?;
            let start_t = temperature_input(inputs[1])?;
            let end_p = pressure_input(inputs[2])?;

            Ok(Quantity::Profile(
                lift(&calc, start_p, start_t, end_p)?
                    .unwrap_or_else(|| Profile::missing(Kind::AirTemperature)),
            ))
        },
    )
}

/// A dry adiabatic trajectory cell.
pub fn dry_trajectory(start_p: Ref, start_t: Ref, end_p: Ref) -> Result<Cell> {
    trajectory("dry trajectory", DryAdiabat, start_p, start_t, end_p)
}

/// A pseudo-adiabatic trajectory cell.
pub fn wet_trajectory(start_p: Ref, start_t: Ref, end_p: Ref) -> Result<Cell> {
    trajectory("wet trajectory", Pseudoadiabat, start_p, start_t, end_p)
}
