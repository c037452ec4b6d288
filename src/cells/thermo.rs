//! Point-wise thermodynamic formulas wrapped up as cells.
//!
//! Temperatures are kept in Kelvin, pressures in hPa, mixing ratios in kg/kg and densities in
//! kg/m^3. A formula that metfor cannot evaluate (for instance a dew point above the temperature)
//! gives a missing value rather than an error.
use crate::{
    cell::Cell,
    cells::{pressure_input, scalar_input, temperature_input},
    error::{AnalysisError, Result},
    network::Ref,
    quantity::{Family, Kind, Profile, Quantity, Scalar},
};
use itertools::izip;
use metfor::{Celsius, HectoPascal, Kelvin, Quantity as _};
use optional::{none, some};

/// Moisture used to compute a virtual temperature.
#[derive(Debug, Clone, Copy)]
pub enum Moisture<'a> {
    /// A dew point profile. A temperature profile stands in for a saturated parcel.
    DewPoint(&'a Profile),
    /// A constant water vapor mixing ratio (kg/kg).
    MixingRatio(f64),
}

/// Pressure of the LCL from Poisson's equation, the dry adiabat through `(pressure, temperature)`
/// reaches `lcl_temperature` there.
pub fn lcl_pressure(
    pressure: HectoPascal,
    temperature: Kelvin,
    lcl_temperature: Kelvin,
) -> HectoPascal {
    let ratio = lcl_temperature.unpack() / temperature.unpack();
    HectoPascal(pressure.unpack() * ratio.powf(metfor::cpd.unpack() / metfor::Rd.unpack()))
}

/// Temperature of the LCL for a parcel with a mixing ratio, pressure and temperature.
pub fn lcl_temperature(
    mixing_ratio: f64,
    pressure: HectoPascal,
    temperature: Kelvin,
) -> Option<Kelvin> {
    let dew_point = metfor::dew_point_from_p_and_mw(pressure, mixing_ratio)?;
    let dew_point = if Kelvin::from(dew_point) > temperature {
        Celsius::from(temperature)
    } else {
        dew_point
    };

    metfor::pressure_and_temperature_at_lcl(temperature, dew_point, pressure).map(|(_, t)| t)
}

/// The virtual temperature on the domain of a temperature profile.
pub fn virtual_temperature_profile(temperature: &Profile, moisture: Moisture<'_>) -> Profile {
    temperature.map_samples(Kind::VirtualTemperature, |p, t| {
        let t = Kelvin(t);
        let dew_point = match moisture {
            Moisture::DewPoint(dp) => Celsius::from(Kelvin(dp.value_at(p).into_option()?)),
            Moisture::MixingRatio(mw) => metfor::dew_point_from_p_and_mw(p, mw)?,
        };

        metfor::virtual_temperature(t, dew_point, p).map(|vt| vt.unpack())
    })
}

/// Air density from a virtual temperature profile.
pub fn density_profile(virtual_temperature: &Profile) -> Profile {
    virtual_temperature.map_samples(Kind::AirDensity, |p, tv| {
        Some(p.unpack() * 100.0 / (metfor::Rd.unpack() * tv))
    })
}

/// Buoyancy, the difference in massic volume between a parcel and its environment.
///
/// Both density profiles must be on the same domain.
pub fn buoyancy_profile(environment: &Profile, parcel: &Profile) -> Result<Profile> {
    if parcel.domain() != environment.domain() {
        return Err(AnalysisError::mismatch(
            "density profiles on the same domain",
            "density profiles on different domains",
        ));
    }

    let values = izip!(parcel.values(), environment.values())
        .map(|(rho_parcel, rho_env)| {
            match (rho_parcel.into_option(), rho_env.into_option()) {
                (Some(rho_parcel), Some(rho_env)) => some(1.0 / rho_parcel - 1.0 / rho_env),
                _ => none(),
            }
        })
        .collect();

    match parcel.domain() {
        Some(domain) => Profile::with_domain(Kind::MassicVolume, domain.clone(), values),
        None => Ok(Profile::missing(Kind::MassicVolume)),
    }
}

/// Create a cell computing the mixing ratio from a dew point and a pressure.
pub fn mixing_ratio(dew_point: Ref, pressure: Ref) -> Result<Cell> {
    Cell::new(
        "mixing ratio",
        &[dew_point, pressure],
        Quantity::Scalar(Scalar::missing(Kind::MixingRatio)),
        |inputs: &[&Quantity]| -> Result<Quantity> {
            let dew_point = temperature_input(inputs[0])?;
            let pressure = pressure_input(inputs[1])?;

            Ok(match metfor::mixing_ratio(dew_point, pressure) {
                Some(mw) => Quantity::scalar(Kind::MixingRatio, mw),
                None => Quantity::Scalar(Scalar::missing(Kind::MixingRatio)),
            })
        },
    )
}

/// Create a cell computing the mixing ratio profile from a dew point profile.
pub fn mixing_ratio_profile(dew_points: Ref) -> Result<Cell> {
    Cell::new(
        "mixing ratio profile",
        &[dew_points],
        Quantity::Profile(Profile::missing(Kind::MixingRatio)),
        |inputs: &[&Quantity]| -> Result<Quantity> {
            let dew_points = inputs[0].as_profile_in(Family::Temperature)?;

            Ok(dew_points
                .map_samples(Kind::MixingRatio, |p, dp| {
                    metfor::mixing_ratio(Kelvin(dp), p)
                })
                .into())
        },
    )
}

/// Create a cell computing the potential temperature profile from a temperature profile.
pub fn potential_temperature_profile(temperatures: Ref) -> Result<Cell> {
    Cell::new(
        "potential temperature profile",
        &[temperatures],
        Quantity::Profile(Profile::missing(Kind::PotentialTemperature)),
        |inputs: &[&Quantity]| -> Result<Quantity> {
            let temperatures = inputs[0].as_profile_of(Kind::AirTemperature)?;

            Ok(temperatures
                .map_samples(Kind::PotentialTemperature, |p, t| {
                    Some(metfor::potential_temperature(p, Kelvin(t)).unpack())
                })
                .into())
        },
    )
}

/// Create a cell computing the air temperature at a pressure from a potential temperature.
pub fn temperature_from_theta(pressure: Ref, theta: Ref) -> Result<Cell> {
    Cell::new(
        "temperature from theta",
        &[pressure, theta],
        Quantity::Scalar(Scalar::missing(Kind::AirTemperature)),
        |inputs: &[&Quantity]| -> Result<Quantity> {
            let pressure = pressure_input(inputs[0])?;
            let theta = temperature_input(inputs[1])?;

            Ok(Quantity::temperature(metfor::temperature_from_pot_temp(
                theta, pressure,
            )))
        },
    )
}

/// Create a cell computing the LCL temperature from a mixing ratio, pressure and temperature.
pub fn lcl_temperature_cell(mixing_ratio: Ref, pressure: Ref, temperature: Ref) -> Result<Cell> {
    Cell::new(
        "lcl temperature",
        &[mixing_ratio, pressure, temperature],
        Quantity::Scalar(Scalar::missing(Kind::AirTemperature)),
        |inputs: &[&Quantity]| -> Result<Quantity> {
            let mw = scalar_input(inputs[0], Kind::MixingRatio)?;
            let pressure = pressure_input(inputs[1])?;
            let temperature = temperature_input(inputs[2])?;

            Ok(match lcl_temperature(mw, pressure, temperature) {
                Some(t) => Quantity::temperature(t),
                None => Quantity::Scalar(Scalar::missing(Kind::AirTemperature)),
            })
        },
    )
}

/// Create a cell computing the LCL pressure from a pressure, temperature and LCL temperature.
pub fn lcl_pressure_cell(pressure: Ref, temperature: Ref, lcl_temperature: Ref) -> Result<Cell> {
    Cell::new(
        "lcl pressure",
        &[pressure, temperature, lcl_temperature],
        Quantity::Scalar(Scalar::missing(Kind::AirPressure)),
        |inputs: &[&Quantity]| -> Result<Quantity> {
            let pressure = pressure_input(inputs[0])?;
            let temperature = temperature_input(inputs[1])?;
            let lcl_t = temperature_input(inputs[2])?;

            Ok(Quantity::pressure(lcl_pressure(pressure, temperature, lcl_t)))
        },
    )
}

/// Create a cell computing a virtual temperature profile.
///
/// The first input is a temperature profile. The second is either a profile in the temperature
/// family, used as the dew point, or a `MixingRatio` scalar.
pub fn virtual_temperature_profile_cell(temperatures: Ref, moisture: Ref) -> Result<Cell> {
    Cell::new(
        "virtual temperature profile",
        &[temperatures, moisture],
        Quantity::Profile(Profile::missing(Kind::VirtualTemperature)),
        |inputs: &[&Quantity]| -> Result<Quantity> {
            let temperatures = inputs[0].as_profile_of(Kind::AirTemperature)?;
            let moisture = match inputs[1] {
                Quantity::Scalar(_) => {
                    Moisture::MixingRatio(scalar_input(inputs[1], Kind::MixingRatio)?)
                }
                other => Moisture::DewPoint(other.as_profile_in(Family::Temperature)?),
            };

            Ok(virtual_temperature_profile(temperatures, moisture).into())
        },
    )
}

/// Create a cell computing an air density profile from a virtual temperature profile.
pub fn air_density_profile(virtual_temperatures: Ref) -> Result<Cell> {
    Cell::new(
        "air density profile",
        &[virtual_temperatures],
        Quantity::Profile(Profile::missing(Kind::AirDensity)),
        |inputs: &[&Quantity]| -> Result<Quantity> {
            let tv = inputs[0].as_profile_of(Kind::VirtualTemperature)?;
            Ok(density_profile(tv).into())
        },
    )
}

/// Create a buoyancy cell from the environment and parcel density profiles.
pub fn buoyancy(environment: Ref, parcel: Ref) -> Result<Cell> {
    Cell::new(
        "buoyancy profile",
        &[environment, parcel],
        Quantity::Profile(Profile::missing(Kind::MassicVolume)),
        |inputs: &[&Quantity]| -> Result<Quantity> {
            let env = inputs[0].as_profile_of(Kind::AirDensity)?;
            let parcel = inputs[1].as_profile_of(Kind::AirDensity)?;
            buoyancy_profile(env, parcel).map(Quantity::Profile)
        },
    )
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{network::Network, utility::test_tools::approx_equal};
    use metfor::Quantity as _;

    fn hpa(vals: &[f64]) -> Vec<HectoPascal> {
        vals.iter().copied().map(HectoPascal).collect()
    }

    #[test]
    fn test_lcl_pressure_on_dry_adiabat() {
        let p = HectoPascal(1000.0);
        let t = Kelvin(300.0);
        let t_lcl = Kelvin(290.0);

        let p_lcl = lcl_pressure(p, t, t_lcl);
        assert!(p_lcl < p);

        let theta0 = metfor::potential_temperature(p, t).unpack();
        let theta1 = metfor::potential_temperature(p_lcl, t_lcl).unpack();
        assert!(approx_equal(theta0, theta1, 1.0e-6));
    }

    #[test]
    fn test_lcl_temperature() {
        let p = HectoPascal(1000.0);
        let t = Kelvin::from(Celsius(30.0));
        let mw = metfor::mixing_ratio(Celsius(20.0), p).unwrap();

        let t_lcl = lcl_temperature(mw, p, t).unwrap();
        assert!(t_lcl < Kelvin::from(Celsius(20.0)));
        assert!(t_lcl > Kelvin::from(Celsius(15.0)));

        // Saturated parcels are at their LCL.
        let mw = metfor::mixing_ratio(Celsius(30.0), p).unwrap();
        let t_lcl = lcl_temperature(mw, p, t).unwrap();
        assert!(approx_equal(t_lcl.unpack(), t.unpack(), 0.5));
    }

    #[test]
    fn test_virtual_temperature_is_warmer() {
        let temps = Profile::from_values(
            Kind::AirTemperature,
            hpa(&[1000.0, 900.0]),
            vec![300.0, 295.0],
        )
        .unwrap();

        let vt = virtual_temperature_profile(&temps, Moisture::MixingRatio(0.01));
        assert_eq!(vt.kind(), Kind::VirtualTemperature);
        for (t, tv) in temps.values().iter().zip(vt.values()) {
            assert!(tv.unpack() > t.unpack());
        }

        let saturated = virtual_temperature_profile(&temps, Moisture::DewPoint(&temps));
        for (t, tv) in temps.values().iter().zip(saturated.values()) {
            assert!(tv.unpack() > t.unpack());
        }
    }

    #[test]
    fn test_density_and_buoyancy() {
        let warm = Profile::from_values(
            Kind::VirtualTemperature,
            hpa(&[1000.0, 900.0]),
            vec![300.0, 295.0],
        )
        .unwrap();
        let cold = Profile::from_values(
            Kind::VirtualTemperature,
            hpa(&[1000.0, 900.0]),
            vec![295.0, 290.0],
        )
        .unwrap();

        let rho = density_profile(&warm);
        assert!(approx_equal(
            rho.values()[0].unpack(),
            100_000.0 / (metfor::Rd.unpack() * 300.0),
            1.0e-12
        ));

        let b = buoyancy_profile(&density_profile(&cold), &rho).unwrap();
        assert_eq!(b.kind(), Kind::MassicVolume);
        assert!(b.values().iter().all(|v| v.unpack() > 0.0));

        let other_domain = Profile::from_values(
            Kind::VirtualTemperature,
            hpa(&[950.0, 900.0]),
            vec![295.0, 290.0],
        )
        .unwrap();
        assert!(buoyancy_profile(&density_profile(&other_domain), &rho).is_err());
    }

    #[test]
    fn test_missing_in_missing_out() {
        let mut net = Network::new();
        let dp = net.source("dp", Quantity::Scalar(Scalar::missing(Kind::DewPoint)));
        let p = net.source("p", Quantity::pressure(HectoPascal(850.0)));
        let mw = net.add(mixing_ratio(dp, p).unwrap()).unwrap();
        net.configure().unwrap();
        assert!(net.value(mw).unwrap().is_missing());

        net.set(dp, Quantity::scalar(Kind::DewPoint, 280.0)).unwrap();
        let val = net.value(mw).unwrap().to_f64().unwrap();
        assert!(val > 0.0 && val < 0.02);
    }

    #[test]
    fn test_kind_is_checked() {
        let mut net = Network::new();
        let p = net.source("p", Quantity::pressure(HectoPascal(850.0)));
        let not_dp = net.source("not dp", Quantity::pressure(HectoPascal(850.0)));
        let mw = net.add(mixing_ratio(not_dp, p).unwrap()).unwrap();
        net.configure().unwrap();

        match net.failure(mw).unwrap() {
            Some(AnalysisError::DomainMismatch { .. }) => {}
            other => panic!("unexpected: {:?}", other),
        }
    }
}
