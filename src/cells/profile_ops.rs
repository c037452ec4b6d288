//! Cells that evaluate, reshape and summarize profiles.
use crate::{
    cell::Cell,
    cells::{pressure_input, scalar_output},
    error::Result,
    network::Ref,
    quantity::{Domain, Kind, Profile, Quantity, Scalar},
};
use itertools::Itertools;
use metfor::{HectoPascal, Quantity as _};
use std::cmp::Ordering;

/// The pressure weighted mean of a profile between two pressures.
///
/// The profile is integrated with the trapezoid rule over its present samples inside the layer,
/// plus interpolated values at each end. Returns `None` if either end cannot be interpolated.
pub fn layer_mean(profile: &Profile, bottom: HectoPascal, top: HectoPascal) -> Option<f64> {
    let (bottom, top) = if bottom >= top {
        (bottom, top)
    } else {
        (top, bottom)
    };

    let at_bottom = profile.value_at(bottom).into_option()?;
    if bottom == top {
        return Some(at_bottom);
    }
    let at_top = profile.value_at(top).into_option()?;

    let mut levels: Vec<(f64, f64)> = profile
        .samples()
        .filter(|(p, _)| *p < bottom && *p > top)
        .filter_map(|(p, v)| v.into_option().map(|v| (p.unpack(), v)))
        .collect();
    levels.push((bottom.unpack(), at_bottom));
    levels.push((top.unpack(), at_top));
    levels.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(Ordering::Equal));

    let integral: f64 = levels
        .iter()
        .tuple_windows()
        .map(|(below, above)| 0.5 * (below.1 + above.1) * (below.0 - above.0))
        .sum();

    Some(integral / (bottom - top).unpack())
}

/// Create a cell evaluating a profile of `kind` at a pressure.
pub fn evaluator(profile: Ref, pressure: Ref, kind: Kind) -> Result<Cell> {
    Cell::new(
        format!("{} at pressure", kind),
        &[profile, pressure],
        Quantity::Scalar(Scalar::missing(kind)),
        move |inputs: &[&Quantity]| -> Result<Quantity> {
            let profile = inputs[0].as_profile_of(kind)?;
            let p = pressure_input(inputs[1])?;

            Ok(scalar_output(kind, profile.value_at(p).into_option()))
        },
    )
}

/// Create a cell extracting the pressure domain of a profile.
pub fn domain_extractor(profile: Ref) -> Result<Cell> {
    Cell::new(
        "domain",
        &[profile],
        Quantity::Domain(None),
        |inputs: &[&Quantity]| -> Result<Quantity> {
            Ok(Quantity::Domain(inputs[0].as_profile()?.domain().cloned()))
        },
    )
}

/// Create a cell evaluating a profile of `kind` at every pressure of a domain.
pub fn domain_evaluator(profile: Ref, domain: Ref, kind: Kind) -> Result<Cell> {
    Cell::new(
        format!("{} on domain", kind),
        &[profile, domain],
        Quantity::Profile(Profile::missing(kind)),
        move |inputs: &[&Quantity]| -> Result<Quantity> {
            let profile = inputs[0].as_profile_of(kind)?;

            Ok(match inputs[1].as_domain()? {
                Some(domain) => profile.resample(domain),
                None => Profile::missing(kind),
            }
            .into())
        },
    )
}

/// Create a cell joining two profiles of `kind` that meet at a shared pressure.
///
/// If one of them is missing the output is the other one.
pub fn combiner(first: Ref, second: Ref, kind: Kind) -> Result<Cell> {
    let cell = Cell::new(
        format!("combined {}", kind),
        &[first, second],
        Quantity::Profile(Profile::missing(kind)),
        move |inputs: &[&Quantity]| -> Result<Quantity> {
            let first = inputs[0].as_profile_of(kind)?;
            let second = inputs[1].as_profile_of(kind)?;

            let combined = match (first.is_missing(), second.is_missing()) {
                (true, true) => Profile::missing(kind),
                (false, true) => first.clone(),
                (true, false) => second.clone(),
                (false, false) => first.concatenate(second)?,
            };

            Ok(combined.into())
        },
    )?;

    Ok(cell.optional_from(0))
}

/// Create a cell removing the missing samples of a profile of `kind`.
pub fn cleaner(profile: Ref, kind: Kind) -> Result<Cell> {
    Cell::new(
        format!("clean {}", kind),
        &[profile],
        Quantity::Profile(Profile::missing(kind)),
        move |inputs: &[&Quantity]| -> Result<Quantity> {
            Ok(inputs[0].as_profile_of(kind)?.retain_present().into())
        },
    )
}

/// Create a cell finding the highest pressure of any profile.
pub fn max_pressure(profile: Ref) -> Result<Cell> {
    Cell::new(
        "max pressure",
        &[profile],
        Quantity::Scalar(Scalar::missing(Kind::AirPressure)),
        |inputs: &[&Quantity]| -> Result<Quantity> {
            let bottom = inputs[0].as_profile()?.domain().map(Domain::bottom);
            Ok(scalar_output(Kind::AirPressure, bottom.map(|p| p.unpack())))
        },
    )
}

/// Create a cell computing the pressure weighted mean of a profile of `kind` between two
/// pressures. The output is a scalar of the same kind.
pub fn layer_mean_cell(profile: Ref, bottom: Ref, top: Ref, kind: Kind) -> Result<Cell> {
    Cell::new(
        format!("layer mean {}", kind),
        &[profile, bottom, top],
        Quantity::Scalar(Scalar::missing(kind)),
        move |inputs: &[&Quantity]| -> Result<Quantity> {
            let profile = inputs[0].as_profile_of(kind)?;
            let bottom = pressure_input(inputs[1])?;
            let top = pressure_input(inputs[2])?;

            Ok(scalar_output(kind, layer_mean(profile, bottom, top)))
        },
    )
}

/// Create a cell computing the pressure half way between two pressures.
pub fn layer_mid_pressure(bottom: Ref, top: Ref) -> Result<Cell> {
    Cell::new(
        "layer mid pressure",
        &[bottom, top],
        Quantity::Scalar(Scalar::missing(Kind::AirPressure)),
        |inputs: &[&Quantity]| -> Result<Quantity> {
            let bottom = pressure_input(inputs[0])?;
            let top = pressure_input(inputs[1])?;

            Ok(Quantity::pressure(HectoPascal(
                0.5 * (bottom.unpack() + top.unpack()),
            )))
        },
    )
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{network::Network, utility::test_tools::approx_equal};
    use optional::{none, some};

    fn hpa(vals: &[f64]) -> Vec<HectoPascal> {
        vals.iter().copied().map(HectoPascal).collect()
    }

    fn temps() -> Profile {
        Profile::from_values(
            Kind::AirTemperature,
            hpa(&[1000.0, 900.0, 800.0]),
            vec![300.0, 290.0, 280.0],
        )
        .unwrap()
    }

    #[test]
    fn test_layer_mean() {
        let prof = temps();

        // Linear in pressure, so the mean is the value at the middle.
        let mean = layer_mean(&prof, HectoPascal(1000.0), HectoPascal(850.0)).unwrap();
        assert!(approx_equal(mean, 292.5, 1.0e-9));

        // Order of the ends does not matter.
        let mean = layer_mean(&prof, HectoPascal(850.0), HectoPascal(1000.0)).unwrap();
        assert!(approx_equal(mean, 292.5, 1.0e-9));

        let mean = layer_mean(&prof, HectoPascal(900.0), HectoPascal(900.0)).unwrap();
        assert!(approx_equal(mean, 290.0, 1.0e-9));

        assert!(layer_mean(&prof, HectoPascal(1050.0), HectoPascal(900.0)).is_none());
    }

    #[test]
    fn test_profile_cells() {
        let mut net = Network::new();
        let prof = net.source("t", temps().into());
        let p = net.source("p", Quantity::pressure(HectoPascal(950.0)));

        let at_p = net
            .add(evaluator(prof, p, Kind::AirTemperature).unwrap())
            .unwrap();
        let max_p = net.add(max_pressure(prof).unwrap()).unwrap();
        let mid = net.add(layer_mid_pressure(max_p, p).unwrap()).unwrap();
        let mean = net
            .add(layer_mean_cell(prof, max_p, p, Kind::AirTemperature).unwrap())
            .unwrap();
        net.configure().unwrap();

        assert!(approx_equal(net.value(at_p).unwrap().to_f64().unwrap(), 295.0, 1.0e-9));
        assert_eq!(
            net.value(max_p).unwrap().to_pressure(),
            Some(HectoPascal(1000.0))
        );
        assert_eq!(
            net.value(mid).unwrap().to_pressure(),
            Some(HectoPascal(975.0))
        );
        assert!(approx_equal(net.value(mean).unwrap().to_f64().unwrap(), 297.5, 1.0e-9));

        // Outside of the profile
        net.set(p, Quantity::pressure(HectoPascal(700.0))).unwrap();
        assert!(net.value(at_p).unwrap().is_missing());
    }

    #[test]
    fn test_domain_round_trip() {
        let mut net = Network::new();
        let coarse = Profile::from_values(
            Kind::AirTemperature,
            hpa(&[950.0, 850.0]),
            vec![1.0, 2.0],
        )
        .unwrap();
        let target = net.source("target", coarse.into());
        let prof = net.source("t", temps().into());

        let domain = net.add(domain_extractor(target).unwrap()).unwrap();
        let resampled = net
            .add(domain_evaluator(prof, domain, Kind::AirTemperature).unwrap())
            .unwrap();
        net.configure().unwrap();

        let resampled = net
            .value(resampled)
            .unwrap()
            .as_profile_of(Kind::AirTemperature)
            .unwrap();
        assert_eq!(resampled.pressures(), &hpa(&[950.0, 850.0])[..]);
        assert!(approx_equal(resampled.values()[0].unpack(), 295.0, 1.0e-9));
        assert!(approx_equal(resampled.values()[1].unpack(), 285.0, 1.0e-9));
    }

    #[test]
    fn test_combiner_and_cleaner() {
        let mut net = Network::new();
        let dry = Profile::from_values(Kind::AirTemperature, hpa(&[1000.0, 900.0]), vec![
            300.0, 291.0,
        ])
        .unwrap();
        let wet = Profile::new(
            Kind::AirTemperature,
            hpa(&[900.0, 800.0, 700.0]),
            vec![some(291.0), none(), some(280.0)],
        )
        .unwrap();

        let dry = net.source("dry", dry.into());
        let wet = net.source("wet", wet.into());
        let both = net
            .add(combiner(dry, wet, Kind::AirTemperature).unwrap())
            .unwrap();
        let clean = net
            .add(cleaner(both, Kind::AirTemperature).unwrap())
            .unwrap();
        net.configure().unwrap();

        let both_val = net.value(both).unwrap().as_profile().unwrap();
        assert_eq!(both_val.len(), 4);
        let clean_val = net.value(clean).unwrap().as_profile().unwrap();
        assert_eq!(clean_val.pressures(), &hpa(&[1000.0, 900.0, 700.0])[..]);

        // One side missing passes the other through.
        net.set(dry, Profile::missing(Kind::AirTemperature).into())
            .unwrap();
        assert_eq!(net.value(both).unwrap().as_profile().unwrap().len(), 3);
    }
}
