use metfor::{Celsius, HectoPascal, Kelvin};
use optional::{some, Optioned};
use sounding_network::AerologicalNetwork;

pub type Columns = (
    Vec<Optioned<HectoPascal>>,
    Vec<Optioned<Celsius>>,
    Vec<Optioned<Celsius>>,
);

#[allow(dead_code)]
pub fn approx_equal(val1: f64, val2: f64, eps: f64) -> bool {
    assert!(eps > 0.0);

    (val1 - val2).abs() < eps
}

/// Build columns every 25 hPa from 1000 to 100 hPa from analytic temperature and dew point
/// depression functions of pressure, both in Kelvin.
fn build<T, D>(temperature: T, depression: D) -> Columns
where
    T: Fn(f64) -> f64,
    D: Fn(f64) -> f64,
{
    let ps: Vec<f64> = (0..=36).map(|i| 1000.0 - 25.0 * f64::from(i)).collect();

    let p = ps.iter().map(|&p| some(HectoPascal(p))).collect();
    let t = ps
        .iter()
        .map(|&p| some(Celsius::from(Kelvin(temperature(p)))))
        .collect();
    let dp = ps
        .iter()
        .map(|&p| some(Celsius::from(Kelvin(temperature(p) - depression(p)))))
        .collect();

    (p, t, dp)
}

fn lapse(p: f64) -> f64 {
    303.15 * (p.max(200.0) / 1000.0).powf(0.2)
}

/// Warm and moist near the ground, unstable aloft.
#[allow(dead_code)]
pub fn moist() -> Columns {
    build(lapse, |p| 8.0 + 20.0 * (1000.0 - p) / 900.0)
}

/// Saturated at the surface.
#[allow(dead_code)]
pub fn saturated_surface() -> Columns {
    build(lapse, |p| 20.0 * (1000.0 - p) / 900.0)
}

/// Isothermal and dry, no parcel ever rises freely.
#[allow(dead_code)]
pub fn stable() -> Columns {
    build(|_| 280.0, |_| 25.0)
}

/// The moist sounding with a few missing temperatures and dew points.
#[allow(dead_code)]
pub fn gappy() -> Columns {
    let (p, mut t, mut dp) = moist();
    for i in &[3, 11, 20] {
        t[*i] = Optioned::default();
    }
    for i in &[5, 17] {
        dp[*i] = Optioned::default();
    }

    (p, t, dp)
}

/// A configured network loaded with a sounding, lifting to 100 hPa.
#[allow(dead_code)]
pub fn load_network(columns: &Columns) -> AerologicalNetwork {
    let (p, t, dp) = columns;

    let mut anal = AerologicalNetwork::new().unwrap();
    anal.set_minimum_pressure(HectoPascal(100.0)).unwrap();
    anal.set_reference_pressure(HectoPascal(900.0)).unwrap();
    anal.set_reference_temperature(Celsius(26.0)).unwrap();
    anal.set_sounding(p, t, dp).unwrap();

    anal
}

/// Generate a module checking the relations every parcel mode must satisfy for a sounding.
#[allow(unused_macros)]
macro_rules! test_sounding {
    ($test_mod_name:ident, $columns:expr) => {
        mod $test_mod_name {
            use super::utils;
            use metfor::Quantity as _;
            use sounding_network::{AerologicalNetwork, ParcelMode};
            use strum::IntoEnumIterator;

            fn load(mode: ParcelMode) -> AerologicalNetwork {
                let mut anal = utils::load_network(&$columns);
                anal.set_parcel_mode(mode).unwrap();
                anal
            }

            #[test]
            fn lcl_at_or_above_parcel() {
                for mode in ParcelMode::iter() {
                    let anal = load(mode);
                    if let (Some(start), Some(lcl)) = (anal.parcel_pressure(), anal.lcl_pressure())
                    {
                        assert!(lcl <= start, "{}", mode);
                    }
                }
            }

            #[test]
            fn lfc_below_lnb() {
                for mode in ParcelMode::iter() {
                    let anal = load(mode);
                    if let (Some(lfc), Some(lnb)) = (anal.lfc(), anal.lnb()) {
                        assert!(lfc > lnb, "{}", mode);
                    }
                }
            }

            #[test]
            fn energy_signs() {
                for mode in ParcelMode::iter() {
                    let anal = load(mode);
                    if let Some(cape) = anal.cape() {
                        assert!(cape.unpack() >= 0.0, "{}", mode);
                    }
                    if let Some(cin) = anal.cin() {
                        assert!(cin.unpack().is_finite(), "{}", mode);
                    }
                }
            }

            #[test]
            fn buoyancy_starts_at_parcel() {
                for mode in ParcelMode::iter() {
                    let anal = load(mode);
                    if let (Some(start), Some(buoyancy)) =
                        (anal.parcel_pressure(), anal.buoyancy())
                    {
                        let bottom = buoyancy.domain().unwrap().bottom();
                        assert!(bottom <= start, "{}", mode);
                        assert!(buoyancy.values().iter().all(|b| b.is_some()));
                    }
                }
            }

            #[test]
            fn nothing_failed() {
                for mode in ParcelMode::iter() {
                    let anal = load(mode);
                    let net = anal.network();
                    for r in net.refs() {
                        assert!(net.failure(r).unwrap().is_none(), "{} {}", mode, r);
                    }
                }
            }
        }
    };
}
