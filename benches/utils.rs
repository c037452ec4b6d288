use metfor::{Celsius, HectoPascal, Kelvin};
use optional::{some, Optioned};

pub type Columns = (
    Vec<Optioned<HectoPascal>>,
    Vec<Optioned<Celsius>>,
    Vec<Optioned<Celsius>>,
);

/// Soundings with a range of surface temperatures and moisture, every 10 hPa up to 100 hPa.
pub fn load_all_soundings() -> [Columns; 4] {
    [
        sounding(303.15, 8.0),
        sounding(298.15, 3.0),
        sounding(288.15, 12.0),
        sounding(308.15, 20.0),
    ]
}

fn sounding(sfc_t: f64, sfc_depression: f64) -> Columns {
    let ps: Vec<f64> = (0..=90).map(|i| 1000.0 - 10.0 * f64::from(i)).collect();
    let t = |p: f64| sfc_t * (p.max(200.0) / 1000.0).powf(0.2);
    let depression = |p: f64| sfc_depression + 20.0 * (1000.0 - p) / 900.0;

    (
        ps.iter().map(|&p| some(HectoPascal(p))).collect(),
        ps.iter()
            .map(|&p| some(Celsius::from(Kelvin(t(p)))))
            .collect(),
        ps.iter()
            .map(|&p| some(Celsius::from(Kelvin(t(p) - depression(p)))))
            .collect(),
    )
}
