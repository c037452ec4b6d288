//! Energy profiles, CAPE and CIN.
//!
//! The energy profile is the trapezoidal integral of buoyancy (m^3/kg) over pressure (Pa), starting
//! at zero at the top of the profile and accumulating downward. The energy between two levels is
//! then the difference of the profile evaluated at each level.
use crate::{
    cell::Cell,
    cells::pressure_input,
    error::Result,
    network::Ref,
    quantity::{Kind, Orientation, Profile, Quantity, Scalar},
};
use itertools::Itertools;
use metfor::{HectoPascal, JpKg, Quantity as _};
use optional::some;

/// Integrate a buoyancy profile from the top down.
///
/// Missing samples are skipped. The result is on the domain of the present samples, in the same
/// orientation as the input.
pub fn energy_profile(buoyancy: &Profile) -> Result<Profile> {
    let clean = buoyancy.retain_present();
    let domain = match clean.domain() {
        Some(domain) => domain.clone(),
        None => return Ok(Profile::missing(Kind::MassicEnergy)),
    };

    let ps = domain.pressures();
    let bs: Vec<f64> = clean.values().iter().map(|b| b.unpack()).collect();
    let n = ps.len();

    let top_down: Vec<usize> = match domain.orientation() {
        Some(Orientation::Descending) => (0..n).rev().collect(),
        Some(Orientation::Ascending) | None => (0..n).collect(),
    };

    let mut energy = vec![0.0; n];
    for (above, below) in top_down.into_iter().tuple_windows() {
        let dp = (ps[below] - ps[above]).unpack() * 100.0;
        energy[below] = energy[above] + 0.5 * (bs[below] + bs[above]) * dp;
    }

    Profile::with_domain(
        Kind::MassicEnergy,
        domain,
        energy.into_iter().map(some).collect(),
    )
}

/// Replace missing and negative buoyancy samples with zero.
pub fn clamp_positive(buoyancy: &Profile) -> Result<Profile> {
    match buoyancy.domain() {
        None => Ok(Profile::missing(buoyancy.kind())),
        Some(domain) => {
            let values = buoyancy
                .values()
                .iter()
                .map(|b| some(b.into_option().filter(|b| *b > 0.0).unwrap_or(0.0)))
                .collect();

            Profile::with_domain(buoyancy.kind(), domain.clone(), values)
        }
    }
}

/// Convective available potential energy, the energy between the LFC and the LNB.
///
/// A negative result means the levels are inconsistent with the profile and is `None`.
pub fn cape(energy: &Profile, lfc: HectoPascal, lnb: HectoPascal) -> Option<JpKg> {
    let at_lfc = energy.value_at(lfc).into_option()?;
    let at_lnb = energy.value_at(lnb).into_option()?;

    Some(at_lfc - at_lnb).filter(|cape| *cape >= 0.0).map(JpKg)
}

/// Convective inhibition, the energy between the parcel's starting level and the LFC.
pub fn cin(energy: &Profile, start: HectoPascal, lfc: HectoPascal) -> Option<JpKg> {
    let at_start = energy.value_at(start).into_option()?;
    let at_lfc = energy.value_at(lfc).into_option()?;

    Some(JpKg(at_start - at_lfc))
}

/// Create a cell integrating a buoyancy (`MassicVolume`) profile into a `MassicEnergy` profile.
pub fn energy_profile_cell(buoyancy: Ref) -> Result<Cell> {
    Cell::new(
        "energy profile",
        &[buoyancy],
        Quantity::Profile(Profile::missing(Kind::MassicEnergy)),
        |inputs: &[&Quantity]| -> Result<Quantity> {
            let buoyancy = inputs[0].as_profile_of(Kind::MassicVolume)?;
            energy_profile(buoyancy).map(Quantity::Profile)
        },
    )
}

/// Create a cell clamping a buoyancy profile to its positive part.
pub fn positive_buoyancy(buoyancy: Ref) -> Result<Cell> {
    Cell::new(
        "positive buoyancy",
        &[buoyancy],
        Quantity::Profile(Profile::missing(Kind::MassicVolume)),
        |inputs: &[&Quantity]| -> Result<Quantity> {
            let buoyancy = inputs[0].as_profile_of(Kind::MassicVolume)?;
            clamp_positive(buoyancy).map(Quantity::Profile)
        },
    )
}

/// Create a CAPE cell from an energy profile and the LFC and LNB pressures.
pub fn cape_cell(energy: Ref, lfc: Ref, lnb: Ref) -> Result<Cell> {
    Cell::new(
        "cape",
        &[energy, lfc, lnb],
        Quantity::Scalar(Scalar::missing(Kind::MassicEnergy)),
        |inputs: &[&Quantity]| -> Result<Quantity> {
            let energy = inputs[0].as_profile_of(Kind::MassicEnergy)?;
            let lfc = pressure_input(inputs[1])?;
            let lnb = pressure_input(inputs[2])?;

            Ok(energy_quantity(cape(energy, lfc, lnb)))
        },
    )
}

/// Create a CIN cell from an energy profile, the starting pressure and the LFC pressure.
pub fn cin_cell(energy: Ref, start: Ref, lfc: Ref) -> Result<Cell> {
    Cell::new(
        "cin",
        &[energy, start, lfc],
        Quantity::Scalar(Scalar::missing(Kind::MassicEnergy)),
        |inputs: &[&Quantity]| -> Result<Quantity> {
            let energy = inputs[0].as_profile_of(Kind::MassicEnergy)?;
            let start = pressure_input(inputs[1])?;
            let lfc = pressure_input(inputs[2])?;

            Ok(energy_quantity(cin(energy, start, lfc)))
        },
    )
}

fn energy_quantity(val: Option<JpKg>) -> Quantity {
    match val {
        Some(val) => Quantity::energy(val),
        None => Quantity::Scalar(Scalar::missing(Kind::MassicEnergy)),
    }
}
