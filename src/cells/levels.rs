//! Find the level of free convection (LFC) and the level of neutral buoyancy (LNB) on a buoyancy
//! profile.
//!
//! Both are zero crossings of the buoyancy, found by walking the profile and interpolating linearly
//! in pressure between the two samples that bracket the crossing. Profiles come in either
//! orientation, so the walk order is chosen from the orientation of the domain.
use crate::{
    cell::Cell,
    error::Result,
    network::Ref,
    quantity::{Kind, Orientation, Profile, Quantity, Scalar},
};
use itertools::Either;
use metfor::{HectoPascal, Quantity as _};

/// Find the level of free convection.
///
/// Starting at the bottom of the profile, skip levels with non-negative buoyancy, then continue up
/// through the negatively buoyant layer to where the buoyancy returns to non-negative. Returns
/// `None` if there is no such crossing or fewer than two present samples.
pub fn find_lfc(buoyancy: &Profile) -> Option<HectoPascal> {
    let levels = present_levels(buoyancy);
    if levels.len() < 2 {
        return None;
    }

    let bottom_up = match buoyancy.orientation()? {
        Orientation::Descending => Either::Left(levels.iter()),
        Orientation::Ascending => Either::Right(levels.iter().rev()),
    };

    let mut levels = bottom_up.skip_while(|(_, b)| *b >= 0.0);
    let mut below = *levels.next()?;
    for &above in levels {
        if above.1 >= 0.0 {
            return Some(HectoPascal(crossing(above, below)));
        }
        below = above;
    }

    None
}

/// Find the level of neutral buoyancy.
///
/// Starting at the top of the profile, skip levels with non-negative buoyancy, then continue down
/// through the negatively buoyant layer to where the buoyancy becomes positive. Returns `None` if
/// there is no such crossing or fewer than two present samples.
pub fn find_lnb(buoyancy: &Profile) -> Option<HectoPascal> {
    let levels = present_levels(buoyancy);
    if levels.len() < 2 {
        return None;
    }

    let top_down = match buoyancy.orientation()? {
        Orientation::Descending => Either::Left(levels.iter().rev()),
        Orientation::Ascending => Either::Right(levels.iter()),
    };

    let mut levels = top_down.skip_while(|(_, b)| *b >= 0.0);
    let mut above = *levels.next()?;
    for &below in levels {
        if below.1 > 0.0 {
            return Some(HectoPascal(crossing(above, below)));
        }
        above = below;
    }

    None
}

// Pressure of the zero crossing between two samples of opposite sign.
#[inline]
fn crossing((p_top, b_top): (f64, f64), (p_bot, b_bot): (f64, f64)) -> f64 {
    (p_top * b_bot - p_bot * b_top) / (b_bot - b_top)
}

fn present_levels(buoyancy: &Profile) -> Vec<(f64, f64)> {
    buoyancy
        .samples()
        .filter_map(|(p, b)| b.into_option().map(|b| (p.unpack(), b)))
        .collect()
}

/// Create a cell finding the LFC of a buoyancy (`MassicVolume`) profile.
pub fn lfc(buoyancy: Ref) -> Result<Cell> {
    level_cell("lfc", buoyancy, find_lfc)
}

/// Create a cell finding the LNB of a buoyancy (`MassicVolume`) profile.
pub fn lnb(buoyancy: Ref) -> Result<Cell> {
    level_cell("lnb", buoyancy, find_lnb)
}

fn level_cell(
    name: &str,
    buoyancy: Ref,
    finder: fn(&Profile) -> Option<HectoPascal>,
) -> Result<Cell> {
    Cell::new(
        name,
        &[buoyancy],
        Quantity::Scalar(Scalar::missing(Kind::AirPressure)),
        move |inputs: &[&Quantity]| -> Result<Quantity> {
            let profile = inputs[0].as_profile_of(Kind::MassicVolume)?;
            Ok(match finder(profile) {
                Some(p) => Quantity::pressure(p),
                None => Quantity::Scalar(Scalar::missing(Kind::AirPressure)),
            })
        },
    )
}
