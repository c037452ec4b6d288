//! Enums used as keys for setting options on a network.
use crate::error::AnalysisError;
use std::convert::TryFrom;
use strum_macros::{Display, EnumIter, EnumString};

/// How the starting point of the lifted parcel is chosen.
///
/// The discriminant is the index fed to the selectors that pick the parcel pressure, temperature
/// and mixing ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, EnumString, Display)]
#[repr(u8)]
pub enum ParcelMode {
    /// The reference pressure and temperature, with the profile mixing ratio there.
    #[strum(serialize = "point")]
    Point = 0,
    /// The mean of the layer from the bottom of the profile up to the reference pressure.
    #[strum(serialize = "layer")]
    Layer = 1,
    /// The profile values at its highest pressure.
    #[strum(serialize = "bottom")]
    Bottom = 2,
    /// The reference pressure with the profile temperature and mixing ratio there.
    #[strum(serialize = "pressure")]
    Pressure = 3,
}

impl ParcelMode {
    /// The selector index for this mode.
    #[inline]
    pub fn index(self) -> i32 {
        self as i32
    }
}

impl Default for ParcelMode {
    fn default() -> Self {
        ParcelMode::Bottom
    }
}

impl TryFrom<i32> for ParcelMode {
    type Error = AnalysisError;

    fn try_from(val: i32) -> Result<Self, Self::Error> {
        use ParcelMode::*;

        match val {
            0 => Ok(Point),
            1 => Ok(Layer),
            2 => Ok(Bottom),
            3 => Ok(Pressure),
            _ => Err(AnalysisError::IndexOutOfRange {
                index: i64::from(val),
                len: 4,
            }),
        }
    }
}
