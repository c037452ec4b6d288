//! Values that flow through the network.
//!
//! Every slot in a [`Network`](crate::Network) holds a [`Quantity`]. A quantity is a scalar with a
//! physical [`Kind`], a tuple of quantities, a [`Profile`] sampled on pressure, or a bare pressure
//! [`Domain`]. Missing data is a value, not an error: a scalar without a value, a profile or domain
//! without samples. Each kind has exactly one canonical unit, and values are stored in that unit.
use crate::error::{AnalysisError, Result};
use metfor::{HectoPascal, JpKg, Kelvin, Quantity as _};
use optional::{none, some, Optioned};
use std::fmt;
use strum_macros::{Display, EnumIter};

pub use self::profile::{Domain, Orientation, Profile};

mod profile;

/// The physical kind of a scalar or of the range of a profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, Display)]
pub enum Kind {
    /// Air pressure (hPa)
    #[strum(serialize = "air pressure")]
    AirPressure,
    /// Air temperature (K)
    #[strum(serialize = "air temperature")]
    AirTemperature,
    /// Dew point (K)
    #[strum(serialize = "dew point")]
    DewPoint,
    /// Virtual temperature (K)
    #[strum(serialize = "virtual temperature")]
    VirtualTemperature,
    /// Potential temperature (K)
    #[strum(serialize = "potential temperature")]
    PotentialTemperature,
    /// Water vapor mixing ratio (kg/kg)
    #[strum(serialize = "mixing ratio")]
    MixingRatio,
    /// Air density (kg/m^3)
    #[strum(serialize = "air density")]
    AirDensity,
    /// Massic volume, also used for buoyancy (m^3/kg)
    #[strum(serialize = "massic volume")]
    MassicVolume,
    /// Massic energy (J/kg)
    #[strum(serialize = "massic energy")]
    MassicEnergy,
    /// Eastward wind component (kt)
    #[strum(serialize = "eastward wind")]
    EastwardWind,
    /// Northward wind component (kt)
    #[strum(serialize = "northward wind")]
    NorthwardWind,
    /// Dimensionless integer index
    #[strum(serialize = "index")]
    Index,
}

/// Groups of kinds that share a unit and may stand in for one another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Family {
    /// Pressure
    Pressure,
    /// Any temperature
    Temperature,
    /// Mixing ratio
    Ratio,
    /// Density
    Density,
    /// Massic volume
    Volume,
    /// Massic energy
    Energy,
    /// Wind speed
    Speed,
    /// Dimensionless
    Dimensionless,
}

impl Kind {
    /// The canonical unit values of this kind are stored in.
    pub fn unit(self) -> &'static str {
        use Kind::*;

        match self {
            AirPressure => "hPa",
            AirTemperature | DewPoint | VirtualTemperature | PotentialTemperature => "K",
            MixingRatio => "kg/kg",
            AirDensity => "kg/m^3",
            MassicVolume => "m^3/kg",
            MassicEnergy => "J/kg",
            EastwardWind | NorthwardWind => "kt",
            Index => "1",
        }
    }

    /// The unit family of this kind.
    pub fn family(self) -> Family {
        use Kind::*;

        match self {
            AirPressure => Family::Pressure,
            AirTemperature | DewPoint | VirtualTemperature | PotentialTemperature => {
                Family::Temperature
            }
            MixingRatio => Family::Ratio,
            AirDensity => Family::Density,
            MassicVolume => Family::Volume,
            MassicEnergy => Family::Energy,
            EastwardWind | NorthwardWind => Family::Speed,
            Index => Family::Dimensionless,
        }
    }
}

/// The structural shape of a quantity, used with [`missing_of`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    /// A single value.
    Scalar,
    /// A profile sampled on pressure.
    Profile,
    /// A set of pressure samples.
    Domain,
}

/// A single, possibly missing, value of a known kind.
#[derive(Debug, Clone, Copy)]
pub struct Scalar {
    kind: Kind,
    value: Optioned<f64>,
}

impl Scalar {
    /// Create a scalar from a value in the canonical unit of `kind`.
    pub fn new(kind: Kind, value: f64) -> Self {
        Scalar {
            kind,
            value: if value.is_finite() { some(value) } else { none() },
        }
    }

    /// Create a missing scalar.
    pub fn missing(kind: Kind) -> Self {
        Scalar { kind, value: none() }
    }

    /// The kind of this scalar.
    #[inline]
    pub fn kind(&self) -> Kind {
        self.kind
    }

    /// The value in canonical units, if present.
    #[inline]
    pub fn value(&self) -> Option<f64> {
        self.value.into_option()
    }

    /// Is the value missing?
    #[inline]
    pub fn is_missing(&self) -> bool {
        self.value.is_none()
    }
}

impl PartialEq for Scalar {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind && same(self.value, other.value)
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.value() {
            Some(val) => write!(f, "{} {} ({})", val, self.kind.unit(), self.kind),
            None => write!(f, "missing {}", self.kind),
        }
    }
}

/// A value held in a network slot.
#[derive(Debug, Clone, PartialEq)]
pub enum Quantity {
    /// A single value.
    Scalar(Scalar),
    /// A flat tuple of scalars.
    RealTuple(Vec<Scalar>),
    /// A general ordered tuple.
    Tuple(Vec<Quantity>),
    /// A profile sampled on pressure.
    Profile(Profile),
    /// A set of pressure samples, `None` when missing.
    Domain(Option<Domain>),
}

/// Build the missing value for a shape and kind.
///
/// The kind is ignored for a [`Shape::Domain`], which is always a set of pressures.
pub fn missing_of(shape: Shape, kind: Kind) -> Quantity {
    match shape {
        Shape::Scalar => Quantity::Scalar(Scalar::missing(kind)),
        Shape::Profile => Quantity::Profile(Profile::missing(kind)),
        Shape::Domain => Quantity::Domain(None),
    }
}

impl Quantity {
    /// A scalar in the canonical unit of `kind`.
    pub fn scalar(kind: Kind, value: f64) -> Self {
        Quantity::Scalar(Scalar::new(kind, value))
    }

    /// A pressure scalar.
    pub fn pressure<P>(pressure: P) -> Self
    where
        HectoPascal: From<P>,
    {
        Quantity::scalar(Kind::AirPressure, HectoPascal::from(pressure).unpack())
    }

    /// An air temperature scalar.
    pub fn temperature<T>(temperature: T) -> Self
    where
        Kelvin: From<T>,
    {
        Quantity::scalar(Kind::AirTemperature, Kelvin::from(temperature).unpack())
    }

    /// A massic energy scalar.
    pub fn energy(energy: JpKg) -> Self {
        Quantity::scalar(Kind::MassicEnergy, energy.unpack())
    }

    /// An integer index scalar.
    pub fn index(index: i32) -> Self {
        Quantity::scalar(Kind::Index, f64::from(index))
    }

    /// Is this value missing? Tuples are missing when any component is missing.
    pub fn is_missing(&self) -> bool {
        match self {
            Quantity::Scalar(s) => s.is_missing(),
            Quantity::RealTuple(parts) => parts.iter().any(Scalar::is_missing),
            Quantity::Tuple(parts) => parts.iter().any(Quantity::is_missing),
            Quantity::Profile(p) => p.is_missing(),
            Quantity::Domain(d) => d.is_none(),
        }
    }

    /// The missing value with the same shape and kinds as this one.
    pub fn missing_like(&self) -> Quantity {
        match self {
            Quantity::Scalar(s) => Quantity::Scalar(Scalar::missing(s.kind())),
            Quantity::RealTuple(parts) => Quantity::RealTuple(
                parts.iter().map(|s| Scalar::missing(s.kind())).collect(),
            ),
            Quantity::Tuple(parts) => {
                Quantity::Tuple(parts.iter().map(Quantity::missing_like).collect())
            }
            Quantity::Profile(p) => Quantity::Profile(Profile::missing(p.kind())),
            Quantity::Domain(_) => Quantity::Domain(None),
        }
    }

    /// Do these two values have the same shape and kinds?
    pub fn conforms_to(&self, other: &Quantity) -> bool {
        match (self, other) {
            (Quantity::Scalar(a), Quantity::Scalar(b)) => a.kind() == b.kind(),
            (Quantity::RealTuple(a), Quantity::RealTuple(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.kind() == y.kind())
            }
            (Quantity::Tuple(a), Quantity::Tuple(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.conforms_to(y))
            }
            (Quantity::Profile(a), Quantity::Profile(b)) => a.kind() == b.kind(),
            (Quantity::Domain(_), Quantity::Domain(_)) => true,
            _ => false,
        }
    }

    /// A short description of the shape and kind, used in error messages.
    pub fn describe(&self) -> String {
        match self {
            Quantity::Scalar(s) => format!("{} scalar", s.kind()),
            Quantity::RealTuple(parts) => format!("real tuple of {}", parts.len()),
            Quantity::Tuple(parts) => format!("tuple of {}", parts.len()),
            Quantity::Profile(p) => format!("{} profile", p.kind()),
            Quantity::Domain(_) => "pressure domain".to_owned(),
        }
    }

    /// Borrow as a scalar of one of the given kinds.
    pub fn as_scalar_of(&self, kind: Kind) -> Result<&Scalar> {
        match self {
            Quantity::Scalar(s) if s.kind() == kind => Ok(s),
            other => Err(AnalysisError::mismatch(
                format!("{} scalar", kind),
                other.describe(),
            )),
        }
    }

    /// Borrow as a scalar whose kind belongs to `family`.
    pub fn as_scalar_in(&self, family: Family) -> Result<&Scalar> {
        match self {
            Quantity::Scalar(s) if s.kind().family() == family => Ok(s),
            other => Err(AnalysisError::mismatch(
                format!("{:?} scalar", family),
                other.describe(),
            )),
        }
    }

    /// Borrow as a profile of one of the given kinds.
    pub fn as_profile_of(&self, kind: Kind) -> Result<&Profile> {
        match self {
            Quantity::Profile(p) if p.kind() == kind => Ok(p),
            other => Err(AnalysisError::mismatch(
                format!("{} profile", kind),
                other.describe(),
            )),
        }
    }

    /// Borrow as a profile whose kind belongs to `family`.
    pub fn as_profile_in(&self, family: Family) -> Result<&Profile> {
        match self {
            Quantity::Profile(p) if p.kind().family() == family => Ok(p),
            other => Err(AnalysisError::mismatch(
                format!("{:?} profile", family),
                other.describe(),
            )),
        }
    }

    /// Borrow as any profile.
    pub fn as_profile(&self) -> Result<&Profile> {
        match self {
            Quantity::Profile(p) => Ok(p),
            other => Err(AnalysisError::mismatch("profile", other.describe())),
        }
    }

    /// Borrow as a pressure domain.
    pub fn as_domain(&self) -> Result<Option<&Domain>> {
        match self {
            Quantity::Domain(d) => Ok(d.as_ref()),
            other => Err(AnalysisError::mismatch("pressure domain", other.describe())),
        }
    }

    /// The pressure held by an `AirPressure` scalar, `None` when missing or of another kind.
    pub fn to_pressure(&self) -> Option<HectoPascal> {
        self.as_scalar_of(Kind::AirPressure)
            .ok()
            .and_then(Scalar::value)
            .map(HectoPascal)
    }

    /// The temperature held by a scalar in the temperature family.
    pub fn to_temperature(&self) -> Option<Kelvin> {
        self.as_scalar_in(Family::Temperature)
            .ok()
            .and_then(Scalar::value)
            .map(Kelvin)
    }

    /// The energy held by a `MassicEnergy` scalar.
    pub fn to_energy(&self) -> Option<JpKg> {
        self.as_scalar_of(Kind::MassicEnergy)
            .ok()
            .and_then(Scalar::value)
            .map(JpKg)
    }

    /// The canonical value of any scalar.
    pub fn to_f64(&self) -> Option<f64> {
        match self {
            Quantity::Scalar(s) => s.value(),
            _ => None,
        }
    }
}

impl From<Scalar> for Quantity {
    fn from(s: Scalar) -> Self {
        Quantity::Scalar(s)
    }
}

impl From<Profile> for Quantity {
    fn from(p: Profile) -> Self {
        Quantity::Profile(p)
    }
}

// Bit-for-bit on present values, and two missing values are the same.
#[inline]
pub(crate) fn same(a: Optioned<f64>, b: Optioned<f64>) -> bool {
    match (a.into_option(), b.into_option()) {
        (Some(x), Some(y)) => x.to_bits() == y.to_bits(),
        (None, None) => true,
        _ => false,
    }
}
