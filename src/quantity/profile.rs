//! Profiles sampled on pressure.
use super::{same, Kind};
use crate::{
    error::{AnalysisError, Result},
    interpolation::linear_interpolate,
};
use itertools::{izip, Itertools};
use metfor::{HectoPascal, Quantity};
use optional::{none, some, Noned, Optioned};

/// Direction the pressure samples of a domain run in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    /// The first sample has the highest pressure, the profile runs from the ground up.
    Descending,
    /// The first sample has the lowest pressure, the profile runs from the top down.
    Ascending,
}

/// The pressure samples a profile is defined on.
#[derive(Debug, Clone, PartialEq)]
pub enum Domain {
    /// The degenerate, single sample, domain.
    Singleton(HectoPascal),
    /// Two or more strictly monotonic samples.
    Gridded(Vec<HectoPascal>),
}

impl Domain {
    /// Create a domain, checking that the samples are present and strictly monotonic.
    pub fn new(pressures: Vec<HectoPascal>) -> Result<Self> {
        if pressures.is_empty() {
            return Err(AnalysisError::NotEnoughData);
        }

        if pressures
            .iter()
            .any(|p| !p.unpack().is_finite() || p.unpack() <= 0.0)
        {
            return Err(AnalysisError::InvalidInput("pressure samples must be positive"));
        }

        if pressures.len() == 1 {
            return Ok(Domain::Singleton(pressures[0]));
        }

        let descending = pressures.iter().tuple_windows().all(|(a, b)| a > b);
        let ascending = pressures.iter().tuple_windows().all(|(a, b)| a < b);
        if !(descending || ascending) {
            return Err(AnalysisError::InvalidInput(
                "pressure samples must be strictly monotonic",
            ));
        }

        Ok(Domain::Gridded(pressures))
    }

    /// The pressure samples.
    #[inline]
    pub fn pressures(&self) -> &[HectoPascal] {
        match self {
            Domain::Singleton(p) => std::slice::from_ref(p),
            Domain::Gridded(ps) => ps,
        }
    }

    /// The number of samples.
    #[inline]
    pub fn len(&self) -> usize {
        self.pressures().len()
    }

    /// Domains always have at least one sample.
    #[inline]
    pub fn is_empty(&self) -> bool {
        false
    }

    /// The orientation, `None` for a single sample.
    pub fn orientation(&self) -> Option<Orientation> {
        match self {
            Domain::Singleton(_) => None,
            Domain::Gridded(ps) => {
                if ps[0] > ps[ps.len() - 1] {
                    Some(Orientation::Descending)
                } else {
                    Some(Orientation::Ascending)
                }
            }
        }
    }

    /// The highest pressure in the domain.
    pub fn bottom(&self) -> HectoPascal {
        let ps = self.pressures();
        if ps[0] > ps[ps.len() - 1] {
            ps[0]
        } else {
            ps[ps.len() - 1]
        }
    }

    /// The lowest pressure in the domain.
    pub fn top(&self) -> HectoPascal {
        let ps = self.pressures();
        if ps[0] < ps[ps.len() - 1] {
            ps[0]
        } else {
            ps[ps.len() - 1]
        }
    }
}

/// A vertical profile of one kind of value on a pressure domain.
///
/// Individual samples may be missing. A profile with no data at all is the missing profile.
#[derive(Debug, Clone)]
pub struct Profile {
    kind: Kind,
    data: Option<(Domain, Vec<Optioned<f64>>)>,
}

impl Profile {
    /// Create a profile from parallel pressure and value vectors. Values are in the canonical unit
    /// of `kind`.
    pub fn new(
        kind: Kind,
        pressures: Vec<HectoPascal>,
        values: Vec<Optioned<f64>>,
    ) -> Result<Self> {
        Profile::with_domain(kind, Domain::new(pressures)?, values)
    }

    /// Create a profile on an existing domain.
    pub fn with_domain(kind: Kind, domain: Domain, values: Vec<Optioned<f64>>) -> Result<Self> {
        if domain.len() != values.len() {
            return Err(AnalysisError::InvalidInput(
                "profile domain and values differ in length",
            ));
        }

        let values = values
            .into_iter()
            .map(|v| match v.into_option() {
                Some(val) if val.is_finite() => some(val),
                _ => none(),
            })
            .collect();

        Ok(Profile {
            kind,
            data: Some((domain, values)),
        })
    }

    /// Create a profile from plain values, non-finite values are treated as missing.
    pub fn from_values(kind: Kind, pressures: Vec<HectoPascal>, values: Vec<f64>) -> Result<Self> {
        Profile::new(kind, pressures, values.into_iter().map(some).collect())
    }

    /// Create a profile from sounding style columns of optional values.
    ///
    /// Levels with a missing pressure are dropped; levels with a missing value are kept as missing
    /// samples. `convert` maps each present value into the canonical unit of `kind`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use metfor::{Celsius, HectoPascal, Kelvin, Quantity};
    /// use optional::{none, some};
    /// use sounding_network::{Kind, Profile};
    ///
    /// let p = vec![some(HectoPascal(1000.0)), none(), some(HectoPascal(850.0))];
    /// let t = vec![some(Celsius(20.0)), some(Celsius(15.0)), none()];
    ///
    /// let profile = Profile::from_optioned(Kind::AirTemperature, &p, &t, |t| {
    ///     Kelvin::from(t).unpack()
    /// })
    /// .unwrap();
    ///
    /// assert_eq!(profile.len(), 2);
    /// assert!(profile.values()[1].is_none());
    /// ```
    pub fn from_optioned<V, F>(
        kind: Kind,
        pressure: &[Optioned<HectoPascal>],
        values: &[Optioned<V>],
        convert: F,
    ) -> Result<Self>
    where
        V: Noned + Copy,
        F: Fn(V) -> f64,
    {
        if pressure.len() != values.len() {
            return Err(AnalysisError::InvalidInput(
                "pressure and value columns differ in length",
            ));
        }

        let (ps, vs): (Vec<HectoPascal>, Vec<Optioned<f64>>) = izip!(pressure, values)
            // Remove levels with missing pressure
            .filter_map(|(p, v)| p.into_option().map(|p| (p, v)))
            // Convert the value, keeping missing values as missing samples
            .map(|(p, v)| (p, Optioned::from(v.into_option().map(&convert))))
            .unzip();

        Profile::new(kind, ps, vs)
    }

    /// The missing profile of a kind.
    pub fn missing(kind: Kind) -> Self {
        Profile { kind, data: None }
    }

    /// The kind of the values.
    #[inline]
    pub fn kind(&self) -> Kind {
        self.kind
    }

    /// Is this the missing profile?
    #[inline]
    pub fn is_missing(&self) -> bool {
        self.data.is_none()
    }

    /// The pressure domain, `None` for the missing profile.
    #[inline]
    pub fn domain(&self) -> Option<&Domain> {
        self.data.as_ref().map(|(d, _)| d)
    }

    /// The pressure samples, empty for the missing profile.
    #[inline]
    pub fn pressures(&self) -> &[HectoPascal] {
        self.data
            .as_ref()
            .map(|(d, _)| d.pressures())
            .unwrap_or(&[])
    }

    /// The values, empty for the missing profile.
    #[inline]
    pub fn values(&self) -> &[Optioned<f64>] {
        self.data
            .as_ref()
            .map(|(_, vs)| vs.as_slice())
            .unwrap_or(&[])
    }

    /// The number of samples.
    #[inline]
    pub fn len(&self) -> usize {
        self.values().len()
    }

    /// Does this profile have no samples?
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The orientation of the domain.
    pub fn orientation(&self) -> Option<Orientation> {
        self.domain().and_then(Domain::orientation)
    }

    /// Iterate over `(pressure, value)` pairs.
    pub fn samples(&self) -> impl Iterator<Item = (HectoPascal, Optioned<f64>)> + '_ {
        izip!(self.pressures(), self.values()).map(|(p, v)| (*p, *v))
    }

    /// Evaluate the profile at a pressure by linear interpolation in pressure.
    pub fn value_at(&self, target: HectoPascal) -> Optioned<f64> {
        if self.is_missing() {
            return none();
        }

        linear_interpolate(self.pressures(), self.values(), target)
    }

    /// Build a profile of another kind on the same domain by mapping each present sample.
    ///
    /// Missing samples, and samples the function cannot compute, are missing in the result.
    pub fn map_samples<F>(&self, kind: Kind, mut func: F) -> Profile
    where
        F: FnMut(HectoPascal, f64) -> Option<f64>,
    {
        match &self.data {
            None => Profile::missing(kind),
            Some((domain, values)) => {
                let mapped = izip!(domain.pressures(), values)
                    .map(|(p, v)| Optioned::from(v.into_option().and_then(|v| func(*p, v))))
                    .collect();

                Profile {
                    kind,
                    data: Some((domain.clone(), mapped)),
                }
            }
        }
    }

    /// Remove the missing samples. If nothing is left the result is the missing profile.
    pub fn retain_present(&self) -> Profile {
        let (ps, vs): (Vec<HectoPascal>, Vec<Optioned<f64>>) = self
            .samples()
            .filter(|(_, v)| v.is_some())
            .unzip();

        if ps.is_empty() {
            Profile::missing(self.kind)
        } else {
            // A subset of a monotonic domain is monotonic.
            Profile::new(self.kind, ps, vs).unwrap_or_else(|_| Profile::missing(self.kind))
        }
    }

    /// Evaluate this profile at every pressure of another domain.
    pub fn resample(&self, domain: &Domain) -> Profile {
        if self.is_missing() {
            return Profile::missing(self.kind);
        }

        let values = domain
            .pressures()
            .iter()
            .map(|p| self.value_at(*p))
            .collect();

        Profile {
            kind: self.kind,
            data: Some((domain.clone(), values)),
        }
    }

    /// Join two profiles that meet at a shared pressure into one.
    ///
    /// The second profile must continue in the direction of the first. A sample of `other` at the
    /// pressure where `self` ends is dropped, so the junction appears once.
    pub fn concatenate(&self, other: &Profile) -> Result<Profile> {
        if self.kind != other.kind {
            return Err(AnalysisError::mismatch(
                format!("{} profile", self.kind),
                format!("{} profile", other.kind),
            ));
        }

        let (mut ps, mut vs): (Vec<HectoPascal>, Vec<Optioned<f64>>) = self.samples().unzip();
        let last = ps.last().copied();
        other
            .samples()
            .filter(|(p, _)| Some(*p) != last)
            .for_each(|(p, v)| {
                ps.push(p);
                vs.push(v);
            });

        Profile::new(self.kind, ps, vs)
    }
}

impl PartialEq for Profile {
    fn eq(&self, other: &Self) -> bool {
        if self.kind != other.kind {
            return false;
        }

        match (&self.data, &other.data) {
            (None, None) => true,
            (Some((d0, v0)), Some((d1, v1))) => {
                d0 == d1 && v0.len() == v1.len() && izip!(v0, v1).all(|(a, b)| same(*a, *b))
            }
            _ => false,
        }
    }
}
