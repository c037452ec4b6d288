//! Constructors for the concrete cells used to analyze a sounding.
//!
//! Every constructor returns a [`Cell`](crate::Cell) ready to be handed to
//! [`Network::add`](crate::Network::add). The formulas behind the cells are also exposed as plain
//! functions on [`Profile`](crate::Profile)s and metfor types, so they can be used without a
//! network.
use crate::{
    error::{AnalysisError, Result},
    quantity::{Family, Kind, Quantity, Scalar},
};
use metfor::{HectoPascal, Kelvin};

pub mod energy;
pub mod levels;
pub mod profile_ops;
pub mod select;
pub mod thermo;
pub mod trajectory;

/// The value of a pressure scalar input.
pub(crate) fn pressure_input(q: &Quantity) -> Result<HectoPascal> {
    q.as_scalar_of(Kind::AirPressure)?
        .value()
        .map(HectoPascal)
        .ok_or(AnalysisError::NotEnoughData)
}

/// The value of a scalar input in the temperature family.
pub(crate) fn temperature_input(q: &Quantity) -> Result<Kelvin> {
    q.as_scalar_in(Family::Temperature)?
        .value()
        .map(Kelvin)
        .ok_or(AnalysisError::NotEnoughData)
}

/// A scalar output from a possibly missing value.
pub(crate) fn scalar_output(kind: Kind, val: Option<f64>) -> Quantity {
    match val {
        Some(val) => Quantity::scalar(kind, val),
        None => Quantity::Scalar(Scalar::missing(kind)),
    }
}

/// The value of a scalar input of a given kind.
pub(crate) fn scalar_input(q: &Quantity, kind: Kind) -> Result<f64> {
    q.as_scalar_of(kind)?
        .value()
        .ok_or(AnalysisError::NotEnoughData)
}
