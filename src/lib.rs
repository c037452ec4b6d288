#![warn(missing_docs)]
//! A reactive network of cells for deriving parcel diagnostics from weather soundings.
//!
//! Values live in the slots of a [`Network`]. Sources are supplied from outside, every other slot
//! is the output of a [`Cell`] whose [`Formula`] reads the values of other slots. When a source
//! changes, everything downstream of it is recomputed in dependency order before
//! [`Network::set`] returns.
//!
//! The [`cells`] module has constructors for the thermodynamic cells, and [`AerologicalNetwork`]
//! wires them together to lift a parcel and find its LCL, LFC, LNB, CAPE and CIN.
//!
//! ```
//! use metfor::{Celsius, HectoPascal};
//! use optional::some;
//! use sounding_network::{AerologicalNetwork, ParcelMode};
//!
//! let p: Vec<_> = [1000.0, 850.0, 700.0, 500.0, 300.0, 200.0]
//!     .iter()
//!     .map(|&p| some(HectoPascal(p)))
//!     .collect();
//! let t: Vec<_> = [30.0, 18.0, 6.0, -12.0, -38.0, -55.0]
//!     .iter()
//!     .map(|&t| some(Celsius(t)))
//!     .collect();
//! let dp: Vec<_> = [22.0, 12.0, -2.0, -25.0, -50.0, -70.0]
//!     .iter()
//!     .map(|&t| some(Celsius(t)))
//!     .collect();
//!
//! let mut anal = AerologicalNetwork::new().unwrap();
//! anal.set_parcel_mode(ParcelMode::Bottom).unwrap();
//! anal.set_minimum_pressure(HectoPascal(200.0)).unwrap();
//! anal.set_sounding(&p, &t, &dp).unwrap();
//!
//! assert!(anal.lcl_pressure().is_some());
//! ```

//
// API
//
pub use crate::{
    aerological::{AerologicalNetwork, AerologicalRefs},
    cell::{Cell, Formula, Input},
    error::{AnalysisError, Result},
    keys::ParcelMode,
    network::{Network, Ref, Update},
    quantity::{missing_of, Domain, Family, Kind, Orientation, Profile, Quantity, Scalar, Shape},
};

pub mod cells;

//
// Internal use only
//

// Modules
mod aerological;
mod cell;
mod error;
mod interpolation;
mod keys;
mod network;
mod quantity;
#[cfg(test)]
mod test_data;
mod utility;
