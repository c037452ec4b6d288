//! Cells that route or group values without doing any physics.
use super::scalar_input;
use crate::{
    cell::Cell,
    error::{AnalysisError, Result},
    network::{Network, Ref},
    quantity::{Kind, Quantity, Scalar},
};

/// Create a cell whose output is `candidates[mode]`.
///
/// `mode` must be an `Index` scalar. The candidates must all have the same shape and kind, their
/// current values in `net` are checked here. A missing mode gives a missing output, a mode outside
/// of the candidates is a compute failure.
pub fn selector(net: &Network, mode: Ref, candidates: &[Ref]) -> Result<Cell> {
    let first = candidates.first().ok_or_else(|| AnalysisError::NoInputs {
        cell: "selector".to_owned(),
    })?;

    let missing = net.value(*first)?.missing_like();
    for &candidate in &candidates[1..] {
        let val = net.value(candidate)?;
        if !val.conforms_to(&missing) {
            return Err(AnalysisError::mismatch(missing.describe(), val.describe()));
        }
    }

    let mut inputs = Vec::with_capacity(candidates.len() + 1);
    inputs.push(mode);
    inputs.extend_from_slice(candidates);

    Ok(Cell::new("selector", &inputs, missing, select)?.optional_from(1))
}

fn select(inputs: &[&Quantity]) -> Result<Quantity> {
    let mode = scalar_input(inputs[0], Kind::Index)?;
    let candidates = &inputs[1..];

    if mode.fract() != 0.0 {
        return Err(AnalysisError::mismatch("integral index", mode));
    }

    let index = mode as i64;
    if index < 0 || index as usize >= candidates.len() {
        return Err(AnalysisError::IndexOutOfRange {
            index,
            len: candidates.len(),
        });
    }

    Ok(candidates[index as usize].clone())
}

/// Create a cell grouping its inputs, in order, into one value.
///
/// A single input is passed through unchanged. Two or more scalars become a
/// [`Quantity::RealTuple`], anything else a [`Quantity::Tuple`]. Missing inputs are missing
/// components of the tuple.
pub fn tupler(net: &Network, inputs: &[Ref]) -> Result<Cell> {
    if inputs.is_empty() {
        return Err(AnalysisError::NoInputs {
            cell: "tupler".to_owned(),
        });
    }

    let missing: Vec<Quantity> = inputs
        .iter()
        .map(|&r| net.value(r).map(Quantity::missing_like))
        .collect::<Result<_>>()?;
    let missing = group(&missing.iter().collect::<Vec<_>>());

    Ok(Cell::new("tupler", inputs, missing, |parts: &[&Quantity]| -> Result<Quantity> {
        Ok(group(parts))
    })?
    .optional_from(0))
}

fn group(parts: &[&Quantity]) -> Quantity {
    if parts.len() == 1 {
        return parts[0].clone();
    }

    let scalars: Option<Vec<Scalar>> = parts
        .iter()
        .map(|q| match q {
            Quantity::Scalar(s) => Some(*s),
            _ => None,
        })
        .collect();

    match scalars {
        Some(scalars) => Quantity::RealTuple(scalars),
        None => Quantity::Tuple(parts.iter().map(|&q| q.clone()).collect()),
    }
}
