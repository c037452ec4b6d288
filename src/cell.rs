//! The computational node of a network.
//!
//! A [`Cell`] has an ordered list of inputs, each a [`Ref`] to another slot in the network, and a
//! single output it owns. The output is produced by a [`Formula`], a pure function of the current
//! input values. Cells are built standalone and then handed to [`Network::add`], which owns them
//! from then on.
//!
//! [`Network::add`]: crate::Network::add
use crate::{
    error::{AnalysisError, Result},
    network::Ref,
    quantity::Quantity,
};
use std::fmt;

/// A pure function from the current input values of a cell to its new output.
///
/// A formula is only called when every required input is present. Returning an error leaves the
/// cell's previous output in place.
pub trait Formula {
    /// Compute the output from the input values, in the order the inputs were declared.
    fn compute(&self, inputs: &[&Quantity]) -> Result<Quantity>;
}

impl<F> Formula for F
where
    F: Fn(&[&Quantity]) -> Result<Quantity>,
{
    fn compute(&self, inputs: &[&Quantity]) -> Result<Quantity> {
        self(inputs)
    }
}

/// One input of a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Input {
    /// The slot this input reads.
    pub source: Ref,
    /// Whether a change in the source triggers a recompute.
    pub enabled: bool,
    /// Whether a missing value here makes the output missing without calling the formula.
    pub required: bool,
}

/// A computational node: inputs, a missing-shaped initial output, and a formula.
pub struct Cell {
    pub(crate) name: String,
    pub(crate) inputs: Vec<Input>,
    pub(crate) missing: Quantity,
    pub(crate) formula: Box<dyn Formula>,
}

impl Cell {
    /// Create a cell.
    ///
    /// `missing` is the output before the first computation and whenever a required input is
    /// missing. Every value the cell produces must have the same shape and kind. All inputs start
    /// out enabled and required.
    pub fn new<S, F>(name: S, inputs: &[Ref], missing: Quantity, formula: F) -> Result<Self>
    where
        S: Into<String>,
        F: Formula + 'static,
    {
        let name = name.into();

        if inputs.is_empty() {
            return Err(AnalysisError::NoInputs { cell: name });
        }

        let inputs = inputs
            .iter()
            .map(|&source| Input {
                source,
                enabled: true,
                required: true,
            })
            .collect();

        Ok(Cell {
            name,
            inputs,
            missing: missing.missing_like(),
            formula: Box::new(formula),
        })
    }

    /// Builder method replacing the name.
    pub fn named<S: Into<String>>(mut self, name: S) -> Self {
        self.name = name.into();
        self
    }

    /// Builder method marking an input as optional, the formula then sees it even when missing.
    pub fn optional_input(mut self, position: usize) -> Result<Self> {
        self.input_mut(position)?.required = false;
        Ok(self)
    }

    /// Builder method marking every input from `start` on as optional.
    pub fn optional_from(mut self, start: usize) -> Self {
        self.inputs
            .iter_mut()
            .skip(start)
            .for_each(|input| input.required = false);
        self
    }

    /// Builder method disabling change notifications from an input.
    pub fn disable_input(mut self, position: usize) -> Result<Self> {
        self.input_mut(position)?.enabled = false;
        Ok(self)
    }

    /// The name of the cell.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The inputs, in declaration order.
    #[inline]
    pub fn inputs(&self) -> &[Input] {
        &self.inputs
    }

    /// The missing value this cell produces.
    #[inline]
    pub fn missing(&self) -> &Quantity {
        &self.missing
    }

    pub(crate) fn input_mut(&mut self, position: usize) -> Result<&mut Input> {
        let len = self.inputs.len();
        self.inputs
            .get_mut(position)
            .ok_or(AnalysisError::IndexOutOfRange {
                index: position as i64,
                len,
            })
    }

    /// Run the formula on a snapshot of the input values.
    ///
    /// A missing required input short circuits to the missing output. A formula result that does
    /// not conform to the missing output is a domain mismatch.
    pub(crate) fn evaluate(&self, values: &[&Quantity]) -> Result<Quantity> {
        debug_assert_eq!(values.len(), self.inputs.len());

        let short_circuit = self
            .inputs
            .iter()
            .zip(values)
            .any(|(input, value)| input.required && value.is_missing());

        if short_circuit {
            return Ok(self.missing.clone());
        }

        let output = self.formula.compute(values)?;
        if output.conforms_to(&self.missing) {
            Ok(output)
        } else {
            Err(AnalysisError::mismatch(
                self.missing.describe(),
                output.describe(),
            ))
        }
    }
}

impl fmt::Debug for Cell {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Cell")
            .field("name", &self.name)
            .field("inputs", &self.inputs)
            .field("missing", &self.missing)
            .finish()
    }
}
