use std::fmt;

use rand::Rng;
use serde::Serialize;

use vitalgen_core::{FieldValue, Operator};

use crate::errors::GenerationError;
use crate::sampler::ValueSampler;

/// Single-field predicate `(field, operator, value)`.
///
/// Immutable: rewriting the operator yields a new constraint.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Constraint {
    field: String,
    operator: Operator,
    value: FieldValue,
}

impl Constraint {
    pub fn new(field: impl Into<String>, operator: Operator, value: FieldValue) -> Self {
        Self {
            field: field.into(),
            operator,
            value,
        }
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn operator(&self) -> Operator {
        self.operator
    }

    pub fn value(&self) -> &FieldValue {
        &self.value
    }

    /// Same field and value under a different operator.
    pub fn with_operator(self, operator: Operator) -> Self {
        Self { operator, ..self }
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}{}{})", self.field, self.operator, self.value)
    }
}

/// Builds constraints by pairing a random operator with a sampled value.
///
/// Operators are not checked against the field's domain: `<` on a choice
/// field is a legal output.
#[derive(Debug, Clone, Copy)]
pub struct ConstraintFactory<'a> {
    sampler: ValueSampler<'a>,
}

impl<'a> ConstraintFactory<'a> {
    pub fn new(sampler: ValueSampler<'a>) -> Self {
        Self { sampler }
    }

    pub fn sampler(&self) -> &ValueSampler<'a> {
        &self.sampler
    }

    pub fn make_constraint<R: Rng + ?Sized>(
        &self,
        field: &str,
        rng: &mut R,
    ) -> Result<Constraint, GenerationError> {
        let operator = pick_operator(&Operator::ALL, rng);
        let value = self.sampler.sample(field, rng)?;
        Ok(Constraint::new(field, operator, value))
    }
}

/// Uniform pick from a non-empty operator set.
pub(crate) fn pick_operator<R: Rng + ?Sized>(operators: &[Operator], rng: &mut R) -> Operator {
    operators[rng.random_range(0..operators.len())]
}
