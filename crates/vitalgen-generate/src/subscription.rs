use std::fmt;

use serde::Serialize;

use crate::constraint::Constraint;

/// Conjunction of constraints with at most one constraint per field.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Subscription {
    constraints: Vec<Constraint>,
}

impl Subscription {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `constraint` unless its field is already constrained.
    ///
    /// Returns `false` when the constraint was rejected.
    pub fn try_push(&mut self, constraint: Constraint) -> bool {
        if self.contains_field(constraint.field()) {
            return false;
        }
        self.constraints.push(constraint);
        true
    }

    pub fn contains_field(&self, field: &str) -> bool {
        self.constraints
            .iter()
            .any(|constraint| constraint.field() == field)
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    pub fn iter(&self) -> impl Iterator<Item = &Constraint> {
        self.constraints.iter()
    }

    pub fn len(&self) -> usize {
        self.constraints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.constraints.is_empty()
    }
}

impl fmt::Display for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, constraint) in self.constraints.iter().enumerate() {
            if idx > 0 {
                f.write_str(";")?;
            }
            write!(f, "{constraint}")?;
        }
        Ok(())
    }
}
