use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize, Serializer};

/// Date layout used in catalogs and rendered output.
pub const DATE_FORMAT: &str = "%d-%m-%Y";

/// Largest number of decimal places a float domain may declare.
pub const MAX_FLOAT_SCALE: u32 = 15;

/// Round `value` to `scale` decimal places.
///
/// Values whose magnitude leaves no fractional digits at `scale` are returned
/// unchanged.
pub fn round_to_scale(value: f64, scale: u32) -> f64 {
    const INTEGRAL_LIMIT: f64 = 4_503_599_627_370_496.0; // 2^52

    let factor = 10_f64.powi(scale.min(MAX_FLOAT_SCALE) as i32);
    let scaled = value * factor;
    if !scaled.is_finite() || scaled.abs() >= INTEGRAL_LIMIT {
        return value;
    }
    scaled.round() / factor
}

/// Sampled value for a field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Int(i64),
    /// Float already rounded to `scale` decimal places.
    Float { value: f64, scale: u32 },
    Date(NaiveDate),
}

impl FieldValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Int(value) => Some(*value as f64),
            FieldValue::Float { value, .. } => Some(*value),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            FieldValue::Int(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Text(value) => Some(value.as_str()),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            FieldValue::Date(value) => Some(*value),
            _ => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Text(value) => f.write_str(value),
            FieldValue::Int(value) => write!(f, "{value}"),
            FieldValue::Float { value, scale } => {
                let scale = *scale as usize;
                write!(f, "{value:.scale$}")
            }
            FieldValue::Date(value) => write!(f, "{}", value.format(DATE_FORMAT)),
        }
    }
}

impl Serialize for FieldValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            FieldValue::Text(value) => serializer.serialize_str(value),
            FieldValue::Int(value) => serializer.serialize_i64(*value),
            FieldValue::Float { value, .. } => serializer.serialize_f64(*value),
            FieldValue::Date(value) => serializer.collect_str(&value.format(DATE_FORMAT)),
        }
    }
}

/// Comparison operator of a constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operator {
    #[serde(rename = "=")]
    Eq,
    #[serde(rename = "!=")]
    Ne,
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = "<=")]
    Le,
    #[serde(rename = ">=")]
    Ge,
}

impl Operator {
    /// The full operator set constraints are sampled from.
    pub const ALL: [Operator; 6] = [
        Operator::Eq,
        Operator::Ne,
        Operator::Lt,
        Operator::Gt,
        Operator::Le,
        Operator::Ge,
    ];

    /// Every operator except `=`.
    pub const NON_EQUALITY: [Operator; 5] = [
        Operator::Ne,
        Operator::Lt,
        Operator::Gt,
        Operator::Le,
        Operator::Ge,
    ];

    pub fn symbol(self) -> &'static str {
        match self {
            Operator::Eq => "=",
            Operator::Ne => "!=",
            Operator::Lt => "<",
            Operator::Gt => ">",
            Operator::Le => "<=",
            Operator::Ge => ">=",
        }
    }

    pub fn from_symbol(symbol: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.symbol() == symbol)
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}
