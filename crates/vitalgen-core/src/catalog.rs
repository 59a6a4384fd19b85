use std::collections::HashMap;

use chrono::NaiveDate;
use schemars::JsonSchema;
use schemars::schema::RootSchema;
use schemars::schema_for;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::value::{DATE_FORMAT, MAX_FLOAT_SCALE, round_to_scale};

/// Rule governing the legal values of a field.
#[derive(Debug, Clone, PartialEq)]
pub enum Domain {
    /// Uniform pick from a fixed pool.
    Choice { values: Vec<String> },
    /// Uniform integer in `[min, max]`.
    IntRange { min: i64, max: i64 },
    /// Uniform float in `[min, max]`, rounded to `scale` decimal places.
    FloatRange { min: f64, max: f64, scale: u32 },
    /// Uniform whole day in `[min, max]`.
    DateRange { min: NaiveDate, max: NaiveDate },
}

impl Domain {
    pub fn kind(&self) -> &'static str {
        match self {
            Domain::Choice { .. } => "choice",
            Domain::IntRange { .. } => "int_range",
            Domain::FloatRange { .. } => "float_range",
            Domain::DateRange { .. } => "date_range",
        }
    }

    fn validate(&self, field: &str) -> Result<()> {
        let invalid = |msg: &str| Err(Error::InvalidCatalog(format!("field '{field}': {msg}")));
        match self {
            Domain::Choice { values } if values.is_empty() => invalid("choice set is empty"),
            Domain::IntRange { min, max } if min > max => invalid("min is greater than max"),
            Domain::FloatRange { min, max, .. } if !min.is_finite() || !max.is_finite() => {
                invalid("bounds must be finite")
            }
            Domain::FloatRange { min, max, .. } if min > max => invalid("min is greater than max"),
            Domain::FloatRange { scale, .. } if *scale > MAX_FLOAT_SCALE => {
                invalid(&format!("scale must be at most {MAX_FLOAT_SCALE}"))
            }
            Domain::FloatRange { min, max, .. } if !(max - min).is_finite() => {
                invalid("range width overflows")
            }
            Domain::FloatRange { min, max, scale }
                if round_to_scale(*min, *scale) != *min || round_to_scale(*max, *scale) != *max =>
            {
                invalid(&format!("bounds must have at most {scale} decimal places"))
            }
            Domain::DateRange { min, max } if min > max => invalid("min is greater than max"),
            _ => Ok(()),
        }
    }
}

/// Named attribute of a publication or predicate.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: String,
    pub domain: Domain,
}

impl Field {
    pub fn new(name: impl Into<String>, domain: Domain) -> Self {
        Self {
            name: name.into(),
            domain,
        }
    }
}

/// Immutable set of known fields, in declaration order.
///
/// Built once per run and shared by reference; nothing mutates it after
/// construction.
#[derive(Debug, Clone)]
pub struct FieldCatalog {
    fields: Vec<Field>,
    index: HashMap<String, usize>,
}

impl FieldCatalog {
    /// Build a catalog, rejecting duplicate names and degenerate domains.
    pub fn new(fields: Vec<Field>) -> Result<Self> {
        let mut index = HashMap::with_capacity(fields.len());
        for (position, field) in fields.iter().enumerate() {
            if field.name.trim().is_empty() {
                return Err(Error::InvalidCatalog(format!(
                    "field #{position} has an empty name"
                )));
            }
            field.domain.validate(&field.name)?;
            if index.insert(field.name.clone(), position).is_some() {
                return Err(Error::InvalidCatalog(format!(
                    "duplicate field '{}'",
                    field.name
                )));
            }
        }

        Ok(Self { fields, index })
    }

    pub fn from_document(document: CatalogDocument) -> Result<Self> {
        let fields = document
            .fields
            .into_iter()
            .map(|spec| {
                let domain = spec.domain.into_domain(&spec.name)?;
                Ok(Field::new(spec.name, domain))
            })
            .collect::<Result<Vec<_>>>()?;
        Self::new(fields)
    }

    pub fn to_document(&self) -> CatalogDocument {
        CatalogDocument {
            fields: self
                .fields
                .iter()
                .map(|field| FieldSpec {
                    name: field.name.clone(),
                    domain: DomainSpec::from(&field.domain),
                })
                .collect(),
        }
    }

    pub fn field(&self, name: &str) -> Result<&Field> {
        self.index
            .get(name)
            .map(|position| &self.fields[*position])
            .ok_or_else(|| Error::UnknownField(name.to_string()))
    }

    pub fn domain_of(&self, name: &str) -> Result<&Domain> {
        self.field(name).map(|field| &field.domain)
    }

    /// Fail with `UnknownField` unless `name` is in the catalog.
    pub fn require(&self, name: &str) -> Result<()> {
        self.field(name).map(|_| ())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|field| field.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Serializable catalog definition (TOML or JSON).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CatalogDocument {
    pub fields: Vec<FieldSpec>,
}

/// Serialized field entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct FieldSpec {
    pub name: String,
    pub domain: DomainSpec,
}

/// Serialized domain; dates use `DD-MM-YYYY`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DomainSpec {
    Choice {
        values: Vec<String>,
    },
    IntRange {
        min: i64,
        max: i64,
    },
    FloatRange {
        min: f64,
        max: f64,
        /// Decimal places kept after sampling.
        #[serde(default = "default_scale")]
        scale: u32,
    },
    DateRange {
        min: String,
        max: String,
    },
}

fn default_scale() -> u32 {
    2
}

impl DomainSpec {
    fn into_domain(self, field: &str) -> Result<Domain> {
        Ok(match self {
            DomainSpec::Choice { values } => Domain::Choice { values },
            DomainSpec::IntRange { min, max } => Domain::IntRange { min, max },
            DomainSpec::FloatRange { min, max, scale } => Domain::FloatRange { min, max, scale },
            DomainSpec::DateRange { min, max } => Domain::DateRange {
                min: parse_date(field, &min)?,
                max: parse_date(field, &max)?,
            },
        })
    }
}

impl From<&Domain> for DomainSpec {
    fn from(domain: &Domain) -> Self {
        match domain {
            Domain::Choice { values } => DomainSpec::Choice {
                values: values.clone(),
            },
            Domain::IntRange { min, max } => DomainSpec::IntRange {
                min: *min,
                max: *max,
            },
            Domain::FloatRange { min, max, scale } => DomainSpec::FloatRange {
                min: *min,
                max: *max,
                scale: *scale,
            },
            Domain::DateRange { min, max } => DomainSpec::DateRange {
                min: min.format(DATE_FORMAT).to_string(),
                max: max.format(DATE_FORMAT).to_string(),
            },
        }
    }
}

fn parse_date(field: &str, value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value, DATE_FORMAT).map_err(|err| {
        Error::InvalidCatalog(format!(
            "field '{field}': invalid date '{value}' ({err}), expected DD-MM-YYYY"
        ))
    })
}

/// JSON Schema describing [`CatalogDocument`].
pub fn catalog_document_schema() -> RootSchema {
    schema_for!(CatalogDocument)
}
