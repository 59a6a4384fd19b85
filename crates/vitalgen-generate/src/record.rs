use std::fmt;

use rand::Rng;
use serde::ser::{Serialize, SerializeMap, Serializer};

use vitalgen_core::{FieldCatalog, FieldValue};

use crate::sampler::ValueSampler;

/// One value for every catalog field, in catalog order.
#[derive(Debug, Clone, PartialEq)]
pub struct Publication {
    values: Vec<(String, FieldValue)>,
}

impl Publication {
    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.values
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, value)| value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.values
            .iter()
            .map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Rendered values, one per field, for delimited output.
    pub fn to_record(&self) -> Vec<String> {
        self.values
            .iter()
            .map(|(_, value)| value.to_string())
            .collect()
    }
}

/// Renders the same line `publications.csv` holds, quoting as needed.
impl fmt::Display for Publication {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(Vec::new());
        writer
            .write_record(self.to_record())
            .map_err(|_| fmt::Error)?;
        let bytes = writer.into_inner().map_err(|_| fmt::Error)?;
        let line = std::str::from_utf8(&bytes).map_err(|_| fmt::Error)?;
        f.write_str(line.strip_suffix('\n').unwrap_or(line))
    }
}

impl Serialize for Publication {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len()))?;
        for (name, value) in &self.values {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// Builds complete publications, sampling each field independently.
#[derive(Debug, Clone, Copy)]
pub struct RecordGenerator<'a> {
    sampler: ValueSampler<'a>,
}

impl<'a> RecordGenerator<'a> {
    pub fn new(catalog: &'a FieldCatalog) -> Self {
        Self {
            sampler: ValueSampler::new(catalog),
        }
    }

    pub fn sample_record<R: Rng + ?Sized>(&self, rng: &mut R) -> Publication {
        let values = self
            .sampler
            .catalog()
            .fields()
            .iter()
            .map(|field| (field.name.clone(), self.sampler.sample_field(field, rng)))
            .collect();
        Publication { values }
    }
}
