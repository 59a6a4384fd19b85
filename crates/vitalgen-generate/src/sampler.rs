use chrono::Duration;
use rand::Rng;

use vitalgen_core::{Domain, Field, FieldCatalog, FieldValue, round_to_scale};

use crate::errors::GenerationError;

/// Draws random values for catalog fields.
///
/// The sampler holds no randomness of its own; callers pass the random source
/// so a seeded generator makes every draw reproducible. Not meant to be shared
/// across threads without external synchronization of that source.
#[derive(Debug, Clone, Copy)]
pub struct ValueSampler<'a> {
    catalog: &'a FieldCatalog,
}

impl<'a> ValueSampler<'a> {
    pub fn new(catalog: &'a FieldCatalog) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &'a FieldCatalog {
        self.catalog
    }

    /// Sample one value for the named field.
    pub fn sample<R: Rng + ?Sized>(
        &self,
        field: &str,
        rng: &mut R,
    ) -> Result<FieldValue, GenerationError> {
        let field = self.catalog.field(field)?;
        Ok(self.sample_field(field, rng))
    }

    /// Sample one value for a field already resolved from the catalog.
    pub fn sample_field<R: Rng + ?Sized>(&self, field: &Field, rng: &mut R) -> FieldValue {
        sample_domain(&field.domain, rng)
    }
}

// Catalog construction guarantees non-empty choices, ordered bounds, a finite
// float width and float bounds on the scale grid.
fn sample_domain<R: Rng + ?Sized>(domain: &Domain, rng: &mut R) -> FieldValue {
    match domain {
        Domain::Choice { values } => {
            let idx = rng.random_range(0..values.len());
            FieldValue::Text(values[idx].clone())
        }
        Domain::IntRange { min, max } => FieldValue::Int(rng.random_range(*min..=*max)),
        Domain::FloatRange { min, max, scale } => {
            let raw = rng.random_range(*min..=*max);
            FieldValue::Float {
                value: round_to_scale(raw, *scale).clamp(*min, *max),
                scale: *scale,
            }
        }
        Domain::DateRange { min, max } => {
            let span = (*max - *min).num_days();
            let offset = rng.random_range(0..=span);
            FieldValue::Date(*min + Duration::days(offset))
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use vitalgen_core::Error as CoreError;

    use super::*;

    fn catalog() -> FieldCatalog {
        FieldCatalog::new(vec![
            Field::new(
                "height",
                Domain::FloatRange {
                    min: 1.5,
                    max: 2.5,
                    scale: 2,
                },
            ),
            Field::new("heart-rate", Domain::IntRange { min: 50, max: 180 }),
            Field::new(
                "DoB",
                Domain::DateRange {
                    min: NaiveDate::from_ymd_opt(1900, 1, 1).expect("date"),
                    max: NaiveDate::from_ymd_opt(2010, 12, 31).expect("date"),
                },
            ),
            Field::new(
                "eye-color",
                Domain::Choice {
                    values: vec!["blue".to_string(), "green".to_string()],
                },
            ),
        ])
        .expect("valid catalog")
    }

    #[test]
    fn values_stay_in_domain() {
        let catalog = catalog();
        let sampler = ValueSampler::new(&catalog);
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let min_date = NaiveDate::from_ymd_opt(1900, 1, 1).expect("date");
        let max_date = NaiveDate::from_ymd_opt(2010, 12, 31).expect("date");

        for _ in 0..500 {
            let height = sampler.sample("height", &mut rng).expect("height");
            let height = height.as_f64().expect("float");
            assert!((1.5..=2.5).contains(&height));
            assert_eq!((height * 100.0).round() / 100.0, height);

            let rate = sampler.sample("heart-rate", &mut rng).expect("rate");
            assert!((50..=180).contains(&rate.as_i64().expect("int")));

            let dob = sampler.sample("DoB", &mut rng).expect("dob");
            let dob = dob.as_date().expect("date");
            assert!(dob >= min_date && dob <= max_date);

            let eyes = sampler.sample("eye-color", &mut rng).expect("eyes");
            assert!(matches!(eyes.as_str(), Some("blue") | Some("green")));
        }
    }

    #[test]
    fn seeded_draws_repeat() {
        let catalog = catalog();
        let sampler = ValueSampler::new(&catalog);
        let draw = |seed| {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            (0..20)
                .map(|_| sampler.sample("DoB", &mut rng).expect("dob"))
                .collect::<Vec<_>>()
        };
        assert_eq!(draw(11), draw(11));
    }

    #[test]
    fn unknown_field_is_rejected() {
        let catalog = catalog();
        let sampler = ValueSampler::new(&catalog);
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let result = sampler.sample("weight", &mut rng);
        assert!(matches!(
            result,
            Err(GenerationError::Core(CoreError::UnknownField(_)))
        ));
    }

    #[test]
    fn fine_float_bounds_stay_in_range() {
        let catalog = FieldCatalog::new(vec![
            Field::new(
                "dose",
                Domain::FloatRange {
                    min: 0.01,
                    max: 0.04,
                    scale: 2,
                },
            ),
            Field::new(
                "ratio",
                Domain::FloatRange {
                    min: 0.000_000_000_001,
                    max: 0.000_000_000_009,
                    scale: 15,
                },
            ),
        ])
        .expect("valid catalog");
        let sampler = ValueSampler::new(&catalog);
        let mut rng = ChaCha8Rng::seed_from_u64(21);

        for _ in 0..500 {
            let dose = sampler.sample("dose", &mut rng).expect("dose");
            let dose = dose.as_f64().expect("float");
            assert!((0.01..=0.04).contains(&dose), "dose {dose} out of range");

            let ratio = sampler.sample("ratio", &mut rng).expect("ratio");
            let ratio = ratio.as_f64().expect("float");
            assert!(ratio.is_finite());
            assert!((0.000_000_000_001..=0.000_000_000_009).contains(&ratio));
        }
    }

    #[test]
    fn wide_float_range_samples_without_panicking() {
        let catalog = FieldCatalog::new(vec![Field::new(
            "offset",
            Domain::FloatRange {
                min: -1e300,
                max: 1e300,
                scale: 2,
            },
        )])
        .expect("valid catalog");
        let sampler = ValueSampler::new(&catalog);
        let mut rng = ChaCha8Rng::seed_from_u64(5);

        for _ in 0..100 {
            let value = sampler.sample("offset", &mut rng).expect("offset");
            let value = value.as_f64().expect("float");
            assert!((-1e300..=1e300).contains(&value));
        }
    }

    #[test]
    fn degenerate_ranges_return_the_bound() {
        let catalog = FieldCatalog::new(vec![Field::new(
            "heart-rate",
            Domain::IntRange { min: 72, max: 72 },
        )])
        .expect("valid catalog");
        let sampler = ValueSampler::new(&catalog);
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        assert_eq!(
            sampler.sample("heart-rate", &mut rng).expect("rate"),
            FieldValue::Int(72)
        );
    }
}
