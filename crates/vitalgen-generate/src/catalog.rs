use chrono::NaiveDate;
use fake::Fake;
use fake::faker::name::en::Name;
use rand::Rng;

use vitalgen_core::{Domain, Error as CoreError, Field, FieldCatalog};

use crate::errors::GenerationError;

pub const PATIENT_NAME: &str = "patient-name";
pub const DATE_OF_BIRTH: &str = "DoB";
pub const HEIGHT: &str = "height";
pub const EYE_COLOR: &str = "eye-color";
pub const HEART_RATE: &str = "heart-rate";

pub const DEFAULT_NAME_POOL_SIZE: usize = 100;

const EYE_COLORS: &[&str] = &["blue", "green", "brown", "black", "grey"];

/// Build the patient-vitals catalog.
///
/// The name pool is drawn from `rng` once, so the same seed yields the same
/// pool. An empty pool is rejected as an invalid catalog.
pub fn patient_vitals_catalog<R: Rng>(
    rng: &mut R,
    name_pool_size: usize,
) -> Result<FieldCatalog, GenerationError> {
    let names: Vec<String> = (0..name_pool_size)
        .map(|_| Name().fake_with_rng::<String, _>(rng))
        .collect();

    let fields = vec![
        Field::new(PATIENT_NAME, Domain::Choice { values: names }),
        Field::new(
            DATE_OF_BIRTH,
            Domain::DateRange {
                min: date(1900, 1, 1)?,
                max: date(2010, 12, 31)?,
            },
        ),
        Field::new(
            HEIGHT,
            Domain::FloatRange {
                min: 1.50,
                max: 2.50,
                scale: 2,
            },
        ),
        Field::new(
            EYE_COLOR,
            Domain::Choice {
                values: EYE_COLORS.iter().map(|color| color.to_string()).collect(),
            },
        ),
        Field::new(HEART_RATE, Domain::IntRange { min: 50, max: 180 }),
    ];

    Ok(FieldCatalog::new(fields)?)
}

fn date(year: i32, month: u32, day: u32) -> Result<NaiveDate, GenerationError> {
    NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| {
        CoreError::InvalidCatalog(format!("invalid date {year}-{month}-{day}")).into()
    })
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use super::*;

    #[test]
    fn builds_five_fields_in_order() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let catalog = patient_vitals_catalog(&mut rng, 10).expect("catalog");
        let names: Vec<&str> = catalog.field_names().collect();
        assert_eq!(
            names,
            vec![PATIENT_NAME, DATE_OF_BIRTH, HEIGHT, EYE_COLOR, HEART_RATE]
        );
        match catalog.domain_of(PATIENT_NAME).expect("names") {
            Domain::Choice { values } => {
                assert_eq!(values.len(), 10);
                assert!(values.iter().all(|name| !name.is_empty()));
            }
            other => panic!("unexpected domain {other:?}"),
        }
    }

    #[test]
    fn name_pool_is_seeded() {
        let build = |seed| {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            patient_vitals_catalog(&mut rng, 5)
                .expect("catalog")
                .to_document()
        };
        assert_eq!(build(3), build(3));
    }

    #[test]
    fn empty_name_pool_is_invalid() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let result = patient_vitals_catalog(&mut rng, 0);
        assert!(matches!(
            result,
            Err(GenerationError::Core(CoreError::InvalidCatalog(_)))
        ));
    }
}
