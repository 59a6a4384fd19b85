use std::path::PathBuf;
use std::time::Instant;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{info, warn};

use vitalgen_core::{Error as CoreError, FieldCatalog, FieldPercentage};

use crate::catalog::patient_vitals_catalog;
use crate::errors::GenerationError;
use crate::model::{GenerateOptions, GenerationReport, RunRequest};
use crate::output::csv::write_publications_csv;
use crate::output::text::write_subscriptions;
use crate::planner::{DistributionPlanner, GenerationRequest, SubscriptionPlan};
use crate::record::{Publication, RecordGenerator};
use crate::subscription::Subscription;

const CATALOG_STREAM: &str = "catalog.names";
const PUBLICATIONS_STREAM: &str = "publications";
const SUBSCRIPTIONS_STREAM: &str = "subscriptions";

/// Generate `count` subscriptions honoring the requested field percentages
/// and equality share.
pub fn generate_subscriptions<R: Rng + ?Sized>(
    catalog: &FieldCatalog,
    count: i64,
    field_percentages: Vec<FieldPercentage>,
    equality_target: FieldPercentage,
    rng: &mut R,
) -> Result<Vec<Subscription>, GenerationError> {
    let request = GenerationRequest::new(count, field_percentages, equality_target);
    DistributionPlanner::new(catalog)
        .plan(request, rng)
        .map(SubscriptionPlan::into_subscriptions)
}

/// Generate `count` independent publications.
pub fn generate_publications<R: Rng + ?Sized>(
    catalog: &FieldCatalog,
    count: i64,
    rng: &mut R,
) -> Result<Vec<Publication>, GenerationError> {
    let count = validate_count(count)?;
    let generator = RecordGenerator::new(catalog);
    Ok((0..count).map(|_| generator.sample_record(rng)).collect())
}

/// Result of a generation run.
#[derive(Debug, Clone)]
pub struct GenerationResult {
    pub run_dir: PathBuf,
    pub report: GenerationReport,
}

/// Seeded entry point: every output is a pure function of the configured seed
/// and the request.
#[derive(Debug, Clone)]
pub struct GenerationEngine {
    options: GenerateOptions,
}

impl GenerationEngine {
    pub fn new(options: GenerateOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &GenerateOptions {
        &self.options
    }

    /// Built-in patient-vitals catalog with a seeded name pool.
    pub fn patient_vitals_catalog(&self) -> Result<FieldCatalog, GenerationError> {
        let mut rng = self.rng_for(CATALOG_STREAM);
        patient_vitals_catalog(&mut rng, self.options.name_pool_size)
    }

    pub fn subscriptions(
        &self,
        catalog: &FieldCatalog,
        request: GenerationRequest,
    ) -> Result<SubscriptionPlan, GenerationError> {
        let start = Instant::now();
        let count = request.count;
        let mut rng = self.rng_for(SUBSCRIPTIONS_STREAM);
        let plan = DistributionPlanner::new(catalog).plan(request, &mut rng)?;

        info!(
            seed = self.options.seed,
            count,
            dropped_duplicates = plan.dropped_duplicates,
            duration_ms = start.elapsed().as_millis() as u64,
            "subscriptions generated"
        );
        Ok(plan)
    }

    pub fn publications(
        &self,
        catalog: &FieldCatalog,
        count: i64,
    ) -> Result<Vec<Publication>, GenerationError> {
        let start = Instant::now();
        let mut rng = self.rng_for(PUBLICATIONS_STREAM);
        let publications = generate_publications(catalog, count, &mut rng)?;

        info!(
            seed = self.options.seed,
            count = publications.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "publications generated"
        );
        Ok(publications)
    }

    /// Generate everything `request` asks for and write it under a fresh run
    /// directory in `out_dir`.
    ///
    /// The request is validated before the directory is created, so a
    /// rejected request leaves nothing behind.
    pub fn run(
        &self,
        catalog: &FieldCatalog,
        request: RunRequest,
    ) -> Result<GenerationResult, GenerationError> {
        validate_count(request.publications)?;
        if let Some(subscriptions) = &request.subscriptions {
            subscriptions.validate(catalog)?;
        }

        let start = Instant::now();
        let run_id = uuid::Uuid::new_v4().to_string();
        let timestamp = chrono::Utc::now().format("%Y-%m-%dT%H-%M-%SZ").to_string();
        let run_dir = self
            .options
            .out_dir
            .join(format!("{timestamp}__run_{run_id}"));
        std::fs::create_dir_all(&run_dir)?;

        info!(
            run_id = %run_id,
            seed = self.options.seed,
            publications = request.publications,
            subscriptions = ?request.subscriptions.as_ref().map(|s| s.count),
            "generation started"
        );

        let mut report = GenerationReport::new(run_id.clone(), self.options.seed);

        let publications = self.publications(catalog, request.publications)?;
        report.publications = publications.len();
        report.bytes_written +=
            write_publications_csv(&run_dir.join("publications.csv"), &publications)?;

        if let Some(subscriptions) = request.subscriptions {
            let plan = self.subscriptions(catalog, subscriptions)?;
            report.subscriptions = plan.subscriptions.len();
            report.empty_subscriptions = plan
                .subscriptions
                .iter()
                .filter(|subscription| subscription.is_empty())
                .count();
            report.dropped_duplicates = plan.dropped_duplicates;
            report.bytes_written +=
                write_subscriptions(&run_dir.join("subscriptions.txt"), &plan.subscriptions)?;
            if report.empty_subscriptions > 0 {
                warn!(
                    run_id = %run_id,
                    empty = report.empty_subscriptions,
                    "some subscription slots received no constraints"
                );
            }
            report.buckets = plan.buckets;
        }

        report.duration_ms = start.elapsed().as_millis() as u64;
        std::fs::write(
            run_dir.join("generation_report.json"),
            serde_json::to_vec_pretty(&report)?,
        )?;

        info!(
            run_id = %run_id,
            publications = report.publications,
            subscriptions = report.subscriptions,
            bytes_written = report.bytes_written,
            duration_ms = report.duration_ms,
            "generation completed"
        );

        Ok(GenerationResult { run_dir, report })
    }

    fn rng_for(&self, stream: &str) -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(hash_seed(self.options.seed, stream))
    }
}

fn validate_count(count: i64) -> Result<usize, GenerationError> {
    usize::try_from(count).map_err(|_| CoreError::InvalidCount(count).into())
}

fn hash_seed(seed: u64, key: &str) -> u64 {
    let mut hash = seed ^ 0xcbf29ce484222325;
    for byte in key.as_bytes() {
        hash ^= *byte as u64;
        hash = hash.wrapping_mul(0x100000001b3);
    }
    hash
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn streams_get_distinct_seeds() {
        assert_ne!(
            hash_seed(42, PUBLICATIONS_STREAM),
            hash_seed(42, SUBSCRIPTIONS_STREAM)
        );
        assert_ne!(hash_seed(1, CATALOG_STREAM), hash_seed(2, CATALOG_STREAM));
        assert_eq!(hash_seed(7, CATALOG_STREAM), hash_seed(7, CATALOG_STREAM));
    }

    #[test]
    fn negative_publication_count_is_rejected() {
        let engine = GenerationEngine::new(GenerateOptions::default());
        let catalog = engine.patient_vitals_catalog().expect("catalog");
        let result = engine.publications(&catalog, -1);
        assert!(matches!(
            result,
            Err(GenerationError::Core(CoreError::InvalidCount(-1)))
        ));
    }
}
