//! Workload synthesis for content-based publish/subscribe matchers.
//!
//! Produces random patient-vitals publications and subscription filters whose
//! per-field participation and equality share follow requested percentages.
//! Everything is a pure function of the seed and the inputs.

pub mod catalog;
pub mod constraint;
pub mod engine;
pub mod errors;
pub mod model;
pub mod output;
pub mod planner;
pub mod record;
pub mod sampler;
pub mod subscription;

pub use catalog::patient_vitals_catalog;
pub use constraint::{Constraint, ConstraintFactory};
pub use engine::{GenerationEngine, GenerationResult, generate_publications, generate_subscriptions};
pub use errors::GenerationError;
pub use model::{GenerateOptions, GenerationReport, RunRequest};
pub use planner::{BucketSummary, DistributionPlanner, GenerationRequest, SubscriptionPlan};
pub use record::{Publication, RecordGenerator};
pub use sampler::ValueSampler;
pub use subscription::Subscription;
