use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::catalog::DEFAULT_NAME_POOL_SIZE;
use crate::planner::{BucketSummary, GenerationRequest};

/// Options for the generation engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateOptions {
    /// Seed every random stream is derived from.
    pub seed: u64,
    /// Number of patient names in the built-in catalog.
    pub name_pool_size: usize,
    /// Directory where run artifacts are written.
    pub out_dir: PathBuf,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            seed: 42,
            name_pool_size: DEFAULT_NAME_POOL_SIZE,
            out_dir: PathBuf::from("runs"),
        }
    }
}

/// What a run should produce.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunRequest {
    pub publications: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subscriptions: Option<GenerationRequest>,
}

/// Report for a generation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationReport {
    pub run_id: String,
    pub seed: u64,
    pub publications: usize,
    pub subscriptions: usize,
    pub empty_subscriptions: usize,
    pub dropped_duplicates: usize,
    pub buckets: Vec<BucketSummary>,
    pub bytes_written: u64,
    pub duration_ms: u64,
}

impl GenerationReport {
    pub fn new(run_id: String, seed: u64) -> Self {
        Self {
            run_id,
            seed,
            publications: 0,
            subscriptions: 0,
            empty_subscriptions: 0,
            dropped_duplicates: 0,
            buckets: Vec::new(),
            bytes_written: 0,
            duration_ms: 0,
        }
    }
}
