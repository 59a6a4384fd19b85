use std::fs;
use std::path::PathBuf;

use vitalgen_core::{Error as CoreError, FieldPercentage};
use vitalgen_generate::catalog::{HEART_RATE, HEIGHT};
use vitalgen_generate::{
    GenerateOptions, GenerationEngine, GenerationError, GenerationRequest, RunRequest,
};

fn temp_out_dir(label: &str) -> PathBuf {
    let mut dir = std::env::temp_dir();
    dir.push(format!("vitalgen_generate_{label}_{}", uuid::Uuid::new_v4()));
    fs::create_dir_all(&dir).expect("create temp out dir");
    dir
}

fn engine(out_dir: PathBuf) -> GenerationEngine {
    GenerationEngine::new(GenerateOptions {
        out_dir,
        ..GenerateOptions::default()
    })
}

fn run_request(subscriptions: i64) -> RunRequest {
    RunRequest {
        publications: 15,
        subscriptions: Some(GenerationRequest::new(
            subscriptions,
            vec![FieldPercentage::new(HEIGHT, 50.0)],
            FieldPercentage::new(HEART_RATE, 40.0),
        )),
    }
}

#[test]
fn run_writes_artifacts() {
    let engine = engine(temp_out_dir("artifacts"));
    let catalog = engine.patient_vitals_catalog().expect("catalog");

    let result = engine.run(&catalog, run_request(12)).expect("run");

    let publications =
        fs::read_to_string(result.run_dir.join("publications.csv")).expect("read publications");
    assert_eq!(publications.lines().count(), 15);

    let subscriptions =
        fs::read_to_string(result.run_dir.join("subscriptions.txt")).expect("read subscriptions");
    assert_eq!(subscriptions.lines().count(), 12);

    let report: serde_json::Value = serde_json::from_str(
        &fs::read_to_string(result.run_dir.join("generation_report.json")).expect("read report"),
    )
    .expect("parse report");
    assert_eq!(report.get("publications").and_then(|v| v.as_u64()), Some(15));
    assert_eq!(report.get("subscriptions").and_then(|v| v.as_u64()), Some(12));

    let height = report
        .get("buckets")
        .and_then(|value| value.as_array())
        .and_then(|buckets| {
            buckets
                .iter()
                .find(|bucket| bucket.get("field") == Some(&serde_json::json!(HEIGHT)))
        })
        .expect("height bucket");
    assert_eq!(height.get("generated").and_then(|v| v.as_u64()), Some(6));
    assert_eq!(
        report.get("run_id").and_then(|v| v.as_str()),
        Some(result.report.run_id.as_str())
    );
}

#[test]
fn run_output_is_deterministic() {
    let engine_a = engine(temp_out_dir("run_a"));
    let engine_b = engine(temp_out_dir("run_b"));
    let catalog_a = engine_a.patient_vitals_catalog().expect("catalog A");
    let catalog_b = engine_b.patient_vitals_catalog().expect("catalog B");

    let result_a = engine_a.run(&catalog_a, run_request(30)).expect("run A");
    let result_b = engine_b.run(&catalog_b, run_request(30)).expect("run B");

    for artifact in ["publications.csv", "subscriptions.txt"] {
        let a = fs::read_to_string(result_a.run_dir.join(artifact)).expect("read A");
        let b = fs::read_to_string(result_b.run_dir.join(artifact)).expect("read B");
        assert_eq!(a, b, "{artifact} should be deterministic");
    }
}

#[test]
fn rejected_run_leaves_no_directory() {
    let out_dir = temp_out_dir("rejected");
    let engine = engine(out_dir.clone());
    let catalog = engine.patient_vitals_catalog().expect("catalog");

    let result = engine.run(&catalog, run_request(-5));

    assert!(matches!(
        result,
        Err(GenerationError::Core(CoreError::InvalidCount(-5)))
    ));
    let entries = fs::read_dir(&out_dir).expect("read out dir").count();
    assert_eq!(entries, 0);
}
