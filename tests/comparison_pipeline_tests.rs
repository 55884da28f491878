//! End-to-end tests for report building from CSV observation tables

use rag_significance::comparison::{ComparisonCategory, MergePolicy, MultiMetricMerger};
use rag_significance::rendering::ReportFormat;
use rag_significance::{compare, ComparisonKey, ObservationTable, ReportConfig, ReportError, ReportPipeline};
use std::path::PathBuf;
use tempfile::TempDir;

const TWO_MODELS: &str = "\
model,score,recall
A,0.9,0.7
A,0.8,0.75
A,0.85,0.72
B,0.5,0.4
B,0.55,0.42
B,0.6,0.47
";

const THREE_MODELS: &str = "\
model,score
A,0.9
A,0.8
B,0.85
B,0.5
C,0.55
C,0.6
";

fn write_csv(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, content).unwrap();
    path
}

fn assert_close(actual: f64, expected: f64, tolerance: f64) {
    assert!(
        (actual - expected).abs() < tolerance,
        "expected {} to be within {} of {}",
        actual,
        tolerance,
        expected
    );
}

#[test]
fn test_two_groups_yield_single_t_test_row() {
    let table = ObservationTable::from_reader(TWO_MODELS.as_bytes()).unwrap();
    let results = compare(&table, &["model"], "score", "model_cmp").unwrap();

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].key, ComparisonKey::new("model_cmp", "A", "B"));
    assert_eq!(results[0].metric, "score");
    assert_close(results[0].p_value, 0.001_826_26, 1e-6);
}

#[test]
fn test_three_groups_yield_tukey_pairs() {
    let table = ObservationTable::from_reader(THREE_MODELS.as_bytes()).unwrap();
    let results = compare(&table, &["model"], "score", "model_cmp").unwrap();

    let pairs: Vec<(&str, &str)> = results
        .iter()
        .map(|r| (r.key.comp1.as_str(), r.key.comp2.as_str()))
        .collect();
    assert_eq!(pairs, vec![("A", "B"), ("A", "C"), ("B", "C")]);

    assert_close(results[0].p_value, 0.545_028, 1e-4);
    assert_close(results[1].p_value, 0.300_473, 1e-4);
    assert_close(results[2].p_value, 0.797_173, 1e-4);
}

#[test]
fn test_two_metrics_merge_into_one_row() {
    let table = ObservationTable::from_reader(TWO_MODELS.as_bytes()).unwrap();
    let categories = vec![ComparisonCategory::new("model_cmp", ["model"])];
    let report = MultiMetricMerger::default()
        .merge(&table, &categories, &["score", "recall"])
        .unwrap();

    assert_eq!(report.len(), 1);
    assert_eq!(report.headers(), vec!["category", "comp1", "comp2", "score", "recall"]);
    let key = ComparisonKey::new("model_cmp", "A", "B");
    assert_close(report.p_value(&key, "score").unwrap(), 0.001_826_26, 1e-6);
    assert!(report.p_value(&key, "recall").unwrap() < 0.01);
}

#[test]
fn test_composite_boolean_categories() {
    let csv = "\
agentic_retrieval,reranking,score
True,False,0.61
True,False,0.64
False,True,0.52
False,True,0.55
True,True,0.71
True,True,0.69
";
    let table = ObservationTable::from_reader(csv.as_bytes()).unwrap();
    let categories = vec![ComparisonCategory::new(
        "agentic_rerank",
        ["agentic_retrieval", "reranking"],
    )];
    let report = MultiMetricMerger::default()
        .merge(&table, &categories, &["score"])
        .unwrap();

    assert_eq!(report.len(), 3);
    assert_eq!(report.rows[0].key.comp1, "True, False");
    assert_eq!(report.rows[0].key.comp2, "False, True");
    assert_eq!(report.rows[2].key.comp2, "True, True");
}

#[test]
fn test_four_groups_abort_the_report() {
    let csv = "model,score\nA,1\nA,2\nB,3\nB,4\nC,5\nC,6\nD,7\nD,8\n";
    let table = ObservationTable::from_reader(csv.as_bytes()).unwrap();
    let categories = vec![ComparisonCategory::new("model_cmp", ["model"])];

    let err = MultiMetricMerger::default()
        .merge(&table, &categories, &["score"])
        .unwrap_err();
    assert!(err.is_cardinality_error());
    match err {
        ReportError::GroupCardinality { groups, .. } => assert_eq!(groups, 4),
        other => panic!("unexpected error: {}", other),
    }
}

#[test]
fn test_pipeline_writes_csv_report() {
    let temp_dir = TempDir::new().unwrap();
    let input = write_csv(&temp_dir, "observations.csv", TWO_MODELS);
    let output = temp_dir.path().join("reports").join("models.csv");

    let mut config = ReportConfig::ragas()
        .with_input(&input)
        .with_output(Some(output.clone()), ReportFormat::Csv)
        .with_merge_policy(MergePolicy::Strict);
    config.metrics = vec!["score".to_string(), "recall".to_string()];
    config.categories = vec![ComparisonCategory::new("model_cmp", ["model"])];

    let outcome = ReportPipeline::new(config).unwrap().run().unwrap();
    assert_eq!(outcome.rows_loaded, 6);
    assert_eq!(outcome.output.as_deref(), Some(output.as_path()));

    let written = std::fs::read_to_string(&output).unwrap();
    let mut lines = written.lines();
    assert_eq!(lines.next(), Some("category,comp1,comp2,score,recall"));
    assert!(lines.next().unwrap().starts_with("model_cmp,A,B,0.0018"));
    assert_eq!(lines.next(), None);
}

#[test]
fn test_pipeline_from_config_file() {
    let temp_dir = TempDir::new().unwrap();
    let input = write_csv(&temp_dir, "observations.csv", THREE_MODELS);
    let output = temp_dir.path().join("report.json");
    let config_path = temp_dir.path().join("report.toml");

    let mut config = ReportConfig::rouge()
        .with_input(&input)
        .with_output(Some(output.clone()), ReportFormat::Json);
    config.metrics = vec!["score".to_string()];
    config.categories = vec![ComparisonCategory::new("model_cmp", ["model"])];
    config.save_to_file(&config_path).unwrap();

    let loaded = ReportConfig::from_file(&config_path).unwrap();
    ReportPipeline::new(loaded).unwrap().run().unwrap();

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&output).unwrap()).unwrap();
    assert_eq!(json["metrics"], serde_json::json!(["score"]));
    assert_eq!(json["rows"].as_array().unwrap().len(), 3);
    assert_eq!(json["rows"][1]["comp2"], "C");
}

#[test]
fn test_missing_metric_column_fails() {
    let temp_dir = TempDir::new().unwrap();
    let input = write_csv(&temp_dir, "observations.csv", TWO_MODELS);

    let mut config = ReportConfig::ragas().with_input(&input).with_output(None, ReportFormat::Table);
    config.categories = vec![ComparisonCategory::new("model_cmp", ["model"])];

    let err = ReportPipeline::new(config).unwrap().run().unwrap_err();
    assert!(matches!(err, ReportError::MissingColumn { .. }));
}
