pub(crate) use super::*;
use crate::models::ModelSpec;
use crate::registry::ModelDescriptor;
use crate::table::Schema;

fn small_registry() -> Arc<ModelRegistry> {
    Arc::new(
        ModelRegistry::from_descriptors(vec![
            ModelDescriptor::new("ZeroR", ModelSpec::Mean),
            ModelDescriptor::new("LinReg", ModelSpec::Linear { ridge: 1e-8 }),
            ModelDescriptor::new(
                "CART",
                ModelSpec::Tree {
                    max_depth: None,
                    min_samples_leaf: 2,
                },
            ),
        ])
        .expect("valid registry"),
    )
}

fn linear_table(name: &str, n: usize) -> ObservationTable {
    let rows = (0..n)
        .map(|i| vec![i as f64, (i % 4) as f64, 5.0 * i as f64 + 3.0 * (i % 4) as f64 + 10.0])
        .collect();
    let schema = Schema::numeric(&["a", "b"], "y").expect("unique names");
    ObservationTable::from_rows(name, schema, rows).expect("valid rows")
}

fn config(dir: &std::path::Path) -> HarnessConfig {
    HarnessConfig::default()
        .with_steps(vec![10, 20, 50])
        .with_test_size(20)
        .with_evaluation_dir(dir)
}

#[test]
fn test_steps_stop_at_available_rows() {
    let dir = tempfile::tempdir().expect("temp dir");
    let harness =
        StepwiseEvaluation::new(small_registry(), config(dir.path())).expect("valid config");
    let report = harness.evaluate_table(&linear_table("lin", 60)).expect("enough rows");
    // 40 rows after the held-out slice: steps 10 and 20 run, 50 does not
    assert_eq!(report.records.len(), 2 * 3);
    assert_eq!(report.corpus.len(), 2);
    assert!(report.records.iter().all(|r| r.step == 10 || r.step == 20));
}

#[test]
fn test_linear_model_wins_linear_table() {
    let dir = tempfile::tempdir().expect("temp dir");
    let harness =
        StepwiseEvaluation::new(small_registry(), config(dir.path())).expect("valid config");
    let report = harness.evaluate_table(&linear_table("lin", 60)).expect("enough rows");
    assert!(report.corpus.iter().all(|row| row.best_model == "LinReg"));
    assert_eq!(report.corpus[0].features.size, 10.0);
}

#[test]
fn test_table_too_small() {
    let dir = tempfile::tempdir().expect("temp dir");
    let harness =
        StepwiseEvaluation::new(small_registry(), config(dir.path())).expect("valid config");
    assert!(matches!(
        harness.evaluate_table(&linear_table("tiny", 20)),
        Err(RunpredictError::InsufficientData { .. })
    ));
    // run skips it instead of failing
    let report = harness.run(&[linear_table("tiny", 20), linear_table("lin", 60)]);
    assert_eq!(report.corpus.len(), 2);
}

#[test]
fn test_best_model_ignores_nan_and_picks() {
    let metrics = |mae: f64| crate::metrics::RegressionMetrics {
        mae,
        mape: f64::NAN,
        rmse: mae,
        rrse: mae,
        correlation: 1.0,
    };
    let records = vec![
        EvaluationRecord::new("b", 10, "A", false, 1, metrics(3.0)),
        EvaluationRecord::new("b", 10, "B", false, 1, metrics(f64::NAN)),
        EvaluationRecord::new("b", 10, "C", false, 1, metrics(2.0)),
        EvaluationRecord::new("b", 10, "D", true, 1, metrics(1.0)),
    ];
    assert_eq!(best_model(&records, ScoringMetric::Mae), Some("C"));
    assert_eq!(best_model(&records, ScoringMetric::Mape), None);
}

#[test]
fn test_run_and_write_outputs() {
    let dir = tempfile::tempdir().expect("temp dir");
    let harness =
        StepwiseEvaluation::new(small_registry(), config(dir.path())).expect("valid config");
    let report = harness
        .run_and_write(&[linear_table("lin", 60), linear_table("other", 45)])
        .expect("writable directory");
    assert!(dir.path().join("eval_lin.csv").exists());
    assert!(dir.path().join("bestPredictor_lin.csv").exists());
    assert!(dir.path().join("eval_other.csv").exists());
    let total = crate::evaluation::read_corpus(dir.path().join("bestPredictor_total.csv"))
        .expect("readable corpus");
    assert_eq!(total, report.corpus);
    // 60 rows: steps 10, 20; 45 rows: steps 10, 20
    assert_eq!(total.len(), 4);
}

#[test]
fn test_meta_pick_recorded() {
    let dir = tempfile::tempdir().expect("temp dir");
    let registry = small_registry();
    let plain =
        StepwiseEvaluation::new(Arc::clone(&registry), config(dir.path())).expect("valid config");
    let corpus = plain.run(&[linear_table("lin", 60)]).corpus;
    let meta = MetaClassifier::train(
        Arc::clone(&registry),
        &corpus,
        &crate::config::MetaClassifierConfig::default().with_pruning_folds(0),
    )
    .expect("non-empty corpus");

    let harness = plain.with_meta_classifier(Arc::new(meta));
    let report = harness.evaluate_table(&linear_table("lin", 60)).expect("enough rows");
    let picks: Vec<&EvaluationRecord> = report.records.iter().filter(|r| r.recommended).collect();
    assert_eq!(picks.len(), 2);
    assert!(picks.iter().all(|r| r.model == "LinReg"));
}

#[test]
fn test_invalid_config() {
    let config = HarnessConfig::default().with_steps(vec![]);
    assert!(StepwiseEvaluation::new(small_registry(), config).is_err());
}
