pub(crate) use super::*;
use crate::config::MetaClassifierConfig;
use crate::evaluation::BestModelRow;
use crate::features::MetaFeatureVector;
use crate::models::ModelSpec;
use crate::registry::ModelDescriptor;
use crate::table::Schema;

fn sample(recommended: &str, difference: f64) -> ComparisonSample {
    ComparisonSample {
        benchmark: "b".to_string(),
        step: 20,
        recommended: recommended.to_string(),
        difference,
    }
}

#[test]
fn test_report_statistics() {
    // differences 1, 2, 3, 4: mean 2.5, sd sqrt(5/3)
    let samples = vec![
        sample("kNN", 1.0),
        sample("kNN", 2.0),
        sample("LinReg", 3.0),
        sample("kNN", 4.0),
    ];
    let report = ComparisonReport::from_samples("SVR", samples).expect("non-empty");
    let sd = (5.0_f64 / 3.0).sqrt();
    assert!((report.mean - 2.5).abs() < 1e-12);
    assert!((report.std_dev - sd).abs() < 1e-12);
    let t = report.t_statistic().expect("spread present");
    assert!((t - 2.0 * 2.5 / sd).abs() < 1e-9);
    assert_eq!(report.degrees_of_freedom(), Some(3.0));
    let p = report.p_value().expect("spread present");
    assert!(p > 0.0 && p < 0.05);
    assert_eq!(report.baseline_picks, 0);
}

#[test]
fn test_zero_spread_has_no_test() {
    let samples = vec![sample("SVR", 0.0), sample("SVR", 0.0), sample("SVR", 0.0)];
    let report = ComparisonReport::from_samples("SVR", samples).expect("non-empty");
    assert_eq!(report.baseline_picks, 3);
    assert_eq!(report.mean, 0.0);
    assert!(report.test.is_none());
    assert!(report.p_value().is_none());
}

#[test]
fn test_empty_samples() {
    assert!(matches!(
        ComparisonReport::from_samples("SVR", Vec::new()),
        Err(RunpredictError::InsufficientData { .. })
    ));
}

fn registry() -> Arc<ModelRegistry> {
    Arc::new(
        ModelRegistry::from_descriptors(vec![
            ModelDescriptor::new("ZeroR", ModelSpec::Mean),
            ModelDescriptor::new("LinReg", ModelSpec::Linear { ridge: 1e-8 }),
        ])
        .expect("valid registry"),
    )
}

fn always(best: &str) -> Arc<MetaClassifier> {
    let corpus: Vec<BestModelRow> = (0..4)
        .map(|i| BestModelRow {
            benchmark: "b".to_string(),
            step: i,
            features: MetaFeatureVector::from_array([i as f64, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0]),
            best_model: best.to_string(),
        })
        .collect();
    Arc::new(
        MetaClassifier::train(registry(), &corpus, &MetaClassifierConfig::default())
            .expect("non-empty corpus"),
    )
}

fn linear_table(n: usize) -> ObservationTable {
    let rows = (0..n).map(|i| vec![i as f64, 4.0 * i as f64 + 1.0]).collect();
    let schema = Schema::numeric(&["n"], "t").expect("unique names");
    ObservationTable::from_rows("lin", schema, rows).expect("valid rows")
}

fn config() -> ComparisonConfig {
    ComparisonConfig::default()
        .with_steps(vec![5, 10, 30, 100])
        .with_test_size(20)
        .with_baseline("ZeroR")
}

#[test]
fn test_better_pick_has_positive_difference() {
    let comparison = PairedComparison::new(registry(), always("LinReg"), config()).expect("valid");
    let samples = comparison.compare_table(&linear_table(60)).expect("enough rows");
    // 40 rows available: steps 5, 10 and 30
    assert_eq!(samples.len(), 3);
    assert!(samples.iter().all(|s| s.difference > 0.0));
}

#[test]
fn test_baseline_pick_counts_zero() {
    let comparison = PairedComparison::new(registry(), always("ZeroR"), config()).expect("valid");
    let report = comparison.run(&[linear_table(60)]).expect("samples collected");
    assert_eq!(report.baseline_picks, 3);
    assert!(report.samples.iter().all(|s| s.difference == 0.0));
    assert!(report.test.is_none());
}

#[test]
fn test_unknown_baseline() {
    let config = config().with_baseline("SVR");
    assert!(matches!(
        PairedComparison::new(registry(), always("LinReg"), config),
        Err(RunpredictError::UnknownModel { .. })
    ));
}
