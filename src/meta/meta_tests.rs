pub(crate) use super::*;
use crate::features::MetaFeatureVector;
use crate::registry::ModelDescriptor;
use crate::models::ModelSpec;
use crate::table::Schema;

fn row(size: f64, r_squared: f64, best: &str) -> BestModelRow {
    BestModelRow {
        benchmark: "bench".to_string(),
        step: size as usize,
        features: MetaFeatureVector::from_array([size, 2.0, 100.0, 0.4, 0.8, 0.1, r_squared]),
        best_model: best.to_string(),
    }
}

fn corpus() -> Vec<BestModelRow> {
    vec![
        row(10.0, 0.99, "LinReg"),
        row(20.0, 0.98, "LinReg"),
        row(30.0, 0.97, "LinReg"),
        row(10.0, 0.20, "kNN"),
        row(20.0, 0.30, "kNN"),
        row(30.0, 0.25, "kNN"),
    ]
}

fn linear_table() -> ObservationTable {
    let rows = (1..=15)
        .map(|i| vec![i as f64, (i % 3) as f64, 2.0 * i as f64 + 1.0])
        .collect();
    let schema = Schema::numeric(&["a", "b"], "y").expect("unique names");
    ObservationTable::from_rows("linear", schema, rows)
        .expect("valid rows")
}

fn unpruned() -> MetaClassifierConfig {
    MetaClassifierConfig::default().with_pruning_folds(0)
}

#[test]
fn test_recommend_follows_r_squared() {
    let meta = MetaClassifier::train(Arc::new(ModelRegistry::standard()), &corpus(), &unpruned())
        .expect("non-empty corpus");
    assert_eq!(meta.classes(), &["LinReg".to_string(), "kNN".to_string()]);
    assert_eq!(meta.recommend(&linear_table()).expect("known model"), "LinReg");
}

#[test]
fn test_recommend_is_idempotent() {
    let meta = MetaClassifier::train(Arc::new(ModelRegistry::standard()), &corpus(), &unpruned())
        .expect("non-empty corpus");
    let table = linear_table();
    let first = meta.recommend(&table).expect("known model");
    for _ in 0..3 {
        assert_eq!(meta.recommend(&table).expect("known model"), first);
    }
}

#[test]
fn test_recommend_model_is_untrained() {
    let meta = MetaClassifier::train(Arc::new(ModelRegistry::standard()), &corpus(), &unpruned())
        .expect("non-empty corpus");
    let (name, model) = meta.recommend_model(&linear_table()).expect("known model");
    assert_eq!(name, "LinReg");
    assert!(!model.is_trained());
}

#[test]
fn test_unknown_recommendation() {
    let descriptors = vec![ModelDescriptor::new("kNN", ModelSpec::Mean)];
    let registry = ModelRegistry::from_descriptors(descriptors).expect("valid registry");
    let meta = MetaClassifier::train(Arc::new(registry), &corpus(), &unpruned())
        .expect("non-empty corpus");
    assert!(matches!(
        meta.recommend(&linear_table()),
        Err(RunpredictError::UnknownModel { name }) if name == "LinReg"
    ));
}

#[test]
fn test_small_table_fails_extraction() {
    let meta = MetaClassifier::train(Arc::new(ModelRegistry::standard()), &corpus(), &unpruned())
        .expect("non-empty corpus");
    let schema = Schema::numeric(&["a"], "y").expect("unique names");
    let table = ObservationTable::from_rows("one", schema, vec![vec![1.0, 2.0]])
        .expect("valid row");
    assert!(matches!(
        meta.recommend(&table),
        Err(RunpredictError::InsufficientData { .. })
    ));
}

#[test]
fn test_empty_corpus() {
    assert!(matches!(
        MetaClassifier::train(Arc::new(ModelRegistry::standard()), &[], &unpruned()),
        Err(RunpredictError::InsufficientData { .. })
    ));
}

#[test]
fn test_undefined_feature_follows_majority() {
    // a constant label makes r_squared NaN
    let mut rows = corpus();
    rows.push(row(40.0, 0.10, "kNN"));
    let meta = MetaClassifier::train(Arc::new(ModelRegistry::standard()), &rows, &unpruned())
        .expect("non-empty corpus");
    let flat = (1..=6).map(|i| vec![i as f64, 0.0, 5.0]).collect();
    let schema = Schema::numeric(&["a", "b"], "y").expect("unique names");
    let table = ObservationTable::from_rows("flat", schema, flat)
        .expect("valid rows");
    assert_eq!(meta.recommend(&table).expect("known model"), "kNN");
}

#[test]
fn test_json_round_trip() {
    let registry = Arc::new(ModelRegistry::standard());
    let meta = MetaClassifier::train(Arc::clone(&registry), &corpus(), &unpruned())
        .expect("non-empty corpus");
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("meta.json");
    meta.save_json(&path).expect("writable");
    let loaded = MetaClassifier::load_json(registry, &path).expect("readable");
    assert_eq!(loaded.classes(), meta.classes());
    assert_eq!(loaded.tree(), meta.tree());
    assert_eq!(
        loaded.recommend(&linear_table()).expect("known model"),
        meta.recommend(&linear_table()).expect("known model")
    );
}

#[test]
fn test_load_rejects_missing_class_name() {
    let registry = Arc::new(ModelRegistry::standard());
    let meta = MetaClassifier::train(Arc::clone(&registry), &corpus(), &unpruned())
        .expect("non-empty corpus");
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("meta.json");
    meta.save_json(&path).expect("writable");

    let text = std::fs::read_to_string(&path).expect("readable");
    let mut json: serde_json::Value = serde_json::from_str(&text).expect("valid json");
    json["classes"]
        .as_array_mut()
        .expect("class list")
        .pop();
    std::fs::write(&path, json.to_string()).expect("writable");

    assert!(matches!(
        MetaClassifier::load_json(registry, &path),
        Err(RunpredictError::Format { .. })
    ));
}

#[test]
fn test_class_without_name_is_unknown_model() {
    let rows = vec![row(10.0, 0.2, "kNN"), row(20.0, 0.3, "kNN")];
    let mut meta = MetaClassifier::train(Arc::new(ModelRegistry::standard()), &rows, &unpruned())
        .expect("non-empty corpus");
    meta.classes.clear();
    assert!(matches!(
        meta.recommend(&linear_table()),
        Err(RunpredictError::UnknownModel { .. })
    ));
}

#[test]
fn test_from_corpus_file() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("bestPredictor_total.csv");
    crate::evaluation::write_corpus(&corpus(), &path).expect("writable");
    let registry = Arc::new(ModelRegistry::standard());
    let meta =
        MetaClassifier::from_corpus_file(registry, &path, &unpruned()).expect("valid corpus");
    assert_eq!(meta.recommend(&linear_table()).expect("known model"), "LinReg");
}
