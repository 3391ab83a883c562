pub(crate) use super::*;
use crate::config::MetaClassifierConfig;
use crate::evaluation::BestModelRow;
use crate::features::MetaFeatureVector;
use crate::registry::ModelRegistry;
use crate::table::Schema;

fn meta() -> Arc<MetaClassifier> {
    let corpus: Vec<BestModelRow> = (0..2)
        .map(|i| BestModelRow {
            benchmark: "b".to_string(),
            step: i,
            features: MetaFeatureVector::from_array([i as f64; 7]),
            best_model: "LinReg".to_string(),
        })
        .collect();
    Arc::new(
        MetaClassifier::train(
            Arc::new(ModelRegistry::standard()),
            &corpus,
            &MetaClassifierConfig::default(),
        )
        .expect("non-empty corpus"),
    )
}

fn recorded(n: usize) -> ObservationTable {
    let rows = (0..n).map(|i| vec![i as f64, 10.0 * i as f64 + 5.0]).collect();
    let schema = Schema::numeric(&["n"], "Runtime(ns)").expect("unique names");
    ObservationTable::from_rows("replay", schema, rows).expect("valid rows")
}

#[test]
fn test_replay() {
    let mut sim = Simulation::new(recorded(50), meta(), PredictorConfig::default());
    let predictor = sim.start(10).expect("enough rows");
    assert_eq!(predictor.active_model(), "LinReg");
    assert_eq!(sim.position(), 10);

    sim.add_next(5).expect("rows remain");
    assert_eq!(sim.position(), 15);
    assert_eq!(sim.predictor().map(|p| p.table().len()), Some(15));

    let (predicted, recorded) = sim.predict_after(30).expect("unseen row");
    assert_eq!(recorded, 315.0);
    assert!((predicted - recorded).abs() < 1e-6);
    assert_eq!(sim.position(), 31);
}

#[test]
fn test_learned_row_rejected() {
    let mut sim = Simulation::new(recorded(50), meta(), PredictorConfig::default());
    sim.start(20).expect("enough rows");
    assert!(matches!(
        sim.predict_after(5),
        Err(RunpredictError::InsufficientData { .. })
    ));
    // row 20 is the next unseen row
    assert!(sim.predict_after(19).is_ok());
    assert_eq!(sim.position(), 20);
}

#[test]
fn test_bounds() {
    let mut sim = Simulation::new(recorded(12), meta(), PredictorConfig::default());
    assert!(sim.add_next(1).is_err());
    assert!(sim.start(13).is_err());
    sim.start(10).expect("enough rows");
    assert!(sim.add_next(3).is_err());
    assert_eq!(sim.position(), 10);
    assert!(sim.predict_after(11).is_err());
    assert!(sim.predict_after(10).is_ok());
}

#[test]
fn test_from_file() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("replay.csv");
    crate::table::io::write_csv(&recorded(20), &path).expect("writable");
    let mut sim =
        Simulation::from_file(&path, meta(), PredictorConfig::default()).expect("readable");
    sim.start(5).expect("enough rows");
    let (predicted, recorded) = sim.predict_after(12).expect("unseen row");
    assert!((predicted - recorded).abs() < 1e-6);
}
