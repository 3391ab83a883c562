pub(crate) use super::*;

fn sample_row(best: &str, r_squared: f64) -> BestModelRow {
    BestModelRow {
        benchmark: "sort".to_string(),
        step: 100,
        features: MetaFeatureVector::from_array([100.0, 2.0, 50.0, 0.3, 0.9, -0.2, r_squared]),
        best_model: best.to_string(),
    }
}

#[test]
fn test_corpus_round_trip_keeps_nan() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("bestPredictor_sort.csv");
    let rows = vec![sample_row("LinReg", 0.95), sample_row("kNN", f64::NAN)];
    write_corpus(&rows, &path).expect("writable");

    let header = std::fs::read_to_string(&path).expect("readable");
    assert!(header.starts_with(
        "benchmark,step,size,parameter_count,label_range,label_cv,\
         max_correlation,min_correlation,r_squared,best_model"
    ));

    let back = read_corpus(&path).expect("valid corpus");
    assert_eq!(back.len(), 2);
    assert_eq!(back[0], rows[0]);
    assert_eq!(back[1].best_model, "kNN");
    assert!(back[1].features.r_squared.is_nan());
}

#[test]
fn test_records_written_with_header() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("eval_sort.csv");
    let metrics = RegressionMetrics {
        mae: 1.5,
        mape: f64::NAN,
        rmse: 2.0,
        rrse: 40.0,
        correlation: 0.9,
    };
    let record = EvaluationRecord::new("sort", 10, "LinReg", false, 120, metrics);
    assert_eq!(record.metrics().mae, 1.5);
    assert!(record.metrics().mape.is_nan());
    write_records(&[record], &path).expect("writable");
    let text = std::fs::read_to_string(&path).expect("readable");
    let mut lines = text.lines();
    assert_eq!(
        lines.next(),
        Some("benchmark,step,model,recommended,train_micros,mae,mape,rmse,rrse,correlation")
    );
    let row = lines.next().expect("one record");
    assert!(row.starts_with("sort,10,LinReg,false,120,1.5,NaN,"));
}

#[test]
fn test_read_corpus_missing_file() {
    let dir = tempfile::tempdir().expect("temp dir");
    assert!(read_corpus(dir.path().join("missing.csv")).is_err());
}
