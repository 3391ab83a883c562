pub(crate) use super::*;

fn sample_table() -> ObservationTable {
    let schema = Schema::numeric(&["n", "m"], "runtime").expect("unique names");
    let rows = (0..10)
        .map(|i| vec![i as f64, (i * 2) as f64, (i * 10) as f64])
        .collect();
    ObservationTable::from_rows("sample", schema, rows).expect("valid rows")
}

#[test]
fn test_schema_requires_label() {
    assert!(matches!(
        Schema::new(vec![]),
        Err(RunpredictError::InsufficientData { .. })
    ));
}

#[test]
fn test_numeric_schema_rejects_duplicate_names() {
    assert!(matches!(
        Schema::numeric(&["n", "n"], "runtime"),
        Err(RunpredictError::SchemaMismatch { .. })
    ));
    assert!(Schema::numeric(&["runtime"], "runtime").is_err());
}

#[test]
fn test_schema_deserialize_validates() {
    assert!(serde_json::from_str::<Schema>("[]").is_err());
    let duplicate = r#"[{"name":"x","kind":"Numeric"},{"name":"x","kind":"Numeric"}]"#;
    assert!(serde_json::from_str::<Schema>(duplicate).is_err());

    let schema = Schema::numeric(&["n", "m"], "runtime").expect("unique names");
    let json = serde_json::to_string(&schema).expect("serializable");
    let back: Schema = serde_json::from_str(&json).expect("valid schema");
    assert_eq!(back, schema);
    assert_eq!(back.n_inputs(), 2);
}

#[test]
fn test_schema_rejects_nominal_label() {
    let attrs = vec![
        Attribute::numeric("x"),
        Attribute::nominal("y", vec!["a".into(), "b".into()]),
    ];
    assert!(matches!(
        Schema::new(attrs),
        Err(RunpredictError::SchemaMismatch { .. })
    ));
}

#[test]
fn test_schema_rejects_duplicate_names() {
    let attrs = vec![Attribute::numeric("x"), Attribute::numeric("x")];
    assert!(Schema::new(attrs).is_err());
}

#[test]
fn test_with_inputs_names() {
    let schema = Schema::with_inputs(2);
    let names: Vec<&str> = schema.attributes().iter().map(|a| a.name.as_str()).collect();
    assert_eq!(names, vec!["InputParam_0", "InputParam_1", "Runtime(ns)"]);
    assert_eq!(schema.n_inputs(), 2);
}

#[test]
fn test_parse_line_with_and_without_label() {
    let schema = Schema::with_inputs(2);
    assert_eq!(
        schema.parse_line("1, 2,3", true).expect("three numbers"),
        vec![1.0, 2.0, 3.0]
    );
    assert_eq!(
        schema.parse_line("1,2", false).expect("two numbers"),
        vec![1.0, 2.0]
    );
}

#[test]
fn test_parse_line_rejects_wrong_arity() {
    let schema = Schema::with_inputs(2);
    let err = schema.parse_line("1,2", true).expect_err("label missing");
    assert!(matches!(err, RunpredictError::SchemaMismatch { .. }));
}

#[test]
fn test_parse_line_rejects_non_numeric() {
    let schema = Schema::with_inputs(1);
    let err = schema.parse_line("abc,3", true).expect_err("not a number");
    assert!(err.to_string().contains("numeric value for InputParam_0"));
}

#[test]
fn test_parse_line_nominal() {
    let schema = Schema::new(vec![
        Attribute::nominal("algo", vec!["quick".into(), "merge".into()]),
        Attribute::numeric("runtime"),
    ])
    .expect("valid schema");
    assert_eq!(
        schema.parse_line("merge,7", true).expect("known value"),
        vec![1.0, 7.0]
    );
    assert!(schema.parse_line("heap,7", true).is_err());
}

#[test]
fn test_push_rejects_bad_row_and_keeps_table() {
    let mut table = sample_table();
    assert!(table.push(vec![1.0, 2.0]).is_err());
    assert!(table.push_csv("1,x,3").is_err());
    assert_eq!(table.len(), 10);
}

#[test]
fn test_push_rejects_invalid_nominal_index() {
    let schema = Schema::new(vec![
        Attribute::nominal("algo", vec!["quick".into()]),
        Attribute::numeric("runtime"),
    ])
    .expect("valid schema");
    let mut table = ObservationTable::new("t", schema);
    assert!(table.push(vec![3.0, 1.0]).is_err());
    assert!(table.push(vec![0.0, 1.0]).is_ok());
}

#[test]
fn test_accessors() {
    let table = sample_table();
    assert_eq!(table.features(3), &[3.0, 6.0]);
    assert_eq!(table.label(3), 30.0);
    assert_eq!(table.column(1)[4], 8.0);
    assert_eq!(table.labels().len(), 10);
}

#[test]
fn test_shuffle_is_seeded_permutation() {
    let mut a = sample_table();
    let mut b = sample_table();
    a.shuffle(1);
    b.shuffle(1);
    assert_eq!(a, b);

    let mut labels = a.labels();
    labels.sort_by(f64::total_cmp);
    assert_eq!(labels, sample_table().labels());
}

#[test]
fn test_slice_bounds() {
    let table = sample_table();
    let s = table.slice(2, 3).expect("in range");
    assert_eq!(s.len(), 3);
    assert_eq!(s.label(0), 20.0);
    assert!(matches!(
        table.slice(8, 5),
        Err(RunpredictError::InsufficientData { .. })
    ));
}

#[test]
fn test_select_copies_rows() {
    let table = sample_table();
    let picked = table.select(&[9, 0]);
    assert_eq!(picked.labels(), vec![90.0, 0.0]);
}

#[test]
fn test_render_cell_nominal() {
    let schema = Schema::new(vec![
        Attribute::nominal("algo", vec!["quick".into(), "merge".into()]),
        Attribute::numeric("runtime"),
    ])
    .expect("valid schema");
    let table = ObservationTable::new("t", schema);
    assert_eq!(table.render_cell(0, 1.0), "merge");
    assert_eq!(table.render_cell(1, 2.5), "2.5");
}
