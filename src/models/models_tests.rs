pub(crate) use super::*;
use crate::table::{Attribute, Schema};

fn linear_table(n: usize) -> ObservationTable {
    let rows = (0..n)
        .map(|i| {
            let a = i as f64;
            let b = (i % 7) as f64;
            vec![a, b, 3.0 * a + 2.0 * b + 5.0]
        })
        .collect();
    let schema = Schema::numeric(&["a", "b"], "y").expect("unique names");
    ObservationTable::from_rows("linear", schema, rows)
        .expect("valid rows")
}

fn all_specs() -> Vec<ModelSpec> {
    vec![
        ModelSpec::Mean,
        ModelSpec::Linear { ridge: 1e-8 },
        ModelSpec::Tree {
            max_depth: Some(6),
            min_samples_leaf: 2,
        },
        ModelSpec::RandomForest {
            n_trees: 8,
            max_depth: None,
            max_features: None,
            seed: 1,
        },
        ModelSpec::Kernel {
            kernel: Kernel::Linear,
            lambda: 1e-3,
            max_train_rows: 100,
            seed: 1,
        },
        ModelSpec::Kernel {
            kernel: Kernel::Rbf { gamma: 1.0 },
            lambda: 0.1,
            max_train_rows: 30,
            seed: 1,
        },
        ModelSpec::Neighbors {
            k: 5,
            select_k_by_loo: true,
            distance_weighted: true,
        },
        ModelSpec::Neural {
            hidden: None,
            learning_rate: 0.1,
            momentum: 0.2,
            epochs: 50,
            seed: 1,
        },
        ModelSpec::Sgd {
            learning_rate: 0.01,
            epochs: 50,
            lambda: 1e-4,
            loss: SgdLoss::Huber,
            seed: 1,
        },
        ModelSpec::Bagging {
            n_bags: 5,
            max_depth: None,
            min_samples_leaf: 2,
            seed: 1,
        },
        ModelSpec::ModelTree {
            max_depth: Some(4),
            min_samples_leaf: 4,
            ridge: 1e-8,
        },
    ]
}

#[test]
fn test_every_family_predicts_training_rows() {
    let table = linear_table(60);
    for spec in all_specs() {
        let mut model = spec.build().expect("valid spec");
        assert!(!model.is_trained());
        model.train(&table).expect("enough rows");
        assert!(model.is_trained(), "{}", spec.family());
        for i in [0, 17, 59] {
            let y = model.predict(table.features(i)).expect("trained model predicts");
            assert!(y.is_finite(), "{} produced {y}", spec.family());
        }
        assert!(!model.describe().is_empty());
    }
}

#[test]
fn test_every_family_rejects_untrained_and_wrong_arity() {
    let table = linear_table(30);
    for spec in all_specs() {
        let mut model = spec.build().expect("valid spec");
        assert!(matches!(
            model.predict(&[1.0, 2.0]),
            Err(RunpredictError::Prediction { .. })
        ));
        model.train(&table).expect("enough rows");
        assert!(matches!(
            model.predict(&[1.0]),
            Err(RunpredictError::Prediction { .. })
        ));
    }
}

#[test]
fn test_every_family_rejects_empty_table() {
    let empty = ObservationTable::new("empty", Schema::numeric(&["a"], "y").expect("unique names"));
    for spec in all_specs() {
        let mut model = spec.build().expect("valid spec");
        assert!(matches!(
            model.train(&empty),
            Err(RunpredictError::InsufficientData { .. })
        ));
    }
}

#[test]
fn test_linear_families_fit_linear_data() {
    let table = linear_table(80);
    for spec in [
        ModelSpec::Linear { ridge: 1e-8 },
        ModelSpec::Kernel {
            kernel: Kernel::Linear,
            lambda: 1e-6,
            max_train_rows: 100,
            seed: 1,
        },
    ] {
        let mut model = spec.build().expect("valid spec");
        model.train(&table).expect("enough rows");
        let metrics = model.evaluate(&table).expect("labeled table");
        assert!(metrics.rrse < 1.0, "{} rrse {}", spec.family(), metrics.rrse);
    }
}

#[test]
fn test_nominal_inputs_are_accepted() {
    let schema = Schema::new(vec![
        Attribute::nominal("algo", vec!["quick".into(), "merge".into()]),
        Attribute::numeric("n"),
        Attribute::numeric("runtime"),
    ])
    .expect("valid schema");
    let rows = (0..40)
        .map(|i| {
            let algo = (i % 2) as f64;
            let n = i as f64;
            vec![algo, n, n * (1.0 + algo)]
        })
        .collect();
    let table = ObservationTable::from_rows("nominal", schema, rows).expect("valid rows");
    for spec in all_specs() {
        let mut model = spec.build().expect("valid spec");
        model.train(&table).expect("enough rows");
        assert!(model.predict(&[1.0, 10.0]).expect("trained").is_finite());
    }
}

#[test]
fn test_invalid_specs() {
    let bad = [
        ModelSpec::Linear { ridge: -1.0 },
        ModelSpec::Tree {
            max_depth: None,
            min_samples_leaf: 0,
        },
        ModelSpec::RandomForest {
            n_trees: 0,
            max_depth: None,
            max_features: None,
            seed: 1,
        },
        ModelSpec::Kernel {
            kernel: Kernel::Polynomial {
                degree: 0,
                coef0: 1.0,
            },
            lambda: 1.0,
            max_train_rows: 10,
            seed: 1,
        },
        ModelSpec::Neighbors {
            k: 0,
            select_k_by_loo: false,
            distance_weighted: false,
        },
        ModelSpec::Neural {
            hidden: None,
            learning_rate: 0.1,
            momentum: 1.5,
            epochs: 10,
            seed: 1,
        },
    ];
    for spec in bad {
        assert!(
            matches!(
                spec.build(),
                Err(RunpredictError::InvalidHyperparameter { .. })
            ),
            "{spec:?} should be rejected"
        );
    }
}

#[test]
fn test_spec_json_tagging() {
    let spec = ModelSpec::Neighbors {
        k: 5,
        select_k_by_loo: true,
        distance_weighted: true,
    };
    let json = serde_json::to_string(&spec).expect("serializable");
    assert!(json.contains("\"kind\":\"neighbors\""));
    let back: ModelSpec = serde_json::from_str(&json).expect("round trip");
    assert_eq!(back, spec);

    let kernel: ModelSpec = serde_json::from_str(
        r#"{"kind":"kernel","kernel":{"type":"rbf","gamma":0.5},
            "lambda":1.0,"max_train_rows":50,"seed":3}"#,
    )
    .expect("valid json");
    assert!(matches!(
        kernel,
        ModelSpec::Kernel {
            kernel: Kernel::Rbf { .. },
            ..
        }
    ));
}

#[test]
fn test_seeded_ensembles_are_deterministic() {
    let table = linear_table(50);
    let spec = ModelSpec::RandomForest {
        n_trees: 5,
        max_depth: None,
        max_features: Some(1),
        seed: 42,
    };
    let mut a = spec.build().expect("valid spec");
    let mut b = spec.build().expect("valid spec");
    a.train(&table).expect("enough rows");
    b.train(&table).expect("enough rows");
    let q = [12.5, 3.0];
    assert_eq!(
        a.predict(&q).expect("trained"),
        b.predict(&q).expect("trained")
    );
}

#[test]
fn test_failed_train_keeps_previous_fit() {
    let table = linear_table(20);
    let schema = Schema::numeric(&["a", "b"], "y").expect("unique names");
    let empty = ObservationTable::new("empty", schema);
    let mut model = ModelSpec::Linear { ridge: 1e-8 }.build().expect("valid spec");
    model.train(&table).expect("enough rows");
    let before = model.predict(&[3.0, 1.0]).expect("trained");
    assert!(model.train(&empty).is_err());
    assert_eq!(model.predict(&[3.0, 1.0]).expect("still trained"), before);
}
