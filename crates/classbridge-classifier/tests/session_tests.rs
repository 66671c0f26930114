//! Bridge lifecycle and prediction tests using a fixture engine

mod common;

use classbridge_classifier::{ArtifactPaths, Bridge, BridgeConfig, ScalerPolicy};
use classbridge_core::{Artifact, Error, ErrorKind};
use common::{csv_row, init_tracing, sample_for, scaler_text, Artifacts, FixtureLoader, LABELS};

fn bridge(loader: &FixtureLoader) -> Bridge {
    Bridge::with_loader(BridgeConfig::default(), loader.clone())
}

#[test]
fn test_initialize_and_predict() {
    init_tracing();
    let artifacts = Artifacts::reference();
    let loader = FixtureLoader::default();
    let mut bridge = bridge(&loader);

    bridge.initialize(&artifacts.paths).unwrap();
    assert!(bridge.is_initialized());

    let result = bridge.predict(&sample_for(3)).unwrap();
    assert_eq!(result.probabilities.len(), 6);
    assert_eq!(result.predicted_class, 3);
    assert_eq!(bridge.class_name(3).unwrap(), "PS10-H");
}

#[test]
fn test_probability_slot_wins_over_label_output() {
    let artifacts = Artifacts::reference();
    let loader = FixtureLoader::default();
    let mut bridge = bridge(&loader);
    bridge.initialize(&artifacts.paths).unwrap();

    // The fixture's label output always says class 5
    let result = bridge.predict(&sample_for(1)).unwrap();
    assert_eq!(result.predicted_class, 1);
}

#[test]
fn test_predict_before_initialize() {
    let loader = FixtureLoader::default();
    let mut bridge = bridge(&loader);

    let err = bridge.predict(&sample_for(0)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotInitialized);
    assert!(matches!(bridge.class_name(0), Err(Error::NotInitialized)));
    assert_eq!(loader.loads(), 0);
}

#[test]
fn test_wrong_feature_count_does_not_touch_engine() {
    let artifacts = Artifacts::reference();
    let loader = FixtureLoader::default();
    let mut bridge = bridge(&loader);
    bridge.initialize(&artifacts.paths).unwrap();

    let err = bridge.predict(&[0.0; 19]).unwrap_err();
    assert!(matches!(err, Error::FeatureCount { expected: 20, actual: 19 }));
    assert_eq!(loader.calls(), 0);
}

#[test]
fn test_stage_failures_leave_bridge_uninitialized() {
    let loader = FixtureLoader::default();

    // Missing scaler
    let artifacts = Artifacts::reference();
    let paths = ArtifactPaths {
        scaler: artifacts.dir.path().join("absent.json"),
        ..artifacts.paths.clone()
    };
    let mut b = bridge(&loader);
    let err = b.initialize(&paths).unwrap_err();
    assert_eq!(err.artifact(), Some(Artifact::Scaler));
    assert_eq!(err.kind(), ErrorKind::ResourceUnavailable);
    assert!(!b.is_initialized());

    // Wrong-length scaler
    let artifacts = Artifacts::new(&scaler_text(19, 0.0, 1.0), LABELS);
    let mut b = bridge(&loader);
    assert!(matches!(
        b.initialize(&artifacts.paths),
        Err(Error::InvalidScaler(_))
    ));
    assert!(!b.is_initialized());

    // Missing labels
    let artifacts = Artifacts::reference();
    let paths = ArtifactPaths {
        labels: artifacts.dir.path().join("absent.json"),
        ..artifacts.paths.clone()
    };
    let mut b = bridge(&loader);
    let err = b.initialize(&paths).unwrap_err();
    assert_eq!(err.artifact(), Some(Artifact::Labels));
    assert!(!b.is_initialized());

    // Scaler and labels failures never reach the engine
    assert_eq!(loader.loads(), 0);

    // Engine failure
    let artifacts = Artifacts::reference();
    let failing = FixtureLoader::failing();
    let mut b = bridge(&failing);
    assert_eq!(
        b.initialize(&artifacts.paths).unwrap_err().kind(),
        ErrorKind::Engine
    );
    assert!(!b.is_initialized());
}

#[test]
fn test_scaler_token_parse_failure() {
    let scaler = r#"{"mean": [0, 1, oops], "scale": [1, 1, 1]}"#;
    let artifacts = Artifacts::new(scaler, LABELS);
    let loader = FixtureLoader::default();
    let mut bridge = bridge(&loader);

    let err = bridge.initialize(&artifacts.paths).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Parse);
}

#[test]
fn test_reinitialize_requires_cleanup() {
    let artifacts = Artifacts::reference();
    let loader = FixtureLoader::default();
    let mut bridge = bridge(&loader);

    bridge.initialize(&artifacts.paths).unwrap();
    assert!(matches!(
        bridge.initialize(&artifacts.paths),
        Err(Error::AlreadyInitialized)
    ));
    assert_eq!(loader.loads(), 1);

    bridge.cleanup();
    bridge.initialize(&artifacts.paths).unwrap();
    assert_eq!(loader.loads(), 2);
}

#[test]
fn test_cleanup_is_idempotent() {
    let artifacts = Artifacts::reference();
    let loader = FixtureLoader::default();
    let mut bridge = bridge(&loader);

    bridge.cleanup();
    assert!(!bridge.is_initialized());

    bridge.initialize(&artifacts.paths).unwrap();
    bridge.cleanup();
    bridge.cleanup();
    assert!(!bridge.is_initialized());
    assert!(matches!(bridge.predict(&sample_for(0)), Err(Error::NotInitialized)));
}

#[test]
fn test_partial_label_map() {
    let artifacts = Artifacts::new(&scaler_text(20, 0.0, 1.0), r#"{"0": "alpha", "2": "gamma"}"#);
    let loader = FixtureLoader::default();
    let mut bridge = bridge(&loader);
    bridge.initialize(&artifacts.paths).unwrap();

    assert_eq!(bridge.class_name(0).unwrap(), "alpha");
    assert_eq!(bridge.class_name(1).unwrap(), "");
    assert_eq!(bridge.class_name(2).unwrap(), "gamma");
    assert!(matches!(
        bridge.class_name(6),
        Err(Error::ClassIndex { index: 6, count: 6 })
    ));
}

#[test]
fn test_batch_prediction_alignment() {
    init_tracing();
    let artifacts = Artifacts::reference();
    let csv = format!(
        "{}\n\n{}\nnot,a,row\n{}\n",
        csv_row(&sample_for(4)),
        csv_row(&sample_for(2)[..19]),
        csv_row(&sample_for(0)),
    );
    let csv_path = artifacts.write("samples.csv", &csv);

    let loader = FixtureLoader::default();
    let mut bridge = bridge(&loader);
    bridge.initialize(&artifacts.paths).unwrap();

    let batch = bridge.predict_file(&csv_path).unwrap();
    assert_eq!(batch.len(), 2);
    assert_eq!(batch.predicted_classes(), vec![4, 0]);
}

#[test]
fn test_single_row_file_counts_one_sample() {
    let artifacts = Artifacts::reference();
    let csv = format!(
        "{}\n\n{}\n",
        csv_row(&sample_for(1)),
        csv_row(&sample_for(1)[..19])
    );
    let csv_path = artifacts.write("one.csv", &csv);

    let loader = FixtureLoader::default();
    let mut bridge = bridge(&loader);
    bridge.initialize(&artifacts.paths).unwrap();

    assert_eq!(bridge.predict_file(&csv_path).unwrap().len(), 1);
}

#[test]
fn test_batch_without_usable_rows() {
    let artifacts = Artifacts::reference();
    let csv_path = artifacts.write("empty.csv", "header,only\n\n");

    let loader = FixtureLoader::default();
    let mut bridge = bridge(&loader);

    assert!(matches!(
        bridge.predict_file(&csv_path),
        Err(Error::NotInitialized)
    ));

    bridge.initialize(&artifacts.paths).unwrap();
    assert!(matches!(
        bridge.predict_file(&csv_path),
        Err(Error::NoUsableData(_))
    ));

    let missing = artifacts.dir.path().join("missing.csv");
    let err = bridge.predict_file(&missing).unwrap_err();
    assert_eq!(err.artifact(), Some(Artifact::Samples));
}

#[test]
fn test_zero_scale_yields_non_finite_feature() {
    let mut scale = vec!["1".to_string(); 20];
    scale[0] = "0".to_string();
    let scaler = format!(
        "{{\"mean\": [{}], \"scale\": [{}]}}",
        vec!["0"; 20].join(","),
        scale.join(",")
    );
    let artifacts = Artifacts::new(&scaler, LABELS);
    let loader = FixtureLoader::default();

    let mut bridge = bridge(&loader);
    bridge.initialize(&artifacts.paths).unwrap();
    let result = bridge.predict(&sample_for(2)).unwrap();
    assert!(!result.probabilities[0].is_finite());

    let strict = BridgeConfig {
        scaler: ScalerPolicy {
            reject_zero_scale: true,
        },
        ..BridgeConfig::default()
    };
    let mut bridge = Bridge::with_loader(strict, loader.clone());
    assert!(matches!(
        bridge.initialize(&artifacts.paths),
        Err(Error::InvalidScaler(_))
    ));
}

#[test]
fn test_label_prediction() {
    let artifacts = Artifacts::reference();
    let loader = FixtureLoader::default();
    let mut bridge = Bridge::open(BridgeConfig::default(), loader.clone(), &artifacts.paths).unwrap();

    let result = bridge.predict(&sample_for(5)).unwrap();
    let labeled = bridge.label_prediction(result).unwrap();

    assert_eq!(labeled.class_name, "YM");
    assert!((labeled.confidence - 0.9).abs() < 1e-6);
    assert_eq!(bridge.engine().unwrap().name(), "fixture");
}
