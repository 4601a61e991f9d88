//! End-to-end tests for the scoring pipeline

#[path = "common/mod.rs"]
mod common;

use churnwise::pipeline::{
    ArtifactPaths, CustomerRecord, Decision, EncodingSource, InferenceContext, PipelineConfig,
    PipelineError, PolicyKind,
};
use common::{
    create_artifact_dir, create_model_only_dir, loyal_record, sample_record, write_artifact,
};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde_json::json;

fn load(dir: &std::path::Path, config: &PipelineConfig) -> InferenceContext {
    InferenceContext::load(&ArtifactPaths::from_dir(dir), config).unwrap()
}

#[test]
fn test_end_to_end_record_is_reproducible() {
    let dir = create_artifact_dir();
    let ctx = load(dir.path(), &PipelineConfig::default());

    assert_eq!(ctx.policy().threshold().value(), 0.40);
    assert_eq!(ctx.encoders().source(), EncodingSource::Trained);

    let first = ctx.predict(&sample_record()).unwrap();
    for _ in 0..20 {
        let again = ctx.predict(&sample_record()).unwrap();
        assert_eq!(again.probability.to_bits(), first.probability.to_bits());
        assert_eq!(again.decision, first.decision);
    }
    assert_eq!(first.decision, Decision::Churn);
    assert!(first.probability > 0.9 && first.probability < 0.95);
}

#[test]
fn test_reloaded_context_gives_identical_probability() {
    let dir = create_artifact_dir();
    let a = load(dir.path(), &PipelineConfig::default());
    let b = load(dir.path(), &PipelineConfig::default());

    let pa = a.predict(&sample_record()).unwrap().probability;
    let pb = b.predict(&sample_record()).unwrap().probability;
    assert_eq!(pa.to_bits(), pb.to_bits());
}

#[test]
fn test_loyal_customer_stays() {
    let dir = create_artifact_dir();
    let ctx = load(dir.path(), &PipelineConfig::default());

    let prediction = ctx.predict(&loyal_record()).unwrap();
    assert_eq!(prediction.decision, Decision::Stay);
    assert!(prediction.probability < 0.05);
}

#[test]
fn test_shuffled_field_order_gives_identical_result() {
    let dir = create_artifact_dir();
    let ctx = load(dir.path(), &PipelineConfig::default());
    let reference = ctx.predict(&sample_record()).unwrap();

    let mut rng = rand::rngs::StdRng::seed_from_u64(42);
    for _ in 0..10 {
        let mut fields: Vec<_> = sample_record()
            .iter()
            .map(|(n, v)| (n.to_string(), v.clone()))
            .collect();
        fields.shuffle(&mut rng);
        let shuffled: CustomerRecord = fields.into_iter().collect();

        let prediction = ctx.predict(&shuffled).unwrap();
        assert_eq!(prediction.features, reference.features);
        assert_eq!(
            prediction.probability.to_bits(),
            reference.probability.to_bits()
        );
    }
}

#[test]
fn test_unknown_internet_service_rejected() {
    let dir = create_artifact_dir();
    let ctx = load(dir.path(), &PipelineConfig::default());

    let mut record = sample_record();
    record.insert("InternetService", "Cable");
    let err = ctx.predict(&record).unwrap_err();

    match &err {
        PipelineError::UnknownCategory { field, value } => {
            assert_eq!(field, "InternetService");
            assert_eq!(value, "Cable");
        }
        other => panic!("expected UnknownCategory, got {:?}", other),
    }
    assert!(err.is_user_error());
}

#[test]
fn test_scaled_features_are_standardized() {
    let dir = create_artifact_dir();
    let ctx = load(dir.path(), &PipelineConfig::default());

    let features = ctx.features(&sample_record()).unwrap();
    let tenure = ctx.feature_order().position("tenure").unwrap();
    let payment = ctx.feature_order().position("PaymentMethod").unwrap();

    assert!((features.as_slice()[tenure] - (6.0 - 32.4) / 24.5).abs() < 1e-12);
    // Sorted trained classes put "Electronic check" third
    assert_eq!(features.as_slice()[payment], 2.0);
}

#[test]
fn test_builtin_fallbacks_without_optional_artifacts() {
    let dir = create_model_only_dir();
    let ctx = load(dir.path(), &PipelineConfig::default());

    assert_eq!(ctx.encoders().source(), EncodingSource::Builtin);
    assert!(ctx.scaler().is_none());
    assert_eq!(ctx.policy().threshold().value(), 0.5);

    let features = ctx.features(&sample_record()).unwrap();
    let payment = ctx.feature_order().position("PaymentMethod").unwrap();
    let tenure = ctx.feature_order().position("tenure").unwrap();
    assert_eq!(features.as_slice()[payment], 0.0);
    assert_eq!(features.as_slice()[tenure], 6.0);
}

#[test]
fn test_three_tier_policy() {
    let dir = create_artifact_dir();
    let config = PipelineConfig {
        policy: PolicyKind::ThreeTier,
        ..Default::default()
    };
    let ctx = load(dir.path(), &config);

    assert_eq!(ctx.predict(&sample_record()).unwrap().decision, Decision::High);
    assert_eq!(ctx.predict(&loyal_record()).unwrap().decision, Decision::Low);
}

#[test]
fn test_permuted_feature_order_artifact() {
    let dir = create_artifact_dir();
    let baseline = load(dir.path(), &PipelineConfig::default())
        .predict(&sample_record())
        .unwrap();

    // Reverse both the column order and the coefficients
    let mut names: Vec<&str> = churnwise::pipeline::schema::CUSTOMER_FIELDS
        .iter()
        .map(|f| f.name)
        .collect();
    names.reverse();
    let mut coefficients = common::COEFFICIENTS.to_vec();
    coefficients.reverse();
    write_artifact(dir.path(), "feature_order.json", json!(names));
    write_artifact(
        dir.path(),
        "model.json",
        json!({"kind": "logistic", "intercept": common::INTERCEPT, "coefficients": coefficients}),
    );

    let ctx = load(dir.path(), &PipelineConfig::default());
    let prediction = ctx.predict(&sample_record()).unwrap();
    assert_eq!(ctx.feature_order().position("TotalCharges"), Some(0));
    assert!((prediction.probability - baseline.probability).abs() < 1e-12);
    assert_eq!(prediction.decision, baseline.decision);
}

#[test]
fn test_tree_ensemble_model() {
    let dir = create_artifact_dir();
    // Contract (position 14) below 0.5 means month-to-month
    write_artifact(
        dir.path(),
        "model.json",
        json!({
            "kind": "tree_ensemble",
            "n_features": 19,
            "base_score": 0.5,
            "trees": [
                {"nodes": [
                    {"feature": 14, "threshold": 0.5, "yes": 1, "no": 2},
                    {"leaf": 1.5},
                    {"leaf": -1.5}
                ]},
                {"nodes": [
                    {"feature": 4, "threshold": 0.0, "yes": 1, "no": 2},
                    {"leaf": 0.5},
                    {"leaf": -0.5}
                ]}
            ]
        }),
    );

    let ctx = load(dir.path(), &PipelineConfig::default());
    assert!(ctx.classifier().describe().contains("2 trees"));

    let churner = ctx.predict(&sample_record()).unwrap();
    let loyal = ctx.predict(&loyal_record()).unwrap();
    let expected = 1.0 / (1.0 + (-2.0f64).exp());
    assert!((churner.probability - expected).abs() < 1e-12);
    assert_eq!(churner.decision, Decision::Churn);
    assert_eq!(loyal.decision, Decision::Stay);
}

#[test]
fn test_batch_matches_single_predictions() {
    let dir = create_artifact_dir();
    let ctx = load(dir.path(), &PipelineConfig::default());

    let records: Vec<CustomerRecord> = (0..200)
        .map(|i| {
            if i % 2 == 0 {
                sample_record()
            } else {
                loyal_record()
            }
        })
        .collect();
    let results = ctx.predict_batch(&records);

    assert_eq!(results.len(), records.len());
    for (record, result) in records.iter().zip(&results) {
        let single = ctx.predict(record).unwrap();
        assert_eq!(
            result.as_ref().unwrap().probability.to_bits(),
            single.probability.to_bits()
        );
    }
}

#[test]
fn test_context_is_shareable_across_threads() {
    let dir = create_artifact_dir();
    let ctx = std::sync::Arc::new(load(dir.path(), &PipelineConfig::default()));
    let expected = ctx.predict(&sample_record()).unwrap().probability;

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let ctx = ctx.clone();
            std::thread::spawn(move || ctx.predict(&sample_record()).unwrap().probability)
        })
        .collect();
    for handle in handles {
        assert_eq!(handle.join().unwrap().to_bits(), expected.to_bits());
    }
}
