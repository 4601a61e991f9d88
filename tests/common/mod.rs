//! Shared test utilities and artifact fixtures

#![allow(dead_code)]

use std::path::Path;

use churnwise::pipeline::schema::{categorical_fields, CUSTOMER_FIELDS};
use churnwise::pipeline::CustomerRecord;
use polars::prelude::*;
use serde_json::json;
use tempfile::TempDir;

/// Logistic coefficients in the built-in feature order
pub const COEFFICIENTS: [f64; 19] = [
    0.05, 0.3, -0.2, -0.2, -0.8, 0.1, 0.1, 0.6, -0.4, -0.2, -0.1, -0.4, 0.1, 0.1, -0.9, 0.3, 0.2,
    0.5, -0.3,
];
pub const INTERCEPT: f64 = -0.5;
pub const THRESHOLD: f64 = 0.40;

fn write_json(dir: &Path, name: &str, value: &serde_json::Value) {
    std::fs::write(dir.join(name), serde_json::to_string_pretty(value).unwrap()).unwrap();
}

/// Logistic model artifact matching the built-in feature order
pub fn logistic_model_json() -> serde_json::Value {
    json!({
        "kind": "logistic",
        "intercept": INTERCEPT,
        "coefficients": COEFFICIENTS,
    })
}

/// Encoders as a fitted label encoder saves them: classes sorted
pub fn trained_encoders_json() -> serde_json::Value {
    let mut map = serde_json::Map::new();
    for spec in categorical_fields() {
        let mut classes: Vec<&str> = spec.vocabulary.to_vec();
        classes.sort_unstable();
        map.insert(spec.name.to_string(), json!(classes));
    }
    serde_json::Value::Object(map)
}

pub fn feature_order_json() -> serde_json::Value {
    let names: Vec<&str> = CUSTOMER_FIELDS.iter().map(|f| f.name).collect();
    json!(names)
}

pub fn standard_scaler_json() -> serde_json::Value {
    json!({
        "kind": "standard",
        "columns": ["tenure", "MonthlyCharges", "TotalCharges"],
        "mean": [32.4, 64.8, 2283.3],
        "scale": [24.5, 30.1, 2266.8],
    })
}

/// Artifact directory with every artifact present
pub fn create_artifact_dir() -> TempDir {
    let dir = TempDir::new().unwrap();
    write_json(dir.path(), "model.json", &logistic_model_json());
    write_json(dir.path(), "encoders.json", &trained_encoders_json());
    write_json(dir.path(), "feature_order.json", &feature_order_json());
    write_json(dir.path(), "scaler.json", &standard_scaler_json());
    write_json(dir.path(), "threshold.json", &json!({ "threshold": THRESHOLD }));
    dir
}

/// Artifact directory with only the model; everything else falls back
pub fn create_model_only_dir() -> TempDir {
    let dir = TempDir::new().unwrap();
    write_json(dir.path(), "model.json", &logistic_model_json());
    dir
}

/// Overwrite or add one artifact in an existing directory
pub fn write_artifact(dir: &Path, name: &str, value: serde_json::Value) {
    write_json(dir, name, &value);
}

/// Month-to-month fiber customer with a short tenure (likely to churn)
pub fn sample_record() -> CustomerRecord {
    CustomerRecord::new()
        .with("gender", "Female")
        .with("SeniorCitizen", "No")
        .with("Partner", "No")
        .with("Dependents", "No")
        .with("tenure", 6.0)
        .with("PhoneService", "Yes")
        .with("MultipleLines", "No")
        .with("InternetService", "Fiber optic")
        .with("OnlineSecurity", "No")
        .with("OnlineBackup", "No")
        .with("DeviceProtection", "No")
        .with("TechSupport", "No")
        .with("StreamingTV", "Yes")
        .with("StreamingMovies", "Yes")
        .with("Contract", "Month-to-month")
        .with("PaperlessBilling", "Yes")
        .with("PaymentMethod", "Electronic check")
        .with("MonthlyCharges", 90.0)
        .with("TotalCharges", 500.0)
}

/// Long-tenure two-year DSL customer (likely to stay)
pub fn loyal_record() -> CustomerRecord {
    CustomerRecord::new()
        .with("gender", "Male")
        .with("SeniorCitizen", "No")
        .with("Partner", "Yes")
        .with("Dependents", "Yes")
        .with("tenure", 60.0)
        .with("PhoneService", "Yes")
        .with("MultipleLines", "Yes")
        .with("InternetService", "DSL")
        .with("OnlineSecurity", "Yes")
        .with("OnlineBackup", "Yes")
        .with("DeviceProtection", "Yes")
        .with("TechSupport", "Yes")
        .with("StreamingTV", "No")
        .with("StreamingMovies", "No")
        .with("Contract", "Two year")
        .with("PaperlessBilling", "No")
        .with("PaymentMethod", "Credit card (automatic)")
        .with("MonthlyCharges", 50.0)
        .with("TotalCharges", 3000.0)
}

/// Three customers: churner, loyal, and one with an unknown internet service
pub fn create_customer_dataframe() -> DataFrame {
    df! {
        "customerID" => ["7590-VHVEG", "5575-GNVDE", "3668-QPYBK"],
        "gender" => ["Female", "Male", "Male"],
        "SeniorCitizen" => [0i64, 0, 1],
        "Partner" => ["No", "Yes", "No"],
        "Dependents" => ["No", "Yes", "No"],
        "tenure" => [6i64, 60, 2],
        "PhoneService" => ["Yes", "Yes", "Yes"],
        "MultipleLines" => ["No", "Yes", "No"],
        "InternetService" => ["Fiber optic", "DSL", "Cable"],
        "OnlineSecurity" => ["No", "Yes", "No"],
        "OnlineBackup" => ["No", "Yes", "No"],
        "DeviceProtection" => ["No", "Yes", "No"],
        "TechSupport" => ["No", "Yes", "No"],
        "StreamingTV" => ["Yes", "No", "No"],
        "StreamingMovies" => ["Yes", "No", "No"],
        "Contract" => ["Month-to-month", "Two year", "Month-to-month"],
        "PaperlessBilling" => ["Yes", "No", "Yes"],
        "PaymentMethod" => ["Electronic check", "Credit card (automatic)", "Mailed check"],
        "MonthlyCharges" => [90.0f64, 50.0, 53.85],
        "TotalCharges" => [500.0f64, 3000.0, 108.15],
        "Churn" => ["Yes", "No", "Yes"],
    }
    .unwrap()
}

/// Write a DataFrame to a CSV file inside `dir`
pub fn write_csv(dir: &Path, name: &str, df: &mut DataFrame) -> std::path::PathBuf {
    let path = dir.join(name);
    let mut file = std::fs::File::create(&path).unwrap();
    CsvWriter::new(&mut file).finish(df).unwrap();
    path
}
