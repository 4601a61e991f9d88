//! Customer file loader for CSV and Parquet batches

use anyhow::{Context, Result};
use polars::prelude::*;
use std::path::Path;

use super::record::{CustomerRecord, FieldValue};
use super::schema::{self, FieldSpec, CUSTOMER_FIELDS};

/// Load a dataset from a file (CSV or Parquet based on extension)
pub fn load_dataset(path: &Path, infer_schema_length: usize) -> Result<DataFrame> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    // 0 means full table scan
    let schema_length = if infer_schema_length == 0 {
        None
    } else {
        Some(infer_schema_length)
    };

    let lf = match extension.as_str() {
        "csv" => LazyCsvReader::new(path)
            .with_infer_schema_length(schema_length)
            .finish()
            .with_context(|| format!("Failed to load CSV file: {}", path.display()))?,
        "parquet" => LazyFrame::scan_parquet(path, Default::default())
            .with_context(|| format!("Failed to load Parquet file: {}", path.display()))?,
        _ => anyhow::bail!(
            "Unsupported file format: {}. Supported formats: csv, parquet",
            extension
        ),
    };

    lf.collect()
        .with_context(|| format!("Failed to read dataset: {}", path.display()))
}

/// Customer records extracted from a dataset, plus the optional ID column
#[derive(Debug, Clone, Default)]
pub struct CustomerBatch {
    pub ids: Option<Vec<Option<String>>>,
    pub records: Vec<CustomerRecord>,
}

impl CustomerBatch {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Convert a dataset into customer records.
///
/// Every customer field must be present as a column. Null cells are left out
/// of the record so the pipeline reports them as missing features for that
/// row only. Text that does not parse in a numeric column is kept as a label
/// and rejected as invalid input. Numeric 0/1 columns for Yes/No fields are
/// mapped to labels.
pub fn records_from_dataframe(df: &DataFrame, id_column: Option<&str>) -> Result<CustomerBatch> {
    let column_names: Vec<String> = df.get_column_names().iter().map(|s| s.to_string()).collect();
    let absent: Vec<&str> = CUSTOMER_FIELDS
        .iter()
        .map(|f| f.name)
        .filter(|name| !column_names.iter().any(|c| c == name))
        .collect();
    if !absent.is_empty() {
        anyhow::bail!(
            "Dataset is missing customer column(s): {}. Available columns: {:?}",
            absent.join(", "),
            column_names
        );
    }

    let height = df.height();
    let mut records = vec![CustomerRecord::new(); height];

    for spec in CUSTOMER_FIELDS.iter() {
        let column = df
            .column(spec.name)
            .with_context(|| format!("Column '{}' not found", spec.name))?;
        let values = column_values(column, spec)
            .with_context(|| format!("Failed to read column '{}'", spec.name))?;
        for (record, value) in records.iter_mut().zip(values) {
            if let Some(value) = value {
                record.insert(spec.name, value);
            }
        }
    }

    let ids = match id_column {
        Some(name) if column_names.iter().any(|c| c == name) => {
            let column = df.column(name)?;
            Some(column_to_strings(column)?)
        }
        _ => None,
    };

    Ok(CustomerBatch { ids, records })
}

/// Read one customer column as raw field values
fn column_values(col: &Column, spec: &FieldSpec) -> Result<Vec<Option<FieldValue>>> {
    if spec.is_numeric() && col.dtype() == &DataType::String {
        let values = col
            .str()?
            .into_iter()
            .map(|v| v.map(|s| FieldValue::parse_for(spec.name, s)))
            .collect();
        return Ok(values);
    }

    if spec.is_numeric() {
        let cast = col.strict_cast(&DataType::Float64)?;
        let values = cast
            .f64()?
            .into_iter()
            .map(|v| v.map(FieldValue::Number))
            .collect();
        return Ok(values);
    }

    if spec.is_binary() && col.dtype().is_primitive_numeric() {
        let cast = col.cast(&DataType::Float64)?;
        let values = cast
            .f64()?
            .into_iter()
            .map(|v| v.map(indicator_label))
            .collect();
        return Ok(values);
    }

    Ok(column_to_strings(col)?
        .into_iter()
        .map(|v| v.map(|s| FieldValue::Label(s.trim().to_string())))
        .collect())
}

/// Map a 0/1 indicator to No/Yes; anything else keeps its textual form and
/// will be rejected by the encoder.
fn indicator_label(v: f64) -> FieldValue {
    match schema::indicator_label(v) {
        Some(label) => FieldValue::from(label),
        None => FieldValue::Label(format!("{}", v)),
    }
}

/// Convert a column to a Vec of Option<String>
pub fn column_to_strings(col: &Column) -> Result<Vec<Option<String>>> {
    let values: Vec<Option<String>> = match col.dtype() {
        DataType::String => col
            .str()?
            .into_iter()
            .map(|v| v.map(|s| s.to_string()))
            .collect(),
        _ => {
            let cast = col.cast(&DataType::String)?;
            cast.str()?
                .into_iter()
                .map(|v| v.map(|s| s.to_string()))
                .collect()
        }
    };
    Ok(values)
}

/// Read an observed churn label column.
///
/// Accepts Yes/No, true/false and 1/0 in any case; anything else (including
/// nulls) becomes `None` and is skipped during evaluation.
pub fn churn_labels(df: &DataFrame, label_column: &str) -> Result<Vec<Option<bool>>> {
    let column = df
        .column(label_column)
        .with_context(|| format!("Label column '{}' not found", label_column))?;
    let labels = column_to_strings(column)?
        .into_iter()
        .map(|v| v.and_then(|s| parse_label(&s)))
        .collect();
    Ok(labels)
}

fn parse_label(raw: &str) -> Option<bool> {
    match raw.trim().to_lowercase().as_str() {
        "yes" | "true" | "1" | "1.0" => Some(true),
        "no" | "false" | "0" | "0.0" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn customer_frame() -> DataFrame {
        df! {
            "customerID" => ["0001-A", "0002-B"],
            "gender" => ["Female", "Male"],
            "SeniorCitizen" => [0i64, 1],
            "Partner" => ["No", "Yes"],
            "Dependents" => ["No", "No"],
            "tenure" => [6i64, 40],
            "PhoneService" => ["Yes", "Yes"],
            "MultipleLines" => ["No", "Yes"],
            "InternetService" => ["Fiber optic", "DSL"],
            "OnlineSecurity" => ["No", "Yes"],
            "OnlineBackup" => ["No", "Yes"],
            "DeviceProtection" => ["No", "No"],
            "TechSupport" => ["No", "Yes"],
            "StreamingTV" => ["Yes", "No"],
            "StreamingMovies" => ["Yes", "No"],
            "Contract" => ["Month-to-month", "Two year"],
            "PaperlessBilling" => ["Yes", "No"],
            "PaymentMethod" => ["Electronic check", "Credit card (automatic)"],
            "MonthlyCharges" => [90.0f64, 55.5],
            "TotalCharges" => [Some(500.0f64), None],
        }
        .unwrap()
    }

    #[test]
    fn test_records_from_dataframe() {
        let df = customer_frame();
        let batch = records_from_dataframe(&df, Some("customerID")).unwrap();

        assert_eq!(batch.len(), 2);
        let ids = batch.ids.unwrap();
        assert_eq!(ids[1].as_deref(), Some("0002-B"));

        let first = &batch.records[0];
        assert_eq!(first.len(), 19);
        assert_eq!(first.get("tenure"), Some(&FieldValue::Number(6.0)));
        assert_eq!(first.get("SeniorCitizen"), Some(&FieldValue::from("No")));
        assert_eq!(batch.records[1].get("SeniorCitizen"), Some(&FieldValue::from("Yes")));
    }

    #[test]
    fn test_null_cell_left_out() {
        let df = customer_frame();
        let batch = records_from_dataframe(&df, None).unwrap();
        assert!(batch.ids.is_none());
        assert!(batch.records[1].get("TotalCharges").is_none());
        assert_eq!(batch.records[1].len(), 18);
    }

    #[test]
    fn test_unparsable_numeric_text_kept_as_label() {
        let mut df = customer_frame();
        df.with_column(Column::new("TotalCharges".into(), [Some(" "), Some("108.15")]))
            .unwrap();
        let batch = records_from_dataframe(&df, None).unwrap();

        assert_eq!(batch.records[0].get("TotalCharges"), Some(&FieldValue::from("")));
        assert_eq!(
            batch.records[1].get("TotalCharges"),
            Some(&FieldValue::Number(108.15))
        );
    }

    #[test]
    fn test_missing_customer_column() {
        let df = customer_frame().drop("Contract").unwrap();
        let err = records_from_dataframe(&df, None).unwrap_err();
        assert!(err.to_string().contains("Contract"));
    }

    #[test]
    fn test_indicator_label() {
        assert_eq!(indicator_label(0.0), FieldValue::from("No"));
        assert_eq!(indicator_label(1.0), FieldValue::from("Yes"));
        assert_eq!(indicator_label(2.0), FieldValue::from("2"));
    }

    #[test]
    fn test_churn_labels() {
        let df = df! {
            "Churn" => [Some("Yes"), Some("no"), None, Some("maybe")],
        }
        .unwrap();
        let labels = churn_labels(&df, "Churn").unwrap();
        assert_eq!(labels, vec![Some(true), Some(false), None, None]);
    }

    #[test]
    fn test_numeric_churn_labels() {
        let df = df! { "Churn" => [1i64, 0, 1] }.unwrap();
        let labels = churn_labels(&df, "Churn").unwrap();
        assert_eq!(labels, vec![Some(true), Some(false), Some(true)]);
        assert!(churn_labels(&df, "Exited").is_err());
    }
}
