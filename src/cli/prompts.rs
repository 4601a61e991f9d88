//! Interactive customer form using dialoguer

use anyhow::{Context, Result};
use dialoguer::{Input, Select};

use crate::pipeline::schema::{FieldSpec, CUSTOMER_FIELDS};
use crate::pipeline::{CustomerRecord, EncodingTable, FieldValue};

/// Ask for every customer field in schema order and build a record.
///
/// Categorical fields are offered as a selection over the vocabulary the
/// loaded encoders accept; numeric fields are free-form inputs that must
/// parse as non-negative numbers.
pub fn prompt_customer(encoders: &EncodingTable) -> Result<CustomerRecord> {
    let mut record = CustomerRecord::new();

    for spec in CUSTOMER_FIELDS.iter() {
        let value = if spec.is_numeric() {
            prompt_numeric(spec)?
        } else {
            prompt_category(spec, encoders)?
        };
        record.insert(spec.name, value);
    }

    Ok(record)
}

fn prompt_category(spec: &FieldSpec, encoders: &EncodingTable) -> Result<FieldValue> {
    let options: Vec<String> = match encoders.encoder(spec.name) {
        Some(encoder) => encoder.classes().to_vec(),
        None => spec.vocabulary.iter().map(|s| s.to_string()).collect(),
    };

    let selection = Select::new()
        .with_prompt(spec.label)
        .items(&options)
        .default(0)
        .interact()
        .with_context(|| format!("Failed to read {}", spec.label))?;

    Ok(FieldValue::Label(options[selection].clone()))
}

fn prompt_numeric(spec: &FieldSpec) -> Result<FieldValue> {
    let value: f64 = Input::new()
        .with_prompt(spec.label)
        .validate_with(|input: &f64| -> Result<(), String> {
            if input.is_finite() && *input >= 0.0 {
                Ok(())
            } else {
                Err("Enter a non-negative number".to_string())
            }
        })
        .interact_text()
        .with_context(|| format!("Failed to read {}", spec.label))?;

    Ok(FieldValue::Number(value))
}
