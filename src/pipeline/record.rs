//! Raw customer records as received from the caller

use std::collections::BTreeMap;
use std::fmt;

use serde::de::{self, MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};

use super::schema::field_spec;

/// A raw field value: either a vocabulary label or a numeric magnitude
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Number(f64),
    Label(String),
}

impl FieldValue {
    /// Parse a textual value, treating it as a number only when the field
    /// is numeric in the customer schema.
    pub fn parse_for(field: &str, raw: &str) -> Self {
        let trimmed = raw.trim();
        match field_spec(field) {
            Some(spec) if spec.is_numeric() => trimmed
                .parse::<f64>()
                .map(FieldValue::Number)
                .unwrap_or_else(|_| FieldValue::Label(trimmed.to_string())),
            _ => FieldValue::Label(trimmed.to_string()),
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Number(n) => write!(f, "{}", n),
            FieldValue::Label(s) => write!(f, "{}", s),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Label(s.to_string())
    }
}

impl From<f64> for FieldValue {
    fn from(n: f64) -> Self {
        FieldValue::Number(n)
    }
}

/// An ordered mapping from field name to raw value.
///
/// Insertion order is preserved; inserting an existing name replaces its
/// value in place. Deserializing rejects a field named twice.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(into = "BTreeMap<String, FieldValue>")]
pub struct CustomerRecord {
    fields: Vec<(String, FieldValue)>,
}

impl CustomerRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, name: &str, value: impl Into<FieldValue>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: &str, value: impl Into<FieldValue>) {
        let value = value.into();
        match self.fields.iter_mut().find(|(n, _)| n == name) {
            Some((_, existing)) => *existing = value,
            None => self.fields.push((name.to_string(), value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    pub fn remove(&mut self, name: &str) -> Option<FieldValue> {
        let idx = self.fields.iter().position(|(n, _)| n == name)?;
        Some(self.fields.remove(idx).1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(n, v)| (n.as_str(), v))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(n, _)| n.as_str())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

struct RecordVisitor;

impl<'de> Visitor<'de> for RecordVisitor {
    type Value = CustomerRecord;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a map of customer field names to values")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
        let mut record = CustomerRecord::new();
        while let Some((name, value)) = map.next_entry::<String, FieldValue>()? {
            if record.get(&name).is_some() {
                return Err(de::Error::custom(format!("duplicate field '{}'", name)));
            }
            record.fields.push((name, value));
        }
        Ok(record)
    }
}

impl<'de> Deserialize<'de> for CustomerRecord {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(RecordVisitor)
    }
}

impl From<CustomerRecord> for BTreeMap<String, FieldValue> {
    fn from(record: CustomerRecord) -> Self {
        record.fields.into_iter().collect()
    }
}

impl FromIterator<(String, FieldValue)> for CustomerRecord {
    fn from_iter<I: IntoIterator<Item = (String, FieldValue)>>(iter: I) -> Self {
        let mut record = CustomerRecord::new();
        for (name, value) in iter {
            record.insert(&name, value);
        }
        record
    }
}

/// Parse a `Name=Value` pair as given on the command line
pub fn parse_field_assignment(s: &str) -> Result<(String, FieldValue), String> {
    let (name, raw) = s
        .split_once('=')
        .ok_or_else(|| format!("'{}' is not a Name=Value assignment", s))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("'{}' has an empty field name", s));
    }
    Ok((name.to_string(), FieldValue::parse_for(name, raw)))
}
