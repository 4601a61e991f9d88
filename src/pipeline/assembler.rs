//! Feature assembly: ordering encoded values the way the classifier expects

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use super::error::{ArtifactLoadError, PipelineError};
use super::schema::CUSTOMER_FIELDS;

/// Ordered numeric input to the classifier
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct FeatureVector(Vec<f64>);

impl FeatureVector {
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn as_mut_slice(&mut self) -> &mut [f64] {
        &mut self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, idx: usize) -> Option<f64> {
        self.0.get(idx).copied()
    }
}

impl From<Vec<f64>> for FeatureVector {
    fn from(values: Vec<f64>) -> Self {
        FeatureVector(values)
    }
}

/// Exact column sequence the classifier was trained on
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct FeatureOrder {
    names: Vec<String>,
    index: HashMap<String, usize>,
}

impl FeatureOrder {
    /// Build an order from column names. Empty or repeated names are rejected.
    pub fn new(names: Vec<String>) -> Result<Self, ArtifactLoadError> {
        if names.is_empty() {
            return Err(ArtifactLoadError::integrity(
                "feature order",
                "feature order is empty",
            ));
        }
        let mut index = HashMap::with_capacity(names.len());
        for (pos, name) in names.iter().enumerate() {
            if index.insert(name.clone(), pos).is_some() {
                return Err(ArtifactLoadError::integrity(
                    "feature order",
                    format!("column '{}' appears more than once", name),
                ));
            }
        }
        Ok(Self { names, index })
    }

    /// The column order used by the hand-encoded model
    pub fn builtin() -> Self {
        let names: Vec<String> = CUSTOMER_FIELDS.iter().map(|f| f.name.to_string()).collect();
        let index = names
            .iter()
            .enumerate()
            .map(|(pos, name)| (name.clone(), pos))
            .collect();
        Self { names, index }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    /// Compare a set of field names against this order.
    ///
    /// Returns the missing names (in feature order) and the unexpected ones
    /// (in input order, including repeats).
    pub fn diff<'a>(&self, fields: impl IntoIterator<Item = &'a str>) -> (Vec<String>, Vec<String>) {
        let mut seen = HashSet::with_capacity(self.names.len());
        let mut unexpected = Vec::new();
        for name in fields {
            if !self.index.contains_key(name) || !seen.insert(name) {
                unexpected.push(name.to_string());
            }
        }
        let missing = self
            .names
            .iter()
            .filter(|n| !seen.contains(n.as_str()))
            .cloned()
            .collect();
        (missing, unexpected)
    }

    /// Reorder an encoded mapping into a feature vector.
    ///
    /// The mapping must name exactly the columns of this order; any
    /// difference fails without producing a partial vector.
    pub fn assemble<'a, I>(&self, encoded: I) -> Result<FeatureVector, PipelineError>
    where
        I: IntoIterator<Item = (&'a str, f64)>,
    {
        let mut slots: Vec<Option<f64>> = vec![None; self.names.len()];
        let mut unexpected = Vec::new();

        for (name, value) in encoded {
            match self.index.get(name) {
                Some(&pos) if slots[pos].is_none() => slots[pos] = Some(value),
                _ => unexpected.push(name.to_string()),
            }
        }

        let missing: Vec<String> = slots
            .iter()
            .zip(&self.names)
            .filter(|(slot, _)| slot.is_none())
            .map(|(_, name)| name.clone())
            .collect();

        if !missing.is_empty() || !unexpected.is_empty() {
            return Err(PipelineError::MissingFeature {
                missing,
                unexpected,
            });
        }

        Ok(FeatureVector(slots.into_iter().flatten().collect()))
    }
}

impl TryFrom<Vec<String>> for FeatureOrder {
    type Error = ArtifactLoadError;

    fn try_from(names: Vec<String>) -> Result<Self, Self::Error> {
        FeatureOrder::new(names)
    }
}

impl From<FeatureOrder> for Vec<String> {
    fn from(order: FeatureOrder) -> Self {
        order.names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn order(names: &[&str]) -> FeatureOrder {
        FeatureOrder::new(names.iter().map(|s| s.to_string()).collect()).unwrap()
    }

    #[test]
    fn test_assemble_reorders() {
        let order = order(&["a", "b", "c"]);
        let vector = order
            .assemble(vec![("c", 3.0), ("a", 1.0), ("b", 2.0)])
            .unwrap();
        assert_eq!(vector.as_slice(), &[1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_assemble_missing_field() {
        let order = order(&["a", "b", "c"]);
        let err = order.assemble(vec![("a", 1.0), ("c", 3.0)]).unwrap_err();
        match err {
            PipelineError::MissingFeature {
                missing,
                unexpected,
            } => {
                assert_eq!(missing, vec!["b"]);
                assert!(unexpected.is_empty());
            }
            other => panic!("Expected MissingFeature, got {:?}", other),
        }
    }

    #[test]
    fn test_assemble_extra_field_not_ignored() {
        let order = order(&["a", "b"]);
        let err = order
            .assemble(vec![("a", 1.0), ("b", 2.0), ("z", 9.0)])
            .unwrap_err();
        assert!(matches!(
            err,
            PipelineError::MissingFeature { ref unexpected, .. } if unexpected == &["z"]
        ));
    }

    #[test]
    fn test_assemble_duplicate_field() {
        let order = order(&["a", "b"]);
        let err = order
            .assemble(vec![("a", 1.0), ("a", 5.0), ("b", 2.0)])
            .unwrap_err();
        assert!(matches!(
            err,
            PipelineError::MissingFeature { ref unexpected, .. } if unexpected == &["a"]
        ));
    }

    #[test]
    fn test_new_rejects_duplicates() {
        let result = FeatureOrder::new(vec!["a".to_string(), "a".to_string()]);
        assert!(result.is_err());
        assert!(FeatureOrder::new(Vec::new()).is_err());
    }

    #[test]
    fn test_deserialize_from_list() {
        let order: FeatureOrder = serde_json::from_str(r#"["tenure", "gender"]"#).unwrap();
        assert_eq!(order.position("gender"), Some(1));

        let dup: Result<FeatureOrder, _> = serde_json::from_str(r#"["tenure", "tenure"]"#);
        assert!(dup.is_err());
    }

    #[test]
    fn test_builtin_matches_schema() {
        let order = FeatureOrder::builtin();
        assert_eq!(order.len(), 19);
        assert_eq!(order.position("gender"), Some(0));
        assert_eq!(order.position("tenure"), Some(4));
        assert_eq!(order.position("TotalCharges"), Some(18));
    }

    #[test]
    fn test_diff() {
        let order = order(&["a", "b", "c"]);
        let (missing, unexpected) = order.diff(["c", "x", "a"]);
        assert_eq!(missing, vec!["b"]);
        assert_eq!(unexpected, vec!["x"]);
    }
}
