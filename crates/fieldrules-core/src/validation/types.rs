//! Core validation types
//!
//! This module contains the records a validation pass produces
//! (`ValidationError`, `FieldErrors`, `ValidationErrors`) and the raw
//! output shapes rule evaluators may hand back (`RuleOutput`, `RawError`).
//!
//! Copyright (c) 2025 Specado Team
//! Licensed under the Apache-2.0 license

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};
use std::fmt;
use thiserror::Error;

/// The values being validated, keyed by field name
pub type Source = Map<String, Value>;

/// A single failed rule, bound to the field it was declared on
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationError {
    /// Human-readable error message
    pub message: String,
    /// Field the failing rule was declared on
    pub field: String,
}

impl ValidationError {
    /// Create a new error record
    pub fn new<F, M>(field: F, message: M) -> Self
    where
        F: Into<String>,
        M: Into<String>,
    {
        Self {
            message: message.into(),
            field: field.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Errors grouped by field, in the order fields first appeared
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors {
    entries: Vec<(String, Vec<ValidationError>)>,
}

impl FieldErrors {
    /// Create an empty grouping
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an error to its field's group, creating the group on first sight
    pub fn push(&mut self, error: ValidationError) {
        match self.entries.iter_mut().find(|(field, _)| *field == error.field) {
            Some((_, errors)) => errors.push(error),
            None => self.entries.push((error.field.clone(), vec![error])),
        }
    }

    /// Errors recorded for `field`
    pub fn get(&self, field: &str) -> Option<&[ValidationError]> {
        self.entries
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, errors)| errors.as_slice())
    }

    pub fn contains_key(&self, field: &str) -> bool {
        self.get(field).is_some()
    }

    /// Field names with at least one error
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(field, _)| field.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[ValidationError])> {
        self.entries
            .iter()
            .map(|(field, errors)| (field.as_str(), errors.as_slice()))
    }

    /// Number of fields with errors
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for FieldErrors {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (field, errors) in &self.entries {
            map.serialize_entry(field, errors)?;
        }
        map.end()
    }
}

/// The failure result of a validation pass
///
/// A pass that finds nothing wrong yields `None` rather than an empty
/// `ValidationErrors`, so a value of this type always holds at least one
/// error and a non-empty `fields` grouping.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
pub struct ValidationErrors {
    /// Every error, in the order the runner produced them
    pub errors: Vec<ValidationError>,
    /// The same errors grouped by field
    pub fields: FieldErrors,
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Validation failed with {} error(s):", self.errors.len())?;
        for (i, error) in self.errors.iter().enumerate() {
            write!(f, "\n{}. {}", i + 1, error)?;
        }
        Ok(())
    }
}

impl ValidationErrors {
    /// Group a flat error list, returning `None` when the list is empty
    pub fn from_errors(errors: Vec<ValidationError>) -> Option<Self> {
        if errors.is_empty() {
            return None;
        }

        let mut fields = FieldErrors::new();
        for error in &errors {
            fields.push(error.clone());
        }

        Some(Self { errors, fields })
    }

    /// Get the number of errors
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Always false; kept for API symmetry with collections
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Errors for one field
    pub fn field(&self, field: &str) -> Option<&[ValidationError]> {
        self.fields.get(field)
    }

    /// Convert a pass outcome into a `Result` for `?` propagation
    pub fn into_result(outcome: Option<Self>) -> Result<(), Self> {
        match outcome {
            Some(errors) => Err(errors),
            None => Ok(()),
        }
    }
}

/// One error as produced by an evaluator, before field stamping
#[derive(Debug)]
pub enum RawError {
    /// Plain message text
    Message(String),
    /// A ready-made record; its field is kept unless empty
    Record(ValidationError),
    /// An error object; its display text becomes the message
    Error(anyhow::Error),
}

impl RawError {
    /// Turn into a record, stamping `field` where the raw error has none
    pub fn into_record(self, field: &str) -> ValidationError {
        match self {
            RawError::Message(message) => ValidationError::new(field, message),
            RawError::Record(mut record) => {
                if record.field.is_empty() {
                    record.field = field.to_string();
                }
                record
            }
            RawError::Error(error) => ValidationError::new(field, error.to_string()),
        }
    }
}

impl From<String> for RawError {
    fn from(message: String) -> Self {
        RawError::Message(message)
    }
}

impl From<&str> for RawError {
    fn from(message: &str) -> Self {
        RawError::Message(message.to_string())
    }
}

impl From<ValidationError> for RawError {
    fn from(record: ValidationError) -> Self {
        RawError::Record(record)
    }
}

impl From<anyhow::Error> for RawError {
    fn from(error: anyhow::Error) -> Self {
        RawError::Error(error)
    }
}

/// Whatever a rule evaluator reports for one value
///
/// Evaluators are free to report nothing, one error, or several; the
/// aggregator flattens all of these into a list of records.
#[derive(Debug, Default)]
pub enum RuleOutput {
    #[default]
    Pass,
    One(RawError),
    Many(Vec<RawError>),
}

impl RuleOutput {
    /// Build a failing output from a single message
    pub fn fail(message: impl Into<String>) -> Self {
        RuleOutput::One(RawError::Message(message.into()))
    }

    /// True when the output carries no errors
    pub fn is_pass(&self) -> bool {
        match self {
            RuleOutput::Pass => true,
            RuleOutput::One(_) => false,
            RuleOutput::Many(errors) => errors.is_empty(),
        }
    }

    /// Flatten into a list of raw errors
    pub fn into_raw(self) -> Vec<RawError> {
        match self {
            RuleOutput::Pass => Vec::new(),
            RuleOutput::One(error) => vec![error],
            RuleOutput::Many(errors) => errors,
        }
    }
}

impl From<()> for RuleOutput {
    fn from(_: ()) -> Self {
        RuleOutput::Pass
    }
}

/// Booleans never fail a rule; only error values do
impl From<bool> for RuleOutput {
    fn from(_: bool) -> Self {
        RuleOutput::Pass
    }
}

impl From<String> for RuleOutput {
    fn from(message: String) -> Self {
        RuleOutput::One(RawError::Message(message))
    }
}

impl From<&str> for RuleOutput {
    fn from(message: &str) -> Self {
        RuleOutput::One(RawError::from(message))
    }
}

impl From<ValidationError> for RuleOutput {
    fn from(record: ValidationError) -> Self {
        RuleOutput::One(RawError::Record(record))
    }
}

impl From<anyhow::Error> for RuleOutput {
    fn from(error: anyhow::Error) -> Self {
        RuleOutput::One(RawError::Error(error))
    }
}

impl From<Vec<String>> for RuleOutput {
    fn from(messages: Vec<String>) -> Self {
        RuleOutput::Many(messages.into_iter().map(RawError::Message).collect())
    }
}

impl From<Vec<RawError>> for RuleOutput {
    fn from(errors: Vec<RawError>) -> Self {
        RuleOutput::Many(errors)
    }
}

impl<T: Into<RuleOutput>> From<Option<T>> for RuleOutput {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or_default()
    }
}

impl<T: Into<RuleOutput>, E: Into<RawError>> From<Result<T, E>> for RuleOutput {
    fn from(value: Result<T, E>) -> Self {
        match value {
            Ok(output) => output.into(),
            Err(error) => RuleOutput::One(error.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_errors_preserve_first_seen_order() {
        let mut fields = FieldErrors::new();
        fields.push(ValidationError::new("b", "first b"));
        fields.push(ValidationError::new("a", "first a"));
        fields.push(ValidationError::new("b", "second b"));

        assert_eq!(fields.keys().collect::<Vec<_>>(), vec!["b", "a"]);
        assert_eq!(fields.get("b").map(|e| e.len()), Some(2));
        assert_eq!(fields.get("b").unwrap()[1].message, "second b");
        assert!(fields.get("c").is_none());
    }

    #[test]
    fn test_field_errors_serialize_as_map() {
        let mut fields = FieldErrors::new();
        fields.push(ValidationError::new("name", "name is required"));

        let json = serde_json::to_value(&fields).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"name": [{"message": "name is required", "field": "name"}]})
        );
    }

    #[test]
    fn test_from_errors_empty_is_none() {
        assert!(ValidationErrors::from_errors(Vec::new()).is_none());

        let errors = ValidationErrors::from_errors(vec![ValidationError::new("x", "bad")]).unwrap();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.fields.len(), 1);
        assert!(errors.to_string().contains("1. x: bad"));

        assert!(ValidationErrors::into_result(None).is_ok());
        assert_eq!(ValidationErrors::into_result(Some(errors)).unwrap_err().len(), 1);
    }

    #[test]
    fn test_rule_output_shapes() {
        assert!(RuleOutput::from(()).is_pass());
        assert!(RuleOutput::from(true).is_pass());
        assert!(RuleOutput::from(false).is_pass());
        assert!(RuleOutput::from(None::<String>).is_pass());
        assert!(RuleOutput::from(Vec::<String>::new()).is_pass());
        assert!(!RuleOutput::from("bad").is_pass());
        assert_eq!(RuleOutput::from(vec!["a".to_string(), "b".to_string()]).into_raw().len(), 2);

        let failed: std::result::Result<(), anyhow::Error> = Err(anyhow::anyhow!("lookup failed"));
        let record = RuleOutput::from(failed).into_raw().remove(0).into_record("user");
        assert_eq!(record, ValidationError::new("user", "lookup failed"));
    }

    #[test]
    fn test_raw_record_keeps_own_field() {
        let record = RawError::Record(ValidationError::new("other", "msg")).into_record("user");
        assert_eq!(record.field, "other");

        let record = RawError::Record(ValidationError::new("", "msg")).into_record("user");
        assert_eq!(record.field, "user");
    }
}
