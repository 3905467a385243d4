//! Normalizes evaluator output into error records
//!
//! Copyright (c) 2025 Specado Team
//! Licensed under the Apache-2.0 license

use crate::validation::rule::Rule;
use crate::validation::types::{RuleOutput, ValidationError, ValidationErrors};

/// Turn one evaluator's output into records for `field`
///
/// A failing output is replaced wholesale by the rule's `message` override
/// when one is declared. A passing output stays empty either way.
pub fn complete_rule(rule: &Rule, field: &str, output: RuleOutput) -> Vec<ValidationError> {
    if output.is_pass() {
        return Vec::new();
    }

    match &rule.message {
        Some(messages) => messages
            .iter()
            .map(|message| ValidationError::new(field, message.clone()))
            .collect(),
        None => output
            .into_raw()
            .into_iter()
            .map(|raw| raw.into_record(field))
            .collect(),
    }
}

/// Final result of a pass: `None` when nothing failed
pub fn process_error_results(errors: Vec<ValidationError>) -> Option<ValidationErrors> {
    ValidationErrors::from_errors(errors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::types::RawError;

    #[test]
    fn test_pass_yields_nothing_even_with_override() {
        let rule = Rule::new().message("custom");
        assert!(complete_rule(&rule, "name", RuleOutput::Pass).is_empty());
        assert!(complete_rule(&rule, "name", RuleOutput::Many(Vec::new())).is_empty());
    }

    #[test]
    fn test_override_replaces_every_message() {
        let rule = Rule::new().messages(vec!["first".to_string(), "second".to_string()]);
        let output = RuleOutput::fail("evaluator text");
        let records = complete_rule(&rule, "name", output);
        assert_eq!(
            records,
            vec![ValidationError::new("name", "first"), ValidationError::new("name", "second")]
        );
    }

    #[test]
    fn test_outputs_are_stamped() {
        let output = RuleOutput::Many(vec![
            RawError::from("plain"),
            RawError::from(anyhow::anyhow!("from error")),
            RawError::from(ValidationError::new("", "blank field")),
        ]);
        let records = complete_rule(&Rule::new(), "age", output);
        assert!(records.iter().all(|record| record.field == "age"));
        assert_eq!(records[1].message, "from error");
    }

    #[test]
    fn test_process_error_results() {
        assert!(process_error_results(Vec::new()).is_none());

        let result = process_error_results(vec![
            ValidationError::new("a", "one"),
            ValidationError::new("b", "two"),
            ValidationError::new("a", "three"),
        ])
        .unwrap();
        assert_eq!(result.len(), 3);
        assert_eq!(result.fields.keys().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(result.field("a").map(<[_]>::len), Some(2));
    }
}
