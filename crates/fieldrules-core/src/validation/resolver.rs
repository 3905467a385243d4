//! Picks the evaluator that runs for one rule declaration
//!
//! Resolution order:
//! 1. a custom validator, used as-is;
//! 2. the first declared kind with a registered evaluator, behind the
//!    required guard;
//! 3. the required check alone, when the rule is marked required.
//!
//! A declaration matching none of these has no evaluator. That is a
//! configuration problem, not a validation failure: it is reported as a
//! [`ConfigWarning`] and the runner skips the declaration.
//!
//! Copyright (c) 2025 Specado Team
//! Licensed under the Apache-2.0 license

use crate::validation::registry::{
    RuleContext, RuleEvaluator, RuleRegistry, SyncRule, REQUIRED_KEY,
};
use crate::validation::rule::Rule;
use crate::validation::rules;
use crate::validation::rules::required::is_empty_value;
use crate::validation::types::RuleOutput;
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// A declaration the engine could not attach an evaluator to
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigWarning {
    #[error("No evaluator for rule #{index} on field '{field}' (declared kinds: {})", display_kinds(.declared))]
    NoEvaluator {
        field: String,
        index: usize,
        declared: Vec<String>,
    },
}

fn display_kinds(declared: &[String]) -> String {
    if declared.is_empty() {
        "none".to_string()
    } else {
        declared.join(", ")
    }
}

/// Which branch of the resolution order was taken
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// The rule's own validator
    Custom,
    /// A registered kind, by key
    Kind(String),
    /// Only the required check
    Required,
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resolution::Custom => write!(f, "custom validator"),
            Resolution::Kind(key) => write!(f, "{} (guarded)", key),
            Resolution::Required => write!(f, "required"),
        }
    }
}

/// The evaluator chosen for a declaration
#[derive(Clone)]
pub struct ResolvedRule {
    pub evaluator: Arc<dyn RuleEvaluator>,
    /// Position in `Rule::kinds` of the kind being evaluated
    pub kind_index: Option<usize>,
    pub resolution: Resolution,
}

impl fmt::Debug for ResolvedRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedRule")
            .field("kind_index", &self.kind_index)
            .field("resolution", &self.resolution)
            .finish()
    }
}

/// Runs the required check before the wrapped evaluator
///
/// An empty value never reaches the wrapped evaluator: it fails with the
/// required message when the rule is required and passes otherwise.
pub struct RequiredGuard {
    required: Arc<dyn RuleEvaluator>,
    inner: Arc<dyn RuleEvaluator>,
}

impl RequiredGuard {
    pub fn new(required: Arc<dyn RuleEvaluator>, inner: Arc<dyn RuleEvaluator>) -> Self {
        Self { required, inner }
    }
}

#[async_trait]
impl RuleEvaluator for RequiredGuard {
    async fn evaluate(&self, ctx: &RuleContext<'_>) -> RuleOutput {
        if is_empty_value(ctx.value) {
            if ctx.rule.required {
                return self.required.evaluate(&ctx.without_kind()).await;
            }
            return RuleOutput::Pass;
        }

        self.inner.evaluate(ctx).await
    }
}

/// The registry's required evaluator, or the built-in one if it was removed
fn required_evaluator(registry: &RuleRegistry) -> Arc<dyn RuleEvaluator> {
    registry
        .get(REQUIRED_KEY)
        .cloned()
        .unwrap_or_else(|| Arc::new(SyncRule(rules::required::required)))
}

/// Resolve the evaluator for the `index`-th declaration of a field
pub fn resolve(
    rule: &Rule,
    index: usize,
    registry: &RuleRegistry,
) -> Result<ResolvedRule, ConfigWarning> {
    if let Some(validator) = &rule.validator {
        return Ok(ResolvedRule {
            evaluator: Arc::clone(validator),
            kind_index: None,
            resolution: Resolution::Custom,
        });
    }

    let declared = rule
        .kinds
        .iter()
        .enumerate()
        .find_map(|(i, kind)| registry.get(kind.key()).map(|evaluator| (i, kind, evaluator)));

    if let Some((kind_index, kind, evaluator)) = declared {
        let guard = RequiredGuard::new(required_evaluator(registry), Arc::clone(evaluator));
        return Ok(ResolvedRule {
            evaluator: Arc::new(guard),
            kind_index: Some(kind_index),
            resolution: Resolution::Kind(kind.key().to_string()),
        });
    }

    if rule.required {
        return Ok(ResolvedRule {
            evaluator: required_evaluator(registry),
            kind_index: None,
            resolution: Resolution::Required,
        });
    }

    Err(ConfigWarning::NoEvaluator {
        field: rule.field.clone(),
        index,
        declared: rule.kinds.iter().map(|kind| kind.key().to_string()).collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::messages::Messages;
    use crate::validation::registry::validator_fn;
    use crate::validation::rule::FormatKind;
    use crate::validation::types::Source;
    use futures::executor::block_on;
    use serde_json::{json, Value};

    fn evaluate(resolved: &ResolvedRule, rule: &Rule, value: Value) -> Vec<String> {
        let messages = Messages::default();
        let source = Source::new();
        let ctx = RuleContext {
            rule,
            kind: resolved.kind_index.and_then(|i| rule.kinds.get(i)),
            value: &value,
            source: &source,
            messages: &messages,
        };
        block_on(resolved.evaluator.evaluate(&ctx))
            .into_raw()
            .into_iter()
            .map(|raw| raw.into_record(&rule.field).message)
            .collect()
    }

    fn field(rule: Rule) -> Rule {
        Rule {
            field: "email".to_string(),
            ..rule
        }
    }

    #[test]
    fn test_custom_validator_wins_and_is_unguarded() {
        let rule = field(
            Rule::required()
                .format(FormatKind::Email)
                .validator(validator_fn(|_ctx| "custom ran")),
        );
        let resolved = resolve(&rule, 0, &RuleRegistry::builtin()).unwrap();
        assert_eq!(resolved.resolution, Resolution::Custom);
        assert_eq!(evaluate(&resolved, &rule, Value::Null), vec!["custom ran"]);
    }

    #[test]
    fn test_first_registered_kind_wins() {
        let rule = field(Rule::new().kind("unknown", json!(true)).format(FormatKind::Email).whitespace());
        let resolved = resolve(&rule, 0, &RuleRegistry::builtin()).unwrap();
        assert_eq!(resolved.resolution, Resolution::Kind("format".to_string()));
        assert_eq!(resolved.kind_index, Some(1));
    }

    #[test]
    fn test_guard_on_empty_values() {
        let registry = RuleRegistry::builtin();

        let optional = field(Rule::new().format(FormatKind::Email));
        let resolved = resolve(&optional, 0, &registry).unwrap();
        assert!(evaluate(&resolved, &optional, json!("")).is_empty());
        assert!(evaluate(&resolved, &optional, Value::Null).is_empty());
        assert_eq!(
            evaluate(&resolved, &optional, json!("nope")),
            vec!["email is not a valid email address"]
        );

        let required = field(Rule::required().format(FormatKind::Email));
        let resolved = resolve(&required, 0, &registry).unwrap();
        assert_eq!(evaluate(&resolved, &required, json!("  ")), vec!["email is required"]);
    }

    #[test]
    fn test_required_only() {
        let rule = field(Rule::required());
        let resolved = resolve(&rule, 0, &RuleRegistry::builtin()).unwrap();
        assert_eq!(resolved.resolution, Resolution::Required);
        assert_eq!(evaluate(&resolved, &rule, Value::Null), vec!["email is required"]);
        assert!(evaluate(&resolved, &rule, json!("a@b.com")).is_empty());
    }

    #[test]
    fn test_no_evaluator_is_a_warning() {
        let rule = field(Rule::new().kind("unique", json!("users")));
        let warning = resolve(&rule, 2, &RuleRegistry::builtin()).unwrap_err();
        assert_eq!(
            warning,
            ConfigWarning::NoEvaluator {
                field: "email".to_string(),
                index: 2,
                declared: vec!["unique".to_string()],
            }
        );
        assert_eq!(
            warning.to_string(),
            "No evaluator for rule #2 on field 'email' (declared kinds: unique)"
        );

        let bare = field(Rule::new());
        assert!(resolve(&bare, 0, &RuleRegistry::builtin())
            .unwrap_err()
            .to_string()
            .ends_with("(declared kinds: none)"));
    }

    #[test]
    fn test_registered_named_kind_resolves() {
        let mut registry = RuleRegistry::builtin();
        registry.register("unique", validator_fn(|_ctx| "taken"));
        let rule = field(Rule::new().kind("unique", json!("users")));
        let resolved = resolve(&rule, 0, &registry).unwrap();
        assert_eq!(resolved.resolution.to_string(), "unique (guarded)");
        assert_eq!(evaluate(&resolved, &rule, json!("a@b.com")), vec!["taken"]);
    }
}
