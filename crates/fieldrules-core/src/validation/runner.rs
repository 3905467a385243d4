//! Serializes declarations into runnable entries and drives them
//!
//! In first mode every entry runs strictly in declaration order and the
//! pass ends at the first failing rule. In all mode each field's chain runs
//! in order and ends at that field's first failure, while the chains of
//! different fields run concurrently.
//!
//! Copyright (c) 2025 Specado Team
//! Licensed under the Apache-2.0 license

use crate::validation::aggregator::complete_rule;
use crate::validation::messages::Messages;
use crate::validation::registry::{RuleContext, RuleRegistry};
use crate::validation::resolver::{resolve, ConfigWarning, ResolvedRule};
use crate::validation::rule::{Rule, Rules};
use crate::validation::types::{RuleOutput, Source, ValidationError};
use futures::future::join_all;
use futures::FutureExt;
use serde_json::Value;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use tracing::{debug, trace, warn};

static NULL: Value = Value::Null;

/// One declaration ready to run against one value
#[derive(Debug)]
pub struct RuleEntry<'a> {
    pub field: &'a str,
    pub rule: &'a Rule,
    pub value: &'a Value,
    pub source: &'a Source,
    pub resolved: ResolvedRule,
}

impl RuleEntry<'_> {
    fn context<'b>(&'b self, messages: &'b Messages) -> RuleContext<'b> {
        RuleContext {
            rule: self.rule,
            kind: self.resolved.kind_index.and_then(|i| self.rule.kinds.get(i)),
            value: self.value,
            source: self.source,
            messages,
        }
    }
}

/// Entries grouped by field in declaration order, plus what was skipped
#[derive(Debug, Default)]
pub struct SerializedRules<'a> {
    pub fields: Vec<(&'a str, Vec<RuleEntry<'a>>)>,
    pub skipped: Vec<ConfigWarning>,
}

impl SerializedRules<'_> {
    /// Total number of runnable entries
    pub fn len(&self) -> usize {
        self.fields.iter().map(|(_, entries)| entries.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Pair every declaration with its value and evaluator
///
/// Fields missing from the source are validated as `null`. Declarations
/// without an evaluator are left out and reported in `skipped`.
pub fn serialize<'a>(
    rules: &'a Rules,
    source: &'a Source,
    registry: &RuleRegistry,
) -> SerializedRules<'a> {
    let mut serialized = SerializedRules::default();

    for (field, declarations) in rules.iter() {
        let value = source.get(field).unwrap_or(&NULL);
        let mut entries = Vec::with_capacity(declarations.len());

        for (index, rule) in declarations.iter().enumerate() {
            match resolve(rule, index, registry) {
                Ok(resolved) => {
                    debug!(field, index, resolution = %resolved.resolution, "Resolved rule");
                    entries.push(RuleEntry {
                        field,
                        rule,
                        value,
                        source,
                        resolved,
                    });
                }
                Err(warning) => {
                    warn!("Skipping rule: {}", warning);
                    serialized.skipped.push(warning);
                }
            }
        }

        if !entries.is_empty() {
            serialized.fields.push((field, entries));
        }
    }

    serialized
}

/// Run one entry and complete its output into records
pub async fn run_entry(
    entry: &RuleEntry<'_>,
    messages: &Messages,
    catch_panics: bool,
) -> Vec<ValidationError> {
    let ctx = entry.context(messages);
    let evaluation = async { entry.resolved.evaluator.evaluate(&ctx).await };

    let output = if catch_panics {
        match AssertUnwindSafe(evaluation).catch_unwind().await {
            Ok(output) => output,
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                warn!(field = entry.field, "Rule evaluator panicked: {}", message);
                RuleOutput::fail(message)
            }
        }
    } else {
        evaluation.await
    };

    trace!(field = entry.field, pass = output.is_pass(), "Rule evaluated");
    complete_rule(entry.rule, entry.field, output)
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "rule evaluator panicked".to_string()
    }
}

/// Run every entry in order, stopping at the first failing rule
pub async fn run_first(
    serialized: &SerializedRules<'_>,
    messages: &Messages,
    catch_panics: bool,
) -> Vec<ValidationError> {
    for (_, entries) in &serialized.fields {
        for entry in entries {
            let errors = run_entry(entry, messages, catch_panics).await;
            if !errors.is_empty() {
                return errors;
            }
        }
    }
    Vec::new()
}

/// Run each field's chain to its first failure, all fields concurrently
pub async fn run_all(
    serialized: &SerializedRules<'_>,
    messages: &Messages,
    catch_panics: bool,
) -> Vec<ValidationError> {
    let mut chains = Vec::with_capacity(serialized.fields.len());
    for (_, entries) in &serialized.fields {
        chains.push(run_chain(entries, messages, catch_panics));
    }

    join_all(chains).await.into_iter().flatten().collect()
}

async fn run_chain(
    entries: &[RuleEntry<'_>],
    messages: &Messages,
    catch_panics: bool,
) -> Vec<ValidationError> {
    for entry in entries {
        let errors = run_entry(entry, messages, catch_panics).await;
        if !errors.is_empty() {
            debug!(field = entry.field, errors = errors.len(), "Field chain failed");
            return errors;
        }
    }
    Vec::new()
}
