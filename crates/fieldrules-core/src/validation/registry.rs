//! Rule evaluator contract and the registry of rule kinds
//!
//! Every rule kind is an evaluator registered under a key. Built-in kinds
//! are plain synchronous functions pushing messages into a sink; custom
//! validators and runtime-registered kinds implement [`RuleEvaluator`]
//! directly or are adapted from closures with [`validator_fn`] and
//! [`async_validator_fn`].
//!
//! Copyright (c) 2025 Specado Team
//! Licensed under the Apache-2.0 license

use crate::validation::messages::Messages;
use crate::validation::rule::{Rule, RuleKind};
use crate::validation::rules;
use crate::validation::types::{RuleOutput, Source};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

/// Registry key of the required check
pub const REQUIRED_KEY: &str = "required";

/// Everything an evaluator sees for one rule on one value
#[derive(Clone, Copy)]
pub struct RuleContext<'a> {
    pub rule: &'a Rule,
    /// The declared kind being evaluated; `None` for the required check
    /// and for custom validators
    pub kind: Option<&'a RuleKind>,
    pub value: &'a Value,
    /// The full source, for rules that compare against sibling fields
    pub source: &'a Source,
    pub messages: &'a Messages,
}

impl<'a> RuleContext<'a> {
    /// The same context with no kind attached
    pub fn without_kind(self) -> Self {
        Self { kind: None, ..self }
    }

    /// Render the template for `key`, with the field's display name as the
    /// first argument followed by `args`
    pub fn message(&self, key: &str, args: &[Value]) -> String {
        let mut all = Vec::with_capacity(args.len() + 1);
        all.push(Value::String(self.rule.display_name().to_string()));
        all.extend_from_slice(args);
        self.messages.render(key, &all)
    }
}

/// A rule evaluator
///
/// Implementations report failures as data through [`RuleOutput`]; they
/// should not panic for bad input.
#[async_trait]
pub trait RuleEvaluator: Send + Sync {
    async fn evaluate(&self, ctx: &RuleContext<'_>) -> RuleOutput;
}

/// Signature of a synchronous built-in rule: push messages into the sink
pub type RuleFn = fn(&RuleContext<'_>, &mut Vec<String>);

/// Adapts a synchronous [`RuleFn`] to the evaluator contract
#[derive(Clone, Copy)]
pub struct SyncRule(pub RuleFn);

#[async_trait]
impl RuleEvaluator for SyncRule {
    async fn evaluate(&self, ctx: &RuleContext<'_>) -> RuleOutput {
        let mut errors = Vec::new();
        (self.0)(ctx, &mut errors);
        RuleOutput::from(errors)
    }
}

/// Evaluator built from a synchronous closure
pub struct FnValidator<F>(F);

#[async_trait]
impl<F, O> RuleEvaluator for FnValidator<F>
where
    F: Fn(&RuleContext<'_>) -> O + Send + Sync,
    O: Into<RuleOutput>,
{
    async fn evaluate(&self, ctx: &RuleContext<'_>) -> RuleOutput {
        (self.0)(ctx).into()
    }
}

/// Wrap a synchronous closure as a custom validator
pub fn validator_fn<F, O>(f: F) -> FnValidator<F>
where
    F: Fn(&RuleContext<'_>) -> O + Send + Sync,
    O: Into<RuleOutput>,
{
    FnValidator(f)
}

/// Evaluator built from a closure returning a future
pub struct AsyncFnValidator<F>(F);

#[async_trait]
impl<F, Fut, O> RuleEvaluator for AsyncFnValidator<F>
where
    F: Fn(Value) -> Fut + Send + Sync,
    Fut: Future<Output = O> + Send,
    O: Into<RuleOutput>,
{
    async fn evaluate(&self, ctx: &RuleContext<'_>) -> RuleOutput {
        (self.0)(ctx.value.clone()).await.into()
    }
}

/// Wrap an async closure as a custom validator
///
/// The closure receives an owned copy of the value so the future it returns
/// does not borrow from the validation pass.
pub fn async_validator_fn<F, Fut, O>(f: F) -> AsyncFnValidator<F>
where
    F: Fn(Value) -> Fut + Send + Sync,
    Fut: Future<Output = O> + Send,
    O: Into<RuleOutput>,
{
    AsyncFnValidator(f)
}

/// The catalog of rule kinds, keyed by declaration key
#[derive(Clone)]
pub struct RuleRegistry {
    evaluators: HashMap<String, Arc<dyn RuleEvaluator>>,
}

impl RuleRegistry {
    /// A registry holding every built-in kind
    pub fn builtin() -> Self {
        let mut registry = Self {
            evaluators: HashMap::new(),
        };
        registry.register(REQUIRED_KEY, SyncRule(rules::required::required));
        registry.register("type", SyncRule(rules::type_check::type_rule));
        registry.register("format", SyncRule(rules::format::format));
        registry.register("whitespace", SyncRule(rules::constraints::whitespace));
        registry.register("pattern", SyncRule(rules::constraints::pattern));
        registry.register("enum", SyncRule(rules::constraints::enumeration));
        registry.register("range", SyncRule(rules::range::range));
        registry
    }

    /// Register an evaluator under `key`, returning the one it replaced
    pub fn register(
        &mut self,
        key: impl Into<String>,
        evaluator: impl RuleEvaluator + 'static,
    ) -> Option<Arc<dyn RuleEvaluator>> {
        self.evaluators.insert(key.into(), Arc::new(evaluator))
    }

    pub fn get(&self, key: &str) -> Option<&Arc<dyn RuleEvaluator>> {
        self.evaluators.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.evaluators.contains_key(key)
    }

    /// Registered keys, sorted
    pub fn keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.evaluators.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }
}

impl Default for RuleRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl fmt::Debug for RuleRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuleRegistry")
            .field("keys", &self.keys())
            .finish()
    }
}
