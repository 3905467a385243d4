//! The validation entry point
//!
//! A `Schema` owns a rules table, the rule registry and its message
//! templates. It is built once and reused for any number of passes; each
//! pass snapshots the templates when it starts, so patching them with
//! [`Schema::messages`] never affects a pass already in flight.
//!
//! Copyright (c) 2025 Specado Team
//! Licensed under the Apache-2.0 license

use crate::validation::aggregator::process_error_results;
use crate::validation::messages::Messages;
use crate::validation::registry::RuleRegistry;
use crate::validation::resolver::{resolve, ConfigWarning, Resolution};
use crate::validation::rule::Rules;
use crate::validation::runner::{run_all, run_first, serialize, SerializedRules};
use crate::validation::types::{Source, ValidationErrors};
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, debug_span, Instrument};

/// Options fixed when a schema is built
#[derive(Debug, Clone, Default)]
pub struct ValidateOptions {
    /// Stop the whole pass at the first failing rule
    pub first: bool,
    /// Template overrides merged over the defaults
    pub messages: Option<Messages>,
}

type Completion = Box<dyn FnOnce(Option<ValidationErrors>) + Send>;

/// Completions registered by callback-style passes that have not finished
#[derive(Default)]
struct PendingCompletions {
    next_id: AtomicU64,
    slots: Mutex<Vec<(u64, Completion)>>,
}

impl PendingCompletions {
    fn slots(&self) -> MutexGuard<'_, Vec<(u64, Completion)>> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn register(&self, completion: Completion) -> u64 {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.slots().push((id, completion));
        id
    }

    fn take(&self, id: u64) -> Option<Completion> {
        let mut slots = self.slots();
        let position = slots.iter().position(|(slot, _)| *slot == id)?;
        Some(slots.remove(position).1)
    }

    /// Swap every pending completion for a no-op, returning how many there were
    fn neutralize(&self) -> usize {
        let mut slots = self.slots();
        for (_, completion) in slots.iter_mut() {
            *completion = Box::new(|_| {});
        }
        slots.len()
    }
}

/// Owns one registered completion; dropping it unclaimed releases the slot
struct PendingSlot {
    pending: Arc<PendingCompletions>,
    id: u64,
}

impl PendingSlot {
    fn complete(self, outcome: Option<ValidationErrors>) {
        if let Some(completion) = self.pending.take(self.id) {
            completion(outcome);
        }
    }
}

impl Drop for PendingSlot {
    fn drop(&mut self) {
        // A no-op after `complete`; otherwise the future was dropped early
        self.pending.take(self.id);
    }
}

/// Validates source objects against a rules table
pub struct Schema {
    rules: Arc<Rules>,
    registry: Arc<RuleRegistry>,
    messages: Arc<Messages>,
    first: bool,
    pending: Arc<PendingCompletions>,
}

impl Schema {
    /// Create a schema with default options and the built-in rule kinds
    pub fn new(rules: Rules) -> Self {
        Self::with_options(rules, ValidateOptions::default())
    }

    pub fn with_options(rules: Rules, options: ValidateOptions) -> Self {
        Self::with_registry(rules, options, RuleRegistry::builtin())
    }

    /// Create a schema with a custom registry of rule kinds
    pub fn with_registry(rules: Rules, options: ValidateOptions, registry: RuleRegistry) -> Self {
        let mut messages = Messages::default();
        if let Some(patch) = options.messages {
            messages.merge(patch);
        }

        Self {
            rules: Arc::new(rules),
            registry: Arc::new(registry),
            messages: Arc::new(messages),
            first: options.first,
            pending: Arc::new(PendingCompletions::default()),
        }
    }

    pub fn rules(&self) -> &Rules {
        &self.rules
    }

    pub fn registry(&self) -> &RuleRegistry {
        &self.registry
    }

    /// The templates the next pass will use
    pub fn templates(&self) -> &Messages {
        &self.messages
    }

    /// Merge template overrides into this schema's templates
    pub fn messages(&mut self, patch: Messages) {
        debug!(overrides = patch.len(), "Patching message templates");
        Arc::make_mut(&mut self.messages).merge(patch);
    }

    /// Validate `source`, resolving to `None` when every rule passes
    ///
    /// The returned future owns everything it needs, so it can be spawned.
    pub fn validate(
        &self,
        source: Source,
    ) -> impl Future<Output = Option<ValidationErrors>> + Send + 'static {
        self.run(source, false)
    }

    /// Like [`Schema::validate`], but an evaluator that panics fails its
    /// rule with the panic message instead of unwinding through the caller
    pub fn validate_promise(
        &self,
        source: Source,
    ) -> impl Future<Output = Option<ValidationErrors>> + Send + 'static {
        self.run(source, true)
    }

    /// Validate `source` and hand the outcome to `callback`
    ///
    /// The callback is registered before this returns, so an [`abort`]
    /// issued at any point before the pass completes stops it from firing.
    ///
    /// Dropping the returned future before it completes discards the
    /// callback without calling it.
    ///
    /// [`abort`]: Schema::abort
    pub fn validate_with_callback<F>(
        &self,
        source: Source,
        callback: F,
    ) -> impl Future<Output = ()> + Send + 'static
    where
        F: FnOnce(Option<ValidationErrors>) + Send + 'static,
    {
        let slot = PendingSlot {
            pending: Arc::clone(&self.pending),
            id: self.pending.register(Box::new(callback)),
        };
        let pass = self.run(source, false);

        async move {
            let outcome = pass.await;
            slot.complete(outcome);
        }
    }

    /// Neutralize every pending callback
    ///
    /// Passes already running still finish; their outcomes are dropped.
    /// Futures from `validate` and `validate_promise` are unaffected.
    pub fn abort(&self) {
        let aborted = self.pending.neutralize();
        debug!(aborted, "Aborted pending validations");
    }

    /// Resolve every declaration against `source` without running anything
    pub fn serialize<'a>(&'a self, source: &'a Source) -> SerializedRules<'a> {
        serialize(&self.rules, source, &self.registry)
    }

    /// How each declaration resolves, field by field
    pub fn resolutions(&self) -> Vec<(&str, Vec<Result<Resolution, ConfigWarning>>)> {
        self.rules
            .iter()
            .map(|(field, declarations)| {
                let outcomes = declarations
                    .iter()
                    .enumerate()
                    .map(|(index, rule)| {
                        resolve(rule, index, &self.registry).map(|resolved| resolved.resolution)
                    })
                    .collect();
                (field, outcomes)
            })
            .collect()
    }

    /// Declarations that would be skipped for lack of an evaluator
    pub fn skipped_rules(&self) -> Vec<ConfigWarning> {
        self.resolutions()
            .into_iter()
            .flat_map(|(_, outcomes)| outcomes.into_iter().filter_map(Result::err))
            .collect()
    }

    fn run(
        &self,
        source: Source,
        catch_panics: bool,
    ) -> impl Future<Output = Option<ValidationErrors>> + Send + 'static {
        let rules = Arc::clone(&self.rules);
        let registry = Arc::clone(&self.registry);
        let messages = Arc::clone(&self.messages);
        let first = self.first;
        let span = debug_span!("validate", fields = rules.len(), first);

        async move {
            if rules.is_empty() {
                return None;
            }

            let serialized = serialize(&rules, &source, &registry);
            let errors = if first {
                run_first(&serialized, &messages, catch_panics).await
            } else {
                run_all(&serialized, &messages, catch_panics).await
            };

            debug!(errors = errors.len(), "Validation finished");
            process_error_results(errors)
        }
        .instrument(span)
    }
}

impl std::fmt::Debug for Schema {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Schema")
            .field("rules", &self.rules)
            .field("registry", &self.registry)
            .field("first", &self.first)
            .finish()
    }
}
