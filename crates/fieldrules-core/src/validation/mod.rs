//! Field validation engine
//!
//! Rules are declared per field, resolved to an evaluator each, run against
//! a source object, and folded into a grouped error result:
//!
//! - **Registry**: the catalog of rule kinds and the evaluator contract
//! - **Resolver**: picks one evaluator per declaration, behind the required guard
//! - **Runner**: first mode (stop at the first failure) or all mode (every field)
//! - **Aggregator**: applies message overrides and stamps field names
//!
//! Copyright (c) 2025 Specado Team
//! Licensed under the Apache-2.0 license

pub mod aggregator;
pub mod messages;
pub mod registry;
pub mod resolver;
pub mod rule;
pub mod rules;
pub mod runner;
pub mod schema;
pub mod types;

// Re-export commonly used types
pub use messages::{format_message, Messages};
pub use registry::{
    async_validator_fn, validator_fn, RuleContext, RuleEvaluator, RuleFn, RuleRegistry, SyncRule,
};
pub use resolver::{ConfigWarning, Resolution};
pub use rule::{Bounds, FieldType, FormatKind, Rule, RuleKind, Rules};
pub use schema::{Schema, ValidateOptions};
pub use types::{FieldErrors, RawError, RuleOutput, Source, ValidationError, ValidationErrors};
