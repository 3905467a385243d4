//! The `required` rule kind
//!
//! Copyright (c) 2025 Specado Team
//! Licensed under the Apache-2.0 license

use crate::validation::registry::RuleContext;
use serde_json::Value;

/// Whether a value counts as absent for the required check
///
/// Strings are trimmed first, so a whitespace-only string is empty here
/// even though other kinds receive it untrimmed.
pub fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        Value::Array(items) => items.is_empty(),
        _ => false,
    }
}

/// Fails when the value is absent or empty
pub fn required(ctx: &RuleContext<'_>, errors: &mut Vec<String>) {
    if is_empty_value(ctx.value) {
        errors.push(ctx.message("required", &[]));
    }
}
