//! The `whitespace`, `pattern` and `enum` rule kinds
//!
//! Copyright (c) 2025 Specado Team
//! Licensed under the Apache-2.0 license

use crate::validation::messages::display_arg;
use crate::validation::registry::RuleContext;
use crate::validation::rule::RuleKind;
use serde_json::Value;

/// Fails on a string made only of whitespace
pub fn whitespace(ctx: &RuleContext<'_>, errors: &mut Vec<String>) {
    if let Value::String(s) = ctx.value {
        if s.trim().is_empty() {
            errors.push(ctx.message("whitespace", &[]));
        }
    }
}

/// Fails when the value's text does not match the declared pattern
///
/// The pattern is not implicitly anchored.
pub fn pattern(ctx: &RuleContext<'_>, errors: &mut Vec<String>) {
    let Some(RuleKind::Pattern(regex)) = ctx.kind else {
        return;
    };

    let text = match ctx.value {
        Value::String(s) => s.clone(),
        Value::Number(_) | Value::Bool(_) => ctx.value.to_string(),
        _ => return,
    };

    if !regex.is_match(&text) {
        errors.push(ctx.message(
            "pattern.mismatch",
            &[Value::String(text), Value::String(regex.as_str().to_string())],
        ));
    }
}

/// Fails when the value is not one of the declared values
pub fn enumeration(ctx: &RuleContext<'_>, errors: &mut Vec<String>) {
    let Some(RuleKind::Enum(allowed)) = ctx.kind else {
        return;
    };

    if !allowed.contains(ctx.value) {
        let listing = allowed.iter().map(display_arg).collect::<Vec<_>>().join(", ");
        errors.push(ctx.message("enum", &[Value::String(listing)]));
    }
}
