//! The `range` rule kind, declared through `len`, `min` and `max`
//!
//! Strings are measured in characters, arrays in elements, and numbers by
//! value. Other values are not checked.
//!
//! Copyright (c) 2025 Specado Team
//! Licensed under the Apache-2.0 license

use crate::validation::registry::RuleContext;
use crate::validation::rule::RuleKind;
use serde_json::Value;

pub fn range(ctx: &RuleContext<'_>, errors: &mut Vec<String>) {
    let Some(RuleKind::Range(bounds)) = ctx.kind else {
        return;
    };

    let (measure, family) = match ctx.value {
        Value::String(s) => (s.chars().count() as f64, "string"),
        Value::Array(items) => (items.len() as f64, "array"),
        Value::Number(n) => match n.as_f64() {
            Some(f) => (f, "number"),
            None => return,
        },
        _ => return,
    };

    let message = |which: &str, args: &[f64]| {
        let args: Vec<Value> = args.iter().copied().map(number_value).collect();
        ctx.message(&format!("{}.{}", family, which), &args)
    };

    if let Some(len) = bounds.len {
        if measure != len {
            errors.push(message("len", &[len]));
        }
        return;
    }

    match (bounds.min, bounds.max) {
        (Some(min), Some(max)) if measure < min || measure > max => {
            errors.push(message("range", &[min, max]));
        }
        (Some(min), None) if measure < min => errors.push(message("min", &[min])),
        (None, Some(max)) if measure > max => errors.push(message("max", &[max])),
        _ => {}
    }
}

/// Integral bounds render without a fractional part
fn number_value(n: f64) -> Value {
    if n.fract() == 0.0 && n.abs() < i64::MAX as f64 {
        Value::from(n as i64)
    } else {
        Value::from(n)
    }
}
