//! The `type` rule kind
//!
//! Copyright (c) 2025 Specado Team
//! Licensed under the Apache-2.0 license

use super::format::{is_email, is_url};
use crate::validation::registry::RuleContext;
use crate::validation::rule::{FieldType, RuleKind};
use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;

static HEX_REGEX: OnceLock<Regex> = OnceLock::new();

fn hex_regex() -> &'static Regex {
    HEX_REGEX.get_or_init(|| {
        Regex::new(r"(?i)^#?([a-f0-9]{6}|[a-f0-9]{3})$").expect("hex pattern compiles")
    })
}

/// Fails when the value is not of the declared type
pub fn type_rule(ctx: &RuleContext<'_>, errors: &mut Vec<String>) {
    let Some(RuleKind::Type(field_type)) = ctx.kind else {
        return;
    };

    if !is_type(*field_type, ctx.value) {
        errors.push(ctx.message(
            &format!("types.{}", field_type.as_str()),
            &[Value::String(field_type.as_str().to_string())],
        ));
    }
}

pub fn is_type(field_type: FieldType, value: &Value) -> bool {
    match field_type {
        FieldType::String => value.is_string(),
        FieldType::Number => value.is_number(),
        FieldType::Boolean => value.is_boolean(),
        FieldType::Integer => is_integer(value),
        FieldType::Float => value.is_number() && !is_integer(value),
        FieldType::Array => value.is_array(),
        FieldType::Object => value.is_object(),
        FieldType::Email => value.as_str().is_some_and(is_email),
        FieldType::Url => value.as_str().is_some_and(is_url),
        FieldType::Hex => value.as_str().is_some_and(|s| hex_regex().is_match(s)),
    }
}

fn is_integer(value: &Value) -> bool {
    match value {
        Value::Number(n) if n.is_i64() || n.is_u64() => true,
        Value::Number(n) => n.as_f64().is_some_and(|f| f.fract() == 0.0),
        _ => false,
    }
}
