//! Error message templates
//!
//! Templates are keyed by dotted path (`required`, `format.email`,
//! `string.min`, ...) and use `%s` / `%d` / `%j` placeholders. The first
//! argument is always the field's display name.
//!
//! Copyright (c) 2025 Specado Team
//! Licensed under the Apache-2.0 license

use crate::error::{Error, Result};
use crate::validation::rules::format::to_number;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Fallback template used when a key has no template of its own
pub const DEFAULT_KEY: &str = "default";

const DEFAULT_TEMPLATES: &[(&str, &str)] = &[
    (DEFAULT_KEY, "Validation error on field %s"),
    ("required", "%s is required"),
    ("enum", "%s must be one of %s"),
    ("whitespace", "%s cannot be empty"),
    ("format.number", "%s must be a number"),
    ("format.email", "%s is not a valid email address"),
    ("format.url", "%s is not a valid URL"),
    ("format.tel", "%s is not a valid phone number"),
    ("format.IDNumber", "%s is not a valid ID number"),
    ("types.string", "%s is not a %s"),
    ("types.number", "%s is not a %s"),
    ("types.boolean", "%s is not a %s"),
    ("types.integer", "%s is not an %s"),
    ("types.float", "%s is not a %s"),
    ("types.array", "%s is not an %s"),
    ("types.object", "%s is not an %s"),
    ("types.email", "%s is not a valid %s"),
    ("types.url", "%s is not a valid %s"),
    ("types.hex", "%s is not a valid %s"),
    ("string.len", "%s must be exactly %s characters"),
    ("string.min", "%s must be at least %s characters"),
    ("string.max", "%s cannot be longer than %s characters"),
    ("string.range", "%s must be between %s and %s characters"),
    ("number.len", "%s must equal %s"),
    ("number.min", "%s cannot be less than %s"),
    ("number.max", "%s cannot be greater than %s"),
    ("number.range", "%s must be between %s and %s"),
    ("array.len", "%s must be exactly %s in length"),
    ("array.min", "%s cannot be less than %s in length"),
    ("array.max", "%s cannot be greater than %s in length"),
    ("array.range", "%s must be between %s and %s in length"),
    ("pattern.mismatch", "%s value %s does not match pattern %s"),
];

/// A set of message templates
///
/// `Messages::default()` holds the built-in templates. A patch is just
/// another `Messages` (usually built with [`Messages::empty`]) merged on top.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Messages {
    templates: BTreeMap<String, String>,
}

impl Default for Messages {
    fn default() -> Self {
        Self {
            templates: DEFAULT_TEMPLATES
                .iter()
                .map(|(key, template)| (key.to_string(), template.to_string()))
                .collect(),
        }
    }
}

impl Messages {
    /// A template set with no entries, for building patches
    pub fn empty() -> Self {
        Self {
            templates: BTreeMap::new(),
        }
    }

    /// Set one template, builder style
    pub fn with(mut self, key: impl Into<String>, template: impl Into<String>) -> Self {
        self.set(key, template);
        self
    }

    pub fn set(&mut self, key: impl Into<String>, template: impl Into<String>) {
        self.templates.insert(key.into(), template.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.templates.get(key).map(String::as_str)
    }

    /// Template for `key`, falling back to the `default` template
    pub fn template(&self, key: &str) -> &str {
        self.get(key)
            .or_else(|| self.get(DEFAULT_KEY))
            .unwrap_or("Validation error on field %s")
    }

    /// Overlay `patch` on this set; keys in the patch win
    pub fn merge(&mut self, patch: Messages) {
        self.templates.extend(patch.templates);
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.templates
            .iter()
            .map(|(key, template)| (key.as_str(), template.as_str()))
    }

    /// Build a patch from a (possibly nested) JSON object
    ///
    /// `{"string": {"min": "..."}}` and `{"string.min": "..."}` are
    /// equivalent.
    pub fn from_value(value: &Value) -> Result<Self> {
        let Value::Object(map) = value else {
            return Err(Error::invalid_document("messages must be a mapping"));
        };

        let mut messages = Self::empty();
        flatten_into(&mut messages, "", map)?;
        Ok(messages)
    }

    /// Render the template for `key` with the given arguments
    pub fn render(&self, key: &str, args: &[Value]) -> String {
        format_message(self.template(key), args)
    }
}

fn flatten_into(
    messages: &mut Messages,
    prefix: &str,
    map: &serde_json::Map<String, Value>,
) -> Result<()> {
    for (key, value) in map {
        let path = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{}.{}", prefix, key)
        };

        match value {
            Value::String(template) => messages.set(path, template.clone()),
            Value::Object(nested) => flatten_into(messages, &path, nested)?,
            other => {
                return Err(Error::invalid_document(format!(
                    "message template '{}' must be a string, found {}",
                    path, other
                )))
            }
        }
    }
    Ok(())
}

impl<'de> Deserialize<'de> for Messages {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Messages::from_value(&value).map_err(serde::de::Error::custom)
    }
}

/// Substitute `%s`, `%d` and `%j` placeholders in order
///
/// `%%` renders a literal percent sign. Placeholders beyond the supplied
/// arguments are left untouched, and surplus arguments are ignored.
pub fn format_message(template: &str, args: &[Value]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut args = args.iter();
    let mut chars = template.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }

        match chars.peek().copied() {
            Some('%') => {
                chars.next();
                out.push('%');
            }
            Some(spec @ ('s' | 'd' | 'j')) => {
                chars.next();
                match args.next() {
                    Some(arg) => match spec {
                        's' => out.push_str(&display_arg(arg)),
                        'd' => out.push_str(&display_number(to_number(arg))),
                        _ => out.push_str(&arg.to_string()),
                    },
                    None => {
                        out.push('%');
                        out.push(spec);
                    }
                }
            }
            _ => out.push('%'),
        }
    }

    out
}

/// Render an argument the way string concatenation would
pub fn display_arg(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::String(s) => s.clone(),
        Value::Number(n) => match n.as_f64() {
            Some(f) if !(n.is_i64() || n.is_u64()) => display_number(f),
            _ => n.to_string(),
        },
        Value::Array(items) => items.iter().map(display_arg).collect::<Vec<_>>().join(","),
        other => other.to_string(),
    }
}

fn display_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        let sign = if n > 0.0 { "" } else { "-" };
        format!("{}Infinity", sign)
    } else {
        n.to_string()
    }
}
