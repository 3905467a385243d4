//! Rule declarations
//!
//! A `Rule` describes one constraint on one field. `Rules` maps field names
//! to ordered lists of rules, every one of which must pass. Declarations can
//! be built in code or loaded from JSON/YAML documents; either way the order
//! in which rule kinds are declared is kept, because the resolver picks the
//! first declared kind that has a registered evaluator.
//!
//! Copyright (c) 2025 Specado Team
//! Licensed under the Apache-2.0 license

use crate::error::{Error, Result};
use crate::validation::registry::RuleEvaluator;
use regex::Regex;
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

/// Patterns checked by the `format` rule kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormatKind {
    Number,
    Email,
    Url,
    /// Mainland China phone and fax numbers
    Tel,
    /// 18-character resident ID number with ISO 7064 MOD 11-2 check digit
    IdNumber,
}

impl FormatKind {
    pub fn as_str(self) -> &'static str {
        match self {
            FormatKind::Number => "number",
            FormatKind::Email => "email",
            FormatKind::Url => "url",
            FormatKind::Tel => "tel",
            FormatKind::IdNumber => "IDNumber",
        }
    }
}

impl fmt::Display for FormatKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FormatKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "number" => Ok(FormatKind::Number),
            "email" => Ok(FormatKind::Email),
            "url" => Ok(FormatKind::Url),
            "tel" => Ok(FormatKind::Tel),
            "IDNumber" => Ok(FormatKind::IdNumber),
            other => Err(format!("unknown format '{}'", other)),
        }
    }
}

/// Value types checked by the `type` rule kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldType {
    String,
    Number,
    Boolean,
    Integer,
    Float,
    Array,
    Object,
    Email,
    Url,
    Hex,
}

impl FieldType {
    pub fn as_str(self) -> &'static str {
        match self {
            FieldType::String => "string",
            FieldType::Number => "number",
            FieldType::Boolean => "boolean",
            FieldType::Integer => "integer",
            FieldType::Float => "float",
            FieldType::Array => "array",
            FieldType::Object => "object",
            FieldType::Email => "email",
            FieldType::Url => "url",
            FieldType::Hex => "hex",
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FieldType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "string" => Ok(FieldType::String),
            "number" => Ok(FieldType::Number),
            "boolean" => Ok(FieldType::Boolean),
            "integer" => Ok(FieldType::Integer),
            "float" => Ok(FieldType::Float),
            "array" => Ok(FieldType::Array),
            "object" => Ok(FieldType::Object),
            "email" => Ok(FieldType::Email),
            "url" => Ok(FieldType::Url),
            "hex" => Ok(FieldType::Hex),
            other => Err(format!("unknown type '{}'", other)),
        }
    }
}

/// Length or magnitude bounds for the `range` rule kind
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Bounds {
    pub len: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

/// One declared rule kind together with its parameter
#[derive(Debug, Clone)]
pub enum RuleKind {
    Type(FieldType),
    Format(FormatKind),
    Whitespace,
    Pattern(Regex),
    Enum(Vec<Value>),
    /// Declared through the `len`, `min` and `max` keys
    Range(Bounds),
    /// Any other key; matched against the registry by name
    Named { key: String, param: Value },
}

impl RuleKind {
    /// Registry key this kind dispatches on
    pub fn key(&self) -> &str {
        match self {
            RuleKind::Type(_) => "type",
            RuleKind::Format(_) => "format",
            RuleKind::Whitespace => "whitespace",
            RuleKind::Pattern(_) => "pattern",
            RuleKind::Enum(_) => "enum",
            RuleKind::Range(_) => "range",
            RuleKind::Named { key, .. } => key,
        }
    }
}

/// A declaration of one constraint on one field
#[derive(Clone, Default)]
pub struct Rule {
    /// Field this rule is bound to; stamped when added to `Rules`
    pub field: String,
    pub required: bool,
    /// Declared kinds, in declaration order
    pub kinds: Vec<RuleKind>,
    /// Custom evaluator; when present it is the only thing that runs
    pub validator: Option<Arc<dyn RuleEvaluator>>,
    /// Replaces whatever message the evaluator produced
    pub message: Option<Vec<String>>,
    /// Display name used in messages instead of the field name
    pub alias_name: Option<String>,
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule")
            .field("field", &self.field)
            .field("required", &self.required)
            .field("kinds", &self.kinds)
            .field("validator", &self.validator.as_ref().map(|_| "<custom>"))
            .field("message", &self.message)
            .field("alias_name", &self.alias_name)
            .finish()
    }
}

impl Rule {
    /// Create an empty declaration
    pub fn new() -> Self {
        Self::default()
    }

    /// Shorthand for a declaration that only marks the field required
    pub fn required() -> Self {
        Self::new().require(true)
    }

    pub fn require(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    pub fn of_type(mut self, field_type: FieldType) -> Self {
        self.kinds.push(RuleKind::Type(field_type));
        self
    }

    pub fn format(mut self, format: FormatKind) -> Self {
        self.kinds.push(RuleKind::Format(format));
        self
    }

    pub fn whitespace(mut self) -> Self {
        self.kinds.push(RuleKind::Whitespace);
        self
    }

    pub fn pattern(mut self, pattern: Regex) -> Self {
        self.kinds.push(RuleKind::Pattern(pattern));
        self
    }

    pub fn one_of(mut self, values: Vec<Value>) -> Self {
        self.kinds.push(RuleKind::Enum(values));
        self
    }

    pub fn exact_len(mut self, len: f64) -> Self {
        self.update_bounds(|bounds| bounds.len = Some(len));
        self
    }

    pub fn min(mut self, min: f64) -> Self {
        self.update_bounds(|bounds| bounds.min = Some(min));
        self
    }

    pub fn max(mut self, max: f64) -> Self {
        self.update_bounds(|bounds| bounds.max = Some(max));
        self
    }

    /// Declare a kind by registry key, for kinds registered at runtime
    pub fn kind(mut self, key: impl Into<String>, param: Value) -> Self {
        self.kinds.push(RuleKind::Named {
            key: key.into(),
            param,
        });
        self
    }

    pub fn validator(mut self, validator: impl RuleEvaluator + 'static) -> Self {
        self.validator = Some(Arc::new(validator));
        self
    }

    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(vec![message.into()]);
        self
    }

    pub fn messages(mut self, messages: Vec<String>) -> Self {
        self.message = Some(messages);
        self
    }

    pub fn alias(mut self, alias_name: impl Into<String>) -> Self {
        self.alias_name = Some(alias_name.into());
        self
    }

    /// Name used for this field in messages
    pub fn display_name(&self) -> &str {
        self.alias_name.as_deref().unwrap_or(&self.field)
    }

    /// Update the range bounds, appending a `Range` kind on first use
    fn update_bounds(&mut self, update: impl FnOnce(&mut Bounds)) {
        for kind in &mut self.kinds {
            if let RuleKind::Range(bounds) = kind {
                update(bounds);
                return;
            }
        }

        let mut bounds = Bounds::default();
        update(&mut bounds);
        self.kinds.push(RuleKind::Range(bounds));
    }

    /// Parse one declaration object, keeping key order
    pub fn from_value(field: &str, value: &Value) -> Result<Self> {
        let Value::Object(map) = value else {
            return Err(Error::invalid_rule(field, "rule declaration must be a mapping"));
        };

        let mut rule = Rule {
            field: field.to_string(),
            ..Rule::default()
        };

        for (key, param) in map {
            match key.as_str() {
                "required" => rule.required = expect_bool(field, key, param)?,
                "type" => {
                    let field_type = expect_str(field, key, param)?
                        .parse()
                        .map_err(|e: String| Error::invalid_rule(field, e))?;
                    rule = rule.of_type(field_type);
                }
                "format" => {
                    let format = expect_str(field, key, param)?
                        .parse()
                        .map_err(|e: String| Error::invalid_rule(field, e))?;
                    rule = rule.format(format);
                }
                "whitespace" => {
                    if expect_bool(field, key, param)? {
                        rule = rule.whitespace();
                    }
                }
                "pattern" => {
                    let source = expect_str(field, key, param)?;
                    let pattern = Regex::new(source).map_err(|e| {
                        Error::invalid_rule(field, format!("invalid pattern '{}': {}", source, e))
                    })?;
                    rule = rule.pattern(pattern);
                }
                "enum" => match param {
                    Value::Array(values) => rule = rule.one_of(values.clone()),
                    _ => return Err(Error::invalid_rule(field, "'enum' must be a list")),
                },
                "len" => rule = rule.exact_len(expect_number(field, key, param)?),
                "min" => rule = rule.min(expect_number(field, key, param)?),
                "max" => rule = rule.max(expect_number(field, key, param)?),
                "message" => rule.message = Some(parse_message(field, param)?),
                "aliasName" | "alias_name" => {
                    rule.alias_name = Some(expect_str(field, key, param)?.to_string())
                }
                // Stamped from the enclosing mapping
                "field" => {}
                "validator" => {
                    return Err(Error::invalid_rule(
                        field,
                        "custom validators cannot be declared in a document; attach them in code",
                    ))
                }
                other => rule = rule.kind(other, param.clone()),
            }
        }

        Ok(rule)
    }
}

fn expect_bool(field: &str, key: &str, value: &Value) -> Result<bool> {
    value
        .as_bool()
        .ok_or_else(|| Error::invalid_rule(field, format!("'{}' must be a boolean", key)))
}

fn expect_str<'a>(field: &str, key: &str, value: &'a Value) -> Result<&'a str> {
    value
        .as_str()
        .ok_or_else(|| Error::invalid_rule(field, format!("'{}' must be a string", key)))
}

fn expect_number(field: &str, key: &str, value: &Value) -> Result<f64> {
    value
        .as_f64()
        .ok_or_else(|| Error::invalid_rule(field, format!("'{}' must be a number", key)))
}

fn parse_message(field: &str, value: &Value) -> Result<Vec<String>> {
    match value {
        Value::String(message) => Ok(vec![message.clone()]),
        Value::Array(items) if !items.is_empty() => items
            .iter()
            .map(|item| {
                item.as_str().map(str::to_string).ok_or_else(|| {
                    Error::invalid_rule(field, "'message' list entries must be strings")
                })
            })
            .collect(),
        _ => Err(Error::invalid_rule(
            field,
            "'message' must be a string or a non-empty list of strings",
        )),
    }
}

/// Rule declarations for a set of fields, in declaration order
#[derive(Debug, Clone, Default)]
pub struct Rules {
    fields: Vec<(String, Vec<Rule>)>,
}

impl Rules {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a rule to `field`, builder style
    pub fn field(mut self, field: impl Into<String>, rule: Rule) -> Self {
        self.push(field, rule);
        self
    }

    /// Append a rule to `field`, stamping the field name onto it
    pub fn push(&mut self, field: impl Into<String>, mut rule: Rule) {
        let field = field.into();
        rule.field = field.clone();

        match self.fields.iter_mut().find(|(name, _)| *name == field) {
            Some((_, rules)) => rules.push(rule),
            None => self.fields.push((field, vec![rule])),
        }
    }

    /// Replace all rules for `field`
    pub fn insert(&mut self, field: impl Into<String>, rules: Vec<Rule>) {
        let field = field.into();
        let rules: Vec<Rule> = rules
            .into_iter()
            .map(|mut rule| {
                rule.field = field.clone();
                rule
            })
            .collect();

        match self.fields.iter_mut().find(|(name, _)| *name == field) {
            Some((_, existing)) => *existing = rules,
            None => self.fields.push((field, rules)),
        }
    }

    pub fn get(&self, field: &str) -> Option<&[Rule]> {
        self.fields
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, rules)| rules.as_slice())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Rule])> {
        self.fields
            .iter()
            .map(|(field, rules)| (field.as_str(), rules.as_slice()))
    }

    /// Number of fields with declarations
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Parse a rules document: a mapping of field to one declaration or a list
    pub fn from_value(value: &Value) -> Result<Self> {
        let Value::Object(map) = value else {
            return Err(Error::invalid_document(
                "rules must be a mapping of field names to declarations",
            ));
        };

        let mut rules = Rules::new();
        for (field, declarations) in map {
            rules.insert(field.clone(), parse_declarations(field, declarations)?);
        }
        Ok(rules)
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(content)?;
        Self::from_value(&value)
    }

    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let value: Value = serde_yaml::from_str(content)?;
        Self::from_value(&value)
    }

    /// Load a rules file, choosing the parser by extension
    pub fn from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        if is_yaml_path(path) {
            Self::from_yaml_str(&content)
        } else {
            Self::from_json_str(&content)
        }
    }
}

fn parse_declarations(field: &str, value: &Value) -> Result<Vec<Rule>> {
    match value {
        Value::Array(items) => items.iter().map(|item| Rule::from_value(field, item)).collect(),
        Value::Object(_) => Ok(vec![Rule::from_value(field, value)?]),
        _ => Err(Error::invalid_rule(
            field,
            "expected a declaration or a list of declarations",
        )),
    }
}

/// True for `.yaml` / `.yml` paths
pub fn is_yaml_path(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|s| s.to_str()),
        Some("yaml") | Some("yml")
    )
}

impl<'de> Deserialize<'de> for Rules {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let value = Map::<String, Value>::deserialize(deserializer)?;
        Rules::from_value(&Value::Object(value)).map_err(serde::de::Error::custom)
    }
}
