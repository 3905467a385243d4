//! Property-based tests for validation passes
//!
//! These tests check the shape of validation results across arbitrary
//! sources: which fields can appear, how many errors each mode reports,
//! and how the required guard treats blank input.

use fieldrules_core::validation::format_message;
use fieldrules_core::{FieldType, FormatKind, Rule, Rules, Schema, Source, ValidateOptions};
use futures::executor::block_on;
use proptest::prelude::*;
use serde_json::Value;

/// Strategy for generating random JSON values with controlled complexity
fn json_value_strategy() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(|n| Value::Number(n.into())),
        "[a-zA-Z0-9@. ]{0,30}".prop_map(Value::String),
    ];

    leaf.prop_recursive(2, 8, 4, |inner| {
        prop_oneof![
            proptest::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
            proptest::collection::hash_map("[a-z]{1,8}", inner, 0..4)
                .prop_map(|m| Value::Object(m.into_iter().collect())),
        ]
    })
}

/// Strategy for sources over the fields used by `signup_rules`
fn source_strategy() -> impl Strategy<Value = Source> {
    (
        proptest::option::of(json_value_strategy()),
        proptest::option::of(json_value_strategy()),
        proptest::option::of(json_value_strategy()),
        proptest::option::of(json_value_strategy()),
    )
        .prop_map(|(name, email, age, extra)| {
            let mut source = Source::new();
            for (field, value) in [("name", name), ("email", email), ("age", age), ("extra", extra)] {
                if let Some(value) = value {
                    source.insert(field.to_string(), value);
                }
            }
            source
        })
}

fn signup_rules() -> Rules {
    let mut rules = Rules::new();
    rules.push("name", Rule::required().of_type(FieldType::String));
    rules.push("name", Rule::new().max(20.0));
    rules.push("email", Rule::required().format(FormatKind::Email));
    rules.push("age", Rule::new().of_type(FieldType::Integer));
    rules.push("age", Rule::new().min(18.0));
    rules
}

fn schema(first: bool) -> Schema {
    Schema::with_options(
        signup_rules(),
        ValidateOptions {
            first,
            messages: None,
        },
    )
}

proptest! {
    #[test]
    fn prop_errors_only_name_declared_fields(source in source_strategy()) {
        if let Some(errors) = block_on(schema(false).validate(source)) {
            for error in &errors.errors {
                prop_assert!(["name", "email", "age"].contains(&error.field.as_str()));
            }
            prop_assert!(!errors.fields.is_empty());
        }
    }

    #[test]
    fn prop_first_mode_reports_at_most_one(source in source_strategy()) {
        let first = block_on(schema(true).validate(source.clone()));
        let all = block_on(schema(false).validate(source));

        prop_assert_eq!(first.is_some(), all.is_some());
        if let (Some(first), Some(all)) = (first, all) {
            prop_assert_eq!(first.len(), 1);
            prop_assert!(all.len() >= first.len());
            prop_assert_eq!(&first.errors[0], &all.errors[0]);
        }
    }

    #[test]
    fn prop_all_mode_reports_at_most_one_per_field(source in source_strategy()) {
        if let Some(errors) = block_on(schema(false).validate(source)) {
            for (_, field_errors) in errors.fields.iter() {
                prop_assert_eq!(field_errors.len(), 1);
            }
        }
    }

    #[test]
    fn prop_blank_strings_fail_required(blank in "[ \t\n]{0,10}") {
        let rules = Rules::new().field("name", Rule::required().of_type(FieldType::String));
        let mut source = Source::new();
        source.insert("name".to_string(), Value::String(blank));

        let errors = block_on(Schema::new(rules).validate(source));
        prop_assert!(errors.is_some());
        let errors = errors.unwrap();
        prop_assert_eq!(errors.errors[0].message.as_str(), "name is required");
    }

    #[test]
    fn prop_templates_without_placeholders_are_unchanged(
        template in "[a-zA-Z ,.!]{0,40}",
        args in proptest::collection::vec(json_value_strategy(), 0..3),
    ) {
        prop_assert_eq!(format_message(&template, &args), template);
    }
}
