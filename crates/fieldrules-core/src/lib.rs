//! Fieldrules Core - Declarative field validation
//!
//! This crate validates a flat object of named values against per-field rule
//! declarations and reports every failure as a field-stamped error record.
//!
//! # Main Components
//!
//! - **Rules**: declarations built in code or loaded from JSON/YAML documents
//! - **Rule kinds**: `required`, `type`, `format`, `whitespace`, `pattern`,
//!   `enum` and `len`/`min`/`max` ranges, plus kinds registered at runtime
//! - **Schema**: runs a pass in first or all mode and returns
//!   `Option<ValidationErrors>`
//! - **Messages**: overridable `%s` templates for every built-in failure
//!
//! # Example
//!
//! ```no_run
//! use fieldrules_core::{FormatKind, Rule, Rules, Schema};
//! use serde_json::json;
//!
//! # async fn example() {
//! let rules = Rules::new()
//!     .field("name", Rule::required())
//!     .field("email", Rule::required().format(FormatKind::Email));
//! let schema = Schema::new(rules);
//!
//! let source = json!({"name": "Ada", "email": "not-an-email"});
//! let source = source.as_object().cloned().unwrap_or_default();
//!
//! if let Some(errors) = schema.validate(source).await {
//!     for error in &errors.errors {
//!         println!("{}", error);
//!     }
//! }
//! # }
//! ```

pub mod error;
pub mod validation;

// Re-export main types for convenience
pub use error::{Error, Result};
pub use validation::{
    // Declarations
    Bounds, FieldType, FormatKind, Rule, RuleKind, Rules,

    // Evaluation
    async_validator_fn, validator_fn, RuleContext, RuleEvaluator, RuleRegistry, RuleOutput,
    RawError,

    // Running
    Schema, ValidateOptions, ConfigWarning, Resolution,

    // Results
    Source, ValidationError, ValidationErrors, FieldErrors,

    // Templates
    Messages,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
