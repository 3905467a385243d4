//! Inspect command handler
//!
//! Shows, for every declaration in a rules document, which evaluator the
//! engine would run, without needing a source document.

use super::utils::load_rules;
use crate::cli::{InspectArgs, OutputFormat};
use crate::config::Config;
use crate::error::Result;
use crate::logging::timing::Timer;
use crate::output::OutputWriter;
use fieldrules_core::{Rule, Schema};
use serde::Serialize;
use tracing::{info, instrument, warn};

/// How one declaration resolves
#[derive(Debug, Serialize)]
pub struct DeclarationReport {
    pub field: String,
    pub index: usize,
    pub required: bool,
    pub kinds: Vec<String>,
    /// The branch taken; `None` when the declaration is skipped
    pub evaluator: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

/// Handle the inspect command
#[instrument(skip(_config, output), fields(rules = %args.rules.display()))]
pub async fn handle_inspect(
    args: InspectArgs,
    _config: &Config,
    output: &mut OutputWriter,
) -> Result<()> {
    let _timer = Timer::new("inspect_command");
    let schema = Schema::new(load_rules(&args.rules)?);
    let reports = inspect(&schema);
    info!(declarations = reports.len(), "Inspected rules");

    if output.format() != OutputFormat::Human {
        return output.data(&reports);
    }

    output.section(&format!("Rules in {}", args.rules.display()))?;
    let rows = reports
        .iter()
        .map(|report| {
            vec![
                report.field.clone(),
                report.index.to_string(),
                if report.required { "yes" } else { "no" }.to_string(),
                report.kinds.join(", "),
                report.evaluator.clone().unwrap_or_else(|| "skipped".to_string()),
            ]
        })
        .collect();
    output.table(&["FIELD", "#", "REQUIRED", "KINDS", "EVALUATOR"], rows)?;

    for warning in reports.iter().filter_map(|r| r.warning.as_deref()) {
        output.warning(&format!("⚠ {}", warning))?;
    }
    Ok(())
}

/// Resolve every declaration in `schema`
pub fn inspect(schema: &Schema) -> Vec<DeclarationReport> {
    let mut reports = Vec::new();

    for (field, outcomes) in schema.resolutions() {
        let declarations = schema.rules().get(field).unwrap_or_default();
        for (index, (rule, outcome)) in declarations.iter().zip(outcomes).enumerate() {
            let (evaluator, warning) = match outcome {
                Ok(resolution) => (Some(resolution.to_string()), None),
                Err(skipped) => {
                    warn!("{}", skipped);
                    (None, Some(skipped.to_string()))
                }
            };

            reports.push(DeclarationReport {
                field: field.to_string(),
                index,
                required: rule.required,
                kinds: declared_kinds(rule),
                evaluator,
                warning,
            });
        }
    }

    reports
}

fn declared_kinds(rule: &Rule) -> Vec<String> {
    let mut kinds: Vec<String> = rule.kinds.iter().map(|kind| kind.key().to_string()).collect();
    if rule.validator.is_some() {
        kinds.insert(0, "validator".to_string());
    }
    kinds
}

#[cfg(test)]
mod tests {
    use super::*;
    use fieldrules_core::{validator_fn, FormatKind, Rules};

    #[test]
    fn test_inspect_reports_each_branch() {
        let rules = Rules::new()
            .field("name", Rule::required())
            .field("email", Rule::required().format(FormatKind::Email).min(3.0))
            .field("code", Rule::new().kind("unique", serde_json::json!("codes")))
            .field("user", Rule::new().validator(validator_fn(|_ctx| ())));
        let reports = inspect(&Schema::new(rules));

        assert_eq!(reports.len(), 4);
        assert_eq!(reports[0].evaluator.as_deref(), Some("required"));

        assert_eq!(reports[1].kinds, vec!["format", "range"]);
        assert_eq!(reports[1].evaluator.as_deref(), Some("format (guarded)"));

        assert!(reports[2].evaluator.is_none());
        assert!(reports[2].warning.as_deref().unwrap().contains("declared kinds: unique"));

        assert_eq!(reports[3].kinds, vec!["validator"]);
        assert_eq!(reports[3].evaluator.as_deref(), Some("custom validator"));
    }

    #[test]
    fn test_inspect_serializes_without_empty_warning() {
        let reports = inspect(&Schema::new(Rules::new().field("name", Rule::required())));
        let value = serde_json::to_value(&reports).unwrap();
        assert_eq!(value[0]["field"], "name");
        assert!(value[0].get("warning").is_none());
    }
}
