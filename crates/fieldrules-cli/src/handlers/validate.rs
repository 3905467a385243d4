//! Validate command handler

use super::utils::{load_messages, load_rules, load_source};
use crate::cli::{OutputFormat, ValidateArgs};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::logging::{redaction, timing::Timer};
use crate::output::{OutputWriter, ValidationReport};
use fieldrules_core::{Messages, Schema, ValidateOptions};
use serde_json::Value;
use tracing::{debug, info, instrument, trace, warn};

/// Handle the validate command
#[instrument(skip(config, output), fields(rules = %args.rules.display(), source = %args.source.display()))]
pub async fn handle_validate(
    args: ValidateArgs,
    config: &Config,
    output: &mut OutputWriter,
) -> Result<()> {
    let _timer = Timer::with_details("validate_command", &format!("source: {}", args.source.display()));
    info!("Starting validation");
    output.info(&format!(
        "Validating {} against {}",
        args.source.display(),
        args.rules.display()
    ))?;

    let rules = load_rules(&args.rules)?;
    let source = load_source(&args.source)?;

    let options = ValidateOptions {
        first: args.first || config.validation.first,
        messages: merged_messages(config, &args)?,
    };
    debug!(first = options.first, "Resolved validation options");

    let schema = Schema::with_options(rules, options);
    if output.is_verbose() {
        output.info(&format!(
            "Loaded {} field(s) with {} rule declaration(s)",
            schema.rules().len(),
            schema.rules().iter().map(|(_, rules)| rules.len()).sum::<usize>()
        ))?;
    }

    let skipped: Vec<String> = schema
        .skipped_rules()
        .iter()
        .map(ToString::to_string)
        .collect();

    if tracing::enabled!(tracing::Level::TRACE) {
        let mut redacted = Value::Object(source.clone());
        redaction::redact_json_value(&mut redacted);
        trace!(source = %redacted, "Validating source");
    }

    let run_timer = Timer::new("validation_pass");
    let outcome = schema.validate(source).await;
    let elapsed = run_timer.elapsed();
    drop(run_timer);
    if output.is_verbose() {
        output.info(&format!("Validation pass took {:.2?}", elapsed))?;
    }

    match outcome {
        None => {
            info!("Validation passed");
            if output.format() == OutputFormat::Human {
                for warning in &skipped {
                    output.warning(&format!("⚠ Skipped: {}", warning))?;
                }
                output.success("✓ All rules passed")?;
            } else {
                output.validation_report(&ValidationReport::new(None, skipped))?;
            }
            Ok(())
        }
        Some(errors) => {
            warn!(errors = errors.len(), fields = errors.fields.len(), "Validation failed");
            output.validation_report(&ValidationReport::new(Some(&errors), skipped))?;
            Err(Error::ValidationFailed {
                count: errors.len(),
            })
        }
    }
}

/// Config templates first, then the `--messages` file on top
fn merged_messages(config: &Config, args: &ValidateArgs) -> Result<Option<Messages>> {
    let from_file = args.messages.as_deref().map(load_messages).transpose()?;

    Ok(match (config.validation.messages.clone(), from_file) {
        (Some(mut base), Some(patch)) => {
            base.merge(patch);
            Some(base)
        }
        (base, patch) => base.or(patch),
    })
}
