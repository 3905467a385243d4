//! Configuration command handlers

use crate::cli::{ConfigAction, ConfigArgs, ConfigFormat, ConfigInitArgs, ConfigShowArgs};
use crate::config::{Config, DEFAULT_CONFIG_FILE};
use crate::error::{Error, Result};
use crate::output::OutputWriter;
use std::path::PathBuf;
use tracing::info;

/// Handle the config command
pub async fn handle_config(
    args: ConfigArgs,
    config: &Config,
    output: &mut OutputWriter,
) -> Result<()> {
    match args.action {
        ConfigAction::Init(init_args) => handle_config_init(init_args, output).await,
        ConfigAction::Show(show_args) => handle_config_show(show_args, config, output).await,
    }
}

/// Handle config init subcommand
async fn handle_config_init(args: ConfigInitArgs, output: &mut OutputWriter) -> Result<()> {
    let path = args
        .path
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));

    let supported = matches!(
        path.extension().and_then(|s| s.to_str()),
        Some("yaml") | Some("yml") | Some("json")
    );
    if !supported {
        return Err(Error::invalid_args(format!(
            "config file must end in .yaml, .yml or .json: {}",
            path.display()
        )));
    }

    if path.exists() && !args.force {
        output.warning(&format!(
            "Config already exists at {} (use --force to overwrite)",
            path.display()
        ))?;
        return Ok(());
    }

    Config::default().save(&path)?;
    info!("Wrote default configuration to {}", path.display());
    output.success(&format!("✓ Created config at {}", path.display()))?;
    output.info("Edit it to customize validation, output and logging settings.")?;

    Ok(())
}

/// Handle config show subcommand
async fn handle_config_show(
    args: ConfigShowArgs,
    config: &Config,
    output: &mut OutputWriter,
) -> Result<()> {
    let content = match args.format {
        ConfigFormat::Json => serde_json::to_string_pretty(config)
            .map_err(|e| Error::config(format!("Failed to serialize as JSON: {}", e)))?,
        ConfigFormat::Yaml => serde_yaml::to_string(config)
            .map_err(|e| Error::config(format!("Failed to serialize as YAML: {}", e)))?,
    };

    output.writeln(content.trim_end())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::OutputFormat;
    use std::io::{self, Write};
    use std::sync::{Arc, Mutex};
    use tempfile::TempDir;

    #[derive(Clone, Default)]
    struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

    impl Write for SharedBuffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn writer() -> (OutputWriter, SharedBuffer) {
        let buffer = SharedBuffer::default();
        let output = OutputWriter::with_writer(
            OutputFormat::Human,
            false,
            false,
            0,
            Box::new(buffer.clone()),
        );
        (output, buffer)
    }

    fn init_args(path: PathBuf, force: bool) -> ConfigArgs {
        ConfigArgs {
            action: ConfigAction::Init(ConfigInitArgs {
                path: Some(path),
                force,
            }),
        }
    }

    #[tokio::test]
    async fn test_init_writes_loadable_config() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("fieldrules.yaml");
        let (mut output, buffer) = writer();

        handle_config(init_args(path.clone(), false), &Config::default(), &mut output)
            .await
            .unwrap();

        let loaded = Config::from_file(&path).unwrap();
        assert_eq!(loaded.output.format, "human");
        let text = String::from_utf8(buffer.0.lock().unwrap().clone()).unwrap();
        assert!(text.contains("Created config"));
    }

    #[tokio::test]
    async fn test_init_refuses_to_overwrite_without_force() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{\"output\": {\"format\": \"json\"}}").unwrap();
        let (mut output, _) = writer();

        handle_config(init_args(path.clone(), false), &Config::default(), &mut output)
            .await
            .unwrap();
        assert_eq!(Config::from_file(&path).unwrap().output.format, "json");

        handle_config(init_args(path.clone(), true), &Config::default(), &mut output)
            .await
            .unwrap();
        assert_eq!(Config::from_file(&path).unwrap().output.format, "human");
    }

    #[tokio::test]
    async fn test_init_rejects_unknown_extension() {
        let dir = TempDir::new().unwrap();
        let (mut output, _) = writer();
        let result = handle_config(
            init_args(dir.path().join("config.toml"), false),
            &Config::default(),
            &mut output,
        )
        .await;
        assert!(matches!(result, Err(Error::InvalidArgs(_))));
    }

    #[tokio::test]
    async fn test_show_json() {
        let (mut output, buffer) = writer();
        let args = ConfigArgs {
            action: ConfigAction::Show(ConfigShowArgs {
                format: ConfigFormat::Json,
            }),
        };
        handle_config(args, &Config::default(), &mut output).await.unwrap();

        let text = String::from_utf8(buffer.0.lock().unwrap().clone()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["logging"]["level"], "warn");
        assert_eq!(value["validation"]["first"], false);
    }
}
