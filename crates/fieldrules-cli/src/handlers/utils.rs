//! Shared utilities for command handlers

use crate::error::{Error, Result};
use fieldrules_core::validation::rule::is_yaml_path;
use fieldrules_core::{Messages, Rules, Source};
use serde_json::Value;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Load a rules document
pub fn load_rules(path: &Path) -> Result<Rules> {
    ensure_exists(path)?;
    let rules = Rules::from_path(path)?;
    debug!(fields = rules.len(), "Loaded rules from {}", path.display());
    Ok(rules)
}

/// Load the document to validate; its top level must be a mapping
pub fn load_source(path: &Path) -> Result<Source> {
    match read_document(path)? {
        Value::Object(source) => {
            debug!(fields = source.len(), "Loaded source from {}", path.display());
            Ok(source)
        }
        _ => Err(Error::InvalidFormat {
            path: path.to_path_buf(),
            expected: "a mapping of field names to values".to_string(),
        }),
    }
}

/// Load a message template patch
pub fn load_messages(path: &Path) -> Result<Messages> {
    let value = read_document(path)?;
    Ok(Messages::from_value(&value)?)
}

fn read_document(path: &Path) -> Result<Value> {
    ensure_exists(path)?;
    let content = fs::read_to_string(path)?;

    if is_yaml_path(path) {
        serde_yaml::from_str(&content).map_err(|_| Error::InvalidFormat {
            path: path.to_path_buf(),
            expected: "YAML".to_string(),
        })
    } else {
        serde_json::from_str(&content).map_err(|_| Error::InvalidFormat {
            path: path.to_path_buf(),
            expected: "JSON".to_string(),
        })
    }
}

fn ensure_exists(path: &Path) -> Result<()> {
    if path.exists() {
        Ok(())
    } else {
        Err(Error::FileNotFound {
            path: path.to_path_buf(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_source_yaml_and_json() {
        let dir = TempDir::new().unwrap();

        let yaml = dir.path().join("source.yaml");
        fs::write(&yaml, "name: Ada\nage: 36\n").unwrap();
        let source = load_source(&yaml).unwrap();
        assert_eq!(source["name"], "Ada");

        let json = dir.path().join("source.json");
        fs::write(&json, r#"{"b": 1, "a": 2}"#).unwrap();
        let source = load_source(&json).unwrap();
        assert_eq!(source.keys().collect::<Vec<_>>(), vec!["b", "a"]);
    }

    #[test]
    fn test_load_source_rejects_non_mapping() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("list.json");
        fs::write(&path, "[1, 2]").unwrap();
        assert!(matches!(load_source(&path), Err(Error::InvalidFormat { .. })));

        let broken = dir.path().join("broken.json");
        fs::write(&broken, "{").unwrap();
        assert!(matches!(load_source(&broken), Err(Error::InvalidFormat { .. })));
    }

    #[test]
    fn test_missing_files() {
        let path = Path::new("/definitely/not/here.yaml");
        assert!(matches!(load_rules(path), Err(Error::FileNotFound { .. })));
        assert!(matches!(load_messages(path), Err(Error::FileNotFound { .. })));
    }

    #[test]
    fn test_load_messages_and_rules() {
        let dir = TempDir::new().unwrap();
        let messages = dir.path().join("messages.yaml");
        fs::write(&messages, "required: Please fill in %s\n").unwrap();
        assert_eq!(
            load_messages(&messages).unwrap().get("required"),
            Some("Please fill in %s")
        );

        let rules = dir.path().join("rules.yaml");
        fs::write(&rules, "name:\n  required: true\n").unwrap();
        assert_eq!(load_rules(&rules).unwrap().len(), 1);

        let bad = dir.path().join("bad.yaml");
        fs::write(&bad, "name:\n  type: sometimes\n").unwrap();
        assert!(matches!(load_rules(&bad), Err(Error::Core(_))));
    }
}
