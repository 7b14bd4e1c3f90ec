//! Configuration types for Lineage

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Where notifications end up
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotifierKind {
    /// Written to the tracing log
    #[default]
    Log,
    /// Collected and printed after each command
    Inbox,
}

/// Top-level configuration (lineage.yaml / lineage.json)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LineageConfig {
    /// JSON snapshot the store is loaded from and saved to
    pub snapshot_path: PathBuf,

    /// `EnvFilter` directive used when `RUST_LOG` is unset
    pub log_filter: String,

    pub notifier: NotifierKind,
}

impl Default for LineageConfig {
    fn default() -> Self {
        Self {
            snapshot_path: PathBuf::from("lineage-state.json"),
            log_filter: "info".to_string(),
            notifier: NotifierKind::Log,
        }
    }
}

impl LineageConfig {
    /// Load configuration from a YAML (`.yaml`/`.yml`) or JSON file
    pub fn from_file(path: &Path) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let is_yaml = matches!(
            path.extension().and_then(|e| e.to_str()),
            Some("yaml") | Some("yml")
        );

        let config: Self = if is_yaml {
            serde_yaml::from_str(&content)?
        } else {
            serde_json::from_str(&content)?
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> crate::Result<()> {
        if self.snapshot_path.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("snapshotPath must not be empty".to_string()));
        }
        if self.log_filter.trim().is_empty() {
            return Err(ConfigError::Invalid("logFilter must not be empty".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = LineageConfig::default();
        assert_eq!(config.snapshot_path, PathBuf::from("lineage-state.json"));
        assert_eq!(config.log_filter, "info");
        assert_eq!(config.notifier, NotifierKind::Log);
    }

    #[test]
    fn test_config_parse_json_with_missing_fields() {
        let json = r#"{ "notifier": "inbox" }"#;

        let config: LineageConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.notifier, NotifierKind::Inbox);
        assert_eq!(config.log_filter, "info");
    }

    #[test]
    fn test_from_yaml_file() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(file, "snapshotPath: /tmp/world.json").unwrap();
        writeln!(file, "logFilter: lineage=debug").unwrap();

        let config = LineageConfig::from_file(file.path()).unwrap();
        assert_eq!(config.snapshot_path, PathBuf::from("/tmp/world.json"));
        assert_eq!(config.log_filter, "lineage=debug");
        assert_eq!(config.notifier, NotifierKind::Log);
    }

    #[test]
    fn test_from_json_file() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, r#"{{ "snapshotPath": "state.json", "notifier": "inbox" }}"#).unwrap();

        let config = LineageConfig::from_file(file.path()).unwrap();
        assert_eq!(config.snapshot_path, PathBuf::from("state.json"));
        assert_eq!(config.notifier, NotifierKind::Inbox);
    }

    #[test]
    fn test_rejects_empty_log_filter() {
        let mut file = tempfile::Builder::new().suffix(".yml").tempfile().unwrap();
        writeln!(file, "logFilter: \"  \"").unwrap();

        let err = LineageConfig::from_file(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = LineageConfig::from_file(Path::new("/nonexistent/lineage.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
