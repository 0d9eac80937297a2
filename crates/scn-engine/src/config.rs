//! Engine configuration
//!
//! Loaded from TOML; every key is optional.
//!
//! ```toml
//! scenarios_dir = "scenarios"
//! manifest_file = "manifest.json"
//! definition_cache_capacity = 0
//! dialog_keys = ["npc_reply"]
//! ```

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Engine configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Base directory of scenario files
    pub scenarios_dir: PathBuf,
    /// Manifest path, relative to `scenarios_dir`
    pub manifest_file: PathBuf,
    /// Parsed-definition cache size (0 = reload on every enqueue)
    pub definition_cache_capacity: u64,
    /// Extra kwargs keys carrying hex dialog identifiers
    pub dialog_keys: Vec<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            scenarios_dir: PathBuf::from("scenarios"),
            manifest_file: PathBuf::from("manifest.json"),
            definition_cache_capacity: 0,
            dialog_keys: Vec::new(),
        }
    }
}

impl EngineConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse configuration from TOML text
    ///
    /// # Errors
    /// Returns [`ConfigError::Parse`] for malformed TOML or unknown keys and
    /// [`ConfigError::Invalid`] for out-of-range values.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file
    ///
    /// # Errors
    /// Returns [`ConfigError::Io`] if the file cannot be read, otherwise as
    /// [`EngineConfig::from_toml_str`].
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&content)?;
        tracing::debug!(path = %path.display(), "Loaded engine config");
        Ok(config)
    }

    /// With scenarios directory
    #[inline]
    #[must_use]
    pub fn with_scenarios_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.scenarios_dir = dir.into();
        self
    }

    /// With manifest file
    #[inline]
    #[must_use]
    pub fn with_manifest_file(mut self, file: impl Into<PathBuf>) -> Self {
        self.manifest_file = file.into();
        self
    }

    /// With definition cache capacity
    #[inline]
    #[must_use]
    pub fn with_cache_capacity(mut self, capacity: u64) -> Self {
        self.definition_cache_capacity = capacity;
        self
    }

    /// With extra dialog-identifier keys
    #[must_use]
    pub fn with_dialog_keys<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dialog_keys.extend(keys.into_iter().map(Into::into));
        self
    }

    /// Full manifest path
    #[must_use]
    pub fn manifest_path(&self) -> PathBuf {
        self.scenarios_dir.join(&self.manifest_file)
    }

    /// Check value ranges
    ///
    /// # Errors
    /// Returns [`ConfigError::Invalid`] naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.manifest_file.as_os_str().is_empty() {
            return Err(ConfigError::Invalid {
                field: "manifest_file",
                reason: "must not be empty".to_string(),
            });
        }
        if let Some(key) = self.dialog_keys.iter().find(|k| k.trim().is_empty()) {
            return Err(ConfigError::Invalid {
                field: "dialog_keys",
                reason: format!("blank key {key:?}"),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_toml_gives_defaults() {
        let config = EngineConfig::from_toml_str("").unwrap();
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.manifest_path(), Path::new("scenarios/manifest.json"));
    }

    #[test]
    fn parses_all_keys() {
        let config = EngineConfig::from_toml_str(
            r#"
            scenarios_dir = "/opt/bot/scenarios"
            manifest_file = "index.json"
            definition_cache_capacity = 64
            dialog_keys = ["npc_reply", "Choice"]
            "#,
        )
        .unwrap();

        assert_eq!(
            config,
            EngineConfig::new()
                .with_scenarios_dir("/opt/bot/scenarios")
                .with_manifest_file("index.json")
                .with_cache_capacity(64)
                .with_dialog_keys(["npc_reply", "Choice"])
        );
    }

    #[test]
    fn unknown_key_is_rejected() {
        let err = EngineConfig::from_toml_str("scenario_dir = \"x\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn invalid_values_are_rejected() {
        let err = EngineConfig::from_toml_str("manifest_file = \"\"").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "manifest_file", .. }));

        let err = EngineConfig::from_toml_str("dialog_keys = [\" \"]").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "dialog_keys", .. }));
    }

    #[test]
    fn from_file_reads_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("engine.toml");
        std::fs::write(&path, "definition_cache_capacity = 8\n").unwrap();

        let config = EngineConfig::from_file(&path).unwrap();
        assert_eq!(config.definition_cache_capacity, 8);

        let err = EngineConfig::from_file(dir.path().join("missing.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
