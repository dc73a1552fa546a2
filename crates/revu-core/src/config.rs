//! Review agent configuration

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{CoreError, Result};

/// Model used when none is configured
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Maximum model/tool round-trips per session
pub const DEFAULT_STEP_BUDGET: usize = 10;

/// Main configuration for a review session
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReviewConfig {
    /// Generative model identifier
    pub model: String,

    /// Maximum number of tool-execution rounds in one session
    pub step_budget: usize,

    /// Sampling temperature
    pub temperature: f64,

    /// Maximum tokens generated per model turn
    pub max_output_tokens: u32,

    /// Paths excluded from diff enumeration (build outputs, lockfiles)
    pub exclude: Vec<String>,

    /// Default directory for markdown reports (working directory if unset)
    pub report_dir: Option<String>,
}

impl Default for ReviewConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            step_budget: DEFAULT_STEP_BUDGET,
            temperature: 0.3,
            max_output_tokens: 8192,
            exclude: default_excludes(),
            report_dir: None,
        }
    }
}

fn default_excludes() -> Vec<String> {
    [
        "target",
        "dist",
        "build",
        "node_modules",
        "Cargo.lock",
        "package-lock.json",
        "yarn.lock",
        "bun.lock",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

impl ReviewConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the model
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the step budget
    pub fn with_step_budget(mut self, step_budget: usize) -> Self {
        self.step_budget = step_budget;
        self
    }

    /// Set the sampling temperature
    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }

    /// Set the diff exclude list
    pub fn with_exclude(mut self, exclude: Vec<String>) -> Self {
        self.exclude = exclude;
        self
    }

    /// Set the default report directory
    pub fn with_report_dir(mut self, report_dir: impl Into<String>) -> Self {
        self.report_dir = Some(report_dir.into());
        self
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self =
            toml::from_str(&content).map_err(|e| CoreError::InvalidConfig(e.to_string()))?;
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let content =
            toml::to_string_pretty(self).map_err(|e| CoreError::InvalidConfig(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ReviewConfig::default();
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.step_budget, DEFAULT_STEP_BUDGET);
        assert!(config.exclude.iter().any(|e| e == "target"));
        assert!(config.report_dir.is_none());
    }

    #[test]
    fn test_config_builder() {
        let config = ReviewConfig::new()
            .with_model("gemini-2.5-pro")
            .with_step_budget(5)
            .with_temperature(0.7)
            .with_report_dir("reports");

        assert_eq!(config.model, "gemini-2.5-pro");
        assert_eq!(config.step_budget, 5);
        assert_eq!(config.temperature, 0.7);
        assert_eq!(config.report_dir.as_deref(), Some("reports"));
    }

    #[test]
    fn test_config_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("revu.toml");

        let config = ReviewConfig::new().with_step_budget(3);
        config.to_file(&path).unwrap();

        let loaded = ReviewConfig::from_file(&path).unwrap();
        assert_eq!(loaded.step_budget, 3);
        assert_eq!(loaded.model, config.model);
    }

    #[test]
    fn test_partial_file_takes_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("revu.toml");
        std::fs::write(&path, "step_budget = 2\n").unwrap();

        let loaded = ReviewConfig::from_file(&path).unwrap();
        assert_eq!(loaded.step_budget, 2);
        assert_eq!(loaded.model, DEFAULT_MODEL);
    }

    #[test]
    fn test_invalid_file_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("revu.toml");
        std::fs::write(&path, "step_budget = \"many\"\n").unwrap();

        let err = ReviewConfig::from_file(&path).unwrap_err();
        assert!(matches!(err, CoreError::InvalidConfig(_)));
    }
}
