//! Configuration file
//!
//! ```json
//! { "schema_dir": "./schemas", "pipelines_file": "./pipelines.json", "max_limit": 500 }
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::observability::Event;

use super::errors::{CliError, CliResult};

/// Configuration file structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Directory of entity schema files (required)
    pub schema_dir: String,

    /// Named pipeline catalog (optional)
    #[serde(default)]
    pub pipelines_file: Option<String>,

    /// Largest accepted request limit (optional, unbounded when absent)
    #[serde(default)]
    pub max_limit: Option<i64>,
}

impl Config {
    /// Load configuration from file
    pub fn load(path: &Path) -> CliResult<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| CliError::config_error(format!("Failed to read config: {}", e)))?;

        let config: Config = serde_json::from_str(&content)
            .map_err(|e| CliError::config_error(format!("Invalid config JSON: {}", e)))?;

        config.validate()?;

        tracing::info!(
            event = %Event::ConfigLoaded,
            path = %path.display(),
            schema_dir = %config.schema_dir,
            catalog = config.pipelines_file.is_some(),
        );
        Ok(config)
    }

    fn validate(&self) -> CliResult<()> {
        if self.schema_dir.trim().is_empty() {
            return Err(CliError::config_error("schema_dir must not be empty"));
        }

        if let Some(max) = self.max_limit {
            if max <= 0 {
                return Err(CliError::config_error("max_limit must be > 0"));
            }
        }

        if let Some(file) = &self.pipelines_file {
            if file.trim().is_empty() {
                return Err(CliError::config_error("pipelines_file must not be empty"));
            }
        }

        Ok(())
    }

    /// Schema directory as Path
    pub fn schema_path(&self) -> &Path {
        Path::new(&self.schema_dir)
    }

    /// Catalog file as Path, if configured
    pub fn pipelines_path(&self) -> Option<&Path> {
        self.pipelines_file.as_deref().map(Path::new)
    }

    /// Checks a requested limit against `max_limit`
    pub fn check_limit(&self, limit: Option<i64>) -> CliResult<()> {
        match (limit, self.max_limit) {
            (Some(limit), Some(max)) if limit > max => Err(CliError::limit_exceeded(limit, max)),
            _ => Ok(()),
        }
    }
}
