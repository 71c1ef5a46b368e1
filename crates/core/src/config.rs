use crate::{error::Result, model::ProcessScope};
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf, time::Duration};

/// Collector configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Refresh interval in milliseconds
    pub refresh_ms: u64,

    /// Include kernel-owned processes in the process table
    pub include_kernel_processes: bool,

    /// Substring filter tokens applied to process names; empty matches all
    pub process_filter: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            refresh_ms: 500,
            include_kernel_processes: false,
            process_filter: Vec::new(),
        }
    }
}

impl Config {
    /// Load configuration in order of preference:
    /// 1. CLI arguments override everything
    /// 2. JSON config file if specified
    /// 3. Default config file locations
    /// 4. Built-in defaults
    pub fn load(cli_config: Option<&CliConfig>, json_path: Option<&PathBuf>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(default_config) = Self::load_default_config()? {
            config = default_config;
        }

        if let Some(path) = json_path {
            config = Self::load_from_file(path)?;
        }

        if let Some(cli) = cli_config {
            config.apply_cli_overrides(cli);
        }

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific JSON file
    pub fn load_from_file(path: &PathBuf) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|e| {
            crate::error::CoreError::config(format!(
                "Failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;

        let config: Self = serde_json::from_str(&contents).map_err(|e| {
            crate::error::CoreError::config(format!(
                "Failed to parse config file {}: {}",
                path.display(),
                e
            ))
        })?;

        Ok(config)
    }

    /// Load configuration from default locations
    fn load_default_config() -> Result<Option<Self>> {
        for path in Self::default_config_paths() {
            if path.exists() {
                match Self::load_from_file(&path) {
                    Ok(config) => return Ok(Some(config)),
                    Err(e) => {
                        tracing::warn!("Failed to load config from {}: {}", path.display(), e);
                        continue;
                    }
                }
            }
        }

        Ok(None)
    }

    /// Default configuration file search paths
    fn default_config_paths() -> Vec<PathBuf> {
        let mut paths = Vec::new();

        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("fbsdstat").join("config.json"));
        }

        if let Some(home_dir) = dirs::home_dir() {
            paths.push(home_dir.join(".fbsdstat.json"));
        }

        paths.push(PathBuf::from("fbsdstat.json"));

        paths
    }

    /// Apply CLI argument overrides
    fn apply_cli_overrides(&mut self, cli: &CliConfig) {
        if let Some(refresh) = cli.refresh_ms {
            self.refresh_ms = refresh;
        }
        if cli.include_kernel_processes {
            self.include_kernel_processes = true;
        }
        if !cli.process_filter.is_empty() {
            self.process_filter = cli.process_filter.clone();
        }
    }

    /// Validate configuration values
    fn validate(&self) -> Result<()> {
        if self.refresh_ms < 50 {
            return Err(crate::error::CoreError::config(
                "Refresh interval must be at least 50ms".to_string(),
            ));
        }

        if self.refresh_ms > 10000 {
            return Err(crate::error::CoreError::config(
                "Refresh interval must be at most 10 seconds".to_string(),
            ));
        }

        Ok(())
    }

    /// Refresh interval as Duration
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_millis(self.refresh_ms)
    }

    /// Process-table scope implied by this configuration
    pub fn process_scope(&self) -> ProcessScope {
        if self.include_kernel_processes {
            ProcessScope::All
        } else {
            ProcessScope::User
        }
    }
}

/// CLI configuration (temporary struct for CLI parsing)
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub refresh_ms: Option<u64>,
    pub include_kernel_processes: bool,
    pub process_filter: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_cadence() {
        let config = Config::default();
        assert_eq!(config.refresh_ms, 500);
        assert!(!config.include_kernel_processes);
        assert!(config.process_filter.is_empty());
        assert_eq!(config.refresh_interval(), Duration::from_millis(500));
        assert_eq!(config.process_scope(), ProcessScope::User);
    }

    #[test]
    fn cli_overrides_take_precedence() {
        let mut config = Config::default();
        let cli = CliConfig {
            refresh_ms: Some(1000),
            include_kernel_processes: true,
            process_filter: vec!["ssh".to_string()],
        };
        config.apply_cli_overrides(&cli);

        assert_eq!(config.refresh_ms, 1000);
        assert_eq!(config.process_scope(), ProcessScope::All);
        assert_eq!(config.process_filter, vec!["ssh".to_string()]);
    }

    #[test]
    fn validate_rejects_out_of_range_refresh() {
        let mut config = Config {
            refresh_ms: 10,
            ..Config::default()
        };
        assert!(config.validate().is_err());

        config.refresh_ms = 60_000;
        assert!(config.validate().is_err());

        config.refresh_ms = 500;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_json_fills_in_defaults() {
        let config: Config = serde_json::from_str(r#"{"refresh_ms": 250}"#).unwrap();
        assert_eq!(config.refresh_ms, 250);
        assert!(!config.include_kernel_processes);
    }
}
