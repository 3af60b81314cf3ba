//! Configuration loader.

use std::fs;
use std::path::Path;

use crate::error::ConfigError;
use crate::schema::Config;

/// Configuration loader with environment variable substitution.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Config, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.display().to_string()));
        }
        let content = fs::read_to_string(path)?;
        Self::load_str(&content)
    }

    /// Load configuration from a file, falling back to defaults when it is absent.
    pub fn load_or_default(path: &Path) -> Result<Config, ConfigError> {
        match Self::load(path) {
            Err(ConfigError::NotFound(_)) => Ok(Config::default()),
            other => other,
        }
    }

    /// Load configuration from a string.
    pub fn load_str(content: &str) -> Result<Config, ConfigError> {
        let expanded = Self::expand_env_vars(content)?;
        let config: Config = toml::from_str(&expanded)?;
        Ok(config)
    }

    /// Expand environment variables in the format `${VAR}`.
    fn expand_env_vars(content: &str) -> Result<String, ConfigError> {
        let mut result = content.to_string();
        let re = regex::Regex::new(r"\$\{([^}]+)\}")
            .map_err(|e| ConfigError::InvalidFormat(e.to_string()))?;

        for cap in re.captures_iter(content) {
            let var_name = &cap[1];
            let var_value = std::env::var(var_name)
                .map_err(|_| ConfigError::EnvVarNotSet(var_name.to_string()))?;
            result = result.replace(&cap[0], &var_value);
        }

        Ok(result)
    }

    /// Expand shell-style paths (e.g., `~/.autolearn`).
    pub fn expand_path(path: &str) -> String {
        shellexpand::tilde(path).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_empty_config() {
        let config = ConfigLoader::load_str("").unwrap();
        assert_eq!(config.monitor.check_interval_ms, 2000);
        assert_eq!(config.storage.prefix, "ct_");
    }

    #[test]
    fn test_load_partial_config() {
        let content = r#"
            [monitor]
            check_interval_ms = 500
            max_wait_minutes = 30

            [orchestrator]
            next_delay_ms = 6000
        "#;
        let config = ConfigLoader::load_str(content).unwrap();
        assert_eq!(config.monitor.check_interval_ms, 500);
        assert_eq!(config.monitor.max_wait_minutes, 30);
        assert_eq!(config.monitor.completion_threshold, 95.0);
        assert_eq!(config.orchestrator.next_delay_ms, 6000);
        assert_eq!(config.orchestrator.signal_interval_ms, 1000);
    }

    #[test]
    fn test_load_markers() {
        let content = r#"
            [markers]
            completed = "Completed"
            score = "Score"
        "#;
        let config = ConfigLoader::load_str(content).unwrap();
        assert_eq!(config.markers.completed, "Completed");
        assert_eq!(config.markers.score, "Score");
        assert_eq!(config.markers.redo, "重新学习");
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[storage]").unwrap();
        writeln!(file, "prefix = \"test_\"").unwrap();

        let config = ConfigLoader::load(file.path()).unwrap();
        assert_eq!(config.storage.prefix, "test_");
    }

    #[test]
    fn test_load_nonexistent_file() {
        let result = ConfigLoader::load(Path::new("/nonexistent/path/config.toml"));
        assert!(matches!(result, Err(ConfigError::NotFound(_))));
    }

    #[test]
    fn test_load_or_default_nonexistent_file() {
        let config = ConfigLoader::load_or_default(Path::new("/nonexistent/path/config.toml")).unwrap();
        assert_eq!(config.orchestrator.next_delay_ms, 3000);
    }

    #[test]
    fn test_load_invalid_toml() {
        let content = "invalid = [unclosed";
        let result = ConfigLoader::load_str(content);
        assert!(matches!(result, Err(ConfigError::TomlParse(_))));
    }

    #[test]
    fn test_expand_env_vars() {
        // SAFETY: This test runs in isolation and sets a unique test-only env var
        unsafe {
            std::env::set_var("AUTOLEARN_TEST_PREFIX", "env_");
        }
        let content = "[storage]\nprefix = \"${AUTOLEARN_TEST_PREFIX}\"";
        let config = ConfigLoader::load_str(content).unwrap();
        assert_eq!(config.storage.prefix, "env_");
        unsafe {
            std::env::remove_var("AUTOLEARN_TEST_PREFIX");
        }
    }

    #[test]
    fn test_expand_env_vars_not_set() {
        let content = "value = \"${NONEXISTENT_AUTOLEARN_VAR_12345}\"";
        let result = ConfigLoader::expand_env_vars(content);
        assert!(matches!(result, Err(ConfigError::EnvVarNotSet(_))));
    }

    #[test]
    fn test_expand_path_with_tilde() {
        let expanded = ConfigLoader::expand_path("~/test");
        assert!(!expanded.starts_with('~'));
        assert!(expanded.ends_with("/test"));
    }

    #[test]
    fn test_expand_path_no_tilde() {
        let path = "/var/lib/autolearn";
        assert_eq!(ConfigLoader::expand_path(path), path);
    }
}
