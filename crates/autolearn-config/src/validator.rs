//! Configuration validation.

use crate::error::ConfigError;
use crate::schema::Config;

/// Validation result.
#[derive(Debug, Default)]
pub struct ValidationResult {
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    pub fn add_warning(&mut self, warning: ValidationWarning) {
        self.warnings.push(warning);
    }

    /// Convert the first error into a [`ConfigError`].
    pub fn into_result(self) -> Result<Vec<ValidationWarning>, ConfigError> {
        match self.errors.into_iter().next() {
            Some(first) => Err(ConfigError::InvalidValue {
                field: first.path,
                message: first.message,
            }),
            None => Ok(self.warnings),
        }
    }
}

/// A validation error.
#[derive(Debug)]
pub struct ValidationError {
    pub path: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// A validation warning.
#[derive(Debug)]
pub struct ValidationWarning {
    pub path: String,
    pub message: String,
}

impl ValidationWarning {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Configuration validator.
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate the configuration.
    pub fn validate(config: &Config) -> Result<ValidationResult, ConfigError> {
        let mut result = ValidationResult::default();

        Self::validate_monitor(config, &mut result);
        Self::validate_orchestrator(config, &mut result);
        Self::validate_storage(config, &mut result);
        Self::validate_markers(config, &mut result);

        Ok(result)
    }

    fn validate_monitor(config: &Config, result: &mut ValidationResult) {
        let monitor = &config.monitor;

        if monitor.check_interval_ms == 0 {
            result.add_error(ValidationError::new(
                "monitor.check_interval_ms",
                "check_interval_ms must be greater than 0",
            ));
        }

        if monitor.max_wait_minutes == 0 {
            result.add_error(ValidationError::new(
                "monitor.max_wait_minutes",
                "max_wait_minutes must be greater than 0",
            ));
        } else if monitor.max_wait() < monitor.check_interval() {
            result.add_warning(ValidationWarning::new(
                "monitor.max_wait_minutes",
                "watchdog is shorter than one check interval, every course will time out",
            ));
        }

        let threshold = monitor.completion_threshold;
        if !(threshold > 0.0 && threshold <= 100.0) {
            result.add_error(ValidationError::new(
                "monitor.completion_threshold",
                format!("completion_threshold must be within (0, 100], got {}", threshold),
            ));
        }
    }

    fn validate_orchestrator(config: &Config, result: &mut ValidationResult) {
        let orchestrator = &config.orchestrator;

        if orchestrator.mark_interval_ms == 0 {
            result.add_error(ValidationError::new(
                "orchestrator.mark_interval_ms",
                "mark_interval_ms must be greater than 0",
            ));
        }

        if orchestrator.signal_interval_ms == 0 {
            result.add_error(ValidationError::new(
                "orchestrator.signal_interval_ms",
                "signal_interval_ms must be greater than 0",
            ));
        }

        if orchestrator.next_delay_ms < orchestrator.signal_interval_ms {
            result.add_warning(ValidationWarning::new(
                "orchestrator.next_delay_ms",
                "next_delay_ms is shorter than the signal poll interval, the closing tab may not have settled",
            ));
        }
    }

    fn validate_storage(config: &Config, result: &mut ValidationResult) {
        if config.storage.prefix.is_empty() {
            result.add_error(ValidationError::new(
                "storage.prefix",
                "Storage prefix cannot be empty",
            ));
        }

        if config.storage.path.is_empty() {
            result.add_error(ValidationError::new(
                "storage.path",
                "Storage path cannot be empty",
            ));
        }
    }

    fn validate_markers(config: &Config, result: &mut ValidationResult) {
        let markers = &config.markers;
        let required = [
            ("markers.completed", &markers.completed),
            ("markers.score", &markers.score),
            ("markers.redo", &markers.redo),
        ];

        for (path, value) in required {
            if value.trim().is_empty() {
                result.add_error(ValidationError::new(path, "Marker text cannot be empty"));
            }
        }

        if markers.exam_entry.is_empty() && markers.exam_record.is_empty() {
            result.add_warning(ValidationWarning::new(
                "markers",
                "No exam markers set, exam items may be opened automatically",
            ));
        }
    }
}

#[cfg(test)]
#[path = "validator_tests.rs"]
mod tests;
