// SPDX-FileCopyrightText: 2026 Repairdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.

use std::collections::HashSet;

use repairdesk_core::StorageBackend;

use crate::diagnostic::ConfigError;
use crate::model::RepairdeskConfig;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration for semantic correctness.
///
/// Collects every failure instead of stopping at the first one.
pub fn validate_config(config: &RepairdeskConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if !LOG_LEVELS.contains(&config.app.log_level.to_lowercase().as_str()) {
        errors.push(ConfigError::Validation {
            message: format!(
                "app.log_level `{}` is not one of {}",
                config.app.log_level,
                LOG_LEVELS.join(", ")
            ),
        });
    }

    // Only the selected backend's path has to be usable.
    match config.storage.backend {
        StorageBackend::Sqlite if config.storage.database_path.trim().is_empty() => {
            errors.push(ConfigError::Validation {
                message: "storage.database_path must not be empty".to_string(),
            });
        }
        StorageBackend::Json if config.storage.json_path.trim().is_empty() => {
            errors.push(ConfigError::Validation {
                message: "storage.json_path must not be empty".to_string(),
            });
        }
        _ => {}
    }

    let workflow = &config.workflow;

    if workflow.default_status.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "workflow.default_status must not be empty".to_string(),
        });
    }

    if workflow.priorities.is_empty() {
        errors.push(ConfigError::Validation {
            message: "workflow.priorities must list at least one priority".to_string(),
        });
    } else if !workflow.priorities.contains(&workflow.default_priority) {
        errors.push(ConfigError::Validation {
            message: format!(
                "workflow.default_priority `{}` is not listed in workflow.priorities",
                workflow.default_priority
            ),
        });
    }

    let mut seen = HashSet::new();
    for status in &workflow.statuses {
        if !seen.insert(status) {
            errors.push(ConfigError::Validation {
                message: format!("duplicate status `{status}` in workflow.statuses"),
            });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn has_message(errors: &[ConfigError], needle: &str) -> bool {
        errors
            .iter()
            .any(|e| matches!(e, ConfigError::Validation { message } if message.contains(needle)))
    }

    #[test]
    fn default_config_validates() {
        let config = RepairdeskConfig::default();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn empty_database_path_fails_for_sqlite() {
        let mut config = RepairdeskConfig::default();
        config.storage.database_path = "".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(has_message(&errors, "database_path"));
    }

    #[test]
    fn empty_database_path_is_fine_for_json_backend() {
        let mut config = RepairdeskConfig::default();
        config.storage.backend = StorageBackend::Json;
        config.storage.database_path = "".to_string();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn empty_json_path_fails_for_json_backend() {
        let mut config = RepairdeskConfig::default();
        config.storage.backend = StorageBackend::Json;
        config.storage.json_path = " ".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(has_message(&errors, "json_path"));
    }

    #[test]
    fn unlisted_default_priority_fails() {
        let mut config = RepairdeskConfig::default();
        config.workflow.default_priority = "urgent".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(has_message(&errors, "default_priority"));
    }

    #[test]
    fn bad_log_level_and_duplicate_status_are_both_reported() {
        let mut config = RepairdeskConfig::default();
        config.app.log_level = "loud".to_string();
        config.workflow.statuses = vec!["new".into(), "new".into()];
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 2);
        assert!(has_message(&errors, "log_level"));
        assert!(has_message(&errors, "duplicate status"));
    }
}
