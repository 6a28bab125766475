// SPDX-FileCopyrightText: 2026 Repairdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the repairdesk configuration system.

use repairdesk_config::diagnostic::ConfigError;
use repairdesk_config::model::RepairdeskConfig;
use repairdesk_config::{
    load_and_validate_path, load_and_validate_str, load_config_from_path, load_config_from_str,
};
use repairdesk_core::StorageBackend;
use serial_test::serial;

/// Valid TOML with all known fields deserializes successfully.
#[test]
fn valid_toml_deserializes_into_config() {
    let toml = r#"
[app]
log_level = "debug"

[storage]
backend = "json"
database_path = "/tmp/desk.db"
wal_mode = false
json_path = "/tmp/tickets.json"

[workflow]
default_status = "registered"
default_priority = "low"
default_ticket_type = "warranty"
placeholder_model = "unknown"
statuses = ["registered", "closed"]
priorities = ["low", "high"]
completion_statuses = ["closed"]
locked_statuses = ["closed"]
"#;

    let config = load_config_from_str(toml).expect("valid TOML should deserialize");
    assert_eq!(config.app.log_level, "debug");
    assert_eq!(config.storage.backend, StorageBackend::Json);
    assert_eq!(config.storage.database_path, "/tmp/desk.db");
    assert!(!config.storage.wal_mode);
    assert_eq!(config.storage.json_path, "/tmp/tickets.json");
    assert_eq!(config.workflow.default_status, "registered");
    assert_eq!(config.workflow.default_priority, "low");
    assert_eq!(config.workflow.default_ticket_type, "warranty");
    assert_eq!(config.workflow.placeholder_model, "unknown");
    assert_eq!(config.workflow.statuses, vec!["registered", "closed"]);
    assert_eq!(config.workflow.completion_statuses, vec!["closed"]);
}

/// Missing optional sections use defaults without error.
#[test]
fn missing_optional_sections_use_defaults() {
    let config = load_config_from_str("").expect("empty TOML should use defaults");

    assert_eq!(config.app.log_level, "info");
    assert_eq!(config.storage.backend, StorageBackend::Sqlite);
    assert!(config.storage.database_path.ends_with("repairdesk.db"));
    assert!(config.storage.wal_mode);
    assert_eq!(config.storage.json_path, "tickets_data.json");
    assert_eq!(config.workflow.default_status, "new");
    assert_eq!(config.workflow.default_priority, "medium");
    assert_eq!(config.workflow.default_ticket_type, "standard");
    assert_eq!(config.workflow.placeholder_model, "model not specified");
    assert_eq!(config.workflow.priorities, vec!["low", "medium", "high"]);
    assert_eq!(config.workflow.locked_statuses, vec!["ready for pickup"]);
}

/// Unknown field in [storage] produces an UnknownKey diagnostic with a suggestion.
#[test]
fn unknown_storage_key_suggests_correction() {
    let toml = r#"
[storage]
backnd = "json"
"#;

    let errors = load_and_validate_str(toml).expect_err("should reject unknown field");
    let found = errors.iter().any(|e| {
        matches!(e, ConfigError::UnknownKey { key, suggestion, valid_keys, .. } if {
            key == "backnd"
                && suggestion.as_deref() == Some("backend")
                && valid_keys.contains("json_path")
        })
    });
    assert!(found, "expected UnknownKey for backnd, got: {errors:?}");
}

/// A misspelled backend name is reported as an unknown value.
#[test]
fn unknown_backend_value_is_reported() {
    let toml = r#"
[storage]
backend = "jsn"
"#;

    let errors = load_and_validate_str(toml).expect_err("should reject unknown backend");
    let found = errors.iter().any(|e| {
        matches!(e, ConfigError::UnknownValue { value, suggestion, .. } if {
            value == "jsn" && suggestion.as_deref() == Some("json")
        })
    });
    assert!(found, "expected UnknownValue for jsn, got: {errors:?}");
}

/// Unexpected top-level section is rejected by deny_unknown_fields.
#[test]
fn deny_unknown_fields_at_top_level() {
    let toml = r#"
[database]
host = "localhost"
"#;

    let err = load_config_from_str(toml).expect_err("unknown top-level section should be rejected");
    let err_str = format!("{err}");
    assert!(
        err_str.contains("unknown field") || err_str.contains("database"),
        "error should mention unknown field, got: {err_str}"
    );
}

/// Invalid type (string where bool expected) produces a clear message.
#[test]
fn invalid_type_is_reported() {
    let toml = r#"
[storage]
wal_mode = "sometimes"
"#;

    let errors = load_and_validate_str(toml).expect_err("should reject invalid type");
    assert!(
        errors
            .iter()
            .any(|e| matches!(e, ConfigError::InvalidType { key, .. } if key.contains("wal_mode"))),
        "got: {errors:?}"
    );
}

/// Dotted overrides (what the env provider produces) win over TOML.
#[test]
fn dotted_override_beats_toml() {
    use figment::{
        Figment,
        providers::{Format, Serialized, Toml},
    };

    let toml_content = r#"
[storage]
backend = "sqlite"
json_path = "from-toml.json"
"#;

    // Simulates REPAIRDESK_STORAGE_JSON_PATH / REPAIRDESK_STORAGE_BACKEND.
    let config: RepairdeskConfig = Figment::new()
        .merge(Serialized::defaults(RepairdeskConfig::default()))
        .merge(Toml::string(toml_content))
        .merge(("storage.json_path", "from-env.json"))
        .merge(("storage.backend", "json"))
        .extract()
        .expect("should merge override");

    assert_eq!(config.storage.json_path, "from-env.json");
    assert_eq!(config.storage.backend, StorageBackend::Json);
}

/// Explicit config file is read from disk.
#[test]
#[serial]
fn load_from_explicit_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("repairdesk.toml");
    std::fs::write(
        &path,
        "[storage]\nbackend = \"json\"\njson_path = \"desk.json\"\n",
    )
    .unwrap();

    let config = load_config_from_path(&path).expect("file should load");
    assert_eq!(config.storage.backend, StorageBackend::Json);
    assert_eq!(config.storage.json_path, "desk.json");

    let validated = load_and_validate_path(&path).expect("file should validate");
    assert_eq!(validated.storage.json_path, "desk.json");
}

/// `REPAIRDESK_*` variables beat the file, including keys with underscores.
#[test]
#[serial]
fn env_var_overrides_file_value() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("repairdesk.toml");
    std::fs::write(&path, "[storage]\njson_path = \"from-file.json\"\n").unwrap();

    // SAFETY: every test that reads the environment is #[serial].
    unsafe { std::env::set_var("REPAIRDESK_STORAGE_JSON_PATH", "from-env.json") };
    let result = load_and_validate_path(&path);
    unsafe { std::env::remove_var("REPAIRDESK_STORAGE_JSON_PATH") };

    assert_eq!(result.unwrap().storage.json_path, "from-env.json");
}

/// A config path that does not exist is an error rather than silent defaults.
#[test]
fn load_from_missing_explicit_path_fails() {
    let dir = tempfile::tempdir().unwrap();
    let errors = load_and_validate_path(&dir.path().join("absent.toml")).unwrap_err();
    assert!(matches!(&errors[0], ConfigError::Other(msg) if msg.contains("does not exist")));
}

/// ConfigError implements miette::Diagnostic with codes and help.
#[test]
fn config_error_implements_diagnostic() {
    use miette::Diagnostic;

    let error = ConfigError::UnknownKey {
        key: "jsonpath".to_string(),
        suggestion: Some("json_path".to_string()),
        valid_keys: "backend, database_path, wal_mode, json_path".to_string(),
        span: None,
        src: None,
    };

    assert!(error.code().is_some(), "should have diagnostic code");
    let help = error.help().expect("should have help text").to_string();
    assert!(help.contains("did you mean `json_path`"), "got: {help}");
}

/// ConfigError can be rendered using miette's graphical handler.
#[test]
fn config_error_renders_with_miette() {
    use miette::GraphicalReportHandler;

    let error = ConfigError::Validation {
        message: "storage.json_path must not be empty".to_string(),
    };

    let handler = GraphicalReportHandler::new();
    let mut buf = String::new();
    handler
        .render_report(&mut buf, &error)
        .expect("should render without error");
    assert!(buf.contains("json_path"));
}

/// Validation runs after a successful parse.
#[test]
fn validation_catches_unlisted_default_priority() {
    let toml = r#"
[workflow]
priorities = ["low", "high"]
"#;

    let errors = load_and_validate_str(toml).expect_err("medium is not listed");
    assert!(errors.iter().any(
        |e| matches!(e, ConfigError::Validation { message } if message.contains("default_priority"))
    ));
}
