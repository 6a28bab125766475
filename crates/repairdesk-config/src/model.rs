// SPDX-FileCopyrightText: 2026 Repairdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for repairdesk.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use repairdesk_core::StorageBackend;
use repairdesk_core::types::{DEFAULT_PRIORITY, DEFAULT_STATUS, DEFAULT_TICKET_TYPE};
use serde::{Deserialize, Serialize};

/// Top-level repairdesk configuration.
///
/// Built once at startup and passed down to the storage backend and role
/// desks. All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RepairdeskConfig {
    /// Process-wide settings.
    #[serde(default)]
    pub app: AppConfig,

    /// Persistence mode and file locations.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Ticket defaults and status vocabulary.
    #[serde(default)]
    pub workflow: WorkflowConfig,
}

/// Process-wide settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Storage backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Which backend to run against. The two never share data.
    #[serde(default)]
    pub backend: StorageBackend,

    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL (Write-Ahead Logging) mode for SQLite.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,

    /// Path to the JSON ticket document.
    #[serde(default = "default_json_path")]
    pub json_path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
            json_path: default_json_path(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("repairdesk").join("repairdesk.db"))
        .and_then(|p| p.to_str().map(String::from))
        .unwrap_or_else(|| "repairdesk.db".to_string())
}

fn default_wal_mode() -> bool {
    true
}

fn default_json_path() -> String {
    "tickets_data.json".to_string()
}

/// Ticket defaults and the status/priority vocabulary offered to users.
///
/// Statuses and priorities stay free-form strings at the storage layer; these
/// lists only drive defaults, the notify rule, and the client edit lock.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct WorkflowConfig {
    /// Status given to newly created tickets.
    #[serde(default = "default_status")]
    pub default_status: String,

    /// Priority given to newly created tickets.
    #[serde(default = "default_priority")]
    pub default_priority: String,

    /// Ticket type given to newly created tickets.
    #[serde(default = "default_ticket_type")]
    pub default_ticket_type: String,

    /// Device model recorded when the client leaves it blank.
    #[serde(default = "default_placeholder_model")]
    pub placeholder_model: String,

    /// Statuses offered to operators and technicians.
    #[serde(default = "default_statuses")]
    pub statuses: Vec<String>,

    /// Priorities offered to operators.
    #[serde(default = "default_priorities")]
    pub priorities: Vec<String>,

    /// Statuses that mark the client for notification (case-insensitive).
    #[serde(default = "default_completion_statuses")]
    pub completion_statuses: Vec<String>,

    /// Statuses in which the client may no longer edit the ticket.
    #[serde(default = "default_locked_statuses")]
    pub locked_statuses: Vec<String>,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            default_status: default_status(),
            default_priority: default_priority(),
            default_ticket_type: default_ticket_type(),
            placeholder_model: default_placeholder_model(),
            statuses: default_statuses(),
            priorities: default_priorities(),
            completion_statuses: default_completion_statuses(),
            locked_statuses: default_locked_statuses(),
        }
    }
}

impl WorkflowConfig {
    /// True if moving to `status` should flag the client for notification.
    pub fn is_completion(&self, status: &str) -> bool {
        let status = status.to_lowercase();
        self.completion_statuses
            .iter()
            .any(|s| s.to_lowercase() == status)
    }

    /// True if a ticket in `status` is closed to client edits.
    pub fn is_locked(&self, status: &str) -> bool {
        self.locked_statuses.iter().any(|s| s == status)
    }
}

fn default_status() -> String {
    DEFAULT_STATUS.to_string()
}

fn default_priority() -> String {
    DEFAULT_PRIORITY.to_string()
}

fn default_ticket_type() -> String {
    DEFAULT_TICKET_TYPE.to_string()
}

fn default_placeholder_model() -> String {
    "model not specified".to_string()
}

fn default_statuses() -> Vec<String> {
    ["new", "in progress", "awaiting parts", "done"]
        .map(String::from)
        .to_vec()
}

fn default_priorities() -> Vec<String> {
    ["low", "medium", "high"].map(String::from).to_vec()
}

fn default_completion_statuses() -> Vec<String> {
    ["done", "completed", "ready for pickup"]
        .map(String::from)
        .to_vec()
}

fn default_locked_statuses() -> Vec<String> {
    vec!["ready for pickup".to_string()]
}
