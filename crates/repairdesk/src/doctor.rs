// SPDX-FileCopyrightText: 2026 Repairdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `repairdesk doctor` command implementation.
//!
//! Runs diagnostic checks against the configuration and the selected
//! storage backend.

use std::io::IsTerminal;
use std::path::Path;
use std::time::{Duration, Instant};

use repairdesk_config::model::{RepairdeskConfig, StorageConfig};
use repairdesk_core::{HealthStatus, RepairdeskError, StorageBackend};
use repairdesk_storage::JsonDocument;

/// Status of a diagnostic check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckStatus {
    /// Check passed successfully.
    Pass,
    /// Check passed with a warning.
    Warn,
    /// Check failed.
    Fail,
}

/// Result of a single diagnostic check.
#[derive(Debug, Clone)]
pub struct CheckResult {
    /// Name of the check.
    pub name: String,
    /// Check status.
    pub status: CheckStatus,
    /// Human-readable message.
    pub message: String,
    /// Duration the check took.
    pub duration: Duration,
}

impl CheckResult {
    fn new(name: &str, status: CheckStatus, message: impl Into<String>, start: Instant) -> Self {
        Self {
            name: name.to_string(),
            status,
            message: message.into(),
            duration: start.elapsed(),
        }
    }
}

/// Run the `repairdesk doctor` command.
///
/// Quick checks cover the config and the backend's health. With `--deep`,
/// the whole store file is verified too. With `--plain`, disables colored output.
pub async fn run_doctor(
    config: &RepairdeskConfig,
    config_path: Option<&Path>,
    deep: bool,
    plain: bool,
) -> Result<(), RepairdeskError> {
    let use_color = !plain && std::io::stdout().is_terminal();
    let storage = &config.storage;
    let mut results = Vec::new();

    // Quick checks (always run)
    results.push(check_config(config_path).await);
    results.push(check_store_file(storage).await);
    results.push(check_backend(storage).await);

    // Deep checks (only with --deep)
    if deep {
        results.push(check_integrity(storage).await);
        results.push(check_file_size(storage).await);
    }

    println!();
    println!("  repairdesk doctor ({} backend)", storage.backend);
    println!("  {}", "-".repeat(50));

    let mut issues = 0;
    for result in &results {
        if result.status != CheckStatus::Pass {
            issues += 1;
        }
        println!("{}", format_line(result, use_color));
    }

    println!();
    if issues > 0 {
        let issue_word = if issues == 1 { "issue" } else { "issues" };
        println!("  {issues} {issue_word} found.");
        if !deep {
            println!("  Run with --deep for detailed diagnostics.");
        }
    } else {
        println!("  All checks passed.");
    }
    println!();

    Ok(())
}

fn format_line(result: &CheckResult, use_color: bool) -> String {
    let duration_ms = result.duration.as_millis();
    if use_color {
        use colored::Colorize;
        let (symbol, message) = match result.status {
            CheckStatus::Pass => ("✓".green(), result.message.normal()),
            CheckStatus::Warn => ("!".yellow(), result.message.yellow()),
            CheckStatus::Fail => ("✗".red(), result.message.red()),
        };
        format!("    {symbol} {:<20} {message} ({duration_ms}ms)", result.name)
    } else {
        let tag = match result.status {
            CheckStatus::Pass => "[OK]  ",
            CheckStatus::Warn => "[WARN]",
            CheckStatus::Fail => "[FAIL]",
        };
        format!(
            "    {tag} {:<20} {} ({duration_ms}ms)",
            result.name, result.message
        )
    }
}

/// Check configuration loads without errors.
async fn check_config(config_path: Option<&Path>) -> CheckResult {
    let start = Instant::now();
    let loaded = match config_path {
        Some(path) => repairdesk_config::load_and_validate_path(path),
        None => repairdesk_config::load_and_validate(),
    };
    match loaded {
        Ok(_) => CheckResult::new("Configuration", CheckStatus::Pass, "valid", start),
        Err(errors) => CheckResult::new(
            "Configuration",
            CheckStatus::Fail,
            format!("{} error(s)", errors.len()),
            start,
        ),
    }
}

fn store_path(storage: &StorageConfig) -> &str {
    match storage.backend {
        StorageBackend::Sqlite => &storage.database_path,
        StorageBackend::Json => &storage.json_path,
    }
}

/// Check the backend's file exists.
async fn check_store_file(storage: &StorageConfig) -> CheckResult {
    let start = Instant::now();
    let path = store_path(storage);
    if Path::new(path).exists() {
        CheckResult::new("Store file", CheckStatus::Pass, path, start)
    } else {
        CheckResult::new(
            "Store file",
            CheckStatus::Warn,
            format!("not found: {path} (will be created on first write)"),
            start,
        )
    }
}

/// Open the configured backend and ask it for its health.
async fn check_backend(storage: &StorageConfig) -> CheckResult {
    let start = Instant::now();
    let store = match repairdesk_storage::open_store(storage).await {
        Ok(store) => store,
        Err(e) => {
            return CheckResult::new(
                "Backend",
                CheckStatus::Fail,
                format!("open failed: {e}"),
                start,
            );
        }
    };
    let result = match store.health_check().await {
        Ok(HealthStatus::Healthy) => {
            CheckResult::new("Backend", CheckStatus::Pass, "healthy", start)
        }
        Ok(HealthStatus::Degraded(reason)) => {
            CheckResult::new("Backend", CheckStatus::Warn, reason, start)
        }
        Ok(HealthStatus::Unhealthy(reason)) => {
            CheckResult::new("Backend", CheckStatus::Fail, reason, start)
        }
        Err(e) => CheckResult::new(
            "Backend",
            CheckStatus::Fail,
            format!("health check failed: {e}"),
            start,
        ),
    };
    if let Err(e) = store.close().await {
        tracing::warn!(error = %e, "failed to close store after health check");
    }
    result
}

/// Deep check: full SQLite integrity check, or a full parse of the JSON document.
async fn check_integrity(storage: &StorageConfig) -> CheckResult {
    let start = Instant::now();
    let path = store_path(storage);

    if !Path::new(path).exists() {
        return CheckResult::new(
            "Integrity",
            CheckStatus::Warn,
            "store not found (skipped)",
            start,
        );
    }

    match storage.backend {
        StorageBackend::Sqlite => sqlite_integrity(path, start).await,
        StorageBackend::Json => json_integrity(path, start).await,
    }
}

async fn sqlite_integrity(path: &str, start: Instant) -> CheckResult {
    let conn = match tokio_rusqlite::Connection::open(path).await {
        Ok(conn) => conn,
        Err(e) => {
            return CheckResult::new(
                "Integrity",
                CheckStatus::Fail,
                format!("open failed: {e}"),
                start,
            );
        }
    };
    let result = conn
        .call(|conn| -> Result<Vec<String>, rusqlite::Error> {
            let mut stmt = conn.prepare("PRAGMA integrity_check")?;
            let rows = stmt
                .query_map([], |row| row.get(0))?
                .collect::<Result<Vec<String>, _>>()?;
            Ok(rows)
        })
        .await;

    match result {
        Ok(rows) if rows.len() == 1 && rows[0] == "ok" => {
            CheckResult::new("Integrity", CheckStatus::Pass, "ok", start)
        }
        Ok(rows) => CheckResult::new(
            "Integrity",
            CheckStatus::Fail,
            format!("{} issue(s) found", rows.len()),
            start,
        ),
        Err(e) => CheckResult::new(
            "Integrity",
            CheckStatus::Fail,
            format!("check failed: {e}"),
            start,
        ),
    }
}

async fn json_integrity(path: &str, start: Instant) -> CheckResult {
    let raw = match tokio::fs::read_to_string(path).await {
        Ok(raw) => raw,
        Err(e) => {
            return CheckResult::new(
                "Integrity",
                CheckStatus::Fail,
                format!("read failed: {e}"),
                start,
            );
        }
    };
    match JsonDocument::parse(&raw, "") {
        Ok(doc) => CheckResult::new(
            "Integrity",
            CheckStatus::Pass,
            format!("{} ticket(s), next id {}", doc.tickets.len(), doc.next_id),
            start,
        ),
        Err(e) => CheckResult::new("Integrity", CheckStatus::Fail, e.to_string(), start),
    }
}

/// Deep check: size of the store file.
async fn check_file_size(storage: &StorageConfig) -> CheckResult {
    let start = Instant::now();
    let path = store_path(storage);
    match tokio::fs::metadata(path).await {
        Ok(meta) => {
            let size_mb = meta.len() as f64 / (1024.0 * 1024.0);
            CheckResult::new(
                "File size",
                CheckStatus::Pass,
                format!("{size_mb:.1} MB"),
                start,
            )
        }
        Err(e) => CheckResult::new(
            "File size",
            CheckStatus::Warn,
            format!("cannot access: {e}"),
            start,
        ),
    }
}
