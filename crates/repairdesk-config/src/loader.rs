// SPDX-FileCopyrightText: 2026 Repairdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./repairdesk.toml` > `~/.config/repairdesk/repairdesk.toml`
//! > `/etc/repairdesk/repairdesk.toml` with environment variable overrides via the
//! `REPAIRDESK_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::RepairdeskConfig;

pub(crate) const LOCAL_CONFIG: &str = "repairdesk.toml";
pub(crate) const SYSTEM_CONFIG: &str = "/etc/repairdesk/repairdesk.toml";

/// Path of the per-user config file, if the platform has a config dir.
pub(crate) fn user_config_path() -> PathBuf {
    dirs::config_dir()
        .map(|d| d.join("repairdesk").join(LOCAL_CONFIG))
        .unwrap_or_default()
}

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/repairdesk/repairdesk.toml` (system-wide)
/// 3. `~/.config/repairdesk/repairdesk.toml` (user XDG config)
/// 4. `./repairdesk.toml` (local directory)
/// 5. `REPAIRDESK_*` environment variables
pub fn load_config() -> Result<RepairdeskConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no files, no env).
///
/// Used for testing and explicit configuration.
pub fn load_config_from_str(toml_content: &str) -> Result<RepairdeskConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(RepairdeskConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<RepairdeskConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(RepairdeskConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the Figment used internally for config loading (exposed for diagnostic use).
///
/// Returns the Figment before extraction so callers can inspect metadata.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(RepairdeskConfig::default()))
        .merge(Toml::file(SYSTEM_CONFIG))
        .merge(Toml::file(user_config_path()))
        .merge(Toml::file(LOCAL_CONFIG))
        .merge(env_provider())
}

/// Create the environment variable provider using explicit `map()` for section-to-dot mapping.
///
/// Uses `Env::map()` rather than `Env::split("_")` because key names contain
/// underscores: `REPAIRDESK_STORAGE_DATABASE_PATH` must map to
/// `storage.database_path`, not `storage.database.path`.
pub(crate) fn env_provider() -> Env {
    Env::prefixed("REPAIRDESK_").map(|key| {
        // `key` is the lowercased env var name with prefix stripped.
        let key_str = key.as_str();
        let mapped = key_str
            .replacen("app_", "app.", 1)
            .replacen("storage_", "storage.", 1)
            .replacen("workflow_", "workflow.", 1);
        mapped.into()
    })
}
