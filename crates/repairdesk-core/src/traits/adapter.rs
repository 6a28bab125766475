// SPDX-FileCopyrightText: 2026 Repairdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Base trait that every storage backend implements.

use async_trait::async_trait;

use crate::error::RepairdeskError;
use crate::types::{HealthStatus, StorageBackend};

/// Identity, health, and shutdown for a storage backend.
#[async_trait]
pub trait BackendAdapter: Send + Sync + 'static {
    /// Returns the human-readable name of this backend instance.
    fn name(&self) -> &str;

    /// Returns the semantic version of this backend.
    fn version(&self) -> semver::Version;

    /// Returns which persistence mode this backend provides.
    fn backend(&self) -> StorageBackend;

    /// Performs a health check and returns the backend's current status.
    async fn health_check(&self) -> Result<HealthStatus, RepairdeskError>;

    /// Gracefully shuts down the backend, releasing any held resources.
    async fn shutdown(&self) -> Result<(), RepairdeskError>;
}
