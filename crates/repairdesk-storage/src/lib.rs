// SPDX-FileCopyrightText: 2026 Repairdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Ticket persistence for repairdesk.
//!
//! Two backends implement [`TicketStore`]:
//!
//! - [`SqliteStorage`]: relational schema with embedded migrations, WAL
//!   mode, and a single-writer connection via `tokio-rusqlite`.
//! - [`JsonStorage`]: one JSON document held in memory and rewritten on
//!   every change.
//!
//! The backend is chosen by `storage.backend`. The two never exchange data.

pub mod adapter;
pub mod database;
pub mod json;
pub mod migrations;
pub mod queries;

use std::sync::Arc;

use repairdesk_config::model::StorageConfig;
use repairdesk_core::{RepairdeskError, StorageBackend, TicketStore};
use tracing::info;

pub use adapter::SqliteStorage;
pub use database::Database;
pub use json::{JsonDocument, JsonStorage};

/// Build and initialize the backend selected by `config.backend`.
pub async fn open_store(config: &StorageConfig) -> Result<Arc<dyn TicketStore>, RepairdeskError> {
    let store: Arc<dyn TicketStore> = match config.backend {
        StorageBackend::Sqlite => Arc::new(SqliteStorage::new(config.clone())),
        StorageBackend::Json => Arc::new(JsonStorage::new(config.clone())),
    };
    store.initialize().await?;
    let location = match config.backend {
        StorageBackend::Sqlite => &config.database_path,
        StorageBackend::Json => &config.json_path,
    };
    info!(backend = %config.backend, location = %location, "storage opened");
    Ok(store)
}
