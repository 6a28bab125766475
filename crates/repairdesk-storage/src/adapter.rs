// SPDX-FileCopyrightText: 2026 Repairdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the TicketStore trait.

use async_trait::async_trait;
use tokio::sync::OnceCell;
use tracing::debug;

use repairdesk_config::model::StorageConfig;
use repairdesk_core::types::now_timestamp;
use repairdesk_core::{
    Author, BackendAdapter, HealthStatus, NewTechnician, NewTicket, RepairdeskError,
    StorageBackend, Technician, Ticket, TicketId, TicketPatch, TicketStore,
};

use crate::database::Database;
use crate::queries;

/// SQLite-backed ticket store.
///
/// Wraps a [`Database`] handle and delegates all query operations to the
/// typed query modules. The database is lazily initialized on the first
/// call to [`TicketStore::initialize`].
pub struct SqliteStorage {
    config: StorageConfig,
    db: OnceCell<Database>,
}

impl SqliteStorage {
    /// Create a new SqliteStorage with the given configuration.
    ///
    /// The database connection is not opened until [`TicketStore::initialize`] is called.
    pub fn new(config: StorageConfig) -> Self {
        Self {
            config,
            db: OnceCell::new(),
        }
    }

    /// Returns a reference to the underlying Database, or an error if not initialized.
    fn db(&self) -> Result<&Database, RepairdeskError> {
        self.db.get().ok_or_else(|| RepairdeskError::Storage {
            source: "storage not initialized -- call initialize() first".into(),
        })
    }
}

#[async_trait]
impl BackendAdapter for SqliteStorage {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn backend(&self) -> StorageBackend {
        StorageBackend::Sqlite
    }

    async fn health_check(&self) -> Result<HealthStatus, RepairdeskError> {
        let db = self.db()?;
        let integrity = db
            .connection()
            .call(|conn| -> Result<String, rusqlite::Error> {
                conn.query_row("PRAGMA quick_check", [], |row| row.get(0))
            })
            .await
            .map_err(crate::database::map_tr_err)?;
        if integrity == "ok" {
            Ok(HealthStatus::Healthy)
        } else {
            Ok(HealthStatus::Degraded(format!("quick_check: {integrity}")))
        }
    }

    async fn shutdown(&self) -> Result<(), RepairdeskError> {
        // Shutdown delegates to a checkpoint if the DB was initialized.
        if let Some(db) = self.db.get() {
            db.checkpoint().await?;
            debug!("shutdown: WAL checkpoint complete");
        }
        Ok(())
    }
}

#[async_trait]
impl TicketStore for SqliteStorage {
    async fn initialize(&self) -> Result<(), RepairdeskError> {
        let db = Database::open(&self.config.database_path, self.config.wal_mode).await?;
        self.db.set(db).map_err(|_| RepairdeskError::Storage {
            source: "storage already initialized".into(),
        })?;
        debug!(path = %self.config.database_path, "SQLite storage initialized");
        Ok(())
    }

    async fn close(&self) -> Result<(), RepairdeskError> {
        self.db()?.checkpoint().await
    }

    // --- Tickets ---

    async fn create_ticket(&self, new: &NewTicket) -> Result<Ticket, RepairdeskError> {
        queries::requests::create_ticket(self.db()?, new, &now_timestamp()).await
    }

    async fn get_ticket(&self, id: TicketId) -> Result<Option<Ticket>, RepairdeskError> {
        queries::requests::get_ticket(self.db()?, id).await
    }

    async fn list_tickets(&self) -> Result<Vec<Ticket>, RepairdeskError> {
        queries::requests::list_tickets(self.db()?).await
    }

    async fn list_client_tickets(&self, phone: &str) -> Result<Vec<Ticket>, RepairdeskError> {
        queries::requests::list_client_tickets(self.db()?, phone).await
    }

    async fn list_technician_tickets(
        &self,
        technician: &Technician,
    ) -> Result<Vec<Ticket>, RepairdeskError> {
        queries::requests::list_technician_tickets(self.db()?, &technician.surname).await
    }

    async fn search_tickets(&self, text: &str) -> Result<Vec<Ticket>, RepairdeskError> {
        queries::requests::search_tickets(self.db()?, text).await
    }

    async fn apply_patch(
        &self,
        id: TicketId,
        patch: &TicketPatch,
    ) -> Result<(), RepairdeskError> {
        queries::requests::apply_patch(self.db()?, id, patch, &now_timestamp()).await
    }

    async fn delete_ticket(&self, id: TicketId) -> Result<bool, RepairdeskError> {
        queries::requests::delete_ticket(self.db()?, id).await
    }

    // --- History ---

    async fn add_message(
        &self,
        id: TicketId,
        author: &Author,
        text: &str,
    ) -> Result<(), RepairdeskError> {
        queries::comments::add_message(self.db()?, id, author, text, &now_timestamp()).await
    }

    async fn add_attachment(
        &self,
        id: TicketId,
        author: &Author,
        file_path: &str,
        description: &str,
    ) -> Result<(), RepairdeskError> {
        queries::attachments::add_attachment(
            self.db()?,
            id,
            author,
            file_path,
            description,
            &now_timestamp(),
        )
        .await
    }

    // --- Technicians ---

    async fn find_technician(&self, name: &str) -> Result<Option<Technician>, RepairdeskError> {
        queries::users::find_technician(self.db()?, name).await
    }

    async fn register_technician(
        &self,
        new: &NewTechnician,
    ) -> Result<Technician, RepairdeskError> {
        queries::users::register_technician(self.db()?, new).await
    }
}
