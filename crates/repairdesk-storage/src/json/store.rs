// SPDX-FileCopyrightText: 2026 Repairdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! JSON document implementation of the TicketStore trait.

use std::cmp::Ordering;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::{Mutex, OnceCell};
use tracing::{debug, info};

use repairdesk_config::model::StorageConfig;
use repairdesk_core::types::{now_timestamp, split_full_name};
use repairdesk_core::{
    Attachment, Author, BackendAdapter, HealthStatus, Message, NewTechnician, NewTicket,
    RepairdeskError, Role, StorageBackend, Technician, Ticket, TicketId, TicketPatch,
    TicketStore, rules,
};

use super::document::JsonDocument;

/// Ticket store backed by a single JSON file.
///
/// The document is loaded once by [`TicketStore::initialize`] and kept in
/// memory. Every mutation rewrites the whole file through a temp file and a
/// rename; a failed write leaves both the file and the in-memory copy as
/// they were.
pub struct JsonStorage {
    path: PathBuf,
    doc: OnceCell<Mutex<JsonDocument>>,
}

impl JsonStorage {
    pub fn new(config: StorageConfig) -> Self {
        Self {
            path: PathBuf::from(config.json_path),
            doc: OnceCell::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn doc(&self) -> Result<&Mutex<JsonDocument>, RepairdeskError> {
        self.doc.get().ok_or_else(|| RepairdeskError::Storage {
            source: "storage not initialized -- call initialize() first".into(),
        })
    }

    async fn read<T>(&self, f: impl FnOnce(&JsonDocument) -> T) -> Result<T, RepairdeskError> {
        let guard = self.doc()?.lock().await;
        Ok(f(&guard))
    }

    /// Run `f` on a draft copy, persist it, then swap it in.
    async fn mutate<T>(
        &self,
        f: impl FnOnce(&mut JsonDocument) -> Result<T, RepairdeskError>,
    ) -> Result<T, RepairdeskError> {
        let mut guard = self.doc()?.lock().await;
        let mut draft = guard.clone();
        let out = f(&mut draft)?;
        self.persist(&draft).await?;
        *guard = draft;
        Ok(out)
    }

    async fn persist(&self, doc: &JsonDocument) -> Result<(), RepairdeskError> {
        let body = doc.to_pretty_json()?;
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(RepairdeskError::storage)?;
        }
        let mut tmp_name = self.path.as_os_str().to_owned();
        tmp_name.push(".tmp");
        let tmp = PathBuf::from(tmp_name);
        tokio::fs::write(&tmp, body.as_bytes())
            .await
            .map_err(RepairdeskError::storage)?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(RepairdeskError::storage)?;
        debug!(path = %self.path.display(), tickets = doc.tickets.len(), "document written");
        Ok(())
    }
}

fn sorted(mut tickets: Vec<Ticket>, order: fn(&Ticket, &Ticket) -> Ordering) -> Vec<Ticket> {
    tickets.sort_by(order);
    tickets
}

/// Display name recorded for an author. Clients with no name use the ticket's client.
fn author_name(ticket: &Ticket, author: &Author) -> String {
    if author.role == Role::Client && author.name.trim().is_empty() {
        ticket.client_name.clone()
    } else {
        author.name.clone()
    }
}

#[async_trait]
impl BackendAdapter for JsonStorage {
    fn name(&self) -> &str {
        "json"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn backend(&self) -> StorageBackend {
        StorageBackend::Json
    }

    async fn health_check(&self) -> Result<HealthStatus, RepairdeskError> {
        let tickets = self.read(|doc| doc.tickets.len()).await?;
        match tokio::fs::metadata(&self.path).await {
            Ok(meta) if meta.permissions().readonly() => Ok(HealthStatus::Unhealthy(format!(
                "{} is read-only",
                self.path.display()
            ))),
            Ok(_) => Ok(HealthStatus::Healthy),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(HealthStatus::Degraded(
                format!("{} not written yet ({tickets} tickets in memory)", self.path.display()),
            )),
            Err(e) => Ok(HealthStatus::Unhealthy(e.to_string())),
        }
    }

    async fn shutdown(&self) -> Result<(), RepairdeskError> {
        // Every mutation is already on disk.
        debug!(path = %self.path.display(), "shutdown: nothing to flush");
        Ok(())
    }
}

#[async_trait]
impl TicketStore for JsonStorage {
    async fn initialize(&self) -> Result<(), RepairdeskError> {
        let doc = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => JsonDocument::parse(&raw, &now_timestamp())?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no ticket file yet, starting empty");
                JsonDocument::default()
            }
            Err(e) => return Err(RepairdeskError::storage(e)),
        };
        let count = doc.tickets.len();
        self.doc
            .set(Mutex::new(doc))
            .map_err(|_| RepairdeskError::Storage {
                source: "storage already initialized".into(),
            })?;
        debug!(path = %self.path.display(), tickets = count, "JSON storage initialized");
        Ok(())
    }

    async fn close(&self) -> Result<(), RepairdeskError> {
        self.doc()?;
        Ok(())
    }

    // --- Tickets ---

    async fn create_ticket(&self, new: &NewTicket) -> Result<Ticket, RepairdeskError> {
        let now = now_timestamp();
        let ticket = self
            .mutate(|doc| {
                let ticket = Ticket::from_new(doc.allocate_id(), new, &now);
                doc.tickets.push(ticket.clone());
                Ok(ticket)
            })
            .await?;
        info!(ticket = ticket.id, "ticket created");
        Ok(ticket)
    }

    async fn get_ticket(&self, id: TicketId) -> Result<Option<Ticket>, RepairdeskError> {
        self.read(|doc| doc.ticket(id).cloned()).await
    }

    async fn list_tickets(&self) -> Result<Vec<Ticket>, RepairdeskError> {
        let tickets = self.read(|doc| doc.tickets.clone()).await?;
        Ok(sorted(tickets, rules::newest_first))
    }

    async fn list_client_tickets(&self, phone: &str) -> Result<Vec<Ticket>, RepairdeskError> {
        let tickets: Vec<Ticket> = self
            .read(|doc| {
                doc.tickets
                    .iter()
                    .filter(|t| t.client_phone == phone)
                    .cloned()
                    .collect()
            })
            .await?;
        Ok(sorted(tickets, rules::newest_first))
    }

    async fn list_technician_tickets(
        &self,
        technician: &Technician,
    ) -> Result<Vec<Ticket>, RepairdeskError> {
        let tickets: Vec<Ticket> = self
            .read(|doc| {
                doc.tickets
                    .iter()
                    .filter(|t| t.technician.as_deref() == Some(technician.surname.as_str()))
                    .cloned()
                    .collect()
            })
            .await?;
        Ok(sorted(tickets, rules::technician_queue))
    }

    async fn search_tickets(&self, text: &str) -> Result<Vec<Ticket>, RepairdeskError> {
        let tickets: Vec<Ticket> = self
            .read(|doc| {
                doc.tickets
                    .iter()
                    .filter(|t| rules::matches_search(t, text))
                    .cloned()
                    .collect()
            })
            .await?;
        Ok(sorted(tickets, rules::newest_first))
    }

    async fn apply_patch(
        &self,
        id: TicketId,
        patch: &TicketPatch,
    ) -> Result<(), RepairdeskError> {
        if patch.is_empty() {
            // Still report an unknown id.
            return self
                .read(|doc| doc.ticket(id).map(|_| ()))
                .await?
                .ok_or(RepairdeskError::TicketNotFound(id));
        }
        let now = now_timestamp();
        self.mutate(|doc| {
            doc.ticket_mut(id)?;
            let technician = match &patch.technician {
                Some(name) => Some(
                    doc.technician(name)
                        .cloned()
                        .ok_or_else(|| RepairdeskError::TechnicianNotFound(name.clone()))?,
                ),
                None => None,
            };
            let ticket = doc.ticket_mut(id)?;
            patch.apply_to(ticket, technician.as_ref(), &now);
            Ok(())
        })
        .await
    }

    async fn delete_ticket(&self, id: TicketId) -> Result<bool, RepairdeskError> {
        let mut guard = self.doc()?.lock().await;
        if guard.ticket(id).is_none() {
            return Ok(false);
        }
        let mut draft = guard.clone();
        draft.tickets.retain(|t| t.id != id);
        self.persist(&draft).await?;
        *guard = draft;
        info!(ticket = id, "ticket deleted");
        Ok(true)
    }

    // --- History ---

    async fn add_message(
        &self,
        id: TicketId,
        author: &Author,
        text: &str,
    ) -> Result<(), RepairdeskError> {
        let now = now_timestamp();
        self.mutate(|doc| {
            let ticket = doc.ticket_mut(id)?;
            let message = Message {
                author_role: author.role.to_string(),
                author_name: author_name(ticket, author),
                text: text.to_string(),
                created_at: now.clone(),
            };
            ticket.push_message(message);
            Ok(())
        })
        .await?;
        debug!(ticket = id, role = %author.role, "message added");
        Ok(())
    }

    async fn add_attachment(
        &self,
        id: TicketId,
        author: &Author,
        file_path: &str,
        description: &str,
    ) -> Result<(), RepairdeskError> {
        let now = now_timestamp();
        self.mutate(|doc| {
            let ticket = doc.ticket_mut(id)?;
            let attachment = Attachment {
                file_path: file_path.to_string(),
                description: description.to_string(),
                uploaded_by: author_name(ticket, author),
                uploaded_at: now.clone(),
            };
            ticket.push_attachment(attachment);
            Ok(())
        })
        .await?;
        debug!(ticket = id, file = file_path, "attachment added");
        Ok(())
    }

    // --- Technicians ---

    async fn find_technician(&self, name: &str) -> Result<Option<Technician>, RepairdeskError> {
        self.read(|doc| doc.technician(name).cloned()).await
    }

    async fn register_technician(
        &self,
        new: &NewTechnician,
    ) -> Result<Technician, RepairdeskError> {
        self.mutate(|doc| {
            if doc.technicians.iter().any(|t| t.login == new.login) {
                return Err(RepairdeskError::Validation(format!(
                    "login `{}` is already taken",
                    new.login
                )));
            }
            let (surname, first_name, _) = split_full_name(&new.full_name);
            let technician = Technician {
                login: new.login.clone(),
                surname,
                first_name: if first_name == "-" {
                    String::new()
                } else {
                    first_name
                },
            };
            doc.technicians.push(technician.clone());
            Ok(technician)
        })
        .await
    }
}
