// SPDX-FileCopyrightText: 2026 Repairdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Operator desk: triage, assignment, search, and duplicate cleanup.

use std::sync::Arc;

use repairdesk_core::duplicates::find_duplicates;
use repairdesk_core::{
    Duplicate, NewTechnician, RepairdeskError, Technician, Ticket, TicketId, TicketPatch,
    TicketStore,
};
use tracing::{info, warn};

use crate::require;

pub struct OperatorDesk {
    store: Arc<dyn TicketStore>,
}

impl OperatorDesk {
    pub fn new(store: Arc<dyn TicketStore>) -> Self {
        Self { store }
    }

    /// Every ticket, newest first.
    pub async fn tickets(&self) -> Result<Vec<Ticket>, RepairdeskError> {
        self.store.list_tickets().await
    }

    pub async fn show(&self, id: TicketId) -> Result<Ticket, RepairdeskError> {
        self.store
            .get_ticket(id)
            .await?
            .ok_or(RepairdeskError::TicketNotFound(id))
    }

    /// Apply an operator edit. An unknown technician changes nothing.
    pub async fn update(&self, id: TicketId, patch: &TicketPatch) -> Result<(), RepairdeskError> {
        if let Some(name) = &patch.technician {
            require(name, "technician")?;
        }
        match self.store.apply_patch(id, patch).await {
            Ok(()) => {
                info!(ticket = id, "ticket updated");
                Ok(())
            }
            Err(e @ RepairdeskError::TechnicianNotFound(_)) => {
                warn!(ticket = id, error = %e, "update refused");
                Err(e)
            }
            Err(e) => Err(e),
        }
    }

    pub async fn search(&self, text: &str) -> Result<Vec<Ticket>, RepairdeskError> {
        let text = require(text, "search text")?;
        self.store.search_tickets(text).await
    }

    pub async fn find_duplicates(&self) -> Result<Vec<Duplicate>, RepairdeskError> {
        let tickets = self.store.list_tickets().await?;
        Ok(find_duplicates(&tickets))
    }

    /// Delete every flagged duplicate, keeping the originals. Returns what was removed.
    pub async fn remove_duplicates(&self) -> Result<Vec<Duplicate>, RepairdeskError> {
        let duplicates = self.find_duplicates().await?;
        for dup in &duplicates {
            self.store.delete_ticket(dup.duplicate).await?;
        }
        if !duplicates.is_empty() {
            info!(count = duplicates.len(), "duplicates removed");
        }
        Ok(duplicates)
    }

    pub async fn delete(&self, id: TicketId) -> Result<(), RepairdeskError> {
        if self.store.delete_ticket(id).await? {
            Ok(())
        } else {
            Err(RepairdeskError::TicketNotFound(id))
        }
    }

    /// Add a technician to the roster. `full_name` is "Surname First".
    pub async fn register_technician(
        &self,
        new: &NewTechnician,
    ) -> Result<Technician, RepairdeskError> {
        let new = NewTechnician {
            login: require(&new.login, "login")?.to_string(),
            full_name: require(&new.full_name, "full name")?.to_string(),
            phone: new.phone.trim().to_string(),
        };
        let tech = self.store.register_technician(&new).await?;
        info!(login = %tech.login, "technician registered");
        Ok(tech)
    }
}
