// SPDX-FileCopyrightText: 2026 Repairdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory form of `tickets_data.json`.

use repairdesk_core::{RepairdeskError, Technician, Ticket, TicketId};
use serde::{Deserialize, Serialize};

/// The whole JSON store: tickets, the id counter, and the technician roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JsonDocument {
    #[serde(default)]
    pub tickets: Vec<Ticket>,
    #[serde(default = "first_id")]
    pub next_id: TicketId,
    /// Omitted when empty so files without a roster round-trip unchanged.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub technicians: Vec<Technician>,
}

fn first_id() -> TicketId {
    1
}

impl Default for JsonDocument {
    fn default() -> Self {
        Self {
            tickets: Vec::new(),
            next_id: first_id(),
            technicians: Vec::new(),
        }
    }
}

impl JsonDocument {
    /// Parse a document and repair what older files may lack.
    pub fn parse(raw: &str, now: &str) -> Result<Self, RepairdeskError> {
        let mut doc: Self = serde_json::from_str(raw).map_err(RepairdeskError::storage)?;
        doc.normalize(now);
        Ok(doc)
    }

    /// Pretty JSON, two-space indent, non-ASCII left unescaped.
    pub fn to_pretty_json(&self) -> Result<String, RepairdeskError> {
        serde_json::to_string_pretty(self).map_err(RepairdeskError::storage)
    }

    /// Fill missing timestamps and raise `next_id` past every stored id.
    pub fn normalize(&mut self, now: &str) {
        for ticket in &mut self.tickets {
            ticket.fill_missing_timestamps(now);
        }
        let floor = self.tickets.iter().map(|t| t.id + 1).max().unwrap_or(1);
        self.next_id = self.next_id.max(floor);
    }

    /// Hand out the next id. Ids are never reused, even after deletion.
    pub fn allocate_id(&mut self) -> TicketId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn ticket(&self, id: TicketId) -> Option<&Ticket> {
        self.tickets.iter().find(|t| t.id == id)
    }

    pub fn ticket_mut(&mut self, id: TicketId) -> Result<&mut Ticket, RepairdeskError> {
        self.tickets
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or(RepairdeskError::TicketNotFound(id))
    }

    pub fn technician(&self, name: &str) -> Option<&Technician> {
        self.technicians.iter().find(|t| t.answers_to(name))
    }
}
