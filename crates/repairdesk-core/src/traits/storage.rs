// SPDX-FileCopyrightText: 2026 Repairdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Ticket persistence trait.

use async_trait::async_trait;

use crate::error::RepairdeskError;
use crate::traits::adapter::BackendAdapter;
use crate::types::{
    Author, NewTechnician, NewTicket, Technician, Ticket, TicketId, TicketPatch,
};

/// Create, read, update, delete, and search operations over tickets.
///
/// Implementations must hand out strictly increasing ticket ids that are never
/// reused, keep message and attachment lists append-only, and apply ordering
/// and search exactly as described in [`crate::rules`].
#[async_trait]
pub trait TicketStore: BackendAdapter {
    /// Opens the backend (runs migrations, loads the document, etc.).
    async fn initialize(&self) -> Result<(), RepairdeskError>;

    /// Flushes pending state and releases the backend.
    async fn close(&self) -> Result<(), RepairdeskError>;

    // --- Tickets ---

    /// Creates a ticket and returns it with its newly assigned id.
    async fn create_ticket(&self, new: &NewTicket) -> Result<Ticket, RepairdeskError>;

    async fn get_ticket(&self, id: TicketId) -> Result<Option<Ticket>, RepairdeskError>;

    /// All tickets, newest first.
    async fn list_tickets(&self) -> Result<Vec<Ticket>, RepairdeskError>;

    /// Tickets whose client phone equals `phone`, newest first.
    async fn list_client_tickets(&self, phone: &str) -> Result<Vec<Ticket>, RepairdeskError>;

    /// Tickets assigned to `technician`, in technician queue order.
    async fn list_technician_tickets(
        &self,
        technician: &Technician,
    ) -> Result<Vec<Ticket>, RepairdeskError>;

    /// Case-insensitive substring search over the searchable fields, newest first.
    async fn search_tickets(&self, text: &str) -> Result<Vec<Ticket>, RepairdeskError>;

    /// Applies the present fields of `patch`.
    ///
    /// Fails with `TicketNotFound` for an unknown id and `TechnicianNotFound`
    /// when the patch names a technician missing from the roster; in both cases
    /// nothing is written.
    async fn apply_patch(&self, id: TicketId, patch: &TicketPatch)
    -> Result<(), RepairdeskError>;

    /// Removes a ticket with its messages and attachments. Returns false if it did not exist.
    async fn delete_ticket(&self, id: TicketId) -> Result<bool, RepairdeskError>;

    // --- History ---

    async fn add_message(
        &self,
        id: TicketId,
        author: &Author,
        text: &str,
    ) -> Result<(), RepairdeskError>;

    async fn add_attachment(
        &self,
        id: TicketId,
        author: &Author,
        file_path: &str,
        description: &str,
    ) -> Result<(), RepairdeskError>;

    // --- Technicians ---

    /// Looks a technician up by exact surname or login.
    async fn find_technician(&self, name: &str) -> Result<Option<Technician>, RepairdeskError>;

    async fn register_technician(
        &self,
        new: &NewTechnician,
    ) -> Result<Technician, RepairdeskError>;
}
