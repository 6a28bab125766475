// SPDX-FileCopyrightText: 2026 Repairdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for repairdesk.
//!
//! This crate provides the ticket domain types, the error type, the storage
//! traits every backend implements, and the backend-independent rules
//! (search, ordering, duplicate detection) that both backends must honour.

pub mod duplicates;
pub mod error;
pub mod rules;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::RepairdeskError;
pub use types::{
    Attachment, Author, Duplicate, HealthStatus, Message, NewTechnician, NewTicket, Role,
    StorageBackend, Technician, Ticket, TicketId, TicketPatch,
};

pub use traits::{BackendAdapter, TicketStore};
