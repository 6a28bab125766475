// SPDX-FileCopyrightText: 2026 Repairdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Role desks: the workflows each kind of user runs against a ticket store.
//!
//! A desk validates its input before touching the store, so a rejected
//! request never reaches the backend.

pub mod client;
pub mod operator;
pub mod technician;

pub use client::{ClientDesk, TicketForm};
pub use operator::OperatorDesk;
pub use technician::TechnicianDesk;

use repairdesk_core::RepairdeskError;

/// Trimmed `value`, or a validation error naming `field` if it is blank.
pub(crate) fn require<'a>(value: &'a str, field: &str) -> Result<&'a str, RepairdeskError> {
    let value = value.trim();
    if value.is_empty() {
        Err(RepairdeskError::Validation(format!("{field} is required")))
    } else {
        Ok(value)
    }
}
