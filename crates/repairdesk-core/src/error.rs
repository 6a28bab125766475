// SPDX-FileCopyrightText: 2026 Repairdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for repairdesk.

use thiserror::Error;

use crate::types::TicketId;

/// The primary error type used across storage backends and role desks.
#[derive(Debug, Error)]
pub enum RepairdeskError {
    /// Configuration errors (invalid TOML, bad values, unknown backend).
    #[error("configuration error: {0}")]
    Config(String),

    /// Storage backend errors (SQLite failure, file I/O, JSON encoding).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// No ticket exists with the given identifier.
    #[error("ticket {0} not found")]
    TicketNotFound(TicketId),

    /// No technician matches the given surname or login.
    #[error("technician `{0}` not found")]
    TechnicianNotFound(String),

    /// User input rejected before reaching storage.
    #[error("{0}")]
    Validation(String),

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl RepairdeskError {
    /// Wrap any error as a storage failure.
    pub fn storage<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Storage {
            source: Box::new(err),
        }
    }

    /// Returns true for errors caused by the caller's input rather than the backend.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            Self::TicketNotFound(_) | Self::TechnicianNotFound(_) | Self::Validation(_)
        )
    }
}
