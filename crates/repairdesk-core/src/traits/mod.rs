// SPDX-FileCopyrightText: 2026 Repairdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Storage trait definitions.
//!
//! Every backend implements [`BackendAdapter`] for identity and lifecycle, and
//! [`TicketStore`] for ticket persistence. Both use `#[async_trait]` so the
//! application can hold a `dyn TicketStore` without knowing the backend.

pub mod adapter;
pub mod storage;

pub use adapter::BackendAdapter;
pub use storage::TicketStore;
