// SPDX-FileCopyrightText: 2026 Repairdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! JSON file backend.
//!
//! Keeps the full ticket collection in memory and rewrites the file after
//! every change. The file layout is the one older tooling produced, so
//! existing `tickets_data.json` files load unchanged.

pub mod document;
pub mod store;

pub use document::JsonDocument;
pub use store::JsonStorage;
