// SPDX-FileCopyrightText: 2026 Repairdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Query modules for CRUD operations on storage entities.

pub mod attachments;
pub mod comments;
pub mod equipment;
pub mod requests;
pub mod statuses;
pub mod users;
