// SPDX-FileCopyrightText: 2026 Repairdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Request status names. Any string is a valid status; rows appear on first use.

use rusqlite::{Connection, OptionalExtension, params};

pub(crate) fn find_or_create_status(conn: &Connection, status: &str) -> rusqlite::Result<i64> {
    let existing = conn
        .query_row(
            "SELECT status_id FROM request_statuses WHERE status_name = ?1",
            params![status],
            |row| row.get(0),
        )
        .optional()?;
    if let Some(id) = existing {
        return Ok(id);
    }
    conn.execute(
        "INSERT INTO request_statuses (status_name) VALUES (?1)",
        params![status],
    )?;
    Ok(conn.last_insert_rowid())
}
