// SPDX-FileCopyrightText: 2026 Repairdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Equipment catalogue: device types and (type, model) pairs.

use rusqlite::{Connection, OptionalExtension, params};

pub(crate) fn find_or_create_type(conn: &Connection, type_name: &str) -> rusqlite::Result<i64> {
    let existing = conn
        .query_row(
            "SELECT type_id FROM equipment_types WHERE type_name = ?1",
            params![type_name],
            |row| row.get(0),
        )
        .optional()?;
    if let Some(id) = existing {
        return Ok(id);
    }
    conn.execute(
        "INSERT INTO equipment_types (type_name) VALUES (?1)",
        params![type_name],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Equipment row for `(type_id, model)`. Rows are shared between requests and
/// never renamed; a different model gets its own row.
pub(crate) fn find_or_create_equipment(
    conn: &Connection,
    type_id: i64,
    model: &str,
) -> rusqlite::Result<i64> {
    let existing = conn
        .query_row(
            "SELECT equipment_id FROM equipment WHERE type_id = ?1 AND model = ?2",
            params![type_id, model],
            |row| row.get(0),
        )
        .optional()?;
    if let Some(id) = existing {
        return Ok(id);
    }
    conn.execute(
        "INSERT INTO equipment (type_id, model) VALUES (?1, ?2)",
        params![type_id, model],
    )?;
    Ok(conn.last_insert_rowid())
}
