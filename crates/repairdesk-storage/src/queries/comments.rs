// SPDX-FileCopyrightText: 2026 Repairdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Ticket history. Comments are append-only; there is no edit or delete path.

use repairdesk_core::{Author, Message, RepairdeskError, TicketId};
use rusqlite::{Connection, params};
use tracing::debug;

use crate::database::{Database, map_tr_err};
use crate::queries::users;

/// Messages of one ticket in append order.
pub(crate) fn history_for(conn: &Connection, ticket: TicketId) -> rusqlite::Result<Vec<Message>> {
    let mut stmt = conn.prepare_cached(
        "SELECT un.role_name, un.author_name, c.message, c.created_at
         FROM comments c
         JOIN user_names un ON c.user_id = un.user_id
         WHERE c.request_id = ?1
         ORDER BY c.comment_id",
    )?;
    let rows = stmt.query_map(params![ticket], |row| {
        Ok(Message {
            author_role: row.get(0)?,
            author_name: row.get(1)?,
            text: row.get(2)?,
            created_at: row.get(3)?,
        })
    })?;
    rows.collect()
}

/// Append a message and bump the ticket's `updated_at`.
pub async fn add_message(
    db: &Database,
    ticket: TicketId,
    author: &Author,
    text: &str,
    now: &str,
) -> Result<(), RepairdeskError> {
    let author = author.clone();
    let text = text.to_string();
    let now = now.to_string();
    db.connection()
        .call(move |conn| -> Result<Result<(), RepairdeskError>, rusqlite::Error> {
            let tx = conn.transaction()?;
            let Some(user_id) = users::resolve_author(&tx, ticket, &author)? else {
                return Ok(Err(RepairdeskError::TicketNotFound(ticket)));
            };
            tx.execute(
                "INSERT INTO comments (request_id, user_id, message, created_at)
                 VALUES (?1, ?2, ?3, ?4)",
                params![ticket, user_id, text, now],
            )?;
            tx.execute(
                "UPDATE requests SET updated_at = ?1 WHERE request_id = ?2",
                params![now, ticket],
            )?;
            tx.commit()?;
            debug!(ticket, role = %author.role, "comment added");
            Ok(Ok(()))
        })
        .await
        .map_err(map_tr_err)?
}
