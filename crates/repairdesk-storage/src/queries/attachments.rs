// SPDX-FileCopyrightText: 2026 Repairdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Ticket attachments. Only the path is stored; files are never copied.

use repairdesk_core::{Attachment, Author, RepairdeskError, TicketId};
use rusqlite::{Connection, params};
use tracing::debug;

use crate::database::{Database, map_tr_err};
use crate::queries::users;

/// Attachments of one ticket in append order. A deleted uploader reads as `""`.
pub(crate) fn attachments_for(
    conn: &Connection,
    ticket: TicketId,
) -> rusqlite::Result<Vec<Attachment>> {
    let mut stmt = conn.prepare_cached(
        "SELECT a.file_path, a.description, COALESCE(un.author_name, ''), a.uploaded_at
         FROM attachments a
         LEFT JOIN user_names un ON a.user_id = un.user_id
         WHERE a.request_id = ?1
         ORDER BY a.attachment_id",
    )?;
    let rows = stmt.query_map(params![ticket], |row| {
        Ok(Attachment {
            file_path: row.get(0)?,
            description: row.get(1)?,
            uploaded_by: row.get(2)?,
            uploaded_at: row.get(3)?,
        })
    })?;
    rows.collect()
}

/// Append an attachment and bump the ticket's `updated_at`.
pub async fn add_attachment(
    db: &Database,
    ticket: TicketId,
    author: &Author,
    file_path: &str,
    description: &str,
    now: &str,
) -> Result<(), RepairdeskError> {
    let author = author.clone();
    let file_path = file_path.to_string();
    let description = description.to_string();
    let now = now.to_string();
    db.connection()
        .call(move |conn| -> Result<Result<(), RepairdeskError>, rusqlite::Error> {
            let tx = conn.transaction()?;
            let Some(user_id) = users::resolve_author(&tx, ticket, &author)? else {
                return Ok(Err(RepairdeskError::TicketNotFound(ticket)));
            };
            tx.execute(
                "INSERT INTO attachments (request_id, user_id, file_path, description, uploaded_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![ticket, user_id, file_path, description, now],
            )?;
            tx.execute(
                "UPDATE requests SET updated_at = ?1 WHERE request_id = ?2",
                params![now, ticket],
            )?;
            tx.commit()?;
            debug!(ticket, file = %file_path, "attachment added");
            Ok(Ok(()))
        })
        .await
        .map_err(map_tr_err)?
}
