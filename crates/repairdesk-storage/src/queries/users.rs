// SPDX-FileCopyrightText: 2026 Repairdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! User lookups: clients by phone, operators by name, technicians by surname or login.
//!
//! Clients and operators are created on first reference. Technicians are
//! created on first reference as message authors, or explicitly through
//! [`register_technician`].

use repairdesk_core::types::split_full_name;
use repairdesk_core::{Author, NewTechnician, RepairdeskError, Role, Technician, TicketId};
use rusqlite::{Connection, OptionalExtension, params};
use tracing::debug;

use crate::database::{Database, map_tr_err};

/// `-` marks an absent name part in the users table.
fn placeholder_to_empty(part: String) -> String {
    if part == "-" { String::new() } else { part }
}

pub(crate) fn role_id(conn: &Connection, role: Role) -> rusqlite::Result<i64> {
    conn.query_row(
        "SELECT role_id FROM roles WHERE role_name = ?1",
        params![role.to_string()],
        |row| row.get(0),
    )
}

fn insert_user(
    conn: &Connection,
    full_name: &str,
    phone: &str,
    login: Option<&str>,
    role: Role,
) -> rusqlite::Result<i64> {
    let role_id = role_id(conn, role)?;
    let (lastname, firstname, patronymic) = split_full_name(full_name);
    conn.execute(
        "INSERT INTO users (lastname, firstname, patronymic, phone, login, role_id)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![lastname, firstname, patronymic, phone, login, role_id],
    )?;
    let user_id = conn.last_insert_rowid();
    debug!(user_id, role = %role, "user created");
    Ok(user_id)
}

/// The client with this phone, created from `full_name` if absent.
///
/// An existing client keeps the name it was first registered with.
pub(crate) fn find_or_create_client(
    conn: &Connection,
    full_name: &str,
    phone: &str,
) -> rusqlite::Result<i64> {
    let existing = conn
        .query_row(
            "SELECT u.user_id FROM users u JOIN roles r ON u.role_id = r.role_id
             WHERE r.role_name = 'client' AND u.phone = ?1
             ORDER BY u.user_id LIMIT 1",
            params![phone],
            |row| row.get(0),
        )
        .optional()?;
    match existing {
        Some(id) => Ok(id),
        None => insert_user(conn, full_name, phone, None, Role::Client),
    }
}

fn find_or_create_operator(conn: &Connection, name: &str) -> rusqlite::Result<i64> {
    let (lastname, firstname, patronymic) = split_full_name(name);
    let existing = conn
        .query_row(
            "SELECT u.user_id FROM users u JOIN roles r ON u.role_id = r.role_id
             WHERE r.role_name = 'operator'
               AND u.lastname = ?1 AND u.firstname = ?2 AND u.patronymic = ?3
             ORDER BY u.user_id LIMIT 1",
            params![lastname, firstname, patronymic],
            |row| row.get(0),
        )
        .optional()?;
    match existing {
        Some(id) => Ok(id),
        None => insert_user(conn, name, "", None, Role::Operator),
    }
}

/// Technician whose surname or login equals `name`, with its user id.
pub(crate) fn find_technician_row(
    conn: &Connection,
    name: &str,
) -> rusqlite::Result<Option<(i64, Technician)>> {
    conn.query_row(
        "SELECT u.user_id, COALESCE(u.login, ''), u.lastname, u.firstname
         FROM users u JOIN roles r ON u.role_id = r.role_id
         WHERE r.role_name = 'technician' AND (u.lastname = ?1 OR u.login = ?1)
         ORDER BY u.user_id LIMIT 1",
        params![name],
        |row| {
            Ok((
                row.get(0)?,
                Technician {
                    login: row.get(1)?,
                    surname: row.get(2)?,
                    first_name: placeholder_to_empty(row.get(3)?),
                },
            ))
        },
    )
    .optional()
}

/// Technician whose "lastname firstname" equals `name`.
fn technician_by_display_name(conn: &Connection, name: &str) -> rusqlite::Result<Option<i64>> {
    let (lastname, firstname, _) = split_full_name(name);
    conn.query_row(
        "SELECT u.user_id FROM users u JOIN roles r ON u.role_id = r.role_id
         WHERE r.role_name = 'technician' AND u.lastname = ?1 AND u.firstname = ?2
         ORDER BY u.user_id LIMIT 1",
        params![lastname, firstname],
        |row| row.get(0),
    )
    .optional()
}

/// User id to record as the author of a message or attachment.
///
/// Clients resolve to the ticket's own client. Returns `None` if the ticket
/// does not exist.
pub(crate) fn resolve_author(
    conn: &Connection,
    ticket: TicketId,
    author: &Author,
) -> rusqlite::Result<Option<i64>> {
    let client_id: Option<i64> = conn
        .query_row(
            "SELECT client_id FROM requests WHERE request_id = ?1",
            params![ticket],
            |row| row.get(0),
        )
        .optional()?;
    let Some(client_id) = client_id else {
        return Ok(None);
    };

    let user_id = match author.role {
        Role::Client => client_id,
        Role::Operator => find_or_create_operator(conn, &author.name)?,
        Role::Technician => match technician_by_display_name(conn, &author.name)? {
            Some(id) => id,
            None => match find_technician_row(conn, &author.name)? {
                Some((id, _)) => id,
                None => insert_user(conn, &author.name, "", None, Role::Technician)?,
            },
        },
    };
    Ok(Some(user_id))
}

/// Look a technician up by exact surname or login.
pub async fn find_technician(
    db: &Database,
    name: &str,
) -> Result<Option<Technician>, RepairdeskError> {
    let name = name.to_string();
    db.connection()
        .call(move |conn| Ok(find_technician_row(conn, &name)?.map(|(_, tech)| tech)))
        .await
        .map_err(map_tr_err)
}

/// Add a technician to the roster. Logins are unique.
pub async fn register_technician(
    db: &Database,
    new: &NewTechnician,
) -> Result<Technician, RepairdeskError> {
    let new = new.clone();
    db.connection()
        .call(move |conn| -> Result<Result<Technician, RepairdeskError>, rusqlite::Error> {
            let tx = conn.transaction()?;
            let taken: Option<i64> = tx
                .query_row(
                    "SELECT user_id FROM users WHERE login = ?1",
                    params![new.login],
                    |row| row.get(0),
                )
                .optional()?;
            if taken.is_some() {
                return Ok(Err(RepairdeskError::Validation(format!(
                    "login `{}` is already taken",
                    new.login
                ))));
            }
            insert_user(&tx, &new.full_name, &new.phone, Some(&new.login), Role::Technician)?;
            tx.commit()?;

            let (surname, first_name, _) = split_full_name(&new.full_name);
            Ok(Ok(Technician {
                login: new.login,
                surname,
                first_name: placeholder_to_empty(first_name),
            }))
        })
        .await
        .map_err(map_tr_err)?
}
