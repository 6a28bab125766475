// SPDX-FileCopyrightText: 2026 Repairdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Request (ticket) CRUD, listing, and search.
//!
//! Reads go through the `ticket_rows` view, which flattens the joins to the
//! ticket shape. Ordering and search mirror `repairdesk_core::rules`.

use repairdesk_core::{NewTicket, RepairdeskError, Ticket, TicketId, TicketPatch};
use rusqlite::types::{Type, Value};
use rusqlite::{Connection, OptionalExtension, Row, params, params_from_iter};
use tracing::{debug, info};

use crate::database::{Database, map_tr_err};
use crate::queries::{attachments, comments, equipment, statuses, users};

const TICKET_COLUMNS: &str = "request_id, device_type, device_model, problem_description, \
     client_name, client_phone, status, priority, request_type, operator_group, \
     responsible_operator, observers, master_lastname, requires_parts, created_at, \
     updated_at, report, notify_client";

const NEWEST_FIRST: &str = "ORDER BY created_at DESC, request_id DESC";

const TECHNICIAN_QUEUE: &str = "ORDER BY CASE priority
         WHEN 'high' THEN 1
         WHEN 'medium' THEN 2
         WHEN 'low' THEN 3
         ELSE 4
     END, created_at ASC, request_id ASC";

fn ticket_from_row(row: &Row<'_>) -> rusqlite::Result<Ticket> {
    let observers: String = row.get(11)?;
    let observers: Vec<String> = serde_json::from_str(&observers)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(11, Type::Text, Box::new(e)))?;
    Ok(Ticket {
        id: row.get(0)?,
        device_type: row.get(1)?,
        device_model: row.get(2)?,
        problem_description: row.get(3)?,
        client_name: row.get(4)?,
        client_phone: row.get(5)?,
        status: row.get(6)?,
        priority: row.get(7)?,
        ticket_type: row.get(8)?,
        operator_group: row.get(9)?,
        responsible_operator: row.get(10)?,
        observers,
        technician: row.get(12)?,
        messages: Vec::new(),
        attachments: Vec::new(),
        requires_parts: row.get(13)?,
        created_at: row.get(14)?,
        updated_at: row.get(15)?,
        report: row.get(16)?,
        notify_client: row.get(17)?,
    })
}

/// Run a `ticket_rows` query and attach each ticket's history.
fn load_tickets(
    conn: &Connection,
    filter: &str,
    order: &str,
    args: &[&dyn rusqlite::ToSql],
) -> rusqlite::Result<Vec<Ticket>> {
    let sql = format!("SELECT {TICKET_COLUMNS} FROM ticket_rows {filter} {order}");
    let mut stmt = conn.prepare(&sql)?;
    let mut tickets = stmt
        .query_map(args, ticket_from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    for ticket in &mut tickets {
        ticket.messages = comments::history_for(conn, ticket.id)?;
        ticket.attachments = attachments::attachments_for(conn, ticket.id)?;
    }
    Ok(tickets)
}

fn fetch_ticket(conn: &Connection, id: TicketId) -> rusqlite::Result<Option<Ticket>> {
    let ticket = conn
        .query_row(
            &format!("SELECT {TICKET_COLUMNS} FROM ticket_rows WHERE request_id = ?1"),
            params![id],
            ticket_from_row,
        )
        .optional()?;
    match ticket {
        Some(mut ticket) => {
            ticket.messages = comments::history_for(conn, id)?;
            ticket.attachments = attachments::attachments_for(conn, id)?;
            Ok(Some(ticket))
        }
        None => Ok(None),
    }
}

/// Escape `LIKE` wildcards so the search text matches literally.
fn like_pattern(text: &str) -> String {
    let escaped = text
        .to_lowercase()
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

/// Create a request. Client, equipment, and status lookups share one transaction
/// with the insert.
pub async fn create_ticket(
    db: &Database,
    new: &NewTicket,
    now: &str,
) -> Result<Ticket, RepairdeskError> {
    let new = new.clone();
    let now = now.to_string();
    let ticket = db
        .connection()
        .call(move |conn| {
            let tx = conn.transaction()?;
            let client_id = users::find_or_create_client(&tx, &new.client_name, &new.client_phone)?;
            let type_id = equipment::find_or_create_type(&tx, &new.device_type)?;
            let equipment_id = equipment::find_or_create_equipment(&tx, type_id, &new.device_model)?;
            let status_id = statuses::find_or_create_status(&tx, &new.status)?;
            tx.execute(
                "INSERT INTO requests (equipment_id, problem_description, status_id, client_id,
                                       priority, request_type, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)",
                params![
                    equipment_id,
                    new.problem_description,
                    status_id,
                    client_id,
                    new.priority,
                    new.ticket_type,
                    now,
                ],
            )?;
            let id = tx.last_insert_rowid();
            let ticket = fetch_ticket(&tx, id)?.ok_or(rusqlite::Error::QueryReturnedNoRows)?;
            tx.commit()?;
            Ok(ticket)
        })
        .await
        .map_err(map_tr_err)?;
    info!(ticket = ticket.id, "ticket created");
    Ok(ticket)
}

pub async fn get_ticket(db: &Database, id: TicketId) -> Result<Option<Ticket>, RepairdeskError> {
    db.connection()
        .call(move |conn| fetch_ticket(conn, id))
        .await
        .map_err(map_tr_err)
}

/// All requests, newest first.
pub async fn list_tickets(db: &Database) -> Result<Vec<Ticket>, RepairdeskError> {
    db.connection()
        .call(|conn| load_tickets(conn, "", NEWEST_FIRST, &[]))
        .await
        .map_err(map_tr_err)
}

/// Requests whose client phone matches exactly, newest first.
pub async fn list_client_tickets(
    db: &Database,
    phone: &str,
) -> Result<Vec<Ticket>, RepairdeskError> {
    let phone = phone.to_string();
    db.connection()
        .call(move |conn| {
            load_tickets(conn, "WHERE client_phone = ?1", NEWEST_FIRST, &[&phone])
        })
        .await
        .map_err(map_tr_err)
}

/// Requests assigned to the technician with this surname, in queue order.
pub async fn list_technician_tickets(
    db: &Database,
    surname: &str,
) -> Result<Vec<Ticket>, RepairdeskError> {
    let surname = surname.to_string();
    db.connection()
        .call(move |conn| {
            load_tickets(conn, "WHERE master_lastname = ?1", TECHNICIAN_QUEUE, &[&surname])
        })
        .await
        .map_err(map_tr_err)
}

/// Case-insensitive substring search over the nine searchable columns.
pub async fn search_tickets(db: &Database, text: &str) -> Result<Vec<Ticket>, RepairdeskError> {
    let pattern = like_pattern(text);
    debug!(pattern = %pattern, "searching tickets");
    db.connection()
        .call(move |conn| {
            load_tickets(
                conn,
                "WHERE CAST(request_id AS TEXT) LIKE ?1 ESCAPE '\\'
                    OR unicode_lower(client_name) LIKE ?1 ESCAPE '\\'
                    OR unicode_lower(client_phone) LIKE ?1 ESCAPE '\\'
                    OR unicode_lower(device_type) LIKE ?1 ESCAPE '\\'
                    OR unicode_lower(device_model) LIKE ?1 ESCAPE '\\'
                    OR unicode_lower(problem_description) LIKE ?1 ESCAPE '\\'
                    OR unicode_lower(status) LIKE ?1 ESCAPE '\\'
                    OR unicode_lower(priority) LIKE ?1 ESCAPE '\\'
                    OR unicode_lower(request_type) LIKE ?1 ESCAPE '\\'",
                NEWEST_FIRST,
                &[&pattern],
            )
        })
        .await
        .map_err(map_tr_err)
}

/// Apply the present fields of `patch` in one statement.
///
/// The technician is resolved before anything is written; an unknown name
/// leaves the request untouched.
pub async fn apply_patch(
    db: &Database,
    id: TicketId,
    patch: &TicketPatch,
    now: &str,
) -> Result<(), RepairdeskError> {
    let patch = patch.clone();
    let now = now.to_string();
    db.connection()
        .call(move |conn| -> Result<Result<(), RepairdeskError>, rusqlite::Error> {
            let tx = conn.transaction()?;
            let type_id: Option<i64> = tx
                .query_row(
                    "SELECT e.type_id FROM requests r
                     JOIN equipment e ON r.equipment_id = e.equipment_id
                     WHERE r.request_id = ?1",
                    params![id],
                    |row| row.get(0),
                )
                .optional()?;
            let Some(type_id) = type_id else {
                return Ok(Err(RepairdeskError::TicketNotFound(id)));
            };

            let master_id = match &patch.technician {
                Some(name) => match users::find_technician_row(&tx, name)? {
                    Some((user_id, _)) => Some(user_id),
                    None => return Ok(Err(RepairdeskError::TechnicianNotFound(name.clone()))),
                },
                None => None,
            };

            if patch.is_empty() {
                return Ok(Ok(()));
            }

            let mut sets: Vec<(&str, Value)> = Vec::new();
            if let Some(v) = &patch.problem_description {
                sets.push(("problem_description", Value::Text(v.clone())));
            }
            if let Some(model) = &patch.device_model {
                let equipment_id = equipment::find_or_create_equipment(&tx, type_id, model)?;
                sets.push(("equipment_id", Value::Integer(equipment_id)));
            }
            if let Some(v) = &patch.operator_group {
                sets.push(("operator_group", Value::Text(v.clone())));
            }
            if let Some(v) = &patch.responsible_operator {
                sets.push(("responsible_operator", Value::Text(v.clone())));
            }
            if let Some(v) = &patch.observers {
                let encoded = serde_json::to_string(v)
                    .map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))?;
                sets.push(("observers", Value::Text(encoded)));
            }
            if let Some(status) = &patch.status {
                let status_id = statuses::find_or_create_status(&tx, status)?;
                sets.push(("status_id", Value::Integer(status_id)));
            }
            if let Some(v) = &patch.priority {
                sets.push(("priority", Value::Text(v.clone())));
            }
            if let Some(v) = &patch.ticket_type {
                sets.push(("request_type", Value::Text(v.clone())));
            }
            if let Some(master_id) = master_id {
                sets.push(("master_id", Value::Integer(master_id)));
            }
            if let Some(v) = patch.requires_parts {
                sets.push(("requires_parts", Value::Integer(i64::from(v))));
            }
            if let Some(v) = &patch.report {
                sets.push(("report", Value::Text(v.clone())));
            }
            if let Some(v) = patch.notify_client {
                sets.push(("notify_client", Value::Integer(i64::from(v))));
            }
            sets.push(("updated_at", Value::Text(now)));

            let assignments = sets
                .iter()
                .enumerate()
                .map(|(i, (column, _))| format!("{column} = ?{}", i + 1))
                .collect::<Vec<_>>()
                .join(", ");
            let sql = format!(
                "UPDATE requests SET {assignments} WHERE request_id = ?{}",
                sets.len() + 1
            );
            let mut values: Vec<Value> = sets.into_iter().map(|(_, v)| v).collect();
            values.push(Value::Integer(id));

            debug!(sql = %sql, "applying patch");
            tx.execute(&sql, params_from_iter(values))?;
            tx.commit()?;
            Ok(Ok(()))
        })
        .await
        .map_err(map_tr_err)?
}

/// Delete a request; comments and attachments cascade.
pub async fn delete_ticket(db: &Database, id: TicketId) -> Result<bool, RepairdeskError> {
    let removed = db
        .connection()
        .call(move |conn| {
            let n = conn.execute("DELETE FROM requests WHERE request_id = ?1", params![id])?;
            Ok(n > 0)
        })
        .await
        .map_err(map_tr_err)?;
    if removed {
        info!(ticket = id, "ticket deleted");
    }
    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use repairdesk_core::{Author, NewTechnician};

    async fn setup_db() -> Database {
        Database::open(":memory:", false).await.unwrap()
    }

    fn new_ticket(phone: &str, model: &str, problem: &str) -> NewTicket {
        NewTicket {
            client_name: "Petrova Anna".into(),
            client_phone: phone.into(),
            device_type: "printer".into(),
            device_model: model.into(),
            problem_description: problem.into(),
            status: "new".into(),
            priority: "medium".into(),
            ticket_type: "standard".into(),
        }
    }

    async fn count(db: &Database, table: &'static str) -> i64 {
        db.connection()
            .call(move |conn| -> Result<i64, rusqlite::Error> {
                conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| {
                    row.get(0)
                })
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn create_returns_flattened_ticket() {
        let db = setup_db().await;
        let t = create_ticket(&db, &new_ticket("111", "M1", "jam"), "2026-01-01 10:00")
            .await
            .unwrap();
        assert_eq!(t.client_name, "Petrova Anna");
        assert_eq!(t.device_type, "printer");
        assert_eq!(t.status, "new");
        assert_eq!(t.technician, None);
        assert!(t.observers.is_empty());
        assert_eq!(t.created_at, "2026-01-01 10:00");
        assert_eq!(t.updated_at, "2026-01-01 10:00");
    }

    #[tokio::test]
    async fn ids_are_not_reused_after_delete() {
        let db = setup_db().await;
        let a = create_ticket(&db, &new_ticket("1", "M", "a"), "2026-01-01 10:00")
            .await
            .unwrap();
        assert!(delete_ticket(&db, a.id).await.unwrap());
        let b = create_ticket(&db, &new_ticket("1", "M", "b"), "2026-01-01 10:00")
            .await
            .unwrap();
        assert!(b.id > a.id);
    }

    #[tokio::test]
    async fn delete_cascades_history() {
        let db = setup_db().await;
        let t = create_ticket(&db, &new_ticket("1", "M", "a"), "2026-01-01 10:00")
            .await
            .unwrap();
        comments::add_message(&db, t.id, &Author::client(""), "hello", "2026-01-01 10:05")
            .await
            .unwrap();
        attachments::add_attachment(
            &db,
            t.id,
            &Author::client(""),
            "a.jpg",
            "client file",
            "2026-01-01 10:06",
        )
        .await
        .unwrap();
        assert_eq!(count(&db, "comments").await, 1);

        assert!(delete_ticket(&db, t.id).await.unwrap());
        assert_eq!(count(&db, "comments").await, 0);
        assert_eq!(count(&db, "attachments").await, 0);
        assert!(!delete_ticket(&db, t.id).await.unwrap());
    }

    #[tokio::test]
    async fn model_patch_repoints_instead_of_renaming_shared_row() {
        let db = setup_db().await;
        let a = create_ticket(&db, &new_ticket("1", "M1", "a"), "2026-01-01 10:00")
            .await
            .unwrap();
        let b = create_ticket(&db, &new_ticket("2", "M1", "b"), "2026-01-01 10:00")
            .await
            .unwrap();
        let patch = TicketPatch {
            device_model: Some("M2".into()),
            ..Default::default()
        };
        apply_patch(&db, a.id, &patch, "2026-01-02 10:00").await.unwrap();

        let a = get_ticket(&db, a.id).await.unwrap().unwrap();
        let b = get_ticket(&db, b.id).await.unwrap().unwrap();
        assert_eq!(a.device_model, "M2");
        assert_eq!(b.device_model, "M1");
        assert_eq!(a.updated_at, "2026-01-02 10:00");
    }

    #[tokio::test]
    async fn unknown_technician_leaves_request_untouched() {
        let db = setup_db().await;
        let t = create_ticket(&db, &new_ticket("1", "M", "a"), "2026-01-01 10:00")
            .await
            .unwrap();
        let patch = TicketPatch {
            technician: Some("Nobody".into()),
            priority: Some("high".into()),
            ..Default::default()
        };
        let err = apply_patch(&db, t.id, &patch, "2026-01-02 10:00")
            .await
            .unwrap_err();
        assert!(matches!(err, RepairdeskError::TechnicianNotFound(name) if name == "Nobody"));

        let after = get_ticket(&db, t.id).await.unwrap().unwrap();
        assert_eq!(after, t);
    }

    #[tokio::test]
    async fn technician_patch_assigns_by_login() {
        let db = setup_db().await;
        users::register_technician(
            &db,
            &NewTechnician {
                login: "okuz".into(),
                full_name: "Kuznetsov Oleg".into(),
                phone: "".into(),
            },
        )
        .await
        .unwrap();
        let t = create_ticket(&db, &new_ticket("1", "M", "a"), "2026-01-01 10:00")
            .await
            .unwrap();
        let patch = TicketPatch {
            technician: Some("okuz".into()),
            ..Default::default()
        };
        apply_patch(&db, t.id, &patch, "2026-01-02 10:00").await.unwrap();

        let assigned = list_technician_tickets(&db, "Kuznetsov").await.unwrap();
        assert_eq!(assigned.len(), 1);
        assert_eq!(assigned[0].technician.as_deref(), Some("Kuznetsov"));
    }

    #[tokio::test]
    async fn patch_unknown_ticket_is_not_found() {
        let db = setup_db().await;
        let err = apply_patch(&db, 99, &TicketPatch::default(), "2026-01-01 10:00")
            .await
            .unwrap_err();
        assert!(matches!(err, RepairdeskError::TicketNotFound(99)));
    }

    #[tokio::test]
    async fn search_treats_wildcards_literally() {
        let db = setup_db().await;
        create_ticket(&db, &new_ticket("1", "M", "100% broken"), "2026-01-01 10:00")
            .await
            .unwrap();
        create_ticket(&db, &new_ticket("2", "M", "100 broken"), "2026-01-01 10:00")
            .await
            .unwrap();
        let found = search_tickets(&db, "0%").await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].problem_description, "100% broken");
        assert_eq!(search_tickets(&db, "_").await.unwrap().len(), 0);
    }

    #[tokio::test]
    async fn observers_round_trip_through_json_column() {
        let db = setup_db().await;
        let t = create_ticket(&db, &new_ticket("1", "M", "a"), "2026-01-01 10:00")
            .await
            .unwrap();
        let patch = TicketPatch {
            observers: Some(vec!["Sidorov".into(), "Orlova Irina".into()]),
            ..Default::default()
        };
        apply_patch(&db, t.id, &patch, "2026-01-01 11:00").await.unwrap();
        let t = get_ticket(&db, t.id).await.unwrap().unwrap();
        assert_eq!(t.observers, vec!["Sidorov", "Orlova Irina"]);
    }

    #[test]
    fn like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("A_b%"), "%a\\_b\\%%");
    }
}
