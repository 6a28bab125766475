// SPDX-FileCopyrightText: 2026 Repairdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The same scenarios run against both backends and must agree.

use std::sync::Arc;

use repairdesk_config::model::StorageConfig;
use repairdesk_core::duplicates::find_duplicates;
use repairdesk_core::{
    Author, NewTechnician, NewTicket, RepairdeskError, StorageBackend, TicketPatch,
    TicketStore,
};
use repairdesk_storage::open_store;
use tempfile::TempDir;

async fn backends(dir: &TempDir) -> Vec<Arc<dyn TicketStore>> {
    let mut stores = Vec::new();
    for backend in [StorageBackend::Sqlite, StorageBackend::Json] {
        let config = StorageConfig {
            backend,
            database_path: dir.path().join("desk.db").to_string_lossy().into_owned(),
            wal_mode: true,
            json_path: dir
                .path()
                .join("tickets_data.json")
                .to_string_lossy()
                .into_owned(),
        };
        stores.push(open_store(&config).await.unwrap());
    }
    stores
}

fn ticket(phone: &str, problem: &str, status: &str, priority: &str) -> NewTicket {
    NewTicket {
        client_name: "Volkova Elena".into(),
        client_phone: phone.into(),
        device_type: "printer".into(),
        device_model: "LaserJet 1020".into(),
        problem_description: problem.into(),
        status: status.into(),
        priority: priority.into(),
        ticket_type: "standard".into(),
    }
}

fn kuznetsov() -> NewTechnician {
    NewTechnician {
        login: "okuz".into(),
        full_name: "Kuznetsov Oleg".into(),
        phone: "555-0001".into(),
    }
}

#[tokio::test]
async fn created_ids_are_strictly_new_with_default_status() {
    let dir = tempfile::tempdir().unwrap();
    for store in backends(&dir).await {
        let mut seen = Vec::new();
        for i in 0..5 {
            let t = store
                .create_ticket(&ticket("100", &format!("problem {i}"), "new", "medium"))
                .await
                .unwrap();
            assert_eq!(t.status, "new", "{}", store.name());
            assert!(seen.iter().all(|&id| t.id > id), "{}", store.name());
            seen.push(t.id);
        }
        // Deleting the newest must not free its id.
        let last = *seen.last().unwrap();
        assert!(store.delete_ticket(last).await.unwrap());
        let next = store
            .create_ticket(&ticket("100", "again", "new", "medium"))
            .await
            .unwrap();
        assert!(next.id > last, "{}", store.name());
    }
}

#[tokio::test]
async fn status_search_is_case_insensitive_and_exact() {
    let dir = tempfile::tempdir().unwrap();
    for store in backends(&dir).await {
        let waiting = store
            .create_ticket(&ticket("1", "no toner", "Awaiting Parts", "low"))
            .await
            .unwrap();
        store
            .create_ticket(&ticket("2", "jam", "new", "low"))
            .await
            .unwrap();
        store
            .create_ticket(&ticket("3", "noise", "done", "low"))
            .await
            .unwrap();

        let found = store.search_tickets("awaiting parts").await.unwrap();
        let ids: Vec<_> = found.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![waiting.id], "{}", store.name());

        let upper = store.search_tickets("AWAITING").await.unwrap();
        assert_eq!(upper.len(), 1, "{}", store.name());
    }
}

#[tokio::test]
async fn search_folds_cyrillic_case() {
    let dir = tempfile::tempdir().unwrap();
    for store in backends(&dir).await {
        let mut new = ticket("1", "Не печатает", "В работе", "high");
        new.device_type = "Принтер".into();
        let t = store.create_ticket(&new).await.unwrap();
        store
            .create_ticket(&ticket("2", "jam", "Готова к выдаче", "low"))
            .await
            .unwrap();

        for query in ["в работе", "В РАБОТЕ", "принтер", "не печатает"] {
            let ids: Vec<_> = store
                .search_tickets(query)
                .await
                .unwrap()
                .iter()
                .map(|t| t.id)
                .collect();
            assert_eq!(ids, vec![t.id], "{}: {query}", store.name());
        }
        assert_eq!(store.search_tickets("готова").await.unwrap().len(), 1);
    }
}

#[tokio::test]
async fn technician_messages_are_signed_with_surname_and_first_name() {
    let dir = tempfile::tempdir().unwrap();
    for store in backends(&dir).await {
        let tech = store.register_technician(&kuznetsov()).await.unwrap();
        let t = store
            .create_ticket(&ticket("1", "jam", "new", "low"))
            .await
            .unwrap();
        let author = Author::technician(tech.display_name());
        store
            .add_message(t.id, &author, "parts order requested")
            .await
            .unwrap();
        store
            .add_attachment(t.id, &author, "/photos/site.jpg", "repair site photo")
            .await
            .unwrap();

        let t = store.get_ticket(t.id).await.unwrap().unwrap();
        assert_eq!(t.messages[0].author_role, "technician", "{}", store.name());
        assert_eq!(t.messages[0].author_name, "Kuznetsov Oleg", "{}", store.name());
        assert_eq!(t.attachments[0].uploaded_by, "Kuznetsov Oleg", "{}", store.name());
    }
}

#[tokio::test]
async fn search_covers_phone_model_and_id() {
    let dir = tempfile::tempdir().unwrap();
    for store in backends(&dir).await {
        let t = store
            .create_ticket(&ticket("+7 912 555-44-33", "cracked glass", "new", "high"))
            .await
            .unwrap();
        assert_eq!(store.search_tickets("555-44").await.unwrap().len(), 1);
        assert_eq!(store.search_tickets("laserjet").await.unwrap().len(), 1);
        assert_eq!(store.search_tickets("volkova").await.unwrap().len(), 1);
        assert_eq!(
            store.search_tickets(&t.id.to_string()).await.unwrap()[0].id,
            t.id
        );
        assert!(store.search_tickets("toaster").await.unwrap().is_empty());
    }
}

#[tokio::test]
async fn unknown_technician_leaves_assignment_unchanged() {
    let dir = tempfile::tempdir().unwrap();
    for store in backends(&dir).await {
        store.register_technician(&kuznetsov()).await.unwrap();
        let t = store
            .create_ticket(&ticket("1", "jam", "new", "medium"))
            .await
            .unwrap();
        store
            .apply_patch(
                t.id,
                &TicketPatch {
                    technician: Some("Kuznetsov".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        let assigned = store.get_ticket(t.id).await.unwrap().unwrap();
        assert_eq!(assigned.technician.as_deref(), Some("Kuznetsov"));

        let err = store
            .apply_patch(
                t.id,
                &TicketPatch {
                    technician: Some("Nobody".into()),
                    report: Some("should not be written".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(
            matches!(err, RepairdeskError::TechnicianNotFound(ref name) if name == "Nobody"),
            "{}: {err}",
            store.name()
        );
        let after = store.get_ticket(t.id).await.unwrap().unwrap();
        assert_eq!(after, assigned, "{}", store.name());
    }
}

#[tokio::test]
async fn technician_queue_is_high_medium_low() {
    let dir = tempfile::tempdir().unwrap();
    for store in backends(&dir).await {
        let tech = store.register_technician(&kuznetsov()).await.unwrap();
        for priority in ["low", "high", "medium"] {
            let t = store
                .create_ticket(&ticket("1", priority, "new", priority))
                .await
                .unwrap();
            store
                .apply_patch(
                    t.id,
                    &TicketPatch {
                        technician: Some("okuz".into()),
                        ..Default::default()
                    },
                )
                .await
                .unwrap();
        }
        // Unassigned tickets stay out of the queue.
        store
            .create_ticket(&ticket("2", "other", "new", "high"))
            .await
            .unwrap();

        let queue = store.list_technician_tickets(&tech).await.unwrap();
        let order: Vec<&str> = queue.iter().map(|t| t.priority.as_str()).collect();
        assert_eq!(order, vec!["high", "medium", "low"], "{}", store.name());
    }
}

#[tokio::test]
async fn listings_are_newest_first_and_filter_by_exact_phone() {
    let dir = tempfile::tempdir().unwrap();
    for store in backends(&dir).await {
        let a = store
            .create_ticket(&ticket("111", "a", "new", "low"))
            .await
            .unwrap();
        let b = store
            .create_ticket(&ticket("222", "b", "new", "low"))
            .await
            .unwrap();
        let c = store
            .create_ticket(&ticket("111", "c", "new", "low"))
            .await
            .unwrap();

        let all: Vec<_> = store
            .list_tickets()
            .await
            .unwrap()
            .iter()
            .map(|t| t.id)
            .collect();
        assert_eq!(all, vec![c.id, b.id, a.id], "{}", store.name());

        let mine: Vec<_> = store
            .list_client_tickets("111")
            .await
            .unwrap()
            .iter()
            .map(|t| t.id)
            .collect();
        assert_eq!(mine, vec![c.id, a.id], "{}", store.name());
        assert!(store.list_client_tickets("11").await.unwrap().is_empty());
    }
}

#[tokio::test]
async fn history_is_append_only_and_ordered() {
    let dir = tempfile::tempdir().unwrap();
    for store in backends(&dir).await {
        let t = store
            .create_ticket(&ticket("1", "jam", "new", "low"))
            .await
            .unwrap();
        store
            .add_message(t.id, &Author::client(""), "first")
            .await
            .unwrap();
        store
            .add_message(t.id, &Author::operator("Ivanova Maria"), "second")
            .await
            .unwrap();
        store
            .add_attachment(t.id, &Author::client(""), "/tmp/receipt.pdf", "client file")
            .await
            .unwrap();

        let t = store.get_ticket(t.id).await.unwrap().unwrap();
        let texts: Vec<&str> = t.messages.iter().map(|m| m.text.as_str()).collect();
        assert_eq!(texts, vec!["first", "second"], "{}", store.name());
        assert_eq!(t.messages[0].author_role, "client");
        assert_eq!(t.messages[0].author_name, "Volkova Elena");
        assert_eq!(t.messages[1].author_name, "Ivanova Maria");
        assert_eq!(t.attachments.len(), 1);
        assert_eq!(t.attachments[0].file_path, "/tmp/receipt.pdf");
        assert_eq!(t.attachments[0].description, "client file");
        assert_eq!(t.attachments[0].uploaded_by, "Volkova Elena");
    }
}

#[tokio::test]
async fn patch_changes_only_present_fields() {
    let dir = tempfile::tempdir().unwrap();
    for store in backends(&dir).await {
        let t = store
            .create_ticket(&ticket("1", "jam", "new", "low"))
            .await
            .unwrap();
        store
            .apply_patch(
                t.id,
                &TicketPatch {
                    operator_group: Some("front desk".into()),
                    observers: Some(vec!["Sidorov".into()]),
                    notify_client: Some(true),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        let after = store.get_ticket(t.id).await.unwrap().unwrap();
        assert_eq!(after.operator_group, "front desk");
        assert_eq!(after.observers, vec!["Sidorov"]);
        assert!(after.notify_client);
        assert_eq!(after.priority, "low", "{}", store.name());
        assert_eq!(after.problem_description, "jam");
        assert_eq!(after.status, "new");
    }
}

#[tokio::test]
async fn duplicates_over_stored_tickets() {
    let dir = tempfile::tempdir().unwrap();
    for store in backends(&dir).await {
        let a = store
            .create_ticket(&ticket("P", "Paper jam", "new", "low"))
            .await
            .unwrap();
        let b = store
            .create_ticket(&ticket("P", "  paper JAM ", "new", "low"))
            .await
            .unwrap();
        store
            .create_ticket(&ticket("P2", "Paper jam", "new", "low"))
            .await
            .unwrap();

        let found = find_duplicates(&store.list_tickets().await.unwrap());
        assert_eq!(found.len(), 1, "{}", store.name());
        assert_eq!(found[0].duplicate, b.id);
        assert_eq!(found[0].original, a.id);
    }
}

#[tokio::test]
async fn missing_ticket_is_reported_consistently() {
    let dir = tempfile::tempdir().unwrap();
    for store in backends(&dir).await {
        assert!(store.get_ticket(999).await.unwrap().is_none());
        assert!(!store.delete_ticket(999).await.unwrap());
        let err = store
            .add_message(999, &Author::operator("Ivanova"), "x")
            .await
            .unwrap_err();
        assert!(matches!(err, RepairdeskError::TicketNotFound(999)));
        let err = store
            .apply_patch(
                999,
                &TicketPatch {
                    status: Some("done".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, RepairdeskError::TicketNotFound(999)));
    }
}
