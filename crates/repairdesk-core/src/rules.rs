// SPDX-FileCopyrightText: 2026 Repairdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Search and ordering rules.
//!
//! The JSON backend applies these in memory. The SQLite backend expresses the
//! same rules in SQL; its queries must stay in step with this module.

use std::cmp::Ordering;

use crate::types::Ticket;

/// Queue position of a priority label: `high` < `medium` < `low` < anything else.
pub fn priority_rank(priority: &str) -> u8 {
    match priority {
        "high" => 1,
        "medium" => 2,
        "low" => 3,
        _ => 4,
    }
}

/// Case-insensitive substring match over the nine searchable fields.
pub fn matches_search(ticket: &Ticket, text: &str) -> bool {
    let needle = text.to_lowercase();
    let id = ticket.id.to_string();
    [
        id.as_str(),
        ticket.client_name.as_str(),
        ticket.client_phone.as_str(),
        ticket.device_type.as_str(),
        ticket.device_model.as_str(),
        ticket.problem_description.as_str(),
        ticket.status.as_str(),
        ticket.priority.as_str(),
        ticket.ticket_type.as_str(),
    ]
    .iter()
    .any(|field| field.to_lowercase().contains(&needle))
}

/// Archive order: newest first, ties broken by descending id.
pub fn newest_first(a: &Ticket, b: &Ticket) -> Ordering {
    b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id))
}

/// Technician queue order: priority rank, then oldest first, then id.
pub fn technician_queue(a: &Ticket, b: &Ticket) -> Ordering {
    priority_rank(&a.priority)
        .cmp(&priority_rank(&b.priority))
        .then_with(|| a.created_at.cmp(&b.created_at))
        .then(a.id.cmp(&b.id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::NewTicket;

    fn ticket(id: i64, priority: &str, created_at: &str) -> Ticket {
        let new = NewTicket {
            client_name: "Smirnov Pavel".into(),
            client_phone: "555-0100".into(),
            device_type: "Monitor".into(),
            device_model: "Dell P2419".into(),
            problem_description: "Flickering screen".into(),
            status: "In Progress".into(),
            priority: priority.into(),
            ticket_type: "warranty".into(),
        };
        Ticket::from_new(id, &new, created_at)
    }

    #[test]
    fn rank_orders_high_before_low_before_unknown() {
        assert!(priority_rank("high") < priority_rank("medium"));
        assert!(priority_rank("medium") < priority_rank("low"));
        assert!(priority_rank("low") < priority_rank("urgent"));
        assert_eq!(priority_rank("High"), 4, "ranking is an exact match");
    }

    #[test]
    fn technician_queue_with_equal_dates_is_high_medium_low() {
        let mut tickets = vec![
            ticket(1, "low", "2026-01-01 10:00"),
            ticket(2, "high", "2026-01-01 10:00"),
            ticket(3, "medium", "2026-01-01 10:00"),
        ];
        tickets.sort_by(technician_queue);
        let order: Vec<&str> = tickets.iter().map(|t| t.priority.as_str()).collect();
        assert_eq!(order, vec!["high", "medium", "low"]);
    }

    #[test]
    fn technician_queue_breaks_ties_by_date_then_id() {
        let mut tickets = vec![
            ticket(5, "high", "2026-01-02 10:00"),
            ticket(4, "high", "2026-01-01 10:00"),
            ticket(3, "high", "2026-01-02 10:00"),
        ];
        tickets.sort_by(technician_queue);
        let ids: Vec<i64> = tickets.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![4, 3, 5]);
    }

    #[test]
    fn newest_first_orders_by_date_then_id_descending() {
        let mut tickets = vec![
            ticket(1, "low", "2026-01-01 10:00"),
            ticket(2, "low", "2026-01-03 10:00"),
            ticket(3, "low", "2026-01-01 10:00"),
        ];
        tickets.sort_by(newest_first);
        let ids: Vec<i64> = tickets.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![2, 3, 1]);
    }

    #[test]
    fn search_is_case_insensitive_across_fields() {
        let t = ticket(42, "high", "2026-01-01 10:00");
        assert!(matches_search(&t, "in progress"));
        assert!(matches_search(&t, "DELL"));
        assert!(matches_search(&t, "smirnov"));
        assert!(matches_search(&t, "0100"));
        assert!(matches_search(&t, "42"));
        assert!(matches_search(&t, "WARRANTY"));
        assert!(!matches_search(&t, "keyboard"));
    }

    #[test]
    fn search_ignores_non_searchable_fields() {
        let mut t = ticket(1, "low", "2026-01-01 10:00");
        t.report = "replaced capacitor".into();
        t.operator_group = "night shift".into();
        assert!(!matches_search(&t, "capacitor"));
        assert!(!matches_search(&t, "night"));
    }
}
