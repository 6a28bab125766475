// SPDX-FileCopyrightText: 2026 Repairdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Duplicate ticket detection.

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use crate::types::{Duplicate, Ticket, TicketId};

/// Flag tickets that repeat an earlier ticket from the same phone with the same problem.
///
/// Tickets are visited in ascending id order, so the oldest ticket for a key is
/// the original. Descriptions are compared trimmed and lowercased; there is no
/// fuzzy matching.
pub fn find_duplicates(tickets: &[Ticket]) -> Vec<Duplicate> {
    let mut ordered: Vec<&Ticket> = tickets.iter().collect();
    ordered.sort_by_key(|t| t.id);

    let mut seen: HashMap<(&str, String), TicketId> = HashMap::with_capacity(ordered.len());
    let mut duplicates = Vec::new();

    for ticket in ordered {
        let key = (
            ticket.client_phone.as_str(),
            ticket.problem_description.trim().to_lowercase(),
        );
        match seen.entry(key) {
            Entry::Occupied(original) => duplicates.push(Duplicate {
                duplicate: ticket.id,
                original: *original.get(),
            }),
            Entry::Vacant(slot) => {
                slot.insert(ticket.id);
            }
        }
    }

    duplicates
}
