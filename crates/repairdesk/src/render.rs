// SPDX-FileCopyrightText: 2026 Repairdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Terminal and JSON output for CLI commands.
//!
//! Plain-text layouts are built as strings first so they can be tested
//! without a terminal; colour is only applied when stdout is a TTY and
//! `--plain` was not given.

use std::io::IsTerminal;

use colored::Colorize;
use repairdesk_core::{Duplicate, Message, RepairdeskError, Technician, Ticket, TicketId};
use serde::Serialize;

/// Where and how command results are written.
#[derive(Debug, Clone, Copy)]
pub struct Output {
    json: bool,
    color: bool,
}

/// Result of a command that changes a ticket but returns nothing.
#[derive(Debug, Serialize)]
struct Ack<'a> {
    ticket_id: Option<TicketId>,
    result: &'a str,
}

impl Output {
    pub fn new(json: bool, plain: bool) -> Self {
        Self {
            json,
            color: !json && !plain && std::io::stdout().is_terminal(),
        }
    }

    pub fn is_json(&self) -> bool {
        self.json
    }

    pub fn tickets(&self, tickets: &[Ticket]) -> Result<(), RepairdeskError> {
        if self.json {
            return print_json(&tickets);
        }
        print!("{}", format_table(tickets, self.color));
        Ok(())
    }

    pub fn ticket(&self, ticket: &Ticket) -> Result<(), RepairdeskError> {
        if self.json {
            return print_json(ticket);
        }
        print!("{}", format_detail(ticket, self.color));
        Ok(())
    }

    pub fn duplicates(&self, found: &[Duplicate], removed: bool) -> Result<(), RepairdeskError> {
        if self.json {
            return print_json(&found);
        }
        print!("{}", format_duplicates(found, removed));
        Ok(())
    }

    pub fn technician(&self, tech: &Technician) -> Result<(), RepairdeskError> {
        if self.json {
            return print_json(tech);
        }
        self.done(None, &format!("technician {} ({}) registered", tech.surname, tech.login))
    }

    /// Confirm a change.
    pub fn done(&self, ticket_id: Option<TicketId>, result: &str) -> Result<(), RepairdeskError> {
        if self.json {
            return print_json(&Ack { ticket_id, result });
        }
        if self.color {
            println!("  {} {result}", "✓".green());
        } else {
            println!("  [OK] {result}");
        }
        Ok(())
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), RepairdeskError> {
    let body = serde_json::to_string_pretty(value)
        .map_err(|e| RepairdeskError::Internal(format!("failed to encode output: {e}")))?;
    println!("{body}");
    Ok(())
}

const HEADERS: [&str; 8] = [
    "ID", "STATUS", "PRIORITY", "DEVICE", "CLIENT", "PHONE", "TECHNICIAN", "CREATED",
];

fn row(t: &Ticket) -> [String; 8] {
    [
        t.id.to_string(),
        t.status.clone(),
        t.priority.clone(),
        format!("{} {}", t.device_type, t.device_model),
        t.client_name.clone(),
        t.client_phone.clone(),
        t.technician.clone().unwrap_or_else(|| "-".to_string()),
        t.created_at.clone(),
    ]
}

/// Fixed-width ticket table, one row per ticket in the given order.
pub fn format_table(tickets: &[Ticket], color: bool) -> String {
    if tickets.is_empty() {
        return "  no tickets\n".to_string();
    }

    let rows: Vec<[String; 8]> = tickets.iter().map(row).collect();
    let mut widths = HEADERS.map(|h| h.chars().count());
    for r in &rows {
        for (w, cell) in widths.iter_mut().zip(r) {
            *w = (*w).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    let header: Vec<String> = HEADERS
        .iter()
        .zip(widths)
        .map(|(h, w)| format!("{h:<w$}"))
        .collect();
    let header = header.join("  ");
    if color {
        out.push_str(&format!("  {}\n", header.trim_end().bold()));
    } else {
        out.push_str(&format!("  {}\n", header.trim_end()));
    }

    for (r, t) in rows.iter().zip(tickets) {
        let cells: Vec<String> = r
            .iter()
            .zip(widths)
            .enumerate()
            .map(|(i, (cell, w))| {
                let padded = format!("{cell:<w$}");
                match i {
                    2 if color => paint_priority(&t.priority, &padded),
                    _ => padded,
                }
            })
            .collect();
        out.push_str(&format!("  {}\n", cells.join("  ").trim_end()));
    }
    out
}

fn paint_priority(priority: &str, text: &str) -> String {
    match priority {
        "high" => text.red().to_string(),
        "medium" => text.yellow().to_string(),
        _ => text.to_string(),
    }
}

fn or_dash(s: &str) -> &str {
    if s.is_empty() { "-" } else { s }
}

fn yes_no(flag: bool, yes: &'static str) -> &'static str {
    if flag { yes } else { "no" }
}

/// `[created_at] role author: text`
pub fn history_line(m: &Message) -> String {
    format!("[{}] {} {}: {}", m.created_at, m.author_role, m.author_name, m.text)
}

/// Full view of one ticket with its history and attachments.
pub fn format_detail(t: &Ticket, color: bool) -> String {
    let mut out = String::new();
    let title = format!("Ticket #{}", t.id);
    let title = if color { title.bold().to_string() } else { title };
    out.push_str(&format!("\n  {title}  [{}]  priority: {}\n", t.status, t.priority));
    out.push_str(&format!("  {}\n", "-".repeat(50)));

    let observers = t.observers.join(", ");
    let fields = [
        ("Device", format!("{} / {}", t.device_type, t.device_model)),
        ("Problem", t.problem_description.clone()),
        ("Client", format!("{} ({})", t.client_name, t.client_phone)),
        ("Type", t.ticket_type.clone()),
        ("Group", or_dash(&t.operator_group).to_string()),
        ("Responsible", or_dash(&t.responsible_operator).to_string()),
        ("Observers", or_dash(&observers).to_string()),
        ("Technician", t.technician.as_deref().unwrap_or("-").to_string()),
        ("Parts", yes_no(t.requires_parts, "requested").to_string()),
        ("Notify", yes_no(t.notify_client, "pending").to_string()),
        ("Report", or_dash(&t.report).to_string()),
        ("Created", t.created_at.clone()),
        ("Updated", t.updated_at.clone()),
    ];
    for (label, value) in fields {
        out.push_str(&format!("    {:<12} {value}\n", format!("{label}:")));
    }

    out.push_str("\n  History\n");
    if t.messages.is_empty() {
        out.push_str("    (none)\n");
    }
    for m in &t.messages {
        out.push_str(&format!("    {}\n", history_line(m)));
    }

    if !t.attachments.is_empty() {
        out.push_str("\n  Attachments\n");
        for a in &t.attachments {
            out.push_str(&format!(
                "    {} - {} (by {} at {})\n",
                a.file_path,
                or_dash(&a.description),
                or_dash(&a.uploaded_by),
                a.uploaded_at
            ));
        }
    }
    out.push('\n');
    out
}

pub fn format_duplicates(found: &[Duplicate], removed: bool) -> String {
    if found.is_empty() {
        return "  no duplicates found\n".to_string();
    }
    let verb = if removed { "removed" } else { "duplicate of" };
    let mut out = String::new();
    for d in found {
        if removed {
            out.push_str(&format!("  #{} {verb} (kept #{})\n", d.duplicate, d.original));
        } else {
            out.push_str(&format!("  #{} {verb} #{}\n", d.duplicate, d.original));
        }
    }
    let word = if found.len() == 1 { "ticket" } else { "tickets" };
    out.push_str(&format!("  {} {word}\n", found.len()));
    out
}
