// SPDX-FileCopyrightText: 2026 Repairdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Ticket domain types shared by every storage backend and role desk.
//!
//! The serde attributes define the on-disk JSON layout. Field names follow the
//! existing `tickets_data.json` files, so a few Rust names differ from their
//! serialized keys (`id` is `ticket_id`, `messages` is `history`,
//! `technician` is `assigned_master`).

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Ticket identifier. Assigned by the backend, never reused.
pub type TicketId = i64;

pub const DEFAULT_STATUS: &str = "new";
pub const DEFAULT_PRIORITY: &str = "medium";
pub const DEFAULT_TICKET_TYPE: &str = "standard";

/// Timestamp layout for every stored date: local time to the minute.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Current local time in [`TIMESTAMP_FORMAT`].
pub fn now_timestamp() -> String {
    chrono::Local::now().format(TIMESTAMP_FORMAT).to_string()
}

/// Health status reported by backend health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Backend is fully operational.
    Healthy,
    /// Backend is operational but experiencing issues.
    Degraded(String),
    /// Backend is not operational.
    Unhealthy(String),
}

/// Which persistence mode the application runs against.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Sqlite,
    Json,
}

/// The three roles that act on tickets.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Client,
    Operator,
    Technician,
}

/// Who is appending a message or attachment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Author {
    pub role: Role,
    /// Display name. For clients the backend falls back to the ticket's client name.
    pub name: String,
}

impl Author {
    pub fn client(name: impl Into<String>) -> Self {
        Self {
            role: Role::Client,
            name: name.into(),
        }
    }

    pub fn operator(name: impl Into<String>) -> Self {
        Self {
            role: Role::Operator,
            name: name.into(),
        }
    }

    pub fn technician(name: impl Into<String>) -> Self {
        Self {
            role: Role::Technician,
            name: name.into(),
        }
    }
}

/// One entry in a ticket's history. Immutable once appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub author_role: String,
    pub author_name: String,
    pub text: String,
    pub created_at: String,
}

/// A file reference attached to a ticket. Immutable once appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    #[serde(rename = "filename")]
    pub file_path: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub uploaded_by: String,
    #[serde(default)]
    pub uploaded_at: String,
}

/// A repair request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticket {
    #[serde(rename = "ticket_id")]
    pub id: TicketId,
    pub device_type: String,
    pub device_model: String,
    pub problem_description: String,
    pub client_name: String,
    pub client_phone: String,
    #[serde(default = "default_status")]
    pub status: String,
    #[serde(default = "default_priority")]
    pub priority: String,
    #[serde(default = "default_ticket_type")]
    pub ticket_type: String,
    #[serde(default)]
    pub operator_group: String,
    #[serde(default)]
    pub responsible_operator: String,
    #[serde(default)]
    pub observers: Vec<String>,
    /// Surname of the assigned technician.
    #[serde(rename = "assigned_master", default, with = "empty_as_none")]
    pub technician: Option<String>,
    #[serde(rename = "history", default)]
    pub messages: Vec<Message>,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
    #[serde(default)]
    pub requires_parts: bool,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
    #[serde(default)]
    pub report: String,
    #[serde(default)]
    pub notify_client: bool,
}

fn default_status() -> String {
    DEFAULT_STATUS.to_string()
}

fn default_priority() -> String {
    DEFAULT_PRIORITY.to_string()
}

fn default_ticket_type() -> String {
    DEFAULT_TICKET_TYPE.to_string()
}

/// `assigned_master` is stored as a plain string where `""` means unassigned.
mod empty_as_none {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Option<String>, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(value.as_deref().unwrap_or(""))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
        let raw = String::deserialize(d)?;
        Ok(if raw.is_empty() { None } else { Some(raw) })
    }
}

impl Ticket {
    /// Build a fresh ticket from creation input. Both timestamps are `now`.
    pub fn from_new(id: TicketId, new: &NewTicket, now: &str) -> Self {
        Self {
            id,
            device_type: new.device_type.clone(),
            device_model: new.device_model.clone(),
            problem_description: new.problem_description.clone(),
            client_name: new.client_name.clone(),
            client_phone: new.client_phone.clone(),
            status: new.status.clone(),
            priority: new.priority.clone(),
            ticket_type: new.ticket_type.clone(),
            operator_group: String::new(),
            responsible_operator: String::new(),
            observers: Vec::new(),
            technician: None,
            messages: Vec::new(),
            attachments: Vec::new(),
            requires_parts: false,
            created_at: now.to_string(),
            updated_at: now.to_string(),
            report: String::new(),
            notify_client: false,
        }
    }

    /// Fill timestamps missing from older files: `created_at` becomes `now`,
    /// `updated_at` copies `created_at`.
    pub fn fill_missing_timestamps(&mut self, now: &str) {
        if self.created_at.is_empty() {
            self.created_at = now.to_string();
        }
        if self.updated_at.is_empty() {
            self.updated_at = self.created_at.clone();
        }
    }

    pub fn push_message(&mut self, message: Message) {
        self.updated_at = message.created_at.clone();
        self.messages.push(message);
    }

    pub fn push_attachment(&mut self, attachment: Attachment) {
        self.updated_at = attachment.uploaded_at.clone();
        self.attachments.push(attachment);
    }
}

/// Input for creating a ticket. The role desk fills in configured defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTicket {
    pub client_name: String,
    pub client_phone: String,
    pub device_type: String,
    pub device_model: String,
    pub problem_description: String,
    pub status: String,
    pub priority: String,
    pub ticket_type: String,
}

/// A set of field overwrites. `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TicketPatch {
    pub problem_description: Option<String>,
    pub device_model: Option<String>,
    pub operator_group: Option<String>,
    pub responsible_operator: Option<String>,
    pub observers: Option<Vec<String>>,
    pub status: Option<String>,
    pub priority: Option<String>,
    pub ticket_type: Option<String>,
    /// Surname or login; resolved against the technician roster before anything is written.
    pub technician: Option<String>,
    pub requires_parts: Option<bool>,
    pub report: Option<String>,
    pub notify_client: Option<bool>,
}

impl TicketPatch {
    pub fn is_empty(&self) -> bool {
        self.problem_description.is_none()
            && self.device_model.is_none()
            && self.operator_group.is_none()
            && self.responsible_operator.is_none()
            && self.observers.is_none()
            && self.status.is_none()
            && self.priority.is_none()
            && self.ticket_type.is_none()
            && self.technician.is_none()
            && self.requires_parts.is_none()
            && self.report.is_none()
            && self.notify_client.is_none()
    }

    /// Apply the present fields to an in-memory ticket.
    ///
    /// `technician` must be the roster entry resolved from `self.technician`;
    /// it is ignored when the patch does not name one.
    pub fn apply_to(&self, ticket: &mut Ticket, technician: Option<&Technician>, now: &str) {
        if self.is_empty() {
            return;
        }
        if let Some(v) = &self.problem_description {
            ticket.problem_description = v.clone();
        }
        if let Some(v) = &self.device_model {
            ticket.device_model = v.clone();
        }
        if let Some(v) = &self.operator_group {
            ticket.operator_group = v.clone();
        }
        if let Some(v) = &self.responsible_operator {
            ticket.responsible_operator = v.clone();
        }
        if let Some(v) = &self.observers {
            ticket.observers = v.clone();
        }
        if let Some(v) = &self.status {
            ticket.status = v.clone();
        }
        if let Some(v) = &self.priority {
            ticket.priority = v.clone();
        }
        if let Some(v) = &self.ticket_type {
            ticket.ticket_type = v.clone();
        }
        if self.technician.is_some()
            && let Some(tech) = technician
        {
            ticket.technician = Some(tech.surname.clone());
        }
        if let Some(v) = self.requires_parts {
            ticket.requires_parts = v;
        }
        if let Some(v) = &self.report {
            ticket.report = v.clone();
        }
        if let Some(v) = self.notify_client {
            ticket.notify_client = v;
        }
        ticket.updated_at = now.to_string();
    }
}

/// A repair technician in the roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Technician {
    pub login: String,
    pub surname: String,
    #[serde(default)]
    pub first_name: String,
}

impl Technician {
    /// True if `name` equals this technician's surname or login exactly.
    pub fn answers_to(&self, name: &str) -> bool {
        self.surname == name || self.login == name
    }

    /// "Surname First", the name technicians sign history entries with.
    pub fn display_name(&self) -> String {
        join_full_name(&self.surname, &self.first_name, "")
    }
}

/// Input for adding a technician to the roster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTechnician {
    pub login: String,
    pub full_name: String,
    pub phone: String,
}

/// A ticket flagged as a repeat of an earlier one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Duplicate {
    pub duplicate: TicketId,
    pub original: TicketId,
}

/// Split "Surname Name Patronymic" into three parts, filling gaps with `-`.
///
/// Everything after the second word is kept together as the patronymic.
pub fn split_full_name(full_name: &str) -> (String, String, String) {
    let parts: Vec<&str> = full_name.split_whitespace().collect();
    match parts.as_slice() {
        [] => ("-".into(), "-".into(), "-".into()),
        [surname] => ((*surname).into(), "-".into(), "-".into()),
        [surname, name] => ((*surname).into(), (*name).into(), "-".into()),
        [surname, name, rest @ ..] => ((*surname).into(), (*name).into(), rest.join(" ")),
    }
}

/// Inverse of [`split_full_name`]: joins the parts, dropping `-` placeholders.
pub fn join_full_name(surname: &str, name: &str, patronymic: &str) -> String {
    [surname, name, patronymic]
        .iter()
        .filter(|p| !p.is_empty() && **p != "-")
        .copied()
        .collect::<Vec<_>>()
        .join(" ")
}
