// SPDX-FileCopyrightText: 2026 Repairdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Client desk: submit tickets, follow them, and add files.

use std::sync::Arc;

use repairdesk_config::model::WorkflowConfig;
use repairdesk_core::{
    Author, NewTicket, RepairdeskError, Ticket, TicketId, TicketPatch, TicketStore,
};
use tracing::{info, warn};

use crate::require;

const CLIENT_FILE: &str = "client file";

/// What a client fills in to open a ticket.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TicketForm {
    pub client_name: String,
    pub client_phone: String,
    pub device_type: String,
    /// Optional; blank becomes the configured placeholder.
    pub device_model: String,
    pub problem_description: String,
}

pub struct ClientDesk {
    store: Arc<dyn TicketStore>,
    workflow: WorkflowConfig,
}

impl ClientDesk {
    pub fn new(store: Arc<dyn TicketStore>, workflow: WorkflowConfig) -> Self {
        Self { store, workflow }
    }

    /// Open a new ticket with the configured default status, priority, and type.
    ///
    /// Every submission creates a ticket; repeats are left to duplicate detection.
    pub async fn submit(&self, form: &TicketForm) -> Result<Ticket, RepairdeskError> {
        let client_name = require(&form.client_name, "client name")?;
        let client_phone = require(&form.client_phone, "phone")?;
        let device_type = require(&form.device_type, "device type")?;
        let problem = require(&form.problem_description, "problem description")?;
        let model = match form.device_model.trim() {
            "" => self.workflow.placeholder_model.as_str(),
            model => model,
        };

        let new = NewTicket {
            client_name: client_name.to_string(),
            client_phone: client_phone.to_string(),
            device_type: device_type.to_string(),
            device_model: model.to_string(),
            problem_description: problem.to_string(),
            status: self.workflow.default_status.clone(),
            priority: self.workflow.default_priority.clone(),
            ticket_type: self.workflow.default_ticket_type.clone(),
        };
        let ticket = self.store.create_ticket(&new).await?;
        info!(ticket = ticket.id, "client submitted ticket");
        Ok(ticket)
    }

    /// The client's tickets, newest first.
    pub async fn tickets_for(&self, phone: &str) -> Result<Vec<Ticket>, RepairdeskError> {
        let phone = require(phone, "phone")?;
        self.store.list_client_tickets(phone).await
    }

    /// One of the client's own tickets. Tickets under another phone are not found.
    pub async fn ticket(&self, phone: &str, id: TicketId) -> Result<Ticket, RepairdeskError> {
        let phone = require(phone, "phone")?;
        match self.store.get_ticket(id).await? {
            Some(ticket) if ticket.client_phone == phone => Ok(ticket),
            _ => Err(RepairdeskError::TicketNotFound(id)),
        }
    }

    /// Change the device model and/or problem description.
    ///
    /// Blank inputs are ignored. Refused once the ticket reaches a locked status.
    pub async fn edit(
        &self,
        id: TicketId,
        device_model: &str,
        problem_description: &str,
    ) -> Result<(), RepairdeskError> {
        let ticket = self
            .store
            .get_ticket(id)
            .await?
            .ok_or(RepairdeskError::TicketNotFound(id))?;
        if self.workflow.is_locked(&ticket.status) {
            warn!(ticket = id, status = %ticket.status, "client edit refused");
            return Err(RepairdeskError::Validation(format!(
                "ticket {id} is '{}' and can no longer be edited",
                ticket.status
            )));
        }

        let non_blank = |s: &str| {
            let s = s.trim();
            (!s.is_empty()).then(|| s.to_string())
        };
        let patch = TicketPatch {
            device_model: non_blank(device_model),
            problem_description: non_blank(problem_description),
            ..Default::default()
        };
        if patch.is_empty() {
            return Ok(());
        }
        self.store.apply_patch(id, &patch).await
    }

    /// Attach a file and note it in the history.
    pub async fn attach(
        &self,
        id: TicketId,
        file_path: &str,
        description: &str,
    ) -> Result<(), RepairdeskError> {
        let file_path = require(file_path, "file path")?;
        let description = match description.trim() {
            "" => CLIENT_FILE,
            d => d,
        };
        let author = Author::client("");
        self.store
            .add_attachment(id, &author, file_path, description)
            .await?;
        self.store
            .add_message(id, &author, &format!("attached file: {file_path}"))
            .await
    }

    /// The client's tickets that are waiting for the client to be notified.
    pub async fn notifications(&self, phone: &str) -> Result<Vec<Ticket>, RepairdeskError> {
        let mut tickets = self.tickets_for(phone).await?;
        tickets.retain(|t| t.notify_client);
        Ok(tickets)
    }
}
