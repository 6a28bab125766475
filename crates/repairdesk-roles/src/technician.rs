// SPDX-FileCopyrightText: 2026 Repairdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Technician desk: work the assigned queue.
//!
//! Each action writes its field change first and then appends a history
//! message signed with the technician's display name ("Surname First").

use std::sync::Arc;

use repairdesk_config::model::WorkflowConfig;
use repairdesk_core::{
    Author, RepairdeskError, Technician, Ticket, TicketId, TicketPatch, TicketStore,
};
use tracing::{debug, warn};

use crate::require;

const SITE_PHOTO: &str = "repair site photo";

pub struct TechnicianDesk {
    store: Arc<dyn TicketStore>,
    workflow: WorkflowConfig,
}

impl TechnicianDesk {
    pub fn new(store: Arc<dyn TicketStore>, workflow: WorkflowConfig) -> Self {
        Self { store, workflow }
    }

    /// Resolve a technician by surname or login.
    pub async fn sign_in(&self, name: &str) -> Result<Technician, RepairdeskError> {
        let name = require(name, "technician name")?;
        match self.store.find_technician(name).await? {
            Some(tech) => {
                debug!(login = %tech.login, "technician signed in");
                Ok(tech)
            }
            None => {
                warn!(name, "unknown technician");
                Err(RepairdeskError::TechnicianNotFound(name.to_string()))
            }
        }
    }

    /// Tickets assigned to `tech`: high priority first, then oldest.
    pub async fn assigned(&self, tech: &Technician) -> Result<Vec<Ticket>, RepairdeskError> {
        self.store.list_technician_tickets(tech).await
    }

    pub async fn request_parts(
        &self,
        id: TicketId,
        tech: &Technician,
    ) -> Result<(), RepairdeskError> {
        let patch = TicketPatch {
            requires_parts: Some(true),
            ..Default::default()
        };
        self.store.apply_patch(id, &patch).await?;
        self.note(id, tech, "parts order requested").await
    }

    /// Set the status; the client is flagged for notification only on completion statuses.
    pub async fn change_status(
        &self,
        id: TicketId,
        status: &str,
        tech: &Technician,
    ) -> Result<(), RepairdeskError> {
        let status = require(status, "status")?;
        let patch = TicketPatch {
            status: Some(status.to_string()),
            notify_client: Some(self.workflow.is_completion(status)),
            ..Default::default()
        };
        self.store.apply_patch(id, &patch).await?;
        self.note(id, tech, &format!("status changed to '{status}'"))
            .await
    }

    /// Record the work report. The status is left as it is.
    pub async fn file_report(
        &self,
        id: TicketId,
        report: &str,
        tech: &Technician,
    ) -> Result<(), RepairdeskError> {
        let report = require(report, "report")?;
        let patch = TicketPatch {
            report: Some(report.to_string()),
            notify_client: Some(true),
            ..Default::default()
        };
        self.store.apply_patch(id, &patch).await?;
        self.note(id, tech, &format!("work report added: {report}"))
            .await
    }

    pub async fn attach_photo(
        &self,
        id: TicketId,
        file_path: &str,
        tech: &Technician,
    ) -> Result<(), RepairdeskError> {
        let file_path = require(file_path, "file path")?;
        let author = Author::technician(tech.display_name());
        self.store
            .add_attachment(id, &author, file_path, SITE_PHOTO)
            .await?;
        self.note(id, tech, &format!("photo attached: {file_path}"))
            .await
    }

    async fn note(&self, id: TicketId, tech: &Technician, text: &str) -> Result<(), RepairdeskError> {
        self.store
            .add_message(id, &Author::technician(tech.display_name()), text)
            .await
    }
}
