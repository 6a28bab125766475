// SPDX-FileCopyrightText: 2026 Repairdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Repairdesk - repair ticket tracking for clients, operators, and technicians.
//!
//! This is the binary entry point. Each role is a command group; every
//! command opens the configured backend, runs one desk operation, prints
//! the result, and exits.

mod doctor;
mod render;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use repairdesk_config::RepairdeskConfig;
use repairdesk_core::{
    NewTechnician, RepairdeskError, StorageBackend, TicketId, TicketPatch, TicketStore,
};
use repairdesk_roles::{ClientDesk, OperatorDesk, TechnicianDesk, TicketForm};
use tracing::warn;

use crate::render::Output;

/// Repairdesk - repair ticket tracking.
#[derive(Parser, Debug)]
#[command(name = "repairdesk", version, about, long_about = None)]
struct Cli {
    /// Load this config file instead of searching the standard locations.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Storage backend to use (sqlite or json), overriding the config.
    #[arg(long, global = true)]
    backend: Option<StorageBackend>,

    /// Print results as JSON.
    #[arg(long, global = true)]
    json: bool,

    /// Disable colored output.
    #[arg(long, global = true)]
    plain: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Submit and follow your own repair tickets.
    #[command(subcommand)]
    Client(ClientCommand),
    /// Triage, assign, search, and clean up tickets.
    #[command(subcommand)]
    Operator(OperatorCommand),
    /// Work the tickets assigned to you.
    #[command(subcommand)]
    Technician(TechnicianCommand),
    /// Manage the technician roster.
    #[command(subcommand)]
    Staff(StaffCommand),
    /// Run diagnostic checks on the config and storage.
    Doctor {
        /// Also verify the whole store file.
        #[arg(long)]
        deep: bool,
    },
}

#[derive(Subcommand, Debug)]
enum ClientCommand {
    /// Open a new repair ticket.
    Create {
        /// Your full name ("Surname First Patronymic").
        #[arg(long)]
        name: String,
        #[arg(long)]
        phone: String,
        /// Kind of equipment, e.g. "printer".
        #[arg(long = "device-type")]
        device_type: String,
        #[arg(long, default_value = "")]
        model: String,
        /// What is wrong.
        #[arg(long)]
        problem: String,
    },
    /// List your tickets, newest first.
    List {
        #[arg(long)]
        phone: String,
    },
    /// Show one of your tickets with its history.
    Show {
        #[arg(long)]
        phone: String,
        id: TicketId,
    },
    /// Change the device model or problem description.
    Edit {
        #[arg(long)]
        phone: String,
        id: TicketId,
        #[arg(long, default_value = "")]
        model: String,
        #[arg(long, default_value = "")]
        problem: String,
    },
    /// Attach a file to one of your tickets.
    Attach {
        #[arg(long)]
        phone: String,
        id: TicketId,
        path: String,
        #[arg(long, default_value = "")]
        description: String,
    },
    /// Tickets with news for you.
    Notifications {
        #[arg(long)]
        phone: String,
    },
}

#[derive(Subcommand, Debug)]
enum OperatorCommand {
    /// List every ticket, newest first.
    List,
    /// Show a ticket with its history.
    Show { id: TicketId },
    /// Change ticket fields. Only the given fields are written.
    Update {
        id: TicketId,
        #[command(flatten)]
        fields: PatchArgs,
    },
    /// Case-insensitive search over ids, clients, devices, and statuses.
    Search { text: String },
    /// Find tickets repeating an earlier one from the same phone.
    Duplicates {
        /// Delete the duplicates, keeping the originals.
        #[arg(long)]
        delete: bool,
    },
    /// Delete a ticket with its history and attachments.
    Delete { id: TicketId },
}

#[derive(Args, Debug, Default)]
struct PatchArgs {
    #[arg(long)]
    status: Option<String>,
    #[arg(long)]
    priority: Option<String>,
    #[arg(long = "type")]
    ticket_type: Option<String>,
    /// Operator group label.
    #[arg(long)]
    group: Option<String>,
    /// Responsible operator.
    #[arg(long)]
    responsible: Option<String>,
    /// Comma-separated observers; an empty value clears the list.
    #[arg(long)]
    observers: Option<String>,
    /// Assign a technician by surname or login.
    #[arg(long)]
    technician: Option<String>,
    #[arg(long)]
    problem: Option<String>,
    #[arg(long)]
    model: Option<String>,
    #[arg(long)]
    report: Option<String>,
    #[arg(long)]
    requires_parts: Option<bool>,
    #[arg(long)]
    notify_client: Option<bool>,
}

impl PatchArgs {
    fn into_patch(self) -> TicketPatch {
        TicketPatch {
            problem_description: self.problem,
            device_model: self.model,
            operator_group: self.group,
            responsible_operator: self.responsible,
            observers: self.observers.as_deref().map(split_observers),
            status: self.status,
            priority: self.priority,
            ticket_type: self.ticket_type,
            technician: self.technician,
            requires_parts: self.requires_parts,
            report: self.report,
            notify_client: self.notify_client,
        }
    }
}

fn split_observers(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

/// Who is working: surname or login from the roster.
#[derive(Args, Debug)]
struct SignIn {
    #[arg(long)]
    name: String,
}

#[derive(Subcommand, Debug)]
enum TechnicianCommand {
    /// Your assigned tickets: high priority first, then oldest.
    List {
        #[command(flatten)]
        who: SignIn,
    },
    /// Request a parts order for a ticket.
    Parts {
        #[command(flatten)]
        who: SignIn,
        id: TicketId,
    },
    /// Change a ticket's status.
    Status {
        #[command(flatten)]
        who: SignIn,
        id: TicketId,
        status: String,
    },
    /// File the work report.
    Report {
        #[command(flatten)]
        who: SignIn,
        id: TicketId,
        report: String,
    },
    /// Attach a photo of the repair site.
    Attach {
        #[command(flatten)]
        who: SignIn,
        id: TicketId,
        path: String,
    },
}

#[derive(Subcommand, Debug)]
enum StaffCommand {
    /// Add a technician to the roster.
    AddTechnician {
        #[arg(long)]
        login: String,
        /// "Surname First Patronymic".
        #[arg(long = "full-name")]
        full_name: String,
        #[arg(long, default_value = "")]
        phone: String,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let mut config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(errors) => {
            repairdesk_config::render_errors(&errors);
            std::process::exit(1);
        }
    };
    if let Some(backend) = cli.backend {
        config.storage.backend = backend;
    }

    init_tracing(&config.app.log_level);

    if let Err(e) = run(cli, config).await {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn load_config(
    path: Option<&Path>,
) -> Result<RepairdeskConfig, Vec<repairdesk_config::ConfigError>> {
    match path {
        Some(path) => repairdesk_config::load_and_validate_path(path),
        None => repairdesk_config::load_and_validate(),
    }
}

async fn run(cli: Cli, config: RepairdeskConfig) -> Result<(), RepairdeskError> {
    let out = Output::new(cli.json, cli.plain);

    if let Commands::Doctor { deep } = cli.command {
        return doctor::run_doctor(&config, cli.config.as_deref(), deep, cli.plain).await;
    }

    let store = repairdesk_storage::open_store(&config.storage).await?;
    let result = dispatch(cli.command, &config, store.clone(), out).await;
    if let Err(e) = store.close().await {
        warn!(error = %e, "failed to close store");
    }
    result
}

async fn dispatch(
    command: Commands,
    config: &RepairdeskConfig,
    store: Arc<dyn TicketStore>,
    out: Output,
) -> Result<(), RepairdeskError> {
    match command {
        Commands::Client(cmd) => {
            let desk = ClientDesk::new(store, config.workflow.clone());
            client(cmd, &desk, out).await
        }
        Commands::Operator(cmd) => operator(cmd, &OperatorDesk::new(store), out).await,
        Commands::Technician(cmd) => {
            let desk = TechnicianDesk::new(store, config.workflow.clone());
            technician(cmd, &desk, out).await
        }
        Commands::Staff(StaffCommand::AddTechnician {
            login,
            full_name,
            phone,
        }) => {
            let tech = OperatorDesk::new(store)
                .register_technician(&NewTechnician {
                    login,
                    full_name,
                    phone,
                })
                .await?;
            out.technician(&tech)
        }
        Commands::Doctor { .. } => Ok(()),
    }
}

async fn client(cmd: ClientCommand, desk: &ClientDesk, out: Output) -> Result<(), RepairdeskError> {
    match cmd {
        ClientCommand::Create {
            name,
            phone,
            device_type,
            model,
            problem,
        } => {
            let form = TicketForm {
                client_name: name,
                client_phone: phone,
                device_type,
                device_model: model,
                problem_description: problem,
            };
            let ticket = desk.submit(&form).await?;
            if out.is_json() {
                out.ticket(&ticket)
            } else {
                out.done(Some(ticket.id), &format!("ticket #{} created", ticket.id))
            }
        }
        ClientCommand::List { phone } => out.tickets(&desk.tickets_for(&phone).await?),
        ClientCommand::Show { phone, id } => out.ticket(&desk.ticket(&phone, id).await?),
        ClientCommand::Edit {
            phone,
            id,
            model,
            problem,
        } => {
            desk.ticket(&phone, id).await?;
            desk.edit(id, &model, &problem).await?;
            out.done(Some(id), &format!("ticket #{id} updated"))
        }
        ClientCommand::Attach {
            phone,
            id,
            path,
            description,
        } => {
            desk.ticket(&phone, id).await?;
            desk.attach(id, &path, &description).await?;
            out.done(Some(id), &format!("attached {path} to ticket #{id}"))
        }
        ClientCommand::Notifications { phone } => {
            out.tickets(&desk.notifications(&phone).await?)
        }
    }
}

async fn operator(
    cmd: OperatorCommand,
    desk: &OperatorDesk,
    out: Output,
) -> Result<(), RepairdeskError> {
    match cmd {
        OperatorCommand::List => out.tickets(&desk.tickets().await?),
        OperatorCommand::Show { id } => out.ticket(&desk.show(id).await?),
        OperatorCommand::Update { id, fields } => {
            let patch = fields.into_patch();
            if patch.is_empty() {
                return Err(RepairdeskError::Validation(
                    "nothing to update: pass at least one field".to_string(),
                ));
            }
            desk.update(id, &patch).await?;
            out.done(Some(id), &format!("ticket #{id} updated"))
        }
        OperatorCommand::Search { text } => out.tickets(&desk.search(&text).await?),
        OperatorCommand::Duplicates { delete: false } => {
            out.duplicates(&desk.find_duplicates().await?, false)
        }
        OperatorCommand::Duplicates { delete: true } => {
            out.duplicates(&desk.remove_duplicates().await?, true)
        }
        OperatorCommand::Delete { id } => {
            desk.delete(id).await?;
            out.done(Some(id), &format!("ticket #{id} deleted"))
        }
    }
}

async fn technician(
    cmd: TechnicianCommand,
    desk: &TechnicianDesk,
    out: Output,
) -> Result<(), RepairdeskError> {
    match cmd {
        TechnicianCommand::List { who } => {
            let tech = desk.sign_in(&who.name).await?;
            out.tickets(&desk.assigned(&tech).await?)
        }
        TechnicianCommand::Parts { who, id } => {
            let tech = desk.sign_in(&who.name).await?;
            desk.request_parts(id, &tech).await?;
            out.done(Some(id), &format!("parts requested for ticket #{id}"))
        }
        TechnicianCommand::Status { who, id, status } => {
            let tech = desk.sign_in(&who.name).await?;
            desk.change_status(id, &status, &tech).await?;
            out.done(Some(id), &format!("ticket #{id} is now '{}'", status.trim()))
        }
        TechnicianCommand::Report { who, id, report } => {
            let tech = desk.sign_in(&who.name).await?;
            desk.file_report(id, &report, &tech).await?;
            out.done(Some(id), &format!("report filed for ticket #{id}"))
        }
        TechnicianCommand::Attach { who, id, path } => {
            let tech = desk.sign_in(&who.name).await?;
            desk.attach_photo(id, &path, &tech).await?;
            out.done(Some(id), &format!("attached {path} to ticket #{id}"))
        }
    }
}

/// Initializes the tracing subscriber with the given log level.
///
/// Logs go to stderr so `--json` output on stdout stays parseable.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("repairdesk={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_names(false)
        .init();
}
