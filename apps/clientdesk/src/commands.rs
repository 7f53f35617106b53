//! Console commands
//!
//! One line of input is one user action. Each line is parsed with clap as if
//! it were a `clientdesk` command line, then dispatched against the client
//! panel one at a time.

use std::sync::Arc;

use anyhow::{anyhow, Result};
use clap::{CommandFactory, Parser, Subcommand};
use clientdesk_core::{
    validate_host_uri, ClientPanel, ClientRegistration, ClientRepository, PanelEntry,
};

/// Binary name clap sees in front of every console line
const PROGRAM: &str = "clientdesk";

#[derive(Debug, Parser)]
#[command(name = PROGRAM, about = "OAuth client administration console")]
struct Line {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Show all clients
    List,
    /// Register a new client
    Register {
        /// Absolute host URI, e.g. https://app.example.com
        #[arg(value_parser = validate_host_uri)]
        host_uri: String,
        /// Display name
        #[arg(required = true)]
        name: Vec<String>,
    },
    /// Fetch secret and redirect URIs
    Show { client_id: String },
    /// Enter edit mode
    Edit { client_id: String },
    /// Open the host field
    HostEdit { client_id: String },
    /// Stage a new host (without https://)
    Host { client_id: String, host: String },
    /// Close the host field
    HostDone { client_id: String },
    /// Open the new redirect path input
    OpenInput { client_id: String },
    /// Stage a redirect path, e.g. /callback
    Add { client_id: String, path: String },
    /// Collapse the path input if it is empty
    Blur {
        client_id: String,
        text: Option<String>,
    },
    /// Retract a staged addition
    DropNew { client_id: String, uri: String },
    /// Remove an existing redirect URI
    Drop { client_id: String, uri: String },
    /// Report whether there is anything to save
    Changed { client_id: String },
    /// Commit staged edits
    Save { client_id: String },
    /// Leave edit mode
    Cancel { client_id: String },
    /// Leave the console
    #[command(alias = "exit")]
    Quit,
}

impl Command {
    /// Parse one console line. `help` and usage errors come back as
    /// `clap::Error`, ready to print.
    pub fn parse_line(line: &str) -> Result<Self, clap::Error> {
        Line::try_parse_from(std::iter::once(PROGRAM).chain(line.split_whitespace()))
            .map(|line| line.command)
    }
}

/// Rendered command overview
pub fn help() -> String {
    Line::command().render_help().to_string()
}

/// Dispatches parsed commands to the panel and renders the result.
pub struct Dispatcher {
    panel: Arc<ClientPanel>,
    client_repo: Arc<dyn ClientRepository>,
}

impl Dispatcher {
    pub fn new(panel: Arc<ClientPanel>, client_repo: Arc<dyn ClientRepository>) -> Self {
        Self { panel, client_repo }
    }

    pub async fn execute(&self, command: Command) -> Result<String> {
        let output = match command {
            Command::List => self
                .panel
                .clients()
                .iter()
                .map(render_row)
                .collect::<Vec<_>>()
                .join("\n"),
            Command::Register { host_uri, name } => {
                let client = self
                    .client_repo
                    .create(&ClientRegistration {
                        name: name.join(" "),
                        host_uri,
                        redirect_uris: Vec::new(),
                    })
                    .await?;
                let client_id = client.client_id.clone();
                self.panel.admit(client)?;
                format!("registered {}", client_id)
            }
            Command::Show { client_id } => {
                self.panel.fetch_client_data(&client_id).await?;
                let entry = self.entry(&client_id)?;
                let mut lines = vec![
                    render_row(&entry),
                    format!("  secret: {}", entry.client.secret.unwrap_or_default()),
                ];
                lines.extend(entry.client.redirect_uris.iter().map(|u| format!("  - {}", u)));
                lines.join("\n")
            }
            Command::Edit { client_id } => {
                self.panel.enter_edit(&client_id)?;
                self.render_session(&client_id)?
            }
            Command::HostEdit { client_id } => {
                self.panel.set_host_editable(&client_id)?;
                "host field open".to_string()
            }
            Command::Host { client_id, host } => {
                self.panel.edit_host(&client_id, &host)?;
                self.render_session(&client_id)?
            }
            Command::HostDone { client_id } => {
                self.panel.clear_host_editable(&client_id)?;
                "host field closed".to_string()
            }
            Command::OpenInput { client_id } => {
                self.panel.open_pending_input(&client_id)?;
                "input open".to_string()
            }
            Command::Add { client_id, path } => {
                if !self.panel.add_path(&client_id, &path)? {
                    return Ok(format!("ignored invalid path '{}'", path));
                }
                self.render_session(&client_id)?
            }
            Command::Blur { client_id, text } => {
                self.panel.cancel_pending_input(&client_id, text.as_deref().unwrap_or_default())?;
                "ok".to_string()
            }
            Command::DropNew { client_id, uri } => {
                self.panel.remove_new_path(&client_id, &uri)?;
                self.render_session(&client_id)?
            }
            Command::Drop { client_id, uri } => {
                self.panel.remove_staged_path(&client_id, &uri)?;
                self.render_session(&client_id)?
            }
            Command::Changed { client_id } => {
                if self.panel.has_changes(&client_id)? {
                    "unsaved changes".to_string()
                } else {
                    "no changes".to_string()
                }
            }
            Command::Save { client_id } => {
                if !self.panel.has_changes(&client_id)? {
                    return Ok("nothing to save".to_string());
                }
                let client = self.panel.save_changes(&client_id).await?;
                format!("saved {} ({} redirect URIs)", client.host_uri, client.redirect_uris.len())
            }
            Command::Cancel { client_id } => {
                self.panel.cancel_edit(&client_id)?;
                "edit cancelled".to_string()
            }
            Command::Quit => String::new(),
        };
        Ok(output)
    }

    fn entry(&self, client_id: &str) -> Result<PanelEntry> {
        self.panel
            .entry(client_id)
            .ok_or_else(|| anyhow!("client not found: {}", client_id))
    }

    fn render_session(&self, client_id: &str) -> Result<String> {
        let entry = self.entry(client_id)?;
        let mut lines = vec![render_row(&entry)];
        if let Some(staging) = entry.session.staging.as_ref() {
            lines.push(format!("  host: {}", staging.host_copy));
            lines.extend(staging.base.iter().map(|u| format!("  = {}", u)));
            lines.extend(staging.pending_adds.iter().map(|u| format!("  + {}", u)));
        }
        if entry.has_changes() {
            lines.push("  (unsaved changes)".to_string());
        }
        Ok(lines.join("\n"))
    }
}

fn render_row(entry: &PanelEntry) -> String {
    let mut flags = Vec::new();
    if entry.is_new {
        flags.push("new");
    }
    if entry.session.editable {
        flags.push("editing");
    }
    if entry.saving {
        flags.push("saving");
    }

    let flags = if flags.is_empty() {
        String::new()
    } else {
        format!(" [{}]", flags.join(", "))
    };

    format!(
        "{} {} ({}) {} {}{}",
        entry.view.color, entry.view.avatar_name, entry.client.client_id, entry.client.name,
        entry.client.host_uri, flags
    )
}
