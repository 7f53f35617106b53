//! ClientDesk
//!
//! Console front-end for administering OAuth client registrations: lists
//! clients, registers new ones and edits redirect URIs and host URIs.

use std::sync::Arc;

use anyhow::Result;
use clientdesk_core::{ApplicationServicesBuilder, ClientRepository, EventBus, EventReceiver};
use clientdesk_storage::{Database, SqliteClientRepository};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::Mutex;
use tracing::{error, info};

mod commands;
mod config;
mod logging;

use commands::{Command, Dispatcher};
use config::AppConfig;

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::from_env()?;
    let _guard = logging::init_tracing(&config.logs_dir)?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        database = ?config.database_path,
        "Starting ClientDesk"
    );

    let db = Arc::new(Mutex::new(Database::open(&config.database_path)?));
    let client_repo: Arc<dyn ClientRepository> = Arc::new(SqliteClientRepository::new(db));

    let event_bus = Arc::new(EventBus::new());
    let services = ApplicationServicesBuilder::new()
        .with_event_bus(event_bus.clone())
        .with_client_repo(client_repo.clone())
        .build()?;

    tokio::spawn(notify_loop(services.subscribe()));

    let panel = Arc::new(services.panel);
    panel.load().await?;

    let dispatcher = Dispatcher::new(panel, client_repo);

    println!("{}", commands::help());
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }

        let command = match Command::parse_line(&line) {
            Ok(command) => command,
            Err(e) => {
                // help output and usage errors alike
                print!("{}", e);
                continue;
            }
        };

        if command == Command::Quit {
            break;
        }

        match dispatcher.execute(command).await {
            Ok(output) if output.is_empty() => {}
            Ok(output) => println!("{}", output),
            Err(e) => {
                error!(error = %e, "Command failed");
                println!("error: {}", e);
            }
        }
    }

    info!("ClientDesk shutting down");
    Ok(())
}

/// Print toast-style notifications for events that carry one.
async fn notify_loop(mut receiver: EventReceiver) {
    while let Some(event) = receiver.recv().await {
        info!(event_type = event.type_name(), client_id = ?event.client_id(), "Event");
        if let Some(message) = event.notification() {
            println!(">> {}", message);
        }
    }
}
