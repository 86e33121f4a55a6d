//! Seatbook - group ticket reservation desk
//!
//! Reads JSON commands from stdin, one per line, and writes one JSON reply
//! per line to stdout. Logs go to stderr.

use std::path::PathBuf;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod desk;
mod session;
mod state;

use desk::DeskHandle;
use seatbook_core::TicketEvent;

fn main() {
    let config_path = std::env::args_os().nth(1).map(PathBuf::from);

    // Config first so its log filter can apply
    let app_state = match state::AppState::load(config_path.as_deref()) {
        Ok(state) => state,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    // Initialize logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(app_state.log_filter()));
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    tracing::info!(source = ?app_state.source, "Starting Seatbook");

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(runtime) => runtime,
        Err(e) => {
            tracing::error!("Failed to create tokio runtime: {}", e);
            std::process::exit(1);
        }
    };

    let result = runtime.block_on(async {
        let desk = DeskHandle::spawn(app_state.reservations());
        tokio::spawn(log_events(desk.subscribe()));

        let stdin = tokio::io::BufReader::new(tokio::io::stdin());
        session::run_session(&desk, stdin, tokio::io::stdout()).await
    });

    match result {
        Ok(handled) => tracing::info!(handled, "Session finished"),
        Err(e) => {
            tracing::error!("Session failed: {}", e);
            std::process::exit(1);
        }
    }
}

async fn log_events(mut events: tokio::sync::broadcast::Receiver<TicketEvent>) {
    use tokio::sync::broadcast::error::RecvError;

    loop {
        match events.recv().await {
            Ok(event) => {
                let ticket = event.ticket();
                tracing::info!(
                    ticket_id = %ticket.id,
                    occupied = ticket.occupied_seats(),
                    capacity = ticket.total_capacity(),
                    "{}",
                    event_label(&event)
                );
            }
            Err(RecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "Event log lagged");
            }
            Err(RecvError::Closed) => break,
        }
    }
}

fn event_label(event: &TicketEvent) -> &'static str {
    match event {
        TicketEvent::Created { .. } => "Ticket created",
        TicketEvent::Edited { .. } => "Ticket edited",
        TicketEvent::RemarksUpdated { .. } => "Remarks updated",
        TicketEvent::SeatOccupied { .. } => "Seat occupied",
        TicketEvent::SeatReleased { .. } => "Seat released",
    }
}
