//! Reservation desk task
//!
//! One tokio task owns the `Reservations` store and applies commands in the
//! order they arrive. Operators and participants hold cheap `DeskHandle`
//! clones; changes are published on a broadcast channel for subscribers.

use seatbook_core::{Command, Reply, Reservations, TicketEvent};
use tokio::sync::{broadcast, mpsc, oneshot};
use tracing::{debug, info, warn};
use uuid::Uuid;

const COMMAND_QUEUE: usize = 64;
const EVENT_BUFFER: usize = 128;

struct DeskRequest {
    command: Command,
    reply_tx: oneshot::Sender<Reply>,
}

/// Handle to the running desk
#[derive(Clone)]
pub struct DeskHandle {
    cmd_tx: mpsc::Sender<DeskRequest>,
    event_tx: broadcast::Sender<TicketEvent>,
}

impl DeskHandle {
    /// Spawn the desk task. Must be called from inside a tokio runtime.
    pub fn spawn(reservations: Reservations) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel(COMMAND_QUEUE);
        let (event_tx, _) = broadcast::channel(EVENT_BUFFER);

        tokio::spawn(desk_task(reservations, cmd_rx, event_tx.clone()));

        Self { cmd_tx, event_tx }
    }

    /// Submit a command and wait for its reply
    pub async fn submit(&self, command: Command) -> Result<Reply, &'static str> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.cmd_tx
            .send(DeskRequest { command, reply_tx })
            .await
            .map_err(|_| "Reservation desk not running")?;
        reply_rx.await.map_err(|_| "Reservation desk dropped the request")
    }

    /// Receive every change applied after this call
    pub fn subscribe(&self) -> broadcast::Receiver<TicketEvent> {
        self.event_tx.subscribe()
    }

    /// Receive changes to one ticket only
    pub fn watch_ticket(&self, ticket_id: Uuid) -> TicketWatcher {
        TicketWatcher {
            ticket_id,
            rx: self.subscribe(),
        }
    }
}

/// A participant's subscription to a single ticket
pub struct TicketWatcher {
    ticket_id: Uuid,
    rx: broadcast::Receiver<TicketEvent>,
}

impl TicketWatcher {
    /// Next change to the watched ticket, or `None` once the desk has stopped
    pub async fn next(&mut self) -> Option<TicketEvent> {
        loop {
            match self.rx.recv().await {
                Ok(event) if event.ticket().id == self.ticket_id => return Some(event),
                Ok(_) => continue,
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(ticket_id = %self.ticket_id, skipped, "Ticket watcher lagged");
                    continue;
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}

async fn desk_task(
    mut reservations: Reservations,
    mut cmd_rx: mpsc::Receiver<DeskRequest>,
    event_tx: broadcast::Sender<TicketEvent>,
) {
    info!("Reservation desk open");

    while let Some(DeskRequest { command, reply_tx }) = cmd_rx.recv().await {
        let (reply, event) = reservations.apply(command);

        if let Some(event) = event {
            // No subscribers is fine
            if event_tx.send(event).is_err() {
                debug!("No event subscribers");
            }
        }

        if reply_tx.send(reply).is_err() {
            debug!("Requester went away before the reply");
        }
    }

    info!("Reservation desk closed");
}

#[cfg(test)]
mod tests {
    use super::*;
    use seatbook_core::{Gender, HallType, SlotPick, UserInfo};

    fn create_command(headcount: u32) -> Command {
        Command::CreateTicket {
            date: Some("2025-06-01".to_string()),
            slots: vec![SlotPick {
                time: "13:00".to_string(),
                hall_type: HallType::A,
            }],
            headcount: Some(headcount),
            remarks: String::new(),
            remark_image: None,
            package_name: None,
        }
    }

    async fn create_ticket(desk: &DeskHandle) -> Uuid {
        match desk.submit(create_command(4)).await.unwrap() {
            Reply::Ticket { ticket } => ticket.id,
            other => panic!("Expected ticket, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_submit_round_trip() {
        let desk = DeskHandle::spawn(Reservations::new());
        let ticket_id = create_ticket(&desk).await;

        let reply = desk
            .submit(Command::GetTicket { ticket_id })
            .await
            .unwrap();
        assert!(matches!(reply, Reply::Ticket { ticket } if ticket.id == ticket_id));

        let reply = desk.submit(create_command(5)).await.unwrap();
        assert!(reply.is_error());
    }

    #[tokio::test]
    async fn test_subscribers_see_changes() {
        let desk = DeskHandle::spawn(Reservations::new());
        let mut events = desk.subscribe();

        let ticket_id = create_ticket(&desk).await;
        let event = events.recv().await.unwrap();
        assert!(matches!(event, TicketEvent::Created { .. }));
        assert_eq!(event.ticket().id, ticket_id);
    }

    #[tokio::test]
    async fn test_watcher_filters_by_ticket() {
        let desk = DeskHandle::spawn(Reservations::new());
        let watched = create_ticket(&desk).await;
        let other = create_ticket(&desk).await;
        let mut watcher = desk.watch_ticket(watched);

        let occupy = |ticket_id| Command::OccupySeat {
            ticket_id,
            slot_index: 0,
            seat_index: 0,
            info: UserInfo::new("Alice", Gender::Female, "13800000000"),
        };
        desk.submit(occupy(other)).await.unwrap();
        desk.submit(occupy(watched)).await.unwrap();

        let event = watcher.next().await.unwrap();
        assert_eq!(event.ticket().id, watched);
        assert!(matches!(event, TicketEvent::SeatOccupied { .. }));
    }

    #[tokio::test]
    async fn test_commands_apply_in_order() {
        let desk = DeskHandle::spawn(Reservations::new());
        let ticket_id = create_ticket(&desk).await;

        let mut pending = Vec::new();
        for (seat_index, name) in ["Ann", "Ben", "Cai", "Dee"].iter().enumerate() {
            let desk = desk.clone();
            let command = Command::OccupySeat {
                ticket_id,
                slot_index: 0,
                seat_index,
                info: UserInfo::new(*name, Gender::Male, "100"),
            };
            pending.push(tokio::spawn(async move { desk.submit(command).await }));
        }
        for handle in pending {
            assert!(!handle.await.unwrap().unwrap().is_error());
        }

        match desk.submit(Command::GetTicket { ticket_id }).await.unwrap() {
            Reply::Ticket { ticket } => assert_eq!(ticket.occupied_seats(), 4),
            other => panic!("Expected ticket, got {:?}", other),
        }
    }
}
