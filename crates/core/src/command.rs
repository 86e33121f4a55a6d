//! Command protocol for the reservation desk
//!
//! Operators and participants never touch the ticket store directly: they
//! submit a `Command`, the single writer applies it, and answers with a
//! `Reply`. Successful mutations also yield a `TicketEvent` that hosts can
//! fan out to subscribers. All messages are JSON-serialized.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::grid::{self, SlotCandidate};
use crate::models::{GroupTicket, HallType, ImageRef, SlotChoice, SlotSelection, UserInfo};
use crate::pricing::{price_tier_for, PriceTier};
use crate::reservation::{NewTicket, Reservations};
use crate::storage::TicketRepository;

/// A (time, hall) pick as it arrives on the wire
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotPick {
    /// `HH:MM`
    pub time: String,
    pub hall_type: HallType,
}

/// Requests accepted by the desk
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Command {
    /// Operator creates a ticket
    CreateTicket {
        /// `YYYY-MM-DD`; today when omitted
        #[serde(default)]
        date: Option<String>,
        slots: Vec<SlotPick>,
        /// The venue's default headcount when omitted
        #[serde(default)]
        headcount: Option<u32>,
        #[serde(default)]
        remarks: String,
        #[serde(default)]
        remark_image: Option<String>,
        #[serde(default)]
        package_name: Option<String>,
    },

    /// Operator replaces a ticket's selection and headcount
    EditTicket {
        ticket_id: Uuid,
        date: String,
        slots: Vec<SlotPick>,
        headcount: u32,
    },

    /// Operator edits the remark text or image
    UpdateRemarks {
        ticket_id: Uuid,
        remarks: String,
        #[serde(default)]
        remark_image: Option<String>,
    },

    /// Participant claims or edits a seat
    OccupySeat {
        ticket_id: Uuid,
        slot_index: usize,
        seat_index: usize,
        info: UserInfo,
    },

    /// Participant gives a seat back
    ReleaseSeat {
        ticket_id: Uuid,
        slot_index: usize,
        seat_index: usize,
    },

    GetTicket { ticket_id: Uuid },

    /// All tickets, newest first
    ListTickets,

    /// The grid for a date; today when omitted
    DailySlots {
        #[serde(default)]
        date: Option<String>,
    },

    PriceTier { headcount: u32 },
}

/// Answers from the desk
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Reply {
    Ticket { ticket: GroupTicket },
    Tickets { tickets: Vec<GroupTicket> },
    Slots { date: String, slots: Vec<SlotCandidate> },
    PriceTier { headcount: u32, tier: PriceTier },
    Error { kind: String, message: String },
}

impl Reply {
    pub fn from_error(err: &Error) -> Self {
        Reply::Error {
            kind: err.kind().to_string(),
            message: err.to_string(),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Reply::Error { .. })
    }
}

/// Changes published to subscribers after a successful mutation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TicketEvent {
    Created { ticket: GroupTicket },
    Edited { ticket: GroupTicket },
    RemarksUpdated { ticket: GroupTicket },
    SeatOccupied {
        ticket: GroupTicket,
        slot_index: usize,
        seat_index: usize,
    },
    SeatReleased {
        ticket: GroupTicket,
        slot_index: usize,
        seat_index: usize,
    },
}

impl TicketEvent {
    /// The ticket state after the change
    pub fn ticket(&self) -> &GroupTicket {
        match self {
            TicketEvent::Created { ticket }
            | TicketEvent::Edited { ticket }
            | TicketEvent::RemarksUpdated { ticket }
            | TicketEvent::SeatOccupied { ticket, .. }
            | TicketEvent::SeatReleased { ticket, .. } => ticket,
        }
    }
}

macro_rules! json_codec {
    ($($ty:ty),*) => {
        $(
            impl $ty {
                /// Serialize to JSON bytes
                pub fn to_bytes(&self) -> std::result::Result<Vec<u8>, serde_json::Error> {
                    serde_json::to_vec(self)
                }

                /// Deserialize from JSON bytes
                pub fn from_bytes(bytes: &[u8]) -> std::result::Result<Self, serde_json::Error> {
                    serde_json::from_slice(bytes)
                }
            }
        )*
    };
}

json_codec!(Command, Reply, TicketEvent);

fn selection_from_picks(date: &str, picks: &[SlotPick]) -> Result<SlotSelection> {
    let date = grid::parse_date(date)?;
    let choices = picks
        .iter()
        .map(|pick| -> Result<SlotChoice> {
            Ok(SlotChoice::new(grid::parse_time(&pick.time)?, pick.hall_type))
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(SlotSelection::from_choices(date, choices))
}

impl<S: TicketRepository> Reservations<S> {
    /// Apply one command. Errors come back as `Reply::Error`, never as a panic.
    pub fn apply(&mut self, command: Command) -> (Reply, Option<TicketEvent>) {
        match self.try_apply(command) {
            Ok(result) => result,
            Err(e) => {
                tracing::warn!(kind = e.kind(), error = %e, "Command rejected");
                (Reply::from_error(&e), None)
            }
        }
    }

    fn try_apply(&mut self, command: Command) -> Result<(Reply, Option<TicketEvent>)> {
        let result = match command {
            Command::CreateTicket {
                date,
                slots,
                headcount,
                remarks,
                remark_image,
                package_name,
            } => {
                let date = match date {
                    Some(date) => date,
                    None => grid::format_date(self.today()),
                };
                let headcount = headcount.unwrap_or_else(|| self.default_headcount());
                let mut request = NewTicket::new(selection_from_picks(&date, &slots)?, headcount)
                    .with_remarks(remarks);
                request.remark_image = remark_image.map(ImageRef);
                request.package_name = package_name;

                let ticket = self.create_ticket(request)?;
                (
                    Reply::Ticket {
                        ticket: ticket.clone(),
                    },
                    Some(TicketEvent::Created { ticket }),
                )
            }

            Command::EditTicket {
                ticket_id,
                date,
                slots,
                headcount,
            } => {
                let selection = selection_from_picks(&date, &slots)?;
                let ticket = self.edit_ticket(ticket_id, selection, headcount)?;
                (
                    Reply::Ticket {
                        ticket: ticket.clone(),
                    },
                    Some(TicketEvent::Edited { ticket }),
                )
            }

            Command::UpdateRemarks {
                ticket_id,
                remarks,
                remark_image,
            } => {
                let ticket = self.update_remarks(ticket_id, remarks, remark_image.map(ImageRef))?;
                (
                    Reply::Ticket {
                        ticket: ticket.clone(),
                    },
                    Some(TicketEvent::RemarksUpdated { ticket }),
                )
            }

            Command::OccupySeat {
                ticket_id,
                slot_index,
                seat_index,
                info,
            } => {
                let ticket = self.occupy_seat(ticket_id, slot_index, seat_index, info)?;
                (
                    Reply::Ticket {
                        ticket: ticket.clone(),
                    },
                    Some(TicketEvent::SeatOccupied {
                        ticket,
                        slot_index,
                        seat_index,
                    }),
                )
            }

            Command::ReleaseSeat {
                ticket_id,
                slot_index,
                seat_index,
            } => {
                let was_occupied = self
                    .ticket(ticket_id)?
                    .seat(slot_index, seat_index)
                    .is_some_and(|seat| seat.is_occupied());
                let ticket = self.release_seat(ticket_id, slot_index, seat_index)?;
                let event = was_occupied.then(|| TicketEvent::SeatReleased {
                    ticket: ticket.clone(),
                    slot_index,
                    seat_index,
                });
                (Reply::Ticket { ticket }, event)
            }

            Command::GetTicket { ticket_id } => (
                Reply::Ticket {
                    ticket: self.ticket(ticket_id)?,
                },
                None,
            ),

            Command::ListTickets => (
                Reply::Tickets {
                    tickets: self.tickets()?,
                },
                None,
            ),

            Command::DailySlots { date } => {
                let date = match date {
                    Some(date) => grid::parse_date(&date)?,
                    None => self.today(),
                };
                (
                    Reply::Slots {
                        date: grid::format_date(date),
                        slots: self.daily_slots(date),
                    },
                    None,
                )
            }

            Command::PriceTier { headcount } => (
                Reply::PriceTier {
                    headcount,
                    tier: price_tier_for(headcount),
                },
                None,
            ),
        };

        Ok(result)
    }
}
