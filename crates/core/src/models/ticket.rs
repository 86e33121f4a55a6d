//! Group ticket - the aggregate root owning slots and seats

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Seat, TimeSlot};
use crate::pricing::{capacity_of, price_tier_for, PriceTier};

/// Opaque reference to an uploaded remark image (typically a data URL).
/// Stored and handed back, never interpreted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageRef(pub String);

impl ImageRef {
    pub fn new(reference: impl Into<String>) -> Self {
        Self(reference.into())
    }
}

/// A group reservation: a headcount spread over one or more slots
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "TicketDocument", from = "TicketDocument")]
pub struct GroupTicket {
    pub id: Uuid,
    pub package_name: String,
    pub headcount: u32,
    pub selected_date: NaiveDate,
    pub slots: Vec<TimeSlot>,
    pub remarks: String,
    pub remark_image: Option<ImageRef>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl GroupTicket {
    /// Always derived from the current headcount
    pub fn price_tier(&self) -> PriceTier {
        price_tier_for(self.headcount)
    }

    pub fn total_capacity(&self) -> u32 {
        capacity_of(&self.slots)
    }

    pub fn occupied_seats(&self) -> usize {
        self.slots.iter().map(|s| s.occupied_count()).sum()
    }

    pub fn slot(&self, slot_index: usize) -> Option<&TimeSlot> {
        self.slots.get(slot_index)
    }

    pub fn seat(&self, slot_index: usize, seat_index: usize) -> Option<&Seat> {
        self.slots.get(slot_index)?.seats.get(seat_index)
    }

    pub(crate) fn seat_mut(&mut self, slot_index: usize, seat_index: usize) -> Option<&mut Seat> {
        self.slots.get_mut(slot_index)?.seats.get_mut(seat_index)
    }
}

/// Wire shape of a ticket. `price_tier` is emitted for readers and ignored on input.
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TicketDocument {
    id: Uuid,
    package_name: String,
    headcount: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    price_tier: Option<PriceTier>,
    selected_date: NaiveDate,
    slots: Vec<TimeSlot>,
    #[serde(default)]
    remarks: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    remark_image: Option<ImageRef>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<GroupTicket> for TicketDocument {
    fn from(ticket: GroupTicket) -> Self {
        Self {
            price_tier: Some(ticket.price_tier()),
            id: ticket.id,
            package_name: ticket.package_name,
            headcount: ticket.headcount,
            selected_date: ticket.selected_date,
            slots: ticket.slots,
            remarks: ticket.remarks,
            remark_image: ticket.remark_image,
            created_at: ticket.created_at,
            updated_at: ticket.updated_at,
        }
    }
}

impl From<TicketDocument> for GroupTicket {
    fn from(doc: TicketDocument) -> Self {
        Self {
            id: doc.id,
            package_name: doc.package_name,
            headcount: doc.headcount,
            selected_date: doc.selected_date,
            slots: doc.slots,
            remarks: doc.remarks,
            remark_image: doc.remark_image,
            created_at: doc.created_at,
            updated_at: doc.updated_at,
        }
    }
}
