//! Reservation mutator
//!
//! Creates tickets, edits their slot selection, and occupies or releases
//! individual seats. Every mutation works on a copy of the stored ticket and
//! commits it only once all rules hold, so a failed call leaves the store
//! untouched.

use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;
use tracing::instrument;
use uuid::Uuid;

use crate::config::{BookingPolicy, SlotRemoval, VenueConfig};
use crate::error::{Error, NotFound, Result, ValidationError};
use crate::grid::{format_time, SlotCandidate, SlotGrid};
use crate::ids::{allocate_seat_ids, Clock, IdGenerator, RandomIds, SystemClock};
use crate::invariants::{assert_seat_addressed, assert_ticket_invariants};
use crate::models::{GroupTicket, ImageRef, SlotKey, SlotSelection, TimeSlot, UserInfo};
use crate::pricing::{check_capacity, check_headcount};
use crate::storage::{MemoryTicketStore, TicketRepository};

/// Operator request for a new ticket. The ticket's date is `selection.date`.
#[derive(Debug, Clone)]
pub struct NewTicket {
    pub selection: SlotSelection,
    pub headcount: u32,
    pub remarks: String,
    pub remark_image: Option<ImageRef>,
    /// Overrides the configured package name
    pub package_name: Option<String>,
}

impl NewTicket {
    pub fn new(selection: SlotSelection, headcount: u32) -> Self {
        Self {
            selection,
            headcount,
            remarks: String::new(),
            remark_image: None,
            package_name: None,
        }
    }

    pub fn with_remarks(mut self, remarks: impl Into<String>) -> Self {
        self.remarks = remarks.into();
        self
    }

    pub fn with_remark_image(mut self, image: ImageRef) -> Self {
        self.remark_image = Some(image);
        self
    }

    pub fn with_package_name(mut self, name: impl Into<String>) -> Self {
        self.package_name = Some(name.into());
        self
    }
}

/// The single writer for a ticket store
pub struct Reservations<S: TicketRepository = MemoryTicketStore> {
    store: S,
    clock: Box<dyn Clock>,
    ids: Box<dyn IdGenerator>,
    grid: SlotGrid,
    policy: BookingPolicy,
    package_name: String,
    default_headcount: u32,
}

impl Reservations<MemoryTicketStore> {
    /// In-memory store, wall clock, random ids, default venue settings
    pub fn new() -> Self {
        Self::from_config(&VenueConfig::default())
    }

    pub fn from_config(config: &VenueConfig) -> Self {
        Self::with_store(MemoryTicketStore::new(), config)
    }
}

impl Default for Reservations<MemoryTicketStore> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: TicketRepository> Reservations<S> {
    pub fn with_store(store: S, config: &VenueConfig) -> Self {
        Self {
            store,
            clock: Box::new(SystemClock),
            ids: Box::new(RandomIds),
            grid: config.slot_grid(),
            policy: config.booking,
            package_name: config.venue.package_name.clone(),
            default_headcount: config.venue.default_headcount,
        }
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn with_ids(mut self, ids: impl IdGenerator + 'static) -> Self {
        self.ids = Box::new(ids);
        self
    }

    pub fn grid(&self) -> &SlotGrid {
        &self.grid
    }

    pub fn policy(&self) -> BookingPolicy {
        self.policy
    }

    /// Headcount a new ticket starts from when none is given
    pub fn default_headcount(&self) -> u32 {
        self.default_headcount
    }

    /// Default booking date for a fresh selection
    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    /// Candidates the operator can pick from on `date`
    pub fn daily_slots(&self, date: NaiveDate) -> Vec<SlotCandidate> {
        self.grid.candidates(date)
    }

    /// Create and store a ticket. Nothing is stored if validation fails.
    #[instrument(skip(self, request), fields(date = %request.selection.date, headcount = request.headcount, slots = request.selection.len()))]
    pub fn create_ticket(&mut self, request: NewTicket) -> Result<GroupTicket> {
        self.validate_selection(&request.selection, request.headcount)?;

        let keys: Vec<SlotKey> = request.selection.keys().collect();
        let slots = keys.into_iter().map(|key| self.materialize(key)).collect();

        let now = self.clock.now();
        let ticket = GroupTicket {
            id: self.ids.ticket_id(),
            package_name: request
                .package_name
                .unwrap_or_else(|| self.package_name.clone()),
            headcount: request.headcount,
            selected_date: request.selection.date,
            slots,
            remarks: request.remarks,
            remark_image: request.remark_image,
            created_at: now,
            updated_at: now,
        };

        assert_ticket_invariants(&ticket);
        self.store.insert_ticket(ticket.clone())?;

        tracing::info!(
            ticket_id = %ticket.id,
            price_tier = %ticket.price_tier(),
            capacity = ticket.total_capacity(),
            "Ticket created"
        );
        Ok(ticket)
    }

    /// Replace a ticket's selection and headcount.
    ///
    /// Slots whose (date, time, hall) key survives keep their seats and
    /// occupants; new keys get empty seats; dropped keys are discarded,
    /// subject to the configured [`SlotRemoval`] policy.
    #[instrument(skip(self, selection), fields(ticket_id = %ticket_id, date = %selection.date))]
    pub fn edit_ticket(
        &mut self,
        ticket_id: Uuid,
        selection: SlotSelection,
        headcount: u32,
    ) -> Result<GroupTicket> {
        let mut ticket = self.ticket(ticket_id)?;
        self.validate_selection(&selection, headcount)?;

        let kept: HashSet<SlotKey> = selection.keys().collect();
        let dropped_occupied: Vec<&TimeSlot> = ticket
            .slots
            .iter()
            .filter(|slot| !kept.contains(&slot.key()) && slot.occupied_count() > 0)
            .collect();

        if let Some(slot) = dropped_occupied.first() {
            if self.policy.occupied_slot_removal == SlotRemoval::Reject {
                return Err(ValidationError::OccupiedSlotRemoved {
                    slot_id: slot.id.clone(),
                    occupied: slot.occupied_count(),
                }
                .into());
            }
        }
        for slot in &dropped_occupied {
            let evicted: Vec<&str> = slot
                .seats
                .iter()
                .filter_map(|seat| seat.occupant.as_ref().map(|o| o.name.as_str()))
                .collect();
            tracing::warn!(
                slot_id = %slot.id,
                evicted = ?evicted,
                "Edit removes an occupied slot, occupants discarded"
            );
        }

        let mut previous: HashMap<SlotKey, TimeSlot> = ticket
            .slots
            .drain(..)
            .map(|slot| (slot.key(), slot))
            .collect();

        let mut slots = Vec::with_capacity(selection.len());
        for key in selection.keys() {
            match previous.remove(&key) {
                Some(slot) => slots.push(slot),
                None => slots.push(self.materialize(key)),
            }
        }

        ticket.slots = slots;
        ticket.selected_date = selection.date;
        ticket.headcount = headcount;
        ticket.updated_at = self.clock.now();

        assert_ticket_invariants(&ticket);
        self.store.replace_ticket(ticket.clone())?;

        tracing::info!(
            price_tier = %ticket.price_tier(),
            capacity = ticket.total_capacity(),
            "Ticket edited"
        );
        Ok(ticket)
    }

    /// Change the free-text remarks and remark image without touching slots
    #[instrument(skip(self, remarks, remark_image), fields(ticket_id = %ticket_id))]
    pub fn update_remarks(
        &mut self,
        ticket_id: Uuid,
        remarks: String,
        remark_image: Option<ImageRef>,
    ) -> Result<GroupTicket> {
        let mut ticket = self.ticket(ticket_id)?;
        ticket.remarks = remarks;
        ticket.remark_image = remark_image;
        ticket.updated_at = self.clock.now();

        self.store.replace_ticket(ticket.clone())?;
        Ok(ticket)
    }

    /// Seat `info` at the addressed seat, replacing whoever held it
    #[instrument(skip(self, info), fields(ticket_id = %ticket_id))]
    pub fn occupy_seat(
        &mut self,
        ticket_id: Uuid,
        slot_index: usize,
        seat_index: usize,
        info: UserInfo,
    ) -> Result<GroupTicket> {
        let mut ticket = self.ticket(ticket_id)?;
        Self::address(&ticket, slot_index, seat_index)?;
        info.validate()?;

        let now = self.clock.now();
        if let Some(seat) = ticket.seat_mut(slot_index, seat_index) {
            if let Some(previous) = seat.occupant.replace(info) {
                tracing::debug!(previous = %previous.name, "Seat occupant replaced");
            }
        }
        ticket.updated_at = now;

        assert_seat_addressed(&ticket, slot_index, seat_index);
        assert_ticket_invariants(&ticket);
        self.store.replace_ticket(ticket.clone())?;

        tracing::debug!("Seat occupied");
        Ok(ticket)
    }

    /// Empty the addressed seat. Releasing an empty seat is a no-op.
    #[instrument(skip(self), fields(ticket_id = %ticket_id))]
    pub fn release_seat(
        &mut self,
        ticket_id: Uuid,
        slot_index: usize,
        seat_index: usize,
    ) -> Result<GroupTicket> {
        let mut ticket = self.ticket(ticket_id)?;
        Self::address(&ticket, slot_index, seat_index)?;

        let released = ticket
            .seat_mut(slot_index, seat_index)
            .and_then(|seat| seat.occupant.take());

        match released {
            Some(previous) => {
                ticket.updated_at = self.clock.now();
                assert_ticket_invariants(&ticket);
                self.store.replace_ticket(ticket.clone())?;
                tracing::debug!(previous = %previous.name, "Seat released");
            }
            None => tracing::debug!("Seat already empty"),
        }

        Ok(ticket)
    }

    /// Look up a ticket by id
    pub fn ticket(&self, ticket_id: Uuid) -> Result<GroupTicket> {
        self.store
            .find_ticket(ticket_id)?
            .ok_or(Error::NotFound(NotFound::Ticket(ticket_id)))
    }

    /// All tickets, newest first
    pub fn tickets(&self) -> Result<Vec<GroupTicket>> {
        self.store.list_tickets()
    }

    /// The ticket a participant sees: `preferred` if it exists, else the newest one
    pub fn active_ticket(&self, preferred: Option<Uuid>) -> Result<Option<GroupTicket>> {
        if let Some(id) = preferred {
            if let Some(ticket) = self.store.find_ticket(id)? {
                return Ok(Some(ticket));
            }
        }
        Ok(self.store.list_tickets()?.into_iter().next())
    }

    pub fn ticket_count(&self) -> Result<usize> {
        self.store.count_tickets()
    }

    fn validate_selection(&self, selection: &SlotSelection, headcount: u32) -> Result<()> {
        if selection.is_empty() {
            return Err(ValidationError::EmptySelection.into());
        }
        check_headcount(headcount)?;

        if let Some(choice) = selection
            .choices()
            .iter()
            .find(|c| !self.grid.contains(c.time))
        {
            return Err(ValidationError::OffGridTime {
                time: format_time(choice.time),
            }
            .into());
        }

        check_capacity(selection.total_capacity(), headcount)?;
        Ok(())
    }

    /// A fresh slot with empty seats for `key`
    fn materialize(&mut self, key: SlotKey) -> TimeSlot {
        let seat_ids = allocate_seat_ids(self.ids.as_mut(), key.hall_type.capacity() as usize);
        TimeSlot::with_seats(key, seat_ids)
    }

    fn address(ticket: &GroupTicket, slot_index: usize, seat_index: usize) -> Result<()> {
        let slot = ticket.slot(slot_index).ok_or(NotFound::Slot {
            ticket_id: ticket.id,
            slot_index,
        })?;
        if seat_index >= slot.seats.len() {
            return Err(NotFound::Seat {
                ticket_id: ticket.id,
                slot_index,
                seat_index,
            }
            .into());
        }
        Ok(())
    }
}
