//! Developer guardrails and invariants
//!
//! Debug assertions for detecting impossible ticket states during development.
//! The assertions are compiled out in release builds; `ticket_violations`
//! is always available for callers that want a report instead of a panic.

use std::collections::HashSet;

use crate::models::{GroupTicket, Seat, TimeSlot};

/// Describe every way `ticket` breaks the aggregate's rules
pub fn ticket_violations(ticket: &GroupTicket) -> Vec<String> {
    let mut violations = Vec::new();

    if ticket.headcount == 0 {
        violations.push("headcount is zero".to_string());
    }

    if ticket.slots.is_empty() {
        violations.push("ticket has no slots".to_string());
    }

    let capacity = ticket.total_capacity();
    if capacity < ticket.headcount {
        violations.push(format!(
            "capacity {} is below headcount {}",
            capacity, ticket.headcount
        ));
    }

    let mut keys = HashSet::new();
    let mut ids = HashSet::new();
    for slot in &ticket.slots {
        if !keys.insert(slot.key()) {
            violations.push(format!("slot {} appears more than once", slot.id));
        } else if !ids.insert(slot.id.as_str()) {
            violations.push(format!("slot id {} is shared by two slots", slot.id));
        }
        if slot.date != ticket.selected_date {
            violations.push(format!(
                "slot {} is dated {} but ticket is for {}",
                slot.id, slot.date, ticket.selected_date
            ));
        }
        violations.extend(slot_violations(slot));
    }

    violations
}

fn slot_violations(slot: &TimeSlot) -> Vec<String> {
    let mut violations = Vec::new();

    if slot.id != slot.key().slot_id() {
        violations.push(format!("slot id {} does not match its key", slot.id));
    }

    if slot.capacity != slot.hall_type.capacity() {
        violations.push(format!(
            "slot {} has capacity {} but hall {} seats {}",
            slot.id,
            slot.capacity,
            slot.hall_type,
            slot.hall_type.capacity()
        ));
    }

    if slot.seats.len() != slot.capacity as usize {
        violations.push(format!(
            "slot {} has {} seats for capacity {}",
            slot.id,
            slot.seats.len(),
            slot.capacity
        ));
    }

    let mut seat_ids = HashSet::new();
    for (position, seat) in slot.seats.iter().enumerate() {
        if seat.index != position {
            violations.push(format!(
                "seat {} in slot {} has index {} at position {}",
                seat.id, slot.id, seat.index, position
            ));
        }
        if !seat_ids.insert(seat.id.as_str()) {
            violations.push(format!("seat id {} repeats in slot {}", seat.id, slot.id));
        }
        if let Some(problem) = occupant_violation(seat) {
            violations.push(format!("slot {}: {}", slot.id, problem));
        }
    }

    violations
}

fn occupant_violation(seat: &Seat) -> Option<String> {
    let occupant = seat.occupant.as_ref()?;
    match occupant.validate() {
        Ok(()) => None,
        Err(e) => Some(format!("seat {} has a partial occupant ({})", seat.id, e)),
    }
}

/// Validate that a ticket's state is internally consistent
pub fn assert_ticket_invariants(ticket: &GroupTicket) {
    if cfg!(debug_assertions) {
        let violations = ticket_violations(ticket);
        debug_assert!(
            violations.is_empty(),
            "Ticket {} violates invariants: {}",
            ticket.id,
            violations.join("; ")
        );
    }
}

/// Validate that a seat address used by a mutation was in range
pub fn assert_seat_addressed(ticket: &GroupTicket, slot_index: usize, seat_index: usize) {
    debug_assert!(
        ticket.seat(slot_index, seat_index).is_some(),
        "Ticket {} has no seat {} in slot {}",
        ticket.id,
        seat_index,
        slot_index
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{parse_date, parse_time};
    use crate::models::{Gender, HallType, SlotKey, UserInfo};
    use chrono::{Timelike, Utc};
    use uuid::Uuid;

    fn make_ticket() -> GroupTicket {
        let date = parse_date("2025-06-01").unwrap();
        let key = SlotKey::new(date, parse_time("13:00").unwrap(), HallType::A);
        let seat_ids = (0..4).map(|i| format!("s{}", i)).collect();

        GroupTicket {
            id: Uuid::new_v4(),
            package_name: "团票".to_string(),
            headcount: 4,
            selected_date: date,
            slots: vec![TimeSlot::with_seats(key, seat_ids)],
            remarks: String::new(),
            remark_image: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_valid_ticket() {
        let ticket = make_ticket();
        assert!(ticket_violations(&ticket).is_empty());
        assert_ticket_invariants(&ticket);
    }

    #[test]
    fn test_capacity_shortfall_reported() {
        let mut ticket = make_ticket();
        ticket.headcount = 5;
        let violations = ticket_violations(&ticket);
        assert_eq!(violations.len(), 1);
        assert!(violations[0].contains("below headcount"));
    }

    #[test]
    fn test_duplicate_slot_reported() {
        let mut ticket = make_ticket();
        let copy = ticket.slots[0].clone();
        ticket.slots.push(copy);
        assert!(ticket_violations(&ticket)
            .iter()
            .any(|v| v.contains("more than once")));
    }

    #[test]
    fn test_shared_slot_id_reported() {
        let mut ticket = make_ticket();
        let mut copy = ticket.slots[0].clone();
        copy.time = copy.time.with_second(30).unwrap();
        ticket.slots.push(copy);

        let violations = ticket_violations(&ticket);
        assert!(violations.iter().any(|v| v.contains("shared by two slots")));
    }

    #[test]
    fn test_repeated_seat_id_reported() {
        let mut ticket = make_ticket();
        ticket.slots[0].seats[1].id = "s0".to_string();
        assert!(ticket_violations(&ticket)
            .iter()
            .any(|v| v.contains("repeats")));
    }

    #[test]
    fn test_partial_occupant_reported() {
        let mut ticket = make_ticket();
        ticket.slots[0].seats[0].occupant = Some(UserInfo::new("Alice", Gender::Female, ""));
        assert!(ticket_violations(&ticket)
            .iter()
            .any(|v| v.contains("partial occupant")));
    }

    #[test]
    #[should_panic(expected = "violates invariants")]
    fn test_assert_panics_on_broken_ticket() {
        let mut ticket = make_ticket();
        ticket.slots[0].seats.pop();
        assert_ticket_invariants(&ticket);
    }
}
