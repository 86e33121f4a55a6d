//! Time slots, their seats, and the operator's slot selection

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use super::{HallType, UserInfo};
use crate::grid::{self, hhmm};

/// A single seat inside a slot. Occupancy is its only mutable state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Seat {
    /// Unique within the owning slot
    pub id: String,
    pub index: usize,
    pub occupant: Option<UserInfo>,
}

impl Seat {
    pub fn empty(id: String, index: usize) -> Self {
        Self {
            id,
            index,
            occupant: None,
        }
    }

    pub fn is_occupied(&self) -> bool {
        self.occupant.is_some()
    }
}

/// Identity of a slot within a ticket
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SlotKey {
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub hall_type: HallType,
}

impl SlotKey {
    pub fn new(date: NaiveDate, time: NaiveTime, hall_type: HallType) -> Self {
        Self {
            date,
            time,
            hall_type,
        }
    }

    /// `YYYY-MM-DD-HH:MM-A`
    pub fn slot_id(&self) -> String {
        format!(
            "{}-{}",
            grid::candidate_id(self.date, self.time),
            self.hall_type.code()
        )
    }
}

impl std::fmt::Display for SlotKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.slot_id())
    }
}

/// A booked session in one hall at one time, owning its seats
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeSlot {
    pub id: String,
    #[serde(with = "hhmm")]
    pub time: NaiveTime,
    pub date: NaiveDate,
    pub hall_type: HallType,
    pub capacity: u32,
    pub seats: Vec<Seat>,
}

impl TimeSlot {
    /// Build a slot with one empty seat per id. `seat_ids` must yield
    /// exactly `hall_type.capacity()` distinct ids.
    pub fn with_seats(key: SlotKey, seat_ids: Vec<String>) -> Self {
        debug_assert_eq!(
            seat_ids.len(),
            key.hall_type.capacity() as usize,
            "Slot {} allocated with wrong seat count",
            key
        );

        let seats = seat_ids
            .into_iter()
            .enumerate()
            .map(|(index, id)| Seat::empty(id, index))
            .collect();

        Self {
            id: key.slot_id(),
            time: key.time,
            date: key.date,
            hall_type: key.hall_type,
            capacity: key.hall_type.capacity(),
            seats,
        }
    }

    pub fn key(&self) -> SlotKey {
        SlotKey::new(self.date, self.time, self.hall_type)
    }

    pub fn occupied_count(&self) -> usize {
        self.seats.iter().filter(|s| s.is_occupied()).count()
    }

    pub fn vacant_count(&self) -> usize {
        self.seats.len() - self.occupied_count()
    }

    pub fn is_full(&self) -> bool {
        self.vacant_count() == 0
    }

    /// `occupied/capacity`, as shown on the seat board
    pub fn occupancy_label(&self) -> String {
        format!("{}/{}", self.occupied_count(), self.capacity)
    }

    pub fn format_time(&self) -> String {
        grid::format_time(self.time)
    }
}

/// One pick on the operator's slot grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotChoice {
    #[serde(with = "hhmm")]
    pub time: NaiveTime,
    pub hall_type: HallType,
}

impl SlotChoice {
    pub fn new(time: NaiveTime, hall_type: HallType) -> Self {
        Self { time, hall_type }
    }
}

/// The set of (time, hall) picks for one date, in pick order.
///
/// A (time, hall) pair appears at most once; picking it again toggles or
/// replaces, never duplicates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotSelection {
    pub date: NaiveDate,
    choices: Vec<SlotChoice>,
}

impl SlotSelection {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            choices: Vec::new(),
        }
    }

    /// Build from arbitrary picks, collapsing repeats onto the first occurrence
    pub fn from_choices(date: NaiveDate, choices: impl IntoIterator<Item = SlotChoice>) -> Self {
        let mut selection = Self::new(date);
        for choice in choices {
            selection.select(choice.time, choice.hall_type);
        }
        selection
    }

    /// Re-open the picks behind an existing set of slots on `date`
    pub fn from_slots(date: NaiveDate, slots: &[TimeSlot]) -> Self {
        Self::from_choices(
            date,
            slots
                .iter()
                .filter(|s| s.date == date)
                .map(|s| SlotChoice::new(s.time, s.hall_type)),
        )
    }

    /// Add the pick if absent, remove it if present. Returns whether it is now selected.
    pub fn toggle(&mut self, time: NaiveTime, hall_type: HallType) -> bool {
        let choice = SlotChoice::new(time, hall_type);
        if let Some(pos) = self.choices.iter().position(|c| *c == choice) {
            self.choices.remove(pos);
            false
        } else {
            self.choices.push(choice);
            true
        }
    }

    /// Add the pick if absent
    pub fn select(&mut self, time: NaiveTime, hall_type: HallType) {
        let choice = SlotChoice::new(time, hall_type);
        if !self.choices.contains(&choice) {
            self.choices.push(choice);
        }
    }

    pub fn deselect(&mut self, time: NaiveTime, hall_type: HallType) {
        self.choices
            .retain(|c| !(c.time == time && c.hall_type == hall_type));
    }

    pub fn contains(&self, time: NaiveTime, hall_type: HallType) -> bool {
        self.choices
            .iter()
            .any(|c| c.time == time && c.hall_type == hall_type)
    }

    pub fn choices(&self) -> &[SlotChoice] {
        &self.choices
    }

    pub fn keys(&self) -> impl Iterator<Item = SlotKey> + '_ {
        self.choices
            .iter()
            .map(move |c| SlotKey::new(self.date, c.time, c.hall_type))
    }

    pub fn total_capacity(&self) -> u32 {
        self.choices.iter().map(|c| c.hall_type.capacity()).sum()
    }

    pub fn len(&self) -> usize {
        self.choices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.choices.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{parse_date, parse_time};
    use crate::models::Gender;

    fn t(s: &str) -> NaiveTime {
        parse_time(s).unwrap()
    }

    fn d(s: &str) -> NaiveDate {
        parse_date(s).unwrap()
    }

    fn seat_ids(n: u32) -> Vec<String> {
        (0..n).map(|i| format!("seat-{}", i)).collect()
    }

    #[test]
    fn test_slot_with_seats() {
        let key = SlotKey::new(d("2025-06-01"), t("14:30"), HallType::A);
        let slot = TimeSlot::with_seats(key, seat_ids(4));

        assert_eq!(slot.id, "2025-06-01-14:30-A");
        assert_eq!(slot.capacity, 4);
        assert_eq!(slot.seats.len(), 4);
        assert!(slot.seats.iter().enumerate().all(|(i, s)| s.index == i && !s.is_occupied()));
        assert_eq!(slot.occupancy_label(), "0/4");
        assert_eq!(slot.key(), key);
    }

    #[test]
    fn test_occupancy_counts() {
        let key = SlotKey::new(d("2025-06-01"), t("13:00"), HallType::B);
        let mut slot = TimeSlot::with_seats(key, seat_ids(2));
        slot.seats[1].occupant = Some(UserInfo::new("Bob", Gender::Male, "1"));

        assert_eq!(slot.occupied_count(), 1);
        assert_eq!(slot.vacant_count(), 1);
        assert!(!slot.is_full());
        assert_eq!(slot.occupancy_label(), "1/2");
    }

    #[test]
    fn test_toggle_never_duplicates() {
        let mut selection = SlotSelection::new(d("2025-06-01"));
        assert!(selection.toggle(t("13:00"), HallType::A));
        assert!(selection.toggle(t("13:00"), HallType::B));
        assert_eq!(selection.len(), 2);
        assert_eq!(selection.total_capacity(), 6);

        assert!(!selection.toggle(t("13:00"), HallType::A));
        assert_eq!(selection.len(), 1);
        assert!(!selection.contains(t("13:00"), HallType::A));

        selection.select(t("13:00"), HallType::B);
        assert_eq!(selection.len(), 1);
    }

    #[test]
    fn test_deselect_removes_only_that_pick() {
        let mut selection = SlotSelection::new(d("2025-06-01"));
        selection.select(t("13:00"), HallType::A);
        selection.select(t("13:00"), HallType::B);

        selection.deselect(t("13:00"), HallType::A);
        assert_eq!(selection.choices(), &[SlotChoice::new(t("13:00"), HallType::B)]);

        // Deselecting an absent pick is a no-op
        selection.deselect(t("18:00"), HallType::A);
        assert_eq!(selection.len(), 1);
    }

    #[test]
    fn test_from_slots_reopens_picks_for_date() {
        let date = d("2025-06-01");
        let slots = vec![
            TimeSlot::with_seats(SlotKey::new(date, t("15:00"), HallType::B), seat_ids(2)),
            TimeSlot::with_seats(SlotKey::new(d("2025-06-02"), t("13:00"), HallType::A), seat_ids(4)),
            TimeSlot::with_seats(SlotKey::new(date, t("13:00"), HallType::A), seat_ids(4)),
        ];

        let selection = SlotSelection::from_slots(date, &slots);
        let keys: Vec<SlotKey> = selection.keys().collect();
        assert_eq!(keys, vec![slots[0].key(), slots[2].key()]);
        assert_eq!(selection.total_capacity(), 6);
    }

    #[test]
    fn test_from_choices_collapses_repeats() {
        let picks = vec![
            SlotChoice::new(t("15:00"), HallType::A),
            SlotChoice::new(t("13:00"), HallType::B),
            SlotChoice::new(t("15:00"), HallType::A),
        ];
        let selection = SlotSelection::from_choices(d("2025-06-01"), picks);
        assert_eq!(selection.len(), 2);
        assert_eq!(selection.choices()[0], SlotChoice::new(t("15:00"), HallType::A));
    }

    #[test]
    fn test_slot_json_shape() {
        let key = SlotKey::new(d("2025-06-01"), t("13:10"), HallType::B);
        let slot = TimeSlot::with_seats(key, seat_ids(2));
        let json = serde_json::to_value(&slot).unwrap();

        assert_eq!(json["time"], "13:10");
        assert_eq!(json["date"], "2025-06-01");
        assert_eq!(json["hallType"], "B");
        assert_eq!(json["capacity"], 2);
        assert!(json["seats"][0]["occupant"].is_null());
    }
}
