//! Clock and id facilities consumed by the reservation core

use chrono::{DateTime, NaiveDate, Utc};
use rand::Rng;
use uuid::Uuid;

const SEAT_ID_LEN: usize = 9;
const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Source of timestamps and the default booking date
pub trait Clock: Send {
    fn now(&self) -> DateTime<Utc>;

    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock frozen at one instant (tests, replays)
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Source of ticket and seat identifiers
pub trait IdGenerator: Send {
    /// Globally unique ticket id
    fn ticket_id(&mut self) -> Uuid;

    /// Candidate seat id. Uniqueness within a slot is enforced by `allocate_seat_ids`.
    fn seat_id(&mut self) -> String;
}

/// UUID v4 tickets and short random base36 seat ids
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomIds;

impl IdGenerator for RandomIds {
    fn ticket_id(&mut self) -> Uuid {
        Uuid::new_v4()
    }

    fn seat_id(&mut self) -> String {
        let mut rng = rand::thread_rng();
        (0..SEAT_ID_LEN)
            .map(|_| BASE36[rng.gen_range(0..BASE36.len())] as char)
            .collect()
    }
}

/// Deterministic ids: tickets are UUIDs built from a counter, seats are `seat-N`
#[derive(Debug, Clone, Default)]
pub struct SequentialIds {
    next_ticket: u128,
    next_seat: u64,
}

impl SequentialIds {
    pub fn new() -> Self {
        Self::default()
    }
}

impl IdGenerator for SequentialIds {
    fn ticket_id(&mut self) -> Uuid {
        self.next_ticket += 1;
        Uuid::from_u128(self.next_ticket)
    }

    fn seat_id(&mut self) -> String {
        self.next_seat += 1;
        format!("seat-{}", self.next_seat)
    }
}

/// Draw `count` seat ids, distinct from each other
pub fn allocate_seat_ids(ids: &mut dyn IdGenerator, count: usize) -> Vec<String> {
    let mut allocated: Vec<String> = Vec::with_capacity(count);
    while allocated.len() < count {
        let candidate = ids.seat_id();
        if allocated.contains(&candidate) {
            tracing::debug!(seat_id = %candidate, "Seat id collision, drawing again");
            continue;
        }
        allocated.push(candidate);
    }
    allocated
}
