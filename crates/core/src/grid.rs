//! Slot grid generator
//!
//! Produces the catalog of bookable time points for a calendar date. The
//! grid only lists candidates; seats are allocated when a ticket is created.

use chrono::{Duration, NaiveDate, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const TIME_FORMAT: &str = "%H:%M";

/// A bookable time point on a given date
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotCandidate {
    #[serde(with = "hhmm")]
    pub time: NaiveTime,
    /// `YYYY-MM-DD-HH:MM`
    pub id: String,
}

/// Daily opening window and step between bookable time points
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotGrid {
    pub open: NaiveTime,
    pub close: NaiveTime,
    pub step_minutes: u32,
}

impl SlotGrid {
    pub fn new(open: NaiveTime, close: NaiveTime, step_minutes: u32) -> Self {
        Self {
            open,
            close,
            step_minutes,
        }
    }

    /// Every time point from `open` to `close` inclusive
    pub fn times(&self) -> Vec<NaiveTime> {
        let mut times = Vec::new();
        if self.step_minutes == 0 {
            return times;
        }

        let step = Duration::minutes(i64::from(self.step_minutes));
        let mut current = self.open;
        while current <= self.close {
            times.push(current);
            let (next, wrapped) = current.overflowing_add_signed(step);
            if wrapped != 0 || next <= current {
                break;
            }
            current = next;
        }
        times
    }

    /// Candidates for `date`, ordered by time
    pub fn candidates(&self, date: NaiveDate) -> Vec<SlotCandidate> {
        self.times()
            .into_iter()
            .map(|time| SlotCandidate {
                time,
                id: candidate_id(date, time),
            })
            .collect()
    }

    /// Whether `time` is one of the grid's time points. Grid points are whole minutes.
    pub fn contains(&self, time: NaiveTime) -> bool {
        if self.step_minutes == 0 || time < self.open || time > self.close {
            return false;
        }
        if time.second() != 0 || time.nanosecond() != 0 {
            return false;
        }
        let offset = (time - self.open).num_minutes();
        offset % i64::from(self.step_minutes) == 0
    }
}

impl Default for SlotGrid {
    /// 13:00 to 21:00, every 10 minutes
    fn default() -> Self {
        Self {
            open: NaiveTime::from_hms_opt(13, 0, 0).unwrap_or(NaiveTime::MIN),
            close: NaiveTime::from_hms_opt(21, 0, 0).unwrap_or(NaiveTime::MIN),
            step_minutes: 10,
        }
    }
}

/// The default daily grid for `date` (49 points, 13:00 through 21:00)
pub fn generate_daily_slots(date: NaiveDate) -> Vec<SlotCandidate> {
    SlotGrid::default().candidates(date)
}

pub fn candidate_id(date: NaiveDate, time: NaiveTime) -> String {
    format!("{}-{}", format_date(date), format_time(time))
}

pub fn parse_date(s: &str) -> Result<NaiveDate, ValidationError> {
    NaiveDate::parse_from_str(s.trim(), DATE_FORMAT)
        .map_err(|_| ValidationError::InvalidDate(s.to_string()))
}

pub fn parse_time(s: &str) -> Result<NaiveTime, ValidationError> {
    NaiveTime::parse_from_str(s.trim(), TIME_FORMAT)
        .map_err(|_| ValidationError::InvalidTime(s.to_string()))
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

pub fn format_time(time: NaiveTime) -> String {
    time.format(TIME_FORMAT).to_string()
}

/// Serde adapter for `HH:MM` times
pub mod hhmm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::format_time(*time))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let s = String::deserialize(deserializer)?;
        super::parse_time(&s).map_err(serde::de::Error::custom)
    }
}
