//! Pure booking rules
//!
//! Everything here is side-effect free; where "now" matters it is an
//! explicit argument, and reservation expiry is computed lazily from the
//! reservation's own end time, never from a timer.

use chrono::{DateTime, Datelike, NaiveTime, Utc};
use serde::Serialize;

use crate::domain::link::{DayOfWeek, Link, TimeSlot};

/// The booking rule that rejected a window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum BookingRule {
    Status,
    Duration,
    Day,
    TimeSlot,
}

impl BookingRule {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingRule::Status => "status",
            BookingRule::Duration => "duration",
            BookingRule::Day => "day",
            BookingRule::TimeSlot => "timeSlot",
        }
    }
}

impl std::fmt::Display for BookingRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured availability diagnostic
#[derive(Debug, Clone, Serialize)]
pub struct AvailabilityCheck {
    pub available: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<BookingRule>,
    pub duration_minutes: i64,
}

impl AvailabilityCheck {
    fn ok(duration_minutes: i64) -> Self {
        Self {
            available: true,
            reason: None,
            duration_minutes,
        }
    }

    fn rejected(rule: BookingRule, duration_minutes: i64) -> Self {
        Self {
            available: false,
            reason: Some(rule),
            duration_minutes,
        }
    }
}

/// Window length in minutes, rounded to the nearest minute
pub fn window_minutes(start: DateTime<Utc>, end: DateTime<Utc>) -> i64 {
    (((end - start).num_seconds() as f64) / 60.0).round() as i64
}

/// Structural eligibility of a link for a time window.
///
/// Only status and reservation overlap are considered here; the per-link
/// booking constraints are re-validated by `check_availability` at reserve
/// time.
pub fn is_available_for_slot(
    link: &Link,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    now: DateTime<Utc>,
) -> bool {
    if link.is_deleted || !link.status.is_bookable() {
        return false;
    }

    match link.active_reservation(now) {
        Some(reservation) => !reservation.overlaps(start, end),
        None => true,
    }
}

/// Evaluate all booking rules for a window, in order.
///
/// The first failing rule determines the reason; no silent pass-through.
pub fn check_availability(link: &Link, start: DateTime<Utc>, end: DateTime<Utc>) -> AvailabilityCheck {
    let duration = window_minutes(start, end);

    if link.is_deleted || !link.status.is_bookable() {
        return AvailabilityCheck::rejected(BookingRule::Status, duration);
    }

    if duration > link.duration_limit {
        return AvailabilityCheck::rejected(BookingRule::Duration, duration);
    }

    if !link.allows_day(DayOfWeek::from_weekday(start.weekday())) {
        return AvailabilityCheck::rejected(BookingRule::Day, duration);
    }

    if !link.allowed_time_slots.is_empty() {
        // A window that crosses midnight has no time-of-day interval and
        // can never nest inside a slot.
        let same_day = start.date_naive() == end.date_naive();
        let nested = same_day
            && link
                .allowed_time_slots
                .iter()
                .any(|slot| nests_in_slot(slot, start.time(), end.time()));
        if !nested {
            return AvailabilityCheck::rejected(BookingRule::TimeSlot, duration);
        }
    }

    AvailabilityCheck::ok(duration)
}

/// `[start, end)` fully nested within the slot
fn nests_in_slot(slot: &TimeSlot, start: NaiveTime, end: NaiveTime) -> bool {
    slot.start <= start && end <= slot.end
}
