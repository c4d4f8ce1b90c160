//! Link domain model

use chrono::{DateTime, NaiveTime, Utc, Weekday};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Error, Result};

/// Link status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkStatus {
    /// Free for booking
    Available,
    /// Held by a session reservation
    Reserved,
    /// Taken out of rotation for upkeep
    Maintenance,
    /// Administratively disabled
    Inactive,
}

impl LinkStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LinkStatus::Available => "available",
            LinkStatus::Reserved => "reserved",
            LinkStatus::Maintenance => "maintenance",
            LinkStatus::Inactive => "inactive",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "available" => Some(LinkStatus::Available),
            "reserved" => Some(LinkStatus::Reserved),
            "maintenance" => Some(LinkStatus::Maintenance),
            "inactive" => Some(LinkStatus::Inactive),
            _ => None,
        }
    }

    /// Whether booking operations may target a link in this status
    pub fn is_bookable(&self) -> bool {
        matches!(self, LinkStatus::Available | LinkStatus::Reserved)
    }
}

impl std::fmt::Display for LinkStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Day of week a link may be booked on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DayOfWeek {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl DayOfWeek {
    pub fn from_weekday(weekday: Weekday) -> Self {
        match weekday {
            Weekday::Mon => DayOfWeek::Monday,
            Weekday::Tue => DayOfWeek::Tuesday,
            Weekday::Wed => DayOfWeek::Wednesday,
            Weekday::Thu => DayOfWeek::Thursday,
            Weekday::Fri => DayOfWeek::Friday,
            Weekday::Sat => DayOfWeek::Saturday,
            Weekday::Sun => DayOfWeek::Sunday,
        }
    }
}

/// Time-of-day window a link may be booked within
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSlot {
    #[serde(with = "slot_time")]
    pub start: NaiveTime,
    #[serde(with = "slot_time")]
    pub end: NaiveTime,
}

/// Serde helpers for `HH:MM` slot boundaries (`HH:MM:SS` also accepted)
mod slot_time {
    use chrono::NaiveTime;
    use serde::{self, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&time.format("%H:%M").to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let s = String::deserialize(deserializer)?;
        NaiveTime::parse_from_str(&s, "%H:%M")
            .or_else(|_| NaiveTime::parse_from_str(&s, "%H:%M:%S"))
            .map_err(serde::de::Error::custom)
    }
}

/// Active claim on a link by one session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reservation {
    pub session_id: String,
    pub group_id: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub reserved_at: DateTime<Utc>,
    pub reserved_by: String,
}

impl Reservation {
    /// A reservation whose end time has passed no longer blocks the link,
    /// regardless of the stored link status (status is lazily synchronized).
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.end_time <= now
    }

    /// Half-open interval overlap test against `[start, end)`
    pub fn overlaps(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        start < self.end_time && end > self.start_time
    }

    /// Scheduled window length, rounded to the nearest minute
    pub fn scheduled_minutes(&self) -> i64 {
        let seconds = (self.end_time - self.start_time).num_seconds();
        ((seconds as f64) / 60.0).round() as i64
    }
}

/// Parameters supplied when claiming a link
#[derive(Debug, Clone, Deserialize)]
pub struct ReserveParams {
    pub session_id: String,
    pub group_id: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub reserved_by: String,
}

/// Immutable usage history entry, created only on release
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsageRecord {
    pub session_id: String,
    pub group_id: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub duration_minutes: i64,
    pub used_at: DateTime<Utc>,
}

/// Rolling aggregates folded on every release
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LinkStats {
    pub total_uses: i64,
    pub total_hours: f64,
    pub average_usage_minutes: f64,
    pub last_used: Option<DateTime<Utc>>,
}

/// Parameters for registering a link
#[derive(Debug, Clone, Deserialize)]
pub struct CreateLinkParams {
    pub name: String,
    pub platform: String,
    pub url: String,
    pub credentials: Option<String>,
    /// Maximum booking length in minutes
    pub duration_limit: i64,
    pub allowed_days: Vec<DayOfWeek>,
    /// Empty means unrestricted
    #[serde(default)]
    pub allowed_time_slots: Vec<TimeSlot>,
}

/// Link entity — one shared third-party meeting resource
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Link {
    /// Unique identifier
    pub id: String,

    /// Human-readable name
    pub name: String,

    /// Meeting platform this link belongs to
    pub platform: String,

    /// Meeting URL handed to participants
    pub url: String,

    /// Opaque sign-in material; only exposed on a successful reservation
    pub credentials: Option<String>,

    /// Current status
    pub status: LinkStatus,

    /// Soft-delete flag; history is retained
    pub is_deleted: bool,

    /// Maximum booking length in minutes
    pub duration_limit: i64,

    /// Weekdays on which the link may be booked
    pub allowed_days: Vec<DayOfWeek>,

    /// Time-of-day windows; empty means unrestricted
    pub allowed_time_slots: Vec<TimeSlot>,

    /// At most one claim at a time
    pub current_reservation: Option<Reservation>,

    /// Rolling usage aggregates
    pub stats: LinkStats,

    /// Write counter for conditional updates
    pub version: i64,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl Link {
    /// Validate params and build a new link in state `available`.
    ///
    /// This is the only construction path ahead of an insert; the
    /// repository never mutates what it persists.
    pub fn new(params: CreateLinkParams) -> Result<Self> {
        if params.duration_limit <= 0 {
            return Err(Error::Validation(
                "duration_limit must be a positive number of minutes".to_string(),
            ));
        }
        if params.allowed_days.is_empty() {
            return Err(Error::Validation(
                "allowed_days must name at least one weekday".to_string(),
            ));
        }
        for slot in &params.allowed_time_slots {
            if slot.end <= slot.start {
                return Err(Error::Validation(format!(
                    "time slot must end after it starts: {} >= {}",
                    slot.start.format("%H:%M"),
                    slot.end.format("%H:%M"),
                )));
            }
        }

        let now = Utc::now();
        Ok(Self {
            id: Uuid::new_v4().to_string(),
            name: params.name,
            platform: params.platform,
            url: params.url,
            credentials: params.credentials,
            status: LinkStatus::Available,
            is_deleted: false,
            duration_limit: params.duration_limit,
            allowed_days: params.allowed_days,
            allowed_time_slots: params.allowed_time_slots,
            current_reservation: None,
            stats: LinkStats::default(),
            version: 0,
            created_at: now,
            updated_at: now,
        })
    }

    /// Whether the given weekday is bookable for this link
    pub fn allows_day(&self, day: DayOfWeek) -> bool {
        self.allowed_days.contains(&day)
    }

    /// The reservation currently blocking this link, if any.
    /// An expired reservation is treated as already gone.
    pub fn active_reservation(&self, now: DateTime<Utc>) -> Option<&Reservation> {
        self.current_reservation
            .as_ref()
            .filter(|r| !r.is_expired(now))
    }
}
