//! Persistence port for the link pool
//!
//! The engine only ever talks to this trait; the production implementation
//! is `SqliteLinkRepository`. Conditional writes are keyed on the row
//! version so a losing concurrent writer observes a clean `false` instead
//! of corrupting state.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::link::{Link, LinkStats, LinkStatus, Reservation, UsageRecord};
use crate::error::Result;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LinkStore: Send + Sync {
    /// Persist a freshly built link
    async fn insert(&self, link: &Link) -> Result<()>;

    /// Load a link by id, soft-deleted rows included
    async fn get(&self, id: &str) -> Result<Link>;

    /// All links with `is_deleted = false` and a bookable status
    async fn list_active(&self) -> Result<Vec<Link>>;

    /// Conditionally move a link to a new status, optionally clearing an
    /// expired reservation in the same write. Returns false on a lost race.
    async fn set_status(
        &self,
        id: &str,
        status: LinkStatus,
        clear_reservation: bool,
        expected_version: i64,
    ) -> Result<bool>;

    /// Soft-delete a link; history is retained
    async fn soft_delete(&self, id: &str) -> Result<()>;

    /// Conditionally install a reservation and set status to `reserved`.
    /// Returns false on a lost race.
    async fn try_reserve(
        &self,
        id: &str,
        expected_version: i64,
        reservation: &Reservation,
    ) -> Result<bool>;

    /// Conditionally clear the reservation, append the usage record and
    /// fold the new stats, all in one transaction. Returns false on a
    /// lost race (nothing is appended in that case).
    async fn try_release(
        &self,
        id: &str,
        expected_version: i64,
        record: &UsageRecord,
        stats: &LinkStats,
    ) -> Result<bool>;

    /// Full usage history for a link, oldest first
    async fn usage_history(&self, link_id: &str) -> Result<Vec<UsageRecord>>;

    /// Usage records with `used_at >= cutoff`, oldest first
    async fn usage_since(&self, link_id: &str, cutoff: DateTime<Utc>) -> Result<Vec<UsageRecord>>;
}
