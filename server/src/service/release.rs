//! Release manager service

use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use crate::domain::link::UsageRecord;
use crate::error::{Error, Result};
use crate::infra::store::LinkStore;

/// Frees a link at session end, appending the usage record and folding the
/// rolling statistics in the same conditional write.
pub struct ReleaseManager {
    store: Arc<dyn LinkStore>,
}

impl ReleaseManager {
    /// Create a new release manager over the given store
    pub fn new(store: Arc<dyn LinkStore>) -> Self {
        Self { store }
    }

    /// Release the link's active reservation.
    ///
    /// `actual_duration_minutes` overrides the scheduled window length when
    /// the session ran short or long. Releasing a link with no reservation
    /// is an explicit error, not a no-op.
    pub async fn release(
        &self,
        link_id: &str,
        actual_duration_minutes: Option<i64>,
    ) -> Result<UsageRecord> {
        if let Some(minutes) = actual_duration_minutes {
            if minutes < 0 {
                return Err(Error::Validation(
                    "actual duration must not be negative".to_string(),
                ));
            }
        }

        let link = self.store.get(link_id).await?;
        let reservation = link
            .current_reservation
            .clone()
            .ok_or_else(|| Error::NoActiveReservation(link_id.to_string()))?;

        let duration =
            actual_duration_minutes.unwrap_or_else(|| reservation.scheduled_minutes());

        let record = UsageRecord {
            session_id: reservation.session_id,
            group_id: reservation.group_id,
            start_time: reservation.start_time,
            end_time: reservation.end_time,
            duration_minutes: duration,
            used_at: reservation.reserved_at,
        };

        let now = Utc::now();
        let mut stats = link.stats.clone();
        stats.total_uses += 1;
        stats.total_hours += duration as f64 / 60.0;
        stats.last_used = Some(now);
        stats.average_usage_minutes = stats.total_hours * 60.0 / stats.total_uses as f64;

        let released = self
            .store
            .try_release(link_id, link.version, &record, &stats)
            .await?;
        if !released {
            // a concurrent writer touched the link between load and write
            return Err(Error::ReservationConflict(link_id.to_string()));
        }

        info!(
            "Link {} released after session {} ({} min)",
            link_id, record.session_id, record.duration_minutes
        );
        Ok(record)
    }
}
