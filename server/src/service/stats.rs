//! Usage statistics service

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::domain::link::LinkStatus;
use crate::error::Result;
use crate::infra::store::LinkStore;

/// Reporting view over a link's usage history
#[derive(Debug, Clone, Serialize)]
pub struct LinkUsageStats {
    pub total_uses: i64,
    pub total_hours: f64,
    pub average_usage_minutes: f64,
    /// Uses inside the trailing window
    pub recent_uses: usize,
    /// Recent uses per calendar day (YYYY-MM-DD)
    pub usage_by_day: BTreeMap<String, i64>,
    pub last_used: Option<DateTime<Utc>>,
    pub current_status: LinkStatus,
    /// Derived from the reservation's own end time; the stored status is
    /// only eventually consistent
    pub is_currently_reserved: bool,
}

/// Read-only metrics over data written by the other services
pub struct UsageStatsCalculator {
    store: Arc<dyn LinkStore>,
}

impl UsageStatsCalculator {
    /// Create a new calculator over the given store
    pub fn new(store: Arc<dyn LinkStore>) -> Self {
        Self { store }
    }

    /// Reporting metrics for a link over the trailing `window_days`
    pub async fn get_stats(&self, link_id: &str, window_days: u32) -> Result<LinkUsageStats> {
        let link = self.store.get(link_id).await?;

        let now = Utc::now();
        let cutoff = now - Duration::days(i64::from(window_days));
        let recent = self.store.usage_since(link_id, cutoff).await?;

        let mut usage_by_day: BTreeMap<String, i64> = BTreeMap::new();
        for record in &recent {
            *usage_by_day
                .entry(record.used_at.date_naive().to_string())
                .or_insert(0) += 1;
        }

        let is_currently_reserved = link
            .current_reservation
            .as_ref()
            .is_some_and(|r| r.end_time > now);

        Ok(LinkUsageStats {
            total_uses: link.stats.total_uses,
            total_hours: link.stats.total_hours,
            average_usage_minutes: link.stats.average_usage_minutes,
            recent_uses: recent.len(),
            usage_by_day,
            last_used: link.stats.last_used,
            current_status: link.status,
            is_currently_reserved,
        })
    }
}
