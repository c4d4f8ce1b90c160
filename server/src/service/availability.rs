//! Availability finder service

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::domain::availability::{self, AvailabilityCheck};
use crate::domain::link::Link;
use crate::error::{Error, Result};
use crate::infra::store::LinkStore;

/// Finds structurally eligible links for a time window.
///
/// Candidate lists are allowed to go stale; all correctness is re-enforced
/// by the reservation manager against the freshly loaded record.
pub struct AvailabilityFinder {
    store: Arc<dyn LinkStore>,
}

impl AvailabilityFinder {
    /// Create a new finder over the given store
    pub fn new(store: Arc<dyn LinkStore>) -> Self {
        Self { store }
    }

    /// Candidate links for `[start, end)`, least-used first, at most `limit`.
    ///
    /// An empty result is a normal outcome, never an error.
    pub async fn find_candidates(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<Link>> {
        if end <= start {
            return Err(Error::Validation(
                "availability window must end after it starts".to_string(),
            ));
        }

        let now = Utc::now();
        let mut candidates: Vec<Link> = self
            .store
            .list_active()
            .await?
            .into_iter()
            .filter(|link| availability::is_available_for_slot(link, start, end, now))
            .collect();

        candidates.sort_by_key(|link| link.stats.total_uses);
        candidates.truncate(limit);

        debug!(
            "{} candidate link(s) for window {} .. {}",
            candidates.len(),
            start,
            end
        );
        Ok(candidates)
    }

    /// Structured availability diagnostic for one link
    pub async fn check(
        &self,
        link_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<AvailabilityCheck> {
        let link = self.store.get(link_id).await?;
        if link.is_deleted {
            return Err(Error::LinkNotFound(link_id.to_string()));
        }
        Ok(availability::check_availability(&link, start, end))
    }
}
