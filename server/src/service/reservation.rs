//! Reservation manager service

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::info;

use crate::domain::availability::{self, BookingRule};
use crate::domain::link::{Link, Reservation, ReserveParams};
use crate::error::{Error, Result};
use crate::infra::store::LinkStore;

/// Result of a successful reservation
#[derive(Debug, Clone)]
pub struct ReservationGrant {
    pub link: Link,
    pub credentials: Option<String>,
    pub reserved_until: DateTime<Utc>,
}

/// Atomically claims one link for a session.
///
/// All constraints are re-validated against the freshly loaded record; a
/// candidate list handed out earlier is never trusted. The final write is
/// conditional on the version observed during validation, so of two racing
/// writers exactly one wins and the other sees a conflict.
pub struct ReservationManager {
    store: Arc<dyn LinkStore>,
}

impl ReservationManager {
    /// Create a new reservation manager over the given store
    pub fn new(store: Arc<dyn LinkStore>) -> Self {
        Self { store }
    }

    /// Claim `link_id` for the session described by `params`
    pub async fn reserve(&self, link_id: &str, params: ReserveParams) -> Result<ReservationGrant> {
        if params.end_time <= params.start_time {
            return Err(Error::Validation(
                "reservation window must end after it starts".to_string(),
            ));
        }

        let link = self.store.get(link_id).await?;
        if link.is_deleted {
            return Err(Error::LinkNotFound(link_id.to_string()));
        }

        let check = availability::check_availability(&link, params.start_time, params.end_time);
        if !check.available {
            return Err(match check.reason {
                Some(BookingRule::Status) | None => Error::LinkNotBookable {
                    id: link_id.to_string(),
                    status: link.status,
                },
                Some(rule) => Error::RuleViolation { rule },
            });
        }

        let now = Utc::now();
        if let Some(held) = link.active_reservation(now) {
            // same session re-reserving is idempotent; anyone else conflicts
            if held.session_id != params.session_id {
                return Err(Error::ReservationConflict(link_id.to_string()));
            }
        }

        let reservation = Reservation {
            session_id: params.session_id,
            group_id: params.group_id,
            start_time: params.start_time,
            end_time: params.end_time,
            reserved_at: now,
            reserved_by: params.reserved_by,
        };

        let reserved = self
            .store
            .try_reserve(link_id, link.version, &reservation)
            .await?;
        if !reserved {
            // a concurrent writer got there first
            return Err(Error::ReservationConflict(link_id.to_string()));
        }

        info!(
            "Link {} reserved for session {} until {}",
            link_id, reservation.session_id, reservation.end_time
        );

        let link = self.store.get(link_id).await?;
        Ok(ReservationGrant {
            credentials: link.credentials.clone(),
            reserved_until: reservation.end_time,
            link,
        })
    }
}
