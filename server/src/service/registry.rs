//! Link registry service

use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use crate::domain::link::{CreateLinkParams, Link, LinkStatus};
use crate::error::{Error, Result};
use crate::infra::store::LinkStore;

/// Registry over the pool of link resources and their static constraints
pub struct LinkRegistry {
    store: Arc<dyn LinkStore>,
}

impl LinkRegistry {
    /// Create a new registry over the given store
    pub fn new(store: Arc<dyn LinkStore>) -> Self {
        Self { store }
    }

    /// Register a new link in state `available`
    pub async fn add(&self, params: CreateLinkParams) -> Result<Link> {
        let link = Link::new(params)?;
        self.store.insert(&link).await?;

        info!("Registered link {} ({})", link.id, link.name);
        Ok(link)
    }

    /// Get a link by ID; soft-deleted links stay readable for reporting
    pub async fn get(&self, id: &str) -> Result<Link> {
        self.store.get(id).await
    }

    /// All links that take part in booking (not deleted, available or reserved)
    pub async fn list_active(&self) -> Result<Vec<Link>> {
        self.store.list_active().await
    }

    /// Administratively move a link between available/maintenance/inactive.
    ///
    /// A link holding an unexpired reservation cannot change status; an
    /// expired reservation is cleared in the same write so a retired link
    /// never carries one.
    pub async fn set_status(&self, id: &str, status: LinkStatus) -> Result<Link> {
        let link = self.store.get(id).await?;
        if link.is_deleted {
            return Err(Error::LinkNotFound(id.to_string()));
        }

        let now = Utc::now();
        if link.active_reservation(now).is_some() {
            return Err(Error::ReservationConflict(id.to_string()));
        }

        let clear_reservation = link.current_reservation.is_some();
        let updated = self
            .store
            .set_status(id, status, clear_reservation, link.version)
            .await?;
        if !updated {
            return Err(Error::ReservationConflict(id.to_string()));
        }

        info!("Link {} moved to status {}", id, status);
        self.store.get(id).await
    }

    /// Soft-delete a link; it disappears from lookups but keeps its history
    pub async fn remove(&self, id: &str) -> Result<()> {
        self.store.soft_delete(id).await?;
        info!("Link {} soft-deleted", id);
        Ok(())
    }
}
