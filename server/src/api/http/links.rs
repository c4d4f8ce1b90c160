//! Link registry HTTP handlers

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::domain::link::{
    CreateLinkParams, DayOfWeek, Link, LinkStats, LinkStatus, Reservation, TimeSlot,
};
use crate::service::stats::LinkUsageStats;
use crate::{AppState, Error, Result};

/// Create link request
#[derive(Debug, Deserialize)]
pub struct CreateLinkRequest {
    pub name: String,
    pub platform: String,
    pub url: String,
    pub credentials: Option<String>,
    pub duration_limit: i64,
    pub allowed_days: Vec<DayOfWeek>,
    #[serde(default)]
    pub allowed_time_slots: Vec<TimeSlot>,
}

/// Link response; credentials are never exposed in listings
#[derive(Debug, Serialize)]
pub struct LinkResponse {
    pub id: String,
    pub name: String,
    pub platform: String,
    pub url: String,
    pub status: String,
    pub duration_limit: i64,
    pub allowed_days: Vec<DayOfWeek>,
    pub allowed_time_slots: Vec<TimeSlot>,
    pub current_reservation: Option<Reservation>,
    pub stats: LinkStats,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Link> for LinkResponse {
    fn from(link: Link) -> Self {
        Self {
            id: link.id,
            name: link.name,
            platform: link.platform,
            url: link.url,
            status: link.status.as_str().to_string(),
            duration_limit: link.duration_limit,
            allowed_days: link.allowed_days,
            allowed_time_slots: link.allowed_time_slots,
            current_reservation: link.current_reservation,
            stats: link.stats,
            created_at: link.created_at.to_rfc3339(),
            updated_at: link.updated_at.to_rfc3339(),
        }
    }
}

/// List links response
#[derive(Debug, Serialize)]
pub struct ListLinksResponse {
    pub links: Vec<LinkResponse>,
    pub total: usize,
}

/// Status change request
#[derive(Debug, Deserialize)]
pub struct SetStatusRequest {
    pub status: String,
}

/// Stats query parameters
#[derive(Debug, Deserialize)]
pub struct StatsQuery {
    pub window_days: Option<u32>,
}

/// Register a new link
pub async fn create_link(
    State(state): State<AppState>,
    Json(req): Json<CreateLinkRequest>,
) -> Result<Json<LinkResponse>> {
    let params = CreateLinkParams {
        name: req.name,
        platform: req.platform,
        url: req.url,
        credentials: req.credentials,
        duration_limit: req.duration_limit,
        allowed_days: req.allowed_days,
        allowed_time_slots: req.allowed_time_slots,
    };

    let link = state.registry.add(params).await?;
    Ok(Json(link.into()))
}

/// Get a link by ID
pub async fn get_link(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<LinkResponse>> {
    let link = state.registry.get(&id).await?;
    Ok(Json(link.into()))
}

/// List all active links
pub async fn list_links(State(state): State<AppState>) -> Result<Json<ListLinksResponse>> {
    let links = state.registry.list_active().await?;
    let total = links.len();

    Ok(Json(ListLinksResponse {
        links: links.into_iter().map(LinkResponse::from).collect(),
        total,
    }))
}

/// Administratively change a link's status
pub async fn set_link_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<SetStatusRequest>,
) -> Result<Json<LinkResponse>> {
    let status = LinkStatus::from_str(&req.status)
        .ok_or_else(|| Error::Validation(format!("unknown link status: {}", req.status)))?;

    let link = state.registry.set_status(&id, status).await?;
    Ok(Json(link.into()))
}

/// Soft-delete a link
pub async fn delete_link(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>> {
    state.registry.remove(&id).await?;
    Ok(Json(serde_json::json!({ "success": true })))
}

/// Usage statistics for a link
pub async fn get_link_stats(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<StatsQuery>,
) -> Result<Json<LinkUsageStats>> {
    let window_days = query
        .window_days
        .unwrap_or(state.config.stats_window_days);
    let stats = state.stats.get_stats(&id, window_days).await?;
    Ok(Json(stats))
}
