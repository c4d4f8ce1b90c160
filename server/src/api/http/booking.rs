//! Booking HTTP handlers

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::api::http::links::LinkResponse;
use crate::domain::availability::AvailabilityCheck;
use crate::domain::link::{ReserveParams, UsageRecord};
use crate::{AppState, Result};

/// Availability query parameters
#[derive(Debug, Deserialize)]
pub struct AvailabilityQuery {
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub limit: Option<usize>,
}

/// Candidate links response
#[derive(Debug, Serialize)]
pub struct CandidatesResponse {
    pub candidates: Vec<LinkResponse>,
    pub total: usize,
}

/// Reserve request
#[derive(Debug, Deserialize)]
pub struct ReserveRequest {
    pub session_id: String,
    pub group_id: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub reserved_by: String,
}

/// Reserve response; the only place credentials are handed out
#[derive(Debug, Serialize)]
pub struct ReserveResponse {
    pub link: LinkResponse,
    pub credentials: Option<String>,
    pub reserved_until: String,
}

/// Release request
#[derive(Debug, Default, Deserialize)]
pub struct ReleaseRequest {
    pub actual_duration_minutes: Option<i64>,
}

/// Candidate links for a time window, least-used first
pub async fn find_candidates(
    State(state): State<AppState>,
    Query(query): Query<AvailabilityQuery>,
) -> Result<Json<CandidatesResponse>> {
    let limit = query.limit.unwrap_or(state.config.candidate_limit);
    let candidates = state
        .finder
        .find_candidates(query.start_time, query.end_time, limit)
        .await?;
    let total = candidates.len();

    Ok(Json(CandidatesResponse {
        candidates: candidates.into_iter().map(LinkResponse::from).collect(),
        total,
    }))
}

/// Structured availability diagnostic for one link
pub async fn check_availability(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<AvailabilityQuery>,
) -> Result<Json<AvailabilityCheck>> {
    let check = state
        .finder
        .check(&id, query.start_time, query.end_time)
        .await?;
    Ok(Json(check))
}

/// Claim a link for a session window
pub async fn reserve_link(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<ReserveRequest>,
) -> Result<Json<ReserveResponse>> {
    let params = ReserveParams {
        session_id: req.session_id,
        group_id: req.group_id,
        start_time: req.start_time,
        end_time: req.end_time,
        reserved_by: req.reserved_by,
    };

    let grant = state.reservations.reserve(&id, params).await?;
    Ok(Json(ReserveResponse {
        credentials: grant.credentials,
        reserved_until: grant.reserved_until.to_rfc3339(),
        link: grant.link.into(),
    }))
}

/// Release a link's active reservation
pub async fn release_link(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<ReleaseRequest>,
) -> Result<Json<UsageRecord>> {
    let record = state
        .releases
        .release(&id, req.actual_duration_minutes)
        .await?;
    Ok(Json(record))
}
