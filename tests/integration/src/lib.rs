//! Integration test library - common utilities

use std::time::Duration;

use chrono::{DateTime, Datelike, Duration as ChronoDuration, NaiveTime, TimeZone, Utc, Weekday};
use reqwest::Client;
use serde::{Deserialize, Serialize};

/// Test configuration
pub struct TestConfig {
    pub base_url: String,
    pub client: Client,
}

impl TestConfig {
    pub fn new() -> Self {
        let base_url = std::env::var("LINKPOOL_TEST_URL")
            .unwrap_or_else(|_| "http://127.0.0.1:8080".to_string());

        let timeout_secs: u64 = std::env::var("LINKPOOL_TEST_TIMEOUT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(30);

        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .expect("Failed to create HTTP client");

        Self { base_url, client }
    }

    pub fn api_url(&self, path: &str) -> String {
        format!("{}/api/v1{}", self.base_url, path)
    }
}

impl Default for TestConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// First Monday at least a week out, at `hour:minute` UTC
pub fn next_monday_at(hour: u32, minute: u32) -> DateTime<Utc> {
    let mut day = (Utc::now() + ChronoDuration::days(7)).date_naive();
    while day.weekday() != Weekday::Mon {
        day = day.succ_opt().expect("valid date");
    }
    Utc.from_utc_datetime(&day.and_time(NaiveTime::from_hms_opt(hour, minute, 0).unwrap()))
}

/// Time slot wire form
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeSlot {
    pub start: String,
    pub end: String,
}

/// Create link request
#[derive(Debug, Serialize)]
pub struct CreateLinkRequest {
    pub name: String,
    pub platform: String,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credentials: Option<String>,
    pub duration_limit: i64,
    pub allowed_days: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub allowed_time_slots: Vec<TimeSlot>,
}

impl Default for CreateLinkRequest {
    fn default() -> Self {
        Self {
            name: format!("link-{}", uuid::Uuid::new_v4()),
            platform: "zoom".to_string(),
            url: format!("https://zoom.example/j/{}", uuid::Uuid::new_v4()),
            credentials: Some("host-key".to_string()),
            duration_limit: 120,
            allowed_days: vec!["Monday".to_string()],
            allowed_time_slots: vec![TimeSlot {
                start: "16:00".to_string(),
                end: "20:00".to_string(),
            }],
        }
    }
}

/// Link stats block in responses
#[derive(Debug, Deserialize)]
pub struct LinkStatsResponse {
    pub total_uses: i64,
    pub total_hours: f64,
    pub average_usage_minutes: f64,
    pub last_used: Option<String>,
}

/// Link response; the server never serializes credentials here
#[derive(Debug, Deserialize)]
pub struct LinkResponse {
    pub id: String,
    pub name: String,
    pub platform: String,
    pub url: String,
    pub status: String,
    pub duration_limit: i64,
    pub allowed_days: Vec<String>,
    pub stats: LinkStatsResponse,
}

/// List links response
#[derive(Debug, Deserialize)]
pub struct ListLinksResponse {
    pub links: Vec<LinkResponse>,
    pub total: usize,
}

/// Candidates response
#[derive(Debug, Deserialize)]
pub struct CandidatesResponse {
    pub candidates: Vec<LinkResponse>,
    pub total: usize,
}

/// Reserve request
#[derive(Debug, Serialize)]
pub struct ReserveRequest {
    pub session_id: String,
    pub group_id: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub reserved_by: String,
}

/// Reserve response
#[derive(Debug, Deserialize)]
pub struct ReserveResponse {
    pub link: LinkResponse,
    pub credentials: Option<String>,
    pub reserved_until: String,
}

/// Release request
#[derive(Debug, Serialize)]
pub struct ReleaseRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actual_duration_minutes: Option<i64>,
}

/// Usage record response
#[derive(Debug, Deserialize)]
pub struct UsageRecordResponse {
    pub session_id: String,
    pub group_id: String,
    pub duration_minutes: i64,
    pub used_at: String,
}

/// Usage stats response
#[derive(Debug, Deserialize)]
pub struct UsageStatsResponse {
    pub total_uses: i64,
    pub total_hours: f64,
    pub average_usage_minutes: f64,
    pub recent_uses: usize,
    pub usage_by_day: std::collections::BTreeMap<String, i64>,
    pub current_status: String,
    pub is_currently_reserved: bool,
}

/// Error body returned by the server
#[derive(Debug, Deserialize)]
pub struct ErrorResponse {
    pub code: u32,
    pub message: String,
    pub details: Option<String>,
}

/// Health response
#[derive(Debug, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Register a fresh link and return it
pub async fn create_link(config: &TestConfig, request: &CreateLinkRequest) -> LinkResponse {
    let response = config
        .client
        .post(config.api_url("/links"))
        .json(request)
        .send()
        .await
        .expect("Failed to create link");
    assert!(
        response.status().is_success(),
        "Create link failed: {}",
        response.status()
    );
    response.json().await.expect("Failed to parse link response")
}

/// Best-effort cleanup between tests
pub async fn cleanup_link(config: &TestConfig, id: &str) {
    let _ = config
        .client
        .delete(config.api_url(&format!("/links/{}", id)))
        .send()
        .await;
}
