//! Integration tests for the LinkPool Server
//!
//! These tests require a running server.
//! Run with: LINKPOOL_TEST_URL=http://127.0.0.1:8080 cargo test

use integration_tests::*;
use uuid::Uuid;

// ============================================================================
// Health Tests
// ============================================================================

#[tokio::test]
async fn test_health_check() {
    let config = TestConfig::new();

    let response = config
        .client
        .get(config.api_url("/health"))
        .send()
        .await
        .expect("Failed to send health request");

    assert!(
        response.status().is_success(),
        "Health check failed with status: {}",
        response.status()
    );

    let health: HealthResponse = response
        .json()
        .await
        .expect("Failed to parse health response");
    assert_eq!(health.status, "healthy");
}

// ============================================================================
// Registry Tests
// ============================================================================

#[tokio::test]
async fn test_create_and_get_link() {
    let config = TestConfig::new();

    let request = CreateLinkRequest::default();
    let link = create_link(&config, &request).await;

    assert!(!link.id.is_empty());
    assert_eq!(link.name, request.name);
    assert_eq!(link.status, "available");
    assert_eq!(link.stats.total_uses, 0);

    let fetched: LinkResponse = config
        .client
        .get(config.api_url(&format!("/links/{}", link.id)))
        .send()
        .await
        .expect("Failed to get link")
        .json()
        .await
        .expect("Failed to parse link");
    assert_eq!(fetched.id, link.id);

    cleanup_link(&config, &link.id).await;
}

#[tokio::test]
async fn test_create_link_rejects_bad_params() {
    let config = TestConfig::new();

    let mut request = CreateLinkRequest::default();
    request.duration_limit = 0;

    let response = config
        .client
        .post(config.api_url("/links"))
        .json(&request)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 400);

    let error: ErrorResponse = response.json().await.expect("Failed to parse error");
    assert_eq!(error.code, 1001);
}

#[tokio::test]
async fn test_listing_never_exposes_credentials() {
    let config = TestConfig::new();

    let link = create_link(&config, &CreateLinkRequest::default()).await;

    let body = config
        .client
        .get(config.api_url("/links"))
        .send()
        .await
        .expect("Failed to list links")
        .text()
        .await
        .expect("Failed to read body");
    assert!(
        !body.contains("host-key"),
        "credentials leaked into the listing"
    );

    cleanup_link(&config, &link.id).await;
}

// ============================================================================
// Booking Flow Tests
// ============================================================================

#[tokio::test]
async fn test_full_booking_cycle() {
    let config = TestConfig::new();
    let link = create_link(&config, &CreateLinkRequest::default()).await;

    let start = next_monday_at(17, 0);
    let end = next_monday_at(19, 0);

    // the fresh link shows up as a candidate
    let candidates: CandidatesResponse = config
        .client
        .get(config.api_url("/links/availability"))
        .query(&[
            ("start_time", start.to_rfc3339()),
            ("end_time", end.to_rfc3339()),
        ])
        .send()
        .await
        .expect("Failed to query availability")
        .json()
        .await
        .expect("Failed to parse candidates");
    assert!(candidates.candidates.iter().any(|c| c.id == link.id));

    // reserve for session A; credentials are handed out here
    let session_a = format!("session-{}", Uuid::new_v4());
    let reserve: ReserveResponse = config
        .client
        .post(config.api_url(&format!("/links/{}/reserve", link.id)))
        .json(&ReserveRequest {
            session_id: session_a.clone(),
            group_id: "group-1".to_string(),
            start_time: start,
            end_time: end,
            reserved_by: "teacher-1".to_string(),
        })
        .send()
        .await
        .expect("Failed to reserve")
        .json()
        .await
        .expect("Failed to parse reserve response");
    assert_eq!(reserve.link.status, "reserved");
    assert_eq!(reserve.credentials, Some("host-key".to_string()));

    // an overlapping window for another session conflicts
    let response = config
        .client
        .post(config.api_url(&format!("/links/{}/reserve", link.id)))
        .json(&ReserveRequest {
            session_id: format!("session-{}", Uuid::new_v4()),
            group_id: "group-2".to_string(),
            start_time: next_monday_at(17, 30),
            end_time: next_monday_at(18, 30),
            reserved_by: "teacher-2".to_string(),
        })
        .send()
        .await
        .expect("Failed to send reserve");
    assert_eq!(response.status(), 409);

    // release with the actual duration
    let record: UsageRecordResponse = config
        .client
        .post(config.api_url(&format!("/links/{}/release", link.id)))
        .json(&ReleaseRequest {
            actual_duration_minutes: Some(115),
        })
        .send()
        .await
        .expect("Failed to release")
        .json()
        .await
        .expect("Failed to parse release response");
    assert_eq!(record.session_id, session_a);
    assert_eq!(record.duration_minutes, 115);

    // stats reflect exactly one use
    let stats: UsageStatsResponse = config
        .client
        .get(config.api_url(&format!("/links/{}/stats", link.id)))
        .send()
        .await
        .expect("Failed to get stats")
        .json()
        .await
        .expect("Failed to parse stats");
    assert_eq!(stats.total_uses, 1);
    assert_eq!(stats.recent_uses, 1);
    assert!((stats.average_usage_minutes - 115.0).abs() < 1e-9);
    assert_eq!(stats.current_status, "available");
    assert!(!stats.is_currently_reserved);

    // a second release is an explicit error
    let response = config
        .client
        .post(config.api_url(&format!("/links/{}/release", link.id)))
        .json(&ReleaseRequest {
            actual_duration_minutes: None,
        })
        .send()
        .await
        .expect("Failed to send release");
    assert_eq!(response.status(), 400);

    cleanup_link(&config, &link.id).await;
}

#[tokio::test]
async fn test_booking_constraints_are_enforced() {
    let config = TestConfig::new();
    let link = create_link(&config, &CreateLinkRequest::default()).await;

    // Tuesday is outside allowed_days
    let tuesday = next_monday_at(17, 0) + chrono::Duration::days(1);
    let response = config
        .client
        .post(config.api_url(&format!("/links/{}/reserve", link.id)))
        .json(&ReserveRequest {
            session_id: format!("session-{}", Uuid::new_v4()),
            group_id: "group-1".to_string(),
            start_time: tuesday,
            end_time: tuesday + chrono::Duration::hours(2),
            reserved_by: "teacher-1".to_string(),
        })
        .send()
        .await
        .expect("Failed to send reserve");
    assert_eq!(response.status(), 400);
    let error: ErrorResponse = response.json().await.expect("Failed to parse error");
    assert_eq!(error.details.as_deref(), Some("day"));

    // one minute over the duration limit
    let response = config
        .client
        .post(config.api_url(&format!("/links/{}/reserve", link.id)))
        .json(&ReserveRequest {
            session_id: format!("session-{}", Uuid::new_v4()),
            group_id: "group-1".to_string(),
            start_time: next_monday_at(16, 0),
            end_time: next_monday_at(18, 1),
            reserved_by: "teacher-1".to_string(),
        })
        .send()
        .await
        .expect("Failed to send reserve");
    assert_eq!(response.status(), 400);
    let error: ErrorResponse = response.json().await.expect("Failed to parse error");
    assert_eq!(error.details.as_deref(), Some("duration"));

    cleanup_link(&config, &link.id).await;
}

#[tokio::test]
async fn test_deleted_link_leaves_the_pool() {
    let config = TestConfig::new();
    let link = create_link(&config, &CreateLinkRequest::default()).await;

    cleanup_link(&config, &link.id).await;

    let listed: ListLinksResponse = config
        .client
        .get(config.api_url("/links"))
        .send()
        .await
        .expect("Failed to list links")
        .json()
        .await
        .expect("Failed to parse list");
    assert!(listed.links.iter().all(|l| l.id != link.id));

    let response = config
        .client
        .post(config.api_url(&format!("/links/{}/reserve", link.id)))
        .json(&ReserveRequest {
            session_id: format!("session-{}", Uuid::new_v4()),
            group_id: "group-1".to_string(),
            start_time: next_monday_at(17, 0),
            end_time: next_monday_at(19, 0),
            reserved_by: "teacher-1".to_string(),
        })
        .send()
        .await
        .expect("Failed to send reserve");
    assert_eq!(response.status(), 404);
}
