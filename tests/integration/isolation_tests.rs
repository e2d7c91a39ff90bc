//! Cross-tenant isolation tests
//!
//! Every data-access path is attacked from the other tenant's session; any
//! row that leaks across the partner boundary is the most severe class of
//! defect in this service.

use axum::http::StatusCode;
use serde_json::Value;

use crate::common::{factories, TestApp};

#[tokio::test]
async fn test_bookings_scoped_to_resolved_partner() {
    let app = TestApp::new().await;

    let p1 = factories::create_partner(&app.state.db, "user_1", "partner1").await;
    let p2 = factories::create_partner(&app.state.db, "user_2", "partner2").await;
    let r1 = factories::create_resort(&app.state.db, p1.id, "Cove One", 10000).await;
    let r2 = factories::create_resort(&app.state.db, p2.id, "Cove Two", 20000).await;
    factories::create_booking(&app.state.db, &p1, &r1).await;
    factories::create_booking(&app.state.db, &p2, &r2).await;

    let token1 = app.token_for("user_1");
    let bookings: Vec<Value> = app
        .get_auth("/api/v1/dashboard/bookings", &token1)
        .await
        .json();

    assert_eq!(bookings.len(), 1);
    assert_eq!(bookings[0]["partner_id"], p1.id.to_string());
    assert_eq!(bookings[0]["resort_details"]["name"], "Cove One");
}

#[tokio::test]
async fn test_resorts_scoped_to_resolved_partner() {
    let app = TestApp::new().await;

    let p1 = factories::create_partner(&app.state.db, "user_1", "partner1").await;
    let p2 = factories::create_partner(&app.state.db, "user_2", "partner2").await;
    factories::create_resort(&app.state.db, p1.id, "Cove One", 10000).await;
    factories::create_resort(&app.state.db, p2.id, "Cove Two", 20000).await;

    let token2 = app.token_for("user_2");
    let resorts: Vec<Value> = app
        .get_auth("/api/v1/dashboard/resorts", &token2)
        .await
        .json();

    assert_eq!(resorts.len(), 1);
    assert_eq!(resorts[0]["name"], "Cove Two");
}

#[tokio::test]
async fn test_isolation_under_interleaved_requests() {
    let app = TestApp::new().await;

    let p1 = factories::create_partner(&app.state.db, "user_1", "partner1").await;
    let p2 = factories::create_partner(&app.state.db, "user_2", "partner2").await;
    let r1 = factories::create_resort(&app.state.db, p1.id, "Cove One", 10000).await;
    let r2 = factories::create_resort(&app.state.db, p2.id, "Cove Two", 20000).await;
    factories::create_booking(&app.state.db, &p1, &r1).await;
    factories::create_booking(&app.state.db, &p2, &r2).await;

    let token1 = app.token_for("user_1");
    let token2 = app.token_for("user_2");

    for _ in 0..3 {
        let (b1, b2, res1, res2) = tokio::join!(
            app.get_auth("/api/v1/dashboard/bookings", &token1),
            app.get_auth("/api/v1/dashboard/bookings", &token2),
            app.get_auth("/api/v1/dashboard/resorts", &token1),
            app.get_auth("/api/v1/dashboard/resorts", &token2),
        );

        let b1: Vec<Value> = b1.json();
        let b2: Vec<Value> = b2.json();
        let res1: Vec<Value> = res1.json();
        let res2: Vec<Value> = res2.json();

        assert!(b1.iter().all(|b| b["partner_id"] == p1.id.to_string()));
        assert!(b2.iter().all(|b| b["partner_id"] == p2.id.to_string()));
        assert!(res1.iter().all(|r| r["partner_id"] == p1.id.to_string()));
        assert!(res2.iter().all(|r| r["partner_id"] == p2.id.to_string()));
    }
}

#[tokio::test]
async fn test_deleting_foreign_resort_deletes_nothing() {
    let app = TestApp::new().await;

    let p1 = factories::create_partner(&app.state.db, "user_1", "partner1").await;
    factories::create_partner(&app.state.db, "user_2", "partner2").await;
    let r1 = factories::create_resort(&app.state.db, p1.id, "Cove One", 10000).await;

    // Partner 2 attacks partner 1's resort by id
    let token2 = app.token_for("user_2");
    let response = app
        .delete_auth(&format!("/api/v1/dashboard/resorts/{}", r1.id), &token2)
        .await;
    response.assert_status(StatusCode::NOT_FOUND);

    // The row is intact for its owner
    let token1 = app.token_for("user_1");
    let resorts: Vec<Value> = app
        .get_auth("/api/v1/dashboard/resorts", &token1)
        .await
        .json();
    assert_eq!(resorts.len(), 1);
    assert_eq!(resorts[0]["id"], r1.id.to_string());
}

#[tokio::test]
async fn test_owner_can_delete_own_resort() {
    let app = TestApp::new().await;

    let p1 = factories::create_partner(&app.state.db, "user_1", "partner1").await;
    let r1 = factories::create_resort(&app.state.db, p1.id, "Cove One", 10000).await;

    let token1 = app.token_for("user_1");
    let response = app
        .delete_auth(&format!("/api/v1/dashboard/resorts/{}", r1.id), &token1)
        .await;
    response.assert_status(StatusCode::NO_CONTENT);

    let resorts: Vec<Value> = app
        .get_auth("/api/v1/dashboard/resorts", &token1)
        .await
        .json();
    assert!(resorts.is_empty());
}

#[tokio::test]
async fn test_session_without_partner_is_forbidden() {
    let app = TestApp::new().await;

    // Valid session, but no partner row maps to this user
    let token = app.token_for("user_without_partner");
    let response = app.get_auth("/api/v1/dashboard/bookings", &token).await;
    response.assert_status(StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_storefront_booking_lookup_is_tenant_scoped() {
    let app = TestApp::new().await;

    let p1 = factories::create_partner(&app.state.db, "user_1", "partner1").await;
    // partner2 must exist so its host resolves; it owns no bookings
    factories::create_partner(&app.state.db, "user_2", "partner2").await;
    let r1 = factories::create_resort(&app.state.db, p1.id, "Cove One", 10000).await;
    let booking = factories::create_booking(&app.state.db, &p1, &r1).await;

    // The booking renders on its own storefront
    let response = app
        .get_with_host(&format!("/bookings/{}", booking.id), "partner1.aire.com")
        .await;
    response.assert_ok();

    // The same booking id under another tenant's storefront is missing
    let response = app
        .get_with_host(&format!("/bookings/{}", booking.id), "partner2.aire.com")
        .await;
    response.assert_status(StatusCode::NOT_FOUND);
}
