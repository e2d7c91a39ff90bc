//! Payment webhook integration tests

use axum::http::StatusCode;
use serde_json::{json, Value};

use aire_marketplace::services::payments::sign_webhook_payload;

use crate::common::{factories, TestApp};

const WEBHOOK_SECRET: &str = "whsec_test_secret";

fn completed_event(booking_id: &str) -> Vec<u8> {
    serde_json::to_vec(&json!({
        "type": "checkout.session.completed",
        "data": {
            "object": {
                "client_reference_id": booking_id,
                "customer_details": {
                    "email": "guest@example.com",
                    "name": "Ada Lovelace",
                },
            }
        }
    }))
    .unwrap()
}

async fn post_signed(app: &TestApp, payload: Vec<u8>) -> crate::common::TestResponse {
    let signature = sign_webhook_payload(WEBHOOK_SECRET, 1_700_000_000, &payload);
    app.post_raw(
        "/api/v1/webhooks/stripe",
        &[("Stripe-Signature", signature)],
        payload,
    )
    .await
}

#[tokio::test]
async fn test_invalid_signature_rejected_without_state_change() {
    let app = TestApp::new().await;

    let p1 = factories::create_partner(&app.state.db, "user_1", "partner1").await;
    let r1 = factories::create_resort(&app.state.db, p1.id, "Cove", 10000).await;
    let booking = factories::create_booking(&app.state.db, &p1, &r1).await;

    let payload = completed_event(&booking.id.to_string());
    let bad_signature = sign_webhook_payload("whsec_wrong", 1_700_000_000, &payload);
    let response = app
        .post_raw(
            "/api/v1/webhooks/stripe",
            &[("Stripe-Signature", bad_signature)],
            payload,
        )
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);

    let token = app.token_for("user_1");
    let bookings: Vec<Value> = app
        .get_auth("/api/v1/dashboard/bookings", &token)
        .await
        .json();
    assert_eq!(bookings[0]["status"], "pending");
    assert!(bookings[0]["customer_email"].is_null());
}

#[tokio::test]
async fn test_missing_signature_rejected() {
    let app = TestApp::new().await;

    let response = app
        .post_raw("/api/v1/webhooks/stripe", &[], completed_event("x"))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_verified_event_marks_booking_paid() {
    let app = TestApp::new().await;

    let p1 = factories::create_partner(&app.state.db, "user_1", "partner1").await;
    let r1 = factories::create_resort(&app.state.db, p1.id, "Cove", 10000).await;
    let booking = factories::create_booking(&app.state.db, &p1, &r1).await;

    let response = post_signed(&app, completed_event(&booking.id.to_string())).await;
    response.assert_ok();

    let token = app.token_for("user_1");
    let bookings: Vec<Value> = app
        .get_auth("/api/v1/dashboard/bookings", &token)
        .await
        .json();
    assert_eq!(bookings[0]["status"], "paid");
    assert_eq!(bookings[0]["customer_email"], "guest@example.com");
    assert_eq!(bookings[0]["customer_name"], "Ada Lovelace");
    // Total is immutable through confirmation
    assert_eq!(bookings[0]["total_price"], booking.total_price);
}

#[tokio::test]
async fn test_replayed_event_is_idempotent() {
    let app = TestApp::new().await;

    let p1 = factories::create_partner(&app.state.db, "user_1", "partner1").await;
    let r1 = factories::create_resort(&app.state.db, p1.id, "Cove", 10000).await;
    let booking = factories::create_booking(&app.state.db, &p1, &r1).await;

    let payload = completed_event(&booking.id.to_string());
    post_signed(&app, payload.clone()).await.assert_ok();
    post_signed(&app, payload).await.assert_ok();

    let token = app.token_for("user_1");
    let bookings: Vec<Value> = app
        .get_auth("/api/v1/dashboard/bookings", &token)
        .await
        .json();
    assert_eq!(bookings.len(), 1);
    assert_eq!(bookings[0]["status"], "paid");
    assert_eq!(bookings[0]["customer_email"], "guest@example.com");
}

#[tokio::test]
async fn test_other_event_types_are_acknowledged_without_effect() {
    let app = TestApp::new().await;

    let p1 = factories::create_partner(&app.state.db, "user_1", "partner1").await;
    let r1 = factories::create_resort(&app.state.db, p1.id, "Cove", 10000).await;
    let booking = factories::create_booking(&app.state.db, &p1, &r1).await;

    let payload = serde_json::to_vec(&json!({
        "type": "payment_intent.created",
        "data": { "object": { "client_reference_id": booking.id.to_string() } }
    }))
    .unwrap();

    post_signed(&app, payload).await.assert_ok();

    let token = app.token_for("user_1");
    let bookings: Vec<Value> = app
        .get_auth("/api/v1/dashboard/bookings", &token)
        .await
        .json();
    assert_eq!(bookings[0]["status"], "pending");
}

#[tokio::test]
async fn test_event_for_unknown_booking_is_acknowledged() {
    let app = TestApp::new().await;

    let payload = completed_event(&uuid::Uuid::new_v4().to_string());
    post_signed(&app, payload).await.assert_ok();
}
