//! Partner dashboard integration tests

use axum::http::StatusCode;
use serde_json::{json, Value};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::common::{factories, test_config, TestApp};

async fn onboarding_mock() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/accounts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "acct_9new",
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/account_links"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "url": "https://connect.test/onboard/acct_9new",
        })))
        .mount(&server)
        .await;
    server
}

#[tokio::test]
async fn test_partner_onboarding_claims_subdomain() {
    let server = onboarding_mock().await;
    let mut config = test_config();
    config.payments.api_base = server.uri();
    let app = TestApp::with_config(config).await;

    let token = app.token_for("user_1");
    let response = app
        .post_json_auth(
            "/api/v1/dashboard/partners",
            &token,
            &json!({ "subdomain": "Blue-Lagoon" }),
        )
        .await;
    response.assert_status(StatusCode::CREATED);

    let onboarding: Value = response.json();
    // Subdomain is normalized to lowercase on claim
    assert_eq!(onboarding["partner"]["subdomain"], "blue-lagoon");
    assert_eq!(onboarding["partner"]["markup_rate"], 10);
    assert_eq!(
        onboarding["onboarding_url"],
        "https://connect.test/onboard/acct_9new"
    );

    let me: Value = app
        .get_auth("/api/v1/dashboard/partners/me", &token)
        .await
        .json();
    assert_eq!(me["stripe_account_id"], "acct_9new");
}

#[tokio::test]
async fn test_duplicate_subdomain_conflicts() {
    let server = onboarding_mock().await;
    let mut config = test_config();
    config.payments.api_base = server.uri();
    let app = TestApp::with_config(config).await;

    factories::create_partner(&app.state.db, "user_1", "lagoon").await;

    let token = app.token_for("user_2");
    let response = app
        .post_json_auth(
            "/api/v1/dashboard/partners",
            &token,
            &json!({ "subdomain": "lagoon" }),
        )
        .await;
    response.assert_status(StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_invalid_subdomain_rejected() {
    let app = TestApp::new().await;

    let token = app.token_for("user_1");
    for subdomain in ["has spaces", "has.dots", "-leading"] {
        let response = app
            .post_json_auth(
                "/api/v1/dashboard/partners",
                &token,
                &json!({ "subdomain": subdomain }),
            )
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
    }
}

#[tokio::test]
async fn test_update_settings_scoped_to_own_partner() {
    let app = TestApp::new().await;

    factories::create_partner(&app.state.db, "user_1", "partner1").await;
    let other = factories::create_partner(&app.state.db, "user_2", "partner2").await;

    let token = app.token_for("user_1");
    let response = app
        .put_json_auth(
            "/api/v1/dashboard/partners/me/settings",
            &token,
            &json!({ "markup_rate": 25, "brand_tone": "minimal and serene", "logo_url": "" }),
        )
        .await;
    response.assert_ok();

    let updated: Value = response.json();
    assert_eq!(updated["markup_rate"], 25);
    assert_eq!(updated["brand_tone"], "minimal and serene");
    assert!(updated["logo_url"].is_null());

    // The other partner is untouched
    let token2 = app.token_for("user_2");
    let me2: Value = app
        .get_auth("/api/v1/dashboard/partners/me", &token2)
        .await
        .json();
    assert_eq!(me2["markup_rate"], other.markup_rate);
}

#[tokio::test]
async fn test_blank_brand_tone_falls_back_to_default() {
    let app = TestApp::new().await;
    factories::create_partner(&app.state.db, "user_1", "partner1").await;

    let token = app.token_for("user_1");
    let updated: Value = app
        .put_json_auth(
            "/api/v1/dashboard/partners/me/settings",
            &token,
            &json!({ "markup_rate": 10, "brand_tone": "  " }),
        )
        .await
        .json();
    assert_eq!(updated["brand_tone"], "luxurious, warm, and personalized");
}

#[tokio::test]
async fn test_negative_markup_rejected() {
    let app = TestApp::new().await;
    factories::create_partner(&app.state.db, "user_1", "partner1").await;

    let token = app.token_for("user_1");
    let response = app
        .put_json_auth(
            "/api/v1/dashboard/partners/me/settings",
            &token,
            &json!({ "markup_rate": -5 }),
        )
        .await;
    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_create_resort_converts_price_and_parses_amenities() {
    let app = TestApp::new().await;
    factories::create_partner(&app.state.db, "user_1", "partner1").await;

    let token = app.token_for("user_1");
    let response = app
        .post_json_auth(
            "/api/v1/dashboard/resorts",
            &token,
            &json!({
                "name": "Azure Cove",
                "location": "Paradise Island",
                "description": "Quiet and remote",
                "base_price_per_night": 200,
                "amenities": "Pool, Spa , Kids' Club",
            }),
        )
        .await;
    response.assert_status(StatusCode::CREATED);

    let resort: Value = response.json();
    // Dashboard input is whole currency units, rows store cents
    assert_eq!(resort["base_price_per_night"], 20_000);
    assert_eq!(resort["amenities"], json!(["Pool", "Spa", "Kids' Club"]));
}

#[tokio::test]
async fn test_test_email_is_throttled_per_partner() {
    let app = TestApp::new().await;
    factories::create_partner(&app.state.db, "user_1", "partner1").await;
    factories::create_partner(&app.state.db, "user_2", "partner2").await;

    let token = app.token_for("user_1");
    let first = app
        .post_empty_auth("/api/v1/dashboard/partners/me/test-email", &token)
        .await;
    first.assert_ok();
    let body: Value = first.json();
    assert_eq!(body["success"], true);

    let second = app
        .post_empty_auth("/api/v1/dashboard/partners/me/test-email", &token)
        .await;
    second.assert_status(StatusCode::TOO_MANY_REQUESTS);

    // Another partner is not affected by the first partner's throttle
    let token2 = app.token_for("user_2");
    app.post_empty_auth("/api/v1/dashboard/partners/me/test-email", &token2)
        .await
        .assert_ok();
}

#[tokio::test]
async fn test_dashboard_requires_valid_token() {
    let app = TestApp::new().await;

    let response = app.get_auth("/api/v1/dashboard/partners/me", "garbage").await;
    // A malformed token fails the gatekeeper's session-presence check first
    response.assert_status(StatusCode::TEMPORARY_REDIRECT);
}
