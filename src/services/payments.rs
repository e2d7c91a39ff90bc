//! Payment settlement bridge
//!
//! Translates a priced booking into the gateway's checkout-session and
//! transfer parameters, and authenticates inbound webhook events. The split
//! contract: the platform retains exactly the base price as its application
//! fee; the partner receives total minus base, minus gateway processing fees.
//! Partners without a real payout account get no transfer at all; the full
//! amount stays with the platform and the booking still proceeds.

use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;
use tracing::info;
use uuid::Uuid;

use crate::config::PaymentsConfig;
use crate::utils::{AppError, AppResult};

type HmacSha256 = Hmac<Sha256>;

/// Client for the hosted-checkout payment gateway.
pub struct StripeGateway {
    http: reqwest::Client,
    config: PaymentsConfig,
}

/// Parameters for a hosted checkout session.
#[derive(Debug, Clone)]
pub struct CheckoutParams {
    pub booking_id: Uuid,
    pub resort_name: String,
    /// Human-readable line-item description, e.g. "5 nights at Bora Bora"
    pub description: String,
    /// Customer-facing total in cents
    pub total_price: i64,
    /// Platform retention in cents
    pub base_price: i64,
    pub customer_email: Option<String>,
    /// Real payout account id, or None to retain the full amount
    pub payout_account: Option<String>,
    /// Base URL for success/cancel redirects
    pub app_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutSession {
    pub id: String,
    /// Hosted page the customer is redirected to
    pub url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GatewayAccount {
    id: String,
}

#[derive(Debug, Deserialize)]
struct AccountLink {
    url: String,
}

/// Inbound webhook event, after signature verification.
#[derive(Debug, Deserialize)]
pub struct WebhookEvent {
    #[serde(rename = "type")]
    pub event_type: String,
    pub data: WebhookEventData,
}

#[derive(Debug, Deserialize)]
pub struct WebhookEventData {
    pub object: CheckoutSessionObject,
}

#[derive(Debug, Deserialize)]
pub struct CheckoutSessionObject {
    pub client_reference_id: Option<String>,
    #[serde(default)]
    pub customer_details: Option<CustomerDetails>,
    #[serde(default)]
    pub customer_email: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CustomerDetails {
    pub email: Option<String>,
    pub name: Option<String>,
}

impl CheckoutSessionObject {
    /// Prefer the detailed customer record, fall back to the plain field.
    pub fn email(&self) -> Option<&str> {
        self.customer_details
            .as_ref()
            .and_then(|d| d.email.as_deref())
            .or(self.customer_email.as_deref())
    }

    pub fn name(&self) -> Option<&str> {
        self.customer_details.as_ref().and_then(|d| d.name.as_deref())
    }
}

impl StripeGateway {
    pub fn new(config: PaymentsConfig) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { http, config })
    }

    pub fn webhook_secret(&self) -> &str {
        &self.config.webhook_secret
    }

    /// Create an express payout account for a new partner.
    pub async fn create_express_account(&self) -> AppResult<String> {
        let params = [
            ("type", "express"),
            ("capabilities[card_payments][requested]", "true"),
            ("capabilities[transfers][requested]", "true"),
        ];

        let account: GatewayAccount = self
            .post_form("/v1/accounts", &params)
            .await
            .map_err(|e| AppError::payment_gateway(format!("Account creation failed: {}", e)))?;

        Ok(account.id)
    }

    /// Create an onboarding link for a freshly created payout account.
    pub async fn create_account_link(&self, account_id: &str, app_url: &str) -> AppResult<String> {
        let dashboard_url = format!("{}/dashboard", app_url);
        let params = [
            ("account", account_id),
            ("refresh_url", dashboard_url.as_str()),
            ("return_url", dashboard_url.as_str()),
            ("type", "account_onboarding"),
        ];

        let link: AccountLink = self
            .post_form("/v1/account_links", &params)
            .await
            .map_err(|e| AppError::payment_gateway(format!("Account link failed: {}", e)))?;

        Ok(link.url)
    }

    /// Request a hosted checkout session for a priced booking.
    pub async fn create_checkout_session(
        &self,
        params: &CheckoutParams,
    ) -> AppResult<CheckoutSession> {
        let booking_id = params.booking_id.to_string();
        let unit_amount = params.total_price.to_string();
        let fee_amount = params.base_price.to_string();
        let success_url = format!("{}/success/{}", params.app_url, params.booking_id);
        let cancel_url = format!("{}/", params.app_url);

        let mut form: Vec<(&str, &str)> = vec![
            ("mode", "payment"),
            ("line_items[0][price_data][currency]", "usd"),
            (
                "line_items[0][price_data][product_data][name]",
                &params.resort_name,
            ),
            (
                "line_items[0][price_data][product_data][description]",
                &params.description,
            ),
            ("line_items[0][price_data][unit_amount]", &unit_amount),
            ("line_items[0][quantity]", "1"),
            ("client_reference_id", &booking_id),
            ("success_url", &success_url),
            ("cancel_url", &cancel_url),
        ];

        if let Some(email) = params.customer_email.as_deref() {
            form.push(("customer_email", email));
        }

        if let Some(account) = params.payout_account.as_deref() {
            form.push(("payment_intent_data[application_fee_amount]", &fee_amount));
            form.push(("payment_intent_data[transfer_data][destination]", account));
        }

        let session: CheckoutSession = self
            .post_form("/v1/checkout/sessions", &form)
            .await
            .map_err(|e| AppError::payment_gateway(format!("Checkout session failed: {}", e)))?;

        info!(
            total = params.total_price,
            platform_fee = params.base_price,
            partner_share = params.total_price - params.base_price,
            split = params.payout_account.is_some(),
            "Checkout session created"
        );

        Ok(session)
    }

    async fn post_form<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        form: &[(&str, &str)],
    ) -> anyhow::Result<T> {
        let url = format!("{}{}", self.config.api_base, path);
        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.config.secret_key)
            .form(form)
            .send()
            .await?
            .error_for_status()?;

        Ok(response.json().await?)
    }
}

/// Verify a gateway webhook signature header of the form `t=...,v1=...`.
///
/// The signed payload is `"{t}.{body}"` and the signature is HMAC-SHA256
/// under the shared webhook secret. Comparison is constant-time.
pub fn verify_webhook_signature(secret: &str, payload: &[u8], signature_header: &str) -> bool {
    let mut timestamp = None;
    let mut candidates = Vec::new();

    for part in signature_header.split(',') {
        match part.trim().split_once('=') {
            Some(("t", value)) => timestamp = Some(value),
            Some(("v1", value)) => candidates.push(value),
            _ => {}
        }
    }

    let timestamp = match timestamp {
        Some(t) => t,
        None => return false,
    };
    if candidates.is_empty() {
        return false;
    }

    let mut signed_payload = Vec::with_capacity(timestamp.len() + 1 + payload.len());
    signed_payload.extend_from_slice(timestamp.as_bytes());
    signed_payload.push(b'.');
    signed_payload.extend_from_slice(payload);

    candidates.iter().any(|candidate| {
        let signature_bytes = match hex::decode(candidate) {
            Ok(b) => b,
            Err(_) => return false,
        };

        let mut mac = match HmacSha256::new_from_slice(secret.as_bytes()) {
            Ok(m) => m,
            Err(_) => return false,
        };

        mac.update(&signed_payload);
        mac.verify_slice(&signature_bytes).is_ok()
    })
}

/// Produce a valid signature header for a payload. Used by operator tooling
/// and tests to exercise the webhook endpoint.
pub fn sign_webhook_payload(secret: &str, timestamp: i64, payload: &[u8]) -> String {
    let mut signed_payload = Vec::new();
    signed_payload.extend_from_slice(timestamp.to_string().as_bytes());
    signed_payload.push(b'.');
    signed_payload.extend_from_slice(payload);

    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC accepts any key length");
    mac.update(&signed_payload);
    let signature = hex::encode(mac.finalize().into_bytes());

    format!("t={},v1={}", timestamp, signature)
}
