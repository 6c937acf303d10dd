use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tracing::error;

use crate::application::usecases::checkout::{GatewayCapture, GatewayOrder, PaymentGateway};
use crate::config::config_model::PayPal;
use crate::domain::value_objects::money;

/// Minimal PayPal Orders v2 client built on reqwest. Every call runs under
/// the client-level timeout; a timed-out capture leaves the payment row
/// pending/failed and is safe to retry.
pub struct PayPalClient {
    http: reqwest::Client,
    client_id: String,
    client_secret: String,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct OAuthTokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct OrderResponse {
    id: String,
    #[serde(default)]
    links: Vec<OrderLink>,
}

#[derive(Debug, Deserialize)]
struct OrderLink {
    href: String,
    rel: String,
}

#[derive(Debug, Deserialize)]
struct CaptureResponse {
    payer: Option<CapturePayer>,
    #[serde(default)]
    purchase_units: Vec<CapturePurchaseUnit>,
}

#[derive(Debug, Deserialize)]
struct CapturePayer {
    payer_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CapturePurchaseUnit {
    payments: Option<CapturePayments>,
}

#[derive(Debug, Deserialize)]
struct CapturePayments {
    #[serde(default)]
    captures: Vec<Capture>,
}

#[derive(Debug, Deserialize)]
struct Capture {
    id: Option<String>,
    amount: Option<CaptureAmount>,
}

#[derive(Debug, Deserialize)]
struct CaptureAmount {
    value: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PayPalErrorEnvelope {
    name: Option<String>,
    message: Option<String>,
    debug_id: Option<String>,
    #[serde(default)]
    details: Vec<PayPalErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct PayPalErrorDetail {
    issue: Option<String>,
    description: Option<String>,
}

impl PayPalClient {
    pub fn new(config: &PayPal) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self {
            http,
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn ensure_success(resp: reqwest::Response, context: &str) -> Result<reqwest::Response> {
        if resp.status().is_success() {
            return Ok(resp);
        }

        let status = resp.status();
        let body = match resp.text().await {
            Ok(text) if !text.is_empty() => text,
            Ok(_) => "<empty response body>".to_string(),
            Err(err) => format!("<failed to read response body: {err}>"),
        };

        let (error_name, error_message, debug_id, issues) =
            match serde_json::from_str::<PayPalErrorEnvelope>(&body) {
                Ok(envelope) => {
                    let issues = envelope
                        .details
                        .iter()
                        .map(|d| {
                            format!(
                                "{}: {}",
                                d.issue.as_deref().unwrap_or("?"),
                                d.description.as_deref().unwrap_or("?")
                            )
                        })
                        .collect::<Vec<_>>()
                        .join("; ");
                    (envelope.name, envelope.message, envelope.debug_id, issues)
                }
                Err(_) => (None, None, None, String::new()),
            };

        error!(
            status = %status,
            paypal_error_name = ?error_name,
            paypal_error_message = ?error_message,
            paypal_debug_id = ?debug_id,
            paypal_issues = %issues,
            response_body = %body,
            context = %context,
            "paypal api request failed"
        );

        anyhow::bail!(
            "PayPal API request failed: {} (status {}, debug_id={:?})",
            context,
            status,
            debug_id
        );
    }

    /// Client-credentials token. https://developer.paypal.com/api/rest/authentication/
    async fn access_token(&self) -> Result<String> {
        let resp = self
            .http
            .post(format!("{}/v1/oauth2/token", self.base_url))
            .basic_auth(&self.client_id, Some(&self.client_secret))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await?;
        let resp = Self::ensure_success(resp, "oauth token").await?;

        let parsed: OAuthTokenResponse = resp.json().await?;
        Ok(parsed.access_token)
    }

    /// Creates an order. https://developer.paypal.com/docs/api/orders/v2/#orders_create
    pub async fn create_order(
        &self,
        amount_minor: i64,
        currency: &str,
        reference_id: &str,
    ) -> Result<GatewayOrder> {
        let token = self.access_token().await?;

        let body = json!({
            "intent": "CAPTURE",
            "purchase_units": [{
                "reference_id": reference_id,
                "amount": {
                    "currency_code": currency,
                    "value": money::format_minor(amount_minor),
                }
            }]
        });

        let resp = self
            .http
            .post(format!("{}/v2/checkout/orders", self.base_url))
            .bearer_auth(&token)
            .json(&body)
            .send()
            .await?;
        let resp = Self::ensure_success(resp, "create order").await?;

        let parsed: OrderResponse = resp.json().await?;
        let approve_url = parsed
            .links
            .iter()
            .find(|link| link.rel == "approve" || link.rel == "payer-action")
            .map(|link| link.href.clone());

        Ok(GatewayOrder {
            order_id: parsed.id,
            approve_url,
        })
    }

    /// Captures an approved order. https://developer.paypal.com/docs/api/orders/v2/#orders_capture
    pub async fn capture_order(&self, order_id: &str) -> Result<GatewayCapture> {
        let token = self.access_token().await?;

        let resp = self
            .http
            .post(format!(
                "{}/v2/checkout/orders/{}/capture",
                self.base_url, order_id
            ))
            .bearer_auth(&token)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .json(&json!({}))
            .send()
            .await?;
        let resp = Self::ensure_success(resp, "capture order").await?;

        let parsed: CaptureResponse = resp.json().await?;
        let capture = parsed
            .purchase_units
            .first()
            .and_then(|unit| unit.payments.as_ref())
            .and_then(|payments| payments.captures.first());

        let amount_minor = capture
            .and_then(|c| c.amount.as_ref())
            .and_then(|amount| amount.value.as_deref())
            .and_then(|value| money::parse_decimal_minor(value).ok());

        Ok(GatewayCapture {
            capture_ref: capture.and_then(|c| c.id.clone()),
            payer_ref: parsed.payer.and_then(|p| p.payer_id),
            amount_minor,
        })
    }
}

#[async_trait]
impl PaymentGateway for PayPalClient {
    async fn create_order(
        &self,
        amount_minor: i64,
        currency: &str,
        reference_id: &str,
    ) -> Result<GatewayOrder> {
        self.create_order(amount_minor, currency, reference_id)
            .await
    }

    async fn capture_order(&self, order_id: &str) -> Result<GatewayCapture> {
        self.capture_order(order_id).await
    }
}
