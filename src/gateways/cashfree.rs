use crate::config::{GatewayConfig, CASHFREE_API_VERSION};
use crate::domain::error::GatewayError;
use crate::domain::order::{GatewayOrderResult, OrderRequest, OrderStatus};
use crate::domain::payment::{AttemptStatus, PaymentAttempt};
use crate::gateways::PaymentGateway;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};
use serde_json::json;
use std::time::Duration;

pub struct CashfreeGateway {
    pub base_url: String,
    pub client_id: String,
    pub client_secret: String,
    pub timeout_ms: u64,
    pub client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct CreatedOrder {
    order_id: String,
    #[serde(default)]
    payment_session_id: Option<String>,
    #[serde(default)]
    order_status: Option<String>,
    #[serde(default)]
    payment_link: Option<String>,
    #[serde(default)]
    payment_links: Option<PaymentLinks>,
}

#[derive(Debug, Deserialize)]
struct PaymentLinks {
    #[serde(default)]
    web: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CashfreePayment {
    #[serde(default, deserialize_with = "string_or_number")]
    cf_payment_id: Option<String>,
    #[serde(default)]
    payment_status: Option<String>,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    payment_amount: Option<Decimal>,
    #[serde(default)]
    payment_currency: Option<String>,
    #[serde(default)]
    payment_group: Option<String>,
    #[serde(default)]
    payment_time: Option<String>,
    #[serde(default)]
    payment_completion_time: Option<String>,
    #[serde(default)]
    payment_message: Option<String>,
}

impl From<CashfreePayment> for PaymentAttempt {
    fn from(p: CashfreePayment) -> Self {
        Self {
            payment_id: p.cf_payment_id,
            status: AttemptStatus::from(p.payment_status.unwrap_or_default()),
            amount: p.payment_amount,
            currency: p.payment_currency,
            method: p.payment_group,
            payment_time: p.payment_time,
            completion_time: p.payment_completion_time,
            message: p.payment_message,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct CashfreeErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    code: Option<String>,
}

fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<serde_json::Value>::deserialize(deserializer)? {
        Some(serde_json::Value::String(s)) => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

impl CashfreeGateway {
    pub fn from_config(cfg: &GatewayConfig, client: reqwest::Client) -> Self {
        Self {
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
            client_id: cfg.client_id.clone(),
            client_secret: cfg.client_secret.clone(),
            timeout_ms: cfg.timeout_ms,
            client,
        }
    }

    fn authed(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        req.header("x-client-id", &self.client_id)
            .header("x-client-secret", &self.client_secret)
            .header("x-api-version", CASHFREE_API_VERSION)
            .header("Accept", "application/json")
            .timeout(Duration::from_millis(self.timeout_ms))
    }

    fn payments_url(&self, order_id: &str) -> Result<url::Url, GatewayError> {
        let mut url = url::Url::parse(&self.base_url)
            .map_err(|_| GatewayError::new(500, "CONFIG_ERROR", "gateway base url is invalid"))?;
        url.path_segments_mut()
            .map_err(|_| GatewayError::new(500, "CONFIG_ERROR", "gateway base url is invalid"))?
            .pop_if_empty()
            .extend(["orders", order_id, "payments"]);
        Ok(url)
    }
}

fn transport_error(e: reqwest::Error) -> GatewayError {
    if e.is_timeout() {
        tracing::warn!("cashfree request timed out");
        GatewayError::timeout()
    } else {
        tracing::error!("cashfree transport error: {}", e);
        GatewayError::network()
    }
}

async fn error_from_response(resp: reqwest::Response) -> GatewayError {
    let status = resp.status().as_u16();
    let raw = resp.text().await.unwrap_or_default();
    tracing::error!(status, body = %raw, "cashfree returned an error");

    let parsed: CashfreeErrorBody = serde_json::from_str(&raw).unwrap_or_default();
    GatewayError::new(
        status,
        parsed.code.unwrap_or_else(|| format!("HTTP_{}", status)),
        parsed
            .message
            .map(|m| m.chars().take(200).collect::<String>())
            .unwrap_or_else(|| "gateway request failed".to_string()),
    )
}

fn invalid_response(e: reqwest::Error) -> GatewayError {
    tracing::error!("cashfree response did not parse: {}", e);
    GatewayError::new(502, "INVALID_GATEWAY_RESPONSE", "unexpected gateway response")
}

#[async_trait::async_trait]
impl PaymentGateway for CashfreeGateway {
    fn name(&self) -> &'static str {
        "cashfree"
    }

    async fn create_order(&self, order: &OrderRequest) -> Result<GatewayOrderResult, GatewayError> {
        let body = json!({
            "order_id": order.order_id,
            "order_amount": order.amount.to_f64().unwrap_or_default(),
            "order_currency": order.currency,
            "customer_details": {
                "customer_id": order.customer.customer_id,
                "customer_email": order.customer.email,
                "customer_phone": order.customer.phone_e164,
                "customer_name": order.customer.name,
            },
            "order_meta": {
                "return_url": order.return_url,
                "notify_url": order.notify_url,
                "payment_methods": order.payment_methods,
            },
            "order_note": order.order_note,
            "order_tags": {
                "source": order.tags.source,
                "customer_type": order.tags.customer_type,
                "course": order.tags.course,
            },
        });

        let resp = self
            .authed(self.client.post(format!("{}/orders", self.base_url)))
            .json(&body)
            .send()
            .await
            .map_err(transport_error)?;

        if !resp.status().is_success() {
            return Err(error_from_response(resp).await);
        }

        let created: CreatedOrder = resp.json().await.map_err(invalid_response)?;
        let session_id = created
            .payment_session_id
            .filter(|s| !s.is_empty())
            .ok_or_else(|| {
                tracing::error!(order_id = %created.order_id, "cashfree order has no payment_session_id");
                GatewayError::new(502, "MISSING_PAYMENT_SESSION", "gateway returned no payment session")
            })?;

        Ok(GatewayOrderResult {
            status: created
                .order_status
                .as_deref()
                .map(OrderStatus::from_gateway)
                .unwrap_or(OrderStatus::Created),
            payment_link: created.payment_links.and_then(|l| l.web).or(created.payment_link),
            order_id: created.order_id,
            session_id,
        })
    }

    async fn fetch_payments(&self, order_id: &str) -> Result<Vec<PaymentAttempt>, GatewayError> {
        let resp = self
            .authed(self.client.get(self.payments_url(order_id)?))
            .send()
            .await
            .map_err(transport_error)?;

        if !resp.status().is_success() {
            return Err(error_from_response(resp).await);
        }

        let payments: Vec<CashfreePayment> = resp.json().await.map_err(invalid_response)?;
        Ok(payments.into_iter().map(PaymentAttempt::from).collect())
    }
}
