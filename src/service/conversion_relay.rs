use crate::config::RelayConfig;
use crate::domain::context::ClientContext;
use crate::domain::conversion::{
    ConversionEvent, DeliveryReport, HashedUserData, RelayOutcome, RelaySummary, TrackingParams,
};
use crate::domain::error::RelayDeliveryError;
use crate::domain::payment::OrderVerdict;
use crate::service::order_builder::normalize_phone_strict;
use crate::service::status_verifier::StatusVerifier;
use crate::service::webhook_dispatcher::WebhookDispatcher;
use chrono::{DateTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use sha2::{Digest, Sha256};
use std::collections::{HashSet, VecDeque};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

const LEDGER_CAPACITY: usize = 10_000;

/// SHA-256 hex of the lowercased, trimmed value. Empty input yields `None`
/// so blank fields are omitted instead of hashed.
pub fn hash_pii(value: &str) -> Option<String> {
    let normalized = value.trim().to_lowercase();
    if normalized.is_empty() {
        return None;
    }
    Some(hex::encode(Sha256::digest(normalized.as_bytes())))
}

pub fn hash_user_data(params: &TrackingParams, calling_digits: &str) -> HashedUserData {
    let hash_opt = |v: &Option<String>| v.as_deref().and_then(hash_pii);
    HashedUserData {
        em: hash_opt(&params.email),
        ph: params
            .phone
            .as_deref()
            .and_then(|p| normalize_phone_strict(p, calling_digits))
            .and_then(|p| hash_pii(&p)),
        first_name: hash_opt(&params.first_name),
        last_name: hash_opt(&params.last_name),
        country: hash_pii(params.country.as_deref().unwrap_or("IN")),
        ct: hash_opt(&params.city),
        st: hash_opt(&params.state),
    }
}

#[derive(Debug, Default)]
struct RelayLedger {
    seen: HashSet<String>,
    order: VecDeque<String>,
}

impl RelayLedger {
    fn insert(&mut self, order_id: &str) -> bool {
        if !self.seen.insert(order_id.to_string()) {
            return false;
        }
        self.order.push_back(order_id.to_string());
        if self.order.len() > LEDGER_CAPACITY {
            if let Some(oldest) = self.order.pop_front() {
                self.seen.remove(&oldest);
            }
        }
        true
    }
}

#[derive(Clone)]
pub struct ConversionRelay {
    pub config: RelayConfig,
    pub calling_digits: String,
    pub default_value: Decimal,
    pub default_currency: String,
    pub client: reqwest::Client,
    pub webhooks: WebhookDispatcher,
    pub verifier: StatusVerifier,
    ledger: Arc<Mutex<RelayLedger>>,
}

impl ConversionRelay {
    pub fn new(
        config: RelayConfig,
        calling_digits: &str,
        default_value: Decimal,
        default_currency: &str,
        client: reqwest::Client,
        verifier: StatusVerifier,
    ) -> Self {
        let webhooks = WebhookDispatcher::new(client.clone(), Duration::from_millis(config.timeout_ms));
        Self {
            config,
            calling_digits: calling_digits.to_string(),
            default_value,
            default_currency: default_currency.to_string(),
            client,
            webhooks,
            verifier,
            ledger: Arc::new(Mutex::new(RelayLedger::default())),
        }
    }

    pub fn build_event(
        &self,
        params: &TrackingParams,
        ctx: &ClientContext,
        order_id: &str,
        now: DateTime<Utc>,
    ) -> ConversionEvent {
        ConversionEvent {
            event_id: order_id.to_string(),
            event_time: now.timestamp(),
            user_data: hash_user_data(params, &self.calling_digits),
            client_ip: ctx.client_ip.clone(),
            user_agent: ctx.user_agent.clone(),
            cookies: ctx.cookies.clone(),
            value: params
                .amount
                .as_deref()
                .and_then(|a| Decimal::from_str(a.trim()).ok())
                .unwrap_or(self.default_value),
            currency: params
                .currency
                .clone()
                .unwrap_or_else(|| self.default_currency.clone()),
            source_url: params
                .source_url
                .clone()
                .unwrap_or_else(|| self.config.site_url.clone()),
        }
    }

    pub async fn relay(&self, mut params: TrackingParams, ctx: ClientContext) -> RelaySummary {
        let now = Utc::now();

        let order_id = match params.order_id.clone() {
            Some(id) => id,
            None if self.config.require_verified => {
                tracing::warn!("conversion relay called without order_id, not forwarding");
                return self.summary(now, String::new(), RelayOutcome::Unverified, &params, &ctx, None);
            }
            None => format!("order_{}", now.timestamp_millis()),
        };

        if self.config.require_verified {
            match self.verifier.verify(&order_id).await {
                Ok(result) if result.verdict == OrderVerdict::Success => {
                    // The gateway's figures beat whatever the page reported.
                    if result.details.amount > Decimal::ZERO {
                        params.amount = Some(result.details.amount.to_string());
                        params.currency = Some(result.details.currency.clone());
                    }
                }
                Ok(result) => {
                    tracing::warn!(order_id = %order_id, verdict = ?result.verdict, "order not paid, conversion not forwarded");
                    return self.summary(now, order_id, RelayOutcome::Unverified, &params, &ctx, None);
                }
                Err(e) => {
                    tracing::warn!(order_id = %order_id, error = %e, "order verification failed, conversion not forwarded");
                    return self.summary(now, order_id, RelayOutcome::Unverified, &params, &ctx, None);
                }
            }
        }

        if !self.ledger.lock().await.insert(&order_id) {
            tracing::info!(order_id = %order_id, "conversion already relayed");
            return self.summary(now, order_id, RelayOutcome::Duplicate, &params, &ctx, None);
        }

        let event = self.build_event(&params, &ctx, &order_id, now);

        let facebook = match self.send_conversion(&event).await {
            Ok((status, response)) => {
                tracing::info!(order_id = %order_id, status, "conversion event delivered");
                DeliveryReport {
                    sent: true,
                    status: Some(status),
                    response,
                }
            }
            Err(RelayDeliveryError::NotConfigured(target)) => {
                tracing::warn!("{} not configured, conversion event skipped", target);
                DeliveryReport::skipped("not configured")
            }
            Err(e) => {
                tracing::warn!(order_id = %order_id, error = %e, "conversion event delivery failed");
                DeliveryReport::failed(e)
            }
        };

        let zapier = if params.email.is_some() && params.phone.is_some() {
            let payload = self.backup_payload(&params, &ctx, &event, &facebook.response);
            match self
                .webhooks
                .emit(
                    "backup webhook",
                    self.config.backup_webhook_url.as_deref(),
                    "purchase",
                    &payload,
                )
                .await
            {
                Ok(response) => DeliveryReport {
                    sent: true,
                    status: None,
                    response,
                },
                Err(RelayDeliveryError::NotConfigured(_)) => DeliveryReport::skipped("not configured"),
                Err(e) => {
                    tracing::warn!(order_id = %order_id, error = %e, "backup webhook failed");
                    DeliveryReport::failed(e)
                }
            }
        } else {
            tracing::info!(order_id = %order_id, "backup webhook skipped, no customer email/phone");
            DeliveryReport::skipped("no customer data")
        };

        let mut summary = self.summary(now, order_id, RelayOutcome::Forwarded, &params, &ctx, Some(&event));
        summary.facebook = facebook;
        summary.zapier = zapier;
        summary
    }

    async fn send_conversion(
        &self,
        event: &ConversionEvent,
    ) -> Result<(u16, serde_json::Value), RelayDeliveryError> {
        const TARGET: &str = "conversions api";
        let url = self
            .config
            .events_url()
            .ok_or(RelayDeliveryError::NotConfigured(TARGET))?;
        let token = self
            .config
            .access_token
            .as_deref()
            .ok_or(RelayDeliveryError::NotConfigured(TARGET))?;

        let resp = self
            .client
            .post(url)
            .bearer_auth(token)
            .json(&self.conversion_payload(event))
            .timeout(Duration::from_millis(self.config.timeout_ms))
            .send()
            .await
            .map_err(|source| RelayDeliveryError::Transport { target: TARGET, source })?;

        let status = resp.status().as_u16();
        if !resp.status().is_success() {
            return Err(RelayDeliveryError::Status { target: TARGET, status });
        }
        let body = resp.json::<serde_json::Value>().await.unwrap_or_default();
        Ok((status, body))
    }

    pub fn conversion_payload(&self, event: &ConversionEvent) -> serde_json::Value {
        let mut user_data = serde_json::json!({
            "client_ip_address": event.client_ip,
            "client_user_agent": event.user_agent,
        });
        if let (Some(target), Ok(serde_json::Value::Object(hashed))) =
            (user_data.as_object_mut(), serde_json::to_value(&event.user_data))
        {
            target.extend(hashed);
            if let Some(fbc) = &event.cookies.fbc {
                target.insert("fbc".to_string(), fbc.clone().into());
            }
            if let Some(fbp) = &event.cookies.fbp {
                target.insert("fbp".to_string(), fbp.clone().into());
            }
        }

        let mut payload = serde_json::json!({
            "data": [{
                "event_name": "Purchase",
                "event_time": event.event_time,
                "event_id": event.event_id,
                "action_source": "website",
                "event_source_url": event.source_url,
                "user_data": user_data,
                "custom_data": {
                    "currency": event.currency,
                    "value": event.value.to_f64().unwrap_or_default(),
                    "content_name": self.config.content_name,
                    "content_category": "Online Course",
                    "content_ids": [self.config.content_id],
                    "content_type": "product",
                    "num_items": 1,
                },
            }],
        });
        if let (Some(code), Some(obj)) = (&self.config.test_event_code, payload.as_object_mut()) {
            obj.insert("test_event_code".to_string(), code.clone().into());
        }
        payload
    }

    fn backup_payload(
        &self,
        params: &TrackingParams,
        ctx: &ClientContext,
        event: &ConversionEvent,
        facebook_response: &serde_json::Value,
    ) -> serde_json::Value {
        serde_json::json!({
            "event_type": "purchase",
            "timestamp": Utc::now().to_rfc3339(),
            "customer": {
                "email": params.email,
                "phone": params.phone,
                "first_name": params.first_name,
                "last_name": params.last_name,
            },
            "order": {
                "order_id": event.event_id,
                "amount": event.value.to_f64().unwrap_or_default(),
                "currency": event.currency,
                "product": self.config.content_name,
            },
            "tracking": {
                "client_ip": ctx.client_ip,
                "user_agent": ctx.user_agent,
                "facebook_cookies": ctx.cookies,
                "event_id": event.event_id,
                "source_url": event.source_url,
            },
            "facebook_response": facebook_response,
        })
    }

    fn summary(
        &self,
        now: DateTime<Utc>,
        event_id: String,
        outcome: RelayOutcome,
        params: &TrackingParams,
        ctx: &ClientContext,
        event: Option<&ConversionEvent>,
    ) -> RelaySummary {
        let hashed = event
            .map(|e| e.user_data.clone())
            .unwrap_or_else(|| hash_user_data(params, &self.calling_digits));
        let mark = |present: bool| if present { "captured" } else { "missing" };
        let mut user_agent: String = ctx.user_agent.chars().take(100).collect();
        if ctx.user_agent.chars().count() > 100 {
            user_agent.push_str("...");
        }

        let skipped = match outcome {
            RelayOutcome::Forwarded => "pending",
            RelayOutcome::Duplicate => "duplicate order",
            RelayOutcome::Unverified => "order not verified as paid",
        };

        RelaySummary {
            success: true,
            timestamp: now.to_rfc3339(),
            event_id,
            outcome,
            facebook: DeliveryReport::skipped(skipped),
            zapier: DeliveryReport::skipped(skipped),
            tracking_data: serde_json::json!({
                "client_ip": ctx.client_ip,
                "user_agent": user_agent,
                "facebook_cookies": ctx.cookies,
                "customer_data_hashed": {
                    "email": hashed.em.is_some(),
                    "phone": hashed.ph.is_some(),
                    "name": hashed.first_name.is_some() && hashed.last_name.is_some(),
                },
            }),
            emq_parameters: serde_json::json!({
                "client_ip_address": mark(!ctx.client_ip.is_empty()),
                "client_user_agent": mark(!ctx.user_agent.is_empty()),
                "fbc": mark(ctx.cookies.fbc.is_some()),
                "fbp": mark(ctx.cookies.fbp.is_some()),
                "hashed_email": mark(hashed.em.is_some()),
                "hashed_phone": mark(hashed.ph.is_some()),
                "geographic_data": mark(hashed.country.is_some()),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::context::AdCookies;
    use crate::domain::payment::{AttemptStatus, PaymentAttempt};
    use crate::gateways::mock::{MockBehavior, MockGateway};
    use rust_decimal_macros::dec;

    fn relay(require_verified: bool, attempts: Vec<PaymentAttempt>) -> ConversionRelay {
        let verifier = StatusVerifier {
            gateway: Arc::new(MockGateway::new(MockBehavior::AlwaysSuccess).with_attempts(attempts)),
            default_currency: "INR".to_string(),
        };
        let config = RelayConfig {
            require_verified,
            ..RelayConfig::default()
        };
        ConversionRelay::new(config, "91", dec!(1499.00), "INR", reqwest::Client::new(), verifier)
    }

    fn ctx() -> ClientContext {
        ClientContext {
            client_ip: "203.0.113.7".to_string(),
            user_agent: "Mozilla/5.0".to_string(),
            cookies: AdCookies {
                fbc: Some("fb.1.1.click".to_string()),
                fbp: None,
            },
        }
    }

    fn params(order_id: &str) -> TrackingParams {
        TrackingParams {
            email: Some("Test@Example.com".to_string()),
            phone: Some("98765 43210".to_string()),
            first_name: Some("Asha".to_string()),
            last_name: Some("".to_string()),
            order_id: Some(order_id.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn hashing_ignores_case_and_whitespace() {
        assert_eq!(hash_pii("  Test@Example.com "), hash_pii("test@example.com"));
        assert_eq!(
            hash_pii("test@example.com").as_deref(),
            Some("973dfe463ec85785f5f95af5ba3906eedb2d931c24e69824a89ea65dba4e813b")
        );
        assert_eq!(hash_pii("   "), None);
    }

    #[test]
    fn phone_is_normalized_before_hashing() {
        let a = hash_user_data(&params("x"), "91");
        let mut p = params("x");
        p.phone = Some("+919876543210".to_string());
        let b = hash_user_data(&p, "91");
        assert_eq!(a.ph, b.ph);
        assert_eq!(a.ph, hash_pii("+919876543210"));
        assert!(a.last_name.is_none());
    }

    #[test]
    fn event_id_is_the_order_id() {
        let r = relay(false, Vec::new());
        let event = r.build_event(&params("BTD_42"), &ctx(), "BTD_42", Utc::now());
        assert_eq!(event.event_id, "BTD_42");
        assert_eq!(event.value, dec!(1499.00));
        let payload = r.conversion_payload(&event);
        let data = &payload["data"][0];
        assert_eq!(data["event_id"], "BTD_42");
        assert_eq!(data["user_data"]["fbc"], "fb.1.1.click");
        assert!(data["user_data"].get("fbp").is_none());
        assert!(data["user_data"].get("ln").is_none());
        assert_eq!(data["custom_data"]["value"], 1499.0);
    }

    #[tokio::test]
    async fn second_relay_for_same_order_is_a_duplicate() {
        let r = relay(false, Vec::new());
        let first = r.relay(params("BTD_dup"), ctx()).await;
        let second = r.relay(params("BTD_dup"), ctx()).await;
        assert_eq!(first.outcome, RelayOutcome::Forwarded);
        assert_eq!(second.outcome, RelayOutcome::Duplicate);
        assert!(first.success && second.success);
    }

    #[tokio::test]
    async fn unpaid_orders_are_not_forwarded_when_gated() {
        let r = relay(true, vec![PaymentAttempt::with_status(AttemptStatus::Pending)]);
        let summary = r.relay(params("BTD_pending"), ctx()).await;
        assert_eq!(summary.outcome, RelayOutcome::Unverified);
        assert!(!summary.facebook.sent);
    }

    #[tokio::test]
    async fn paid_orders_forward_even_without_configured_targets() {
        let mut paid = PaymentAttempt::with_status(AttemptStatus::Success);
        paid.amount = Some(dec!(1499));
        let r = relay(true, vec![paid]);
        let summary = r.relay(params("BTD_paid"), ctx()).await;
        assert_eq!(summary.outcome, RelayOutcome::Forwarded);
        assert!(!summary.facebook.sent);
        assert_eq!(summary.facebook.response["reason"], "not configured");
        assert_eq!(summary.tracking_data["customer_data_hashed"]["email"], true);
        assert_eq!(summary.tracking_data["customer_data_hashed"]["name"], false);
    }
}
