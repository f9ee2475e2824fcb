use crate::domain::context::AdCookies;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TrackingParams {
    #[serde(default, deserialize_with = "lenient_string")]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub phone: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub first_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub last_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub order_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub amount: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub currency: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub source_url: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub country: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub city: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub state: Option<String>,
}

// Query strings and form bodies carry strings, JSON bodies may carry numbers.
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        Some(serde_json::Value::Bool(b)) => Some(b.to_string()),
        _ => None,
    }
    .filter(|s| !s.trim().is_empty()))
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct HashedUserData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub em: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ph: Option<String>,
    #[serde(rename = "fn", skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(rename = "ln", skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ct: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub st: Option<String>,
}

/// Server-to-server purchase event. `event_id` is the order id so the ad
/// platform can merge it with the browser pixel's copy.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConversionEvent {
    pub event_id: String,
    pub event_time: i64,
    pub user_data: HashedUserData,
    pub client_ip: String,
    pub user_agent: String,
    pub cookies: AdCookies,
    #[serde(with = "rust_decimal::serde::float")]
    pub value: Decimal,
    pub currency: String,
    pub source_url: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RelayOutcome {
    Forwarded,
    Duplicate,
    Unverified,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeliveryReport {
    pub sent: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    pub response: serde_json::Value,
}

impl DeliveryReport {
    pub fn skipped(reason: &str) -> Self {
        Self {
            sent: false,
            status: None,
            response: serde_json::json!({"status": "skipped", "reason": reason}),
        }
    }

    pub fn failed(error: impl std::fmt::Display) -> Self {
        Self {
            sent: false,
            status: None,
            response: serde_json::json!({"error": error.to_string()}),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RelaySummary {
    pub success: bool,
    pub timestamp: String,
    pub event_id: String,
    pub outcome: RelayOutcome,
    pub facebook: DeliveryReport,
    pub zapier: DeliveryReport,
    pub tracking_data: serde_json::Value,
    pub emq_parameters: serde_json::Value,
}
