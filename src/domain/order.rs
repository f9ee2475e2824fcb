use crate::config::GatewayEnvironment;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CustomerDetails {
    pub customer_id: String,
    pub email: String,
    pub name: String,
    pub phone_e164: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderTags {
    pub source: String,
    pub customer_type: String,
    pub course: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderRequest {
    pub order_id: String,
    pub amount: Decimal,
    pub currency: String,
    pub customer: CustomerDetails,
    pub return_url: String,
    pub notify_url: String,
    pub payment_methods: String,
    pub order_note: String,
    pub tags: OrderTags,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Created,
    Pending,
    Success,
    Failure,
}

impl OrderStatus {
    pub fn from_gateway(raw: &str) -> Self {
        match raw.to_ascii_uppercase().as_str() {
            "ACTIVE" => Self::Created,
            "PAID" => Self::Success,
            "EXPIRED" | "TERMINATED" | "CANCELLED" => Self::Failure,
            _ => Self::Pending,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GatewayOrderResult {
    pub order_id: String,
    pub session_id: String,
    pub status: OrderStatus,
    pub payment_link: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreatePaymentRequest {
    #[serde(default)]
    pub customer_email: Option<String>,
    #[serde(default)]
    pub customer_name: Option<String>,
    #[serde(default)]
    pub customer_phone: Option<String>,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub order_amount: Option<Decimal>,
    #[serde(default)]
    pub order_currency: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerEcho {
    pub email: String,
    pub name: String,
    pub phone: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePaymentResponse {
    pub success: bool,
    pub order_id: String,
    pub payment_session_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_url: Option<String>,
    pub environment: GatewayEnvironment,
    pub customer_prefilled: bool,
    pub customer_details: CustomerEcho,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    pub currency: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentErrorResponse {
    pub success: bool,
    pub error: String,
    pub code: String,
    pub fallback_url: String,
    pub timestamp: String,
}
