use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AttemptStatus {
    Success,
    Pending,
    Failed,
    Other(String),
}

impl From<String> for AttemptStatus {
    fn from(raw: String) -> Self {
        match raw.to_ascii_uppercase().as_str() {
            "SUCCESS" => Self::Success,
            "PENDING" => Self::Pending,
            "FAILED" => Self::Failed,
            _ => Self::Other(raw),
        }
    }
}

impl From<AttemptStatus> for String {
    fn from(status: AttemptStatus) -> Self {
        match status {
            AttemptStatus::Success => "SUCCESS".to_string(),
            AttemptStatus::Pending => "PENDING".to_string(),
            AttemptStatus::Failed => "FAILED".to_string(),
            AttemptStatus::Other(raw) => raw,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentAttempt {
    pub payment_id: Option<String>,
    pub status: AttemptStatus,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub amount: Option<Decimal>,
    pub currency: Option<String>,
    pub method: Option<String>,
    pub payment_time: Option<String>,
    pub completion_time: Option<String>,
    pub message: Option<String>,
}

impl PaymentAttempt {
    pub fn with_status(status: AttemptStatus) -> Self {
        Self {
            payment_id: None,
            status,
            amount: None,
            currency: None,
            method: None,
            payment_time: None,
            completion_time: None,
            message: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderVerdict {
    Success,
    Pending,
    Failure,
}

impl OrderVerdict {
    pub fn http_status(&self) -> u16 {
        match self {
            Self::Success => 200,
            Self::Pending => 202,
            Self::Failure => 400,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaymentDetails {
    pub status: OrderVerdict,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    pub currency: String,
    pub payment_method: String,
    pub payment_time: Option<String>,
    pub payment_message: String,
    pub payment_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VerificationResult {
    pub order_id: String,
    pub verdict: OrderVerdict,
    pub details: PaymentDetails,
    pub attempts: Vec<PaymentAttempt>,
}
