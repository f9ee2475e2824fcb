use serde::Serialize;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please enter a valid First Name (alphabets, spaces, hyphens, apostrophes only, min 2 characters).")]
    FirstName,
    #[error("Please enter a valid Last Name (alphabets, spaces, hyphens, apostrophes only, min 2 characters).")]
    LastName,
    #[error("Please enter a valid Email Address.")]
    Email,
    #[error("Please enter a valid 10-digit Indian Mobile Number (starts with 6, 7, 8, or 9).")]
    DomesticPhone,
    #[error("Please enter a valid Mobile Number (10-15 digits, digits only).")]
    Phone,
    #[error("Please wait a moment before submitting to ensure data integrity.")]
    SubmittedTooFast,
    #[error("Missing required customer information")]
    MissingFields(Vec<&'static str>),
}

#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error("gateway error {http_status} {code}: {message}")]
pub struct GatewayError {
    pub http_status: u16,
    pub code: String,
    pub message: String,
}

impl GatewayError {
    pub fn new(http_status: u16, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            http_status,
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn timeout() -> Self {
        Self::new(504, "TIMEOUT", "gateway timeout")
    }

    pub fn network() -> Self {
        Self::new(502, "NETWORK_ERROR", "gateway unreachable")
    }

    pub fn is_transient(&self) -> bool {
        self.http_status >= 500 || self.http_status == 408 || self.http_status == 429
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CreatePaymentError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SdkLoadError {
    #[error("sdk load timed out after {0:?}")]
    Timeout(Duration),
    #[error("sdk script failed to load: {0}")]
    Script(String),
}

#[derive(Debug, Error)]
pub enum OrderApiError {
    #[error(transparent)]
    Create(#[from] CreatePaymentError),
    #[error("create-payment rejected with status {status}: {code}")]
    Rejected { status: u16, code: String },
    #[error("create-payment request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error(transparent)]
    SdkLoad(#[from] SdkLoadError),
    #[error("no payment session id returned")]
    MissingSession,
    #[error("checkout call failed: {0}")]
    Sdk(String),
    #[error(transparent)]
    OrderApi(#[from] OrderApiError),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VerificationError {
    #[error("order_id is required to verify payment status")]
    MissingOrderId,
    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

impl VerificationError {
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::MissingOrderId => false,
            Self::Gateway(e) => e.is_transient(),
        }
    }
}

#[derive(Debug, Error)]
pub enum RelayDeliveryError {
    #[error("{0} is not configured")]
    NotConfigured(&'static str),
    #[error("{target} request failed: {source}")]
    Transport {
        target: &'static str,
        #[source]
        source: reqwest::Error,
    },
    #[error("{target} responded with status {status}")]
    Status { target: &'static str, status: u16 },
}
