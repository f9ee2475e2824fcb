use crate::domain::error::VerificationError;
use crate::domain::payment::{AttemptStatus, OrderVerdict, PaymentAttempt, PaymentDetails, VerificationResult};
use crate::gateways::PaymentGateway;
use rust_decimal::Decimal;
use std::sync::Arc;

/// Any SUCCESS wins, then any PENDING, otherwise Failure. A later failed
/// retry must never hide an earlier success.
pub fn reduce_attempts(attempts: &[PaymentAttempt]) -> OrderVerdict {
    if attempts.iter().any(|a| a.status == AttemptStatus::Success) {
        OrderVerdict::Success
    } else if attempts.iter().any(|a| a.status == AttemptStatus::Pending) {
        OrderVerdict::Pending
    } else {
        OrderVerdict::Failure
    }
}

pub fn summarize(order_id: &str, attempts: Vec<PaymentAttempt>, default_currency: &str) -> VerificationResult {
    let verdict = reduce_attempts(&attempts);
    let successful = attempts.iter().find(|a| a.status == AttemptStatus::Success);
    let latest = attempts.last();

    let details = PaymentDetails {
        status: verdict,
        amount: latest.and_then(|a| a.amount).unwrap_or(Decimal::ZERO),
        currency: latest
            .and_then(|a| a.currency.clone())
            .unwrap_or_else(|| default_currency.to_string()),
        payment_method: latest
            .and_then(|a| a.method.clone())
            .unwrap_or_else(|| "unknown".to_string()),
        payment_time: successful
            .and_then(|a| a.completion_time.clone())
            .or_else(|| latest.and_then(|a| a.completion_time.clone()))
            .or_else(|| latest.and_then(|a| a.payment_time.clone())),
        payment_message: latest
            .and_then(|a| a.message.clone())
            .unwrap_or_default(),
        payment_id: successful
            .and_then(|a| a.payment_id.clone())
            .or_else(|| latest.and_then(|a| a.payment_id.clone())),
    };

    VerificationResult {
        order_id: order_id.to_string(),
        verdict,
        details,
        attempts,
    }
}

#[derive(Clone)]
pub struct StatusVerifier {
    pub gateway: Arc<dyn PaymentGateway>,
    pub default_currency: String,
}

impl StatusVerifier {
    pub async fn verify(&self, order_id: &str) -> Result<VerificationResult, VerificationError> {
        let order_id = order_id.trim();
        if order_id.is_empty() {
            return Err(VerificationError::MissingOrderId);
        }

        let attempts = self.gateway.fetch_payments(order_id).await.map_err(|e| {
            tracing::error!(
                order_id,
                http_status = e.http_status,
                code = %e.code,
                message = %e.message,
                "payment verification fetch failed"
            );
            VerificationError::from(e)
        })?;

        let result = summarize(order_id, attempts, &self.default_currency);
        tracing::info!(
            order_id,
            payments = result.attempts.len(),
            verdict = ?result.verdict,
            "payment verified"
        );
        Ok(result)
    }
}
