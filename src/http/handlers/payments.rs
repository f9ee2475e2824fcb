use crate::domain::error::{CreatePaymentError, ValidationError, VerificationError};
use crate::domain::order::{CreatePaymentRequest, PaymentErrorResponse};
use crate::http::handlers::timestamp;
use crate::AppState;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::json;

const GATEWAY_UNAVAILABLE: &str =
    "Payment service is temporarily unavailable. Please use the fallback payment link to complete your purchase.";

pub async fn create_payment(
    State(state): State<AppState>,
    payload: Result<Json<CreatePaymentRequest>, JsonRejection>,
) -> Response {
    let fallback_url = state.order_service.fallback_url().to_string();

    let req = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => {
            tracing::warn!(error = %rejection, "create-payment body rejected");
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({
                    "success": false,
                    "error": "Invalid request body",
                    "code": "INVALID_REQUEST",
                    "required_fields": ["customer_email", "customer_name"],
                    "fallback_url": fallback_url,
                    "timestamp": timestamp(),
                })),
            )
                .into_response();
        }
    };

    match state.order_service.create_payment(req).await {
        Ok(resp) => (StatusCode::OK, Json(resp)).into_response(),
        Err(CreatePaymentError::Validation(ValidationError::MissingFields(fields))) => (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "success": false,
                "error": ValidationError::MissingFields(Vec::new()).to_string(),
                "code": "MISSING_FIELDS",
                "required_fields": fields,
                "fallback_url": fallback_url,
                "timestamp": timestamp(),
            })),
        )
            .into_response(),
        Err(CreatePaymentError::Validation(e)) => (
            StatusCode::BAD_REQUEST,
            Json(PaymentErrorResponse {
                success: false,
                error: e.to_string(),
                code: "VALIDATION_ERROR".to_string(),
                fallback_url,
                timestamp: timestamp(),
            }),
        )
            .into_response(),
        Err(CreatePaymentError::Gateway(e)) => {
            let status = StatusCode::from_u16(e.http_status).unwrap_or(StatusCode::BAD_GATEWAY);
            (
                status,
                Json(PaymentErrorResponse {
                    success: false,
                    error: GATEWAY_UNAVAILABLE.to_string(),
                    code: e.code,
                    fallback_url,
                    timestamp: timestamp(),
                }),
            )
                .into_response()
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct VerifyPaymentRequest {
    #[serde(default)]
    pub order_id: Option<String>,
}

pub async fn verify_payment_get(
    State(state): State<AppState>,
    Query(query): Query<VerifyPaymentRequest>,
) -> Response {
    verify(&state, query.order_id).await
}

pub async fn verify_payment_post(
    State(state): State<AppState>,
    Query(query): Query<VerifyPaymentRequest>,
    body: Result<Json<VerifyPaymentRequest>, JsonRejection>,
) -> Response {
    let order_id = non_blank(query.order_id)
        .or_else(|| body.ok().and_then(|Json(b)| non_blank(b.order_id)));
    verify(&state, order_id).await
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

async fn verify(state: &AppState, order_id: Option<String>) -> Response {
    let order_id = order_id.unwrap_or_default();

    match state.status_verifier.verify(&order_id).await {
        Ok(result) => {
            let status =
                StatusCode::from_u16(result.verdict.http_status()).unwrap_or(StatusCode::BAD_REQUEST);
            (
                status,
                Json(json!({
                    "success": true,
                    "order_id": result.order_id,
                    "order_status": result.verdict,
                    "total_transactions": result.attempts.len(),
                    "payment_details": result.details,
                    "all_transactions": result.attempts,
                    "verification_time": timestamp(),
                })),
            )
                .into_response()
        }
        Err(VerificationError::MissingOrderId) => (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "success": false,
                "error": "Missing order_id parameter",
                "message": VerificationError::MissingOrderId.to_string(),
                "code": "MISSING_ORDER_ID",
                "timestamp": timestamp(),
            })),
        )
            .into_response(),
        Err(VerificationError::Gateway(gateway)) => {
            let status = StatusCode::from_u16(gateway.http_status).unwrap_or(StatusCode::BAD_GATEWAY);
            (
                status,
                Json(json!({
                    "success": false,
                    "error": "Failed to verify payment status",
                    "code": gateway.code,
                    "retryable": gateway.is_transient(),
                    "order_id": order_id,
                    "timestamp": timestamp(),
                })),
            )
                .into_response()
        }
    }
}
