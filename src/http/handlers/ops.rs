use crate::config::CASHFREE_SDK_URL;
use crate::http::handlers::timestamp;
use crate::AppState;
use axum::extract::State;
use axum::http::{Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;

pub async fn health_check(State(state): State<AppState>, method: Method) -> Response {
    let configured = state.config.gateway.is_configured();
    let ready = configured && state.config.payment_api_enabled;
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    if method == Method::HEAD {
        return status.into_response();
    }

    (
        status,
        Json(serde_json::json!({
            "status": "healthy",
            "service": "lead-capture-payment-api",
            "timestamp": timestamp(),
            "environment": state.config.app_env,
            "features": {
                "payment_api": ready,
                "cashfree_configured": configured,
                "lead_capture": true
            }
        })),
    )
        .into_response()
}

pub async fn checkout_config(State(state): State<AppState>) -> impl IntoResponse {
    let environment = state.config.gateway.environment;
    (
        StatusCode::OK,
        Json(serde_json::json!({
            "environment": environment,
            "sdk_url": CASHFREE_SDK_URL,
            "sdk_mode": environment.sdk_mode(),
            "fallback_url": state.config.checkout.fallback_url,
        })),
    )
}

pub async fn method_not_allowed() -> impl IntoResponse {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(serde_json::json!({"error": "Method Not Allowed"})),
    )
}
