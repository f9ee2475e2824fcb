use crate::domain::context::build_context;
use crate::domain::conversion::TrackingParams;
use crate::http::handlers::timestamp;
use crate::AppState;
use axum::body::Bytes;
use axum::extract::{RawQuery, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

pub async fn enhanced_tracking_get(
    State(state): State<AppState>,
    headers: HeaderMap,
    RawQuery(query): RawQuery,
) -> Response {
    let params = parse_form(query.as_deref().unwrap_or_default());
    relay(&state, &headers, params).await
}

pub async fn enhanced_tracking_post(
    State(state): State<AppState>,
    headers: HeaderMap,
    RawQuery(query): RawQuery,
    body: Bytes,
) -> Response {
    if body.iter().all(u8::is_ascii_whitespace) {
        let params = parse_form(query.as_deref().unwrap_or_default());
        return relay(&state, &headers, params).await;
    }

    let is_form = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with("application/x-www-form-urlencoded"));

    let params = if is_form {
        parse_form(&String::from_utf8_lossy(&body))
    } else {
        match serde_json::from_slice::<TrackingParams>(&body) {
            Ok(params) => params,
            Err(e) => {
                tracing::warn!(error = %e, "tracking body rejected");
                return (
                    StatusCode::BAD_REQUEST,
                    Json(json!({
                        "success": false,
                        "error": "Invalid tracking payload",
                        "timestamp": timestamp(),
                    })),
                )
                    .into_response();
            }
        }
    };
    relay(&state, &headers, params).await
}

pub async fn enhanced_tracking_preflight() -> StatusCode {
    StatusCode::OK
}

async fn relay(state: &AppState, headers: &HeaderMap, params: TrackingParams) -> Response {
    let ctx = build_context(headers);
    let summary = state.conversion_relay.relay(params, ctx).await;
    (StatusCode::OK, Json(summary)).into_response()
}

fn parse_form(raw: &str) -> TrackingParams {
    let map: serde_json::Map<String, serde_json::Value> = url::form_urlencoded::parse(raw.as_bytes())
        .map(|(k, v)| (k.into_owned(), serde_json::Value::String(v.into_owned())))
        .collect();
    serde_json::from_value(serde_json::Value::Object(map)).unwrap_or_default()
}
