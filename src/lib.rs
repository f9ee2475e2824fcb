pub mod config;
pub mod domain {
    pub mod context;
    pub mod conversion;
    pub mod error;
    pub mod lead;
    pub mod order;
    pub mod payment;
}
pub mod checkout {
    pub mod initiator;
    pub mod lead_flow;
    pub mod order_api;
}
pub mod gateways;
pub mod http {
    pub mod handlers {
        pub mod ops;
        pub mod payments;
        pub mod tracking;

        pub(crate) fn timestamp() -> String {
            chrono::Utc::now().to_rfc3339()
        }
    }
}
pub mod service {
    pub mod conversion_relay;
    pub mod order_builder;
    pub mod order_service;
    pub mod status_verifier;
    pub mod webhook_dispatcher;
}
pub mod validation;

use axum::http::{header, Method};
use axum::routing::{get, post};
use axum::Router;
use config::AppConfig;
use crate::http::handlers::{ops, payments, tracking};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub order_service: service::order_service::OrderService,
    pub status_verifier: service::status_verifier::StatusVerifier,
    pub conversion_relay: service::conversion_relay::ConversionRelay,
}

pub fn router(state: AppState) -> Router {
    let tracking_cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    let tracking_routes = Router::new()
        .route(
            "/enhanced-tracking",
            get(tracking::enhanced_tracking_get)
                .post(tracking::enhanced_tracking_post)
                .options(tracking::enhanced_tracking_preflight)
                .fallback(ops::method_not_allowed),
        )
        .layer(tracking_cors);

    Router::new()
        .route(
            "/create-payment",
            post(payments::create_payment).fallback(ops::method_not_allowed),
        )
        .route(
            "/verify-payment",
            get(payments::verify_payment_get)
                .post(payments::verify_payment_post)
                .fallback(ops::method_not_allowed),
        )
        .route(
            "/health-check",
            get(ops::health_check).fallback(ops::method_not_allowed),
        )
        .route(
            "/checkout-config",
            get(ops::checkout_config).fallback(ops::method_not_allowed),
        )
        .merge(tracking_routes)
        .with_state(state)
}
