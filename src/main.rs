use course_checkout::config::AppConfig;
use course_checkout::gateways::cashfree::CashfreeGateway;
use course_checkout::gateways::mock::{MockBehavior, MockGateway};
use course_checkout::gateways::PaymentGateway;
use course_checkout::service::conversion_relay::ConversionRelay;
use course_checkout::service::order_builder::OrderRequestBuilder;
use course_checkout::service::order_service::OrderService;
use course_checkout::service::status_verifier::StatusVerifier;
use course_checkout::AppState;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cfg = AppConfig::from_env();
    let client = reqwest::Client::builder().build()?;

    let gateway: Arc<dyn PaymentGateway> = match cfg.gateway.adapter.as_str() {
        "mock" => {
            tracing::warn!(behavior = %cfg.gateway.mock_behavior, "using mock payment gateway");
            Arc::new(MockGateway::new(MockBehavior::parse(&cfg.gateway.mock_behavior)))
        }
        _ => {
            if !cfg.gateway.is_configured() {
                tracing::warn!("cashfree credentials missing, order creation will fail");
            }
            Arc::new(CashfreeGateway::from_config(&cfg.gateway, client.clone()))
        }
    };

    tracing::info!(
        environment = cfg.gateway.environment.sdk_mode(),
        base_url = %cfg.gateway.base_url,
        gateway = gateway.name(),
        "payment gateway selected"
    );

    let order_service = OrderService {
        builder: OrderRequestBuilder::new(cfg.checkout.clone()),
        gateway: gateway.clone(),
        environment: cfg.gateway.environment,
    };
    let status_verifier = StatusVerifier {
        gateway,
        default_currency: cfg.checkout.default_currency.clone(),
    };
    let conversion_relay = ConversionRelay::new(
        cfg.relay.clone(),
        cfg.checkout.domestic_calling_digits(),
        cfg.checkout.default_amount,
        &cfg.checkout.default_currency,
        client,
        status_verifier.clone(),
    );

    let bind_addr = cfg.bind_addr.clone();
    let state = AppState {
        config: Arc::new(cfg),
        order_service,
        status_verifier,
        conversion_relay,
    };

    let app = course_checkout::router(state).layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!("listening on {}", bind_addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
    }
    tracing::info!("shutting down");
}
