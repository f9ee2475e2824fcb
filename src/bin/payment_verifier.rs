use anyhow::{bail, Result};
use course_checkout::config::AppConfig;
use course_checkout::domain::payment::OrderVerdict;
use course_checkout::gateways::cashfree::CashfreeGateway;
use course_checkout::service::status_verifier::StatusVerifier;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

const MAX_POLLS: u32 = 10;
const POLL_INTERVAL: Duration = Duration::from_secs(10);

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let order_ids: Vec<String> = std::env::args().skip(1).collect();
    if order_ids.is_empty() {
        bail!("usage: payment_verifier <order_id>...");
    }

    let cfg = AppConfig::from_env();
    if !cfg.gateway.is_configured() {
        bail!("CASHFREE_CLIENT_ID and CASHFREE_CLIENT_SECRET must be set");
    }
    let verifier = StatusVerifier {
        gateway: Arc::new(CashfreeGateway::from_config(&cfg.gateway, reqwest::Client::new())),
        default_currency: cfg.checkout.default_currency.clone(),
    };

    for order_id in order_ids {
        let mut poll = 1;
        loop {
            match verifier.verify(&order_id).await {
                Ok(result) if result.verdict == OrderVerdict::Pending && poll < MAX_POLLS => {
                    tracing::info!(order_id = %order_id, poll, "order still pending");
                }
                Ok(result) => {
                    println!("{}", serde_json::to_string_pretty(&result)?);
                    break;
                }
                Err(e) if e.is_retryable() && poll < MAX_POLLS => {
                    tracing::warn!(order_id = %order_id, poll, error = %e, "verification failed, retrying");
                }
                Err(e) => {
                    tracing::error!(order_id = %order_id, error = %e, "verification failed");
                    break;
                }
            }
            poll += 1;
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }
    Ok(())
}
