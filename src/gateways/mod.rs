use crate::domain::error::GatewayError;
use crate::domain::order::{GatewayOrderResult, OrderRequest};
use crate::domain::payment::PaymentAttempt;

pub mod cashfree;
pub mod mock;

/// Server-side seam to the external payment gateway. Implementations do not
/// retry: one `create_order` call creates at most one gateway order.
#[async_trait::async_trait]
pub trait PaymentGateway: Send + Sync {
    fn name(&self) -> &'static str;

    async fn create_order(&self, order: &OrderRequest) -> Result<GatewayOrderResult, GatewayError>;

    async fn fetch_payments(&self, order_id: &str) -> Result<Vec<PaymentAttempt>, GatewayError>;
}
