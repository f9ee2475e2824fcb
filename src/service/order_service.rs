use crate::config::GatewayEnvironment;
use crate::domain::error::CreatePaymentError;
use crate::domain::order::{CreatePaymentRequest, CreatePaymentResponse, CustomerEcho};
use crate::gateways::PaymentGateway;
use crate::service::order_builder::OrderRequestBuilder;
use std::sync::Arc;

#[derive(Clone)]
pub struct OrderService {
    pub builder: OrderRequestBuilder,
    pub gateway: Arc<dyn PaymentGateway>,
    pub environment: GatewayEnvironment,
}

impl OrderService {
    pub async fn create_payment(
        &self,
        req: CreatePaymentRequest,
    ) -> Result<CreatePaymentResponse, CreatePaymentError> {
        let order = self.builder.build(&req, chrono::Utc::now())?;

        tracing::info!(
            order_id = %order.order_id,
            amount = %order.amount,
            currency = %order.currency,
            gateway = self.gateway.name(),
            "creating gateway order"
        );

        let created = self.gateway.create_order(&order).await.map_err(|e| {
            tracing::error!(
                order_id = %order.order_id,
                http_status = e.http_status,
                code = %e.code,
                message = %e.message,
                "gateway order creation failed"
            );
            e
        })?;

        tracing::info!(
            order_id = %created.order_id,
            status = ?created.status,
            "gateway order created"
        );

        Ok(CreatePaymentResponse {
            success: true,
            order_id: created.order_id,
            payment_session_id: Some(created.session_id),
            payment_url: created.payment_link,
            environment: self.environment,
            customer_prefilled: true,
            customer_details: CustomerEcho {
                email: order.customer.email,
                name: order.customer.name,
                phone: order.customer.phone_e164,
            },
            amount: order.amount,
            currency: order.currency,
        })
    }

    pub fn fallback_url(&self) -> &str {
        &self.builder.config.fallback_url
    }
}
