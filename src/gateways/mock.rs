use crate::domain::error::GatewayError;
use crate::domain::order::{GatewayOrderResult, OrderRequest, OrderStatus};
use crate::domain::payment::PaymentAttempt;
use crate::gateways::PaymentGateway;
use std::sync::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockBehavior {
    AlwaysSuccess,
    AlwaysFailure,
    AlwaysTimeout,
}

impl MockBehavior {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "ALWAYS_FAILURE" => Self::AlwaysFailure,
            "ALWAYS_TIMEOUT" => Self::AlwaysTimeout,
            _ => Self::AlwaysSuccess,
        }
    }
}

pub struct MockGateway {
    pub behavior: MockBehavior,
    pub attempts: Vec<PaymentAttempt>,
    created: Mutex<Vec<OrderRequest>>,
}

impl MockGateway {
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            attempts: Vec::new(),
            created: Mutex::new(Vec::new()),
        }
    }

    pub fn with_attempts(mut self, attempts: Vec<PaymentAttempt>) -> Self {
        self.attempts = attempts;
        self
    }

    pub fn created_orders(&self) -> Vec<OrderRequest> {
        self.created
            .lock()
            .map(|orders| orders.clone())
            .unwrap_or_default()
    }

    fn scripted_error(&self) -> Option<GatewayError> {
        match self.behavior {
            MockBehavior::AlwaysSuccess => None,
            MockBehavior::AlwaysFailure => {
                Some(GatewayError::new(400, "MOCK_DECLINED", "mock decline"))
            }
            MockBehavior::AlwaysTimeout => Some(GatewayError::timeout()),
        }
    }
}

#[async_trait::async_trait]
impl PaymentGateway for MockGateway {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn create_order(&self, order: &OrderRequest) -> Result<GatewayOrderResult, GatewayError> {
        if let Ok(mut created) = self.created.lock() {
            created.push(order.clone());
        }
        if let Some(err) = self.scripted_error() {
            return Err(err);
        }

        Ok(GatewayOrderResult {
            order_id: order.order_id.clone(),
            session_id: format!("session_mock_{}", order.order_id),
            status: OrderStatus::Created,
            payment_link: None,
        })
    }

    async fn fetch_payments(&self, _order_id: &str) -> Result<Vec<PaymentAttempt>, GatewayError> {
        match self.scripted_error() {
            Some(err) => Err(err),
            None => Ok(self.attempts.clone()),
        }
    }
}
