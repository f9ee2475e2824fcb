use crate::domain::error::OrderApiError;
use crate::domain::order::{CreatePaymentRequest, CreatePaymentResponse};
use crate::service::order_service::OrderService;
use std::time::Duration;

#[async_trait::async_trait]
pub trait OrderApi: Send + Sync {
    async fn create_payment(&self, req: CreatePaymentRequest) -> Result<CreatePaymentResponse, OrderApiError>;
}

#[async_trait::async_trait]
impl OrderApi for OrderService {
    async fn create_payment(&self, req: CreatePaymentRequest) -> Result<CreatePaymentResponse, OrderApiError> {
        Ok(OrderService::create_payment(self, req).await?)
    }
}

#[derive(Clone)]
pub struct HttpOrderApi {
    pub client: reqwest::Client,
    pub base_url: String,
    pub timeout: Duration,
}

impl HttpOrderApi {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            timeout,
        }
    }
}

#[async_trait::async_trait]
impl OrderApi for HttpOrderApi {
    async fn create_payment(&self, req: CreatePaymentRequest) -> Result<CreatePaymentResponse, OrderApiError> {
        let url = format!("{}/create-payment", self.base_url.trim_end_matches('/'));
        let resp = self
            .client
            .post(url)
            .json(&req)
            .timeout(self.timeout)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body: serde_json::Value = resp.json().await.unwrap_or_default();
            let code = body
                .get("code")
                .and_then(|c| c.as_str())
                .unwrap_or("UNKNOWN")
                .to_string();
            return Err(OrderApiError::Rejected {
                status: status.as_u16(),
                code,
            });
        }

        Ok(resp.json::<CreatePaymentResponse>().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn request() -> CreatePaymentRequest {
        CreatePaymentRequest {
            customer_email: Some("asha@example.com".to_string()),
            customer_name: Some("Asha Rao".to_string()),
            customer_phone: Some("+919876543210".to_string()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn parses_success_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/create-payment"))
            .and(body_partial_json(serde_json::json!({"customer_email": "asha@example.com"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "success": true,
                "order_id": "BTD_1_abc",
                "payment_session_id": "session_1",
                "environment": "sandbox",
                "customer_prefilled": true,
                "customer_details": {"email": "asha@example.com", "name": "Asha Rao", "phone": "+919876543210"},
                "amount": 1499.0,
                "currency": "INR"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let api = HttpOrderApi::new(reqwest::Client::new(), server.uri(), Duration::from_secs(5));
        let resp = api.create_payment(request()).await.unwrap();
        assert_eq!(resp.order_id, "BTD_1_abc");
        assert_eq!(resp.payment_session_id.as_deref(), Some("session_1"));
    }

    #[tokio::test]
    async fn error_status_keeps_code() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/create-payment"))
            .respond_with(ResponseTemplate::new(502).set_body_json(serde_json::json!({
                "success": false,
                "error": "Payment service temporarily unavailable",
                "code": "NETWORK_ERROR",
                "fallback_url": "https://example.com/form"
            })))
            .mount(&server)
            .await;

        let api = HttpOrderApi::new(reqwest::Client::new(), server.uri(), Duration::from_secs(5));
        match api.create_payment(request()).await.unwrap_err() {
            OrderApiError::Rejected { status, code } => {
                assert_eq!(status, 502);
                assert_eq!(code, "NETWORK_ERROR");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
