use crate::domain::error::RelayDeliveryError;
use std::time::Duration;

#[derive(Clone)]
pub struct WebhookDispatcher {
    pub client: reqwest::Client,
    pub timeout: Duration,
}

impl WebhookDispatcher {
    pub fn new(client: reqwest::Client, timeout: Duration) -> Self {
        Self { client, timeout }
    }

    pub async fn emit(
        &self,
        target: &'static str,
        url: Option<&str>,
        event_type: &str,
        payload: &serde_json::Value,
    ) -> Result<serde_json::Value, RelayDeliveryError> {
        let url = url.ok_or(RelayDeliveryError::NotConfigured(target))?;

        let resp = self
            .client
            .post(url)
            .header("Content-Type", "application/json")
            .header("X-Event-Type", event_type)
            .json(payload)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|source| RelayDeliveryError::Transport { target, source })?;

        let status = resp.status();
        if !status.is_success() {
            return Err(RelayDeliveryError::Status {
                target,
                status: status.as_u16(),
            });
        }

        let text = resp.text().await.unwrap_or_default();
        Ok(serde_json::from_str(&text).unwrap_or(serde_json::Value::String(text)))
    }
}
