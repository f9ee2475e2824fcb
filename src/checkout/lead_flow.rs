use crate::checkout::initiator::{CheckoutInitiator, CheckoutSession, CheckoutState};
use crate::checkout::order_api::OrderApi;
use crate::domain::error::{CheckoutError, ValidationError};
use crate::domain::lead::{LeadForm, LeadRecord};
use crate::domain::order::{CreatePaymentRequest, CustomerEcho};
use crate::service::webhook_dispatcher::WebhookDispatcher;
use crate::validation::{validate_lead, SubmissionGuard};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Instant;

pub const LEAD_SOURCE_TAG: &str = "pre_payment_capture";

pub struct LeadCaptureFlow {
    pub guard: SubmissionGuard,
    pub order_api: Arc<dyn OrderApi>,
    pub initiator: CheckoutInitiator,
    pub webhooks: WebhookDispatcher,
    pub lead_webhook_url: Option<String>,
    last_lead: Option<LeadRecord>,
    last_order_id: Option<String>,
}

impl LeadCaptureFlow {
    pub fn new(
        guard: SubmissionGuard,
        order_api: Arc<dyn OrderApi>,
        initiator: CheckoutInitiator,
        webhooks: WebhookDispatcher,
        lead_webhook_url: Option<String>,
    ) -> Self {
        Self {
            guard,
            order_api,
            initiator,
            webhooks,
            lead_webhook_url,
            last_lead: None,
            last_order_id: None,
        }
    }

    pub fn last_lead(&self) -> Option<&LeadRecord> {
        self.last_lead.as_ref()
    }

    pub fn last_order_id(&self) -> Option<&str> {
        self.last_order_id.as_deref()
    }

    pub async fn submit(
        &mut self,
        form: &LeadForm,
        submitted_at: Instant,
        now: DateTime<Utc>,
    ) -> Result<CheckoutState, ValidationError> {
        self.guard.check(submitted_at)?;
        validate_lead(form)?;

        let lead = LeadRecord::from_form(form, now, LEAD_SOURCE_TAG);
        self.forward_lead(&lead).await;

        let customer = CustomerEcho {
            email: lead.email.clone(),
            name: lead.full_name(),
            phone: lead.phone(),
        };
        let request = CreatePaymentRequest {
            customer_email: Some(customer.email.clone()),
            customer_name: Some(customer.name.clone()),
            customer_phone: Some(customer.phone.clone()),
            ..Default::default()
        };
        self.last_lead = Some(lead);

        let created = match self.order_api.create_payment(request).await {
            Ok(created) => created,
            Err(e) => {
                return Ok(self.initiator.fall_back(&customer, CheckoutError::from(e)));
            }
        };

        self.last_order_id = Some(created.order_id.clone());
        let session = CheckoutSession {
            session_id: created.payment_session_id,
            environment: created.environment,
        };
        Ok(self.initiator.start(&session, &created.customer_details).await)
    }

    async fn forward_lead(&self, lead: &LeadRecord) {
        let payload = match serde_json::to_value(lead) {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!(error = %e, "lead record not serializable");
                return;
            }
        };
        if let Err(e) = self
            .webhooks
            .emit("lead webhook", self.lead_webhook_url.as_deref(), "lead_captured", &payload)
            .await
        {
            tracing::warn!(error = %e, "lead forward failed, continuing to checkout");
        }
    }
}
