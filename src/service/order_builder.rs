use crate::config::CheckoutConfig;
use crate::domain::error::ValidationError;
use crate::domain::order::{CreatePaymentRequest, CustomerDetails, OrderRequest, OrderTags};
use crate::validation::digits_only;
use chrono::{DateTime, Utc};
use rand::Rng;

const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const ORDER_SUFFIX_LEN: usize = 9;

pub fn generate_order_id(prefix: &str, now: DateTime<Utc>) -> String {
    let mut rng = rand::thread_rng();
    let suffix: String = (0..ORDER_SUFFIX_LEN)
        .map(|_| BASE36[rng.gen_range(0..BASE36.len())] as char)
        .collect();
    format!("{}_{}_{}", prefix, now.timestamp_millis(), suffix)
}

pub fn normalize_phone_strict(raw: &str, calling_digits: &str) -> Option<String> {
    let digits = digits_only(raw);
    if digits.len() == 10 {
        return Some(format!("+{}{}", calling_digits, digits));
    }
    if digits.starts_with(calling_digits) && digits.len() == calling_digits.len() + 10 {
        return Some(format!("+{}", digits));
    }
    if digits.len() > 10 {
        return Some(format!("+{}", digits));
    }
    None
}

pub fn normalize_phone(raw: &str, calling_digits: &str, placeholder: &str) -> String {
    match normalize_phone_strict(raw, calling_digits) {
        Some(phone) => phone,
        None => {
            tracing::warn!(
                digits = digits_only(raw).len(),
                "customer phone unrecognisable, substituting placeholder"
            );
            placeholder.to_string()
        }
    }
}

#[derive(Debug, Clone)]
pub struct OrderRequestBuilder {
    pub config: CheckoutConfig,
}

impl OrderRequestBuilder {
    pub fn new(config: CheckoutConfig) -> Self {
        Self { config }
    }

    pub fn build(
        &self,
        req: &CreatePaymentRequest,
        now: DateTime<Utc>,
    ) -> Result<OrderRequest, ValidationError> {
        let email = non_blank(req.customer_email.as_deref());
        let name = non_blank(req.customer_name.as_deref());
        let (email, name) = match (email, name) {
            (Some(email), Some(name)) => (email, name),
            (email, name) => {
                let mut missing = Vec::new();
                if email.is_none() {
                    missing.push("customer_email");
                }
                if name.is_none() {
                    missing.push("customer_name");
                }
                return Err(ValidationError::MissingFields(missing));
            }
        };

        let order_id = generate_order_id(&self.config.order_prefix, now);
        let phone_e164 = normalize_phone(
            req.customer_phone.as_deref().unwrap_or_default(),
            self.config.domestic_calling_digits(),
            &self.config.placeholder_phone,
        );

        Ok(OrderRequest {
            return_url: self.return_url(&order_id, email),
            order_id,
            amount: req.order_amount.unwrap_or(self.config.default_amount),
            currency: non_blank(req.order_currency.as_deref())
                .map(str::to_uppercase)
                .unwrap_or_else(|| self.config.default_currency.clone()),
            customer: CustomerDetails {
                customer_id: format!("customer_{}", now.timestamp_millis()),
                email: email.to_string(),
                name: name.to_string(),
                phone_e164,
            },
            notify_url: self.config.notify_url.clone(),
            payment_methods: self.config.payment_methods.clone(),
            order_note: format!(
                "{} Course Purchase - Customer: {}",
                self.config.course_name, name
            ),
            tags: OrderTags {
                source: self.config.tag_source.clone(),
                customer_type: self.config.tag_customer_type.clone(),
                course: self.config.tag_course.clone(),
            },
        })
    }

    pub fn return_url(&self, order_id: &str, email: &str) -> String {
        let query = url::form_urlencoded::Serializer::new(String::new())
            .append_pair("order_id", order_id)
            .append_pair("email", email)
            .finish();
        let sep = if self.config.return_url.contains('?') { '&' } else { '?' };
        format!("{}{}{}", self.config.return_url, sep, query)
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::collections::HashSet;

    fn request() -> CreatePaymentRequest {
        CreatePaymentRequest {
            customer_email: Some("asha@example.com".to_string()),
            customer_name: Some("Asha Rao".to_string()),
            customer_phone: Some("+91 98765-43210".to_string()),
            order_amount: None,
            order_currency: None,
        }
    }

    #[test]
    fn phone_normalization_policy() {
        assert_eq!(normalize_phone("9876543210", "91", "+919999999999"), "+919876543210");
        assert_eq!(normalize_phone("919876543210", "91", "+919999999999"), "+919876543210");
        assert_eq!(normalize_phone("+1 (415) 555-0100", "91", "+919999999999"), "+14155550100");
        assert_eq!(normalize_phone("123", "91", "+919999999999"), "+919999999999");
        assert_eq!(normalize_phone("", "91", "+919999999999"), "+919999999999");
        assert_eq!(normalize_phone_strict("12345", "91"), None);
    }

    #[test]
    fn order_ids_are_unique_and_url_safe() {
        let now = Utc::now();
        let ids: HashSet<String> = (0..10_000).map(|_| generate_order_id("BTD", now)).collect();
        assert_eq!(ids.len(), 10_000);
        for id in ids.iter().take(50) {
            assert!(id.starts_with("BTD_"));
            assert!(id.chars().all(|c| c.is_ascii_alphanumeric() || c == '_'));
            assert_eq!(id.split('_').count(), 3);
        }
    }

    #[test]
    fn builds_with_catalog_defaults() {
        let builder = OrderRequestBuilder::new(CheckoutConfig::default());
        let order = builder.build(&request(), Utc::now()).unwrap();
        assert_eq!(order.amount, dec!(1499.00));
        assert_eq!(order.currency, "INR");
        assert_eq!(order.customer.phone_e164, "+919876543210");
        assert!(order.customer.customer_id.starts_with("customer_"));
        assert_eq!(order.tags.source, "lead_capture_modal");
        assert!(order.order_note.ends_with("Customer: Asha Rao"));
    }

    #[test]
    fn return_url_carries_order_and_email() {
        let builder = OrderRequestBuilder::new(CheckoutConfig::default());
        let order = builder.build(&request(), Utc::now()).unwrap();
        let url = url::Url::parse(&order.return_url).unwrap();
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert!(pairs.contains(&("order_id".to_string(), order.order_id.clone())));
        assert!(pairs.contains(&("email".to_string(), "asha@example.com".to_string())));
    }

    #[test]
    fn explicit_amount_and_currency_win() {
        let builder = OrderRequestBuilder::new(CheckoutConfig::default());
        let mut req = request();
        req.order_amount = Some(dec!(999.00));
        req.order_currency = Some("usd".to_string());
        let order = builder.build(&req, Utc::now()).unwrap();
        assert_eq!(order.amount, dec!(999.00));
        assert_eq!(order.currency, "USD");
    }

    #[test]
    fn missing_email_and_name_are_reported_together() {
        let builder = OrderRequestBuilder::new(CheckoutConfig::default());
        let req = CreatePaymentRequest {
            customer_name: Some("  ".to_string()),
            ..Default::default()
        };
        assert_eq!(
            builder.build(&req, Utc::now()),
            Err(ValidationError::MissingFields(vec!["customer_email", "customer_name"]))
        );
    }
}
