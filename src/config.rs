use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

pub const CASHFREE_API_VERSION: &str = "2023-08-01";
pub const CASHFREE_SDK_URL: &str = "https://sdk.cashfree.com/js/v3/cashfree.js";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GatewayEnvironment {
    Sandbox,
    Production,
}

impl GatewayEnvironment {
    pub fn from_flag(flag: &str) -> Self {
        if flag.trim().eq_ignore_ascii_case("PRODUCTION") {
            Self::Production
        } else {
            Self::Sandbox
        }
    }

    pub fn api_base_url(&self) -> &'static str {
        match self {
            Self::Sandbox => "https://sandbox.cashfree.com/pg",
            Self::Production => "https://api.cashfree.com/pg",
        }
    }

    pub fn sdk_mode(&self) -> &'static str {
        match self {
            Self::Sandbox => "sandbox",
            Self::Production => "production",
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub bind_addr: String,
    pub app_env: String,
    pub payment_api_enabled: bool,
    pub gateway: GatewayConfig,
    pub checkout: CheckoutConfig,
    pub relay: RelayConfig,
}

#[derive(Clone)]
pub struct GatewayConfig {
    pub client_id: String,
    pub client_secret: String,
    pub environment: GatewayEnvironment,
    pub base_url: String,
    pub timeout_ms: u64,
    pub adapter: String,
    pub mock_behavior: String,
}

impl GatewayConfig {
    pub fn is_configured(&self) -> bool {
        !self.client_id.is_empty() && !self.client_secret.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct CheckoutConfig {
    pub order_prefix: String,
    pub default_amount: Decimal,
    pub default_currency: String,
    pub domestic_country_code: String,
    pub placeholder_phone: String,
    pub return_url: String,
    pub notify_url: String,
    pub fallback_url: String,
    pub payment_methods: String,
    pub course_name: String,
    pub tag_source: String,
    pub tag_customer_type: String,
    pub tag_course: String,
    pub lead_webhook_url: Option<String>,
}

impl CheckoutConfig {
    pub fn domestic_calling_digits(&self) -> &str {
        self.domestic_country_code.trim_start_matches('+')
    }
}

impl Default for CheckoutConfig {
    fn default() -> Self {
        Self {
            order_prefix: "BTD".to_string(),
            default_amount: dec!(1499.00),
            default_currency: "INR".to_string(),
            domestic_country_code: "+91".to_string(),
            placeholder_phone: "+919999999999".to_string(),
            return_url: "https://lfgventures.in/success.html".to_string(),
            notify_url: "https://lfgventures.in/api/payment-notify".to_string(),
            fallback_url: "https://payments.cashfree.com/forms/beyond-deck-course".to_string(),
            payment_methods: "cc,dc,nb,upi,paylater,emi,app".to_string(),
            course_name: "Beyond the Deck".to_string(),
            tag_source: "lead_capture_modal".to_string(),
            tag_customer_type: "high_intent".to_string(),
            tag_course: "beyond_the_deck".to_string(),
            lead_webhook_url: None,
        }
    }
}

#[derive(Clone)]
pub struct RelayConfig {
    pub pixel_id: Option<String>,
    pub access_token: Option<String>,
    pub graph_url: String,
    pub test_event_code: Option<String>,
    pub backup_webhook_url: Option<String>,
    pub require_verified: bool,
    pub timeout_ms: u64,
    pub site_url: String,
    pub content_name: String,
    pub content_id: String,
}

impl RelayConfig {
    pub fn events_url(&self) -> Option<String> {
        self.pixel_id
            .as_deref()
            .map(|pixel| format!("{}/{}/events", self.graph_url.trim_end_matches('/'), pixel))
    }
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            pixel_id: None,
            access_token: None,
            graph_url: "https://graph.facebook.com/v20.0".to_string(),
            test_event_code: None,
            backup_webhook_url: None,
            require_verified: true,
            timeout_ms: 5000,
            site_url: "https://beyondthedeck.com".to_string(),
            content_name: "Beyond the Deck Course".to_string(),
            content_id: "beyond-deck-course".to_string(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = GatewayEnvironment::from_flag(&env_or("CASHFREE_ENVIRONMENT", "SANDBOX"));
        let checkout_defaults = CheckoutConfig::default();
        let relay_defaults = RelayConfig::default();

        Self {
            bind_addr: env_or("BIND_ADDR", "0.0.0.0:3000"),
            app_env: env_or("APP_ENV", "development"),
            payment_api_enabled: env_flag("PAYMENT_API_ENABLED", false),
            gateway: GatewayConfig {
                client_id: env_or("CASHFREE_CLIENT_ID", ""),
                client_secret: env_or("CASHFREE_CLIENT_SECRET", ""),
                environment,
                base_url: env_or("CASHFREE_BASE_URL", environment.api_base_url()),
                timeout_ms: env_parse("GATEWAY_TIMEOUT_MS", 10_000),
                adapter: env_or("GATEWAY_ADAPTER", "cashfree"),
                mock_behavior: env_or("MOCK_BEHAVIOR", "ALWAYS_SUCCESS"),
            },
            checkout: CheckoutConfig {
                return_url: env_or("PAYMENT_RETURN_URL", &checkout_defaults.return_url),
                notify_url: env_or("PAYMENT_NOTIFY_URL", &checkout_defaults.notify_url),
                fallback_url: env_or("FALLBACK_PAYMENT_URL", &checkout_defaults.fallback_url),
                lead_webhook_url: env_opt("LEAD_WEBHOOK_URL"),
                ..checkout_defaults
            },
            relay: RelayConfig {
                pixel_id: env_opt("FACEBOOK_PIXEL_ID"),
                access_token: env_opt("FACEBOOK_ACCESS_TOKEN"),
                graph_url: env_or("FACEBOOK_GRAPH_URL", &relay_defaults.graph_url),
                test_event_code: env_opt("FACEBOOK_TEST_EVENT_CODE"),
                backup_webhook_url: env_opt("ZAPIER_WEBHOOK_URL"),
                require_verified: env_flag("RELAY_REQUIRE_VERIFIED", true),
                timeout_ms: env_parse("RELAY_TIMEOUT_MS", relay_defaults.timeout_ms),
                site_url: env_or("PUBLIC_SITE_URL", &relay_defaults.site_url),
                ..relay_defaults
            },
        }
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_opt(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn env_flag(key: &str, default: bool) -> bool {
    std::env::var(key)
        .map(|v| v.trim().eq_ignore_ascii_case("true"))
        .unwrap_or(default)
}

fn env_parse(key: &str, default: u64) -> u64 {
    std::env::var(key)
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or(default)
}
