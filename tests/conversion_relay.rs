use course_checkout::config::RelayConfig;
use course_checkout::domain::context::{AdCookies, ClientContext};
use course_checkout::domain::conversion::{RelayOutcome, TrackingParams};
use course_checkout::domain::payment::{AttemptStatus, PaymentAttempt};
use course_checkout::gateways::mock::{MockBehavior, MockGateway};
use course_checkout::service::conversion_relay::{hash_pii, ConversionRelay};
use course_checkout::service::status_verifier::StatusVerifier;
use rust_decimal_macros::dec;
use serde_json::json;
use std::sync::Arc;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn relay(server: &MockServer, require_verified: bool, gateway: MockGateway) -> ConversionRelay {
    let config = RelayConfig {
        pixel_id: Some("PIXEL1".to_string()),
        access_token: Some("token-abc".to_string()),
        graph_url: server.uri(),
        test_event_code: Some("TEST123".to_string()),
        backup_webhook_url: Some(format!("{}/backup", server.uri())),
        require_verified,
        ..RelayConfig::default()
    };
    let verifier = StatusVerifier {
        gateway: Arc::new(gateway),
        default_currency: "INR".to_string(),
    };
    ConversionRelay::new(config, "91", dec!(1499.00), "INR", reqwest::Client::new(), verifier)
}

fn paid(amount: rust_decimal::Decimal) -> MockGateway {
    let mut attempt = PaymentAttempt::with_status(AttemptStatus::Success);
    attempt.amount = Some(amount);
    attempt.currency = Some("INR".to_string());
    MockGateway::new(MockBehavior::AlwaysSuccess).with_attempts(vec![attempt])
}

fn ctx() -> ClientContext {
    ClientContext {
        client_ip: "203.0.113.7".to_string(),
        user_agent: "Mozilla/5.0 (X11; Linux x86_64)".to_string(),
        cookies: AdCookies {
            fbc: Some("fb.1.1700000000.AbCd".to_string()),
            fbp: Some("fb.1.1700000000.123".to_string()),
        },
    }
}

fn params(order_id: &str) -> TrackingParams {
    TrackingParams {
        email: Some("Test@Example.com".to_string()),
        phone: Some("9876543210".to_string()),
        first_name: Some("Asha".to_string()),
        last_name: Some("Rao".to_string()),
        order_id: Some(order_id.to_string()),
        amount: Some("1".to_string()),
        ..Default::default()
    }
}

#[tokio::test]
async fn forwards_hashed_event_and_backup() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/PIXEL1/events"))
        .and(header("authorization", "Bearer token-abc"))
        .and(body_partial_json(json!({
            "test_event_code": "TEST123",
            "data": [{
                "event_name": "Purchase",
                "event_id": "BTD_100",
                "action_source": "website",
                "user_data": {
                    "em": hash_pii("test@example.com"),
                    "ph": hash_pii("+919876543210"),
                    "fn": hash_pii("asha"),
                    "ln": hash_pii("rao"),
                    "country": hash_pii("in"),
                    "client_ip_address": "203.0.113.7",
                    "fbc": "fb.1.1700000000.AbCd",
                    "fbp": "fb.1.1700000000.123"
                },
                "custom_data": {"currency": "INR", "value": 1499.0, "num_items": 1}
            }]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"events_received": 1})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/backup"))
        .and(body_partial_json(json!({
            "customer": {"email": "Test@Example.com", "phone": "9876543210"},
            "order": {"order_id": "BTD_100"},
            "facebook_response": {"events_received": 1}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "success"})))
        .expect(1)
        .mount(&server)
        .await;

    let summary = relay(&server, true, paid(dec!(1499))).relay(params("BTD_100"), ctx()).await;

    assert!(summary.success);
    assert_eq!(summary.outcome, RelayOutcome::Forwarded);
    assert_eq!(summary.event_id, "BTD_100");
    assert!(summary.facebook.sent);
    assert_eq!(summary.facebook.status, Some(200));
    assert!(summary.zapier.sent);
    assert_eq!(summary.emq_parameters["hashed_phone"], "captured");
}

#[tokio::test]
async fn primary_failure_still_reports_success() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/PIXEL1/events"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/backup"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let summary = relay(&server, false, MockGateway::new(MockBehavior::AlwaysSuccess))
        .relay(params("BTD_200"), ctx())
        .await;

    assert!(summary.success);
    assert!(!summary.facebook.sent);
    assert!(summary.facebook.response["error"].as_str().unwrap().contains("500"));
    assert!(summary.zapier.sent);
}

#[tokio::test]
async fn backup_is_skipped_without_contact_details() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/PIXEL1/events"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/backup"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let mut p = params("BTD_300");
    p.phone = None;
    let summary = relay(&server, false, MockGateway::new(MockBehavior::AlwaysSuccess))
        .relay(p, ctx())
        .await;

    assert!(summary.facebook.sent);
    assert!(!summary.zapier.sent);
    assert_eq!(summary.emq_parameters["hashed_phone"], "missing");
}

#[tokio::test]
async fn repeat_relay_sends_once() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/PIXEL1/events"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/backup"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let relay = relay(&server, true, paid(dec!(1499)));
    let first = relay.relay(params("BTD_400"), ctx()).await;
    let second = relay.relay(params("BTD_400"), ctx()).await;

    assert_eq!(first.outcome, RelayOutcome::Forwarded);
    assert_eq!(second.outcome, RelayOutcome::Duplicate);
    assert!(!second.facebook.sent);
}

#[tokio::test]
async fn unverified_order_sends_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let failed = MockGateway::new(MockBehavior::AlwaysSuccess)
        .with_attempts(vec![PaymentAttempt::with_status(AttemptStatus::Failed)]);
    let summary = relay(&server, true, failed).relay(params("BTD_500"), ctx()).await;
    assert_eq!(summary.outcome, RelayOutcome::Unverified);

    let mut no_id = params("x");
    no_id.order_id = None;
    let summary = relay(&server, true, paid(dec!(1499))).relay(no_id, ctx()).await;
    assert_eq!(summary.outcome, RelayOutcome::Unverified);
}
