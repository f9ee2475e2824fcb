use chrono::Utc;
use course_checkout::service::conversion_relay::hash_pii;
use course_checkout::service::order_builder::{generate_order_id, normalize_phone};
use course_checkout::validation::{validate_email, validate_phone_number};
use proptest::prelude::*;

const PLACEHOLDER: &str = "+919999999999";

proptest! {
    #[test]
    fn domestic_mobiles_starting_6_to_9_are_valid(first in 6u8..=9, rest in "[0-9]{9}") {
        let number = format!("{}{}", first, rest);
        prop_assert!(validate_phone_number(&number, "+91"));
    }

    #[test]
    fn domestic_numbers_starting_0_to_5_are_invalid(first in 0u8..=5, rest in "[0-9]{9}") {
        let number = format!("{}{}", first, rest);
        prop_assert!(!validate_phone_number(&number, "+91"));
    }

    #[test]
    fn international_numbers_accept_10_to_15_digits(digits in "[0-9]{10,15}") {
        prop_assert!(validate_phone_number(&digits, "+44"));
    }

    #[test]
    fn ten_digit_numbers_gain_domestic_code(digits in "[0-9]{10}") {
        prop_assert_eq!(normalize_phone(&digits, "91", PLACEHOLDER), format!("+91{}", digits));
    }

    #[test]
    fn short_numbers_become_placeholder(digits in "[0-9]{0,9}") {
        prop_assert_eq!(normalize_phone(&digits, "91", PLACEHOLDER), PLACEHOLDER);
    }

    #[test]
    fn normalized_phones_are_plus_digits(raw in "[0-9 +()-]{0,20}") {
        let phone = normalize_phone(&raw, "91", PLACEHOLDER);
        prop_assert!(phone.starts_with('+'));
        prop_assert!(phone[1..].chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn hashing_ignores_case_and_padding(local in "[a-zA-Z0-9]{1,12}", pad in " {0,3}") {
        let mixed = format!("{pad}{local}@Example.COM{pad}");
        let lower = format!("{}@example.com", local.to_lowercase());
        prop_assert_eq!(hash_pii(&mixed), hash_pii(&lower));
    }

    #[test]
    fn order_ids_are_url_safe(prefix in "[A-Z]{2,5}") {
        let id = generate_order_id(&prefix, Utc::now());
        let want = format!("{}_", prefix);
        prop_assert!(id.starts_with(&want));
        prop_assert!(id.chars().all(|c| c.is_ascii_alphanumeric() || c == '_'));
    }
}

#[test]
fn email_examples() {
    assert!(validate_email("a@b.com"));
    assert!(!validate_email("a b@c.com"));
    assert!(!validate_email(""));
}

#[test]
fn phone_normalization_examples() {
    assert_eq!(normalize_phone("9876543210", "91", PLACEHOLDER), "+919876543210");
    assert_eq!(normalize_phone("919876543210", "91", PLACEHOLDER), "+919876543210");
    assert_eq!(normalize_phone("123", "91", PLACEHOLDER), PLACEHOLDER);
}

#[test]
fn case_insensitive_email_hash() {
    assert_eq!(hash_pii("Test@Example.com"), hash_pii("test@example.com"));
}
