//! Upstream usage payload vector tests.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::fs;

use usagegate_core::protocol::usage::{ActiveUsers, UsageResponse};

fn load(name: &str) -> Vec<u8> {
    fs::read(format!("tests/vectors/{name}")).unwrap()
}

#[test]
fn counts_user_ids() {
    let usage = UsageResponse::from_slice(&load("usage_basic.json")).unwrap();
    assert_eq!(usage.model_ids.len(), 2);
    assert_eq!(usage.active_user_count(), 3);
}

#[test]
fn duplicates_are_counted_and_extra_fields_ignored() {
    let usage = UsageResponse::from_slice(&load("usage_duplicates.json")).unwrap();
    assert_eq!(usage.active_user_count(), 5);
}

#[test]
fn model_ids_are_optional() {
    let usage = UsageResponse::from_slice(&load("usage_no_models.json")).unwrap();
    assert!(usage.model_ids.is_empty());
    assert_eq!(usage.active_user_count(), 0);
}

#[test]
fn missing_user_ids_is_a_decode_error() {
    let err = UsageResponse::from_slice(&load("usage_missing_users.json")).unwrap_err();
    assert_eq!(err.client_code().as_str(), "DECODE");
}

#[test]
fn wrong_shape_is_a_decode_error() {
    let err = UsageResponse::from_slice(&load("usage_wrong_type.json")).unwrap_err();
    assert_eq!(err.client_code().as_str(), "DECODE");

    let err = UsageResponse::from_slice(b"<html>bad gateway</html>").unwrap_err();
    assert!(err.to_string().starts_with("decode error:"));
}

#[test]
fn active_users_body_shape() {
    let body = serde_json::to_string(&ActiveUsers::from(3)).unwrap();
    assert_eq!(body, r#"{"active_users":3}"#);
}
