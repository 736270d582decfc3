// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use std::time::Duration;

use reqwest::StatusCode;
use yare::parameterized;

use super::*;

#[parameterized(
    json_message = { r#"{"message":"Audit not found"}"#, "Audit not found" },
    json_error = { r#"{"error":"Invalid plan"}"#, "Invalid plan" },
    plain_text = { "  upstream exploded \n", "upstream exploded" },
    empty = { "", "Internal Server Error" },
    json_without_message = { r#"{"code":42}"#, r#"{"code":42}"# },
)]
fn error_message_extraction(body: &str, expected: &str) {
    assert_eq!(
        error_message(StatusCode::INTERNAL_SERVER_ERROR, body),
        expected
    );
}

#[parameterized(
    no_slash = { "http://localhost:3000/api" },
    trailing_slash = { "http://localhost:3000/api/" },
    padded = { "  http://localhost:3000/api  " },
)]
fn base_url_keeps_api_prefix(base: &str) {
    let client = HttpApiClient::new(base, Duration::from_secs(5)).unwrap();
    assert_eq!(
        client.url("audits/a-1").unwrap().as_str(),
        "http://localhost:3000/api/audits/a-1"
    );
}

#[test]
fn health_lives_at_server_root() {
    let client = HttpApiClient::new("http://localhost:3000/api", Duration::from_secs(5)).unwrap();
    assert_eq!(
        client.url("/health").unwrap().as_str(),
        "http://localhost:3000/health"
    );
}

#[test]
fn invalid_base_url_is_rejected() {
    let err = HttpApiClient::new("not a url", Duration::from_secs(5)).unwrap_err();
    assert!(matches!(err, ApiError::InvalidUrl(_)));
}

#[test]
fn token_is_attached_by_builder() {
    let client = HttpApiClient::new("http://localhost:3000/api", Duration::from_secs(5))
        .unwrap()
        .with_token("tok-1");
    assert_eq!(client.token(), Some("tok-1"));
}

#[test]
fn audit_body_accepts_wrapped_and_bare() {
    let bare = r#"{"_id":"srv-1","title":"Kitchen","location":"Site","status":"draft","createdAt":"2025-01-01T00:00:00Z"}"#;
    let wrapped = format!(r#"{{"audit":{bare}}}"#);

    for raw in [bare.to_string(), wrapped] {
        let audit = match serde_json::from_str::<AuditBody>(&raw).unwrap() {
            AuditBody::Wrapped { audit } | AuditBody::Bare(audit) => audit,
        };
        assert_eq!(audit.id, "srv-1");
    }
}

#[parameterized(
    bare = { "[]" },
    data = { r#"{"data":[]}"# },
    audits = { r#"{"audits":[],"total":0,"page":1}"# },
)]
fn audit_list_envelopes(raw: &str) {
    assert!(serde_json::from_str::<AuditListBody>(raw).is_ok());
}

#[test]
fn subscription_body_null_means_none() {
    let body: SubscriptionBody = serde_json::from_str(r#"{"subscription":null}"#).unwrap();
    assert!(matches!(
        body,
        SubscriptionBody::Wrapped { subscription: None }
    ));
}
