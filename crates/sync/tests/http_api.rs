// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! HTTP client behaviour against a mock REST server.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::time::Duration;

use qa_core::{AddOns, Audit, BillingCycle, Credentials, Plan, Registration, SubscriptionStatus};
use std::sync::Arc;

use qa_sync::{
    ApiClient, ApiError, HttpApiClient, LocalData, MemoryStore, SubscriptionRequest, SyncOutcome,
    SyncService, SyncTrigger,
};
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(server: &MockServer) -> HttpApiClient {
    HttpApiClient::new(&format!("{}/api", server.uri()), Duration::from_secs(2))
        .unwrap()
        .with_token("tok-1")
}

fn audit_json(id: &str, title: &str) -> serde_json::Value {
    json!({
        "_id": id,
        "title": title,
        "location": "Site A",
        "status": "in_progress",
        "createdAt": "2025-03-01T09:00:00Z",
        "findings": []
    })
}

fn user_json() -> serde_json::Value {
    json!({"_id": "u-1", "email": "ann@example.com", "name": "Ann", "role": "auditor"})
}

#[tokio::test]
async fn login_returns_session() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .and(body_partial_json(json!({"email": "ann@example.com"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"user": user_json(), "token": "jwt-abc"})))
        .expect(1)
        .mount(&server)
        .await;

    let anonymous =
        HttpApiClient::new(&format!("{}/api", server.uri()), Duration::from_secs(2)).unwrap();
    let session = anonymous
        .login(&Credentials {
            email: "ann@example.com".into(),
            password: "secret-pass".into(),
        })
        .await
        .unwrap();

    assert_eq!(session.token, "jwt-abc");
    assert_eq!(session.user.id, "u-1");
}

#[tokio::test]
async fn register_sends_company_when_given() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/register"))
        .and(body_partial_json(json!({"company": "Acme"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"user": user_json(), "token": "jwt-new"})))
        .expect(1)
        .mount(&server)
        .await;

    let session = client(&server)
        .register(&Registration {
            name: "Ann".into(),
            email: "ann@example.com".into(),
            password: "secret-pass".into(),
            company: Some("Acme".into()),
        })
        .await
        .unwrap();
    assert_eq!(session.token, "jwt-new");
}

#[tokio::test]
async fn bad_credentials_surface_as_auth_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"message": "Invalid credentials"})))
        .mount(&server)
        .await;

    let err = client(&server)
        .login(&Credentials {
            email: "ann@example.com".into(),
            password: "wrong".into(),
        })
        .await
        .unwrap_err();
    assert!(err.is_auth());
}

#[tokio::test]
async fn profile_accepts_wrapped_user() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/auth/profile"))
        .and(header("authorization", "Bearer tok-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"user": user_json()})))
        .mount(&server)
        .await;

    let user = client(&server).profile().await.unwrap();
    assert_eq!(user.email, "ann@example.com");
}

#[tokio::test]
async fn create_returns_server_copy() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/audits"))
        .and(header("authorization", "Bearer tok-1"))
        .and(body_partial_json(json!({"title": "Kitchen"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"audit": audit_json("srv-1", "Kitchen")})))
        .expect(1)
        .mount(&server)
        .await;

    let local = Audit::new("Kitchen", "Site A");
    let created = client(&server).create_audit(&local).await.unwrap();
    assert_eq!(created.id, "srv-1");
}

#[tokio::test]
async fn update_puts_to_audit_path() {
    let server = MockServer::start().await;
    let mut audit = Audit::new("Kitchen", "Site A");
    audit.id = "srv-1".into();
    Mock::given(method("PUT"))
        .and(path("/api/audits/srv-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(audit_json("srv-1", "Kitchen")))
        .expect(1)
        .mount(&server)
        .await;

    let updated = client(&server).update_audit(&audit).await.unwrap();
    assert_eq!(updated.id, "srv-1");
}

#[tokio::test]
async fn delete_not_found_is_remote_404() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/api/audits/gone"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"message": "Audit not found"})))
        .mount(&server)
        .await;

    let err = client(&server).delete_audit("gone").await.unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(
        err.to_string(),
        "server returned 404: Audit not found"
    );
}

#[tokio::test]
async fn list_accepts_paged_envelope() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/audits"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "audits": [audit_json("a-1", "One"), audit_json("a-2", "Two")],
            "total": 2,
            "page": 1,
            "pageSize": 20
        })))
        .mount(&server)
        .await;

    let audits = client(&server).list_audits().await.unwrap();
    let ids: Vec<&str> = audits.iter().map(|a| a.id.as_str()).collect();
    assert_eq!(ids, ["a-1", "a-2"]);
}

async fn mount_two_pages(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/api/audits"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "count": 1, "total": 2, "page": 1, "totalPages": 2,
            "audits": [audit_json("a-1", "One")]
        })))
        .expect(1)
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/audits"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "count": 1, "total": 2, "page": 2, "totalPages": 2,
            "audits": [audit_json("a-2", "Two")]
        })))
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn list_follows_every_page() {
    let server = MockServer::start().await;
    mount_two_pages(&server).await;

    let audits = client(&server).list_audits().await.unwrap();
    let ids: Vec<&str> = audits.iter().map(|a| a.id.as_str()).collect();
    assert_eq!(ids, ["a-1", "a-2"]);
}

#[tokio::test]
async fn pull_keeps_audits_from_later_pages() {
    let server = MockServer::start().await;
    mount_two_pages(&server).await;

    let store = Arc::new(MemoryStore::new());
    let data = LocalData::new(store.clone());
    let mut first = Audit::new("One", "Site A");
    first.id = "a-1".into();
    let mut second = Audit::new("Two", "Site A");
    second.id = "a-2".into();
    data.save_audits(&[first, second]).unwrap();

    let service = SyncService::new(Arc::new(client(&server)), store);
    let report = match service.sync(SyncTrigger::UserRefresh).await.unwrap() {
        SyncOutcome::Completed(report) => report,
        other => panic!("sync did not run: {other:?}"),
    };

    assert_eq!(report.pulled, Some(2));
    assert_eq!(report.removed_stale, 0);
    let ids: Vec<String> = data.audits().unwrap().into_iter().map(|a| a.id).collect();
    assert_eq!(ids, ["a-1", "a-2"]);
}

#[tokio::test]
async fn server_error_carries_status_and_message() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/audits"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .mount(&server)
        .await;

    let err = client(&server).list_audits().await.unwrap_err();
    match err {
        ApiError::Remote { status, message } => {
            assert_eq!(status, 503);
            assert_eq!(message, "maintenance");
        }
        other => unreachable!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn malformed_body_is_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/audits"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
        .mount(&server)
        .await;

    let err = client(&server).list_audits().await.unwrap_err();
    assert!(matches!(err, ApiError::Decode(_)));
}

#[tokio::test]
async fn slow_server_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/audits"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([]))
                .set_delay(Duration::from_millis(500)),
        )
        .mount(&server)
        .await;

    let client = HttpApiClient::new(&format!("{}/api", server.uri()), Duration::from_millis(50))
        .unwrap();
    let err = client.list_audits().await.unwrap_err();
    assert!(matches!(err, ApiError::Timeout));
}

#[tokio::test]
async fn unreachable_server_is_network_error() {
    let client = HttpApiClient::new("http://127.0.0.1:9/api", Duration::from_secs(2)).unwrap();
    let err = client.list_audits().await.unwrap_err();
    assert!(matches!(err, ApiError::NetworkUnreachable(_)));
}

#[tokio::test]
async fn subscription_lifecycle() {
    let server = MockServer::start().await;
    let subscription = json!({
        "plan": "pro",
        "billingCycle": "annual",
        "status": "active",
        "renewalDate": "2026-03-01T00:00:00Z",
        "addOns": {"customTemplates": true},
        "price": {"amount": 999.0, "currency": "inr"}
    });
    Mock::given(method("POST"))
        .and(path("/api/payment/subscription"))
        .and(body_partial_json(json!({"plan": "pro", "billingCycle": "annual"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"subscription": subscription})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/payment/subscription"))
        .respond_with(ResponseTemplate::new(200).set_body_json(subscription.clone()))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/payment/subscription"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server);
    let created = client
        .subscribe(&SubscriptionRequest {
            plan: Plan::Pro,
            billing_cycle: BillingCycle::Annual,
            add_ons: AddOns {
                custom_templates: true,
                ..AddOns::default()
            },
        })
        .await
        .unwrap();
    assert_eq!(created.status, SubscriptionStatus::Active);
    assert!(created.add_ons.custom_templates);

    let current = client.subscription().await.unwrap().unwrap();
    assert_eq!(current.plan, Plan::Pro);

    client.cancel_subscription().await.unwrap();
}

#[tokio::test]
async fn missing_subscription_is_none() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/payment/subscription"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    assert!(client(&server).subscription().await.unwrap().is_none());
}

#[tokio::test]
async fn health_checks_server_root() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "ok"})))
        .expect(1)
        .mount(&server)
        .await;

    client(&server).health().await.unwrap();
}
