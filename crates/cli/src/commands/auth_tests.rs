// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use super::super::testing;
use super::*;
use qa_core::UserRole;
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn user_json(name: &str) -> serde_json::Value {
    json!({"_id": "u-9", "email": "ann@example.com", "name": name, "role": "supervisor"})
}

#[tokio::test]
async fn login_saves_session() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .and(body_json(json!({"email": "ann@example.com", "password": "hunter22"})))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"user": user_json("Ann"), "token": "tok-9"})),
        )
        .mount(&server)
        .await;
    let app = testing::app_at(&format!("{}/api", server.uri()));

    let credentials = Credentials {
        email: "ann@example.com".into(),
        password: "hunter22".into(),
    };
    let session = login(&app, &credentials).await.unwrap();

    assert_eq!(session.token, "tok-9");
    assert_eq!(app.data.auth_token().unwrap().as_deref(), Some("tok-9"));
    assert_eq!(app.data.user().unwrap().unwrap().role, UserRole::Supervisor);
}

#[tokio::test]
async fn bad_credentials_store_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"message": "Invalid credentials"})))
        .mount(&server)
        .await;
    let app = testing::app_at(&format!("{}/api", server.uri()));

    let credentials = Credentials {
        email: "ann@example.com".into(),
        password: "wrong-password".into(),
    };
    let err = login(&app, &credentials).await.unwrap_err();
    assert!(err.is_auth());
    assert!(app.data.auth_token().unwrap().is_none());
}

#[tokio::test]
async fn register_validates_before_sending() {
    let app = testing::app();
    let registration = Registration {
        name: "Ann".into(),
        email: "not-an-email".into(),
        password: "hunter22".into(),
        company: None,
    };
    assert!(matches!(
        register(&app, &registration).await,
        Err(Error::Core(_))
    ));
}

#[tokio::test]
async fn logout_clears_even_when_server_fails() {
    let app = testing::signed_in_app(UserRole::Auditor);
    testing::add_audit(&app, "Queued");

    logout(&app).await.unwrap();

    assert!(app.data.auth_token().unwrap().is_none());
    assert!(app.data.user().unwrap().is_none());
    assert_eq!(app.service.queue().pending_count().unwrap(), 1);
}

#[tokio::test]
async fn refresh_profile_updates_saved_user() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/auth/profile"))
        .and(header("authorization", "Bearer tok-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"user": user_json("Ann Lee")})))
        .mount(&server)
        .await;
    let app = testing::signed_in_at(&format!("{}/api", server.uri()), UserRole::Auditor);

    let user = refresh_profile(&app).await.unwrap();
    assert_eq!(user.name, "Ann Lee");
    assert_eq!(app.data.user().unwrap().unwrap().name, "Ann Lee");
}

#[tokio::test]
async fn rejected_profile_clears_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/auth/profile"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;
    let app = testing::signed_in_at(&format!("{}/api", server.uri()), UserRole::Auditor);

    assert!(refresh_profile(&app).await.unwrap_err().is_auth());
    assert!(app.data.auth_token().unwrap().is_none());
}

#[tokio::test]
async fn refresh_requires_session() {
    let app = testing::app();
    assert!(matches!(
        refresh_profile(&app).await,
        Err(Error::NotSignedIn)
    ));
}

#[test]
fn given_password_is_used() {
    assert_eq!(password_or_stdin(Some("pw".into())).unwrap(), "pw");
    assert!(matches!(
        password_or_stdin(Some(String::new())),
        Err(Error::PasswordRequired)
    ));
}
