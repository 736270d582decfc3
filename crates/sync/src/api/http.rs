// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! reqwest-backed API client.

use std::collections::HashSet;
use std::time::Duration;

use qa_core::{Audit, AuthSession, Credentials, Registration, Subscription, User};
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;
use url::Url;

use super::{ApiClient, ApiError, ApiFuture, ApiResult, SubscriptionRequest};

/// Audit responses come back bare or wrapped depending on the backend.
#[derive(Deserialize)]
#[serde(untagged)]
enum AuditBody {
    Wrapped { audit: Audit },
    Bare(Audit),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum AuditListBody {
    Bare(Vec<Audit>),
    Data { data: Vec<Audit> },
    Audits {
        audits: Vec<Audit>,
        #[serde(default)]
        page: Option<u32>,
        #[serde(default, rename = "totalPages")]
        total_pages: Option<u32>,
    },
}

/// Page size requested when listing audits.
const LIST_PAGE_LIMIT: u32 = 100;

#[derive(Deserialize)]
#[serde(untagged)]
enum UserBody {
    Wrapped { user: User },
    Bare(User),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SubscriptionBody {
    Bare(Subscription),
    Wrapped { subscription: Option<Subscription> },
}

#[derive(Deserialize)]
struct HealthBody {
    status: String,
}

/// Authenticated HTTP client for the REST API.
#[derive(Debug, Clone)]
pub struct HttpApiClient {
    base_url: Url,
    http: reqwest::Client,
    token: Option<String>,
}

impl HttpApiClient {
    /// Build a client for `base_url` (e.g. `http://localhost:3000/api`).
    ///
    /// `timeout` bounds each request end to end.
    pub fn new(base_url: &str, timeout: Duration) -> ApiResult<Self> {
        let mut base = base_url.trim().to_string();
        // Url::join drops the last segment unless the base ends in '/'.
        if !base.ends_with('/') {
            base.push('/');
        }
        let base_url = Url::parse(&base)?;
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::NetworkUnreachable(e.to_string()))?;
        Ok(HttpApiClient {
            base_url,
            http,
            token: None,
        })
    }

    /// Attach the bearer token used for authenticated endpoints.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn url(&self, path: &str) -> ApiResult<Url> {
        Ok(self.base_url.join(path)?)
    }

    fn apply_auth(&self, req: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }

    /// Send `req`, mapping 401 and other non-2xx statuses to errors.
    async fn send(&self, req: RequestBuilder) -> ApiResult<Response> {
        let response = self.apply_auth(req).send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        if status == StatusCode::UNAUTHORIZED {
            debug!(url = %response.url(), "request rejected as unauthenticated");
            return Err(ApiError::Auth);
        }
        let body = response.text().await.unwrap_or_default();
        Err(ApiError::Remote {
            status: status.as_u16(),
            message: error_message(status, &body),
        })
    }

    async fn json<T: DeserializeOwned>(response: Response) -> ApiResult<T> {
        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| ApiError::Decode(e.to_string()))
    }

    // Auth

    /// `POST /auth/register`.
    pub async fn register(&self, registration: &Registration) -> ApiResult<AuthSession> {
        let url = self.url("auth/register")?;
        debug!(email = %registration.email, "registering account");
        let response = self.send(self.http.post(url).json(registration)).await?;
        Self::json(response).await
    }

    /// `POST /auth/login`. The returned token is not attached to this client.
    pub async fn login(&self, credentials: &Credentials) -> ApiResult<AuthSession> {
        let url = self.url("auth/login")?;
        debug!(email = %credentials.email, "logging in");
        let response = self.send(self.http.post(url).json(credentials)).await?;
        Self::json(response).await
    }

    /// `POST /auth/logout`.
    pub async fn logout(&self) -> ApiResult<()> {
        let url = self.url("auth/logout")?;
        self.send(self.http.post(url)).await?;
        Ok(())
    }

    /// `GET /auth/profile`.
    pub async fn profile(&self) -> ApiResult<User> {
        let url = self.url("auth/profile")?;
        let response = self.send(self.http.get(url)).await?;
        match Self::json::<UserBody>(response).await? {
            UserBody::Wrapped { user } | UserBody::Bare(user) => Ok(user),
        }
    }

    // Subscriptions

    /// `GET /payment/subscription`. `None` when the user has no subscription.
    pub async fn subscription(&self) -> ApiResult<Option<Subscription>> {
        let url = self.url("payment/subscription")?;
        let response = match self.send(self.http.get(url)).await {
            Ok(response) => response,
            Err(e) if e.is_not_found() => return Ok(None),
            Err(e) => return Err(e),
        };
        match Self::json::<SubscriptionBody>(response).await? {
            SubscriptionBody::Bare(subscription) => Ok(Some(subscription)),
            SubscriptionBody::Wrapped { subscription } => Ok(subscription),
        }
    }

    /// `POST /payment/subscription`.
    pub async fn subscribe(&self, request: &SubscriptionRequest) -> ApiResult<Subscription> {
        let url = self.url("payment/subscription")?;
        debug!(plan = %request.plan, cycle = %request.billing_cycle, "subscribing");
        let response = self.send(self.http.post(url).json(request)).await?;
        match Self::json::<SubscriptionBody>(response).await? {
            SubscriptionBody::Bare(subscription)
            | SubscriptionBody::Wrapped {
                subscription: Some(subscription),
            } => Ok(subscription),
            SubscriptionBody::Wrapped { subscription: None } => Err(ApiError::Decode(
                "subscription response carried no subscription".to_string(),
            )),
        }
    }

    /// `DELETE /payment/subscription`.
    pub async fn cancel_subscription(&self) -> ApiResult<()> {
        let url = self.url("payment/subscription")?;
        self.send(self.http.delete(url)).await?;
        Ok(())
    }

    /// `GET /health` at the server root. Succeeds when it reports `ok`.
    pub async fn health(&self) -> ApiResult<()> {
        let url = self.url("/health")?;
        let response = self.send(self.http.get(url)).await?;
        let body: HealthBody = Self::json(response).await?;
        if body.status.eq_ignore_ascii_case("ok") {
            Ok(())
        } else {
            Err(ApiError::Decode(format!("health status {:?}", body.status)))
        }
    }
}

impl ApiClient for HttpApiClient {
    fn create_audit<'a>(&'a self, audit: &'a Audit) -> ApiFuture<'a, Audit> {
        Box::pin(async move {
            let url = self.url("audits")?;
            debug!(audit_id = %audit.id, "POST audit");
            let response = self.send(self.http.post(url).json(audit)).await?;
            match Self::json::<AuditBody>(response).await? {
                AuditBody::Wrapped { audit } | AuditBody::Bare(audit) => Ok(audit),
            }
        })
    }

    fn update_audit<'a>(&'a self, audit: &'a Audit) -> ApiFuture<'a, Audit> {
        Box::pin(async move {
            let url = self.url(&format!("audits/{}", audit.id))?;
            debug!(audit_id = %audit.id, "PUT audit");
            let response = self.send(self.http.put(url).json(audit)).await?;
            match Self::json::<AuditBody>(response).await? {
                AuditBody::Wrapped { audit } | AuditBody::Bare(audit) => Ok(audit),
            }
        })
    }

    fn delete_audit<'a>(&'a self, id: &'a str) -> ApiFuture<'a, ()> {
        Box::pin(async move {
            let url = self.url(&format!("audits/{id}"))?;
            debug!(audit_id = %id, "DELETE audit");
            self.send(self.http.delete(url)).await?;
            Ok(())
        })
    }

    /// `GET /audits`, following `page`/`totalPages` until the last page.
    fn list_audits(&self) -> ApiFuture<'_, Vec<Audit>> {
        Box::pin(async move {
            let mut audits: Vec<Audit> = Vec::new();
            let mut seen = HashSet::new();
            let mut page = 1;
            loop {
                let mut url = self.url("audits")?;
                url.query_pairs_mut()
                    .append_pair("page", &page.to_string())
                    .append_pair("limit", &LIST_PAGE_LIMIT.to_string());
                let response = self.send(self.http.get(url)).await?;
                let (batch, total_pages) = match Self::json::<AuditListBody>(response).await? {
                    AuditListBody::Bare(audits) | AuditListBody::Data { data: audits } => {
                        (audits, None)
                    }
                    AuditListBody::Audits {
                        audits,
                        page: served,
                        total_pages,
                    } => {
                        if let Some(served) = served {
                            page = page.max(served);
                        }
                        (audits, total_pages)
                    }
                };
                debug!(page, count = batch.len(), "listed audit page");
                let empty = batch.is_empty();
                for audit in batch {
                    if seen.insert(audit.id.clone()) {
                        audits.push(audit);
                    }
                }
                match total_pages {
                    Some(total) if page < total && !empty => page += 1,
                    _ => break,
                }
            }
            debug!(count = audits.len(), "listed audits");
            Ok(audits)
        })
    }
}

/// Pull a human-readable message out of an error response body.
fn error_message(status: StatusCode, body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        for field in ["message", "error"] {
            if let Some(message) = value.get(field).and_then(|v| v.as_str()) {
                return message.to_string();
            }
        }
    }
    let body = body.trim();
    if body.is_empty() {
        status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_string()
    } else {
        body.to_string()
    }
}

#[cfg(test)]
#[path = "http_tests.rs"]
mod tests;
