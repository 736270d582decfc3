// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Client side of the QuickAudit REST API.
//!
//! [`ApiClient`] is the slice of the API the sync service depends on, so the
//! service can be driven by a fake in tests. [`HttpApiClient`] is the real
//! implementation and also carries the auth and subscription endpoints the
//! CLI uses directly.

mod http;

use std::future::Future;
use std::pin::Pin;

use qa_core::{AddOns, Audit, BillingCycle, Plan};
use serde::Serialize;

pub use http::HttpApiClient;

/// Error type for API calls.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ApiError {
    /// The server rejected the bearer token (HTTP 401).
    #[error("not authenticated\n  hint: run `qa login` to sign in again")]
    Auth,

    /// Any other non-2xx response.
    #[error("server returned {status}: {message}")]
    Remote { status: u16, message: String },

    /// The request could not be sent or the connection dropped.
    #[error("network unreachable: {0}")]
    NetworkUnreachable(String),

    /// No response within the request timeout.
    #[error("request timed out")]
    Timeout,

    /// A 2xx response whose body was not what we expected.
    #[error("unexpected response body: {0}")]
    Decode(String),

    #[error("invalid API URL: {0}\n  hint: check `api_url` in config.toml or QA_API_URL")]
    InvalidUrl(String),
}

impl ApiError {
    /// True when the caller must re-authenticate rather than retry.
    pub fn is_auth(&self) -> bool {
        matches!(self, ApiError::Auth)
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::Remote { status: 404, .. })
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ApiError::Timeout
        } else if e.is_decode() {
            ApiError::Decode(e.to_string())
        } else {
            ApiError::NetworkUnreachable(e.to_string())
        }
    }
}

impl From<url::ParseError> for ApiError {
    fn from(e: url::ParseError) -> Self {
        ApiError::InvalidUrl(e.to_string())
    }
}

/// Result type for API calls.
pub type ApiResult<T> = Result<T, ApiError>;

/// Boxed future returned by [`ApiClient`] methods.
pub type ApiFuture<'a, T> = Pin<Box<dyn Future<Output = ApiResult<T>> + Send + 'a>>;

/// Audit endpoints used by the sync service.
pub trait ApiClient: Send + Sync {
    /// `POST /audits`. Returns the server's copy, which may carry a new id.
    fn create_audit<'a>(&'a self, audit: &'a Audit) -> ApiFuture<'a, Audit>;

    /// `PUT /audits/:id`.
    fn update_audit<'a>(&'a self, audit: &'a Audit) -> ApiFuture<'a, Audit>;

    /// `DELETE /audits/:id`.
    fn delete_audit<'a>(&'a self, id: &'a str) -> ApiFuture<'a, ()>;

    /// `GET /audits`: the authoritative list for the signed-in user.
    fn list_audits(&self) -> ApiFuture<'_, Vec<Audit>>;
}

/// Body of `POST /payment/subscription`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionRequest {
    pub plan: Plan,
    pub billing_cycle: BillingCycle,
    pub add_ons: AddOns,
}
