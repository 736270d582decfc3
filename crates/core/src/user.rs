// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Users and authentication payloads.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// What a user is allowed to do in the app.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    /// Manages users, branding and billing.
    Admin,
    /// Reviews and approves audits.
    Supervisor,
    /// Performs audits in the field.
    Auditor,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Admin => "admin",
            UserRole::Supervisor => "supervisor",
            UserRole::Auditor => "auditor",
        }
    }

    /// Supervisors and admins may approve or reject audits.
    pub fn can_review(&self) -> bool {
        matches!(self, UserRole::Admin | UserRole::Supervisor)
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "admin" => Ok(UserRole::Admin),
            "supervisor" => Ok(UserRole::Supervisor),
            "auditor" => Ok(UserRole::Auditor),
            _ => Err(Error::InvalidRole(s.to_string())),
        }
    }
}

/// The signed-in user, persisted locally after login and cleared on logout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    #[serde(alias = "_id")]
    pub id: String,
    pub email: String,
    pub name: String,
    pub role: UserRole,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
}

/// Body of `POST /auth/login`.
#[derive(Debug, Clone, Serialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// Body of `POST /auth/register`.
#[derive(Debug, Clone, Serialize)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
}

impl Registration {
    /// Rejects obviously unusable input before it reaches the server.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::InvalidInput("name cannot be empty".to_string()));
        }
        let email = self.email.trim();
        match email.split_once('@') {
            Some((local, domain)) if !local.is_empty() && domain.contains('.') => {}
            _ => {
                return Err(Error::InvalidInput(format!(
                    "invalid email address: '{}'",
                    self.email
                )))
            }
        }
        if self.password.len() < 8 {
            return Err(Error::InvalidInput(
                "password must be at least 8 characters".to_string(),
            ));
        }
        Ok(())
    }
}

/// Response of login and register: the user plus a bearer token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthSession {
    pub user: User,
    pub token: String,
}

#[cfg(test)]
#[path = "user_tests.rs"]
mod tests;
