// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use qa_core::{Audit, User, UserRole};
use qa_sync::{App, Config, MemoryStore};

/// Port 9 (discard) has nothing listening.
const UNREACHABLE_API: &str = "http://127.0.0.1:9/api";

/// An app over an in-memory store talking to `api_url`.
pub fn app_at(api_url: &str) -> App {
    let config = Config {
        api_url: api_url.to_string(),
        ..Config::default()
    };
    qa_sync::open_with_store(config, Arc::new(MemoryStore::new())).unwrap()
}

pub fn app() -> App {
    app_at(UNREACHABLE_API)
}

/// Like [`app_at`], with a saved session (token `tok-1`) for a user with `role`.
pub fn signed_in_at(api_url: &str, role: UserRole) -> App {
    let app = app_at(api_url);
    app.data.save_auth_token("tok-1").unwrap();
    app.data
        .save_user(&User {
            id: "u-1".into(),
            email: "ann@example.com".into(),
            name: "Ann".into(),
            role,
            company: None,
        })
        .unwrap();
    let store = Arc::clone(app.data.store());
    qa_sync::open_with_store(app.config, store).unwrap()
}

pub fn signed_in_app(role: UserRole) -> App {
    signed_in_at(UNREACHABLE_API, role)
}

pub fn add_audit(app: &App, title: &str) -> Audit {
    let audit = Audit::new(title, "Site");
    app.service.create_audit(&audit).unwrap();
    audit
}
