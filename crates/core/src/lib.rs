// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! qa-core: Record types shared by the QuickAudit sync layer and CLI.
//!
//! This crate holds the data model persisted on-device and exchanged with the
//! REST API: audits and their findings, the signed-in user, subscriptions,
//! app settings, and the pending changes waiting in the sync queue.

pub mod audit;
pub mod change;
pub mod error;
pub mod settings;
pub mod subscription;
pub mod user;

pub use audit::{Audit, AuditFilter, AuditStatus, Finding, FindingStatus, Severity};
pub use change::{Change, ChangeKind};
pub use error::{Error, Result};
pub use settings::Settings;
pub use subscription::{AddOns, BillingCycle, Plan, Price, Subscription, SubscriptionStatus};
pub use user::{AuthSession, Credentials, Registration, User, UserRole};
