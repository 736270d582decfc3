// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! qa-sync: Offline-first data synchronization for QuickAudit.
//!
//! A single device keeps its audits in a local key-value store and queues
//! every mutation. The sync service drains that queue against the REST API
//! and then overwrites the local audit collection with the server's list.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐  reconnect  ┌─────────────┐     ┌─────────────┐
//! │   Network    │────────────►│    Sync     │────►│  ApiClient  │──► REST API
//! │   Monitor    │             │   Service   │◄────│   (trait)   │
//! └──────────────┘             └─────────────┘     └─────────────┘
//!                                 │       │
//!                                 ▼       ▼
//!                       ┌───────────┐ ┌───────────┐
//!                       │ SyncQueue │ │ LocalData │
//!                       └───────────┘ └───────────┘
//!                                 │       │
//!                                 ▼       ▼
//!                            ┌───────────────────┐
//!                            │   KeyValueStore   │ (SQLite / memory)
//!                            └───────────────────┘
//! ```
//!
//! Conflict policy is last-write-wins: local state wins while a change is
//! pending, and the next successful pull overwrites everything else.

pub mod api;
pub mod config;
pub mod network;
pub mod queue;
pub mod service;
pub mod startup;
pub mod store;

pub use api::{ApiClient, ApiError, ApiFuture, ApiResult, HttpApiClient, SubscriptionRequest};
pub use config::{Config, ConfigError};
pub use network::{Connectivity, HealthProbe, NetworkMonitor};
pub use queue::{DrainPlan, SyncQueue};
pub use service::{
    EntryFailure, SyncError, SyncOutcome, SyncPhase, SyncReport, SyncService, SyncStatus,
    SyncTrigger,
};
pub use startup::{
    bootstrap, open, open_with_store, App, Session, Stage, StageError, StartupError,
};
pub use store::{KeyValueStore, LocalData, MemoryStore, SqliteStore, StoreError, StoreResult};

#[cfg(test)]
mod test_helpers;
