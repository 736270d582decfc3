// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Connectivity observation.
//!
//! Connectivity is a `watch` value. Whatever knows about the network (the
//! [`HealthProbe`] in the CLI, a platform callback elsewhere) publishes into the
//! sender; [`NetworkMonitor`] turns offline-to-online transitions into
//! [`SyncTrigger::Reconnect`] calls. There is no debouncing: flapping produces
//! extra triggers, which the service's single-flight guard absorbs.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::api::{ApiClient, HttpApiClient};
use crate::service::{SyncError, SyncOutcome, SyncService, SyncTrigger};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Connectivity {
    Online,
    Offline,
}

impl Connectivity {
    pub fn is_online(&self) -> bool {
        matches!(self, Connectivity::Online)
    }
}

/// Watches a connectivity channel for reconnects.
pub struct NetworkMonitor {
    rx: watch::Receiver<Connectivity>,
    last: Connectivity,
}

impl NetworkMonitor {
    pub fn new(mut rx: watch::Receiver<Connectivity>) -> Self {
        let last = *rx.borrow_and_update();
        NetworkMonitor { rx, last }
    }

    /// Connectivity as last observed.
    pub fn current(&self) -> Connectivity {
        self.last
    }

    /// Wait for the next offline-to-online transition.
    ///
    /// Returns false once the publisher is gone.
    pub async fn next_reconnect(&mut self) -> bool {
        loop {
            if self.rx.changed().await.is_err() {
                return false;
            }
            let now = *self.rx.borrow_and_update();
            let previous = std::mem::replace(&mut self.last, now);
            debug!(?previous, ?now, "connectivity changed");
            if previous == Connectivity::Offline && now == Connectivity::Online {
                return true;
            }
        }
    }

    /// Trigger a sync on every reconnect until the publisher goes away.
    ///
    /// Each sync runs on its own task so transitions keep being observed
    /// while a cycle is in flight.
    pub async fn run<A>(mut self, service: Arc<SyncService<A>>)
    where
        A: ApiClient + 'static,
    {
        while self.next_reconnect().await {
            info!("network reconnected");
            let service = Arc::clone(&service);
            tokio::spawn(async move {
                match service.sync(SyncTrigger::Reconnect).await {
                    Ok(SyncOutcome::AlreadyRunning) => debug!("reconnect sync skipped, cycle in flight"),
                    Ok(_) => {}
                    Err(SyncError::Auth) => warn!("reconnect sync rejected, sign in again"),
                    Err(e) => warn!(error = %e, "reconnect sync failed"),
                }
            });
        }
        debug!("connectivity publisher closed, monitor stopping");
    }
}

/// Publishes connectivity by polling the API's health endpoint.
pub struct HealthProbe {
    client: HttpApiClient,
    interval: Duration,
    timeout: Duration,
    tx: watch::Sender<Connectivity>,
}

impl HealthProbe {
    /// Starts out `Offline` until the first probe answers.
    pub fn new(
        client: HttpApiClient,
        interval: Duration,
        timeout: Duration,
    ) -> (Self, watch::Receiver<Connectivity>) {
        let (tx, rx) = watch::channel(Connectivity::Offline);
        let probe = HealthProbe {
            client,
            interval,
            timeout,
            tx,
        };
        (probe, rx)
    }

    pub fn subscribe(&self) -> watch::Receiver<Connectivity> {
        self.tx.subscribe()
    }

    /// Probe once and publish the result if it changed.
    pub async fn probe_once(&self) -> Connectivity {
        let connectivity = match tokio::time::timeout(self.timeout, self.client.health()).await {
            Ok(Ok(())) => Connectivity::Online,
            Ok(Err(e)) => {
                debug!(error = %e, "health check failed");
                Connectivity::Offline
            }
            Err(_) => {
                debug!("health check timed out");
                Connectivity::Offline
            }
        };
        self.tx.send_if_modified(|current| {
            if *current == connectivity {
                return false;
            }
            *current = connectivity;
            true
        });
        connectivity
    }

    /// Probe at the configured interval until every receiver is dropped.
    pub async fn run(self) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        while !self.tx.is_closed() {
            ticker.tick().await;
            self.probe_once().await;
        }
    }
}

#[cfg(test)]
#[path = "network_tests.rs"]
mod tests;
