// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Async driver for the adapter state machine.

use std::time::Duration;

use tokio::sync::{broadcast, watch};
use tokio::time::Instant;

use super::{Adapter, AdapterEvent, Coordinator};

/// Runs an [`Adapter`] on the current task.
///
/// The loop sleeps until the adapter waker fires (transport I/O, queued
/// work), the next timer deadline passes, or shutdown is requested.
pub struct AdapterService<C: Coordinator> {
    adapter: Adapter<C>,
}

impl<C: Coordinator> AdapterService<C> {
    pub fn new(adapter: Adapter<C>) -> Self {
        Self { adapter }
    }

    pub fn adapter(&self) -> &Adapter<C> {
        &self.adapter
    }

    pub fn adapter_mut(&mut self) -> &mut Adapter<C> {
        &mut self.adapter
    }

    /// Initialise the adapter and poll it until `shutdown` turns `true`
    /// (or its sender is dropped). Returns the adapter for inspection.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) -> Adapter<C> {
        let waker = self.adapter.waker();
        self.adapter.init(Instant::now().into_std());

        loop {
            if *shutdown.borrow() {
                break;
            }

            self.adapter.poll(Instant::now().into_std());
            let deadline = self.adapter.next_deadline().map(Instant::from_std);

            tokio::select! {
                _ = waker.notified() => {}
                _ = sleep_until(deadline) => {}
                changed = shutdown.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
            }
        }

        tracing::debug!("Adapter service stopped");
        self.adapter
    }
}

async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

/// Wait until an event matching `predicate` is received, or `timeout`
/// elapses. Returns `true` when the event arrived in time.
///
/// The caller keeps running other tasks on the same runtime while waiting.
pub async fn wait_for_event<F>(
    receiver: &mut broadcast::Receiver<AdapterEvent>,
    mut predicate: F,
    timeout: Duration,
) -> bool
where
    F: FnMut(&AdapterEvent) -> bool,
{
    let wait = async {
        loop {
            match receiver.recv().await {
                Ok(event) if predicate(&event) => return true,
                Ok(_) | Err(broadcast::error::RecvError::Lagged(_)) => continue,
                Err(broadcast::error::RecvError::Closed) => return false,
            }
        }
    };

    tokio::time::timeout(timeout, wait).await.unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_wait_for_event_matches() {
        let (tx, mut rx) = broadcast::channel(4);
        tx.send(AdapterEvent::Reset).unwrap();
        tx.send(AdapterEvent::PermitJoinUpdated(true)).unwrap();

        let hit = wait_for_event(
            &mut rx,
            |e| matches!(e, AdapterEvent::PermitJoinUpdated(true)),
            Duration::from_millis(50),
        )
        .await;
        assert!(hit);
    }

    #[tokio::test]
    async fn test_wait_for_event_times_out() {
        let (tx, mut rx) = broadcast::channel::<AdapterEvent>(4);
        tx.send(AdapterEvent::Reset).unwrap();

        let hit = wait_for_event(
            &mut rx,
            |e| matches!(e, AdapterEvent::PermitJoinUpdated(_)),
            Duration::from_millis(20),
        )
        .await;
        assert!(!hit);
    }
}
