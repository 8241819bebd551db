//! SyncLoop: keeps one observer converged with the authority by polling
//!
//! Each poll either raises `Connected` + both channel events (on every
//! success, changed or not) or `ConnectivityLost` with the failure streak.
//! Polls are strictly sequential: poll N's events are delivered before
//! poll N+1 is issued. The loop runs until its `SyncHandle` is stopped or
//! dropped, or the event receiver goes away.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use crate::core::AuthorityClient;
use crate::types::{ScorekeepingLight, ShowLight, Snapshot, SyncError};
use crate::{FAILURE_RETRY_MS, MIN_POLL_INTERVAL_MS};

/// Event raised to the renderer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncEvent {
    /// A poll succeeded; the failure streak is over
    Connected,
    ShowLightChanged(Option<ShowLight>),
    SkLightChanged(Option<ScorekeepingLight>),
    /// A poll failed; local state is kept
    ConnectivityLost { failures: u32, error: SyncError },
}

/// Delays between polls
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pacing {
    /// Minimum delay after a successful poll
    pub min_interval: Duration,
    /// Delay after a failed poll
    pub failure_retry: Duration,
}

impl Default for Pacing {
    fn default() -> Self {
        Self {
            min_interval: Duration::from_millis(MIN_POLL_INTERVAL_MS),
            failure_retry: Duration::from_millis(FAILURE_RETRY_MS),
        }
    }
}

/// Polling state for one observer and one authority address
pub struct SyncLoop<C: ?Sized> {
    client: Arc<C>,
    address: String,
    pacing: Pacing,
    last_known: Option<Snapshot>,
    failures: u32,
    polls: u64,
}

impl<C: AuthorityClient + ?Sized + 'static> SyncLoop<C> {
    pub fn new(client: Arc<C>, address: impl Into<String>, pacing: Pacing) -> Self {
        Self {
            client,
            address: address.into(),
            pacing,
            last_known: None,
            failures: 0,
            polls: 0,
        }
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    /// Last successfully fetched snapshot
    pub fn last_known(&self) -> Option<Snapshot> {
        self.last_known
    }

    /// Consecutive failed polls
    pub fn failures(&self) -> u32 {
        self.failures
    }

    /// Polls issued so far
    pub fn polls(&self) -> u64 {
        self.polls
    }

    /// Fetch once and return the events it raises
    pub async fn poll_once(&mut self) -> Vec<SyncEvent> {
        self.polls += 1;
        match self.client.fetch_snapshot(&self.address).await {
            Ok(snapshot) => {
                if self.failures > 0 {
                    tracing::info!(address = %self.address, after = self.failures, "authority reachable again");
                }
                self.failures = 0;
                self.last_known = Some(snapshot);
                vec![
                    SyncEvent::Connected,
                    SyncEvent::ShowLightChanged(snapshot.show_light_state),
                    SyncEvent::SkLightChanged(snapshot.sk_light_state),
                ]
            }
            Err(error) => {
                self.failures = self.failures.saturating_add(1);
                tracing::warn!(address = %self.address, failures = self.failures, %error, "poll failed");
                vec![SyncEvent::ConnectivityLost {
                    failures: self.failures,
                    error,
                }]
            }
        }
    }

    /// Poll until stopped, delivering events in order
    pub async fn run(mut self, events: mpsc::Sender<SyncEvent>, mut stop: watch::Receiver<bool>) {
        tracing::debug!(address = %self.address, "sync loop started");
        loop {
            let batch = tokio::select! {
                biased;
                _ = stop.changed() => break,
                batch = self.poll_once() => batch,
            };

            let failed = matches!(batch.last(), Some(SyncEvent::ConnectivityLost { .. }));
            for event in batch {
                tokio::select! {
                    biased;
                    _ = stop.changed() => return self.stopped(),
                    sent = events.send(event) => {
                        if sent.is_err() {
                            tracing::debug!("event receiver gone, sync loop ending");
                            return;
                        }
                    }
                }
            }

            let delay = if failed {
                self.pacing.failure_retry
            } else {
                self.pacing.min_interval
            };
            tokio::select! {
                biased;
                _ = stop.changed() => break,
                _ = tokio::time::sleep(delay) => {}
            }
        }
        self.stopped();
    }

    fn stopped(&self) {
        tracing::debug!(address = %self.address, polls = self.polls, "sync loop stopped");
    }

    /// Run on a background task
    pub fn spawn(self, events: mpsc::Sender<SyncEvent>) -> SyncHandle {
        let (stop_tx, stop_rx) = watch::channel(false);
        let task = tokio::spawn(self.run(events, stop_rx));
        SyncHandle {
            stop_tx,
            task: Some(task),
        }
    }
}

/// Owner handle of a running sync loop; dropping it aborts the loop
#[derive(Debug)]
pub struct SyncHandle {
    stop_tx: watch::Sender<bool>,
    task: Option<JoinHandle<()>>,
}

impl SyncHandle {
    /// Ask the loop to stop and wait for it
    pub async fn stop(mut self) {
        let _ = self.stop_tx.send(true);
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }

    pub fn is_finished(&self) -> bool {
        self.task.as_ref().map_or(true, |t| t.is_finished())
    }
}

impl Drop for SyncHandle {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::MemoryAuthority;

    #[tokio::test]
    async fn test_poll_raises_all_events_on_success() {
        let authority = Arc::new(MemoryAuthority::new());
        authority.apply(crate::types::Action::Halt);

        let mut sync = SyncLoop::new(authority, "memory", Pacing::default());
        let events = sync.poll_once().await;
        assert_eq!(
            events,
            vec![
                SyncEvent::Connected,
                SyncEvent::ShowLightChanged(Some(ShowLight::Halt)),
                SyncEvent::SkLightChanged(None),
            ]
        );

        // unchanged state still raises both channel events
        let again = sync.poll_once().await;
        assert_eq!(again, events);
        assert_eq!(sync.polls(), 2);
    }

    #[tokio::test]
    async fn test_failure_keeps_last_known() {
        let authority = Arc::new(MemoryAuthority::new());
        authority.apply(crate::types::Action::ScoresReady);

        let mut sync = SyncLoop::new(authority.clone(), "memory", Pacing::default());
        sync.poll_once().await;
        let before = sync.last_known();

        authority.set_offline(true);
        let events = sync.poll_once().await;
        assert!(matches!(
            events.as_slice(),
            [SyncEvent::ConnectivityLost { failures: 1, .. }]
        ));
        sync.poll_once().await;
        assert_eq!(sync.failures(), 2);
        assert_eq!(sync.last_known(), before);
    }

    #[tokio::test]
    async fn test_stop_with_undrained_receiver() {
        let authority = Arc::new(MemoryAuthority::new());
        let (tx, _rx) = mpsc::channel(1);
        let pacing = Pacing {
            min_interval: Duration::from_millis(1),
            failure_retry: Duration::from_millis(1),
        };
        let handle = SyncLoop::new(authority, "memory", pacing).spawn(tx);

        // let the loop fill the channel and block on the next send
        tokio::time::sleep(Duration::from_millis(200)).await;
        let stopped = tokio::time::timeout(Duration::from_secs(3), handle.stop()).await;
        assert!(stopped.is_ok(), "stop() hung on a full event channel");
    }
}
