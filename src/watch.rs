//! Change notification by polling.
//!
//! slurmrestd has no push channel, so a watch is a background task that
//! re-lists the resource every `poll_interval`, diffs the result against the
//! previous listing by identity and sends [`WatchEvent`]s over a bounded
//! channel. The first listing is the baseline and produces no events.
//!
//! Guarantees are best-effort: a change that is reverted between two polls
//! is never seen, and latency is bounded by the poll interval. Once the
//! caller's context is done the task exits, the channel closes and
//! [`EventStream::recv`] returns `None`; no event is delivered after that.

use std::future::Future;
use std::hash::Hash;
use std::time::Duration;

use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio::time::{MissedTickBehavior, interval};
use tracing::{debug, warn};

use crate::capability::Entity;
use crate::context::Context;
use crate::error::{ErrorKind, SlurmError, SlurmResult};

/// One observed change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum WatchEvent<T> {
    Added(T),
    Modified(T),
    Removed(T),
}

impl<T> WatchEvent<T> {
    /// The entity after the change, or the last known state if removed.
    pub fn item(&self) -> &T {
        match self {
            WatchEvent::Added(item) | WatchEvent::Modified(item) | WatchEvent::Removed(item) => {
                item
            }
        }
    }
}

/// Polling parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WatchOptions {
    pub poll_interval: Duration,
    /// Channel capacity; the task waits when the consumer falls behind.
    pub buffer: usize,
}

impl Default for WatchOptions {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(5),
            buffer: 100,
        }
    }
}

impl WatchOptions {
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn with_buffer(mut self, buffer: usize) -> Self {
        self.buffer = buffer;
        self
    }

    /// Reject a zero poll interval.
    pub fn validate(&self) -> SlurmResult<()> {
        if self.poll_interval.is_zero() {
            return Err(SlurmError::validation("watch poll interval must be positive"));
        }
        Ok(())
    }
}

/// Receiving end of a watch.
#[derive(Debug)]
pub struct EventStream<T> {
    rx: mpsc::Receiver<WatchEvent<T>>,
    ctx: Context,
}

impl<T> EventStream<T> {
    /// Next event, or `None` once the watch has ended.
    pub async fn recv(&mut self) -> Option<WatchEvent<T>> {
        if self.ctx.err().is_some() {
            return None;
        }
        tokio::select! {
            biased;
            _ = self.ctx.done() => None,
            event = self.rx.recv() => event,
        }
    }
}

/// Spawn the polling task for `entity`.
///
/// `poll` lists the filtered, unpaginated resource; `key` gives identity.
/// Preconditions are the caller's job: by the time this runs the adapter has
/// already passed its capability, context and client checks.
pub(crate) fn spawn<T, K, F, Fut>(
    ctx: &Context,
    options: WatchOptions,
    entity: Entity,
    key: fn(&T) -> K,
    poll: F,
) -> EventStream<T>
where
    T: Clone + PartialEq + Send + Sync + 'static,
    K: Eq + Hash + Send + 'static,
    F: Fn(Context) -> Fut + Send + 'static,
    Fut: Future<Output = SlurmResult<Vec<T>>> + Send,
{
    let (tx, rx) = mpsc::channel(options.buffer.max(1));
    let task_ctx = ctx.clone();

    tokio::spawn(async move {
        let ctx = task_ctx;
        let mut ticker = interval(options.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut previous: Option<Vec<T>> = None;

        loop {
            tokio::select! {
                biased;
                _ = ctx.done() => break,
                _ = ticker.tick() => {}
            }

            let current = match poll(ctx.clone()).await {
                Ok(items) => items,
                Err(err) if err.kind() == ErrorKind::ContextRequired => break,
                Err(err) => {
                    warn!(%entity, error = %err, "watch poll failed");
                    continue;
                }
            };

            if let Some(previous) = &previous {
                for event in diff(previous, &current, key) {
                    tokio::select! {
                        biased;
                        _ = ctx.done() => return,
                        sent = tx.send(event) => if sent.is_err() {
                            debug!(%entity, "watch consumer dropped");
                            return;
                        },
                    }
                }
            }
            previous = Some(current);
        }
        debug!(%entity, "watch stopped");
    });

    EventStream {
        rx,
        ctx: ctx.clone(),
    }
}

/// Events turning `previous` into `current`: additions and modifications in
/// `current` order, then removals in `previous` order.
fn diff<T, K>(previous: &[T], current: &[T], key: fn(&T) -> K) -> Vec<WatchEvent<T>>
where
    T: Clone + PartialEq,
    K: Eq + Hash,
{
    let before: FxHashMap<K, &T> = previous.iter().map(|item| (key(item), item)).collect();
    let after: FxHashSet<K> = current.iter().map(key).collect();

    let mut events = Vec::new();
    for item in current {
        match before.get(&key(item)) {
            None => events.push(WatchEvent::Added(item.clone())),
            Some(old) if *old != item => events.push(WatchEvent::Modified(item.clone())),
            Some(_) => {}
        }
    }
    for item in previous {
        if !after.contains(&key(item)) {
            events.push(WatchEvent::Removed(item.clone()));
        }
    }
    events
}
