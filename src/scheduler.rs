//! Delayed-update scheduler.
//!
//! A delay queue drained by a single scheduling loop: pending entries sit
//! in a binary heap keyed by fire time, and the loop sleeps until the
//! earliest deadline. Each due task is spawned as its own unit of work, so
//! neither callers nor the loop block on task execution. Entries scheduled
//! with increasing delays fire in schedule order.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::future::Future;
use std::sync::atomic::{self, AtomicBool};
use std::sync::Arc;
use std::time::Duration;

use futures::future::BoxFuture;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::debug;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SchedulerError {
    #[error("scheduler is shut down")]
    Closed,
}

enum Command {
    Schedule {
        fire_at: Instant,
        task: BoxFuture<'static, ()>,
    },
    Shutdown,
}

struct Entry {
    fire_at: Instant,
    seq: u64,
    task: BoxFuture<'static, ()>,
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.fire_at == other.fire_at && self.seq == other.seq
    }
}

impl Eq for Entry {}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Entry {
    // Reversed so the earliest deadline sits on top of the max-heap;
    // ties break in schedule order.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .fire_at
            .cmp(&self.fire_at)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Handle to the scheduling loop.
///
/// Cheap to share via `Arc`. After `shutdown`, new scheduling requests are
/// rejected; entries not yet due are abandoned, already-spawned tasks run
/// to completion.
pub struct UpdateScheduler {
    commands: mpsc::UnboundedSender<Command>,
    closed: Arc<AtomicBool>,
}

impl UpdateScheduler {
    /// Create a scheduler and spawn its loop on the current runtime.
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(run(rx));
        Self {
            commands: tx,
            closed: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Register `task` to run once `delay` has elapsed, without blocking
    /// the caller. No wall-clock guarantee beyond "no earlier than `delay`".
    pub fn schedule_after<F>(&self, delay: Duration, task: F) -> Result<(), SchedulerError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        if self.closed.load(atomic::Ordering::Acquire) {
            return Err(SchedulerError::Closed);
        }
        let fire_at = Instant::now() + delay;
        self.commands
            .send(Command::Schedule {
                fire_at,
                task: Box::pin(task),
            })
            .map_err(|_| SchedulerError::Closed)
    }

    /// Stop accepting new work and end the scheduling loop.
    pub fn shutdown(&self) {
        self.closed.store(true, atomic::Ordering::Release);
        let _ = self.commands.send(Command::Shutdown);
    }
}

impl Default for UpdateScheduler {
    fn default() -> Self {
        Self::new()
    }
}

async fn run(mut commands: mpsc::UnboundedReceiver<Command>) {
    let mut pending: BinaryHeap<Entry> = BinaryHeap::new();
    let mut next_seq: u64 = 0;

    loop {
        let wakeup = pending.peek().map(|entry| entry.fire_at);
        tokio::select! {
            command = commands.recv() => match command {
                Some(Command::Schedule { fire_at, task }) => {
                    pending.push(Entry { fire_at, seq: next_seq, task });
                    next_seq += 1;
                }
                Some(Command::Shutdown) | None => break,
            },
            _ = sleep_until_next(wakeup), if wakeup.is_some() => {
                let now = Instant::now();
                while pending.peek().is_some_and(|entry| entry.fire_at <= now) {
                    if let Some(entry) = pending.pop() {
                        tokio::spawn(entry.task);
                    }
                }
            }
        }
    }

    if !pending.is_empty() {
        debug!(abandoned = pending.len(), "scheduler stopped with pending tasks");
    }
}

async fn sleep_until_next(wakeup: Option<Instant>) {
    match wakeup {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}
