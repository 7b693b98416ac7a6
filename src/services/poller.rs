//! Cancellable fixed-interval polling tasks.
//!
//! Every poll loop in the client is one of these: a background task ticking
//! at a fixed period until its callback breaks or the handle cancels it.
//! There is no backoff and no retry cap; the callback decides what a failed
//! tick means.

use std::{future::Future, ops::ControlFlow, time::Duration};

use tokio::{
    sync::watch,
    task::JoinHandle,
    time::{self, MissedTickBehavior},
};

/// Handle to a background poll loop. Dropping the handle cancels the task.
#[derive(Debug)]
pub struct PollerHandle {
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl PollerHandle {
    /// Stop the loop. Idempotent; the task exits before its next tick.
    pub fn cancel(&self) {
        let _ = self.shutdown.send(true);
    }

    /// Cancel and wait for the task to finish.
    pub async fn shutdown(self) {
        self.cancel();
        let _ = self.task.await;
    }
}

/// Spawn a task running `tick` every `period` until the callback breaks or
/// the handle is cancelled or dropped. The first tick fires immediately.
pub fn spawn<F, Fut>(period: Duration, mut tick: F) -> PollerHandle
where
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = ControlFlow<()>> + Send,
{
    let (shutdown, mut watcher) = watch::channel(false);

    let task = tokio::spawn(async move {
        let mut interval = time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    if tick().await.is_break() {
                        break;
                    }
                }
                changed = watcher.changed() => {
                    if changed.is_err() || *watcher.borrow() {
                        break;
                    }
                }
            }
        }
    });

    PollerHandle { shutdown, task }
}
