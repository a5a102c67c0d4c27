use std::future::Future;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::debug;

/// Single-slot scheduler for the assistant's "typing" delay.
///
/// At most one reply is ever pending per session. Scheduling a new reply
/// aborts the pending one, so two assistant turns can never interleave out
/// of order; a caller that wants queueing instead simply awaits
/// [`ReplyScheduler::join_pending`] before reading the next input.
#[derive(Default)]
pub struct ReplyScheduler {
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl ReplyScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn schedule<F>(&self, delay: Duration, deliver: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let mut slot = self.pending.lock().await;
        if let Some(previous) = slot.take() {
            if !previous.is_finished() {
                debug!(
                    event_name = "scheduler.reply_superseded",
                    "pending reply cancelled by a newer turn"
                );
            }
            previous.abort();
        }

        *slot = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            deliver.await;
        }));
    }

    /// Waits for the pending reply, if any, to be delivered. Abort of a
    /// superseded task is not an error from the caller's point of view.
    pub async fn join_pending(&self) {
        let handle = self.pending.lock().await.take();
        if let Some(handle) = handle {
            let _ = handle.await;
        }
    }

    /// Drops any pending reply without delivering it.
    pub async fn cancel_pending(&self) {
        if let Some(handle) = self.pending.lock().await.take() {
            handle.abort();
        }
    }
}
