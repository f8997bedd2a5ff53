//! Ordered delivery of local edits to the backend
//!
//! Every mirror call goes through a single worker task, so the server sees
//! edits in the order they were made locally. A failed call is logged and the
//! queue moves on; local state is never reverted.

use std::future::Future;

use futures::future::BoxFuture;
use tokio::sync::{mpsc, oneshot};

use crate::errors::GatewayError;

/// Resolves once the queued call has run, whatever its outcome
pub type MirrorHandle = oneshot::Receiver<()>;

struct MirrorJob {
    operation: &'static str,
    call: BoxFuture<'static, Result<(), GatewayError>>,
    done: oneshot::Sender<()>,
}

#[derive(Clone)]
pub struct MirrorQueue {
    jobs: mpsc::UnboundedSender<MirrorJob>,
}

impl MirrorQueue {
    /// Spawns the worker on the current tokio runtime. It stops once every
    /// queue handle is dropped.
    pub fn start() -> Self {
        let (jobs, mut pending) = mpsc::unbounded_channel::<MirrorJob>();
        tokio::spawn(async move {
            while let Some(job) = pending.recv().await {
                match job.call.await {
                    Ok(()) => tracing::debug!(operation = job.operation, "Remote mirror applied"),
                    Err(e) => tracing::warn!(
                        operation = job.operation,
                        error = %e,
                        "Remote mirror failed, keeping local state"
                    ),
                }
                let _ = job.done.send(());
            }
            tracing::debug!("Mirror worker stopped");
        });
        Self { jobs }
    }

    /// Queues `call` behind every call pushed before it
    pub fn push<F>(&self, operation: &'static str, call: F) -> MirrorHandle
    where
        F: Future<Output = Result<(), GatewayError>> + Send + 'static,
    {
        let (done, handle) = oneshot::channel();
        let job = MirrorJob {
            operation,
            call: Box::pin(call),
            done,
        };
        if self.jobs.send(job).is_err() {
            tracing::warn!(operation, "Mirror worker is gone, dropping remote call");
        }
        handle
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn calls_run_in_push_order() {
        let queue = MirrorQueue::start();
        let order = Arc::new(Mutex::new(Vec::new()));

        let slow = order.clone();
        queue.push("slow", async move {
            tokio::time::sleep(Duration::from_millis(30)).await;
            slow.lock().expect("order lock").push("slow");
            Ok(())
        });
        let fast = order.clone();
        let last = queue.push("fast", async move {
            fast.lock().expect("order lock").push("fast");
            Ok(())
        });

        last.await.expect("worker ran the call");
        assert_eq!(*order.lock().expect("order lock"), ["slow", "fast"]);
    }

    #[tokio::test]
    async fn failure_does_not_stall_the_queue() {
        let queue = MirrorQueue::start();
        queue.push("broken", async { Err(GatewayError::Transport("refused".into())) });
        let after = queue.push("after", async { Ok(()) });
        after.await.expect("queue kept draining");
    }
}
