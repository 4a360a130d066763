use serde_json::Value;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::time::Instant;

use super::onchain::ReadOnlyTransport;
use crate::{
    constants::QUEUE_DEPTH_WARN,
    error::{AppError, Result},
};

struct Job {
    function: String,
    args: Vec<String>,
    reply: oneshot::Sender<Result<Value>>,
}

/// FIFO queue in front of a read-only transport. A single worker runs one
/// call at a time; each call starts at least `delay` after the previous one
/// completed. The queue is unbounded.
#[derive(Clone)]
pub struct RequestQueue {
    sender: mpsc::UnboundedSender<Job>,
    pending: Arc<AtomicUsize>,
}

impl RequestQueue {
    /// Spawns the worker task, so this must run inside a tokio runtime.
    pub fn new(transport: Arc<dyn ReadOnlyTransport>, delay: Duration) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        let pending = Arc::new(AtomicUsize::new(0));
        tokio::spawn(run_worker(transport, receiver, delay, pending.clone()));
        Self { sender, pending }
    }

    /// Calls enqueued or in flight.
    pub fn pending(&self) -> usize {
        self.pending.load(Ordering::SeqCst)
    }

    pub async fn call(&self, function: &str, args: Vec<String>) -> Result<Value> {
        let (reply, response) = oneshot::channel();
        let depth = self.pending.fetch_add(1, Ordering::SeqCst) + 1;
        if depth >= QUEUE_DEPTH_WARN {
            tracing::warn!("Read-only request queue depth {} (enqueue {})", depth, function);
        } else {
            tracing::debug!("Read-only request queue depth {} (enqueue {})", depth, function);
        }

        let job = Job {
            function: function.to_string(),
            args,
            reply,
        };
        if self.sender.send(job).is_err() {
            self.pending.fetch_sub(1, Ordering::SeqCst);
            return Err(AppError::Internal("Request queue worker stopped".to_string()));
        }

        response
            .await
            .map_err(|_| AppError::Internal("Request queue dropped the call".to_string()))?
    }
}

async fn run_worker(
    transport: Arc<dyn ReadOnlyTransport>,
    mut receiver: mpsc::UnboundedReceiver<Job>,
    delay: Duration,
    pending: Arc<AtomicUsize>,
) {
    let mut last_finished: Option<Instant> = None;

    while let Some(job) = receiver.recv().await {
        if let Some(finished) = last_finished {
            tokio::time::sleep_until(finished + delay).await;
        }

        let result = transport.call_read_only(&job.function, &job.args).await;
        last_finished = Some(Instant::now());
        pending.fetch_sub(1, Ordering::SeqCst);

        if let Err(err) = &result {
            tracing::debug!("Read-only call {} failed: {}", job.function, err);
        }
        if job.reply.send(result).is_err() {
            tracing::debug!("Caller of {} went away before the reply", job.function);
        }
    }

    tracing::debug!("Read-only request queue worker stopped");
}
