//! Bounded FIFO of [`MailJob`]s drained by exactly one worker task.
//!
//! # Backpressure
//!
//! [`MailQueue::enqueue`] never waits: when `capacity` jobs are already
//! buffered it returns [`DispatchError::QueueFull`] and the job is not
//! admitted. The job currently being sent does not count against
//! capacity. Callers that prefer to wait for space can use
//! [`MailQueue::enqueue_wait`].
//!
//! # Shutdown
//!
//! [`DispatchQueue::shutdown`] closes the channel to new jobs, lets the
//! worker send everything already admitted, and returns once the worker
//! has exited. Outstanding [`MailQueue`] clones do not keep the worker
//! alive; their later `enqueue` calls fail with
//! [`DispatchError::Closed`].

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::DispatchError;
use crate::job::MailJob;
use crate::transport::MailTransport;

/// Queue configuration.
#[derive(Debug, Clone)]
pub struct DispatchConfig {
    /// Maximum number of buffered jobs (default: 200).
    pub capacity: usize,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self { capacity: 200 }
    }
}

/// What the worker did before it exited.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchStats {
    pub delivered: u64,
    pub dropped: u64,
}

impl DispatchStats {
    pub fn attempted(&self) -> u64 {
        self.delivered + self.dropped
    }
}

/// Producer-side handle. Cheap to clone; hand one to every component
/// that submits mail.
#[derive(Debug, Clone)]
pub struct MailQueue {
    tx: mpsc::Sender<MailJob>,
    /// Flips to `true` once shutdown is requested.
    stopping: watch::Receiver<bool>,
}

impl MailQueue {
    /// Admit `job` if there is room, without waiting.
    pub fn enqueue(&self, job: MailJob) -> Result<Uuid, DispatchError> {
        if self.is_stopping() {
            return Err(DispatchError::Closed);
        }
        let id = job.id;
        match self.tx.try_send(job) {
            Ok(()) => {
                debug!(job_id = %id, "Mail job queued");
                Ok(id)
            }
            Err(mpsc::error::TrySendError::Full(_)) => {
                warn!(job_id = %id, "Mail queue full, job rejected");
                Err(DispatchError::QueueFull)
            }
            Err(mpsc::error::TrySendError::Closed(_)) => Err(DispatchError::Closed),
        }
    }

    /// Admit `job`, waiting for space if the queue is full.
    pub async fn enqueue_wait(&self, job: MailJob) -> Result<Uuid, DispatchError> {
        if self.is_stopping() {
            return Err(DispatchError::Closed);
        }
        let id = job.id;
        self.tx.send(job).await.map_err(|_| DispatchError::Closed)?;
        debug!(job_id = %id, "Mail job queued");
        Ok(id)
    }

    /// Free slots right now.
    pub fn available(&self) -> usize {
        self.tx.capacity()
    }

    pub fn capacity(&self) -> usize {
        self.tx.max_capacity()
    }

    /// `true` once shutdown has been requested, even while the worker is
    /// still draining.
    pub fn is_closed(&self) -> bool {
        self.is_stopping() || self.tx.is_closed()
    }

    fn is_stopping(&self) -> bool {
        *self.stopping.borrow()
    }
}

/// Owner of the queue and its worker. Only the owner can shut down.
#[derive(Debug)]
pub struct DispatchQueue {
    queue: MailQueue,
    stop: watch::Sender<bool>,
    worker: JoinHandle<DispatchStats>,
}

impl DispatchQueue {
    /// Create the channel and spawn the worker on the current Tokio
    /// runtime.
    pub fn start<T: MailTransport>(
        config: DispatchConfig,
        transport: T,
    ) -> Result<Self, DispatchError> {
        if config.capacity == 0 {
            return Err(DispatchError::InvalidCapacity);
        }

        let (tx, rx) = mpsc::channel(config.capacity);
        let (stop, stopping) = watch::channel(false);
        let worker = tokio::spawn(run_worker(rx, stopping.clone(), transport));

        info!(capacity = config.capacity, "Mail dispatch worker started");

        Ok(Self {
            queue: MailQueue { tx, stopping },
            stop,
            worker,
        })
    }

    /// A new producer handle.
    pub fn handle(&self) -> MailQueue {
        self.queue.clone()
    }

    /// Stop admitting jobs, drain what is queued, and wait for the
    /// worker to finish.
    pub async fn shutdown(self) -> Result<DispatchStats, DispatchError> {
        info!(
            pending = self.queue.capacity() - self.queue.available(),
            "Mail dispatch shutting down"
        );
        // Producers see the flag at once; the worker closes the channel
        // the next time it is between jobs.
        self.stop.send_replace(true);
        drop(self.queue);

        let stats = self
            .worker
            .await
            .map_err(|e| DispatchError::Worker(e.to_string()))?;

        info!(
            delivered = stats.delivered,
            dropped = stats.dropped,
            "Mail dispatch stopped"
        );
        Ok(stats)
    }
}

async fn run_worker<T: MailTransport>(
    mut rx: mpsc::Receiver<MailJob>,
    mut stopping: watch::Receiver<bool>,
    transport: T,
) -> DispatchStats {
    let mut stats = DispatchStats::default();

    loop {
        tokio::select! {
            // Stop wins over a non-empty buffer, so a busy queue still
            // closes its input promptly.
            biased;
            // Fires on an explicit stop and when the owner is dropped.
            _ = stopping.changed() => break,
            job = rx.recv() => match job {
                Some(job) => deliver(&transport, job, &mut stats).await,
                None => return stats,
            },
        }
    }

    rx.close();
    while let Some(job) = rx.recv().await {
        deliver(&transport, job, &mut stats).await;
    }

    stats
}

async fn deliver<T: MailTransport>(transport: &T, job: MailJob, stats: &mut DispatchStats) {
    match transport.send(&job).await {
        Ok(()) => {
            stats.delivered += 1;
            info!(job_id = %job.id, "Mail delivered");
        }
        Err(e) => {
            // No retry.
            stats.dropped += 1;
            warn!(job_id = %job.id, error = %e, "Mail dropped");
        }
    }
}
