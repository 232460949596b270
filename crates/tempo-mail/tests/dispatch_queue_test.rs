//! Integration tests for the mail dispatch queue.

use std::sync::{Arc, Mutex};

use tempo_mail::{
    DispatchConfig, DispatchError, DispatchQueue, MailJob, MailTransport, TransportError,
};
use tokio::sync::{Semaphore, mpsc};

/// Records every body it is asked to send. Bodies containing "fail"
/// are refused. When gated, each send first announces itself and then
/// waits for a permit.
#[derive(Clone)]
struct RecordingTransport {
    sent: Arc<Mutex<Vec<String>>>,
    gate: Option<Arc<Semaphore>>,
    started: Option<mpsc::UnboundedSender<String>>,
}

impl RecordingTransport {
    fn new() -> Self {
        Self {
            sent: Arc::default(),
            gate: None,
            started: None,
        }
    }

    fn gated() -> (Self, Arc<Semaphore>, mpsc::UnboundedReceiver<String>) {
        let gate = Arc::new(Semaphore::new(0));
        let (tx, rx) = mpsc::unbounded_channel();
        let transport = Self {
            gate: Some(gate.clone()),
            started: Some(tx),
            ..Self::new()
        };
        (transport, gate, rx)
    }

    fn sent(&self) -> Vec<String> {
        self.sent.lock().unwrap().clone()
    }
}

impl MailTransport for RecordingTransport {
    async fn send(&self, job: &MailJob) -> Result<(), TransportError> {
        if let Some(started) = &self.started {
            let _ = started.send(job.body.clone());
        }
        if let Some(gate) = &self.gate {
            gate.acquire()
                .await
                .map_err(|e| TransportError(e.to_string()))?
                .forget();
        }
        self.sent.lock().unwrap().push(job.body.clone());
        if job.body.contains("fail") {
            return Err(TransportError("refused".into()));
        }
        Ok(())
    }
}

fn job(body: &str) -> MailJob {
    MailJob::new("someone@example.com", body)
}

#[tokio::test]
async fn shutdown_delivers_everything_in_fifo_order() {
    let transport = RecordingTransport::new();
    let queue = DispatchQueue::start(DispatchConfig { capacity: 64 }, transport.clone()).unwrap();
    let handle = queue.handle();

    let bodies: Vec<String> = (0..50).map(|i| format!("mail-{i}")).collect();
    for body in &bodies {
        handle.enqueue(job(body)).unwrap();
    }

    let stats = queue.shutdown().await.unwrap();

    assert_eq!(stats.delivered, 50);
    assert_eq!(stats.dropped, 0);
    assert_eq!(transport.sent(), bodies);
}

#[tokio::test]
async fn failed_sends_are_dropped_not_retried() {
    let transport = RecordingTransport::new();
    let queue = DispatchQueue::start(DispatchConfig::default(), transport.clone()).unwrap();
    let handle = queue.handle();

    for body in ["one", "fail-two", "three"] {
        handle.enqueue(job(body)).unwrap();
    }

    let stats = queue.shutdown().await.unwrap();

    assert_eq!(stats.delivered, 2);
    assert_eq!(stats.dropped, 1);
    assert_eq!(stats.attempted(), 3);
    // Exactly one attempt per job, order preserved.
    assert_eq!(transport.sent(), vec!["one", "fail-two", "three"]);
}

#[tokio::test]
async fn full_queue_rejects_at_capacity_boundary() {
    let (transport, gate, mut started) = RecordingTransport::gated();
    let queue = DispatchQueue::start(DispatchConfig { capacity: 3 }, transport.clone()).unwrap();
    let handle = queue.handle();

    // Park the worker on the first job so the buffer is all we have.
    handle.enqueue(job("in-flight")).unwrap();
    assert_eq!(started.recv().await.as_deref(), Some("in-flight"));
    assert_eq!(handle.available(), 3);

    handle.enqueue(job("b0")).unwrap();
    handle.enqueue(job("b1")).unwrap();
    // Just under capacity: one slot left, still admitted.
    assert_eq!(handle.available(), 1);
    handle.enqueue(job("b2")).unwrap();
    // At capacity: rejected, nothing admitted.
    assert_eq!(handle.available(), 0);
    assert_eq!(handle.enqueue(job("overflow")), Err(DispatchError::QueueFull));

    gate.add_permits(16);
    let stats = queue.shutdown().await.unwrap();

    assert_eq!(stats.delivered, 4);
    assert_eq!(transport.sent(), vec!["in-flight", "b0", "b1", "b2"]);
}

#[tokio::test]
async fn enqueue_wait_blocks_until_space_frees() {
    let (transport, gate, mut started) = RecordingTransport::gated();
    let queue = DispatchQueue::start(DispatchConfig { capacity: 1 }, transport.clone()).unwrap();
    let handle = queue.handle();

    handle.enqueue(job("first")).unwrap();
    assert_eq!(started.recv().await.as_deref(), Some("first"));
    handle.enqueue(job("second")).unwrap();

    let waiter = {
        let handle = handle.clone();
        tokio::spawn(async move { handle.enqueue_wait(job("third")).await })
    };

    tokio::task::yield_now().await;
    assert!(!waiter.is_finished(), "enqueue_wait should block while full");

    // Let "first" complete; the worker takes "second" and frees a slot.
    gate.add_permits(1);
    waiter.await.unwrap().unwrap();

    gate.add_permits(16);
    queue.shutdown().await.unwrap();
    assert_eq!(transport.sent(), vec!["first", "second", "third"]);
}

#[tokio::test]
async fn outstanding_handles_do_not_block_shutdown() {
    let transport = RecordingTransport::new();
    let queue = DispatchQueue::start(DispatchConfig::default(), transport.clone()).unwrap();
    let kept = queue.handle();

    kept.enqueue(job("before")).unwrap();
    let stats = queue.shutdown().await.unwrap();

    assert_eq!(stats.delivered, 1);
    assert_eq!(kept.enqueue(job("after")), Err(DispatchError::Closed));
    assert_eq!(transport.sent(), vec!["before"]);
}

#[tokio::test]
async fn shutdown_closes_input_while_buffer_is_full() {
    let (transport, gate, mut started) = RecordingTransport::gated();
    let queue = DispatchQueue::start(DispatchConfig { capacity: 4 }, transport.clone()).unwrap();
    let handle = queue.handle();

    handle.enqueue(job("in-flight")).unwrap();
    assert_eq!(started.recv().await.as_deref(), Some("in-flight"));
    for body in ["b0", "b1", "b2", "b3"] {
        handle.enqueue(job(body)).unwrap();
    }

    let stopping = tokio::spawn(queue.shutdown());
    while !handle.is_closed() {
        tokio::task::yield_now().await;
    }
    assert_eq!(handle.enqueue(job("late")), Err(DispatchError::Closed));

    // The worker frees a slot; it must not be handed out again.
    gate.add_permits(1);
    assert_eq!(started.recv().await.as_deref(), Some("b0"));
    assert_eq!(handle.enqueue(job("later")), Err(DispatchError::Closed));
    assert_eq!(
        handle.enqueue_wait(job("later")).await,
        Err(DispatchError::Closed)
    );

    gate.add_permits(16);
    let stats = stopping.await.unwrap().unwrap();

    assert_eq!(stats.delivered, 5);
    assert_eq!(transport.sent(), vec!["in-flight", "b0", "b1", "b2", "b3"]);
}

#[tokio::test]
async fn shutdown_completes_under_sustained_load() {
    let transport = RecordingTransport::new();
    let queue = DispatchQueue::start(DispatchConfig { capacity: 2 }, transport.clone()).unwrap();

    let producer = {
        let handle = queue.handle();
        tokio::spawn(async move {
            let mut admitted = 0u64;
            while handle.enqueue_wait(job("load")).await.is_ok() {
                admitted += 1;
            }
            admitted
        })
    };

    for _ in 0..10 {
        tokio::task::yield_now().await;
    }
    let stats = queue.shutdown().await.unwrap();
    let admitted = producer.await.unwrap();

    // Everything admitted before the close is delivered, nothing after.
    assert_eq!(stats.delivered, admitted);
    assert_eq!(transport.sent().len() as u64, admitted);
}
