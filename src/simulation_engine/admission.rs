use std::collections::VecDeque;
use std::sync::Mutex;

use thiserror::Error;
use tokio::sync::oneshot;

/// Internal-consistency failures of the admission protocol. Neither variant
/// is expected during normal operation; both indicate a broken invariant and
/// are not recovered from at call sites.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AdmissionError {
    #[error("attempted to release the head of an empty admission queue")]
    EmptyQueue,
    #[error("entry grant for vehicle {0} could not be delivered")]
    GrantDropped(u64),
}

/// One vehicle's pending claim on an intersection.
///
/// The grant signal is a one-shot channel: sending consumes the sender and
/// awaiting consumes the receiver, so a grant can neither be resolved nor
/// waited on twice.
pub struct EntryRequest {
    vehicle_id: u64,
    grant: oneshot::Sender<()>,
}

impl EntryRequest {
    /// Creates a request together with the receiver the vehicle suspends on.
    pub fn new(vehicle_id: u64) -> (Self, oneshot::Receiver<()>) {
        let (grant, granted) = oneshot::channel();
        (Self { vehicle_id, grant }, granted)
    }

    pub fn vehicle_id(&self) -> u64 {
        self.vehicle_id
    }
}

/// FIFO queue of pending entry requests for one intersection.
///
/// Many vehicle tasks enqueue concurrently; only the owning intersection's
/// admission loop dequeues. The internal mutex covers both sides.
#[derive(Default)]
pub struct AdmissionQueue {
    waiting: Mutex<VecDeque<EntryRequest>>,
}

impl AdmissionQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a request at the tail. Arrival order is captured here, under
    /// the queue lock.
    pub fn enqueue(&self, request: EntryRequest) {
        self.waiting.lock().unwrap().push_back(request);
    }

    /// Number of pending requests. A cheap poll, not a synchronization
    /// primitive: a racing dequeue may make the answer stale immediately.
    pub fn len(&self) -> usize {
        self.waiting.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Removes the oldest request and resolves its grant signal, returning
    /// the granted vehicle's id.
    pub fn release_head(&self) -> Result<u64, AdmissionError> {
        let request = self
            .waiting
            .lock()
            .unwrap()
            .pop_front()
            .ok_or(AdmissionError::EmptyQueue)?;
        let vehicle_id = request.vehicle_id;
        request
            .grant
            .send(())
            .map_err(|_| AdmissionError::GrantDropped(vehicle_id))?;
        Ok(vehicle_id)
    }
}
