//! Background lane-assignment offload
//!
//! Lane assignment is the most expensive step of the frame pipeline, so
//! above a size threshold it runs on a dedicated worker thread instead of
//! the caller's. Commands are received via a bounded channel (the worker
//! pool has size one and at most one job is in flight) and results come back
//! through oneshot reply channels.
//!
//! Every job carries the revision it was computed for; a reply whose
//! revision no longer matches the coordinator's current one is discarded so
//! a superseded computation can never overwrite a newer layout. When no
//! worker is available (spawn failure, terminated, or never initialized) the
//! coordinator computes synchronously with an identical contract; only
//! latency differs.

use crate::lane::{assign_lanes, LaneAssignment};
use crossbeam::channel::{Receiver, Sender};
use std::thread;
use std::time::Instant;
use strata_core::Event;
use thiserror::Error;

/// Default event count above which lane assignment is shipped to the worker
pub const DEFAULT_WORKER_THRESHOLD: usize = 2000;

/// Errors that can occur managing the layout worker
#[derive(Error, Debug)]
pub enum ServiceError {
    /// The worker thread could not be spawned
    #[error("Failed to spawn layout worker thread: {0}")]
    Spawn(String),
}

/// Handle to a running service: a command sender plus the thread handle
pub struct ServiceHandle<Cmd> {
    /// Channel for sending commands to the service
    pub command_tx: Sender<Cmd>,
    /// Thread handle for the service
    pub thread_handle: Option<thread::JoinHandle<()>>,
}

impl<Cmd> ServiceHandle<Cmd> {
    /// Send a command to the service
    pub fn send(&self, cmd: Cmd) -> Result<(), crossbeam::channel::SendError<Cmd>> {
        self.command_tx.send(cmd)
    }

    /// Check if the service is still running
    pub fn is_running(&self) -> bool {
        self.thread_handle
            .as_ref()
            .map(|h| !h.is_finished())
            .unwrap_or(false)
    }
}

/// Commands sent to the layout worker
pub enum LayoutCommand {
    /// Assign lanes for an owned batch of events
    Assign {
        /// Ownership of the batch transfers to the worker; nothing is shared
        events: Vec<Event>,
        /// Revision this job was computed for
        revision: u64,
        reply: tokio::sync::oneshot::Sender<AssignReply>,
    },

    /// Shut down the worker
    Shutdown,
}

/// Worker reply for one assignment job
pub struct AssignReply {
    /// Echo of the job's revision, checked by the coordinator
    pub revision: u64,
    /// The computed lane placement
    pub assignment: LaneAssignment,
    /// Wall-clock cost of the assignment in milliseconds
    pub duration_ms: f64,
}

/// Result of one lane computation, from either path
#[derive(Debug, Clone, PartialEq)]
pub struct LaneComputation {
    /// The computed lane placement
    pub assignment: LaneAssignment,
    /// Wall-clock cost in milliseconds
    pub duration_ms: f64,
}

/// The worker: receives batches, assigns lanes, replies
pub struct LayoutService {
    command_rx: Receiver<LayoutCommand>,
}

impl LayoutService {
    /// Spawn the layout worker in a background thread.
    ///
    /// The command channel is bounded at one entry: a single outstanding job
    /// at a time, matching the one-caller one-worker model.
    pub fn spawn() -> Result<ServiceHandle<LayoutCommand>, ServiceError> {
        let (command_tx, command_rx) = crossbeam::channel::bounded(1);

        let service = LayoutService { command_rx };

        let handle = thread::Builder::new()
            .name("layout-worker".into())
            .spawn(move || service.run())
            .map_err(|e| ServiceError::Spawn(e.to_string()))?;

        Ok(ServiceHandle {
            command_tx,
            thread_handle: Some(handle),
        })
    }

    /// Main service loop
    fn run(self) {
        log::info!("layout worker started");

        while let Ok(cmd) = self.command_rx.recv() {
            match cmd {
                LayoutCommand::Shutdown => {
                    log::info!("layout worker shutting down");
                    break;
                }
                LayoutCommand::Assign {
                    events,
                    revision,
                    reply,
                } => {
                    let started = Instant::now();
                    let assignment = assign_lanes(events.iter());
                    // The caller may have abandoned a stale job; ignore send failure
                    let _ = reply.send(AssignReply {
                        revision,
                        assignment,
                        duration_ms: started.elapsed().as_secs_f64() * 1000.0,
                    });
                }
            }
        }

        log::info!("layout worker stopped");
    }
}

/// Routes lane assignment to the worker or the synchronous path.
///
/// Callers see one contract either way; `is_worker_ready` exposes which path
/// is active for diagnostics.
pub struct LayoutCoordinator {
    worker: Option<ServiceHandle<LayoutCommand>>,
    threshold: usize,
    revision: u64,
}

impl Default for LayoutCoordinator {
    fn default() -> Self {
        Self::new(DEFAULT_WORKER_THRESHOLD)
    }
}

impl LayoutCoordinator {
    /// Create a coordinator with the given offload threshold. No worker is
    /// started until [`init_worker`](Self::init_worker).
    pub fn new(threshold: usize) -> Self {
        Self {
            worker: None,
            threshold,
            revision: 0,
        }
    }

    /// Start the background worker. Returns whether a worker is now live;
    /// failure leaves the coordinator on the synchronous path.
    pub fn init_worker(&mut self) -> bool {
        if self.is_worker_ready() {
            return true;
        }
        match LayoutService::spawn() {
            Ok(handle) => {
                self.worker = Some(handle);
                true
            }
            Err(e) => {
                log::warn!("layout worker unavailable, staying synchronous: {e}");
                false
            }
        }
    }

    /// Stop the worker and join its thread. Subsequent computations run
    /// synchronously until the worker is re-initialized.
    pub fn terminate_worker(&mut self) {
        if let Some(handle) = self.worker.take() {
            let _ = handle.send(LayoutCommand::Shutdown);
            if let Some(thread_handle) = handle.thread_handle {
                let _ = thread_handle.join();
            }
        }
    }

    /// Whether a live worker will take the next oversized batch
    pub fn is_worker_ready(&self) -> bool {
        self.worker
            .as_ref()
            .map(ServiceHandle::is_running)
            .unwrap_or(false)
    }

    /// Event count above which batches are shipped to the worker
    pub fn worker_threshold(&self) -> usize {
        self.threshold
    }

    /// Assign lanes for a batch of events.
    ///
    /// Batches under the threshold, or any batch while no worker is live,
    /// are computed on the calling thread.
    pub fn calculate_layout(&mut self, events: &[Event]) -> LaneComputation {
        self.revision += 1;

        if events.len() >= self.threshold && self.is_worker_ready() {
            if let Some(result) = self.dispatch(events) {
                return result;
            }
            log::warn!("layout worker failed, falling back to synchronous assignment");
            self.terminate_worker();
        }

        let started = Instant::now();
        let assignment = assign_lanes(events.iter());
        LaneComputation {
            assignment,
            duration_ms: started.elapsed().as_secs_f64() * 1000.0,
        }
    }

    fn dispatch(&self, events: &[Event]) -> Option<LaneComputation> {
        let handle = self.worker.as_ref()?;
        let (reply_tx, reply_rx) = tokio::sync::oneshot::channel();

        handle
            .send(LayoutCommand::Assign {
                events: events.to_vec(),
                revision: self.revision,
                reply: reply_tx,
            })
            .ok()?;

        let reply = reply_rx.blocking_recv().ok()?;
        if reply.revision != self.revision {
            log::debug!(
                "discarding stale layout result (revision {} != {})",
                reply.revision,
                self.revision
            );
            return None;
        }

        Some(LaneComputation {
            assignment: reply.assignment,
            duration_ms: reply.duration_ms,
        })
    }
}

impl Drop for LayoutCoordinator {
    fn drop(&mut self) {
        self.terminate_worker();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_core::{Priority, TimeSecs};

    fn event(id: &str, start: TimeSecs, end: Option<TimeSecs>) -> Event {
        Event {
            id: id.to_string(),
            start,
            end,
            label: id.to_string(),
            category: None,
            priority: Priority::default(),
            tags: Vec::new(),
        }
    }

    fn batch(n: usize) -> Vec<Event> {
        (0..n)
            .map(|i| {
                let start = (i as TimeSecs) * 10;
                event(&format!("ev-{i:04}"), start, Some(start + 25))
            })
            .collect()
    }

    #[test]
    fn test_synchronous_below_threshold() {
        let mut coordinator = LayoutCoordinator::new(1000);
        let events = batch(10);

        let result = coordinator.calculate_layout(&events);
        assert_eq!(result.assignment, assign_lanes(events.iter()));
        assert!(!coordinator.is_worker_ready());
    }

    #[test]
    fn test_worker_path_matches_synchronous() {
        let mut coordinator = LayoutCoordinator::new(4);
        assert!(coordinator.init_worker());
        assert!(coordinator.is_worker_ready());

        let events = batch(50);
        let result = coordinator.calculate_layout(&events);
        assert_eq!(result.assignment, assign_lanes(events.iter()));
        assert!(result.duration_ms >= 0.0);

        coordinator.terminate_worker();
        assert!(!coordinator.is_worker_ready());
    }

    #[test]
    fn test_fallback_without_worker() {
        // Above threshold but no worker was ever initialized
        let mut coordinator = LayoutCoordinator::new(4);
        let events = batch(50);

        let result = coordinator.calculate_layout(&events);
        assert_eq!(result.assignment, assign_lanes(events.iter()));
    }

    #[test]
    fn test_terminated_worker_falls_back() {
        let mut coordinator = LayoutCoordinator::new(4);
        assert!(coordinator.init_worker());
        coordinator.terminate_worker();

        let events = batch(50);
        let result = coordinator.calculate_layout(&events);
        assert_eq!(result.assignment, assign_lanes(events.iter()));
    }

    #[test]
    fn test_init_worker_is_idempotent() {
        let mut coordinator = LayoutCoordinator::new(4);
        assert!(coordinator.init_worker());
        assert!(coordinator.init_worker());
        coordinator.terminate_worker();
    }

    #[test]
    fn test_threshold_accessor() {
        let coordinator = LayoutCoordinator::default();
        assert_eq!(coordinator.worker_threshold(), DEFAULT_WORKER_THRESHOLD);
        assert_eq!(LayoutCoordinator::new(64).worker_threshold(), 64);
    }

    #[test]
    fn test_successive_revisions_stay_fresh() {
        let mut coordinator = LayoutCoordinator::new(4);
        assert!(coordinator.init_worker());

        // Each call supersedes the last; every reply must match its own job
        for n in [10usize, 20, 30] {
            let events = batch(n);
            let result = coordinator.calculate_layout(&events);
            assert_eq!(result.assignment, assign_lanes(events.iter()));
        }
    }
}
