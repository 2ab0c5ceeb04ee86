//! Worker thread that feeds metadata batches to a node.
//!
//! Batches arrive over a bounded crossbeam channel. The loop polls a shared
//! running flag between receives, exits when every sender is gone, and stops
//! on the first fatal error.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{RecvTimeoutError, Sender, bounded};

use super::{CycleOutcome, GridPublisher, OccupancyGridNode};
use crate::core::SubmapList;
use crate::error::{ChitraError, Result};
use crate::submap::SubmapFetcher;

const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Per-outcome batch totals for one thread lifetime.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ThreadSummary {
    pub batches: usize,
    pub published: usize,
    pub skipped_no_consumer: usize,
    pub nothing_to_render: usize,
}

impl ThreadSummary {
    fn record(&mut self, outcome: &CycleOutcome) {
        self.batches += 1;
        match outcome {
            CycleOutcome::NoConsumer => self.skipped_no_consumer += 1,
            CycleOutcome::NothingToRender(_) => self.nothing_to_render += 1,
            CycleOutcome::Published { .. } => self.published += 1,
        }
    }
}

/// Handle to a running node thread.
pub struct NodeThread {
    handle: JoinHandle<Result<ThreadSummary>>,
    sender: Sender<SubmapList>,
    running: Arc<AtomicBool>,
}

impl NodeThread {
    /// Spawn a thread that runs every received batch through `node`.
    ///
    /// `capacity` bounds the number of queued batches; `submit` blocks while
    /// the queue is full.
    pub fn spawn<F, P>(node: Arc<OccupancyGridNode<F, P>>, capacity: usize) -> Result<Self>
    where
        F: SubmapFetcher + Send + 'static,
        P: GridPublisher + Send + 'static,
    {
        let (sender, receiver) = bounded(capacity.max(1));
        let running = Arc::new(AtomicBool::new(true));
        let flag = Arc::clone(&running);

        let handle = thread::Builder::new()
            .name("occupancy-grid".into())
            .spawn(move || {
                tracing::info!("Node thread started");
                let mut summary = ThreadSummary::default();
                loop {
                    if !flag.load(Ordering::Relaxed) {
                        tracing::info!("Node thread shutting down");
                        break;
                    }

                    match receiver.recv_timeout(POLL_INTERVAL) {
                        Ok(list) => match node.handle_submap_list(&list) {
                            Ok(outcome) => summary.record(&outcome),
                            Err(e) => {
                                tracing::error!("Fatal error handling submap list: {}", e);
                                flag.store(false, Ordering::Relaxed);
                                return Err(e);
                            }
                        },
                        Err(RecvTimeoutError::Timeout) => continue,
                        Err(RecvTimeoutError::Disconnected) => {
                            tracing::debug!("Submap list channel closed, node thread exiting");
                            break;
                        }
                    }
                }
                tracing::info!(
                    "Node thread handled {} batches ({} published)",
                    summary.batches,
                    summary.published
                );
                Ok(summary)
            })?;

        Ok(Self {
            handle,
            sender,
            running,
        })
    }

    /// Queue a batch. Fails once the thread has stopped.
    pub fn submit(&self, list: SubmapList) -> Result<()> {
        if !self.is_running() {
            return Err(ChitraError::Thread("node thread stopped".into()));
        }
        self.sender
            .send(list)
            .map_err(|_| ChitraError::Thread("node thread stopped".into()))
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }

    /// Ask the thread to stop after the batch in progress. Queued batches are dropped.
    pub fn shutdown(&self) {
        self.running.store(false, Ordering::Relaxed);
    }

    /// Close the queue, let the thread drain it, and wait for it to exit.
    pub fn join(self) -> Result<ThreadSummary> {
        let Self { handle, sender, .. } = self;
        drop(sender);
        handle
            .join()
            .map_err(|_| ChitraError::Thread("node thread panicked".into()))?
    }
}
