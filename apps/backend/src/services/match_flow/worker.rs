//! Deadline worker: drains fired deadline keys and applies them one by one.

use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tracing::{debug, info};

use super::deadlines::DeadlineKey;
use super::MatchOrchestrator;

pub type DeadlineSender = mpsc::UnboundedSender<DeadlineKey>;
pub type DeadlineReceiver = mpsc::UnboundedReceiver<DeadlineKey>;

/// Unbounded: deadline callbacks are synchronous and must never drop a key.
pub fn deadline_channel() -> (DeadlineSender, DeadlineReceiver) {
    mpsc::unbounded_channel()
}

pub struct DeadlineWorker {
    orchestrator: Arc<MatchOrchestrator>,
    rx: DeadlineReceiver,
    shutdown_rx: watch::Receiver<bool>,
}

impl DeadlineWorker {
    pub fn new(
        orchestrator: Arc<MatchOrchestrator>,
        rx: DeadlineReceiver,
        shutdown_rx: watch::Receiver<bool>,
    ) -> Self {
        Self {
            orchestrator,
            rx,
            shutdown_rx,
        }
    }

    /// Runs until shutdown is signalled or every sender is gone.
    pub async fn run(mut self) {
        info!("Deadline worker started");
        loop {
            tokio::select! {
                biased;
                _ = self.shutdown_rx.changed() => {
                    if *self.shutdown_rx.borrow() {
                        info!("Deadline worker received shutdown signal");
                        break;
                    }
                }
                Some(key) = self.rx.recv() => {
                    apply(&self.orchestrator, key).await;
                }
                else => {
                    debug!("Deadline channel closed");
                    break;
                }
            }
        }
        info!("Deadline worker stopped");
    }
}

/// Apply every key already queued without waiting for more. Returns how many
/// keys were taken off the queue.
pub async fn drain_pending(orchestrator: &MatchOrchestrator, rx: &mut DeadlineReceiver) -> usize {
    let mut handled = 0;
    while let Ok(key) = rx.try_recv() {
        apply(orchestrator, key).await;
        handled += 1;
    }
    handled
}

async fn apply(orchestrator: &MatchOrchestrator, key: DeadlineKey) {
    if let Err(err) = orchestrator.handle_deadline(key).await {
        orchestrator.deadline_failed(key, &err);
    }
}
