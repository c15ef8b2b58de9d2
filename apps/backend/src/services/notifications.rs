//! Outbound match events. Emission is fire-and-forget: emitters log their own
//! failures and never fail the action that produced the event.

use std::sync::Arc;

use parking_lot::Mutex;
use serde::Serialize;
use tokio::sync::broadcast;
use tracing::{debug, info};

use crate::domain::{MatchId, MatchTransition};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchEvent {
    pub match_id: MatchId,
    /// Store version that produced this event.
    pub version: i32,
    #[serde(flatten)]
    pub transition: MatchTransition,
}

pub trait NotificationEmitter: Send + Sync {
    fn emit(&self, event: MatchEvent);
}

/// Writes each event to the log at info.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingEmitter;

impl NotificationEmitter for TracingEmitter {
    fn emit(&self, event: MatchEvent) {
        info!(
            match_id = %event.match_id,
            version = event.version,
            event = ?event.transition,
            "Match event"
        );
    }
}

/// In-process fan-out over a tokio broadcast channel.
#[derive(Debug, Clone)]
pub struct BroadcastEmitter {
    tx: broadcast::Sender<MatchEvent>,
}

impl BroadcastEmitter {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<MatchEvent> {
        self.tx.subscribe()
    }
}

impl NotificationEmitter for BroadcastEmitter {
    fn emit(&self, event: MatchEvent) {
        // No subscribers is normal.
        if self.tx.send(event).is_err() {
            debug!("Match event dropped: no subscribers");
        }
    }
}

/// Keeps every event; used by tests and diagnostics.
#[derive(Debug, Default)]
pub struct CollectingEmitter {
    events: Mutex<Vec<MatchEvent>>,
}

impl CollectingEmitter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<MatchEvent> {
        self.events.lock().clone()
    }

    pub fn transitions_for(&self, match_id: MatchId) -> Vec<MatchTransition> {
        self.events
            .lock()
            .iter()
            .filter(|e| e.match_id == match_id)
            .map(|e| e.transition.clone())
            .collect()
    }
}

impl NotificationEmitter for CollectingEmitter {
    fn emit(&self, event: MatchEvent) {
        self.events.lock().push(event);
    }
}

/// Sends each event to every inner emitter in order.
#[derive(Default, Clone)]
pub struct FanoutEmitter {
    sinks: Vec<Arc<dyn NotificationEmitter>>,
}

impl FanoutEmitter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, sink: Arc<dyn NotificationEmitter>) -> Self {
        self.sinks.push(sink);
        self
    }
}

impl NotificationEmitter for FanoutEmitter {
    fn emit(&self, event: MatchEvent) {
        if let Some((last, rest)) = self.sinks.split_last() {
            for sink in rest {
                sink.emit(event.clone());
            }
            last.emit(event);
        }
    }
}
