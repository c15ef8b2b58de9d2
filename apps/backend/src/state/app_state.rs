use std::sync::Arc;

use sea_orm::DatabaseConnection;
use tokio::sync::watch;

use crate::services::match_flow::MatchOrchestrator;

/// Shared resources handed to every request handler.
pub struct AppState {
    orchestrator: Arc<MatchOrchestrator>,
    /// Absent when running on the in-memory store.
    db: Option<DatabaseConnection>,
    shutdown: watch::Sender<bool>,
}

impl AppState {
    pub fn new(
        orchestrator: Arc<MatchOrchestrator>,
        db: Option<DatabaseConnection>,
        shutdown: watch::Sender<bool>,
    ) -> Self {
        Self {
            orchestrator,
            db,
            shutdown,
        }
    }

    pub fn orchestrator(&self) -> &MatchOrchestrator {
        &self.orchestrator
    }

    pub fn db(&self) -> Option<&DatabaseConnection> {
        self.db.as_ref()
    }

    /// Ask background workers to stop.
    pub fn shutdown(&self) {
        let _ = self.shutdown.send(true);
    }
}
