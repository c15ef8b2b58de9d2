use std::sync::Arc;

use tokio::sync::watch;
use tracing::info;

use crate::config::db::StoreKind;
use crate::domain::MatchRules;
use crate::error::AppError;
use crate::infra::db::bootstrap_db;
use crate::repos::{InMemoryMatchRepository, MatchRepository, SeaMatchRepository};
use crate::services::match_flow::{DeadlineWorker, MatchOrchestrator, OrchestratorConfig};
use crate::services::notifications::{NotificationEmitter, TracingEmitter};
use crate::services::players::{OpenPlayerDirectory, PlayerDirectory};
use crate::state::app_state::AppState;

/// Wires store, orchestrator and deadline worker into an `AppState`.
/// Used by both `main` and tests.
pub struct StateBuilder {
    store: StoreKind,
    rules: MatchRules,
    config: OrchestratorConfig,
    emitter: Arc<dyn NotificationEmitter>,
    players: Arc<dyn PlayerDirectory>,
}

impl StateBuilder {
    pub fn new() -> Self {
        Self {
            store: StoreKind::InMemory,
            rules: MatchRules::default(),
            config: OrchestratorConfig::default(),
            emitter: Arc::new(TracingEmitter),
            players: Arc::new(OpenPlayerDirectory),
        }
    }

    pub fn with_store(mut self, store: StoreKind) -> Self {
        self.store = store;
        self
    }

    pub fn with_rules(mut self, rules: MatchRules) -> Self {
        self.rules = rules;
        self
    }

    pub fn with_config(mut self, config: OrchestratorConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_emitter(mut self, emitter: Arc<dyn NotificationEmitter>) -> Self {
        self.emitter = emitter;
        self
    }

    pub fn with_players(mut self, players: Arc<dyn PlayerDirectory>) -> Self {
        self.players = players;
        self
    }

    /// Must run inside a tokio runtime: spawns the deadline worker and
    /// re-arms deadlines for matches left open by a previous process.
    pub async fn build(self) -> Result<AppState, AppError> {
        let db = match self.store {
            StoreKind::InMemory => None,
            kind => Some(bootstrap_db(kind).await?),
        };
        let repo: Arc<dyn MatchRepository> = match &db {
            None => Arc::new(InMemoryMatchRepository::new()),
            Some(conn) => Arc::new(SeaMatchRepository::new(conn.clone())),
        };

        let (orchestrator, deadline_rx) = MatchOrchestrator::builder(repo)
            .with_players(self.players)
            .with_emitter(self.emitter)
            .with_rules(self.rules)
            .with_config(self.config)
            .build();

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        tokio::spawn(DeadlineWorker::new(orchestrator.clone(), deadline_rx, shutdown_rx).run());

        let resumed = orchestrator.resume_deadlines().await?;
        info!(store = ?self.store, resumed, "Application state ready");

        Ok(AppState::new(orchestrator, db, shutdown_tx))
    }
}

impl Default for StateBuilder {
    fn default() -> Self {
        Self::new()
    }
}

pub fn build_state() -> StateBuilder {
    StateBuilder::new()
}
