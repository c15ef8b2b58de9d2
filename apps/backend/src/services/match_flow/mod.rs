//! Match orchestration service - bridges the pure match engine with storage,
//! deadlines and notifications.
//!
//! Every mutation runs under the per-match lock, against a fresh load of the
//! aggregate, and is committed with the version it was read at.

mod deadlines;
mod invitations;
pub mod locks;
mod mutation;
mod player_actions;
mod reads;
pub mod worker;

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;

pub use deadlines::DeadlineKey;
pub use mutation::MatchMutationResult;
pub use worker::{deadline_channel, drain_pending, DeadlineReceiver, DeadlineSender, DeadlineWorker};

use self::deadlines::ArmedDeadline;
use self::locks::MatchLocks;
use crate::domain::{MatchId, MatchRules};
use crate::repos::MatchRepository;
use crate::services::clock::{Clock, SystemClock};
use crate::services::deadlines::{DeadlineService, TokioDeadlineService};
use crate::services::notifications::{NotificationEmitter, TracingEmitter};
use crate::services::players::{OpenPlayerDirectory, PlayerDirectory};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrchestratorConfig {
    /// Longest an action waits for the match lock before failing with Timeout.
    pub lock_timeout: Duration,
    /// Delay before a deadline that failed transiently is applied again.
    pub deadline_retry: Duration,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            lock_timeout: Duration::from_millis(5000),
            deadline_retry: Duration::from_millis(5000),
        }
    }
}

pub struct MatchOrchestrator {
    repo: Arc<dyn MatchRepository>,
    players: Arc<dyn PlayerDirectory>,
    emitter: Arc<dyn NotificationEmitter>,
    clock: Arc<dyn Clock>,
    deadlines: Arc<dyn DeadlineService>,
    rules: MatchRules,
    config: OrchestratorConfig,
    locks: MatchLocks,
    armed: DashMap<MatchId, ArmedDeadline>,
    deadline_tx: DeadlineSender,
}

impl MatchOrchestrator {
    pub fn builder(repo: Arc<dyn MatchRepository>) -> OrchestratorBuilder {
        OrchestratorBuilder::new(repo)
    }

    /// Matches that currently have a live deadline.
    pub fn armed_deadlines(&self) -> usize {
        self.armed.len()
    }
}

/// Builder for `MatchOrchestrator`; unset collaborators get production defaults.
pub struct OrchestratorBuilder {
    repo: Arc<dyn MatchRepository>,
    players: Arc<dyn PlayerDirectory>,
    emitter: Arc<dyn NotificationEmitter>,
    clock: Arc<dyn Clock>,
    deadlines: Arc<dyn DeadlineService>,
    rules: MatchRules,
    config: OrchestratorConfig,
}

impl OrchestratorBuilder {
    pub fn new(repo: Arc<dyn MatchRepository>) -> Self {
        Self {
            repo,
            players: Arc::new(OpenPlayerDirectory),
            emitter: Arc::new(TracingEmitter),
            clock: Arc::new(SystemClock),
            deadlines: Arc::new(TokioDeadlineService),
            rules: MatchRules::default(),
            config: OrchestratorConfig::default(),
        }
    }

    pub fn with_players(mut self, players: Arc<dyn PlayerDirectory>) -> Self {
        self.players = players;
        self
    }

    pub fn with_emitter(mut self, emitter: Arc<dyn NotificationEmitter>) -> Self {
        self.emitter = emitter;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_deadlines(mut self, deadlines: Arc<dyn DeadlineService>) -> Self {
        self.deadlines = deadlines;
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

    /// Returns the orchestrator and the receiving end of its deadline queue;
    /// hand the receiver to a `DeadlineWorker`.
    pub fn build(self) -> (Arc<MatchOrchestrator>, DeadlineReceiver) {
        let (deadline_tx, deadline_rx) = deadline_channel();
        let orchestrator = MatchOrchestrator {
            repo: self.repo,
            players: self.players,
            emitter: self.emitter,
            clock: self.clock,
            deadlines: self.deadlines,
            rules: self.rules,
            config: self.config,
            locks: MatchLocks::new(),
            armed: DashMap::new(),
            deadline_tx,
        };
        (Arc::new(orchestrator), deadline_rx)
    }
}
