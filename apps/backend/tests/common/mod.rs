#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use picmatch::domain::{ImageRef, MatchId, NewMatch, PlayerId};
use picmatch::repos::{InMemoryMatchRepository, MatchRepository, MatchSnapshot};
use picmatch::services::clock::ManualClock;
use picmatch::services::deadlines::ManualDeadlineService;
use picmatch::services::match_flow::{
    drain_pending, DeadlineReceiver, MatchOrchestrator, OrchestratorConfig,
};
use picmatch::services::notifications::CollectingEmitter;
use picmatch::services::players::{InMemoryPlayerDirectory, Player};
use time::macros::datetime;
use time::OffsetDateTime;

pub const A: PlayerId = 1;
pub const B: PlayerId = 2;
pub const C: PlayerId = 3;
pub const D: PlayerId = 4;
pub const E: PlayerId = 5;
pub const STRANGER: PlayerId = 99;

pub const HOUR: Duration = Duration::from_secs(3600);
pub const T0: OffsetDateTime = datetime!(2026-03-01 12:00 UTC);

pub fn init_logging() {
    backend_test_support::logging::init();
}

pub fn image(player: PlayerId, ordinal: u16) -> ImageRef {
    ImageRef::new(format!("img-{player}-r{ordinal}"))
}

pub fn directory() -> InMemoryPlayerDirectory {
    InMemoryPlayerDirectory::with_players((1..=10).map(|id| Player {
        id,
        handle: format!("player-{id}"),
    }))
}

/// Orchestrator wired to manual time, manual deadlines and a collecting emitter.
pub struct Harness {
    pub orchestrator: Arc<MatchOrchestrator>,
    pub rx: DeadlineReceiver,
    pub clock: Arc<ManualClock>,
    pub deadlines: Arc<ManualDeadlineService>,
    pub events: Arc<CollectingEmitter>,
    pub repo: Arc<dyn MatchRepository>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_repo(Arc::new(InMemoryMatchRepository::new()), OrchestratorConfig::default())
    }

    pub fn with_repo(repo: Arc<dyn MatchRepository>, config: OrchestratorConfig) -> Self {
        init_logging();
        let clock = Arc::new(ManualClock::new(T0));
        let deadlines = Arc::new(ManualDeadlineService::new());
        let events = Arc::new(CollectingEmitter::new());
        let (orchestrator, rx) = MatchOrchestrator::builder(repo.clone())
            .with_players(Arc::new(directory()))
            .with_clock(clock.clone())
            .with_deadlines(deadlines.clone())
            .with_emitter(events.clone())
            .with_config(config)
            .build();
        Self {
            orchestrator,
            rx,
            clock,
            deadlines,
            events,
            repo,
        }
    }

    /// Fire every live deadline and apply the resulting keys.
    pub async fn fire_deadlines(&mut self) -> usize {
        self.deadlines.fire_all();
        drain_pending(&self.orchestrator, &mut self.rx).await
    }

    pub async fn create(&self, total_rounds: u16) -> MatchSnapshot {
        self.create_roster(&[A, B, C, D], total_rounds).await
    }

    /// Create a match for `roster`; the first entry is the creator.
    pub async fn create_roster(&self, roster: &[PlayerId], total_rounds: u16) -> MatchSnapshot {
        self.orchestrator
            .create_match(NewMatch {
                creator: roster[0],
                invited: roster[1..].to_vec(),
                total_rounds: Some(total_rounds),
                phase_timeout: Some(HOUR),
            })
            .await
            .expect("create match")
    }

    /// Create `[A, B, C, D]` and have everyone accept.
    pub async fn start(&self, total_rounds: u16) -> MatchId {
        self.start_roster(&[A, B, C, D], total_rounds).await
    }

    pub async fn start_roster(&self, roster: &[PlayerId], total_rounds: u16) -> MatchId {
        let id = self.create_roster(roster, total_rounds).await.aggregate.id;
        for p in &roster[1..] {
            self.orchestrator
                .respond_to_invitation(id, *p, true)
                .await
                .expect("accept");
        }
        id
    }

    pub async fn submit_all(&self, id: MatchId, ordinal: u16) -> MatchSnapshot {
        let mut last = None;
        for p in [A, B, C, D] {
            last = Some(
                self.orchestrator
                    .submit_image(id, p, image(p, ordinal))
                    .await
                    .expect("submit"),
            );
        }
        last.expect("roster is not empty")
    }

    /// A->B, B->C, C->D, D->A: one vote each.
    pub async fn vote_cyclic(&self, id: MatchId, ordinal: u16) -> MatchSnapshot {
        let mut last = None;
        for (voter, target) in [(A, B), (B, C), (C, D), (D, A)] {
            last = Some(
                self.orchestrator
                    .cast_vote(id, voter, image(target, ordinal))
                    .await
                    .expect("vote"),
            );
        }
        last.expect("roster is not empty")
    }
}
