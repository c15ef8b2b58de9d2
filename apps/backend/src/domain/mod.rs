//! Pure match logic: no I/O, no clocks. Every function takes `now` explicitly.

pub mod ids;
pub mod invitation;
pub mod round_engine;
pub mod rules;
pub mod standings;
pub mod state;
pub mod transition;

#[cfg(test)]
pub mod fixtures;
#[cfg(test)]
mod test_gens;
#[cfg(test)]
mod tests_invitation;
#[cfg(test)]
mod tests_props;
#[cfg(test)]
mod tests_round_engine;

pub use ids::{ImageRef, MatchId, PlayerId};
pub use invitation::{InvitationOutcome, NewMatch};
pub use round_engine::RoundProgress;
pub use rules::MatchRules;
pub use standings::Standing;
pub use state::{Match, MatchStatus, Phase, Round, RoundStatus, Submission, Vote};
pub use transition::MatchTransition;
