// Proptest generators for match domain types.

use proptest::prelude::*;
use proptest::sample::subsequence;
use proptest::test_runner::Config as ProptestConfig;

use crate::domain::PlayerId;

pub fn proptest_config() -> ProptestConfig {
    ProptestConfig::with_cases(128)
}

/// A roster of 4..=10 distinct players in random order.
pub fn roster() -> impl Strategy<Value = Vec<PlayerId>> {
    subsequence((1..=40).collect::<Vec<PlayerId>>(), 4..=10).prop_shuffle()
}

/// One answer per invited player, in a random answering order.
/// Each entry is (roster index, accept).
pub fn invitation_script() -> impl Strategy<Value = (Vec<PlayerId>, Vec<(usize, bool)>)> {
    roster().prop_flat_map(|roster| {
        let invited: Vec<usize> = (1..roster.len()).collect();
        let n = invited.len();
        (
            Just(roster),
            Just(invited).prop_shuffle(),
            prop::collection::vec(prop::bool::weighted(0.85), n),
        )
            .prop_map(|(roster, order, accepts)| {
                let script = order.into_iter().zip(accepts).collect();
                (roster, script)
            })
    })
}

#[derive(Debug, Clone, Copy)]
pub enum Action {
    /// Player index submits their own image.
    Submit(usize),
    /// Player index votes for the image of the player at the second index.
    Vote(usize, usize),
    /// A phase deadline fires.
    Deadline,
}

pub fn action() -> impl Strategy<Value = Action> {
    prop_oneof![
        4 => (0usize..10).prop_map(Action::Submit),
        4 => (0usize..10, 0usize..10).prop_map(|(a, b)| Action::Vote(a, b)),
        1 => Just(Action::Deadline),
    ]
}

/// Vote targets for a round with `n` submissions: each voter picks an index.
pub fn vote_targets(n: usize) -> impl Strategy<Value = Vec<usize>> {
    prop::collection::vec(0..n, 0..=n * 2)
}
