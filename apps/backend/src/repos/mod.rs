pub mod matches;
pub mod matches_db;

pub use matches::{require_match, InMemoryMatchRepository, MatchRepository, MatchSnapshot};
pub use matches_db::SeaMatchRepository;
