pub mod match_players;
pub mod matches;

pub use match_players::Entity as MatchPlayers;
pub use match_players::Model as MatchPlayer;
pub use matches::Entity as Matches;
pub use matches::Model as MatchRow;
