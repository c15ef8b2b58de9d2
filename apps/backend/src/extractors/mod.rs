pub mod match_id;
pub mod round_ordinal;
pub mod validated_json;

pub use match_id::MatchIdPath;
pub use round_ordinal::RoundOrdinalPath;
pub use validated_json::ValidatedJson;
