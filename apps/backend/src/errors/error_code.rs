//! Error codes for the picmatch backend API.
//!
//! Add new codes here; never pass ad-hoc strings as error codes.
//!
//! All error codes are SCREAMING_SNAKE_CASE and map 1:1 to the strings
//! that appear in HTTP responses.

use core::fmt;

/// Centralized error codes for the picmatch backend API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Request Validation
    /// Invalid match ID in the route
    InvalidMatchId,
    /// Invalid player ID in the route
    InvalidPlayerId,
    /// Roster has the wrong size, duplicates or unknown players
    InvalidRoster,
    /// Round count or phase timeout out of bounds
    InvalidSettings,
    /// Image reference is empty or not part of the round
    UnknownImage,
    /// Voter picked their own image
    SelfVoteForbidden,
    /// Player is not part of the match roster
    NotInRoster,
    /// General validation error
    ValidationError,
    /// General bad request error
    BadRequest,

    // Resource Not Found
    MatchNotFound,
    RoundNotFound,
    /// General not found error
    NotFound,

    // Business Logic Conflicts
    AlreadyResponded,
    DuplicateSubmission,
    DuplicateVote,
    NotAcceptingSubmissions,
    NotVoting,
    MatchClosed,
    MatchInProgress,
    /// Concurrent modification detected by the store
    OptimisticLock,
    /// General conflict error
    Conflict,

    // System Errors
    /// Database timeout or match lock wait exceeded
    Timeout,
    DbUnavailable,
    DataCorruption,
    DbError,
    Internal,
    ConfigError,
}

impl ErrorCode {
    /// Returns the canonical SCREAMING_SNAKE_CASE string for this error code.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidMatchId => "INVALID_MATCH_ID",
            Self::InvalidPlayerId => "INVALID_PLAYER_ID",
            Self::InvalidRoster => "INVALID_ROSTER",
            Self::InvalidSettings => "INVALID_SETTINGS",
            Self::UnknownImage => "UNKNOWN_IMAGE",
            Self::SelfVoteForbidden => "SELF_VOTE_FORBIDDEN",
            Self::NotInRoster => "NOT_IN_ROSTER",
            Self::ValidationError => "VALIDATION_ERROR",
            Self::BadRequest => "BAD_REQUEST",

            Self::MatchNotFound => "MATCH_NOT_FOUND",
            Self::RoundNotFound => "ROUND_NOT_FOUND",
            Self::NotFound => "NOT_FOUND",

            Self::AlreadyResponded => "ALREADY_RESPONDED",
            Self::DuplicateSubmission => "DUPLICATE_SUBMISSION",
            Self::DuplicateVote => "DUPLICATE_VOTE",
            Self::NotAcceptingSubmissions => "NOT_ACCEPTING_SUBMISSIONS",
            Self::NotVoting => "NOT_VOTING",
            Self::MatchClosed => "MATCH_CLOSED",
            Self::MatchInProgress => "MATCH_IN_PROGRESS",
            Self::OptimisticLock => "OPTIMISTIC_LOCK",
            Self::Conflict => "CONFLICT",

            Self::Timeout => "TIMEOUT",
            Self::DbUnavailable => "DB_UNAVAILABLE",
            Self::DataCorruption => "DATA_CORRUPTION",
            Self::DbError => "DB_ERROR",
            Self::Internal => "INTERNAL",
            Self::ConfigError => "CONFIG_ERROR",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
