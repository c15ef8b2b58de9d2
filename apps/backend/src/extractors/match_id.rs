use std::future::{ready, Ready};

use actix_web::dev::Payload;
use actix_web::{FromRequest, HttpRequest};

use crate::domain::MatchId;
use crate::error::AppError;
use crate::errors::ErrorCode;

/// `{match_id}` path segment parsed as a ULID. Existence is checked by the
/// handler's service call, not here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchIdPath(pub MatchId);

impl FromRequest for MatchIdPath {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(parse(req.match_info().get("match_id")))
    }
}

fn parse(raw: Option<&str>) -> Result<MatchIdPath, AppError> {
    let raw = raw.ok_or_else(|| {
        AppError::bad_request(ErrorCode::InvalidMatchId, "Missing match_id parameter")
    })?;
    raw.parse::<MatchId>().map(MatchIdPath).map_err(|_| {
        AppError::bad_request(
            ErrorCode::InvalidMatchId,
            format!("Invalid match id: {raw}"),
        )
    })
}
