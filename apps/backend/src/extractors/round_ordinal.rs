use std::future::{ready, Ready};

use actix_web::dev::Payload;
use actix_web::{FromRequest, HttpRequest};

use crate::error::AppError;
use crate::errors::ErrorCode;

/// `{ordinal}` path segment: a 1-based round number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundOrdinalPath(pub u16);

impl FromRequest for RoundOrdinalPath {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(parse(req.match_info().get("ordinal")))
    }
}

fn parse(raw: Option<&str>) -> Result<RoundOrdinalPath, AppError> {
    let raw = raw.ok_or_else(|| {
        AppError::bad_request(ErrorCode::BadRequest, "Missing ordinal parameter")
    })?;
    match raw.parse::<u16>() {
        Ok(ordinal) if ordinal > 0 => Ok(RoundOrdinalPath(ordinal)),
        _ => Err(AppError::bad_request(
            ErrorCode::BadRequest,
            format!("Invalid round ordinal: {raw}"),
        )),
    }
}
