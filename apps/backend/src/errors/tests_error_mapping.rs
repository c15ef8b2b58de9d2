// Unit tests for error mapping - pure domain logic without HTTP or database dependencies
use actix_web::body::to_bytes;
use actix_web::ResponseError;

use crate::errors::domain::{
    ConflictKind, DomainError, InfraErrorKind, NotFoundKind, ValidationKind,
};
use crate::{AppError, ErrorCode};

#[test]
fn maps_validation_to_422() {
    let de = DomainError::validation(ValidationKind::InvalidRoster, "roster too small");
    let app: AppError = de.into();
    assert_eq!(app.code(), ErrorCode::InvalidRoster);
    assert_eq!(app.status().as_u16(), 422);

    let other = DomainError::validation_other("bad field");
    let app: AppError = other.into();
    assert_eq!(app.code(), ErrorCode::ValidationError);
}

#[test]
fn maps_conflicts() {
    let closed = DomainError::conflict(ConflictKind::MatchClosed, "cancelled");
    let app: AppError = closed.into();
    assert_eq!(app.code().as_str(), "MATCH_CLOSED");
    assert_eq!(app.status().as_u16(), 409);

    let lock = DomainError::conflict(ConflictKind::OptimisticLock, "stale");
    let app: AppError = lock.into();
    assert_eq!(app.code().as_str(), "OPTIMISTIC_LOCK");
    assert_eq!(app.status().as_u16(), 409);

    // Test generic conflict fallback
    let other = DomainError::conflict(ConflictKind::Other("Unique".into()), "generic conflict");
    let app: AppError = other.into();
    assert_eq!(app.code().as_str(), "CONFLICT");
    assert_eq!(app.status().as_u16(), 409);
}

#[test]
fn maps_not_found() {
    let nf = DomainError::not_found(NotFoundKind::Match, "no match");
    let app: AppError = nf.into();
    assert_eq!(app.code().as_str(), "MATCH_NOT_FOUND");
    assert_eq!(app.status().as_u16(), 404);

    let nf = DomainError::not_found(NotFoundKind::Round, "no round 9");
    let app: AppError = nf.into();
    assert_eq!(app.code().as_str(), "ROUND_NOT_FOUND");
}

#[test]
fn maps_infra() {
    let t = DomainError::infra(InfraErrorKind::Timeout, "timeout");
    let app: AppError = t.into();
    assert_eq!(app.code().as_str(), "TIMEOUT");
    assert_eq!(app.status().as_u16(), 504);
    assert!(matches!(app, AppError::Timeout { .. }));

    let down = DomainError::infra(InfraErrorKind::DbUnavailable, "down");
    let app: AppError = down.into();
    assert_eq!(app.code().as_str(), "DB_UNAVAILABLE");
    assert_eq!(app.status().as_u16(), 503);

    let corrupt = DomainError::infra(InfraErrorKind::DataCorruption, "bad json");
    let app: AppError = corrupt.into();
    assert_eq!(app.code().as_str(), "DATA_CORRUPTION");
    assert_eq!(app.status().as_u16(), 500);

    let other = DomainError::infra(InfraErrorKind::Other("DbErr".into()), "boom");
    let app: AppError = other.into();
    assert_eq!(app.code().as_str(), "DB_ERROR");
    assert_eq!(app.status().as_u16(), 500);
}

#[actix_web::test]
async fn renders_problem_details() {
    let app: AppError =
        DomainError::conflict(ConflictKind::NotVoting, "round 1 is not voting").into();
    let resp = app.error_response();
    assert_eq!(resp.status().as_u16(), 409);
    assert_eq!(
        resp.headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok()),
        Some("application/problem+json")
    );
    assert!(resp.headers().contains_key("x-trace-id"));

    let body = to_bytes(resp.into_body()).await.unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["code"], "NOT_VOTING");
    assert_eq!(json["title"], "Not Voting");
    assert_eq!(json["status"], 409);
    assert_eq!(json["detail"], "round 1 is not voting");
    assert_eq!(json["type"], "https://picmatch.app/errors/NOT_VOTING");
}
