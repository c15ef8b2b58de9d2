//! SeaORM -> DomainError translation helpers.
//!
//! Adapters return `sea_orm::DbErr`; the repository layer converts them into
//! `DomainError` here.

use tracing::{error, warn};

use crate::errors::domain::{ConflictKind, DomainError, InfraErrorKind, NotFoundKind};
use crate::trace_ctx;

/// Prefix of the `DbErr::Custom` payload the adapter raises on a version mismatch.
pub const OPTIMISTIC_LOCK_PREFIX: &str = "OPTIMISTIC_LOCK:";

fn mentions_sqlstate(msg: &str, code: &str) -> bool {
    msg.contains(code) || msg.contains(&format!("SQLSTATE({code})"))
}

/// Translate a `DbErr` into a `DomainError` with sanitized detail.
pub fn map_db_err(e: sea_orm::DbErr) -> DomainError {
    let error_msg = e.to_string();
    let trace_id = trace_ctx::trace_id();

    match &e {
        sea_orm::DbErr::RecordNotFound(what) => {
            return DomainError::not_found(NotFoundKind::Match, what.clone());
        }
        sea_orm::DbErr::Custom(msg) if msg.starts_with(OPTIMISTIC_LOCK_PREFIX) => {
            if let Some(json_str) = msg.strip_prefix(OPTIMISTIC_LOCK_PREFIX) {
                #[derive(serde::Deserialize)]
                struct LockInfo {
                    expected: i32,
                    actual: i32,
                }

                if let Ok(info) = serde_json::from_str::<LockInfo>(json_str) {
                    warn!(
                        trace_id = %trace_id,
                        expected = info.expected,
                        actual = info.actual,
                        "Optimistic lock conflict detected"
                    );
                    return DomainError::conflict(
                        ConflictKind::OptimisticLock,
                        format!(
                            "Match was modified concurrently (expected version {}, actual version {})",
                            info.expected, info.actual
                        ),
                    );
                }
            }
            warn!(trace_id = %trace_id, "Optimistic lock conflict detected (version info unavailable)");
            return DomainError::conflict(
                ConflictKind::OptimisticLock,
                "Match was modified by another writer; please retry",
            );
        }
        sea_orm::DbErr::ConnectionAcquire(_) | sea_orm::DbErr::Conn(_) => {
            warn!(trace_id = %trace_id, raw_error = %error_msg, "Database unavailable");
            return DomainError::infra(InfraErrorKind::DbUnavailable, "Database unavailable");
        }
        sea_orm::DbErr::Json(_) | sea_orm::DbErr::Type(_) => {
            error!(trace_id = %trace_id, raw_error = %error_msg, "Stored row could not be decoded");
            return DomainError::infra(
                InfraErrorKind::DataCorruption,
                "Stored match could not be decoded",
            );
        }
        _ => {}
    }

    if mentions_sqlstate(&error_msg, "23505")
        || error_msg.contains("duplicate key value violates unique constraint")
        || error_msg.contains("UNIQUE constraint failed")
    {
        warn!(trace_id = %trace_id, raw_error = %error_msg, "Unique constraint violation");
        return DomainError::conflict(
            ConflictKind::Other("Unique".into()),
            "Unique constraint violation",
        );
    }

    if mentions_sqlstate(&error_msg, "23503") {
        warn!(trace_id = %trace_id, raw_error = %error_msg, "Foreign key constraint violation");
        return DomainError::validation_other("Foreign key constraint violation");
    }

    if error_msg.contains("timeout")
        || error_msg.contains("pool")
        || error_msg.contains("unavailable")
    {
        warn!(trace_id = %trace_id, raw_error = %error_msg, "Database timeout or pool issue");
        return DomainError::infra(InfraErrorKind::Timeout, "Database timeout");
    }

    error!(trace_id = %trace_id, raw_error = %error_msg, "Unhandled database error");
    DomainError::infra(
        InfraErrorKind::Other("DbErr".into()),
        "Database operation failed",
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn optimistic_lock_payload_maps_to_conflict() {
        let err = sea_orm::DbErr::Custom(format!(
            "{OPTIMISTIC_LOCK_PREFIX}{{\"expected\":3,\"actual\":4}}"
        ));
        match map_db_err(err) {
            DomainError::Conflict(ConflictKind::OptimisticLock, detail) => {
                assert!(detail.contains("expected version 3"));
                assert!(detail.contains("actual version 4"));
            }
            other => panic!("unexpected mapping: {other:?}"),
        }
    }

    #[test]
    fn record_not_found_maps_to_match_not_found() {
        let err = sea_orm::DbErr::RecordNotFound("match 01H not found".into());
        assert!(matches!(
            map_db_err(err),
            DomainError::NotFound(NotFoundKind::Match, _)
        ));
    }

    #[test]
    fn unique_violation_maps_to_conflict() {
        let err = sea_orm::DbErr::Custom("UNIQUE constraint failed: matches.id".into());
        assert!(matches!(
            map_db_err(err),
            DomainError::Conflict(ConflictKind::Other(_), _)
        ));
    }

    #[test]
    fn unknown_errors_map_to_infra_other() {
        let err = sea_orm::DbErr::Custom("something odd".into());
        assert!(matches!(
            map_db_err(err),
            DomainError::Infra(InfraErrorKind::Other(_), _)
        ));
    }
}
