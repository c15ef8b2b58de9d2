//! Entity tags for match snapshots: `"match-{id}-v{version}"`.

use actix_web::http::header::{HeaderMap, IF_NONE_MATCH};

use crate::domain::MatchId;

pub fn match_etag(id: MatchId, version: i32) -> String {
    format!(r#""match-{id}-v{version}""#)
}

/// True when `If-None-Match` lists `etag` or is the wildcard.
pub fn if_none_match_hits(headers: &HeaderMap, etag: &str) -> bool {
    let Some(raw) = headers.get(IF_NONE_MATCH).and_then(|v| v.to_str().ok()) else {
        return false;
    };
    raw.trim() == "*"
        || raw
            .split(',')
            .map(str::trim)
            .map(|tag| tag.strip_prefix("W/").unwrap_or(tag))
            .any(|tag| tag == etag)
}
