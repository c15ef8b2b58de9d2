//! Redis pub/sub publisher for match events.
//!
//! Each event is published as JSON on `match:{match_id}`. Publishing happens on
//! a spawned task so the calling action never waits on Redis.

use std::time::Duration;

use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client, RedisError};
use tokio::time::sleep;
use tracing::{error, warn};

use super::notifications::{MatchEvent, NotificationEmitter};
use crate::domain::MatchId;
use crate::error::AppError;

const PUBLISHER_MAX_ATTEMPTS: u32 = 3;
const PUBLISHER_INITIAL_RETRY_DELAY_MS: u64 = 50;
const PUBLISHER_MAX_RETRY_DELAY_MS: u64 = 200;

#[derive(Clone)]
pub struct RedisEmitter {
    publisher: ConnectionManager,
}

impl RedisEmitter {
    pub async fn connect(redis_url: &str) -> Result<Self, AppError> {
        let client = Client::open(redis_url)
            .map_err(|err| AppError::config(format!("Invalid REDIS_URL: {err}")))?;
        let publisher = ConnectionManager::new(client).await.map_err(|err| {
            AppError::internal(format!("Unable to initialize Redis connection manager: {err}"))
        })?;
        Ok(Self { publisher })
    }

    pub fn channel_for(match_id: MatchId) -> String {
        format!("match:{match_id}")
    }

    async fn publish(mut publisher: ConnectionManager, channel: String, payload: String) {
        let mut attempt = 0u32;
        loop {
            attempt += 1;
            let result = publisher
                .publish::<_, _, ()>(channel.clone(), payload.clone())
                .await;

            match result {
                Ok(()) => return,
                Err(err) => {
                    if attempt >= PUBLISHER_MAX_ATTEMPTS || !is_transient(&err) {
                        error!(error = %err, channel = %channel, attempt, "Redis publish failed");
                        return;
                    }
                    let delay_ms = PUBLISHER_INITIAL_RETRY_DELAY_MS
                        .saturating_mul(2_u64.pow(attempt - 1))
                        .min(PUBLISHER_MAX_RETRY_DELAY_MS);
                    warn!(
                        error = %err,
                        attempt,
                        retry_delay_ms = delay_ms,
                        "Redis publish failed, retrying"
                    );
                    sleep(Duration::from_millis(delay_ms)).await;
                }
            }
        }
    }
}

impl NotificationEmitter for RedisEmitter {
    fn emit(&self, event: MatchEvent) {
        let payload = match serde_json::to_string(&event) {
            Ok(payload) => payload,
            Err(err) => {
                error!(error = %err, match_id = %event.match_id, "Failed to serialize match event");
                return;
            }
        };
        let channel = Self::channel_for(event.match_id);
        tokio::spawn(Self::publish(self.publisher.clone(), channel, payload));
    }
}

fn is_transient(err: &RedisError) -> bool {
    err.is_connection_refusal()
        || err.is_connection_dropped()
        || err.is_timeout()
        || err.is_io_error()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_is_scoped_per_match() {
        let id = MatchId::new();
        assert_eq!(RedisEmitter::channel_for(id), format!("match:{id}"));
    }

    #[tokio::test]
    async fn invalid_url_is_config_error() {
        let err = match RedisEmitter::connect("not a url").await {
            Ok(_) => panic!("connect should fail"),
            Err(e) => e,
        };
        assert!(matches!(err, AppError::Config { .. }));
    }
}
