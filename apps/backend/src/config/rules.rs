use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::domain::rules::MatchRules;
use crate::error::AppError;
use crate::services::match_flow::OrchestratorConfig;

impl MatchRules {
    /// Reads `MATCH_*` overrides from the environment on top of the defaults.
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = MatchRules::default();
        let rules = MatchRules {
            min_players: parse_or(&lookup, "MATCH_MIN_PLAYERS", defaults.min_players)?,
            max_players: parse_or(&lookup, "MATCH_MAX_PLAYERS", defaults.max_players)?,
            rounds_per_player: parse_or(
                &lookup,
                "MATCH_ROUNDS_PER_PLAYER",
                defaults.rounds_per_player,
            )?,
            max_rounds: parse_or(&lookup, "MATCH_MAX_ROUNDS", defaults.max_rounds)?,
            default_phase_timeout: secs_or(
                &lookup,
                "MATCH_PHASE_TIMEOUT_SECS",
                defaults.default_phase_timeout,
            )?,
            min_phase_timeout: secs_or(
                &lookup,
                "MATCH_MIN_PHASE_TIMEOUT_SECS",
                defaults.min_phase_timeout,
            )?,
            max_phase_timeout: secs_or(
                &lookup,
                "MATCH_MAX_PHASE_TIMEOUT_SECS",
                defaults.max_phase_timeout,
            )?,
        };
        rules
            .validate()
            .map_err(|e| AppError::config(format!("Invalid match rules: {e}")))?;
        Ok(rules)
    }
}

impl OrchestratorConfig {
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = OrchestratorConfig::default();
        let millis = parse_or(
            &lookup,
            "MATCH_LOCK_TIMEOUT_MS",
            defaults.lock_timeout.as_millis() as u64,
        )?;
        if millis == 0 {
            return Err(AppError::config("MATCH_LOCK_TIMEOUT_MS must be positive"));
        }
        let retry_millis = parse_or(
            &lookup,
            "MATCH_DEADLINE_RETRY_MS",
            defaults.deadline_retry.as_millis() as u64,
        )?;
        if retry_millis == 0 {
            return Err(AppError::config("MATCH_DEADLINE_RETRY_MS must be positive"));
        }
        Ok(OrchestratorConfig {
            lock_timeout: Duration::from_millis(millis),
            deadline_retry: Duration::from_millis(retry_millis),
        })
    }
}

fn parse_or<F, T>(lookup: &F, name: &str, default: T) -> Result<T, AppError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(name) {
        None => Ok(default),
        Some(raw) => raw.trim().parse::<T>().map_err(|_| {
            AppError::config(format!(
                "Environment variable '{name}' has an invalid value: '{raw}'"
            ))
        }),
    }
}

fn secs_or<F>(lookup: &F, name: &str, default: Duration) -> Result<Duration, AppError>
where
    F: Fn(&str) -> Option<String>,
{
    parse_or(lookup, name, default.as_secs()).map(Duration::from_secs)
}
