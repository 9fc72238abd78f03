//! Engine Configuration
//!
//! Tunables for round length, scoring and transition delays.
//! Defaults match the shipped game; every value can be overridden
//! from the environment.

use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

use crate::{
    CORRECT_ADVANCE_DELAY_MS, DEFAULT_TRIES_PER_ROUND, POINTS_PER_CORRECT, WRONG_RESET_DELAY_MS,
};

/// Engine configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EngineConfig {
    /// Tries granted at the start of every round.
    pub tries_per_round: u32,
    /// Points awarded per correct answer.
    pub points_per_correct: u32,
    /// Delay between a correct answer and loading the next round.
    pub correct_delay: Duration,
    /// Delay between a wrong answer and re-enabling input.
    pub wrong_delay: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            tries_per_round: DEFAULT_TRIES_PER_ROUND,
            points_per_correct: POINTS_PER_CORRECT,
            correct_delay: Duration::from_millis(CORRECT_ADVANCE_DELAY_MS),
            wrong_delay: Duration::from_millis(WRONG_RESET_DELAY_MS),
        }
    }
}

impl EngineConfig {
    /// Create config from environment variables.
    ///
    /// Reads `QUIZ_TRIES_PER_ROUND`, `QUIZ_POINTS_PER_CORRECT`,
    /// `QUIZ_CORRECT_DELAY_MS` and `QUIZ_WRONG_DELAY_MS`. Unset
    /// variables keep their default.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup (environment, test fixtures).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let config = Self {
            tries_per_round: parse_var(&lookup, "QUIZ_TRIES_PER_ROUND")?
                .unwrap_or(defaults.tries_per_round),
            points_per_correct: parse_var(&lookup, "QUIZ_POINTS_PER_CORRECT")?
                .unwrap_or(defaults.points_per_correct),
            correct_delay: parse_var(&lookup, "QUIZ_CORRECT_DELAY_MS")?
                .map(Duration::from_millis)
                .unwrap_or(defaults.correct_delay),
            wrong_delay: parse_var(&lookup, "QUIZ_WRONG_DELAY_MS")?
                .map(Duration::from_millis)
                .unwrap_or(defaults.wrong_delay),
        };

        config.validate()?;
        Ok(config)
    }

    /// Check the config describes a playable game.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tries_per_round == 0 {
            return Err(ConfigError::Invalid {
                key: "QUIZ_TRIES_PER_ROUND",
                reason: "must be at least 1",
            });
        }
        if self.points_per_correct == 0 {
            return Err(ConfigError::Invalid {
                key: "QUIZ_POINTS_PER_CORRECT",
                reason: "must be at least 1",
            });
        }
        Ok(())
    }
}

fn parse_var<T, F>(lookup: &F, key: &'static str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = lookup(key) else {
        return Ok(None);
    };
    let parsed: Result<T, _> = raw.trim().parse();
    match parsed {
        Ok(value) => Ok(Some(value)),
        Err(_) => Err(ConfigError::Malformed { key, value: raw }),
    }
}

/// Configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Value could not be parsed.
    #[error("malformed value for {key}: {value:?}")]
    Malformed {
        /// Variable name.
        key: &'static str,
        /// Raw value found.
        value: String,
    },
    /// Value parsed but is out of range.
    #[error("invalid value for {key}: {reason}")]
    Invalid {
        /// Variable name.
        key: &'static str,
        /// What is wrong with it.
        reason: &'static str,
    },
}
