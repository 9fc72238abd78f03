//! Game State Definitions
//!
//! Round and session state owned by the engine, plus the snapshot
//! type handed to observers.

use std::fmt;
use serde::{Serialize, Deserialize};
use uuid::Uuid;

use crate::core::scheduler::Generation;
use crate::game::messages::PROMPT;
use crate::game::question::QuizEntity;

/// Unique session identifier.
pub type SessionId = Uuid;

// =============================================================================
// PHASE
// =============================================================================

/// State-machine state of the engine.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Round open, answers accepted.
    #[default]
    Playing,
    /// Answered correctly, next round pending.
    Correct,
    /// Answered wrong, input re-enabled shortly.
    Wrong,
    /// Session over. Terminal until a new game.
    GameOver,
}

impl Phase {
    /// True for every phase except `GameOver`.
    #[inline]
    pub fn is_live(self) -> bool {
        self != Phase::GameOver
    }

    /// True only while answers are accepted.
    #[inline]
    pub fn accepts_answers(self) -> bool {
        self == Phase::Playing
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Playing => "playing",
            Phase::Correct => "correct",
            Phase::Wrong => "wrong",
            Phase::GameOver => "game_over",
        };
        f.write_str(name)
    }
}

// =============================================================================
// END REASON
// =============================================================================

/// Why a session ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndReason {
    /// Every question was played.
    Completed,
    /// Last try spent on a question.
    OutOfTries,
    /// The question source had nothing to ask.
    EmptySource,
}

// =============================================================================
// ROUND STATE
// =============================================================================

/// Mutable round/session state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundState {
    /// Cursor into the question source.
    pub current_index: usize,
    /// Entity at the cursor; `None` once the cursor passes the end.
    pub current_entity: Option<QuizEntity>,
    /// Tries left this round.
    pub tries_remaining: u32,
    /// Session score.
    pub score: u32,
    /// State-machine state.
    pub phase: Phase,
    /// Status line for the player.
    pub message: String,
    /// True once the session has ended.
    pub session_over: bool,
}

impl RoundState {
    /// Fresh session state, before the first entity is loaded.
    pub fn new_session(tries_per_round: u32) -> Self {
        Self {
            current_index: 0,
            current_entity: None,
            tries_remaining: tries_per_round,
            score: 0,
            phase: Phase::Playing,
            message: PROMPT.to_string(),
            session_over: false,
        }
    }
}

// =============================================================================
// SNAPSHOT
// =============================================================================

/// Point-in-time copy of everything the engine exposes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSnapshot {
    /// Current session.
    pub session_id: SessionId,
    /// Current generation.
    pub generation: Generation,
    /// Round state.
    #[serde(flatten)]
    pub round: RoundState,
}
