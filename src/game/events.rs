//! Game Events
//!
//! Record of every transition the engine makes, for logging and
//! inspection.

use std::time::Duration;
use serde::{Serialize, Deserialize};

use crate::core::scheduler::Generation;
use crate::game::state::{EndReason, SessionId};

/// Game event data.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEventData {
    /// A new session began.
    SessionStarted {
        /// Session identifier.
        session_id: SessionId,
        /// Questions available.
        question_count: usize,
        /// Deferred actions dropped from the previous session.
        cancelled: usize,
    },

    /// A round opened on an entity.
    RoundStarted {
        /// Cursor position.
        index: usize,
        /// Entity being asked.
        entity_id: u32,
    },

    /// Player picked the right name.
    AnswerCorrect {
        /// Entity answered.
        entity_id: u32,
        /// Score after the award.
        score: u32,
    },

    /// Player picked a wrong name.
    AnswerWrong {
        /// Entity answered.
        entity_id: u32,
        /// What the player picked.
        candidate: String,
        /// Tries left after the penalty.
        tries_remaining: u32,
    },

    /// Answer arrived while answers were not accepted.
    AnswerIgnored {
        /// What the player picked.
        candidate: String,
    },

    /// Input re-enabled after a wrong answer.
    WrongCleared,

    /// A deferred action fired after being superseded and was dropped.
    StaleActionDiscarded {
        /// Generation the action was stamped with.
        scheduled_generation: Generation,
    },

    /// Session ended.
    SessionEnded {
        /// Why it ended.
        reason: EndReason,
        /// Final score.
        score: u32,
    },
}

/// A game event with timing.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameEvent {
    /// Engine clock when the event occurred.
    pub at: Duration,

    /// Generation current when the event occurred.
    pub generation: Generation,

    /// Event data
    pub data: GameEventData,
}

impl GameEvent {
    /// Create a new event.
    pub fn new(at: Duration, generation: Generation, data: GameEventData) -> Self {
        Self { at, generation, data }
    }

    /// True for events that end a session.
    pub fn is_session_end(&self) -> bool {
        matches!(self.data, GameEventData::SessionEnded { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_session_end() {
        let ended = GameEvent::new(
            Duration::from_secs(2),
            3,
            GameEventData::SessionEnded { reason: EndReason::Completed, score: 50 },
        );
        assert!(ended.is_session_end());

        let cleared = GameEvent::new(Duration::ZERO, 1, GameEventData::WrongCleared);
        assert!(!cleared.is_session_end());
    }

    #[test]
    fn test_event_serializes() {
        let event = GameEvent::new(
            Duration::from_millis(1500),
            2,
            GameEventData::AnswerWrong {
                entity_id: 25,
                candidate: "raichu".to_string(),
                tries_remaining: 2,
            },
        );
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("AnswerWrong"));
        assert!(json.contains("raichu"));
    }
}
