//! Game Logic Module
//!
//! Quiz state machine and its data. Runs on a logical clock.
//!
//! ## Module Structure
//!
//! - `question`: Quiz entities and the question source
//! - `state`: Phase, round state, snapshots
//! - `engine`: The state machine
//! - `messages`: Player-facing status text
//! - `events`: Transition log

pub mod question;
pub mod state;
pub mod engine;
pub mod messages;
pub mod events;

// Re-export key types
pub use question::{QuestionSource, QuizEntity, SourceError, OPTION_COUNT};
pub use state::{Phase, RoundState, GameSnapshot, EndReason, SessionId};
pub use engine::{GameEngine, Outputs, EVENT_LOG_CAPACITY};
pub use events::{GameEvent, GameEventData};
