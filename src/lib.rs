//! # PokeQuiz Engine
//!
//! Game-state engine for a "Who's that Pokemon?" quiz: one image, four
//! names, three tries per question, ten points per correct answer.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      POKEQUIZ ENGINE                         │
//! ├─────────────────────────────────────────────────────────────┤
//! │  config.rs       - Tunables, loaded from QUIZ_* env vars     │
//! │                                                              │
//! │  core/           - Framework-free primitives                 │
//! │  ├── observable.rs - Value holder, replay-latest subscribe   │
//! │  └── scheduler.rs  - Generation-stamped deferred actions     │
//! │                                                              │
//! │  game/           - Quiz logic (logical clock, no I/O)        │
//! │  ├── question.rs - Quiz entities and question source         │
//! │  ├── state.rs    - Phase, round state, snapshots             │
//! │  ├── engine.rs   - The state machine                         │
//! │  ├── messages.rs - Player-facing status text                 │
//! │  └── events.rs   - Transition log                            │
//! │                                                              │
//! │  runtime/        - Async (wall clock)                        │
//! │  └── driver.rs   - Single-writer engine task                 │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Timing
//!
//! The `game/` modules never read a clock. Deferred transitions
//! (advance after a correct answer, re-open after a wrong one) sit in a
//! queue on the engine's logical clock and fire when the caller advances
//! it. Each is stamped with the generation current at schedule time and
//! dropped if a new game or a new round has started since.
//!
//! ```
//! use std::time::Duration;
//! use pokequiz::{GameEngine, Phase};
//!
//! let mut engine = GameEngine::with_builtin();
//! engine.submit_answer("pikachu");
//! assert_eq!(engine.round().phase, Phase::Correct);
//!
//! engine.advance(Duration::from_secs(2));
//! assert_eq!(engine.round().phase, Phase::Playing);
//! assert_eq!(engine.round().current_index, 1);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod config;
pub mod core;
pub mod game;
pub mod runtime;

// Re-export commonly used types
pub use crate::config::{ConfigError, EngineConfig};
pub use crate::core::observable::{Observable, SubscriptionId};
pub use crate::core::scheduler::Generation;
pub use crate::game::engine::{GameEngine, Outputs};
pub use crate::game::question::{QuestionSource, QuizEntity, SourceError};
pub use crate::game::state::{EndReason, GameSnapshot, Phase, RoundState, SessionId};
pub use crate::runtime::driver::{spawn_engine, DriverError, EngineHandle};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Tries granted per question.
pub const DEFAULT_TRIES_PER_ROUND: u32 = 3;

/// Points per correct answer.
pub const POINTS_PER_CORRECT: u32 = 10;

/// Delay before moving on after a correct answer (ms).
pub const CORRECT_ADVANCE_DELAY_MS: u64 = 2000;

/// Delay before re-opening a round after a wrong answer (ms).
pub const WRONG_RESET_DELAY_MS: u64 = 1500;
