//! Quiz Game Engine
//!
//! The state machine behind a quiz session. It takes two inputs
//! (`submit_answer`, `new_game`), mutates round state, and pushes every
//! change to its observable outputs.
//!
//! Time is logical: the engine never reads a clock. Callers move it
//! forward with [`GameEngine::advance`] / [`GameEngine::advance_to`], and
//! deferred transitions fire in deadline order as time passes. The async
//! driver in `runtime` maps wall time onto this clock.
//!
//! ## Generations
//!
//! Every deferred action is stamped with the generation current when it
//! was scheduled. `new_game` and loading the next round bump the
//! generation, so anything scheduled before that point is dropped when it
//! fires instead of overwriting newer state.

use std::collections::VecDeque;
use std::time::Duration;
use tracing::{debug, info};
use uuid::Uuid;

use crate::config::{ConfigError, EngineConfig};
use crate::core::observable::Observable;
use crate::core::scheduler::{DeferredQueue, Generation, Scheduled};
use crate::game::events::{GameEvent, GameEventData};
use crate::game::messages::{self, PROMPT};
use crate::game::question::{QuestionSource, QuizEntity};
use crate::game::state::{EndReason, GameSnapshot, Phase, RoundState, SessionId};

/// Events kept between drains. Oldest are dropped first.
pub const EVENT_LOG_CAPACITY: usize = 256;

/// Timed transitions the engine schedules for itself.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum DeferredAction {
    /// Move past a correctly answered question.
    AdvanceRound,
    /// Re-open the round after a wrong answer.
    ClearWrong,
}

// =============================================================================
// OUTPUTS
// =============================================================================

/// Observable outputs of the engine.
///
/// Values can be read and subscribed to; only the engine writes them.
/// Within one transition, fields are pushed in declaration order.
#[derive(Debug)]
pub struct Outputs {
    /// Entity being asked.
    pub current_entity: Observable<Option<QuizEntity>>,
    /// Session score.
    pub score: Observable<u32>,
    /// Tries left this round.
    pub tries_remaining: Observable<u32>,
    /// State-machine state.
    pub phase: Observable<Phase>,
    /// Status line.
    pub message: Observable<String>,
    /// True once the session has ended.
    pub session_over: Observable<bool>,
}

impl Outputs {
    fn from_round(round: &RoundState) -> Self {
        Self {
            current_entity: Observable::new(round.current_entity.clone()),
            score: Observable::new(round.score),
            tries_remaining: Observable::new(round.tries_remaining),
            phase: Observable::new(round.phase),
            message: Observable::new(round.message.clone()),
            session_over: Observable::new(round.session_over),
        }
    }

    fn publish(&mut self, round: &RoundState) {
        self.current_entity.set_if_changed(round.current_entity.clone());
        self.score.set_if_changed(round.score);
        self.tries_remaining.set_if_changed(round.tries_remaining);
        self.phase.set_if_changed(round.phase);
        self.message.set_if_changed(round.message.clone());
        self.session_over.set_if_changed(round.session_over);
    }
}

// =============================================================================
// ENGINE
// =============================================================================

/// Owns one quiz session at a time.
#[derive(Debug)]
pub struct GameEngine {
    source: QuestionSource,
    config: EngineConfig,
    round: RoundState,
    session_id: SessionId,
    generation: Generation,
    now: Duration,
    deferred: DeferredQueue<DeferredAction>,
    outputs: Outputs,
    events: VecDeque<GameEvent>,
}

impl GameEngine {
    /// Create an engine and start the first session.
    pub fn new(source: QuestionSource, config: EngineConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::build(source, config))
    }

    /// Engine over the built-in questions with default tuning.
    pub fn with_builtin() -> Self {
        Self::build(QuestionSource::builtin(), EngineConfig::default())
    }

    fn build(source: QuestionSource, config: EngineConfig) -> Self {
        let round = RoundState::new_session(config.tries_per_round);
        let outputs = Outputs::from_round(&round);

        let mut engine = Self {
            source,
            config,
            round,
            session_id: Uuid::nil(),
            generation: 0,
            now: Duration::ZERO,
            deferred: DeferredQueue::new(),
            outputs,
            events: VecDeque::with_capacity(EVENT_LOG_CAPACITY),
        };
        engine.new_game();
        engine
    }

    // -------------------------------------------------------------------------
    // Inputs
    // -------------------------------------------------------------------------

    /// Start a new session, cancelling anything pending from the last one.
    pub fn new_game(&mut self) {
        self.generation += 1;
        let cancelled = self.deferred.cancel_all();
        self.session_id = Uuid::new_v4();
        self.round = RoundState::new_session(self.config.tries_per_round);

        info!(
            session = %self.session_id,
            questions = self.source.len(),
            cancelled,
            "New session"
        );
        self.record(GameEventData::SessionStarted {
            session_id: self.session_id,
            question_count: self.source.len(),
            cancelled,
        });

        self.load_round();
        self.publish();
    }

    /// Evaluate an answer for the current round.
    ///
    /// Ignored unless the phase is `Playing` and an entity is loaded.
    pub fn submit_answer(&mut self, candidate: &str) {
        if !self.round.phase.accepts_answers() {
            debug!(phase = %self.round.phase, candidate, "Answer ignored");
            self.record(GameEventData::AnswerIgnored {
                candidate: candidate.to_string(),
            });
            return;
        }

        let Some(entity) = self.round.current_entity.as_ref() else {
            debug!(candidate, "Answer ignored, no entity loaded");
            self.record(GameEventData::AnswerIgnored {
                candidate: candidate.to_string(),
            });
            return;
        };
        let entity_id = entity.id;
        let display_name = entity.display_name();

        if entity.is_answer(candidate) {
            self.round.score = self.round.score.saturating_add(self.config.points_per_correct);
            self.round.phase = Phase::Correct;
            self.round.message = messages::correct(&display_name);
            self.schedule(self.config.correct_delay, DeferredAction::AdvanceRound);

            debug!(entity_id, score = self.round.score, "Correct answer");
            self.record(GameEventData::AnswerCorrect {
                entity_id,
                score: self.round.score,
            });
        } else {
            let tries = self.round.tries_remaining.saturating_sub(1);
            self.round.tries_remaining = tries;

            debug!(entity_id, candidate, tries, "Wrong answer");
            self.record(GameEventData::AnswerWrong {
                entity_id,
                candidate: candidate.to_string(),
                tries_remaining: tries,
            });

            if tries == 0 {
                self.round.message = messages::out_of_tries(&display_name);
                self.end_session(EndReason::OutOfTries);
            } else {
                self.round.phase = Phase::Wrong;
                self.round.message = messages::wrong(tries);
                self.schedule(self.config.wrong_delay, DeferredAction::ClearWrong);
            }
        }

        self.publish();
    }

    // -------------------------------------------------------------------------
    // Time
    // -------------------------------------------------------------------------

    /// Move the clock forward by `elapsed`, firing whatever falls due.
    pub fn advance(&mut self, elapsed: Duration) {
        self.advance_to(self.now.saturating_add(elapsed));
    }

    /// Move the clock to `target`, firing due actions in deadline order.
    ///
    /// A target in the past leaves the clock where it is.
    pub fn advance_to(&mut self, target: Duration) {
        while let Some(entry) = self.deferred.pop_due(target) {
            self.now = self.now.max(entry.due);
            self.fire(entry);
        }
        self.now = self.now.max(target);
    }

    /// Earliest pending deadline on the engine clock.
    pub fn next_deadline(&self) -> Option<Duration> {
        self.deferred.next_due()
    }

    /// Current engine clock.
    pub fn now(&self) -> Duration {
        self.now
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    /// Current round state.
    pub fn round(&self) -> &RoundState {
        &self.round
    }

    /// Read-only view of the outputs.
    pub fn outputs(&self) -> &Outputs {
        &self.outputs
    }

    /// Outputs, for subscribing.
    pub fn outputs_mut(&mut self) -> &mut Outputs {
        &mut self.outputs
    }

    /// Point-in-time copy of all outputs.
    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot {
            session_id: self.session_id,
            generation: self.generation,
            round: self.round.clone(),
        }
    }

    /// Current session.
    pub fn session_id(&self) -> SessionId {
        self.session_id
    }

    /// Current generation.
    pub fn generation(&self) -> Generation {
        self.generation
    }

    /// Deferred actions still pending.
    pub fn pending_actions(&self) -> usize {
        self.deferred.len()
    }

    /// Question source.
    pub fn source(&self) -> &QuestionSource {
        &self.source
    }

    /// Engine configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Take the events recorded since the last drain, oldest first.
    ///
    /// At most [`EVENT_LOG_CAPACITY`] are kept; older ones are dropped.
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        self.events.drain(..).collect()
    }

    // -------------------------------------------------------------------------
    // Internals
    // -------------------------------------------------------------------------

    fn schedule(&mut self, delay: Duration, action: DeferredAction) {
        let due = self.now.saturating_add(delay);
        self.deferred.schedule(due, self.generation, action);
    }

    fn fire(&mut self, entry: Scheduled<DeferredAction>) {
        if entry.generation != self.generation {
            debug!(
                action = ?entry.action,
                scheduled = entry.generation,
                current = self.generation,
                "Discarding stale deferred action"
            );
            self.record(GameEventData::StaleActionDiscarded {
                scheduled_generation: entry.generation,
            });
            return;
        }

        match entry.action {
            DeferredAction::AdvanceRound => {
                if self.round.phase != Phase::Correct {
                    return;
                }
                self.generation += 1;
                self.round.current_index += 1;
                self.load_round();
            }
            DeferredAction::ClearWrong => {
                if self.round.phase != Phase::Wrong || self.round.tries_remaining == 0 {
                    return;
                }
                self.round.phase = Phase::Playing;
                self.round.message = PROMPT.to_string();
                debug!(tries = self.round.tries_remaining, "Round re-opened");
                self.record(GameEventData::WrongCleared);
            }
        }

        self.publish();
    }

    /// Load the entity at the cursor, or end the session if there is none.
    fn load_round(&mut self) {
        match self.source.get(self.round.current_index) {
            Some(entity) => {
                let entity_id = entity.id;
                self.round.current_entity = Some(entity.clone());
                self.round.tries_remaining = self.config.tries_per_round;
                self.round.phase = Phase::Playing;
                self.round.message = PROMPT.to_string();

                debug!(index = self.round.current_index, entity_id, "Round started");
                self.record(GameEventData::RoundStarted {
                    index: self.round.current_index,
                    entity_id,
                });
            }
            None => {
                self.round.message = messages::complete(self.round.score);
                let reason = if self.source.is_empty() {
                    EndReason::EmptySource
                } else {
                    EndReason::Completed
                };
                self.end_session(reason);
            }
        }
    }

    fn end_session(&mut self, reason: EndReason) {
        self.round.current_entity = None;
        self.round.phase = Phase::GameOver;
        self.round.session_over = true;

        info!(
            session = %self.session_id,
            ?reason,
            score = self.round.score,
            "Session ended"
        );
        self.record(GameEventData::SessionEnded {
            reason,
            score: self.round.score,
        });
    }

    fn publish(&mut self) {
        #[cfg(feature = "debug-tracing")]
        tracing::trace!(snapshot = ?self.snapshot(), "Publishing outputs");

        self.outputs.publish(&self.round);
    }

    fn record(&mut self, data: GameEventData) {
        if self.events.len() == EVENT_LOG_CAPACITY {
            self.events.pop_front();
        }
        self.events.push_back(GameEvent::new(self.now, self.generation, data));
    }
}

impl Default for GameEngine {
    fn default() -> Self {
        Self::with_builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    const CORRECT_DELAY: Duration = Duration::from_millis(2000);
    const WRONG_DELAY: Duration = Duration::from_millis(1500);

    fn pikachu() -> QuizEntity {
        QuizEntity::new(25, "pikachu", "https://img/25.png", ["pikachu", "raichu", "pichu", "voltorb"])
    }

    fn mewtwo() -> QuizEntity {
        QuizEntity::new(150, "mewtwo", "https://img/150.png", ["mewtwo", "mew", "alakazam", "hypno"])
    }

    fn engine_with(entities: Vec<QuizEntity>) -> GameEngine {
        GameEngine::new(QuestionSource::new(entities), EngineConfig::default()).unwrap()
    }

    #[test]
    fn test_new_engine_starts_session() {
        let engine = engine_with(vec![pikachu()]);
        let round = engine.round();

        assert_eq!(round.phase, Phase::Playing);
        assert_eq!(round.score, 0);
        assert_eq!(round.tries_remaining, 3);
        assert_eq!(round.current_index, 0);
        assert_eq!(round.current_entity, Some(pikachu()));
        assert_eq!(round.message, "Who's that Pokemon?");
        assert!(!round.session_over);
    }

    #[test]
    fn test_single_question_scenario() {
        let mut engine = engine_with(vec![pikachu()]);

        engine.submit_answer("raichu");
        assert_eq!(engine.round().tries_remaining, 2);
        assert_eq!(engine.round().phase, Phase::Wrong);
        assert_eq!(engine.round().message, "Wrong! 2 tries left");

        engine.advance(WRONG_DELAY);
        assert_eq!(engine.round().phase, Phase::Playing);
        assert_eq!(engine.round().message, PROMPT);

        engine.submit_answer("pikachu");
        assert_eq!(engine.round().score, 10);
        assert_eq!(engine.round().phase, Phase::Correct);
        assert_eq!(engine.round().message, "Correct! It's Pikachu!");

        engine.advance(CORRECT_DELAY);
        assert_eq!(engine.round().phase, Phase::GameOver);
        assert_eq!(engine.round().message, "Game Complete! Final Score: 10");
        assert!(engine.round().session_over);
        assert!(engine.round().current_entity.is_none());
    }

    #[test]
    fn test_answer_while_wrong_is_ignored() {
        let mut engine = engine_with(vec![pikachu()]);

        engine.submit_answer("raichu");
        engine.submit_answer("pikachu");

        assert_eq!(engine.round().score, 0);
        assert_eq!(engine.round().phase, Phase::Wrong);
        assert_eq!(engine.round().tries_remaining, 2);
    }

    #[test]
    fn test_three_wrong_answers_end_session() {
        let mut engine = engine_with(vec![pikachu(), mewtwo()]);

        engine.submit_answer("raichu");
        assert_eq!(engine.round().tries_remaining, 2);
        engine.advance(WRONG_DELAY);

        engine.submit_answer("pichu");
        assert_eq!(engine.round().tries_remaining, 1);
        assert_eq!(engine.round().message, "Wrong! 1 tries left");
        engine.advance(WRONG_DELAY);

        engine.submit_answer("voltorb");
        let round = engine.round();
        assert_eq!(round.tries_remaining, 0);
        assert_eq!(round.phase, Phase::GameOver);
        assert_eq!(round.message, "Game Over! It was Pikachu");
        assert!(round.session_over);
        assert!(round.current_entity.is_none());
        assert_eq!(round.current_index, 0);
        assert_eq!(engine.pending_actions(), 0);

        // No skip to the next question.
        engine.advance(Duration::from_secs(10));
        assert_eq!(engine.round().current_index, 0);
        assert_eq!(engine.round().phase, Phase::GameOver);
    }

    #[test]
    fn test_correct_advances_to_next_round() {
        let mut engine = engine_with(vec![pikachu(), mewtwo()]);

        engine.submit_answer("raichu");
        engine.advance(WRONG_DELAY);
        engine.submit_answer("PIKACHU");
        assert_eq!(engine.round().phase, Phase::Correct);

        engine.advance(Duration::from_millis(1999));
        assert_eq!(engine.round().phase, Phase::Correct);
        assert_eq!(engine.round().current_index, 0);

        engine.advance(Duration::from_millis(1));
        let round = engine.round();
        assert_eq!(round.current_index, 1);
        assert_eq!(round.current_entity, Some(mewtwo()));
        assert_eq!(round.tries_remaining, 3);
        assert_eq!(round.phase, Phase::Playing);
        assert_eq!(round.message, PROMPT);
        assert_eq!(round.score, 10);
    }

    #[test]
    fn test_full_builtin_run() {
        let mut engine = GameEngine::with_builtin();
        let answers: Vec<String> = engine.source().iter().map(|e| e.name.clone()).collect();

        for answer in &answers {
            engine.submit_answer(answer);
            engine.advance(CORRECT_DELAY);
        }

        assert_eq!(engine.round().phase, Phase::GameOver);
        assert_eq!(engine.round().score, 50);
        assert_eq!(engine.round().message, "Game Complete! Final Score: 50");
    }

    #[test]
    fn test_new_game_after_wrong_is_stable() {
        let mut engine = engine_with(vec![pikachu(), mewtwo()]);

        engine.submit_answer("raichu");
        let stale_generation = engine.generation();
        engine.new_game();
        assert_ne!(engine.generation(), stale_generation);
        assert_eq!(engine.pending_actions(), 0);
        assert_eq!(engine.round().phase, Phase::Playing);
        assert_eq!(engine.round().tries_remaining, 3);

        engine.submit_answer("raichu");
        engine.advance(Duration::from_millis(1000));
        assert_eq!(engine.round().phase, Phase::Wrong);

        engine.advance(Duration::from_millis(500));
        assert_eq!(engine.round().phase, Phase::Playing);
        assert_eq!(engine.round().tries_remaining, 2);
    }

    #[test]
    fn test_new_game_during_correct_cancels_advance() {
        let mut engine = engine_with(vec![pikachu(), mewtwo()]);

        engine.submit_answer("pikachu");
        engine.new_game();
        engine.advance(CORRECT_DELAY);

        let round = engine.round();
        assert_eq!(round.current_index, 0);
        assert_eq!(round.score, 0);
        assert_eq!(round.phase, Phase::Playing);
    }

    #[test]
    fn test_stale_action_is_discarded() {
        let mut engine = engine_with(vec![pikachu()]);
        engine.drain_events();

        // Inject an action stamped with an old generation.
        let stale = engine.generation() - 1;
        engine.deferred.schedule(Duration::from_millis(10), stale, DeferredAction::ClearWrong);
        engine.submit_answer("raichu");

        engine.advance(Duration::from_millis(10));
        assert_eq!(engine.round().phase, Phase::Wrong);

        let discarded = engine
            .drain_events()
            .into_iter()
            .any(|e| e.data == GameEventData::StaleActionDiscarded { scheduled_generation: stale });
        assert!(discarded);
    }

    #[test]
    fn test_empty_source_is_game_over() {
        let mut engine = engine_with(Vec::new());

        let round = engine.round();
        assert_eq!(round.phase, Phase::GameOver);
        assert_eq!(round.score, 0);
        assert!(round.session_over);
        assert!(round.current_entity.is_none());
        assert_eq!(round.message, "Game Complete! Final Score: 0");

        engine.submit_answer("pikachu");
        assert_eq!(engine.round().phase, Phase::GameOver);

        engine.new_game();
        assert_eq!(engine.round().phase, Phase::GameOver);
        let ended = engine.drain_events().into_iter().any(|e| {
            e.data == GameEventData::SessionEnded { reason: EndReason::EmptySource, score: 0 }
        });
        assert!(ended);
    }

    #[test]
    fn test_new_game_resets_finished_session() {
        let mut engine = engine_with(vec![pikachu()]);
        engine.submit_answer("pikachu");
        engine.advance(CORRECT_DELAY);
        assert!(engine.round().session_over);

        let old_session = engine.session_id();
        engine.new_game();

        let round = engine.round();
        assert_ne!(engine.session_id(), old_session);
        assert_eq!(round.score, 0);
        assert_eq!(round.tries_remaining, 3);
        assert_eq!(round.phase, Phase::Playing);
        assert!(!round.session_over);
        assert_eq!(round.current_entity, Some(pikachu()));
    }

    #[test]
    fn test_unanswerable_entity_never_scores() {
        let broken = QuizEntity::new(1, "missingno", "", ["a", "b", "c", "d"]);
        let mut engine = engine_with(vec![broken]);

        for option in ["a", "b", "c"] {
            engine.submit_answer(option);
            engine.advance(WRONG_DELAY);
        }

        assert_eq!(engine.round().score, 0);
        assert_eq!(engine.round().phase, Phase::GameOver);
        assert_eq!(engine.round().message, "Game Over! It was Missingno");
    }

    #[test]
    fn test_outputs_replay_and_push() {
        let mut engine = engine_with(vec![pikachu()]);
        let phases = Arc::new(Mutex::new(Vec::new()));
        let sink = phases.clone();
        engine
            .outputs_mut()
            .phase
            .subscribe(move |phase| sink.lock().unwrap().push(*phase));

        engine.submit_answer("raichu");
        engine.advance(WRONG_DELAY);
        engine.submit_answer("pikachu");
        engine.advance(CORRECT_DELAY);

        assert_eq!(
            *phases.lock().unwrap(),
            vec![Phase::Playing, Phase::Wrong, Phase::Playing, Phase::Correct, Phase::GameOver]
        );
        assert_eq!(*engine.outputs().score.get(), 10);
        assert!(*engine.outputs().session_over.get());
    }

    #[test]
    fn test_outputs_match_snapshot() {
        let mut engine = engine_with(vec![pikachu(), mewtwo()]);
        engine.submit_answer("pichu");

        let snapshot = engine.snapshot();
        let outputs = engine.outputs();
        assert_eq!(outputs.current_entity.get(), &snapshot.round.current_entity);
        assert_eq!(*outputs.tries_remaining.get(), snapshot.round.tries_remaining);
        assert_eq!(*outputs.phase.get(), snapshot.round.phase);
        assert_eq!(outputs.message.get(), &snapshot.round.message);
        assert_eq!(snapshot.session_id, engine.session_id());
    }

    #[test]
    fn test_zero_tries_config_rejected() {
        let config = EngineConfig {
            tries_per_round: 0,
            ..EngineConfig::default()
        };
        let result = GameEngine::new(QuestionSource::new(vec![pikachu()]), config);
        assert!(matches!(result, Err(ConfigError::Invalid { key: "QUIZ_TRIES_PER_ROUND", .. })));
    }

    #[test]
    fn test_zero_points_config_rejected() {
        let config = EngineConfig {
            points_per_correct: 0,
            ..EngineConfig::default()
        };
        let result = GameEngine::new(QuestionSource::new(vec![pikachu()]), config);
        assert!(matches!(result, Err(ConfigError::Invalid { key: "QUIZ_POINTS_PER_CORRECT", .. })));
    }

    #[test]
    fn test_event_log_is_bounded() {
        let mut engine = engine_with(vec![pikachu()]);
        engine.submit_answer("pikachu");

        for _ in 0..10_000 {
            engine.submit_answer("x");
        }
        assert_eq!(engine.events.len(), EVENT_LOG_CAPACITY);

        let events = engine.drain_events();
        assert_eq!(events.len(), EVENT_LOG_CAPACITY);
        assert!(events
            .iter()
            .all(|e| e.data == GameEventData::AnswerIgnored { candidate: "x".to_string() }));
        assert!(engine.drain_events().is_empty());
    }

    #[test]
    fn test_advance_to_past_keeps_clock() {
        let mut engine = engine_with(vec![pikachu()]);
        engine.advance(Duration::from_secs(5));
        engine.advance_to(Duration::from_secs(1));
        assert_eq!(engine.now(), Duration::from_secs(5));
    }

    #[test]
    fn test_custom_config() {
        let config = EngineConfig {
            tries_per_round: 1,
            points_per_correct: 25,
            correct_delay: Duration::from_millis(100),
            wrong_delay: Duration::from_millis(100),
        };
        let mut engine =
            GameEngine::new(QuestionSource::new(vec![pikachu(), mewtwo()]), config).unwrap();

        engine.submit_answer("pikachu");
        assert_eq!(engine.next_deadline(), Some(Duration::from_millis(100)));
        engine.advance(Duration::from_millis(100));
        assert_eq!(engine.round().score, 25);
        assert_eq!(engine.round().tries_remaining, 1);

        engine.submit_answer("mew");
        assert_eq!(engine.round().phase, Phase::GameOver);
        assert_eq!(engine.round().message, "Game Over! It was Mewtwo");
    }
}
