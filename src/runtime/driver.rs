//! Async Engine Driver
//!
//! Runs a [`GameEngine`] on its own tokio task. That task is the only
//! writer: inputs arrive over a channel and deferred transitions fire
//! when the engine's next deadline passes on the tokio clock.
//! Snapshots go out on a `watch` channel, so a new subscriber sees the
//! latest state immediately.

use std::future;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};
use tracing::{debug, info, instrument, warn};

use crate::game::engine::GameEngine;
use crate::game::events::{GameEvent, GameEventData};
use crate::game::state::GameSnapshot;

/// Command queue depth.
const COMMAND_BUFFER: usize = 64;

/// Messages from handles to the engine task.
#[derive(Debug)]
enum Command {
    SubmitAnswer(String),
    NewGame,
    Snapshot(oneshot::Sender<GameSnapshot>),
    Shutdown,
}

/// Driver errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DriverError {
    /// The engine task has stopped.
    #[error("engine task is closed")]
    Closed,

    /// The engine task dropped a reply.
    #[error("engine task dropped the reply")]
    ReplyDropped,
}

/// Cloneable handle to a running engine.
#[derive(Clone, Debug)]
pub struct EngineHandle {
    commands: mpsc::Sender<Command>,
    snapshots: watch::Receiver<GameSnapshot>,
}

impl EngineHandle {
    /// Submit an answer. Returns once the task has queued it.
    pub async fn submit_answer(&self, candidate: impl Into<String>) -> Result<(), DriverError> {
        self.send(Command::SubmitAnswer(candidate.into())).await
    }

    /// Start a new session.
    pub async fn new_game(&self) -> Result<(), DriverError> {
        self.send(Command::NewGame).await
    }

    /// Snapshot taken after every previously sent command was applied.
    pub async fn snapshot(&self) -> Result<GameSnapshot, DriverError> {
        let (tx, rx) = oneshot::channel();
        self.send(Command::Snapshot(tx)).await?;
        rx.await.map_err(|_| DriverError::ReplyDropped)
    }

    /// Subscribe to snapshots. The receiver holds the latest one already.
    pub fn watch(&self) -> watch::Receiver<GameSnapshot> {
        self.snapshots.clone()
    }

    /// Ask the task to stop. The engine is returned through its join handle.
    pub async fn shutdown(&self) -> Result<(), DriverError> {
        self.send(Command::Shutdown).await
    }

    async fn send(&self, command: Command) -> Result<(), DriverError> {
        self.commands
            .send(command)
            .await
            .map_err(|_| DriverError::Closed)
    }
}

/// Spawn `engine` onto the current tokio runtime.
///
/// The task ends on [`EngineHandle::shutdown`] or when every handle is
/// dropped, and yields the engine back.
pub fn spawn_engine(engine: GameEngine) -> (EngineHandle, JoinHandle<GameEngine>) {
    let (command_tx, command_rx) = mpsc::channel(COMMAND_BUFFER);
    let (snapshot_tx, snapshot_rx) = watch::channel(engine.snapshot());

    let task = tokio::spawn(run_engine(engine, command_rx, snapshot_tx));

    let handle = EngineHandle {
        commands: command_tx,
        snapshots: snapshot_rx,
    };
    (handle, task)
}

#[instrument(skip_all, fields(session = %engine.session_id()))]
async fn run_engine(
    mut engine: GameEngine,
    mut commands: mpsc::Receiver<Command>,
    snapshots: watch::Sender<GameSnapshot>,
) -> GameEngine {
    // Engine time zero on the tokio clock.
    let epoch = Instant::now()
        .checked_sub(engine.now())
        .unwrap_or_else(Instant::now);

    info!("Engine task started");

    loop {
        let deadline = engine.next_deadline().map(|due| epoch + due);

        tokio::select! {
            command = commands.recv() => {
                // Timers that are already due go first.
                engine.advance_to(Instant::now().saturating_duration_since(epoch));

                match command {
                    Some(Command::SubmitAnswer(candidate)) => engine.submit_answer(&candidate),
                    Some(Command::NewGame) => engine.new_game(),
                    Some(Command::Snapshot(reply)) => {
                        let _ = reply.send(engine.snapshot());
                    }
                    Some(Command::Shutdown) | None => break,
                }
            }
            _ = wait_until(deadline) => {
                engine.advance_to(Instant::now().saturating_duration_since(epoch));
            }
        }

        for event in engine.drain_events() {
            log_event(&event);
        }

        let snapshot = engine.snapshot();
        snapshots.send_if_modified(|current| {
            if *current == snapshot {
                false
            } else {
                *current = snapshot;
                true
            }
        });
    }

    info!("Engine task stopped");
    engine
}

async fn wait_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => sleep_until(deadline).await,
        None => future::pending().await,
    }
}

fn log_event(event: &GameEvent) {
    match &event.data {
        GameEventData::StaleActionDiscarded { scheduled_generation } => {
            warn!(
                at_ms = event.at.as_millis() as u64,
                scheduled_generation,
                generation = event.generation,
                "Stale deferred action dropped"
            );
        }
        data => {
            debug!(at_ms = event.at.as_millis() as u64, generation = event.generation, ?data, "Game event");
        }
    }
}
