//! PokeQuiz Demo
//!
//! Plays one session against the engine with a scripted player that
//! guesses at random among the options it has not tried yet.
//!
//! Usage: `pokequiz [questions.json]`. Without a file the built-in
//! question set is used. Timings come from `QUIZ_*` environment
//! variables (see `EngineConfig::from_env`).

use anyhow::Context;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use pokequiz::{
    spawn_engine, EngineConfig, GameEngine, Phase, QuestionSource, VERSION,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    info!("PokeQuiz engine v{}", VERSION);

    let config = EngineConfig::from_env().context("invalid QUIZ_* configuration")?;
    let source = match std::env::args().nth(1) {
        Some(path) => QuestionSource::from_path(&path)
            .with_context(|| format!("failed to load questions from {}", path))?,
        None => QuestionSource::builtin(),
    };

    info!(
        questions = source.len(),
        tries = config.tries_per_round,
        correct_delay_ms = config.correct_delay.as_millis() as u64,
        wrong_delay_ms = config.wrong_delay.as_millis() as u64,
        "Starting demo session"
    );

    let engine = GameEngine::new(source, config).context("invalid engine configuration")?;
    let (handle, task) = spawn_engine(engine);

    play(&handle).await?;

    handle.shutdown().await?;
    let engine = task.await.context("engine task panicked")?;

    let round = engine.round();
    info!(score = round.score, message = %round.message, "=== Session Over ===");
    Ok(())
}

/// Answer every open round until the session ends.
async fn play(handle: &pokequiz::EngineHandle) -> anyhow::Result<()> {
    let mut rng = StdRng::from_entropy();
    let mut snapshots = handle.watch();
    let mut tried: Vec<String> = Vec::new();
    let mut tried_index = None;

    loop {
        let snapshot = snapshots.borrow_and_update().clone();
        let round = &snapshot.round;

        info!(
            phase = %round.phase,
            score = round.score,
            tries = round.tries_remaining,
            "{}",
            round.message
        );

        if round.session_over {
            return Ok(());
        }

        if round.phase == Phase::Playing {
            if let Some(entity) = &round.current_entity {
                if tried_index != Some(round.current_index) {
                    tried.clear();
                    tried_index = Some(round.current_index);
                    info!(id = entity.id, image = %entity.image_ref, "New question");
                }

                let remaining: Vec<&String> = entity
                    .options
                    .iter()
                    .filter(|option| !tried.contains(option))
                    .collect();
                let guess = remaining
                    .choose(&mut rng)
                    .copied()
                    .or_else(|| entity.options.first())
                    .cloned()
                    .with_context(|| format!("question {} has no options", entity.id))?;

                info!(guess = %guess, "Player answers");
                tried.push(guess.clone());
                handle.submit_answer(guess).await?;
            }
        }

        snapshots
            .changed()
            .await
            .context("engine task stopped before the session ended")?;
    }
}
