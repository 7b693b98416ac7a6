//! Headless demo player exercising the live-play client end to end: join a
//! session, wait for the admin to start it, answer questions with a random
//! strategy, and print the scored report.

use std::{env, sync::Arc};

use anyhow::Context;
use rand::Rng;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use bigbrain_play::{
    api::HttpBackend,
    config::ClientConfig,
    dto::question::Question,
    scoring::InMemoryMetaStore,
    services::player::{self, AnswerStrategy},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = ClientConfig::load();
    let base_url = env::var("BIGBRAIN_BASE_URL").unwrap_or_else(|_| config.base_url.clone());
    let session_id =
        env::var("BIGBRAIN_SESSION_ID").context("BIGBRAIN_SESSION_ID must be set")?;
    let name = env::var("BIGBRAIN_PLAYER_NAME").unwrap_or_else(|_| "headless-player".into());

    let backend = Arc::new(HttpBackend::new(&base_url).context("building backend client")?);
    let meta = Arc::new(InMemoryMetaStore::new());
    let session = player::join(backend, meta, config.player_settings(), &session_id, &name)
        .await
        .context("joining session")?;
    info!(player_id = session.player_id(), "waiting for the admin to start");

    let mut strategy = RandomStrategy;
    tokio::select! {
        report = session.run(&mut strategy) => {
            let report = report.context("playing session")?;
            for (index, question) in report.questions.iter().enumerate() {
                println!(
                    "Q{}: {} in {} -> {:.1} points",
                    index + 1,
                    if question.correct { "correct" } else { "wrong" },
                    question.time_taken_label(),
                    question.earned,
                );
            }
            println!("total score: {:.1}", report.total);
        }
        _ = shutdown_signal() => {
            info!("interrupted; leaving session");
        }
    }

    Ok(())
}

/// Clicks one random option at a random point inside the answer window.
struct RandomStrategy;

impl AnswerStrategy for RandomStrategy {
    fn pick(&mut self, question: &Question, selection: &[usize], remaining: u32) -> Option<usize> {
        if !selection.is_empty() || question.option_answers.is_empty() {
            return None;
        }
        let mut rng = rand::rng();
        // Hold off on roughly half the ticks so answers land at varied times.
        if remaining > 1 && rng.random_bool(0.5) {
            return None;
        }
        Some(rng.random_range(0..question.option_answers.len()))
    }
}

/// Configure tracing subscribers so logs include spans by default.
fn init_tracing() {
    let env_filter =
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Wait for Ctrl+C or SIGTERM and stop the player gracefully.
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        let mut term = signal(SignalKind::terminate()).expect("install SIGTERM handler");
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {},
            _ = term.recv() => {},
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
