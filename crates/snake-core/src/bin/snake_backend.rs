//! Bridge backend: serves a snake session over stdin/stdout.
//!
//! stdout carries responses only, logs go to stderr.

use std::io::{self, BufReader};
use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use snake_core::{rpc, GameSession, HighScores, SessionConfig};

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "snake_core=info".into()))
        .init();

    let web_root = std::env::var("SNAKE_WEB_ROOT")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("assets"));
    let seed = match std::env::var("SNAKE_SEED") {
        Ok(raw) => raw.parse().with_context(|| format!("SNAKE_SEED is not a number: {raw}"))?,
        Err(_) => rand::random(),
    };
    let scores = match std::env::var("SNAKE_SCORES_PATH") {
        Ok(path) => HighScores::open(&path).with_context(|| format!("failed to open score table {path}"))?,
        Err(_) => HighScores::in_memory(),
    };

    info!(web_root = %web_root.display(), seed, "snake backend listening on stdio");
    let mut session = GameSession::new(SessionConfig { web_root, seed }, scores);

    let stdin = io::stdin();
    let stdout = io::stdout();
    rpc::serve(&mut session, BufReader::new(stdin.lock()), stdout.lock()).context("bridge io failed")?;
    Ok(())
}
