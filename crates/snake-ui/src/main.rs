//! Snake canvas client.
//!
//! Module layout:
//! - bridge: request/response calls to the backend (in-process or child process)
//! - config: static JSON assets and environment settings
//! - input: key translation
//! - render: layer building and rasterization onto a canvas
//! - poll: fixed-interval poll timer
//! - app: client state and the eframe window

mod app;
mod bridge;
mod config;
mod error;
mod input;
mod panels;
mod poll;
mod render;

use anyhow::{Context, Result};
use eframe::egui;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use snake_core::{GameSession, HighScores, SessionConfig};

use crate::app::{GameClient, SnakeApp};
use crate::bridge::{LocalBridge, ProcessBridge, SnakeBridge};
use crate::config::UiSettings;

fn open_bridge(settings: &UiSettings) -> Result<Box<dyn SnakeBridge>> {
    if let Some(path) = &settings.backend {
        let mut envs = vec![("SNAKE_WEB_ROOT", settings.web_root.to_string_lossy().into_owned())];
        if let Some(scores) = &settings.scores_path {
            envs.push(("SNAKE_SCORES_PATH", scores.to_string_lossy().into_owned()));
        }
        let bridge = ProcessBridge::spawn(path, &envs)?;
        return Ok(Box::new(bridge));
    }

    let scores = match &settings.scores_path {
        Some(path) => HighScores::open(path)
            .with_context(|| format!("failed to open score table {}", path.display()))?,
        None => HighScores::in_memory(),
    };
    let session = GameSession::new(
        SessionConfig {
            web_root: settings.web_root.clone(),
            seed: rand::random(),
        },
        scores,
    );
    info!("running backend in-process");
    Ok(Box::new(LocalBridge::new(session)))
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "snake_ui=info,snake_core=info".into()),
        )
        .init();

    let settings = UiSettings::from_env()?;
    info!(?settings, "starting snake ui");
    let client = GameClient::new(open_bridge(&settings)?, &settings);

    let [canvas_w, canvas_h] = settings.canvas_px;
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([canvas_w + 40.0, canvas_h + 320.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Snake",
        options,
        Box::new(|_| Ok(Box::new(SnakeApp::new(client)))),
    )
    .map_err(|err| anyhow::anyhow!("eframe run failed: {err}"))
}
