use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use snake_core::Attributes;

use crate::bridge::SnakeBridge;
use crate::error::ConfigError;

pub const CANVAS_ID: &str = "snake-game-canvas";
pub const CANVAS_FILE: [&str; 2] = ["json", "canvas.json"];
pub const ATTRIBUTES_FILE: [&str; 2] = ["json", "attributes.json"];
pub const GRID_ENTRY: &str = "grid";

pub const DEFAULT_POLL_MS: u64 = 100;
pub const CANVAS_WIDTH_PX: f32 = 720.0;
pub const CANVAS_HEIGHT_PX: f32 = 480.0;

/// Resolve a static asset through the bridge, then read and decode it.
pub fn parse_json<T: DeserializeOwned>(
    bridge: &mut dyn SnakeBridge,
    parts: &[&str],
) -> Result<T, ConfigError> {
    let path = bridge.path_conjoin(parts)?;
    let raw = fs::read_to_string(&path).map_err(|source| ConfigError::Read {
        path: path.clone(),
        source,
    })?;
    debug!(path = %path.display(), "loaded json asset");
    serde_json::from_str(&raw).map_err(|source| ConfigError::Parse { path, source })
}

#[derive(Debug, Clone, Deserialize)]
pub struct CanvasEntry {
    pub width: usize,
}

/// `canvas.json`: board width in cells, keyed by canvas id.
#[derive(Debug, Clone, Deserialize)]
pub struct CanvasConfig {
    pub name: BTreeMap<String, CanvasEntry>,
}

impl CanvasConfig {
    pub fn board_width(&self) -> Result<usize, ConfigError> {
        let entry = self
            .name
            .get(CANVAS_ID)
            .ok_or_else(|| ConfigError::MissingCanvas(CANVAS_ID.to_string()))?;
        if entry.width == 0 {
            return Err(ConfigError::ZeroWidth);
        }
        Ok(entry.width)
    }
}

/// Rows that keep cells square on a canvas of the given pixel size.
pub fn board_height(width: usize, canvas_w: f32, canvas_h: f32) -> usize {
    let rows = (width as f32 * canvas_h / canvas_w.max(1.0)).round();
    (rows as usize).max(1)
}

/// `attributes.json`: drawing attributes keyed by object name.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AttributeConfig {
    pub name: BTreeMap<String, Attributes>,
}

impl AttributeConfig {
    pub fn entry(&self, name: &str) -> Option<&Attributes> {
        self.name.get(name)
    }

    pub fn grid_colour(&self) -> Option<&str> {
        self.entry(GRID_ENTRY)?.get("colour").and_then(Value::as_str)
    }
}

#[derive(Debug, Clone)]
pub struct UiSettings {
    /// Backend binary; `None` runs the session in-process.
    pub backend: Option<PathBuf>,
    pub web_root: PathBuf,
    pub scores_path: Option<PathBuf>,
    pub poll_interval: Duration,
    pub canvas_px: [f32; 2],
}

impl Default for UiSettings {
    fn default() -> Self {
        Self {
            backend: None,
            web_root: PathBuf::from("assets"),
            scores_path: None,
            poll_interval: Duration::from_millis(DEFAULT_POLL_MS),
            canvas_px: [CANVAS_WIDTH_PX, CANVAS_HEIGHT_PX],
        }
    }
}

impl UiSettings {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut settings = Self::default();
        if let Some(path) = lookup("SNAKE_BACKEND").filter(|v| !v.is_empty()) {
            settings.backend = Some(PathBuf::from(path));
        }
        if let Some(root) = lookup("SNAKE_WEB_ROOT") {
            settings.web_root = PathBuf::from(root);
        }
        settings.scores_path = lookup("SNAKE_SCORES_PATH").map(PathBuf::from);
        if let Some(raw) = lookup("SNAKE_POLL_MS") {
            let ms = raw
                .parse::<u64>()
                .ok()
                .filter(|ms| *ms > 0)
                .ok_or(ConfigError::InvalidEnv {
                    name: "SNAKE_POLL_MS",
                    value: raw.clone(),
                })?;
            settings.poll_interval = Duration::from_millis(ms);
        }
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use snake_core::{GameSession, HighScores, SessionConfig};

    use super::*;
    use crate::bridge::LocalBridge;

    fn bridge_at(root: PathBuf) -> LocalBridge {
        LocalBridge::new(GameSession::new(
            SessionConfig { web_root: root, seed: 1 },
            HighScores::in_memory(),
        ))
    }

    #[test]
    fn loads_canvas_through_bridge() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("json")).unwrap();
        fs::write(
            dir.path().join("json").join("canvas.json"),
            r#"{"name":{"snake-game-canvas":{"width":24}}}"#,
        )
        .unwrap();

        let mut bridge = bridge_at(dir.path().to_path_buf());
        let canvas: CanvasConfig = parse_json(&mut bridge, &CANVAS_FILE).unwrap();
        assert_eq!(canvas.board_width().unwrap(), 24);
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut bridge = bridge_at(dir.path().to_path_buf());
        let err = parse_json::<CanvasConfig>(&mut bridge, &CANVAS_FILE).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn bad_json_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("json")).unwrap();
        fs::write(dir.path().join("json").join("attributes.json"), "{").unwrap();
        let mut bridge = bridge_at(dir.path().to_path_buf());
        let err = parse_json::<AttributeConfig>(&mut bridge, &ATTRIBUTES_FILE).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn canvas_without_entry_or_width() {
        let canvas: CanvasConfig = serde_json::from_str(r#"{"name":{}}"#).unwrap();
        assert!(matches!(canvas.board_width(), Err(ConfigError::MissingCanvas(_))));

        let canvas: CanvasConfig =
            serde_json::from_str(r#"{"name":{"snake-game-canvas":{"width":0}}}"#).unwrap();
        assert!(matches!(canvas.board_width(), Err(ConfigError::ZeroWidth)));
    }

    #[test]
    fn height_follows_canvas_aspect() {
        assert_eq!(board_height(30, 720.0, 480.0), 20);
        assert_eq!(board_height(25, 600.0, 400.0), 17);
        assert_eq!(board_height(1, 1000.0, 10.0), 1);
    }

    #[test]
    fn grid_colour_lookup() {
        let attrs: AttributeConfig = serde_json::from_str(
            r##"{"name":{"grid":{"colour":"#333333"},"snake":{"name":"snake","colour":"#00ff00"}}}"##,
        )
        .unwrap();
        assert_eq!(attrs.grid_colour(), Some("#333333"));
        assert!(attrs.entry("snake").is_some());
        assert!(AttributeConfig::default().grid_colour().is_none());
    }

    #[test]
    fn settings_from_lookup() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("SNAKE_BACKEND", "/usr/local/bin/snake-backend"),
            ("SNAKE_POLL_MS", "250"),
        ]);
        let settings = UiSettings::from_lookup(|k| env.get(k).map(|v| v.to_string())).unwrap();
        assert_eq!(settings.backend, Some(PathBuf::from("/usr/local/bin/snake-backend")));
        assert_eq!(settings.poll_interval, Duration::from_millis(250));
        assert_eq!(settings.web_root, PathBuf::from("assets"));

        let bad = UiSettings::from_lookup(|k| (k == "SNAKE_POLL_MS").then(|| "0".to_string()));
        assert!(matches!(bad, Err(ConfigError::InvalidEnv { .. })));
    }
}
