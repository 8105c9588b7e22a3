use std::collections::BTreeMap;
use std::path::{Component, Path, PathBuf};

use serde_json::Value;
use tracing::{debug, info};

use crate::env::SnakeEnv;
use crate::error::{BackendError, BackendResult};
use crate::rpc::Request;
use crate::scene::{Attributes, Scene, SceneObject};
use crate::scores::HighScores;
use crate::types::{Direction, GameConfig, MAX_BOARD_SIDE, MIN_BOARD_SIDE};

pub const SNAKE_OBJECT: &str = "snake-1";
pub const FOOD_OBJECT: &str = "food";
pub const FOOD_PRIORITY: i64 = 0;
pub const SNAKE_PRIORITY: i64 = 1;

#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub web_root: PathBuf,
    pub seed: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            web_root: PathBuf::from("assets"),
            seed: 7,
        }
    }
}

#[derive(Debug)]
struct ActiveGame {
    env: SnakeEnv,
    scene: Scene,
    snake_uid: String,
    food_uid: String,
}

impl ActiveGame {
    fn new(config: GameConfig) -> Self {
        let env = SnakeEnv::new(config.clone());
        let mut scene = Scene::new(config.seed);
        let food_gid = scene.new_group(FOOD_PRIORITY);
        let snake_gid = scene.new_group(SNAKE_PRIORITY);
        let food_uid = scene.add_object(FOOD_OBJECT, Vec::new(), &[food_gid]);
        let snake_uid = scene.add_object(SNAKE_OBJECT, Vec::new(), &[snake_gid]);
        let mut game = Self {
            env,
            scene,
            snake_uid,
            food_uid,
        };
        game.sync_scene();
        game
    }

    /// Mirror the board into the scene store.
    fn sync_scene(&mut self) {
        let body = self.env.snake().iter().rev().map(|p| p.cell()).collect();
        let (dx, dy) = self.env.direction().delta();
        let food = self.env.food().map(|p| vec![p.cell()]).unwrap_or_default();
        // both uids are created in `new` and never removed
        let _ = self.scene.set_body(&self.snake_uid, body);
        let _ = self.scene.set_velocity(&self.snake_uid, [dy as i64, dx as i64]);
        let _ = self.scene.set_body(&self.food_uid, food);
    }
}

/// In-process implementation of every bridge call.
#[derive(Debug)]
pub struct GameSession {
    config: SessionConfig,
    games_started: u64,
    game: Option<ActiveGame>,
    scores: HighScores,
}

impl GameSession {
    pub fn new(config: SessionConfig, scores: HighScores) -> Self {
        Self {
            config,
            games_started: 0,
            game: None,
            scores,
        }
    }

    /// Join `parts` under the web root. Parent and absolute components are
    /// rejected.
    pub fn path_conjoin(&self, parts: &[String]) -> BackendResult<PathBuf> {
        let mut path = self.config.web_root.clone();
        for part in parts {
            let relative = Path::new(part);
            if relative
                .components()
                .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir))
            {
                return Err(BackendError::PathOutsideRoot(part.clone()));
            }
            path.push(relative);
        }
        Ok(path)
    }

    /// Start a fresh game. Each side must lie in
    /// `MIN_BOARD_SIDE..=MAX_BOARD_SIDE`; the previous game survives a
    /// rejected request.
    pub fn begin(&mut self, width: usize, height: usize) -> BackendResult<()> {
        let sides = MIN_BOARD_SIDE..=MAX_BOARD_SIDE;
        if !sides.contains(&width) || !sides.contains(&height) {
            return Err(BackendError::InvalidRequest(format!(
                "board {width}x{height} outside {MIN_BOARD_SIDE}..={MAX_BOARD_SIDE} per side"
            )));
        }
        if width.checked_mul(height).is_none() {
            return Err(BackendError::InvalidRequest(format!(
                "board {width}x{height} is too large"
            )));
        }

        let seed = self.config.seed.wrapping_add(self.games_started);
        self.games_started += 1;
        let config = GameConfig::new(width, height, seed);
        info!(
            board_w = config.board_w,
            board_h = config.board_h,
            seed,
            "snake game started"
        );
        self.game = Some(ActiveGame::new(config));
        Ok(())
    }

    pub fn update(&mut self, username: &str) -> BackendResult<()> {
        let game = self.game.as_mut().ok_or(BackendError::NotStarted)?;
        if game.env.is_over() {
            return Ok(());
        }
        let status = game.env.step();
        game.sync_scene();
        if game.env.is_over() {
            info!(
                ?status,
                reason = ?game.env.game_over_reason(),
                length = game.env.length(),
                "snake game over"
            );
        }

        let length = game.env.length() as u32;
        if self.scores.record(username, length) {
            debug!(username, length, "new high score");
            self.scores.save()?;
        }
        Ok(())
    }

    pub fn turn(&mut self, direction: Direction) -> BackendResult<()> {
        let game = self.game.as_mut().ok_or(BackendError::NotStarted)?;
        game.env.turn(direction);
        Ok(())
    }

    pub fn is_game_over(&self) -> BackendResult<bool> {
        Ok(self.active()?.env.is_over())
    }

    pub fn length(&self) -> BackendResult<usize> {
        Ok(self.active()?.env.length())
    }

    pub fn objects(&self) -> BackendResult<&BTreeMap<String, SceneObject>> {
        Ok(self.active()?.scene.objects())
    }

    pub fn attributes(&self) -> BackendResult<&BTreeMap<String, Attributes>> {
        Ok(self.active()?.scene.attributes())
    }

    pub fn user_high_score(&self, username: &str) -> u32 {
        self.scores.get(username)
    }

    pub fn env(&self) -> Option<&SnakeEnv> {
        self.game.as_ref().map(|game| &game.env)
    }

    /// Dispatch one decoded request.
    pub fn handle(&mut self, request: Request) -> BackendResult<Value> {
        let value = match request {
            Request::PathConjoin { parts } => {
                Value::from(self.path_conjoin(&parts)?.to_string_lossy().into_owned())
            }
            Request::SnakeBegin { width, height } => {
                self.begin(width, height)?;
                Value::Null
            }
            Request::SnakeUpdate { username } => {
                self.update(&username)?;
                Value::Null
            }
            Request::SnakeTurn { direction } => {
                self.turn(direction)?;
                Value::Null
            }
            Request::SnakeIsGameOver => Value::from(self.is_game_over()?),
            Request::SnakeLength => Value::from(self.length()?),
            Request::GetObjects => serde_json::to_value(self.objects()?)?,
            Request::GetAttributes => serde_json::to_value(self.attributes()?)?,
            Request::GetUserHighScore { username } => Value::from(self.user_high_score(&username)),
        };
        Ok(value)
    }

    fn active(&self) -> BackendResult<&ActiveGame> {
        self.game.as_ref().ok_or(BackendError::NotStarted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> GameSession {
        GameSession::new(SessionConfig::default(), HighScores::in_memory())
    }

    #[test]
    fn calls_before_begin_fail() {
        let mut s = session();
        assert!(matches!(s.update("ada"), Err(BackendError::NotStarted)));
        assert!(matches!(s.is_game_over(), Err(BackendError::NotStarted)));
        assert_eq!(s.user_high_score("ada"), 0);
    }

    #[test]
    fn path_conjoin_stays_under_root() {
        let s = session();
        let path = s
            .path_conjoin(&["json".to_string(), "canvas.json".to_string()])
            .unwrap();
        assert_eq!(path, PathBuf::from("assets").join("json").join("canvas.json"));
        assert!(s.path_conjoin(&["..".to_string(), "etc".to_string()]).is_err());
        assert!(s.path_conjoin(&["/etc/passwd".to_string()]).is_err());
    }

    #[test]
    fn begin_publishes_snake_and_food() {
        let mut s = session();
        s.begin(10, 8).unwrap();
        let objects = s.objects().unwrap();
        assert_eq!(objects.len(), 2);

        let snake = objects.values().find(|o| o.name == SNAKE_OBJECT).unwrap();
        // head first, [row, col]
        assert_eq!(snake.body, vec![[4, 6], [4, 5], [4, 4]]);
        assert_eq!(snake.velocity, [0, 1]);

        let food = objects.values().find(|o| o.name == FOOD_OBJECT).unwrap();
        assert_eq!(food.body.len(), 1);
        assert_eq!(s.attributes().unwrap().len(), 2);
    }

    #[test]
    fn update_records_high_score_for_user() {
        let mut s = session();
        s.begin(10, 10).unwrap();
        s.update("ada").unwrap();
        let length = s.length().unwrap();
        assert!(length >= 3);
        assert_eq!(s.user_high_score("ada"), length as u32);
        assert_eq!(s.user_high_score("bob"), 0);
    }

    #[test]
    fn update_after_game_over_is_noop() {
        let mut s = session();
        s.begin(4, 4).unwrap();
        for _ in 0..10 {
            s.update("").unwrap();
        }
        assert!(s.is_game_over().unwrap());
        let steps = s.env().unwrap().steps();
        s.update("").unwrap();
        assert_eq!(s.env().unwrap().steps(), steps);
    }

    #[test]
    fn begin_rejects_boards_it_cannot_play() {
        let mut s = session();
        for (w, h) in [(2, 1), (0, 10), (10, 3), (MAX_BOARD_SIDE + 1, 10), (usize::MAX, usize::MAX)] {
            assert!(
                matches!(s.begin(w, h), Err(BackendError::InvalidRequest(_))),
                "{w}x{h} should be rejected"
            );
        }
        assert!(matches!(s.length(), Err(BackendError::NotStarted)));

        s.begin(MIN_BOARD_SIDE, MAX_BOARD_SIDE).unwrap();
        let rows = s.objects().unwrap().values().flat_map(|o| o.body.iter().map(|c| c[0]));
        assert!(rows.max().unwrap() < MAX_BOARD_SIDE as i64);
    }

    #[test]
    fn rejected_begin_keeps_running_game() {
        let mut s = session();
        s.begin(10, 10).unwrap();
        assert!(s.begin(1, 1).is_err());
        assert_eq!(s.length().unwrap(), 3);
        assert_eq!(s.env().unwrap().snake().len(), 3);
    }
}
