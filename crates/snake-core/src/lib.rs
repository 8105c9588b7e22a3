pub mod env;
pub mod error;
pub mod rpc;
pub mod scene;
pub mod scores;
pub mod session;
pub mod types;

pub use env::SnakeEnv;
pub use error::{BackendError, BackendResult};
pub use rpc::{Request, Response};
pub use scene::{Attributes, Scene, SceneObject, PRIORITY_LEVEL};
pub use scores::HighScores;
pub use session::{GameSession, SessionConfig};
pub use types::{
    Direction, GameConfig, GameOverReason, GameStatus, Point, MAX_BOARD_SIDE, MIN_BOARD_SIDE,
};
