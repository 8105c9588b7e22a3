//! Client side of the backend bridge. Every call is a request/response
//! pair; the typed helpers decode the JSON result.

pub mod local;
pub mod process;

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::de::DeserializeOwned;
use serde_json::Value;

use snake_core::{Attributes, Direction, Request, SceneObject};

use crate::error::{BridgeError, BridgeResult};

pub use local::LocalBridge;
pub use process::ProcessBridge;

pub type Objects = BTreeMap<String, SceneObject>;
pub type GroupAttributes = BTreeMap<String, Attributes>;

pub trait SnakeBridge {
    /// Send one request and return the raw result.
    fn call(&mut self, request: Request) -> BridgeResult<Value>;

    fn path_conjoin(&mut self, parts: &[&str]) -> BridgeResult<PathBuf> {
        let parts = parts.iter().map(|p| p.to_string()).collect();
        let path: String = typed(self, Request::PathConjoin { parts })?;
        Ok(PathBuf::from(path))
    }

    fn snake_begin(&mut self, width: usize, height: usize) -> BridgeResult<()> {
        self.call(Request::SnakeBegin { width, height }).map(drop)
    }

    fn snake_update(&mut self, username: &str) -> BridgeResult<()> {
        self.call(Request::SnakeUpdate {
            username: username.to_string(),
        })
        .map(drop)
    }

    fn snake_turn(&mut self, direction: Direction) -> BridgeResult<()> {
        self.call(Request::SnakeTurn { direction }).map(drop)
    }

    fn snake_is_game_over(&mut self) -> BridgeResult<bool> {
        typed(self, Request::SnakeIsGameOver)
    }

    fn snake_length(&mut self) -> BridgeResult<usize> {
        typed(self, Request::SnakeLength)
    }

    fn get_objects(&mut self) -> BridgeResult<Objects> {
        typed(self, Request::GetObjects)
    }

    fn get_attributes(&mut self) -> BridgeResult<GroupAttributes> {
        typed(self, Request::GetAttributes)
    }

    fn get_user_high_score(&mut self, username: &str) -> BridgeResult<u32> {
        typed(
            self,
            Request::GetUserHighScore {
                username: username.to_string(),
            },
        )
    }
}

fn typed<B, T>(bridge: &mut B, request: Request) -> BridgeResult<T>
where
    B: SnakeBridge + ?Sized,
    T: DeserializeOwned,
{
    let method = request.method();
    let value = bridge.call(request)?;
    serde_json::from_value(value).map_err(|source| BridgeError::Decode { method, source })
}
