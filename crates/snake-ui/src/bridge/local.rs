use serde_json::Value;
use tracing::trace;

use snake_core::{GameSession, Request};

use super::SnakeBridge;
use crate::error::{BridgeError, BridgeResult};

/// Runs the backend session in the UI process.
pub struct LocalBridge {
    session: GameSession,
}

impl LocalBridge {
    pub fn new(session: GameSession) -> Self {
        Self { session }
    }
}

impl SnakeBridge for LocalBridge {
    fn call(&mut self, request: Request) -> BridgeResult<Value> {
        let method = request.method();
        trace!(method, "local bridge call");
        self.session.handle(request).map_err(|err| BridgeError::Remote {
            method,
            message: err.to_string(),
        })
    }
}
