//! Line-delimited JSON bridge: one request object per line in, one
//! response object per line out.

use std::io::{self, BufRead, Write};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::session::GameSession;
use crate::types::Direction;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "method", content = "params", rename_all = "snake_case")]
pub enum Request {
    PathConjoin { parts: Vec<String> },
    SnakeBegin { width: usize, height: usize },
    SnakeUpdate { username: String },
    SnakeTurn { direction: Direction },
    SnakeIsGameOver,
    SnakeLength,
    GetObjects,
    GetAttributes,
    GetUserHighScore { username: String },
}

impl Request {
    pub fn method(&self) -> &'static str {
        match self {
            Self::PathConjoin { .. } => "path_conjoin",
            Self::SnakeBegin { .. } => "snake_begin",
            Self::SnakeUpdate { .. } => "snake_update",
            Self::SnakeTurn { .. } => "snake_turn",
            Self::SnakeIsGameOver => "snake_is_game_over",
            Self::SnakeLength => "snake_length",
            Self::GetObjects => "get_objects",
            Self::GetAttributes => "get_attributes",
            Self::GetUserHighScore { .. } => "get_user_high_score",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Response {
    Ok(Value),
    Error(String),
}

impl Response {
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| r#"{"error":"unserializable response"}"#.to_string())
    }
}

/// Answer one raw request line.
pub fn handle_line(session: &mut GameSession, line: &str) -> Response {
    let request = match serde_json::from_str::<Request>(line) {
        Ok(request) => request,
        Err(err) => {
            warn!(%err, "malformed request");
            return Response::Error(format!("invalid request: {err}"));
        }
    };
    let method = request.method();
    match session.handle(request) {
        Ok(value) => Response::Ok(value),
        Err(err) => {
            debug!(method, %err, "request failed");
            Response::Error(err.to_string())
        }
    }
}

/// Serve requests until the reader hits EOF.
pub fn serve<R: BufRead, W: Write>(session: &mut GameSession, reader: R, mut writer: W) -> io::Result<()> {
    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let response = handle_line(session, &line);
        writeln!(writer, "{}", response.to_json())?;
        writer.flush()?;
    }
    debug!("request stream closed");
    Ok(())
}
