use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};

use serde_json::Value;
use tracing::{debug, info, warn};

use snake_core::{Request, Response};

use super::SnakeBridge;
use crate::error::{BridgeError, BridgeResult};

/// Talks to a `snake-backend` child process over its stdin/stdout.
pub struct ProcessBridge {
    child: Child,
    stdin: ChildStdin,
    stdout: BufReader<ChildStdout>,
}

impl ProcessBridge {
    pub fn spawn(path: &Path, envs: &[(&str, String)]) -> BridgeResult<Self> {
        let mut cmd = Command::new(path);
        for (key, value) in envs {
            cmd.env(key, value);
        }
        Self::from_command(cmd)
    }

    /// Start `cmd` with piped stdin/stdout; stderr stays attached to ours.
    pub fn from_command(mut cmd: Command) -> BridgeResult<Self> {
        cmd.stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit());
        let path = PathBuf::from(cmd.get_program());

        let mut child = cmd.spawn().map_err(|source| BridgeError::Spawn {
            path: path.clone(),
            source,
        })?;
        let (Some(stdin), Some(stdout)) = (child.stdin.take(), child.stdout.take()) else {
            let _ = child.kill();
            return Err(BridgeError::Closed);
        };
        info!(path = %path.display(), pid = child.id(), "backend process started");

        Ok(Self {
            child,
            stdin,
            stdout: BufReader::new(stdout),
        })
    }
}

impl SnakeBridge for ProcessBridge {
    fn call(&mut self, request: Request) -> BridgeResult<Value> {
        let method = request.method();
        let line = serde_json::to_string(&request)
            .map_err(|source| BridgeError::Decode { method, source })?;
        writeln!(self.stdin, "{line}")
            .and_then(|()| self.stdin.flush())
            .map_err(closed_on_broken_pipe)?;

        let mut reply = String::new();
        if self.stdout.read_line(&mut reply)? == 0 {
            return Err(BridgeError::Closed);
        }
        debug!(method, bytes = reply.len(), "backend replied");

        match serde_json::from_str(&reply).map_err(|source| BridgeError::Decode { method, source })? {
            Response::Ok(value) => Ok(value),
            Response::Error(message) => Err(BridgeError::Remote { method, message }),
        }
    }
}

/// A child that exited before reading our request shows up as a broken pipe.
fn closed_on_broken_pipe(err: io::Error) -> BridgeError {
    if err.kind() == io::ErrorKind::BrokenPipe {
        BridgeError::Closed
    } else {
        BridgeError::Io(err)
    }
}

impl Drop for ProcessBridge {
    fn drop(&mut self) {
        if let Err(err) = self.child.kill() {
            warn!(%err, "failed to stop backend process");
        }
        let _ = self.child.wait();
    }
}
