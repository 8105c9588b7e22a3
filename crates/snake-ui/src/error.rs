use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("backend rejected {method}: {message}")]
    Remote { method: &'static str, message: String },
    #[error("malformed response to {method}: {source}")]
    Decode {
        method: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to start backend {path}: {source}")]
    Spawn {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("backend closed the bridge")]
    Closed,
    #[error("bridge io: {0}")]
    Io(#[from] io::Error),
}

pub type BridgeResult<T> = Result<T, BridgeError>;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error(transparent)]
    Bridge(#[from] BridgeError),
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("canvas config has no entry for {0}")]
    MissingCanvas(String),
    #[error("canvas width must be positive")]
    ZeroWidth,
    #[error("{name} is invalid: {value}")]
    InvalidEnv { name: &'static str, value: String },
}

#[derive(Debug, Error)]
pub enum ClientError {
    #[error(transparent)]
    Bridge(#[from] BridgeError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}
