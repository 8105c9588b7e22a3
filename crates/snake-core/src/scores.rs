use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::BackendResult;

/// Best snake length per username, optionally backed by a JSON file.
#[derive(Debug, Default)]
pub struct HighScores {
    path: Option<PathBuf>,
    best: BTreeMap<String, u32>,
}

impl HighScores {
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Load the table from `path`. A missing file starts an empty table.
    pub fn open(path: impl AsRef<Path>) -> BackendResult<Self> {
        let path = path.as_ref().to_path_buf();
        let best = match fs::read_to_string(&path) {
            Ok(raw) => serde_json::from_str(&raw)?,
            Err(err) if err.kind() == io::ErrorKind::NotFound => BTreeMap::new(),
            Err(err) => return Err(err.into()),
        };
        debug!(path = %path.display(), users = best.len(), "loaded high scores");
        Ok(Self {
            path: Some(path),
            best,
        })
    }

    pub fn get(&self, username: &str) -> u32 {
        self.best.get(username).copied().unwrap_or(0)
    }

    /// Keep the maximum of the stored and given length. Returns true when
    /// the table changed.
    pub fn record(&mut self, username: &str, length: u32) -> bool {
        if username.is_empty() {
            return false;
        }
        let best = self.best.entry(username.to_string()).or_insert(0);
        if length <= *best {
            return false;
        }
        *best = length;
        true
    }

    pub fn save(&self) -> BackendResult<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(&self.best)?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_keeps_maximum() {
        let mut scores = HighScores::in_memory();
        assert!(scores.record("ada", 5));
        assert!(!scores.record("ada", 3));
        assert!(scores.record("ada", 9));
        assert_eq!(scores.get("ada"), 9);
        assert_eq!(scores.get("bob"), 0);
    }

    #[test]
    fn anonymous_user_is_never_recorded() {
        let mut scores = HighScores::in_memory();
        assert!(!scores.record("", 40));
        assert_eq!(scores.get(""), 0);
    }

    #[test]
    fn save_and_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("scores.json");

        let mut scores = HighScores::open(&path).unwrap();
        scores.record("ada", 12);
        scores.save().unwrap();

        let reopened = HighScores::open(&path).unwrap();
        assert_eq!(reopened.get("ada"), 12);
    }

    #[test]
    fn corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scores.json");
        fs::write(&path, "not json").unwrap();
        assert!(HighScores::open(&path).is_err());
    }
}
