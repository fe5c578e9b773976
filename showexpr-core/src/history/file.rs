//! JSON-Lines history file
//!
//! One record per line: `{"session": 1, "line": 3, "input": "show!(x)"}`.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use super::{HistoryEntry, HistoryProvider};
use crate::error::ShowError;

/// History read from a JSON-Lines file written by a front-end
#[derive(Debug, Clone)]
pub struct FileHistory {
    path: PathBuf,
    session: Option<u64>,
}

impl FileHistory {
    /// The current session is the highest one found in the file
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            session: None,
        }
    }

    /// Always report `session` as current
    pub fn pinned(mut self, session: u64) -> Self {
        self.session = Some(session);
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one record
    pub fn append(&self, entry: &HistoryEntry) -> Result<(), ShowError> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        let line = serde_json::to_string(entry).map_err(ShowError::parse)?;
        writeln!(file, "{}", line)?;
        Ok(())
    }

    fn load(&self) -> Result<Vec<HistoryEntry>, ShowError> {
        let text = std::fs::read_to_string(&self.path)?;
        text.lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(i, line)| {
                serde_json::from_str(line).map_err(|e| ShowError::MalformedHistory {
                    path: self.path.clone(),
                    line: i + 1,
                    message: e.to_string(),
                })
            })
            .collect()
    }
}

impl HistoryProvider for FileHistory {
    fn session(&self) -> Option<u64> {
        if self.session.is_some() {
            return self.session;
        }
        match self.load() {
            Ok(entries) => entries.iter().map(|e| e.session).max(),
            Err(e) => {
                log::debug!("cannot read history {}: {}", self.path.display(), e);
                None
            }
        }
    }

    fn range(&self, session: u64) -> Result<Vec<HistoryEntry>, ShowError> {
        let mut entries: Vec<HistoryEntry> = self
            .load()?
            .into_iter()
            .filter(|e| e.session == session)
            .collect();
        entries.sort_by_key(|e| e.line);
        Ok(entries)
    }
}
