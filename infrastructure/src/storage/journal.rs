//! JSONL history journal.
//!
//! Every [`HistoryEntry`] is serialized as a single JSON line, newline
//! included, and handed to the file in one unbuffered write. A write that
//! fails part way is cut back off the file before the error is returned, so
//! the file only ever grows by whole acknowledged lines. Opening a journal
//! replays the lines already on disk; an unterminated last line (left by a
//! crash mid-write) was never acknowledged and is dropped.

use calibration_domain::HistoryEntry;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Error)]
pub enum JournalError {
    #[error("Journal I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Corrupt journal {path} at line {line}: {source}")]
    Corrupt {
        path: PathBuf,
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("Could not encode history entry: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("Journal writer poisoned")]
    Poisoned,
}

/// Lines recovered from disk, and how many bytes of the file they cover
struct Replay {
    entries: Vec<HistoryEntry>,
    complete_len: u64,
    torn: bool,
}

/// Append-only JSONL file holding the audit trail.
///
/// Thread-safe via `Mutex<File>`.
pub struct HistoryJournal {
    file: Mutex<File>,
    path: PathBuf,
}

impl HistoryJournal {
    /// Open (or create) the journal at `path` and return the entries already
    /// recorded, in file order.
    ///
    /// Creates parent directories if they don't exist. Blank lines are
    /// skipped and an unterminated last line is truncated away; any other
    /// unparsable line fails the whole open.
    pub fn open(path: impl AsRef<Path>) -> Result<(Self, Vec<HistoryEntry>), JournalError> {
        let path = path.as_ref();
        let io_err = |source| JournalError::Io {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }

        let replay = if path.exists() {
            Self::replay(path)?
        } else {
            Replay {
                entries: Vec::new(),
                complete_len: 0,
                torn: false,
            }
        };

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(io_err)?;
        if replay.torn {
            file.set_len(replay.complete_len).map_err(io_err)?;
        }
        info!(path = %path.display(), replayed = replay.entries.len(), "History journal opened");

        Ok((
            Self {
                file: Mutex::new(file),
                path: path.to_path_buf(),
            },
            replay.entries,
        ))
    }

    fn replay(path: &Path) -> Result<Replay, JournalError> {
        let io_err = |source| JournalError::Io {
            path: path.to_path_buf(),
            source,
        };
        let bytes = std::fs::read(path).map_err(io_err)?;
        let complete_len = bytes
            .iter()
            .rposition(|b| *b == b'\n')
            .map_or(0, |i| i + 1);
        let torn = complete_len < bytes.len();
        if torn {
            warn!(
                path = %path.display(),
                dropped_bytes = bytes.len() - complete_len,
                "Dropping unterminated last journal line"
            );
        }

        let mut entries = Vec::new();
        for (index, line) in (&bytes[..complete_len]).lines().enumerate() {
            let line = line.map_err(io_err)?;
            if line.trim().is_empty() {
                continue;
            }
            let entry = serde_json::from_str(&line).map_err(|source| JournalError::Corrupt {
                path: path.to_path_buf(),
                line: index + 1,
                source,
            })?;
            entries.push(entry);
        }
        debug!(path = %path.display(), entries = entries.len(), "Replayed history journal");
        Ok(Replay {
            entries,
            complete_len: complete_len as u64,
            torn,
        })
    }

    /// Append one entry as a whole line. On error nothing of it stays in the file.
    pub fn append(&self, entry: &HistoryEntry) -> Result<(), JournalError> {
        let mut line = serde_json::to_vec(entry)?;
        line.push(b'\n');
        let io_err = |source| JournalError::Io {
            path: self.path.clone(),
            source,
        };

        let mut file = self.file.lock().map_err(|_| JournalError::Poisoned)?;
        let start = file.metadata().map_err(io_err)?.len();
        if let Err(source) = file.write_all(&line) {
            if let Err(e) = file.set_len(start) {
                warn!(path = %self.path.display(), error = %e, "Failed to roll back partial journal line");
            }
            return Err(io_err(source));
        }
        Ok(())
    }

    /// Get the path to the journal file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}
