//! Journal writer
//!
//! A record is written as one JSON line and synced to disk before `append`
//! returns. The writer owns the chain head and only accepts the record that
//! extends it, so a caller cannot fork or reorder the journal.

use crate::command::JournalRecord;
use crate::error::EventError;
use crate::hash::{calculate_record_hash, ChainHead};
use chrono::NaiveDate;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Append-only journal, one `YYYY-MM-DD.jsonl` file per UTC day of the
/// record timestamp
pub struct EventStore {
    dir: PathBuf,
    day: Option<(NaiveDate, File)>,
    head: ChainHead,
}

impl EventStore {
    /// Open the writer positioned after `head`, the last record already on disk.
    pub fn open(dir: impl AsRef<Path>, head: ChainHead) -> Result<Self, EventError> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir, day: None, head })
    }

    pub fn head(&self) -> &ChainHead {
        &self.head
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write `record` durably. On error nothing is committed and the head is
    /// unchanged.
    pub fn append(&mut self, record: &JournalRecord) -> Result<(), EventError> {
        if record.sequence != self.head.sequence + 1 {
            return Err(EventError::OutOfSequence {
                expected: self.head.sequence + 1,
                actual: record.sequence,
            });
        }
        if !self.head.is_extended_by(record) {
            return Err(EventError::UnlinkedRecord {
                sequence: record.sequence,
            });
        }
        if calculate_record_hash(record)? != record.hash {
            return Err(EventError::HashMismatch {
                sequence: record.sequence,
            });
        }

        let mut line = serde_json::to_vec(record)?;
        line.push(b'\n');

        let file = self.file_for(record.timestamp.date_naive())?;
        let len = file.metadata()?.len();
        if let Err(e) = file.write_all(&line).and_then(|_| file.sync_data()) {
            // Drop a torn line so the next open still parses
            if let Err(truncate) = file.set_len(len) {
                tracing::error!(sequence = record.sequence, error = %truncate, "Could not truncate torn journal line");
            }
            return Err(e.into());
        }

        self.head = ChainHead::of(record);
        tracing::debug!(sequence = record.sequence, command = record.command.name(), "Journal record synced");
        Ok(())
    }

    fn file_for(&mut self, date: NaiveDate) -> Result<&mut File, EventError> {
        if !matches!(&self.day, Some((open, _)) if *open == date) {
            let path = self.dir.join(format!("{}.jsonl", date.format("%Y-%m-%d")));
            let file = OpenOptions::new().create(true).append(true).open(&path)?;
            self.day = Some((date, file));
        }
        let (_, file) = self.day.as_mut().expect("journal day file is open");
        Ok(file)
    }
}
