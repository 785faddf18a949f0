//! Side-channel log of records that could not be imported
//!
//! One JSON object per line: `{"item": "<original text>", "reason": "..."}`.
//! The file is created before the import starts and removed again if nothing
//! was written to it.

use crate::error::Result;
use crate::transfer::batch::FailureRecord;
use chrono::{DateTime, Utc};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

const FILE_PREFIX: &str = "dstore-bulk-put-errors-";

/// Append-only failure log for one import run
pub struct ErrorLog {
    path: PathBuf,
    writer: BufWriter<File>,
    entries: usize,
}

impl ErrorLog {
    /// Create a fresh log file in `dir`, named after `started_at`
    pub fn create_in(dir: &Path, started_at: DateTime<Utc>) -> Result<Self> {
        std::fs::create_dir_all(dir)?;
        let path = dir.join(file_name(started_at));
        let writer = BufWriter::new(File::create(&path)?);
        debug!(path = %path.display(), "Created bulk put error log");

        Ok(Self {
            path,
            writer,
            entries: 0,
        })
    }

    /// Append one failure and flush it to disk
    pub fn append(&mut self, failure: &FailureRecord) -> Result<()> {
        serde_json::to_writer(&mut self.writer, failure)?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()?;
        self.entries += 1;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Close the log
    ///
    /// Returns the path when failures were recorded. An empty log is deleted
    /// and `None` is returned.
    pub fn finish(self) -> Result<Option<PathBuf>> {
        let Self {
            path,
            mut writer,
            entries,
        } = self;
        writer.flush()?;
        drop(writer);

        if entries == 0 {
            std::fs::remove_file(&path)?;
            debug!(path = %path.display(), "Removed empty bulk put error log");
            return Ok(None);
        }
        Ok(Some(path))
    }
}

fn file_name(started_at: DateTime<Utc>) -> String {
    format!("{}{}.log", FILE_PREFIX, started_at.format("%Y%m%d%H%M%S"))
}
