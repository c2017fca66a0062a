//! Append-only record of the URLs that failed to download.

use crate::Error;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

/// The failure file, shared by every worker of a run.
///
/// One line per failed URL. The file is never truncated, so re-runs keep
/// appending to it.
#[derive(Debug)]
pub struct FailureSink {
    path: PathBuf,
    file: Mutex<File>,
}

impl FailureSink {
    /// Name of the failure file inside the output directory.
    pub const FILENAME: &'static str = "NotFound.txt";

    /// Opens, or creates, the failure file in `directory`.
    pub fn open(directory: &Path) -> Result<Self, Error> {
        let path = directory.join(Self::FILENAME);
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|source| Error::Journal {
                path: path.clone(),
                source,
            })?;
        Ok(Self {
            path,
            file: Mutex::new(file),
        })
    }

    /// Appends `url` as its own line.
    pub fn record(&self, url: &str) -> io::Result<()> {
        let line = format!("{url}\n");
        // Each line goes out in a single write_all.
        let mut file = self.file.lock().unwrap_or_else(PoisonError::into_inner);
        file.write_all(line.as_bytes())
    }

    /// Path of the failure file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}
