//! Reads the URL list from the input file.

use crate::Error;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};
use tracing::debug;

/// A counted input file of newline-delimited URLs.
///
/// The file is read twice: once by [`LineSource::count`] to learn the total,
/// then again, freshly opened, by [`LineSource::urls`] for the actual work.
#[derive(Debug, Clone)]
pub struct LineSource {
    path: PathBuf,
    total: u64,
}

impl LineSource {
    /// Counts the URLs in the file at `path`.
    ///
    /// Blank lines are not URLs and are not counted.
    pub fn count(path: impl Into<PathBuf>) -> Result<Self, Error> {
        let path = path.into();
        let reader = open(&path)?;
        let mut total = 0;
        for line in reader.split(b'\n') {
            let line = line.map_err(|source| Error::Input {
                path: path.clone(),
                source,
            })?;
            if is_entry(&decode(&line)) {
                total += 1;
            }
        }
        debug!("Counted {} URLs in {:?}", total, &path);
        Ok(Self { path, total })
    }

    /// Number of URLs found by the counting pass.
    pub fn total(&self) -> u64 {
        self.total
    }

    /// Path of the input file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Re-opens the file and iterates over its URLs.
    pub fn urls(&self) -> Result<Urls, Error> {
        Ok(Urls {
            lines: open(&self.path)?.split(b'\n'),
        })
    }
}

/// Lazy iterator over the URLs of a [`LineSource`].
///
/// Lines are opaque bytes: anything that is not UTF-8 is decoded lossily and
/// goes to a worker like any other URL. A read error is yielded as is; the
/// caller decides whether to go on.
#[derive(Debug)]
pub struct Urls {
    lines: io::Split<BufReader<File>>,
}

impl Iterator for Urls {
    type Item = io::Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.lines.next()? {
                Ok(line) => {
                    let line = decode(&line);
                    if is_entry(&line) {
                        return Some(Ok(line));
                    }
                }
                Err(e) => return Some(Err(e)),
            }
        }
    }
}

fn open(path: &Path) -> Result<BufReader<File>, Error> {
    File::open(path)
        .map(BufReader::new)
        .map_err(|source| Error::Input {
            path: path.to_path_buf(),
            source,
        })
}

fn decode(line: &[u8]) -> String {
    let line = line.strip_suffix(b"\r").unwrap_or(line);
    String::from_utf8_lossy(line).into_owned()
}

fn is_entry(line: &str) -> bool {
    !line.trim().is_empty()
}
