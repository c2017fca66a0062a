//! Fetchall downloads every URL listed in a file, concurrently, via HTTP(S).
//!

pub mod download;
pub mod downloader;
pub mod logging;
pub mod progress;
pub mod sink;
pub mod source;

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort a whole run.
///
/// Failures of a single URL never surface here, they end up in the
/// diagnostic log and the failure sink instead.
#[derive(Error, Debug)]
pub enum Error {
    /// The input file could not be opened or read.
    #[error("cannot read input file {path:?}")]
    Input {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// The output directory could not be created.
    #[error("cannot create output directory {path:?}")]
    OutputDirectory {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// The diagnostic log or the failure file could not be opened.
    #[error("cannot open {path:?}")]
    Journal {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}
