//! The per-run diagnostic log.
//!
//! The log is an explicit [`Dispatch`] handed down to the workers. It is never
//! installed as the global subscriber.

use crate::Error;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::Dispatch;
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter, in [`EnvFilter`] syntax.
pub const FILTER_ENV: &str = "FETCHALL_LOG";

const DEFAULT_FILTER: &str = "warn";

/// Timestamped, append-only log of warnings and errors.
#[derive(Debug, Clone)]
pub struct DiagnosticLog {
    dispatch: Dispatch,
    path: Option<PathBuf>,
}

impl DiagnosticLog {
    /// Name of the log file inside the output directory.
    pub const FILENAME: &'static str = "fetchallsrc.log";

    /// Opens, or creates, the log file in `directory`.
    ///
    /// The filter is read from [`FILTER_ENV`] and defaults to `warn`.
    pub fn open(directory: &Path) -> Result<Self, Error> {
        let filter = EnvFilter::try_from_env(FILTER_ENV)
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
        Self::open_with_filter(directory, filter)
    }

    /// Opens, or creates, the log file in `directory` with an explicit filter.
    pub fn open_with_filter(directory: &Path, filter: EnvFilter) -> Result<Self, Error> {
        let path = directory.join(Self::FILENAME);
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|source| Error::Journal {
                path: path.clone(),
                source,
            })?;

        let subscriber = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(Mutex::new(file))
            .with_ansi(false)
            .with_target(false)
            .with_file(true)
            .with_line_number(true)
            .finish();

        Ok(Self {
            dispatch: Dispatch::new(subscriber),
            path: Some(path),
        })
    }

    /// A log that drops every event.
    pub fn disabled() -> Self {
        Self {
            dispatch: Dispatch::none(),
            path: None,
        }
    }

    /// The dispatcher events should be sent to.
    pub fn dispatch(&self) -> &Dispatch {
        &self.dispatch
    }

    /// Path of the log file, if any.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Runs `f` with this log as the default dispatcher.
    pub fn in_scope<T>(&self, f: impl FnOnce() -> T) -> T {
        tracing::dispatcher::with_default(&self.dispatch, f)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::fs;

    #[test]
    fn test_events_land_in_file() {
        let dir = tempfile::tempdir().unwrap();
        let log = DiagnosticLog::open_with_filter(dir.path(), EnvFilter::new("warn")).unwrap();
        log.in_scope(|| {
            tracing::debug!("hidden");
            tracing::warn!("Failed to download http://a.com/1");
        });
        let content = fs::read_to_string(dir.path().join(DiagnosticLog::FILENAME)).unwrap();
        assert!(content.contains("WARN"));
        assert!(content.contains("Failed to download http://a.com/1"));
        assert!(!content.contains("hidden"));
        assert_eq!(content.lines().count(), 1);
    }

    #[test]
    fn test_log_is_appended() {
        let dir = tempfile::tempdir().unwrap();
        for i in 0..2 {
            let log =
                DiagnosticLog::open_with_filter(dir.path(), EnvFilter::new("warn")).unwrap();
            log.in_scope(|| tracing::error!("run {i}"));
        }
        let content = fs::read_to_string(dir.path().join(DiagnosticLog::FILENAME)).unwrap();
        assert!(content.contains("run 0"));
        assert!(content.contains("run 1"));
    }

    #[test]
    fn test_disabled_has_no_file() {
        let log = DiagnosticLog::disabled();
        assert!(log.path().is_none());
        log.in_scope(|| tracing::error!("dropped"));
    }
}
