//! Represents the download controller.

use crate::download::{Download, Status, Summary};
use crate::logging::DiagnosticLog;
use crate::progress::{Progress, ProgressBarOpts, Snapshot};
use crate::sink::FailureSink;
use crate::source::LineSource;
use crate::Error;
use futures::stream::StreamExt;
use reqwest::StatusCode;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_tracing::{DefaultSpanBackend, TracingMiddleware};
use std::fs;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::instrument::WithSubscriber;
use tracing::{debug, error, warn};

/// Represents the download controller.
///
/// A downloader can be created via its builder:
///
/// ```rust
/// # fn main()  {
/// use fetchall::downloader::DownloaderBuilder;
///
/// let d = DownloaderBuilder::new().directory("downloads".into()).build();
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Downloader {
    /// Directory where to store the downloaded files.
    directory: PathBuf,
    /// Maximum number of in-flight downloads, unbounded when `None`.
    concurrent_downloads: Option<usize>,
    /// Progress line options.
    progress: ProgressBarOpts,
}

impl Downloader {
    /// Creates the output directory, and its parents, if missing.
    pub fn prepare(&self) -> Result<(), Error> {
        debug!("Creating destination directory {:?}", &self.directory);
        fs::create_dir_all(&self.directory).map_err(|source| Error::OutputDirectory {
            path: self.directory.clone(),
            source,
        })
    }

    /// Directory where the files are stored.
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Downloads every URL of `source`.
    ///
    /// One task is spawned per URL and the call returns once all of them are
    /// done, whatever their outcome. Only failing to re-open the input file
    /// is an error; everything else is reported through `failures`, `log`
    /// and the returned [`Report`].
    pub async fn download(
        &self,
        source: &LineSource,
        failures: Arc<FailureSink>,
        log: &DiagnosticLog,
    ) -> Result<Report, Error> {
        // Prepare the HTTP client.
        let client = ClientBuilder::new(reqwest::Client::new())
            .with(TracingMiddleware::<DefaultSpanBackend>::new())
            .build();

        let progress = Arc::new(Progress::new(source.total(), &self.progress));
        let limit = self
            .concurrent_downloads
            .map(|n| Arc::new(Semaphore::new(n.max(1))));

        let urls = source.urls()?;
        log.in_scope(|| debug!("Dispatching {} URLs", source.total()));

        let mut tasks = JoinSet::new();
        for line in urls {
            let url = match line {
                Ok(url) => url,
                Err(e) => {
                    log.in_scope(|| warn!("Error reading input file {:?}: {e}", source.path()));
                    break;
                }
            };
            let worker = Worker {
                client: client.clone(),
                directory: self.directory.clone(),
                failures: failures.clone(),
                progress: progress.clone(),
            };
            let limit = limit.clone();
            tasks.spawn(
                async move {
                    let _permit = match limit {
                        Some(limit) => limit.acquire_owned().await.ok(),
                        None => None,
                    };
                    worker.fetch(Download::new(url)).await
                }
                .with_subscriber(log.dispatch().clone()),
            );
        }

        log.in_scope(|| debug!("Awaiting {} downloads", tasks.len()));
        let mut summaries = Vec::with_capacity(tasks.len());
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(summary) => summaries.push(summary),
                Err(e) => log.in_scope(|| error!("Download task failed: {e}")),
            }
        }

        progress.finish();
        log.in_scope(|| debug!("Done, {}", progress.snapshot()));

        Ok(Report {
            summaries,
            progress: progress.snapshot(),
        })
    }
}

/// Outcome of a [`Downloader::download`] run.
#[derive(Debug, Clone)]
pub struct Report {
    summaries: Vec<Summary>,
    progress: Snapshot,
}

impl Report {
    /// One summary per URL, in completion order.
    pub fn summaries(&self) -> &[Summary] {
        &self.summaries
    }

    /// Final state of the progress counter.
    pub fn progress(&self) -> Snapshot {
        self.progress
    }

    /// Number of URLs recorded in the failure sink.
    pub fn failed(&self) -> usize {
        self.summaries
            .iter()
            .filter(|s| matches!(s.status(), Status::Fail(_)))
            .count()
    }
}

/// Downloads a single URL.
struct Worker {
    client: ClientWithMiddleware,
    directory: PathBuf,
    failures: Arc<FailureSink>,
    progress: Arc<Progress>,
}

impl Worker {
    /// Fetches the file, writes it to disk, then advances the progress.
    async fn fetch(self, download: Download) -> Summary {
        let summary = self.transfer(download).await;
        let snapshot = self.progress.record();
        debug!("{} done, {}", &summary.download().url, snapshot);
        summary
    }

    async fn transfer(&self, download: Download) -> Summary {
        let mut summary = Summary::new(download.clone());

        // Request the file.
        debug!("Fetching {}", &download.url);
        let res = match self.client.get(download.url.as_str()).send().await {
            Ok(res) => res,
            Err(e) => {
                return self.reject(summary, e);
            }
        };

        // Anything but a 200 is a failure.
        summary = summary.with_statuscode(res.status());
        if res.status() != StatusCode::OK {
            return self.reject(summary, format!("unexpected status {}", res.status()));
        }

        let output = self.directory.join(&download.filename);
        debug!("Creating destination file {:?}", &output);
        let mut file = match File::create(&output) {
            Ok(file) => file,
            Err(e) => {
                warn!("Failed to create file for {}: {e}", &download.url);
                return summary.with_status(Status::Unsaved(e.to_string()));
            }
        };

        // Download the file chunk by chunk.
        debug!("Retrieving chunks...");
        let mut stream = res.bytes_stream();
        while let Some(item) = stream.next().await {
            // Retrieve chunk.
            let chunk = match item {
                Ok(chunk) => chunk,
                Err(e) => {
                    warn!("Failed to write data for {}: {e}", &download.url);
                    return summary.with_status(Status::Incomplete(e.to_string()));
                }
            };

            // Write the chunk to disk.
            if let Err(e) = file.write_all(&chunk) {
                warn!("Failed to write data for {}: {e}", &download.url);
                return summary.with_status(Status::Incomplete(e.to_string()));
            }
            summary.add_size(chunk.len() as u64);
        }

        summary.with_status(Status::Success)
    }

    /// Logs the failure and records the URL in the failure sink.
    fn reject(&self, summary: Summary, reason: impl std::fmt::Display) -> Summary {
        let url = &summary.download().url;
        warn!("Failed to download {url}: {reason}");
        if let Err(e) = self.failures.record(url) {
            error!(
                "Failed to record {url} in {:?}: {e}",
                self.failures.path()
            );
        }
        summary.fail(reason)
    }
}

/// A builder used to create a [`Downloader`].
///
/// ```rust
/// # fn main()  {
/// use fetchall::downloader::DownloaderBuilder;
///
/// let d = DownloaderBuilder::new()
///     .concurrent_downloads(64)
///     .directory("downloads".into())
///     .build();
/// # }
/// ```
pub struct DownloaderBuilder(Downloader);

impl DownloaderBuilder {
    /// Creates a builder with the default options.
    pub fn new() -> Self {
        DownloaderBuilder::default()
    }

    /// Sets the directory where to store the [`Download`]s.
    pub fn directory(mut self, directory: PathBuf) -> Self {
        self.0.directory = directory;
        self
    }

    /// Caps the number of in-flight [`Download`]s.
    ///
    /// Without a cap, every URL gets its own task right away. A cap of `0`
    /// is treated as `1`.
    pub fn concurrent_downloads(mut self, concurrent_downloads: usize) -> Self {
        self.0.concurrent_downloads = Some(concurrent_downloads);
        self
    }

    /// Set the progress line options.
    pub fn progress(mut self, progress: ProgressBarOpts) -> Self {
        self.0.progress = progress;
        self
    }

    /// Create the [`Downloader`] with the specified options.
    pub fn build(self) -> Downloader {
        self.0
    }
}

impl Default for DownloaderBuilder {
    fn default() -> Self {
        Self(Downloader {
            directory: std::env::current_dir().unwrap_or_default(),
            concurrent_downloads: None,
            progress: ProgressBarOpts::default(),
        })
    }
}
