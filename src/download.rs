//! Represents a URL to be downloaded and the outcome of its download.

use reqwest::StatusCode;

/// Represents a URL to be downloaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Download {
    /// URL of the resource, exactly as read from the input.
    pub url: String,
    /// File name used to save the resource on disk.
    pub filename: String,
}

impl Download {
    /// Creates a new [`Download`], deriving the file name from the URL.
    ///
    /// Scheme prefixes are removed and path separators and colons become
    /// underscores:
    ///
    /// ```rust
    /// use fetchall::download::Download;
    ///
    /// let d = Download::new("http://example.com/a.txt");
    /// assert_eq!(d.filename, "example.com_a.txt");
    /// ```
    ///
    /// Distinct URLs may derive the same file name. Nothing arbitrates
    /// between them: whichever worker writes last wins.
    pub fn new(url: impl Into<String>) -> Self {
        let url = url.into();
        let filename = derive_filename(&url);
        Self { url, filename }
    }
}

impl From<&str> for Download {
    fn from(value: &str) -> Self {
        Download::new(value)
    }
}

impl From<String> for Download {
    fn from(value: String) -> Self {
        Download::new(value)
    }
}

fn derive_filename(url: &str) -> String {
    let mut name = String::with_capacity(url.len());
    let mut rest = url;
    while let Some(c) = rest.chars().next() {
        if let Some(tail) = rest.strip_prefix("http://") {
            rest = tail;
            continue;
        }
        if let Some(tail) = rest.strip_prefix("https://") {
            rest = tail;
            continue;
        }
        match c {
            '/' | ':' => name.push('_'),
            _ => name.push(c),
        }
        rest = &rest[c.len_utf8()..];
    }
    name
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    /// No outcome yet.
    NotStarted,
    /// The body was fully written to disk.
    Success,
    /// Transport error or non-200 status. The URL went to the failure sink.
    Fail(String),
    /// The output file could not be created. Logged only.
    Unsaved(String),
    /// The body stream broke mid-way. The partial file stays on disk.
    Incomplete(String),
}

/// Represents a [`Download`] summary.
#[derive(Debug, Clone)]
pub struct Summary {
    /// Downloaded item.
    download: Download,
    /// HTTP status code, if a response was received.
    statuscode: Option<StatusCode>,
    /// Bytes written to disk.
    size: u64,
    /// Status.
    status: Status,
}

impl Summary {
    /// Create a new [`Download`] [`Summary`].
    pub fn new(download: Download) -> Self {
        Self {
            download,
            statuscode: None,
            size: 0,
            status: Status::NotStarted,
        }
    }

    /// Attach a status to a [`Download`] [`Summary`].
    pub fn with_status(self, status: Status) -> Self {
        Self { status, ..self }
    }

    /// Attach the HTTP status code of the response.
    pub fn with_statuscode(self, statuscode: StatusCode) -> Self {
        Self {
            statuscode: Some(statuscode),
            ..self
        }
    }

    /// Get the summary's HTTP status, if a response was received.
    pub fn statuscode(&self) -> Option<StatusCode> {
        self.statuscode
    }

    /// Get the number of bytes written to disk.
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Get a reference to the summary's download.
    pub fn download(&self) -> &Download {
        &self.download
    }

    /// Get a reference to the summary's status.
    pub fn status(&self) -> &Status {
        &self.status
    }

    pub fn fail(self, msg: impl std::fmt::Display) -> Self {
        Self {
            status: Status::Fail(format!("{msg}")),
            ..self
        }
    }

    pub(crate) fn add_size(&mut self, bytes: u64) {
        self.size += bytes;
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_filename_strips_scheme() {
        assert_eq!(
            Download::new("http://example.com/a.txt").filename,
            "example.com_a.txt"
        );
        assert_eq!(
            Download::new("https://example.com/a/b.zip").filename,
            "example.com_a_b.zip"
        );
    }

    #[test]
    fn test_filename_replaces_colons() {
        assert_eq!(
            Download::new("http://127.0.0.1:8080/x").filename,
            "127.0.0.1_8080_x"
        );
    }

    #[test]
    fn test_filename_strips_embedded_schemes() {
        assert_eq!(
            Download::new("http://a.com/?u=https://b.com/c").filename,
            "a.com_?u=b.com_c"
        );
    }

    #[test]
    fn test_filename_keeps_opaque_input() {
        assert_eq!(Download::new("not a url").filename, "not a url");
        assert_eq!(Download::new("ftp://host/f").filename, "ftp___host_f");
        assert_eq!(Download::new("http://").filename, "");
    }

    #[test]
    fn test_filename_collision() {
        let a = Download::new("http://example.com/x/y");
        let b = Download::new("https://example.com/x_y");
        assert_ne!(a.url, b.url);
        assert_eq!(a.filename, b.filename);
    }

    #[test]
    fn test_summary_starts_not_started() {
        let s = Summary::new(Download::from("http://example.com/a"));
        assert_eq!(s.status(), &Status::NotStarted);
        assert_eq!(s.statuscode(), None);
        assert_eq!(s.with_status(Status::Success).status(), &Status::Success);
    }

    #[test]
    fn test_summary_fail() {
        let s = Summary::new(Download::from("http://example.com/a"))
            .with_statuscode(StatusCode::NOT_FOUND)
            .fail("unexpected status 404 Not Found");
        assert_eq!(s.statuscode(), Some(StatusCode::NOT_FOUND));
        assert_eq!(
            s.status(),
            &Status::Fail("unexpected status 404 Not Found".into())
        );
        assert_eq!(s.size(), 0);
    }
}
