//! Remote installer scripts: download to a scoped temporary file, verify,
//! and hand the local path to the caller for execution.
use anyhow::{Context as _, Result, bail};
use std::io::Write as _;
use std::path::Path;
use std::time::Duration;

/// Abstraction over HTTP downloads, injectable for testing.
#[cfg_attr(test, mockall::automock)]
pub trait Downloader: Send + Sync + std::fmt::Debug {
    /// Download `url` into the file at `dest`, returning the number of bytes
    /// written.
    ///
    /// # Errors
    ///
    /// Returns an error on network failure, a non-success HTTP status, or an
    /// I/O error while writing `dest`.
    fn download(&self, url: &str, dest: &Path) -> Result<u64>;
}

/// Production [`Downloader`] backed by a [`ureq`] agent.
#[derive(Debug)]
pub struct HttpDownloader {
    agent: ureq::Agent,
}

impl HttpDownloader {
    /// Create a downloader whose requests time out after `timeout`
    /// (`None` waits indefinitely).
    #[must_use]
    pub fn new(timeout: Option<Duration>) -> Self {
        let config = ureq::Agent::config_builder()
            .timeout_global(timeout)
            .build();
        Self {
            agent: config.into(),
        }
    }
}

impl Downloader for HttpDownloader {
    fn download(&self, url: &str, dest: &Path) -> Result<u64> {
        let response = self
            .agent
            .get(url)
            .call()
            .with_context(|| format!("requesting {url}"))?;
        let mut reader = response.into_body().into_reader();
        let mut file = std::fs::File::create(dest)
            .with_context(|| format!("creating {}", dest.display()))?;
        let bytes = std::io::copy(&mut reader, &mut file)
            .with_context(|| format!("downloading {url}"))?;
        file.flush()
            .with_context(|| format!("writing {}", dest.display()))?;
        Ok(bytes)
    }
}

/// A downloaded installer script living in a temporary file.
///
/// The file is deleted when this value is dropped.
#[derive(Debug)]
pub struct FetchedScript {
    file: tempfile::NamedTempFile,
    /// Hex SHA-256 digest of the script contents.
    pub sha256: String,
    /// Size of the script in bytes.
    pub size: u64,
}

impl FetchedScript {
    /// Path of the local copy, suitable for passing to an interpreter.
    #[must_use]
    pub fn path(&self) -> &Path {
        self.file.path()
    }
}

/// Download `url` to a fresh temporary file and verify it was retrieved.
///
/// Verification requires a non-empty body; HTML error pages served with a
/// success status are rejected too.
///
/// # Errors
///
/// Returns an error if the temporary file cannot be created, the download
/// fails, or the retrieved content is empty or not a script.
pub fn fetch_script(downloader: &dyn Downloader, url: &str) -> Result<FetchedScript> {
    let file = tempfile::Builder::new()
        .prefix("devprep-")
        .suffix(".sh")
        .tempfile()
        .context("creating temporary file for installer script")?;

    let size = downloader.download(url, file.path())?;
    if size == 0 {
        bail!("downloaded installer from {url} is empty");
    }

    let bytes = std::fs::read(file.path())
        .with_context(|| format!("reading {}", file.path().display()))?;
    let head = String::from_utf8_lossy(bytes.get(..bytes.len().min(64)).unwrap_or_default());
    if head.trim_start().to_ascii_lowercase().starts_with("<!doctype html")
        || head.trim_start().to_ascii_lowercase().starts_with("<html")
    {
        bail!("downloaded installer from {url} is an HTML page, not a script");
    }

    Ok(FetchedScript {
        file,
        sha256: sha256_hex(&bytes),
        size,
    })
}

/// Lowercase hex SHA-256 digest of `bytes`.
#[must_use]
pub fn sha256_hex(bytes: &[u8]) -> String {
    use sha2::{Digest, Sha256};
    use std::fmt::Write as _;

    let digest = Sha256::digest(bytes);
    let mut hex = String::with_capacity(64);
    for b in &digest {
        // write! to a String is infallible; unwrap_or(()) makes that explicit.
        write!(hex, "{b:02x}").unwrap_or(());
    }
    hex
}
