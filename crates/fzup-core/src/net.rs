//! Blocking HTTP client with download caching.

use std::fs::File;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::error::{Error, Result};

const USER_AGENT: &str = concat!("fzup/", env!("CARGO_PKG_VERSION"));
const CONNECT_TIMEOUT: Duration = Duration::from_secs(15);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(600);

/// Shared HTTP access for SDK loaders.
///
/// Index fetches map failures to [`Error::Resolution`]; artifact
/// downloads map failures to [`Error::Fetch`]. Every request carries an
/// explicit timeout, and downloaded files are streamed straight into
/// the download directory rather than buffered in memory.
#[derive(Debug, Clone)]
pub struct Downloader {
    client: reqwest::blocking::Client,
    download_dir: PathBuf,
}

impl Downloader {
    /// Create a downloader caching artifacts in `download_dir`.
    pub fn new(download_dir: PathBuf) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(USER_AGENT)
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| Error::fetch(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            download_dir,
        })
    }

    /// Directory downloaded artifacts are written to.
    pub fn download_dir(&self) -> &Path {
        &self.download_dir
    }

    /// Fetch a text document, such as a branch index page.
    pub fn get_text(&self, url: &str) -> Result<String> {
        debug!("fetching {url}");
        let response = self
            .client
            .get(url)
            .send()
            .and_then(|r| r.error_for_status())
            .map_err(|e| Error::resolution(format!("failed to fetch index {url}: {e}")))?;
        response
            .text()
            .map_err(|e| Error::resolution(format!("failed to read index {url}: {e}")))
    }

    /// Fetch and deserialize a JSON document.
    pub fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        debug!("fetching {url}");
        let response = self
            .client
            .get(url)
            .send()
            .and_then(|r| r.error_for_status())
            .map_err(|e| Error::resolution(format!("failed to fetch index {url}: {e}")))?;
        response
            .json()
            .map_err(|e| Error::resolution(format!("malformed JSON index at {url}: {e}")))
    }

    /// Download `url` into the download directory and return the local path.
    pub fn fetch_file(&self, url: &str) -> Result<PathBuf> {
        let file_name = file_name_for(url)?;
        let file_path = self.download_dir.join(file_name);

        std::fs::create_dir_all(&self.download_dir)?;

        debug!("downloading {url} to {}", file_path.display());
        let mut response = self
            .client
            .get(url)
            .send()
            .and_then(|r| r.error_for_status())
            .map_err(|e| Error::fetch(format!("failed to download {url}: {e}")))?;

        let mut out_file = File::create(&file_path)?;
        response
            .copy_to(&mut out_file)
            .map_err(|e| Error::fetch(format!("failed to download {url}: {e}")))?;

        Ok(file_path)
    }
}

/// Derive a local cache file name from the last URL path segment.
fn file_name_for(url: &str) -> Result<String> {
    let parsed =
        Url::parse(url).map_err(|e| Error::fetch(format!("invalid download URL {url}: {e}")))?;
    let name = parsed
        .path_segments()
        .and_then(|mut segments| segments.next_back())
        .filter(|s| !s.is_empty())
        .unwrap_or("sdk-bundle.zip");
    Ok(name.to_string())
}
