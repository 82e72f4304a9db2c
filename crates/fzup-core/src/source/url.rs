//! Loader for a static SDK archive URL.

use std::path::PathBuf;

use tracing::info;

use crate::error::Result;
use crate::net::Downloader;
use crate::source::{required_param, Metadata, Mode, SdkLoader, VERSION_UNKNOWN};

/// Loads the SDK from a caller-supplied URL.
///
/// No version information is available, so the metadata carries the
/// `unknown` sentinel and every update re-fetches the archive.
#[derive(Debug, Clone)]
pub struct UrlLoader {
    url: String,
    downloads: Downloader,
}

impl UrlLoader {
    pub fn from_params(params: &Metadata, downloads: Downloader) -> Result<Self> {
        let url = required_param(params, "url", Mode::Url)?.to_string();
        Ok(Self { url, downloads })
    }
}

impl SdkLoader for UrlLoader {
    fn resolve(&mut self) -> Result<Metadata> {
        // Nothing to probe; the archive is whatever the URL serves.
        Ok(self.metadata())
    }

    fn fetch_component(&self, _hw_target: &str) -> Result<PathBuf> {
        info!("fetching SDK from {}", self.url);
        self.downloads.fetch_file(&self.url)
    }

    fn metadata(&self) -> Metadata {
        Metadata::from([
            ("mode".to_string(), Mode::Url.to_string()),
            ("url".to_string(), self.url.clone()),
            ("version".to_string(), VERSION_UNKNOWN.to_string()),
        ])
    }
}
