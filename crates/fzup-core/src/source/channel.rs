//! Loader for release channels on the update server.

use std::path::PathBuf;

use tracing::info;

use crate::error::{Error, Result};
use crate::index::channel::{ChannelIndex, VersionEntry};
use crate::index::UpdateChannel;
use crate::net::Downloader;
use crate::source::{required_param, Metadata, Mode, SdkLoader, VERSION_UNKNOWN};

/// Default URL of the official channel directory.
pub const DEFAULT_INDEX_URL: &str = "https://update.flipperzero.one/firmware/directory.json";

/// Loads the SDK from a release channel via the JSON directory index.
///
/// Works against the official update server and any unofficial server
/// publishing the same document shape.
#[derive(Debug, Clone)]
pub struct ChannelLoader {
    channel: UpdateChannel,
    index_url: String,
    downloads: Downloader,
    resolved: Option<VersionEntry>,
}

impl ChannelLoader {
    /// Build a loader from flat parameters; `channel` is required,
    /// `index_url` falls back to the official directory.
    pub fn from_params(params: &Metadata, downloads: Downloader) -> Result<Self> {
        let channel: UpdateChannel = required_param(params, "channel", Mode::Channel)?.parse()?;
        let index_url = params
            .get("index_url")
            .filter(|v| !v.is_empty())
            .cloned()
            .unwrap_or_else(|| DEFAULT_INDEX_URL.to_string());
        Ok(Self {
            channel,
            index_url,
            downloads,
            resolved: None,
        })
    }
}

impl SdkLoader for ChannelLoader {
    fn resolve(&mut self) -> Result<Metadata> {
        info!(
            "fetching version info for channel {} from {}",
            self.channel, self.index_url
        );
        let index: ChannelIndex = self.downloads.get_json(&self.index_url)?;
        let version = index.latest(self.channel)?.clone();
        info!("using version {}", version.version);
        self.resolved = Some(version);
        Ok(self.metadata())
    }

    fn fetch_component(&self, hw_target: &str) -> Result<PathBuf> {
        let version = self
            .resolved
            .as_ref()
            .ok_or_else(|| Error::resolution("channel index was not resolved"))?;
        let file = version.sdk_file(hw_target)?;
        self.downloads.fetch_file(&file.url)
    }

    fn metadata(&self) -> Metadata {
        let version = self
            .resolved
            .as_ref()
            .map(|v| v.version.clone())
            .unwrap_or_else(|| VERSION_UNKNOWN.to_string());
        Metadata::from([
            ("mode".to_string(), Mode::Channel.to_string()),
            ("channel".to_string(), self.channel.to_string()),
            ("index_url".to_string(), self.index_url.clone()),
            ("version".to_string(), version),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn downloader() -> Downloader {
        Downloader::new(std::env::temp_dir().join("fzup-test-downloads")).unwrap()
    }

    #[test]
    fn requires_channel_parameter() {
        let err = ChannelLoader::from_params(&Metadata::new(), downloader()).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn rejects_unknown_channel_name() {
        let params = Metadata::from([("channel".to_string(), "stable".to_string())]);
        let err = ChannelLoader::from_params(&params, downloader()).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn metadata_round_trips_through_constructor() {
        let params = Metadata::from([("channel".to_string(), "rc".to_string())]);
        let loader = ChannelLoader::from_params(&params, downloader()).unwrap();
        let rebuilt = ChannelLoader::from_params(&loader.metadata(), downloader()).unwrap();
        assert_eq!(loader.metadata(), rebuilt.metadata());
        assert_eq!(loader.metadata()["channel"], "rc");
        assert_eq!(loader.metadata()["index_url"], DEFAULT_INDEX_URL);
    }

    #[test]
    fn unresolved_loader_reports_unknown_version() {
        let params = Metadata::from([("channel".to_string(), "release".to_string())]);
        let loader = ChannelLoader::from_params(&params, downloader()).unwrap();
        assert_eq!(loader.metadata()["version"], VERSION_UNKNOWN);
    }
}
