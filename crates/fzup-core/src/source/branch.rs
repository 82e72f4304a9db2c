//! Loader for firmware branches on the update server.

use std::path::PathBuf;

use tracing::info;

use crate::error::{Error, Result};
use crate::index::{BranchIndex, FileType};
use crate::net::Downloader;
use crate::source::{required_param, Metadata, Mode, SdkLoader, VERSION_UNKNOWN};

/// Default root URL for branch directory listings.
pub const DEFAULT_BRANCH_ROOT: &str = "https://update.flipperzero.one/builds/firmware";

/// Loads the SDK from a branch directory listing on the update server.
#[derive(Debug, Clone)]
pub struct BranchLoader {
    branch: String,
    branch_root: String,
    downloads: Downloader,
    index: Option<BranchIndex>,
}

impl BranchLoader {
    /// Build a loader from flat parameters; `branch` is required,
    /// `branch_root_url` falls back to the official update server.
    pub fn from_params(params: &Metadata, downloads: Downloader) -> Result<Self> {
        let branch = required_param(params, "branch", Mode::Branch)?.to_string();
        let branch_root = params
            .get("branch_root_url")
            .filter(|v| !v.is_empty())
            .cloned()
            .unwrap_or_else(|| DEFAULT_BRANCH_ROOT.to_string());
        Ok(Self {
            branch,
            branch_root,
            downloads,
            index: None,
        })
    }

    fn branch_url(&self) -> String {
        format!("{}/{}/", self.branch_root.trim_end_matches('/'), self.branch)
    }
}

impl SdkLoader for BranchLoader {
    fn resolve(&mut self) -> Result<Metadata> {
        let branch_url = self.branch_url();
        info!("fetching branch index {branch_url}");
        let html = self.downloads.get_text(&branch_url)?;
        let index = BranchIndex::parse(&html)?;
        info!("found version {}", index.version);
        self.index = Some(index);
        Ok(self.metadata())
    }

    fn fetch_component(&self, hw_target: &str) -> Result<PathBuf> {
        let index = self
            .index
            .as_ref()
            .ok_or_else(|| Error::resolution("branch index was not resolved"))?;
        let file_name = index
            .file_for(FileType::SdkZip, hw_target)
            .ok_or_else(|| Error::fetch(format!("SDK bundle not found for {hw_target}")))?;
        self.downloads
            .fetch_file(&format!("{}{}", self.branch_url(), file_name))
    }

    fn metadata(&self) -> Metadata {
        let version = self
            .index
            .as_ref()
            .map(|i| i.version.clone())
            .unwrap_or_else(|| VERSION_UNKNOWN.to_string());
        Metadata::from([
            ("mode".to_string(), Mode::Branch.to_string()),
            ("branch".to_string(), self.branch.clone()),
            ("branch_root_url".to_string(), self.branch_root.clone()),
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
    fn requires_branch_parameter() {
        let err = BranchLoader::from_params(&Metadata::new(), downloader()).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn metadata_round_trips_through_constructor() {
        let params = Metadata::from([
            ("branch".to_string(), "dev".to_string()),
            (
                "branch_root_url".to_string(),
                "https://mirror.example/builds".to_string(),
            ),
        ]);
        let loader = BranchLoader::from_params(&params, downloader()).unwrap();
        let rebuilt = BranchLoader::from_params(&loader.metadata(), downloader()).unwrap();
        assert_eq!(loader.metadata(), rebuilt.metadata());
    }

    #[test]
    fn default_root_applies_when_absent() {
        let params = Metadata::from([("branch".to_string(), "dev".to_string())]);
        let loader = BranchLoader::from_params(&params, downloader()).unwrap();
        assert_eq!(
            loader.branch_url(),
            format!("{DEFAULT_BRANCH_ROOT}/dev/")
        );
    }

    #[test]
    fn fetch_before_resolve_is_an_error() {
        let params = Metadata::from([("branch".to_string(), "dev".to_string())]);
        let loader = BranchLoader::from_params(&params, downloader()).unwrap();
        assert!(matches!(
            loader.fetch_component("f7"),
            Err(Error::Resolution(_))
        ));
    }
}
