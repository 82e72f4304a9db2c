//! Channel index schema and selection.
//!
//! The update server publishes a JSON directory of release channels,
//! each carrying a latest-first list of versions with their artifact
//! files. Selection always takes the first entry of a channel's
//! version list; the index ordering is trusted, not re-verified.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::index::FileType;

/// Named release track of the update server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateChannel {
    Development,
    ReleaseCandidate,
    Release,
}

impl UpdateChannel {
    /// Channel id as it appears in the index JSON.
    pub fn id(&self) -> &'static str {
        match self {
            UpdateChannel::Development => "development",
            UpdateChannel::ReleaseCandidate => "release-candidate",
            UpdateChannel::Release => "release",
        }
    }

    /// Short name used on the command line and in persisted state.
    pub fn short_name(&self) -> &'static str {
        match self {
            UpdateChannel::Development => "dev",
            UpdateChannel::ReleaseCandidate => "rc",
            UpdateChannel::Release => "release",
        }
    }
}

impl fmt::Display for UpdateChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short_name())
    }
}

impl FromStr for UpdateChannel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "dev" | "development" => Ok(UpdateChannel::Development),
            "rc" | "release-candidate" => Ok(UpdateChannel::ReleaseCandidate),
            "release" => Ok(UpdateChannel::Release),
            other => Err(Error::config(format!("invalid update channel: {other}"))),
        }
    }
}

/// Top-level channel directory document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelIndex {
    #[serde(default)]
    pub channels: Vec<ChannelEntry>,
}

/// One release track within the directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelEntry {
    pub id: String,
    #[serde(default)]
    pub versions: Vec<VersionEntry>,
}

/// One published version with its artifact files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VersionEntry {
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub changelog: Option<String>,
    #[serde(default)]
    pub files: Vec<FileEntry>,
}

/// One downloadable artifact of a version.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileEntry {
    #[serde(rename = "type")]
    pub kind: String,
    pub target: String,
    pub url: String,
}

impl ChannelIndex {
    /// Select the latest version published on `channel`.
    pub fn latest(&self, channel: UpdateChannel) -> Result<&VersionEntry> {
        let entry = self
            .channels
            .iter()
            .find(|c| c.id == channel.id())
            .ok_or_else(|| Error::resolution(format!("invalid channel: {channel}")))?;
        entry
            .versions
            .first()
            .ok_or_else(|| Error::resolution(format!("empty channel: {channel}")))
    }
}

impl VersionEntry {
    /// Find the SDK archive published for `target`.
    pub fn sdk_file(&self, target: &str) -> Result<&FileEntry> {
        let file = self
            .files
            .iter()
            .find(|f| f.kind == FileType::SdkZip.as_str() && f.target == target)
            .ok_or_else(|| {
                Error::resolution(format!(
                    "no {} entry for target {target} in version {}",
                    FileType::SdkZip.as_str(),
                    self.version
                ))
            })?;
        if file.url.is_empty() {
            return Err(Error::resolution(format!(
                "empty download url for target {target} in version {}",
                self.version
            )));
        }
        Ok(file)
    }
}
