//! SDK source loaders.
//!
//! One capability interface over the four source modes. Each loader
//! knows how to resolve the available version for its source and how to
//! produce a local file path for the SDK archive, downloading if
//! needed. Loaders are constructed from the same flat metadata schema
//! they persist, so a loader rebuilt from its own metadata behaves
//! identically (round-trip property).

mod branch;
mod channel;
mod local;
mod url;

pub use branch::BranchLoader;
pub use channel::ChannelLoader;
pub use local::LocalLoader;
pub use url::UrlLoader;

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::net::Downloader;
use crate::task::EffectiveTask;

/// Version sentinel for sources that cannot report one.
pub const VERSION_UNKNOWN: &str = "unknown";
/// Version sentinel for local file sources.
pub const VERSION_LOCAL: &str = "local";

/// Flat serializable record describing a loader configuration plus its
/// resolved version. Always contains `mode` and `version`.
pub type Metadata = BTreeMap<String, String>;

/// Source strategy used to locate an SDK artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Branch,
    Channel,
    Url,
    Local,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Branch => "branch",
            Mode::Channel => "channel",
            Mode::Url => "url",
            Mode::Local => "local",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "branch" => Ok(Mode::Branch),
            "channel" => Ok(Mode::Channel),
            "url" => Ok(Mode::Url),
            "local" => Ok(Mode::Local),
            other => Err(Error::config(format!("invalid mode: {other}"))),
        }
    }
}

/// Uniform contract over the four SDK source modes.
pub trait SdkLoader {
    /// Probe the source for the available version and return the
    /// resolved metadata record. Must be called before
    /// [`fetch_component`](Self::fetch_component) for network-backed
    /// modes.
    fn resolve(&mut self) -> Result<Metadata>;

    /// Return a local path to the SDK archive for `hw_target`,
    /// downloading it into the download directory if necessary.
    fn fetch_component(&self, hw_target: &str) -> Result<PathBuf>;

    /// Flat record used both for persistence and for the staleness
    /// decision. Before [`resolve`](Self::resolve) the `version` field
    /// holds the mode's sentinel value.
    fn metadata(&self) -> Metadata;
}

/// Instantiate the loader for a task's mode from its flat parameters.
pub fn loader_for_task(task: &EffectiveTask, downloads: Downloader) -> Result<Box<dyn SdkLoader>> {
    match task.mode {
        Mode::Branch => Ok(Box::new(BranchLoader::from_params(&task.params, downloads)?)),
        Mode::Channel => Ok(Box::new(ChannelLoader::from_params(
            &task.params,
            downloads,
        )?)),
        Mode::Url => Ok(Box::new(UrlLoader::from_params(&task.params, downloads)?)),
        Mode::Local => Ok(Box::new(LocalLoader::from_params(&task.params)?)),
    }
}

/// Fetch a required, non-empty loader parameter.
fn required_param<'a>(params: &'a Metadata, key: &str, mode: Mode) -> Result<&'a str> {
    params
        .get(key)
        .map(String::as_str)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| Error::config(format!("{mode} mode requires the `{key}` parameter")))
}
