//! Deployment engine.
//!
//! One state transition per invocation: resolve the source, decide
//! staleness, and either skip or replace the deployed directory. The
//! previously deployed SDK and its state file are touched only after
//! the new artifact has been fully fetched and extracted, so a crash or
//! network failure never leaves the system without a working
//! deployment.

use std::fs;
use std::path::{Path, PathBuf};

use fs2::FileExt;
use tracing::{debug, info};

use crate::archive::extract_zip;
use crate::error::Result;
use crate::net::Downloader;
use crate::source::loader_for_task;
use crate::state::{SdkState, STATE_FILE_NAME};
use crate::task::EffectiveTask;

const LOCK_FILE_NAME: &str = ".fzup.lock";
const STAGING_PREFIX: &str = ".staging-";

/// Terminal state of a deploy invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeployOutcome {
    /// The deployed SDK already matches the resolved version and target.
    UpToDate { version: String },
    /// A fresh SDK was fetched and deployed.
    Deployed { version: String },
}

impl DeployOutcome {
    pub fn version(&self) -> &str {
        match self {
            DeployOutcome::UpToDate { version } | DeployOutcome::Deployed { version } => version,
        }
    }
}

/// Orchestrates source resolution, staleness decision, artifact fetch
/// and atomic directory replacement under one state directory root.
#[derive(Debug, Clone)]
pub struct SdkDeployer {
    state_root: PathBuf,
    download_dir: PathBuf,
    sdk_dir: PathBuf,
    state_file: PathBuf,
}

impl SdkDeployer {
    /// Create an engine rooted at `state_root`. No ambient process
    /// state is consulted; callers resolve the root themselves (see
    /// [`paths::default_state_dir`](crate::paths::default_state_dir)).
    pub fn new(state_root: impl Into<PathBuf>) -> Self {
        let state_root = state_root.into();
        let download_dir = state_root.join("download");
        let sdk_dir = state_root.join("current");
        let state_file = sdk_dir.join(STATE_FILE_NAME);
        Self {
            state_root,
            download_dir,
            sdk_dir,
            state_file,
        }
    }

    pub fn state_root(&self) -> &Path {
        &self.state_root
    }

    pub fn download_dir(&self) -> &Path {
        &self.download_dir
    }

    /// Directory holding the currently deployed SDK.
    pub fn sdk_dir(&self) -> &Path {
        &self.sdk_dir
    }

    /// Read the state persisted by the last successful deployment.
    pub fn previous_state(&self) -> Result<Option<SdkState>> {
        SdkState::load(&self.state_file)
    }

    /// Resolve, decide staleness, and deploy if needed.
    pub fn deploy(&self, task: &EffectiveTask) -> Result<DeployOutcome> {
        info!("deploying SDK for {}", task.hw_target);
        let downloads = Downloader::new(self.download_dir.clone())?;
        let mut loader = loader_for_task(task, downloads)?;

        // Resolution failure aborts before anything on disk is touched.
        let metadata = loader.resolve()?;
        let resolved_version = metadata
            .get("version")
            .cloned()
            .unwrap_or_else(|| crate::source::VERSION_UNKNOWN.to_string());

        info!("SDK dir: {}", self.sdk_dir.display());
        if !task.force && self.sdk_dir.exists() {
            if let Some(previous) = self.previous_state()? {
                if should_skip(&previous, task, &resolved_version) {
                    info!("SDK is up-to-date");
                    return Ok(DeployOutcome::UpToDate {
                        version: resolved_version,
                    });
                }
                if !previous.is_version_comparable() {
                    info!("deployed SDK is unversioned, updating");
                }
            }
        }

        let _lock = DeployLock::acquire(&self.state_root)?;

        // A failed fetch leaves the deployed directory and state file
        // byte-identical to their pre-call state.
        let archive_path = loader.fetch_component(&task.hw_target)?;

        // Extract into a staging directory next to the final location,
        // then swap, so a crash mid-extraction cannot leave a
        // half-populated deployment.
        let staging = tempfile::Builder::new()
            .prefix(STAGING_PREFIX)
            .tempdir_in(&self.state_root)?;
        extract_zip(&archive_path, staging.path())?;

        let state = SdkState::from_deployment(&task.hw_target, loader.metadata())?;

        if self.sdk_dir.exists() {
            fs::remove_dir_all(&self.sdk_dir)?;
        }
        fs::rename(staging.keep(), &self.sdk_dir)?;
        state.save(&self.state_file)?;

        info!("SDK deployed");
        Ok(DeployOutcome::Deployed {
            version: resolved_version,
        })
    }

    /// Remove the deployed SDK directory (and its state file).
    pub fn clean_sdk(&self) -> Result<()> {
        info!("cleaning SDK state in {}", self.sdk_dir.display());
        remove_dir_if_present(&self.sdk_dir)
    }

    /// Remove the download cache.
    pub fn clean_downloads(&self) -> Result<()> {
        info!("cleaning download dir {}", self.download_dir.display());
        remove_dir_if_present(&self.download_dir)
    }

    /// Remove the entire state directory root.
    pub fn purge(&self) -> Result<()> {
        info!("cleaning complete state in {}", self.state_root.display());
        remove_dir_if_present(&self.state_root)
    }
}

/// Skip the redeploy when the persisted deployment already matches the
/// freshly resolved version and hardware target. Sentinel versions
/// never match.
fn should_skip(previous: &SdkState, task: &EffectiveTask, resolved_version: &str) -> bool {
    previous.is_version_comparable()
        && previous.version == resolved_version
        && previous.hw_target == task.hw_target
}

fn remove_dir_if_present(dir: &Path) -> Result<()> {
    if dir.exists() {
        fs::remove_dir_all(dir)?;
    }
    Ok(())
}

/// Advisory lock held for the duration of the redeploy phase, so two
/// concurrent invocations sharing a state directory cannot interleave
/// their directory replacement.
struct DeployLock {
    file: fs::File,
}

impl DeployLock {
    fn acquire(state_root: &Path) -> Result<Self> {
        fs::create_dir_all(state_root)?;
        let path = state_root.join(LOCK_FILE_NAME);
        let file = fs::File::create(&path)?;
        debug!("acquiring deploy lock {}", path.display());
        FileExt::lock_exclusive(&file)?;
        Ok(Self { file })
    }
}

impl Drop for DeployLock {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
    }
}
