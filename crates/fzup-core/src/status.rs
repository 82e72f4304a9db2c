//! Status collection for a state directory.

use std::collections::BTreeMap;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::deploy::SdkDeployer;
use crate::error::Result;
use crate::source::Mode;

/// Snapshot of a state directory, serializable for `status --json`.
///
/// "Not deployed" is a reported condition carried in `error`, not a
/// failure of collection itself.
#[derive(Debug, Clone, Serialize)]
pub struct StatusReport {
    pub state_dir: PathBuf,
    pub sdk_dir: PathBuf,
    pub download_dir: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<Mode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deployed_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub details: BTreeMap<String, String>,
}

impl StatusReport {
    pub fn is_deployed(&self) -> bool {
        self.error.is_none()
    }
}

/// Collect the deployment status under a deployer's state root.
pub fn collect_status(deployer: &SdkDeployer) -> Result<StatusReport> {
    let mut report = StatusReport {
        state_dir: deployer.state_root().to_path_buf(),
        sdk_dir: deployer.sdk_dir().to_path_buf(),
        download_dir: deployer.download_dir().to_path_buf(),
        error: None,
        target: None,
        mode: None,
        version: None,
        deployed_at: None,
        details: BTreeMap::new(),
    };

    match deployer.previous_state()? {
        Some(state) => {
            report.target = Some(state.hw_target);
            report.mode = Some(state.mode);
            report.version = Some(state.version);
            report.deployed_at = state.deployed_at;
            report.details = state.params;
        }
        None => {
            report.error = Some("SDK is not deployed".to_string());
        }
    }

    Ok(report)
}
