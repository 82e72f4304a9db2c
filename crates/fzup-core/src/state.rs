//! Persisted deployment state.
//!
//! One JSON file per deployment directory records the last successful
//! deployment. It is written only after a deploy fully succeeds, read
//! at the start of every `update` or `status` invocation, and removed
//! by `clean`. The deployment engine is its sole owner.

use std::collections::BTreeMap;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::source::{Metadata, Mode, VERSION_LOCAL, VERSION_UNKNOWN};

/// Name of the state file inside the deployed SDK directory.
pub const STATE_FILE_NAME: &str = "fzup_state.json";

/// On-disk record of the last successful deployment.
///
/// Mode-specific loader parameters are flattened into the same key
/// namespace as the fixed fields, matching the schema produced by
/// [`SdkLoader::metadata`](crate::source::SdkLoader::metadata).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SdkState {
    pub hw_target: String,
    pub mode: Mode,
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deployed_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub params: BTreeMap<String, String>,
}

impl SdkState {
    /// Assemble the state record for a finished deployment from the
    /// effective hardware target and the loader's resolved metadata.
    pub fn from_deployment(hw_target: &str, mut metadata: Metadata) -> Result<Self> {
        let mode: Mode = metadata
            .remove("mode")
            .ok_or_else(|| Error::config("loader metadata is missing the mode tag"))?
            .parse()?;
        let version = metadata
            .remove("version")
            .unwrap_or_else(|| VERSION_UNKNOWN.to_string());
        Ok(Self {
            hw_target: hw_target.to_string(),
            mode,
            version,
            deployed_at: Some(Utc::now()),
            params: metadata,
        })
    }

    /// Whether the recorded version can take part in the staleness
    /// comparison. The `unknown` and `local` sentinels are always
    /// treated as stale.
    pub fn is_version_comparable(&self) -> bool {
        !self.version.is_empty()
            && self.version != VERSION_UNKNOWN
            && self.version != VERSION_LOCAL
    }

    /// Read the state file, returning `None` if it does not exist.
    pub fn load(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(path)?;
        let state: Self = serde_json::from_str(&content).map_err(|e| {
            Error::config(format!("invalid state file {}: {e}", path.display()))
        })?;
        debug!("loaded state: {state:?}");
        Ok(Some(state))
    }

    /// Write the state file as pretty JSON.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| Error::config(format!("failed to serialize state: {e}")))?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn channel_metadata() -> Metadata {
        Metadata::from([
            ("mode".to_string(), "channel".to_string()),
            ("channel".to_string(), "release".to_string()),
            ("index_url".to_string(), "https://example.com/d.json".to_string()),
            ("version".to_string(), "1.2.0".to_string()),
        ])
    }

    #[test]
    fn splits_metadata_into_fixed_fields_and_params() {
        let state = SdkState::from_deployment("f7", channel_metadata()).unwrap();
        assert_eq!(state.hw_target, "f7");
        assert_eq!(state.mode, Mode::Channel);
        assert_eq!(state.version, "1.2.0");
        assert_eq!(state.params["channel"], "release");
        assert!(!state.params.contains_key("mode"));
        assert!(!state.params.contains_key("version"));
    }

    #[test]
    fn missing_mode_tag_is_a_config_error() {
        let mut metadata = channel_metadata();
        metadata.remove("mode");
        assert!(matches!(
            SdkState::from_deployment("f7", metadata),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn sentinel_versions_are_not_comparable() {
        let mut state = SdkState::from_deployment("f7", channel_metadata()).unwrap();
        assert!(state.is_version_comparable());
        state.version = VERSION_UNKNOWN.to_string();
        assert!(!state.is_version_comparable());
        state.version = VERSION_LOCAL.to_string();
        assert!(!state.is_version_comparable());
    }

    #[test]
    fn state_file_round_trips_with_flat_params() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join(STATE_FILE_NAME);

        let state = SdkState::from_deployment("f18", channel_metadata()).unwrap();
        state.save(&path).unwrap();

        // Params share the top-level JSON namespace with the fixed fields.
        let raw: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw["hw_target"], "f18");
        assert_eq!(raw["mode"], "channel");
        assert_eq!(raw["channel"], "release");

        let loaded = SdkState::load(&path).unwrap().expect("state exists");
        assert_eq!(loaded, state);
    }

    #[test]
    fn absent_state_file_loads_as_none() {
        let temp = tempfile::tempdir().unwrap();
        assert!(SdkState::load(&temp.path().join("missing.json"))
            .unwrap()
            .is_none());
    }

    #[test]
    fn malformed_state_file_is_a_config_error() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join(STATE_FILE_NAME);
        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(SdkState::load(&path), Err(Error::Config(_))));
    }
}
