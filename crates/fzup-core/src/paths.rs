//! State directory resolution.

use std::path::PathBuf;

/// Environment variable overriding the state directory root.
pub const STATE_DIR_ENV: &str = "FZUP_HOME";

/// Resolve the default state directory root.
///
/// Honors `FZUP_HOME` when set and non-empty, otherwise falls back to
/// `~/.fzup`. The result is passed explicitly into [`SdkDeployer`] so
/// the engine itself never reads ambient process state.
///
/// [`SdkDeployer`]: crate::deploy::SdkDeployer
pub fn default_state_dir() -> PathBuf {
    if let Ok(dir) = std::env::var(STATE_DIR_ENV) {
        if !dir.is_empty() {
            return PathBuf::from(dir);
        }
    }
    dirs::home_dir()
        .map(|h| h.join(".fzup"))
        .unwrap_or_else(|| PathBuf::from(".fzup"))
}
