//! Loader for a local SDK archive file.

use std::path::PathBuf;

use tracing::info;

use crate::error::{Error, Result};
use crate::source::{required_param, Metadata, Mode, SdkLoader, VERSION_LOCAL};

/// Loads the SDK from a file already present on the local filesystem.
///
/// No network access and no copy into the download cache; the archive
/// is extracted straight from where it lives. The `local` version
/// sentinel keeps every update a redeploy.
#[derive(Debug, Clone)]
pub struct LocalLoader {
    path: PathBuf,
}

impl LocalLoader {
    pub fn from_params(params: &Metadata) -> Result<Self> {
        let path = PathBuf::from(required_param(params, "path", Mode::Local)?);
        Ok(Self { path })
    }
}

impl SdkLoader for LocalLoader {
    fn resolve(&mut self) -> Result<Metadata> {
        Ok(self.metadata())
    }

    fn fetch_component(&self, _hw_target: &str) -> Result<PathBuf> {
        if !self.path.is_file() {
            return Err(Error::fetch(format!(
                "local SDK archive not found: {}",
                self.path.display()
            )));
        }
        info!("using local SDK archive {}", self.path.display());
        Ok(self.path.clone())
    }

    fn metadata(&self) -> Metadata {
        Metadata::from([
            ("mode".to_string(), Mode::Local.to_string()),
            ("path".to_string(), self.path.display().to_string()),
            ("version".to_string(), VERSION_LOCAL.to_string()),
        ])
    }
}
