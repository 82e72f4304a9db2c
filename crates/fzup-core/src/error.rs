//! Error taxonomy for SDK resolution and deployment.

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Failure classes surfaced by loaders and the deployment engine.
///
/// All variants are recoverable at the top level: the CLI logs the
/// message and exits non-zero. None of them leave the persisted state
/// or the deployed directory in an inconsistent condition.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The remote index was unreachable, malformed, or did not contain
    /// the requested channel, target or file type.
    #[error("resolution error: {0}")]
    Resolution(String),

    /// The SDK artifact could not be located or downloaded.
    #[error("fetch error: {0}")]
    Fetch(String),

    /// The request or persisted state does not form a valid loader
    /// configuration (unknown mode, missing required parameter).
    #[error("configuration error: {0}")]
    Config(String),

    /// A downloaded bundle could not be read as a zip archive.
    #[error("archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    pub fn resolution(msg: impl Into<String>) -> Self {
        Self::Resolution(msg.into())
    }

    pub fn fetch(msg: impl Into<String>) -> Self {
        Self::Fetch(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}
