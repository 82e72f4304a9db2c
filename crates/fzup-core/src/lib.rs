//! fzup Core Library
//!
//! Provides the domain logic for resolving, fetching and deploying
//! versioned SDK bundles for Flipper hardware targets: the loader
//! abstraction over the four source modes (branch, channel, url, local),
//! the task reconciliation against previously persisted state, and the
//! deployment engine with its fail-safe replacement ordering.

pub mod archive;
pub mod deploy;
pub mod error;
pub mod index;
pub mod net;
pub mod paths;
pub mod source;
pub mod state;
pub mod status;
pub mod task;

/// Re-exports of commonly used types
pub mod prelude {
    pub use crate::deploy::{DeployOutcome, SdkDeployer};
    pub use crate::error::{Error, Result};
    pub use crate::index::channel::UpdateChannel;
    pub use crate::index::FileType;
    pub use crate::source::{Metadata, Mode, SdkLoader};
    pub use crate::state::SdkState;
    pub use crate::status::{collect_status, StatusReport};
    pub use crate::task::{reconcile, DeployTask, EffectiveTask};
}
