//! Upgrade error types.

use super::Version;
use std::{error::Error as StdError, path::PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum UpgradeError {
    #[error("`{0}` is not a bazel site (bazel.toml not found)")]
    NotASite(PathBuf),

    #[error("version marker `{0}` is corrupt")]
    CorruptVersion(PathBuf, #[source] serde_json::Error),

    #[error("IO error when accessing `{0}`")]
    Io(PathBuf, #[source] std::io::Error),

    /// A migration step failed; nothing was persisted.
    #[error("upgrade {from} → {to} ({description}) failed")]
    Step {
        from: Version,
        to: Version,
        description: &'static str,
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },

    #[error("failed to rebuild site after upgrade")]
    Rebuild(#[source] Box<dyn StdError + Send + Sync>),
}
