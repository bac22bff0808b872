//! Semantic version triples and the persisted site version marker.

use super::UpgradeError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, fmt, fs, io::ErrorKind, path::Path};

/// `major.minor.patch`, compared numerically per component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Version {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
}

impl Version {
    pub const ZERO: Self = Self::new(0, 0, 0);

    pub const fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self { major, minor, patch }
    }

    /// Parse leniently: a leading `v` is ignored, missing or non-numeric
    /// components count as `0`, and anything past the third is dropped.
    ///
    /// `"1.4"` → `1.4.0`, `"v2.0.1-beta"` → `2.0.0`
    pub fn parse(s: &str) -> Self {
        let s = s.trim();
        let s = s.strip_prefix(['v', 'V']).unwrap_or(s);
        let mut parts = s.split('.').map(|p| p.trim().parse::<u64>().unwrap_or(0));

        Self {
            major: parts.next().unwrap_or(0),
            minor: parts.next().unwrap_or(0),
            patch: parts.next().unwrap_or(0),
        }
    }

    /// Version of this build of the tool.
    pub fn tool() -> Self {
        Self::parse(env!("CARGO_PKG_VERSION"))
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

impl From<String> for Version {
    fn from(s: String) -> Self {
        Self::parse(&s)
    }
}

impl From<Version> for String {
    fn from(v: Version) -> Self {
        v.to_string()
    }
}

/// Contents of `.bazel-version`.
///
/// ```json
/// {
///   "version": "1.4.2",
///   "template_hash": "",
///   "last_upgrade": "2025-07-01T12:00:00Z"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteVersion {
    pub version: Version,
    #[serde(default)]
    pub template_hash: String,
    #[serde(default)]
    pub last_upgrade: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub features: BTreeMap<String, String>,
}

impl SiteVersion {
    /// Marker for a site that has never been upgraded.
    pub fn untracked() -> Self {
        Self {
            version: Version::ZERO,
            template_hash: String::new(),
            last_upgrade: DateTime::<Utc>::default(),
            features: BTreeMap::new(),
        }
    }

    /// Marker for a site created by this build of the tool.
    pub fn current() -> Self {
        Self {
            version: Version::tool(),
            last_upgrade: Utc::now(),
            ..Self::untracked()
        }
    }

    /// Read the marker. A missing file is `None`; an unreadable or
    /// undecodable one is an error.
    pub fn load(path: &Path) -> Result<Option<Self>, UpgradeError> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(UpgradeError::Io(path.to_path_buf(), err)),
        };
        serde_json::from_str(&content)
            .map(Some)
            .map_err(|err| UpgradeError::CorruptVersion(path.to_path_buf(), err))
    }

    pub fn save(&self, path: &Path) -> Result<(), UpgradeError> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|err| UpgradeError::CorruptVersion(path.to_path_buf(), err))?;
        fs::write(path, json).map_err(|err| UpgradeError::Io(path.to_path_buf(), err))
    }
}
