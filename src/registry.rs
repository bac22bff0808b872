//! Registry of known sites, stored in `~/.config/bazel/sites.json`.
//!
//! ```json
//! {
//!   "sites": [
//!     {
//!       "name": "my-blog",
//!       "path": "/home/me/my-blog",
//!       "created_at": "2025-07-01T12:00:00Z",
//!       "last_used": "2025-07-02T08:30:00Z",
//!       "description": "Welcome to Bazel! This is your new static site."
//!     }
//!   ]
//! }
//! ```

use crate::config::paths::CONFIG_FILE;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};
use thiserror::Error;

const REGISTRY_PATH: &str = "~/.config/bazel/sites.json";

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("site `{0}` not found in registry")]
    NotFound(String),

    #[error("could not determine the home directory")]
    HomeDir,

    #[error("IO error when accessing `{0}`")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("registry file `{0}` is corrupt")]
    Json(PathBuf, #[source] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteEntry {
    pub name: String,
    pub path: PathBuf,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub last_used: DateTime<Utc>,
    #[serde(default)]
    pub description: String,
}

impl SiteEntry {
    /// `3 hours ago` within a day, `Jul 1, 2025` after, `never` if unset.
    pub fn last_used_label(&self, now: DateTime<Utc>) -> String {
        if self.last_used == DateTime::<Utc>::default() || self.last_used.timestamp() < 0 {
            return "never".to_owned();
        }
        let elapsed = now.signed_duration_since(self.last_used);
        if elapsed.num_hours() < 24 {
            format!("{} hours ago", elapsed.num_hours().max(0))
        } else {
            self.last_used.format("%b %-d, %Y").to_string()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registry {
    #[serde(default)]
    sites: Vec<SiteEntry>,
    #[serde(skip)]
    file: PathBuf,
}

impl Registry {
    /// Load the per-user registry.
    pub fn load() -> Result<Self, RegistryError> {
        Self::load_from(default_path()?)
    }

    /// Load from `file`; a missing file is an empty registry.
    pub fn load_from(file: impl Into<PathBuf>) -> Result<Self, RegistryError> {
        let file = file.into();
        let mut registry = match fs::read_to_string(&file) {
            Ok(content) => serde_json::from_str::<Self>(&content)
                .map_err(|err| RegistryError::Json(file.clone(), err))?,
            Err(err) if err.kind() == ErrorKind::NotFound => Self::default(),
            Err(err) => return Err(RegistryError::Io(file, err)),
        };
        registry.file = file;
        Ok(registry)
    }

    pub fn save(&self) -> Result<(), RegistryError> {
        if let Some(parent) = self.file.parent() {
            fs::create_dir_all(parent).map_err(|err| RegistryError::Io(parent.to_path_buf(), err))?;
        }
        let json = serde_json::to_string_pretty(self)
            .map_err(|err| RegistryError::Json(self.file.clone(), err))?;
        fs::write(&self.file, json).map_err(|err| RegistryError::Io(self.file.clone(), err))
    }

    /// Register a site, or update name and description of the entry with
    /// the same path.
    pub fn add_site(&mut self, name: &str, path: &Path, description: &str) -> Result<(), RegistryError> {
        let now = Utc::now();
        match self.sites.iter_mut().find(|s| s.path == path) {
            Some(site) => {
                site.name = name.to_owned();
                site.description = description.to_owned();
                site.last_used = now;
            }
            None => self.sites.push(SiteEntry {
                name: name.to_owned(),
                path: path.to_path_buf(),
                created_at: now,
                last_used: now,
                description: description.to_owned(),
            }),
        }
        self.save()
    }

    pub fn remove_site(&mut self, path: &Path) -> Result<(), RegistryError> {
        let Some(index) = self.sites.iter().position(|s| s.path == path) else {
            return Err(RegistryError::NotFound(path.display().to_string()));
        };
        self.sites.remove(index);
        self.save()
    }

    /// Bump `last_used`; unknown paths are ignored.
    pub fn touch_last_used(&mut self, path: &Path) -> Result<(), RegistryError> {
        match self.sites.iter_mut().find(|s| s.path == path) {
            Some(site) => {
                site.last_used = Utc::now();
                self.save()
            }
            None => Ok(()),
        }
    }

    pub fn list(&self) -> &[SiteEntry] {
        &self.sites
    }

    pub fn find_by_name(&self, name: &str) -> Result<&SiteEntry, RegistryError> {
        self.sites
            .iter()
            .find(|s| s.name == name)
            .ok_or_else(|| RegistryError::NotFound(name.to_owned()))
    }

    /// Drop entries whose directory no longer holds a `bazel.toml`.
    /// Returns how many were removed. Not persisted until [`Registry::save`].
    pub fn prune_missing(&mut self) -> usize {
        let before = self.sites.len();
        self.sites.retain(|s| s.path.join(CONFIG_FILE).is_file());
        before - self.sites.len()
    }
}

fn default_path() -> Result<PathBuf, RegistryError> {
    let expanded = shellexpand::tilde(REGISTRY_PATH);
    if expanded.starts_with('~') {
        return Err(RegistryError::HomeDir);
    }
    Ok(PathBuf::from(expanded.into_owned()))
}
