//! Fixed on-disk layout of a site.
//!
//! ```text
//! my-blog/
//! ├── bazel.toml        config
//! ├── .bazel-version    upgrade marker
//! ├── posts/            markdown posts
//! ├── pages/            markdown or legacy html pages
//! ├── themes/           reserved for custom themes
//! └── public/           build output (replaced on every build)
//!     ├── index.html
//!     ├── style.css
//!     ├── feed.xml
//!     ├── posts/
//!     └── pages/
//! ```

use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = "bazel.toml";
pub const VERSION_FILE: &str = ".bazel-version";
pub const POSTS_DIR: &str = "posts";
pub const PAGES_DIR: &str = "pages";
pub const THEMES_DIR: &str = "themes";
pub const OUTPUT_DIR: &str = "public";

pub const INDEX_FILE: &str = "index.html";
pub const STYLE_FILE: &str = "style.css";
pub const FEED_FILE: &str = "feed.xml";

/// Root-level output artifacts that are never sorted into subdirectories.
pub const CORE_ARTIFACTS: &[&str] = &[INDEX_FILE, STYLE_FILE, FEED_FILE];

/// Resolves every fixed path of a site from its root directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SitePaths {
    root: PathBuf,
}

impl SitePaths {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config_file(&self) -> PathBuf {
        self.root.join(CONFIG_FILE)
    }

    pub fn version_file(&self) -> PathBuf {
        self.root.join(VERSION_FILE)
    }

    pub fn posts_dir(&self) -> PathBuf {
        self.root.join(POSTS_DIR)
    }

    pub fn pages_dir(&self) -> PathBuf {
        self.root.join(PAGES_DIR)
    }

    pub fn themes_dir(&self) -> PathBuf {
        self.root.join(THEMES_DIR)
    }

    pub fn output_dir(&self) -> PathBuf {
        self.root.join(OUTPUT_DIR)
    }

    /// Path of a root-level output file, e.g. `public/index.html`.
    #[cfg(test)]
    pub fn output_file(&self, name: &str) -> PathBuf {
        self.output_dir().join(name)
    }

    /// A directory is a site when it contains `bazel.toml`.
    pub fn is_site(&self) -> bool {
        self.config_file().is_file()
    }
}
