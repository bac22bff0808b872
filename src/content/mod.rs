//! Source content records.
//!
//! Records are built fresh on every build and never mutated afterwards.

pub mod frontmatter;
mod loader;
pub mod markdown;

pub use loader::{load_pages, load_posts};
pub use markdown::{CmarkRenderer, MarkdownRenderer};

use chrono::{DateTime, Utc};

/// Output subdirectory for rendered posts.
pub const POSTS_PREFIX: &str = "posts";
/// Output subdirectory for rendered pages.
pub const PAGES_PREFIX: &str = "pages";

/// Identity shared by every rendered item.
pub trait ContentItem {
    /// Source file name, e.g. `First Steps.md`.
    fn source(&self) -> &str;
    /// Output path relative to `public/`, e.g. `posts/First Steps.html`.
    fn url(&self) -> &str;
}

/// A dated blog post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Post {
    pub title: String,
    pub date: DateTime<Utc>,
    pub body: String,
    pub source: String,
    pub url: String,
}

/// A standalone page linked from the site navigation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    pub title: String,
    pub body: String,
    pub source: String,
    pub url: String,
}

impl ContentItem for Post {
    fn source(&self) -> &str {
        &self.source
    }
    fn url(&self) -> &str {
        &self.url
    }
}

impl ContentItem for Page {
    fn source(&self) -> &str {
        &self.source
    }
    fn url(&self) -> &str {
        &self.url
    }
}
