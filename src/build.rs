//! Site building orchestration.
//!
//! # Stages
//!
//! ```text
//! build_site()
//!     │
//!     ├── LoadConfig        bazel.toml → SiteConfig
//!     ├── ResetOutputDir    rm -r public/ && mkdir public/{posts,pages}
//!     ├── LoadPosts         posts/*.md          → Vec<Post>, newest first
//!     ├── LoadPages         pages/*.{md,html}   → Vec<Page>
//!     ├── RenderCss         public/style.css
//!     ├── RenderIndex       public/index.html
//!     ├── RenderPosts       public/posts/*.html
//!     ├── RenderPages       public/pages/*.html
//!     └── RenderFeed        public/feed.xml
//! ```
//!
//! One linear pass with no retries. The first failing stage aborts the rest
//! and its error is returned with the stage name as context. Output written
//! before the failure is left as is.

use crate::{
    config::{SiteConfig, SitePaths, paths},
    content::{self, CmarkRenderer, MarkdownRenderer},
    generator, log,
};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use std::{fmt, fs, io::ErrorKind, path::Path, time::Instant};

/// Pipeline stages in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildStage {
    LoadConfig,
    ResetOutputDir,
    LoadPosts,
    LoadPages,
    RenderCss,
    RenderIndex,
    RenderPosts,
    RenderPages,
    RenderFeed,
}

impl fmt::Display for BuildStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::LoadConfig => "load config",
            Self::ResetOutputDir => "reset output directory",
            Self::LoadPosts => "load posts",
            Self::LoadPages => "load pages",
            Self::RenderCss => "generate CSS",
            Self::RenderIndex => "generate index",
            Self::RenderPosts => "generate posts",
            Self::RenderPages => "generate pages",
            Self::RenderFeed => "generate RSS feed",
        })
    }
}

/// Counts reported by a finished build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildSummary {
    pub posts: usize,
    pub pages: usize,
}

/// Build the site rooted at `paths` with the default markdown renderer.
pub fn build_site(paths: &SitePaths) -> Result<BuildSummary> {
    build_site_with(paths, &CmarkRenderer, Utc::now())
}

/// Build with an explicit renderer and feed build time.
pub fn build_site_with(
    paths: &SitePaths,
    renderer: &dyn MarkdownRenderer,
    build_time: DateTime<Utc>,
) -> Result<BuildSummary> {
    let started = Instant::now();
    let out_dir = paths.output_dir();

    let config = stage(BuildStage::LoadConfig, || Ok(SiteConfig::load(&paths.config_file())?))?;
    stage(BuildStage::ResetOutputDir, || reset_output_dir(&out_dir))?;

    let posts = stage(BuildStage::LoadPosts, || content::load_posts(&paths.posts_dir(), renderer))?;
    let pages = stage(BuildStage::LoadPages, || content::load_pages(&paths.pages_dir(), renderer))?;

    stage(BuildStage::RenderCss, || generator::write_stylesheet(&config, &out_dir))?;
    stage(BuildStage::RenderIndex, || generator::write_index(&config, &posts, &pages, &out_dir))?;
    stage(BuildStage::RenderPosts, || generator::write_posts(&config, &posts, &pages, &out_dir))?;
    stage(BuildStage::RenderPages, || generator::write_pages(&config, &pages, &out_dir))?;
    stage(BuildStage::RenderFeed, || generator::write_feed(&config, &posts, build_time, &out_dir))?;

    log!("build"; "{} posts, {} pages in {:.0?}", posts.len(), pages.len(), started.elapsed());

    Ok(BuildSummary {
        posts: posts.len(),
        pages: pages.len(),
    })
}

fn stage<T>(stage: BuildStage, run: impl FnOnce() -> Result<T>) -> Result<T> {
    run().with_context(|| format!("failed to {stage}"))
}

/// Remove the output directory and recreate it with its fixed subdirectories.
fn reset_output_dir(out_dir: &Path) -> Result<()> {
    match fs::remove_dir_all(out_dir) {
        Ok(()) => {}
        Err(err) if err.kind() == ErrorKind::NotFound => {}
        Err(err) => {
            return Err(err).with_context(|| format!("Failed to remove {}", out_dir.display()));
        }
    }

    for dir in [out_dir.to_path_buf(), out_dir.join(paths::POSTS_DIR), out_dir.join(paths::PAGES_DIR)] {
        fs::create_dir_all(&dir).with_context(|| format!("Failed to create {}", dir.display()))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn site() -> (TempDir, SitePaths) {
        let dir = TempDir::new().unwrap();
        let paths = SitePaths::new(dir.path());
        fs::create_dir_all(paths.posts_dir()).unwrap();
        fs::create_dir_all(paths.pages_dir()).unwrap();
        SiteConfig::default().save(&paths.config_file()).unwrap();
        (dir, paths)
    }

    fn read(path: PathBuf) -> String {
        fs::read_to_string(path).unwrap()
    }

    fn at(h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 7, 2, h, 0, 0).unwrap()
    }

    #[test]
    fn test_build_empty_site() {
        let (_dir, paths) = site();
        let summary = build_site_with(&paths, &CmarkRenderer, at(0)).unwrap();

        assert_eq!(summary, BuildSummary { posts: 0, pages: 0 });
        let index = read(paths.output_file("index.html"));
        assert!(!index.contains("site-list-of-posts"));
        assert_eq!(read(paths.output_file("feed.xml")).matches("<item>").count(), 0);
        assert!(paths.output_file("style.css").is_file());
        assert!(paths.output_dir().join("posts").is_dir());
        assert!(paths.output_dir().join("pages").is_dir());
    }

    #[test]
    fn test_build_sample_post() {
        let (_dir, paths) = site();
        fs::write(
            paths.posts_dir().join("First Steps.md"),
            "---\ntitle: First Steps\ndate: July 1, 2025\n---\n\n## Getting Started with Bazel\n",
        )
        .unwrap();

        build_site_with(&paths, &CmarkRenderer, at(0)).unwrap();

        let post = read(paths.output_dir().join("posts/First Steps.html"));
        assert!(post.contains("<div class=\"post-date\">July 1, 2025</div>"));

        let index = read(paths.output_file("index.html"));
        assert!(index.contains("<h2>2025</h2>"));
        assert!(index.contains("posts/First%20Steps.html"));
    }

    #[test]
    fn test_build_removes_stale_output() {
        let (_dir, paths) = site();
        fs::create_dir_all(paths.output_dir()).unwrap();
        fs::write(paths.output_file("stale.html"), "old").unwrap();

        build_site_with(&paths, &CmarkRenderer, at(0)).unwrap();
        assert!(!paths.output_file("stale.html").exists());
    }

    #[test]
    fn test_build_is_idempotent() {
        let (_dir, paths) = site();
        fs::write(paths.posts_dir().join("a.md"), "---\ntitle: A\ndate: 2025-01-02\n---\nHello").unwrap();
        fs::write(paths.posts_dir().join("b.md"), "---\ntitle: B\ndate: 2024-05-06\n---\nWorld").unwrap();
        fs::write(paths.pages_dir().join("about.html"), "<body><p>About</p></body>").unwrap();

        let snapshot = |paths: &SitePaths| -> Vec<(PathBuf, String)> {
            let mut files: Vec<_> = walkdir::WalkDir::new(paths.output_dir())
                .sort_by_file_name()
                .into_iter()
                .filter_map(Result::ok)
                .filter(|e| e.file_type().is_file())
                .map(|e| (e.path().to_path_buf(), fs::read_to_string(e.path()).unwrap()))
                .collect();
            // the feed build date is the only time-dependent element
            let build_date = regex::Regex::new("<lastBuildDate>[^<]*</lastBuildDate>").unwrap();
            for (path, content) in &mut files {
                if path.ends_with("feed.xml") {
                    *content = build_date.replace_all(content, "").into_owned();
                }
            }
            files
        };

        build_site_with(&paths, &CmarkRenderer, at(1)).unwrap();
        let first = snapshot(&paths);
        let (_, feed) = first.iter().find(|(p, _)| p.ends_with("feed.xml")).unwrap();
        assert_eq!(feed.matches("<item>").count(), 2);
        assert!(!feed.contains("lastBuildDate"));
        build_site_with(&paths, &CmarkRenderer, at(1)).unwrap();
        assert_eq!(first, snapshot(&paths));

        // a different build time only touches lastBuildDate
        build_site(&paths).unwrap();
        assert_eq!(first, snapshot(&paths));
        assert_eq!(first.len(), 6);
    }

    #[test]
    fn test_corrupt_config_aborts_before_reset() {
        let (_dir, paths) = site();
        fs::create_dir_all(paths.output_dir()).unwrap();
        fs::write(paths.output_file("keep.html"), "kept").unwrap();
        fs::write(paths.config_file(), "title = ").unwrap();

        let err = build_site_with(&paths, &CmarkRenderer, at(0)).unwrap_err();
        assert!(format!("{err:#}").contains("failed to load config"));
        assert!(paths.output_file("keep.html").exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_reset_failure_aborts_before_loading() {
        use std::os::unix::fs::PermissionsExt;

        let (_dir, paths) = site();
        let out = paths.output_dir();
        fs::create_dir_all(out.join("locked")).unwrap();
        fs::write(out.join("locked/file.html"), "x").unwrap();
        fs::set_permissions(out.join("locked"), fs::Permissions::from_mode(0o555)).unwrap();

        // root ignores directory permissions
        if fs::remove_file(out.join("locked/file.html")).is_ok() {
            return;
        }

        struct Panicking;
        impl MarkdownRenderer for Panicking {
            fn render(&self, _: &str) -> String {
                panic!("content must not be loaded");
            }
        }
        fs::write(paths.posts_dir().join("a.md"), "hello").unwrap();

        let err = build_site_with(&paths, &Panicking, at(0)).unwrap_err();
        assert!(format!("{err:#}").contains("failed to reset output directory"));

        fs::set_permissions(out.join("locked"), fs::Permissions::from_mode(0o755)).unwrap();
    }
}
