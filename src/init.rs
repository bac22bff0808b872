//! Site scaffolding and content file management.
//!
//! Creates new sites with sample content, new posts and pages, and opens
//! source files in the configured editor.

use crate::{
    config::{SiteConfig, SitePaths},
    log,
    registry::Registry,
    upgrade::SiteVersion,
};
use anyhow::{Context, Result, bail};
use chrono::{DateTime, Local};
use std::{
    fs,
    path::{Path, PathBuf},
    process::Command,
};

/// Description stored in the registry for new sites.
const REGISTRY_DESCRIPTION: &str = "Welcome to Bazel! This is your new static site.";

const SAMPLE_POSTS: &[(&str, &str, &str)] = &[
    (
        "First Steps",
        "July 1, 2025",
        "## Getting Started with Bazel\n\nBazel is a simple and fast static site generator. Start by creating posts!",
    ),
    (
        "Design Ideas",
        "June 20, 2025",
        "## Designing a Great Static Site\n\nConsider theme and layout for your site's content. Use Bazel's options for customization.",
    ),
];

const ABOUT_PAGE: &str = include_str!("embed/about.html");

// ============================================================================
// New site
// ============================================================================

/// Create `parent/name` with the default layout, sample content and version
/// marker, then register it.
pub fn new_site(parent: &Path, name: &str, registry: &mut Registry) -> Result<SitePaths> {
    validate_name(name, "site")?;
    let paths = SitePaths::new(parent.join(name));
    if paths.is_site() {
        bail!("`{}` already contains a bazel site", paths.root().display());
    }

    for dir in [paths.posts_dir(), paths.pages_dir(), paths.themes_dir()] {
        fs::create_dir_all(&dir).with_context(|| format!("Failed to create {}", dir.display()))?;
    }

    let config = default_config(name);
    config
        .save(&paths.config_file())
        .context("Failed to write bazel.toml")?;

    write_new(&paths.pages_dir().join("about.html"), ABOUT_PAGE)?;
    for (title, date, body) in SAMPLE_POSTS {
        let content = format!("---\ntitle: {title}\ndate: {date}\n---\n\n{body}\n");
        write_new(&paths.posts_dir().join(format!("{title}.md")), &content)?;
    }

    SiteVersion::current().save(&paths.version_file())?;

    let root = fs::canonicalize(paths.root())
        .with_context(|| format!("Failed to resolve {}", paths.root().display()))?;
    registry
        .add_site(name, &root, REGISTRY_DESCRIPTION)
        .context("Failed to register site")?;

    log!("new"; "created site `{name}` at {}", root.display());
    Ok(SitePaths::new(root))
}

fn default_config(name: &str) -> SiteConfig {
    SiteConfig {
        site_name: name.to_owned(),
        title: "Bazel Blog!".to_owned(),
        description: "Welcome to Bazel! This is your new static site. \
                      Edit this description in bazel.toml to make it your own."
            .to_owned(),
        ..SiteConfig::default()
    }
}

// ============================================================================
// Posts and pages
// ============================================================================

/// Write `posts/<Title_With_Underscores>.md` with frontmatter stamped `now`.
pub fn create_post(paths: &SitePaths, title: &str, now: DateTime<Local>) -> Result<PathBuf> {
    validate_name(title, "post title")?;
    let path = paths.posts_dir().join(format!("{}.md", file_stem(title)));
    if path.exists() {
        bail!("post already exists: {}", path.display());
    }

    let content = format!(
        "---\ntitle: {}\ndate: {}\ntime: {}\n---\n\nStart writing here...\n",
        yaml_scalar(title),
        now.format("%B %-d, %Y"),
        now.format("%H:%M"),
    );
    write_new(&path, &content)?;
    Ok(path)
}

/// Write `pages/<Title_With_Underscores>.md` with a heading.
pub fn create_page(paths: &SitePaths, title: &str, now: DateTime<Local>) -> Result<PathBuf> {
    validate_name(title, "page title")?;
    let path = paths.pages_dir().join(format!("{}.md", file_stem(title)));
    if path.exists() {
        bail!("page already exists: {}", path.display());
    }

    let content = format!(
        "---\ntitle: {}\ndate: {}\n---\n\n# {title}\n\nStart writing here...\n",
        yaml_scalar(title),
        now.format("%B %-d, %Y"),
    );
    write_new(&path, &content)?;
    Ok(path)
}

pub fn new_post(paths: &SitePaths, config: &SiteConfig, title: &str) -> Result<()> {
    let path = create_post(paths, title, Local::now())?;
    log!("new"; "created {}", path.display());
    open_in_editor(config, &path)
}

pub fn new_page(paths: &SitePaths, config: &SiteConfig, title: &str) -> Result<()> {
    let path = create_page(paths, title, Local::now())?;
    log!("new"; "created {}", path.display());
    open_in_editor(config, &path)
}

pub fn find_post(paths: &SitePaths, name: &str) -> Result<PathBuf> {
    let path = paths.posts_dir().join(format!("{name}.md"));
    if path.is_file() {
        return Ok(path);
    }
    bail!("post not found: {name}")
}

/// Markdown source first, then a legacy HTML page.
pub fn find_page(paths: &SitePaths, name: &str) -> Result<PathBuf> {
    ["md", "html"]
        .iter()
        .map(|ext| paths.pages_dir().join(format!("{name}.{ext}")))
        .find(|path| path.is_file())
        .with_context(|| format!("page not found: {name}"))
}

/// Post names (file stems), sorted.
pub fn list_posts(paths: &SitePaths) -> Result<Vec<String>> {
    list_stems(&paths.posts_dir(), &["md"])
}

/// Page names (file stems of `.md` and `.html` sources), sorted.
pub fn list_pages(paths: &SitePaths) -> Result<Vec<String>> {
    list_stems(&paths.pages_dir(), &["md", "html"])
}

fn list_stems(dir: &Path, extensions: &[&str]) -> Result<Vec<String>> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }
    let mut names = Vec::new();
    for entry in fs::read_dir(dir).with_context(|| format!("Failed to read {}", dir.display()))? {
        let path = entry?.path();
        let matches = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| extensions.contains(&e));
        if matches && path.is_file() {
            if let Some(stem) = path.file_stem() {
                names.push(stem.to_string_lossy().into_owned());
            }
        }
    }
    names.sort();
    Ok(names)
}

// ============================================================================
// Editor
// ============================================================================

/// Open `file` in the resolved editor and wait for it to exit.
///
/// The editor setting may carry arguments, e.g. `code --wait`.
pub fn open_in_editor(config: &SiteConfig, file: &Path) -> Result<()> {
    let editor = config.resolve_editor();
    let mut parts = editor.split_whitespace();
    let Some(program) = parts.next() else {
        bail!("no editor configured");
    };
    let program = which::which(program)
        .with_context(|| format!("`{program}` not found. Set another editor with `bazel editor <NAME>`."))?;

    let status = Command::new(&program)
        .args(parts)
        .arg(file)
        .status()
        .with_context(|| format!("Failed to launch {}", program.display()))?;
    if !status.success() {
        bail!("editor exited with {status}");
    }
    Ok(())
}

// ============================================================================
// Helpers
// ============================================================================

/// Spaces become underscores.
fn file_stem(title: &str) -> String {
    title.trim().replace(' ', "_")
}

fn validate_name(name: &str, what: &str) -> Result<()> {
    let name = name.trim();
    if name.is_empty() {
        bail!("{what} must not be empty");
    }
    if name.contains(['/', '\\']) || name == "." || name == ".." {
        bail!("{what} `{name}` must not contain path separators");
    }
    Ok(())
}

/// Quote a frontmatter value when plain YAML would misread it.
fn yaml_scalar(value: &str) -> String {
    let needs_quotes = value.contains(": ")
        || value.contains(" #")
        || value.starts_with(['"', '\'', '[', '{', '&', '*', '!', '|', '>', '%', '@', '`', '#', '-', '?']);
    if needs_quotes {
        format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
    } else {
        value.to_owned()
    }
}

fn write_new(path: &Path, content: &str) -> Result<()> {
    fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))
}
