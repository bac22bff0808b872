//! Source directory scanning.
//!
//! Files are visited in byte-wise filename order and rendered in parallel;
//! results keep scan order. A missing directory yields no content.

use super::{
    ContentItem, MarkdownRenderer, PAGES_PREFIX, POSTS_PREFIX, Page, Post,
    frontmatter::{self, Frontmatter},
};
use crate::{log, utils::date, utils::html};
use anyhow::{Context, Result};
use rayon::prelude::*;
use rustc_hash::FxHashMap;
use std::{
    fs,
    path::{Path, PathBuf},
};
use walkdir::WalkDir;

/// Load every `*.md` post in `dir`, newest first.
///
/// Posts with equal dates keep filename order.
pub fn load_posts(dir: &Path, renderer: &dyn MarkdownRenderer) -> Result<Vec<Post>> {
    let files = scan(dir, &["md"])?;

    let mut posts: Vec<Post> = files
        .par_iter()
        .map(|path| load_post(path, renderer))
        .collect::<Result<Vec<_>>>()?
        .into_iter()
        .flatten()
        .collect();

    posts.sort_by(|a, b| b.date.cmp(&a.date));
    Ok(dedup_by_url(posts))
}

/// Load every `*.md` and legacy `*.html` page in `dir`, in filename order.
pub fn load_pages(dir: &Path, renderer: &dyn MarkdownRenderer) -> Result<Vec<Page>> {
    let files = scan(dir, &["md", "html"])?;

    let pages: Vec<Page> = files
        .par_iter()
        .map(|path| load_page(path, renderer))
        .collect::<Result<Vec<_>>>()?
        .into_iter()
        .flatten()
        .collect();

    Ok(dedup_by_url(pages))
}

// ============================================================================
// Scanning
// ============================================================================

/// Regular files directly inside `dir` with one of `extensions`.
fn scan(dir: &Path, extensions: &[&str]) -> Result<Vec<PathBuf>> {
    if !dir.exists() {
        return Ok(Vec::new());
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry.with_context(|| format!("Failed to read {}", dir.display()))?;
        let has_extension = entry
            .path()
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| extensions.contains(&e));

        if entry.file_type().is_file() && has_extension {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

/// Read a source file. Unreadable files are skipped with a warning.
fn read_source(path: &Path) -> Option<String> {
    match fs::read_to_string(path) {
        Ok(content) => Some(content),
        Err(err) => {
            log!("warn"; "skipping {}: {err}", path.display());
            None
        }
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|n| n.to_string_lossy().trim().to_owned())
        .unwrap_or_default()
}

/// Frontmatter and body of a markdown file, falling back to empty
/// frontmatter and the whole file when the block is malformed.
fn split_markdown<'a>(path: &Path, content: &'a str) -> (Frontmatter, &'a str) {
    frontmatter::split(content).unwrap_or_else(|err| {
        log!("warn"; "{}: {err}, using defaults", path.display());
        (Frontmatter::default(), content)
    })
}

fn title_or_stem(title: Option<String>, path: &Path) -> String {
    title
        .map(|t| t.trim().to_owned())
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| file_stem(path))
}

// ============================================================================
// Records
// ============================================================================

fn load_post(path: &Path, renderer: &dyn MarkdownRenderer) -> Result<Option<Post>> {
    let Some(content) = read_source(path) else {
        return Ok(None);
    };
    let (matter, body) = split_markdown(path, &content);

    let parsed = matter
        .date
        .as_deref()
        .and_then(|d| date::parse_with_time(d, matter.time.as_deref()));
    let date = match parsed {
        Some(date) => date,
        None => {
            if let Some(raw) = &matter.date {
                log!("warn"; "{}: unrecognised date `{raw}`, using modification time", path.display());
            }
            let modified = fs::metadata(path)
                .and_then(|m| m.modified())
                .with_context(|| format!("Failed to read modification time of {}", path.display()))?;
            date::from_system_time(modified)
        }
    };

    Ok(Some(Post {
        title: title_or_stem(matter.title, path),
        date,
        body: renderer.render(body.trim()),
        source: file_name(path),
        url: format!("{POSTS_PREFIX}/{}.html", file_stem_raw(path)),
    }))
}

fn load_page(path: &Path, renderer: &dyn MarkdownRenderer) -> Result<Option<Page>> {
    let Some(content) = read_source(path) else {
        return Ok(None);
    };
    let source = file_name(path);

    let page = if path.extension().is_some_and(|e| e == "html") {
        Page {
            title: file_stem(path),
            body: html::extract_body(&content).to_owned(),
            url: format!("{PAGES_PREFIX}/{source}"),
            source,
        }
    } else {
        let (matter, body) = split_markdown(path, &content);
        Page {
            title: title_or_stem(matter.title, path),
            body: renderer.render(body.trim()),
            url: format!("{PAGES_PREFIX}/{}.html", file_stem_raw(path)),
            source,
        }
    };
    Ok(Some(page))
}

/// File stem without trimming, so the output name mirrors the source name.
fn file_stem_raw(path: &Path) -> String {
    path.file_stem()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Collapse items sharing an output URL: the later item replaces the
/// earlier one in place.
fn dedup_by_url<T: ContentItem>(items: Vec<T>) -> Vec<T> {
    let mut seen: FxHashMap<String, usize> = FxHashMap::default();
    let mut out: Vec<T> = Vec::with_capacity(items.len());

    for item in items {
        match seen.get(item.url()) {
            Some(&index) => {
                log!("warn"; "{} and {} both render to {}, keeping {}",
                    out[index].source(), item.source(), item.url(), item.source());
                out[index] = item;
            }
            None => {
                seen.insert(item.url().to_owned(), out.len());
                out.push(item);
            }
        }
    }
    out
}
