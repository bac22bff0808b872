//! Output writers for the render pipeline.
//!
//! Every writer renders to a string first and then writes it under the
//! output directory, so rendering stays testable without a filesystem.

mod css;
mod feed;
mod html;

pub use css::write_stylesheet;
pub use feed::write_feed;
pub use html::{write_index, write_pages, write_posts};

use anyhow::{Context, Result};
use std::{fs, path::Path};

/// Substitute `{key}` placeholders in a single pass.
///
/// Unknown placeholders and stray braces are copied through, and
/// substituted values are never rescanned.
fn fill_template(template: &str, vars: &[(&str, &str)]) -> String {
    let extra: usize = vars.iter().map(|(_, v)| v.len()).sum();
    let mut out = String::with_capacity(template.len() + extra);
    let mut rest = template;

    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let tail = &rest[start + 1..];
        let matched = vars
            .iter()
            .find(|(key, _)| tail.starts_with(key) && tail[key.len()..].starts_with('}'));

        match matched {
            Some((key, value)) => {
                out.push_str(value);
                rest = &tail[key.len() + 1..];
            }
            None => {
                out.push('{');
                rest = tail;
            }
        }
    }
    out.push_str(rest);
    out
}

/// Write `content` to `path`, creating parent directories.
fn write_output(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))
}
