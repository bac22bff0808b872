//! Frontmatter block splitting.
//!
//! ```text
//! ---                      +++
//! title: First Steps       title = "First Steps"
//! date: July 1, 2025       date = "July 1, 2025"
//! ---                      +++
//! body...                  body...
//! ```
//!
//! `---` blocks are YAML, `+++` blocks are TOML. Values of any scalar type
//! are read as strings so `date = 2025-07-01` and `date: "2025-07-01"` agree.

use thiserror::Error;

/// Metadata fields the loader understands. Unknown keys are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Frontmatter {
    pub title: Option<String>,
    pub date: Option<String>,
    pub time: Option<String>,
}

#[derive(Debug, Error)]
pub enum FrontmatterError {
    #[error("frontmatter block is not closed")]
    Unterminated,

    #[error("invalid YAML frontmatter")]
    Yaml(#[from] serde_yaml_ng::Error),

    #[error("invalid TOML frontmatter")]
    Toml(#[from] toml::de::Error),
}

#[derive(Debug, Clone, Copy)]
enum Format {
    Yaml,
    Toml,
}

impl Format {
    fn from_delimiter(line: &str) -> Option<Self> {
        match line.trim_end() {
            "---" => Some(Self::Yaml),
            "+++" => Some(Self::Toml),
            _ => None,
        }
    }

    const fn delimiter(self) -> &'static str {
        match self {
            Self::Yaml => "---",
            Self::Toml => "+++",
        }
    }
}

/// Split `content` into its frontmatter and body.
///
/// Content without an opening delimiter has empty frontmatter and is
/// returned whole as the body.
pub fn split(content: &str) -> Result<(Frontmatter, &str), FrontmatterError> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);

    let Some((first, rest)) = next_line(content) else {
        return Ok((Frontmatter::default(), content));
    };
    let Some(format) = Format::from_delimiter(first) else {
        return Ok((Frontmatter::default(), content));
    };

    let mut remaining = rest;
    while let Some((line, after)) = next_line(remaining) {
        if line.trim_end() == format.delimiter() {
            let block = &rest[..rest.len() - remaining.len()];
            return Ok((parse_block(format, block)?, after));
        }
        remaining = after;
    }

    Err(FrontmatterError::Unterminated)
}

fn next_line(s: &str) -> Option<(&str, &str)> {
    if s.is_empty() {
        return None;
    }
    Some(match s.find('\n') {
        Some(i) => (&s[..i], &s[i + 1..]),
        None => (s, ""),
    })
}

fn parse_block(format: Format, block: &str) -> Result<Frontmatter, FrontmatterError> {
    match format {
        Format::Yaml => {
            let value: serde_yaml_ng::Value = serde_yaml_ng::from_str(block)?;
            let field = |key: &str| value.get(key).and_then(yaml_scalar);
            Ok(Frontmatter {
                title: field("title"),
                date: field("date"),
                time: field("time"),
            })
        }
        Format::Toml => {
            let table: toml::Table = toml::from_str(block)?;
            let field = |key: &str| table.get(key).and_then(toml_scalar);
            Ok(Frontmatter {
                title: field("title"),
                date: field("date"),
                time: field("time"),
            })
        }
    }
}

fn yaml_scalar(value: &serde_yaml_ng::Value) -> Option<String> {
    use serde_yaml_ng::Value;
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn toml_scalar(value: &toml::Value) -> Option<String> {
    use toml::Value;
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Integer(i) => Some(i.to_string()),
        Value::Float(f) => Some(f.to_string()),
        Value::Boolean(b) => Some(b.to_string()),
        Value::Datetime(dt) => Some(dt.to_string()),
        Value::Array(_) | Value::Table(_) => None,
    }
}
