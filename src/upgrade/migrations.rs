//! The ordered migration chain.
//!
//! Each step moves a site from `from` to `to`. Most steps only announce what
//! changed in the tool; two of them rewrite files on disk.

use super::Version;
use crate::{
    config::{SiteConfig, SitePaths, paths},
    log,
};
use anyhow::{Context, Result};
use chrono::Local;
use std::{
    fs,
    path::{Path, PathBuf},
};

/// What a migration does to the site beyond logging its notes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MigrationKind {
    /// Nothing on disk changes.
    Informational,
    /// Rewrite a legacy JSON `bazel.toml` as TOML.
    ConfigFormat,
    /// Sort flat `public/*.html` output into `public/{posts,pages}/`.
    DirectoryStructure,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Migration {
    pub from: Version,
    pub to: Version,
    pub description: &'static str,
    pub notes: &'static [&'static str],
    pub kind: MigrationKind,
}

impl Migration {
    pub fn apply(&self, paths: &SitePaths) -> Result<()> {
        for note in self.notes {
            log!("upgrade"; "  • {note}");
        }

        match self.kind {
            MigrationKind::Informational => {}
            MigrationKind::ConfigFormat => {
                if let Some(backup) = convert_config_format(paths)? {
                    log!("upgrade"; "  • converted bazel.toml to TOML (backup: {})", backup.display());
                }
            }
            MigrationKind::DirectoryStructure => {
                let moved = migrate_directory_structure(paths)?;
                if moved > 0 {
                    log!("upgrade"; "  • moved {moved} generated files into posts/ and pages/");
                }
            }
        }
        Ok(())
    }
}

const fn step(
    from: Version,
    to: Version,
    description: &'static str,
    notes: &'static [&'static str],
    kind: MigrationKind,
) -> Migration {
    Migration { from, to, description, notes, kind }
}

/// Every known migration, ordered by `from`.
///
/// The last `to` is the current tool version.
pub const MIGRATIONS: &[Migration] = &[
    step(
        Version::new(0, 0, 0),
        Version::new(1, 1, 0),
        "Add version tracking and theme improvements",
        &["Adding version tracking"],
        MigrationKind::Informational,
    ),
    step(
        Version::new(1, 1, 0),
        Version::new(1, 1, 5),
        "Remove dark mode media query interference",
        &[
            "Updating CSS generation (removing dark mode conflicts)",
            "Theme selection improvements applied",
        ],
        MigrationKind::Informational,
    ),
    step(
        Version::new(1, 1, 5),
        Version::new(1, 1, 7),
        "Enhanced UI with colorful menus and improved navigation spacing",
        &[
            "Enhanced colorful menu interface",
            "Improved screen clearing for clean navigation",
            "Updated navigation spacing",
        ],
        MigrationKind::Informational,
    ),
    step(
        Version::new(1, 1, 7),
        Version::new(1, 1, 8),
        "Added 3li7e retro CRT theme and enhanced post/page editing functionality",
        &[
            "Added 3li7e retro CRT monitor theme (green-on-black)",
            "Enhanced post and page editing functionality",
            "Improved markdown page support",
        ],
        MigrationKind::Informational,
    ),
    step(
        Version::new(1, 1, 8),
        Version::new(1, 4, 0),
        "Added comprehensive markdown documentation and improved user experience",
        &[
            "Added comprehensive markdown documentation",
            "Improved user experience with new docs and guides",
        ],
        MigrationKind::Informational,
    ),
    step(
        Version::new(1, 4, 0),
        Version::new(1, 4, 1),
        "Project cleanup and build system improvements",
        &["Converting JSON config to TOML format"],
        MigrationKind::ConfigFormat,
    ),
    step(
        Version::new(1, 4, 1),
        Version::new(1, 4, 2),
        "Improved site structure with organized directories",
        &[
            "Migrating to organized directory structure",
            "Moving posts and pages to subdirectories",
        ],
        MigrationKind::DirectoryStructure,
    ),
];

// ============================================================================
// Config format
// ============================================================================

/// Rewrite a JSON-shaped `bazel.toml` as TOML, keeping the original next to
/// it as `bazel.toml.json-backup.<timestamp>`.
///
/// Returns the backup path, or `None` when there was nothing to convert.
pub fn convert_config_format(paths: &SitePaths) -> Result<Option<PathBuf>> {
    let config_path = paths.config_file();
    let content = match fs::read_to_string(&config_path) {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(err) => {
            return Err(err).with_context(|| format!("Failed to read {}", config_path.display()));
        }
    };
    if !SiteConfig::is_legacy_json(&content) {
        return Ok(None);
    }

    let backup = backup_path(&config_path);
    fs::write(&backup, &content)
        .with_context(|| format!("Failed to write backup {}", backup.display()))?;

    let config = SiteConfig::from_legacy_json(&content).context("Legacy config is not valid JSON")?;
    config.save(&config_path)?;
    Ok(Some(backup))
}

fn backup_path(config_path: &Path) -> PathBuf {
    let stamp = Local::now().format("%Y%m%d-%H%M%S");
    let mut name = config_path.as_os_str().to_owned();
    name.push(format!(".json-backup.{stamp}"));
    PathBuf::from(name)
}

// ============================================================================
// Directory structure
// ============================================================================

/// Where a flat `public/<name>.html` file belongs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Destination {
    Posts,
    Pages,
}

/// Move generated HTML from `public/` into `public/posts/` or `public/pages/`
/// according to which source directory holds the matching file.
///
/// Core artifacts and files with no matching source stay where they are.
/// Does nothing when `public/` does not exist. Returns the number of files
/// moved.
pub fn migrate_directory_structure(paths: &SitePaths) -> Result<usize> {
    let out_dir = paths.output_dir();
    if !out_dir.is_dir() {
        return Ok(0);
    }

    for dir in [paths::POSTS_DIR, paths::PAGES_DIR] {
        let dir = out_dir.join(dir);
        fs::create_dir_all(&dir).with_context(|| format!("Failed to create {}", dir.display()))?;
    }

    let mut entries: Vec<_> = fs::read_dir(&out_dir)
        .with_context(|| format!("Failed to read {}", out_dir.display()))?
        .collect::<Result<_, _>>()?;
    entries.sort_by_key(|e| e.file_name());

    let mut moved = 0;
    for entry in entries {
        if !entry.file_type()?.is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        if paths::CORE_ARTIFACTS.contains(&name.as_str()) {
            continue;
        }
        let Some(dest) = classify(paths, &name) else {
            continue;
        };

        let subdir = match dest {
            Destination::Posts => paths::POSTS_DIR,
            Destination::Pages => paths::PAGES_DIR,
        };
        let target = out_dir.join(subdir).join(&name);
        fs::rename(entry.path(), &target)
            .with_context(|| format!("Failed to move {name} into {subdir}/"))?;
        moved += 1;
    }
    Ok(moved)
}

fn classify(paths: &SitePaths, file_name: &str) -> Option<Destination> {
    let stem = file_name.strip_suffix(".html")?;

    if paths.posts_dir().join(format!("{stem}.md")).is_file() {
        return Some(Destination::Posts);
    }
    let pages = paths.pages_dir();
    if pages.join(format!("{stem}.md")).is_file() || pages.join(file_name).is_file() {
        return Some(Destination::Pages);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn site() -> (TempDir, SitePaths) {
        let dir = TempDir::new().unwrap();
        let paths = SitePaths::new(dir.path());
        fs::create_dir_all(paths.posts_dir()).unwrap();
        fs::create_dir_all(paths.pages_dir()).unwrap();
        (dir, paths)
    }

    #[test]
    fn test_chain_is_contiguous_and_ends_at_tool_version() {
        assert_eq!(MIGRATIONS[0].from, Version::ZERO);
        for pair in MIGRATIONS.windows(2) {
            assert_eq!(pair[0].to, pair[1].from);
            assert!(pair[0].from < pair[0].to);
        }
        assert_eq!(MIGRATIONS.last().map(|m| m.to), Some(Version::tool()));
    }

    #[test]
    fn test_directory_migration_sorts_by_source() {
        let (_dir, paths) = site();
        let out = paths.output_dir();
        fs::create_dir_all(&out).unwrap();
        fs::write(paths.posts_dir().join("a.md"), "").unwrap();
        fs::write(paths.pages_dir().join("b.md"), "").unwrap();
        fs::write(paths.pages_dir().join("c.html"), "").unwrap();
        for name in ["a.html", "b.html", "c.html", "orphan.html", "index.html", "style.css", "feed.xml"] {
            fs::write(out.join(name), name).unwrap();
        }

        assert_eq!(migrate_directory_structure(&paths).unwrap(), 3);

        assert_eq!(fs::read_to_string(out.join("posts/a.html")).unwrap(), "a.html");
        assert!(out.join("pages/b.html").is_file());
        assert!(out.join("pages/c.html").is_file());
        assert!(!out.join("a.html").exists());
        for kept in ["orphan.html", "index.html", "style.css", "feed.xml"] {
            assert!(out.join(kept).is_file(), "{kept} should stay in place");
        }
    }

    #[test]
    fn test_directory_migration_without_output_is_noop() {
        let (_dir, paths) = site();
        assert_eq!(migrate_directory_structure(&paths).unwrap(), 0);
        assert!(!paths.output_dir().exists());
    }

    #[test]
    fn test_convert_legacy_json_config() {
        let (dir, paths) = site();
        fs::write(
            paths.config_file(),
            r#"{"site_name":"old","title":"Old","description":"d","base_url":"https://old.example",
               "theme":{"color_scheme":"nord","font":"serif"},"socials":{"github":"https://github.com/o"},"editor":"vim"}"#,
        )
        .unwrap();

        let backup = convert_config_format(&paths).unwrap().unwrap();
        assert!(backup.is_file());
        assert!(backup.file_name().unwrap().to_string_lossy().starts_with("bazel.toml.json-backup."));
        assert_eq!(backup.parent(), Some(dir.path()));

        let converted = fs::read_to_string(paths.config_file()).unwrap();
        assert!(!SiteConfig::is_legacy_json(&converted));
        let config = SiteConfig::from_toml(&converted).unwrap();
        assert_eq!(config.title, "Old");
        assert_eq!(config.theme.color_scheme, "nord");
        assert_eq!(config.editor, "vim");
    }

    #[test]
    fn test_convert_skips_toml_config() {
        let (dir, paths) = site();
        SiteConfig::default().save(&paths.config_file()).unwrap();
        let before = fs::read_to_string(paths.config_file()).unwrap();

        assert_eq!(convert_config_format(&paths).unwrap(), None);
        assert_eq!(fs::read_to_string(paths.config_file()).unwrap(), before);
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 3);
    }
}
