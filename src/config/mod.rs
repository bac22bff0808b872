//! Site configuration management for `bazel.toml`.
//!
//! # Example
//!
//! ```toml
//! site_name = "my-blog"
//! title = "My Blog"
//! description = "A personal blog"
//! base_url = "https://example.com"
//! editor = "auto"
//!
//! [theme]
//! color_scheme = "pika-beach"
//! font = "pika-serif"
//!
//! [socials]
//! github = "https://github.com/me"
//! ```
//!
//! Early releases wrote this file as JSON despite the `.toml` extension.
//! Such files are still readable; `bazel upgrade` rewrites them as TOML.

pub mod defaults;
mod error;
pub mod paths;
mod serve;
pub mod theme;

pub use error::ConfigError;
pub use paths::SitePaths;
pub use serve::ServeOptions;

use crate::log;
use educe::Educe;
use serde::{Deserialize, Deserializer, Serialize};
use std::{collections::BTreeMap, env, fs, io::ErrorKind, path::Path};
use theme::{ColorScheme, Font};

// ============================================================================
// Root Configuration
// ============================================================================

/// Root configuration structure representing `bazel.toml`.
///
/// The build pipeline only reads it; changes go through the setters below
/// followed by [`SiteConfig::save`].
#[derive(Debug, Clone, PartialEq, Eq, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct SiteConfig {
    /// Registry name the site was created with.
    #[serde(default)]
    pub site_name: String,

    /// Site title displayed in the header and feed.
    #[serde(default = "defaults::title")]
    #[educe(Default = defaults::title())]
    pub title: String,

    /// Shown on the homepage and in the feed channel.
    #[serde(default = "defaults::description")]
    #[educe(Default = defaults::description())]
    pub description: String,

    /// Absolute URL prefix for feed links.
    #[serde(default = "defaults::base_url")]
    #[educe(Default = defaults::base_url())]
    pub base_url: String,

    /// Editor command, or `auto` to use `$EDITOR`.
    #[serde(default = "defaults::editor")]
    #[educe(Default = defaults::editor())]
    pub editor: String,

    #[serde(default)]
    pub theme: ThemeConfig,

    /// Platform name → profile URL, rendered in the footer in key order.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub socials: BTreeMap<String, String>,
}

/// `[theme]` section.
///
/// Names are kept as written so unknown values survive a load/save cycle;
/// rendering resolves them with a fallback.
#[derive(Debug, Clone, PartialEq, Eq, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct ThemeConfig {
    #[serde(default = "defaults::theme::color_scheme")]
    #[educe(Default = defaults::theme::color_scheme())]
    pub color_scheme: String,

    #[serde(default = "defaults::theme::font")]
    #[educe(Default = defaults::theme::font())]
    pub font: String,
}

/// Legacy JSON configs serialized an unset map as `null`.
fn null_as_empty<'de, D>(deserializer: D) -> Result<BTreeMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<BTreeMap<String, String>>::deserialize(deserializer)?.unwrap_or_default())
}

impl SiteConfig {
    /// Parse configuration from TOML string
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Parse configuration from the legacy JSON shape.
    pub fn from_legacy_json(content: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(content)?)
    }

    /// Whether raw config file content is in the legacy JSON shape.
    pub fn is_legacy_json(content: &str) -> bool {
        content.trim_start().starts_with('{')
    }

    /// Load configuration from file path.
    ///
    /// A missing file yields the defaults. An existing file that cannot be
    /// read or parsed is an error; defaults are never substituted for it.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Self::default()),
            Err(err) => return Err(ConfigError::Io(path.to_path_buf(), err)),
        };

        if Self::is_legacy_json(&content) {
            log!("config"; "{} uses the legacy JSON format, run `bazel upgrade` to convert it", path.display());
            return Self::from_legacy_json(&content);
        }
        Self::from_toml(&content)
    }

    /// Serialize to TOML and write to `path`.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content).map_err(|err| ConfigError::Io(path.to_path_buf(), err))
    }

    // ------------------------------------------------------------------------
    // Setters
    // ------------------------------------------------------------------------

    pub fn set_color_scheme(&mut self, scheme: ColorScheme) {
        self.theme.color_scheme = scheme.name().to_owned();
    }

    pub fn set_font(&mut self, font: Font) {
        self.theme.font = font.name().to_owned();
    }

    pub fn set_social(&mut self, platform: &str, url: &str) {
        self.socials.insert(platform.to_owned(), url.to_owned());
    }

    /// Returns whether the platform was present.
    pub fn remove_social(&mut self, platform: &str) -> bool {
        self.socials.remove(platform).is_some()
    }

    pub fn set_editor(&mut self, editor: &str) {
        self.editor = editor.to_owned();
    }

    // ------------------------------------------------------------------------
    // Derived values
    // ------------------------------------------------------------------------

    pub fn color_scheme(&self) -> ColorScheme {
        ColorScheme::resolve(&self.theme.color_scheme)
    }

    pub fn font_family(&self) -> &'static str {
        Font::family_for(&self.theme.font)
    }

    /// Editor command to launch: the configured one, or for `auto` the
    /// `$EDITOR` variable, falling back to `vi`.
    pub fn resolve_editor(&self) -> String {
        Self::resolve_editor_with(&self.editor, env::var("EDITOR").ok())
    }

    fn resolve_editor_with(configured: &str, env_editor: Option<String>) -> String {
        if configured.is_empty() || configured == "auto" {
            return env_editor
                .filter(|e| !e.trim().is_empty())
                .unwrap_or_else(|| "vi".to_owned());
        }
        configured.to_owned()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_site_config_default() {
        let config = SiteConfig::default();

        assert_eq!(config.title, "My Bazel Site");
        assert_eq!(config.base_url, "https://example.com");
        assert_eq!(config.editor, "auto");
        assert_eq!(config.theme.color_scheme, "pika-beach");
        assert_eq!(config.theme.font, "pika-serif");
        assert!(config.socials.is_empty());
    }

    #[test]
    fn test_from_toml() {
        let config = SiteConfig::from_toml(
            r#"
            site_name = "blog"
            title = "My Blog"
            description = "A test blog"
            base_url = "https://blog.example"
            editor = "nvim"

            [theme]
            color_scheme = "nord"
            font = "times"

            [socials]
            github = "https://github.com/me"
            "#,
        )
        .unwrap();

        assert_eq!(config.title, "My Blog");
        assert_eq!(config.color_scheme(), ColorScheme::Nord);
        assert_eq!(config.font_family(), "'Times New Roman', Times, serif");
        assert_eq!(
            config.socials.get("github").map(String::as_str),
            Some("https://github.com/me")
        );
    }

    #[test]
    fn test_from_toml_missing_sections_use_defaults() {
        let config = SiteConfig::from_toml(r#"title = "Only a title""#).unwrap();
        assert_eq!(config.title, "Only a title");
        assert_eq!(config.theme, ThemeConfig::default());
        assert!(config.socials.is_empty());
    }

    #[test]
    fn test_from_toml_invalid() {
        assert!(SiteConfig::from_toml("title = \"unterminated").is_err());
    }

    #[test]
    fn test_unknown_field_rejection() {
        let result = SiteConfig::from_toml("unknown_field = 1");
        assert!(result.is_err());
    }

    #[test]
    fn test_legacy_json_detection_and_parse() {
        let json = r#"{
  "site_name": "old",
  "title": "Old Blog",
  "description": "",
  "base_url": "https://old.example",
  "theme": { "color_scheme": "dracula", "font": "serif" },
  "socials": null,
  "editor": "vim"
}"#;
        assert!(SiteConfig::is_legacy_json(json));
        assert!(!SiteConfig::is_legacy_json("title = \"x\""));

        let config = SiteConfig::from_legacy_json(json).unwrap();
        assert_eq!(config.title, "Old Blog");
        assert_eq!(config.theme.color_scheme, "dracula");
        assert!(config.socials.is_empty());
    }

    #[test]
    fn test_save_load_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bazel.toml");

        let mut config = SiteConfig {
            site_name: "round".into(),
            title: "Round Trip".into(),
            ..Default::default()
        };
        config.set_color_scheme(ColorScheme::TokyoNight);
        config.set_font(Font::Monospace);
        config.set_social("github", "https://github.com/rt");
        config.set_social("mastodon", "https://social.example/@rt");
        config.set_editor("hx");

        config.save(&path).unwrap();
        assert_eq!(SiteConfig::load(&path).unwrap(), config);
    }

    #[test]
    fn test_save_load_round_trip_empty_socials() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bazel.toml");

        let config = SiteConfig::default();
        config.save(&path).unwrap();

        let loaded = SiteConfig::load(&path).unwrap();
        assert_eq!(loaded.socials, BTreeMap::new());
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_load_missing_file_returns_defaults() {
        let dir = TempDir::new().unwrap();
        let config = SiteConfig::load(&dir.path().join("bazel.toml")).unwrap();
        assert_eq!(config, SiteConfig::default());
    }

    #[test]
    fn test_load_corrupt_file_is_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bazel.toml");
        fs::write(&path, "[theme\ncolor_scheme = ").unwrap();

        assert!(matches!(SiteConfig::load(&path), Err(ConfigError::Toml(_))));
    }

    #[test]
    fn test_remove_social() {
        let mut config = SiteConfig::default();
        config.set_social("twitter", "https://twitter.com/x");
        assert!(config.remove_social("twitter"));
        assert!(!config.remove_social("twitter"));
    }

    #[test]
    fn test_resolve_editor() {
        assert_eq!(SiteConfig::resolve_editor_with("nano", Some("vim".into())), "nano");
        assert_eq!(SiteConfig::resolve_editor_with("auto", Some("hx".into())), "hx");
        assert_eq!(SiteConfig::resolve_editor_with("", None), "vi");
        assert_eq!(SiteConfig::resolve_editor_with("auto", Some("  ".into())), "vi");
    }
}
