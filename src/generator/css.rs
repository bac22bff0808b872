//! Global stylesheet.

use super::{fill_template, write_output};
use crate::config::{SiteConfig, paths::STYLE_FILE};
use anyhow::Result;
use std::path::Path;

const STYLE_TEMPLATE: &str = include_str!("../embed/style.css");

/// Stylesheet for the configured palette and font.
pub fn render_stylesheet(config: &SiteConfig) -> String {
    let variables = format!(
        "{} --font-family: {};",
        config.color_scheme().css_variables(),
        config.font_family()
    );
    fill_template(STYLE_TEMPLATE, &[("css_variables", variables.as_str())])
}

pub fn write_stylesheet(config: &SiteConfig, out_dir: &Path) -> Result<()> {
    write_output(&out_dir.join(STYLE_FILE), &render_stylesheet(config))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::theme::{ColorScheme, Font};

    #[test]
    fn test_default_palette_and_font() {
        let css = render_stylesheet(&SiteConfig::default());
        assert!(css.starts_with(":root {"));
        assert!(css.contains("--bg-color: 255, 252, 245;"));
        assert!(css.contains("--font-family: 'Source Serif 4', Georgia, serif;"));
        assert!(!css.contains("{css_variables}"));
    }

    #[test]
    fn test_selected_palette() {
        let mut config = SiteConfig::default();
        config.set_color_scheme(ColorScheme::Elite);
        config.set_font(Font::Monospace);

        let css = render_stylesheet(&config);
        assert!(css.contains("--accent-color: #00ff41;"));
        assert!(css.contains("--font-family: 'Courier New', monospace;"));
    }

    #[test]
    fn test_unknown_names_fall_back() {
        let mut config = SiteConfig::default();
        config.theme.color_scheme = "solarized".into();
        config.theme.font = "comic-sans".into();

        let css = render_stylesheet(&config);
        assert!(css.contains("--accent-color: #048AA2;"));
        assert!(css.contains("--font-family: system-ui, -apple-system, sans-serif;"));
    }
}
