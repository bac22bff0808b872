//! Closed enumerations for the `[theme]` section.
//!
//! Both tables resolve to the CSS custom properties emitted at the top of
//! `style.css`. Names not listed here fall back to the default palette and the
//! system font stack when rendering.

use std::fmt;

/// Built-in color schemes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorScheme {
    #[default]
    PikaBeach,
    CatppuccinLatte,
    CatppuccinFrappe,
    CatppuccinMacchiato,
    CatppuccinMocha,
    Dracula,
    Nord,
    TokyoNight,
    Elite,
}

impl ColorScheme {
    pub const ALL: [Self; 9] = [
        Self::PikaBeach,
        Self::CatppuccinLatte,
        Self::CatppuccinFrappe,
        Self::CatppuccinMacchiato,
        Self::CatppuccinMocha,
        Self::Dracula,
        Self::Nord,
        Self::TokyoNight,
        Self::Elite,
    ];

    /// Name as written in `bazel.toml`.
    pub const fn name(self) -> &'static str {
        match self {
            Self::PikaBeach => "pika-beach",
            Self::CatppuccinLatte => "catppuccin-latte",
            Self::CatppuccinFrappe => "catppuccin-frappe",
            Self::CatppuccinMacchiato => "catppuccin-macchiato",
            Self::CatppuccinMocha => "catppuccin-mocha",
            Self::Dracula => "dracula",
            Self::Nord => "nord",
            Self::TokyoNight => "tokyo-night",
            Self::Elite => "3li7e",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.name() == name)
    }

    /// Resolve a configured name, falling back to the default palette.
    pub fn resolve(name: &str) -> Self {
        Self::from_name(name).unwrap_or_default()
    }

    /// CSS custom properties for this palette.
    pub const fn css_variables(self) -> &'static str {
        match self {
            Self::PikaBeach => {
                "--bg-color: 255, 252, 245; --text-color: 40, 59, 67; --accent-color: #048AA2; --secondary-color: #6c6f85;"
            }
            Self::CatppuccinLatte => {
                "--bg-color: 239, 241, 245; --text-color: 76, 79, 105; --accent-color: #8839ef; --secondary-color: #6c6f85;"
            }
            Self::CatppuccinFrappe => {
                "--bg-color: 48, 52, 70; --text-color: 198, 208, 245; --accent-color: #ca9ee6; --secondary-color: #838ba7;"
            }
            Self::CatppuccinMacchiato => {
                "--bg-color: 36, 39, 58; --text-color: 202, 211, 245; --accent-color: #c6a0f6; --secondary-color: #8087a2;"
            }
            Self::CatppuccinMocha => {
                "--bg-color: 30, 30, 46; --text-color: 205, 214, 244; --accent-color: #cba6f7; --secondary-color: #7f849c;"
            }
            Self::Dracula => {
                "--bg-color: 40, 42, 54; --text-color: 248, 248, 242; --accent-color: #bd93f9; --secondary-color: #6272a4;"
            }
            Self::Nord => {
                "--bg-color: 46, 52, 64; --text-color: 216, 222, 233; --accent-color: #88c0d0; --secondary-color: #4c566a;"
            }
            Self::TokyoNight => {
                "--bg-color: 26, 27, 38; --text-color: 169, 177, 214; --accent-color: #7aa2f7; --secondary-color: #565f89;"
            }
            Self::Elite => {
                "--bg-color: 0, 0, 0; --text-color: 0, 255, 0; --accent-color: #00ff41; --secondary-color: #008f11;"
            }
        }
    }
}

impl fmt::Display for ColorScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Built-in font stacks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Font {
    #[default]
    PikaSerif,
    System,
    Serif,
    Monospace,
    Arial,
    Helvetica,
    Georgia,
    Times,
}

impl Font {
    pub const ALL: [Self; 8] = [
        Self::PikaSerif,
        Self::System,
        Self::Serif,
        Self::Monospace,
        Self::Arial,
        Self::Helvetica,
        Self::Georgia,
        Self::Times,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            Self::PikaSerif => "pika-serif",
            Self::System => "system",
            Self::Serif => "serif",
            Self::Monospace => "monospace",
            Self::Arial => "arial",
            Self::Helvetica => "helvetica",
            Self::Georgia => "georgia",
            Self::Times => "times",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.name() == name)
    }

    /// `font-family` value. Unknown names render with the system stack,
    /// so resolution is done by the caller through [`Font::family_for`].
    pub const fn family(self) -> &'static str {
        match self {
            Self::PikaSerif => "'Source Serif 4', Georgia, serif",
            Self::Serif | Self::Georgia => "Georgia, serif",
            Self::Monospace => "'Courier New', monospace",
            Self::Arial => "Arial, sans-serif",
            Self::Helvetica => "'Helvetica Neue', Helvetica, sans-serif",
            Self::Times => "'Times New Roman', Times, serif",
            Self::System => SYSTEM_FONT_STACK,
        }
    }

    /// Resolve a configured font name to its `font-family` value.
    pub fn family_for(name: &str) -> &'static str {
        Self::from_name(name).map_or(SYSTEM_FONT_STACK, Self::family)
    }
}

impl fmt::Display for Font {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

const SYSTEM_FONT_STACK: &str = "system-ui, -apple-system, sans-serif";

/// Editors offered by `bazel editor`. Any other command name is accepted too.
pub const EDITORS: &[&str] = &[
    "auto", "vim", "nvim", "nano", "emacs", "hx", "vi", "code", "subl", "atom", "gedit", "kate",
];

/// Social platforms rendered in the footer.
pub const SOCIAL_PLATFORMS: &[&str] = &[
    "twitter",
    "github",
    "linkedin",
    "facebook",
    "instagram",
    "youtube",
    "mastodon",
    "email",
];
