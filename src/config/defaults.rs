//! Default values for configuration fields.
//!
//! These functions are used by serde for default deserialization.

// ============================================================================
// Root Defaults
// ============================================================================

pub fn title() -> String {
    "My Bazel Site".into()
}

pub fn description() -> String {
    "A static site generated with Bazel".into()
}

pub fn base_url() -> String {
    "https://example.com".into()
}

pub fn editor() -> String {
    "auto".into()
}

// ============================================================================
// [theme] Section Defaults
// ============================================================================

pub mod theme {
    use crate::config::theme::{ColorScheme, Font};

    pub fn color_scheme() -> String {
        ColorScheme::default().name().into()
    }

    pub fn font() -> String {
        Font::default().name().into()
    }
}

// ============================================================================
// Dev Server Defaults
// ============================================================================

pub mod serve {
    pub fn interface() -> String {
        "127.0.0.1".into()
    }

    pub const fn port() -> u16 {
        3000
    }
}
