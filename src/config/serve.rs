//! Development server settings.

use super::defaults;
use educe::Educe;

/// Options for `bazel serve`, filled from defaults and CLI overrides.
#[derive(Debug, Clone, Educe)]
#[educe(Default)]
pub struct ServeOptions {
    /// Network interface to bind.
    /// - `127.0.0.1` (default): localhost only
    /// - `0.0.0.0`: all interfaces (LAN accessible)
    #[educe(Default = defaults::serve::interface())]
    pub interface: String,

    /// HTTP port number (default: 3000).
    #[educe(Default = defaults::serve::port())]
    pub port: u16,

    /// Enable file watcher for live reload on changes.
    #[educe(Default = true)]
    pub watch: bool,
}

impl ServeOptions {
    /// Apply CLI overrides on top of the defaults.
    pub fn with_overrides(interface: Option<&String>, port: Option<u16>, watch: Option<bool>) -> Self {
        let mut options = Self::default();
        if let Some(interface) = interface {
            options.interface.clone_from(interface);
        }
        if let Some(port) = port {
            options.port = port;
        }
        if let Some(watch) = watch {
            options.watch = watch;
        }
        options
    }
}
