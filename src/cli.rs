//! Command-line interface definitions.
//!
//! Defines all CLI arguments and subcommands using clap.

use crate::config::theme::SOCIAL_PLATFORMS;
use clap::{Parser, Subcommand, builder::PossibleValuesParser};

/// Bazel, a markdown static site generator
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Registered site to operate on when not inside a site directory
    #[arg(short, long, global = true)]
    pub site: Option<String>,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Deletes the output directory and rebuilds the site
    Build,

    /// Serve the site. Rebuild and reload on change automatically
    Serve {
        /// Interface to bind on
        #[arg(short, long)]
        interface: Option<String>,

        /// The port you should provide
        #[arg(short, long)]
        port: Option<u16>,

        /// enable watch
        #[arg(short, long, action = clap::ArgAction::Set, num_args = 0..=1, default_missing_value = "true", require_equals = false)]
        watch: Option<bool>,
    },

    /// Upgrade the site to this version of bazel and rebuild it
    Upgrade,

    /// Create a site, post or page
    #[command(subcommand)]
    New(NewCommand),

    /// Open an existing post or page in the editor
    #[command(subcommand)]
    Edit(EditCommand),

    /// List posts or pages
    #[command(subcommand)]
    List(ListCommand),

    /// List registered sites, or manage the registry
    Sites {
        #[command(subcommand)]
        action: Option<SitesCommand>,
    },

    /// Show or set the color scheme
    Theme {
        /// e.g. `pika-beach`, `nord`, `3li7e`
        name: Option<String>,
    },

    /// Show or set the font
    Font {
        /// e.g. `pika-serif`, `monospace`
        name: Option<String>,
    },

    /// Manage footer social links
    #[command(subcommand)]
    Social(SocialCommand),

    /// Set the editor used for new and edited content
    Editor {
        /// Command name, or `auto` to use $EDITOR
        name: String,
    },

    /// Print the tool version and the site's version
    Version,
}

#[derive(Subcommand, Debug, Clone)]
pub enum NewCommand {
    /// Scaffold a new site in the current directory and register it
    Site { name: String },
    /// Create posts/<Title>.md and open it
    Post { title: String },
    /// Create pages/<Title>.md and open it
    Page { title: String },
}

#[derive(Subcommand, Debug, Clone)]
pub enum EditCommand {
    Post { name: String },
    Page { name: String },
}

#[derive(Subcommand, Debug, Clone, Copy)]
pub enum ListCommand {
    Posts,
    Pages,
}

#[derive(Subcommand, Debug, Clone)]
pub enum SitesCommand {
    /// Forget a registered site; its files are left alone
    Remove { name: String },
}

#[derive(Subcommand, Debug, Clone)]
pub enum SocialCommand {
    /// Add or replace a link
    Set {
        #[arg(value_parser = PossibleValuesParser::new(SOCIAL_PLATFORMS.iter().copied()))]
        platform: String,
        url: String,
    },
    /// Remove a link
    Remove { platform: String },
}
