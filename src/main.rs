//! Bazel - A static site generator for markdown blogs.

mod build;
mod cli;
mod config;
mod content;
mod generator;
mod init;
mod logger;
mod registry;
mod serve;
mod upgrade;
mod utils;
mod watch;

use anyhow::{Context, Result, bail};
use build::build_site;
use chrono::Utc;
use clap::Parser;
use cli::{Cli, Commands, EditCommand, ListCommand, NewCommand, SitesCommand, SocialCommand};
use colored::Colorize;
use config::{
    ConfigError, ServeOptions, SiteConfig, SitePaths,
    theme::{ColorScheme, EDITORS, Font},
};
use registry::Registry;
use serve::serve_site;
use std::{env, fmt::Display, fs, process};
use upgrade::{SiteVersion, UpgradeOutcome, Version, upgrade_site};

fn main() {
    let cli = Cli::parse();
    if let Err(err) = run(&cli) {
        eprintln!("{} {err:#}", "Error:".red().bold());
        process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<()> {
    let site = || select_site(cli);

    match &cli.command {
        Commands::Build => build_site(&site()?).map(|_| ()),
        Commands::Serve { interface, port, watch } => {
            let options = ServeOptions::with_overrides(interface.as_ref(), *port, *watch);
            serve_site(&site()?, &options)
        }
        Commands::Upgrade => match upgrade_site(&site()?)? {
            UpgradeOutcome::UpToDate(version) => {
                log!("upgrade"; "site is already at {version}");
                Ok(())
            }
            UpgradeOutcome::Upgraded { from, to, steps } => {
                log!("upgrade"; "upgraded {from} → {to} in {steps} steps, site rebuilt");
                Ok(())
            }
        },
        Commands::New(NewCommand::Site { name }) => new_site(name),
        Commands::New(NewCommand::Post { title }) => {
            let paths = site()?;
            init::new_post(&paths, &load_config(&paths)?, title)
        }
        Commands::New(NewCommand::Page { title }) => {
            let paths = site()?;
            init::new_page(&paths, &load_config(&paths)?, title)
        }
        Commands::Edit(edit) => {
            let paths = site()?;
            let file = match edit {
                EditCommand::Post { name } => init::find_post(&paths, name)?,
                EditCommand::Page { name } => init::find_page(&paths, name)?,
            };
            init::open_in_editor(&load_config(&paths)?, &file)
        }
        Commands::List(kind) => {
            let paths = site()?;
            let names = match kind {
                ListCommand::Posts => init::list_posts(&paths)?,
                ListCommand::Pages => init::list_pages(&paths)?,
            };
            if names.is_empty() {
                log!("list"; "nothing here yet");
            }
            for name in names {
                println!("{name}");
            }
            Ok(())
        }
        Commands::Sites { action: None } => list_sites(),
        Commands::Sites { action: Some(SitesCommand::Remove { name }) } => remove_site(name),
        Commands::Theme { name } => set_theme(&site()?, name.as_deref()),
        Commands::Font { name } => set_font(&site()?, name.as_deref()),
        Commands::Social(social) => set_social(&site()?, social),
        Commands::Editor { name } => {
            let paths = site()?;
            let mut config = load_config(&paths)?;
            if !EDITORS.contains(&name.as_str()) && which::which(name).is_err() {
                log!("editor"; "`{name}` was not found on PATH, saving anyway");
            }
            config.set_editor(name);
            save_config(&paths, &config)?;
            log!("editor"; "editor set to `{name}`");
            Ok(())
        }
        Commands::Version => print_version(cli),
    }
}

// ============================================================================
// Site selection
// ============================================================================

/// The current directory when it is a site, otherwise `--site` looked up in
/// the registry.
fn select_site(cli: &Cli) -> Result<SitePaths> {
    let cwd = env::current_dir().context("Failed to read the current directory")?;
    if SitePaths::new(&cwd).is_site() {
        let root = fs::canonicalize(&cwd).unwrap_or(cwd);
        return Ok(SitePaths::new(root));
    }

    let mut registry = Registry::load()?;
    let Some(name) = &cli.site else {
        let names: Vec<_> = registry.list().iter().map(|s| s.name.as_str()).collect();
        if names.is_empty() {
            bail!("not inside a bazel site. Create one with `bazel new site <NAME>`");
        }
        bail!(
            "not inside a bazel site. Pass `--site <NAME>`, registered sites: {}",
            names.join(", ")
        );
    };

    let root = registry.find_by_name(name)?.path.clone();
    let paths = SitePaths::new(&root);
    if !paths.is_site() {
        bail!("site `{name}` no longer exists at {}", root.display());
    }
    registry.touch_last_used(&root)?;
    Ok(paths)
}

fn load_config(paths: &SitePaths) -> Result<SiteConfig> {
    SiteConfig::load(&paths.config_file()).context("failed to load config")
}

fn save_config(paths: &SitePaths, config: &SiteConfig) -> Result<()> {
    config.save(&paths.config_file()).context("failed to save config")
}

// ============================================================================
// Commands
// ============================================================================

fn new_site(name: &str) -> Result<()> {
    let mut registry = Registry::load()?;
    let cwd = env::current_dir().context("Failed to read the current directory")?;
    init::new_site(&cwd, name, &mut registry)?;

    log!("new"; "next steps:\n  cd {name}\n  bazel serve");
    Ok(())
}

fn list_sites() -> Result<()> {
    let mut registry = Registry::load()?;
    let pruned = registry.prune_missing();
    if pruned > 0 {
        registry.save()?;
        log!("sites"; "removed {pruned} missing sites from the registry");
    }

    if registry.list().is_empty() {
        log!("sites"; "no sites registered. Create one with `bazel new site <NAME>`");
        return Ok(());
    }

    let now = Utc::now();
    for site in registry.list() {
        println!("{}  {}", site.name.bold(), site.path.display());
        println!("    last used: {}", site.last_used_label(now));
        if !site.description.is_empty() {
            println!("    {}", site.description.dimmed());
        }
    }
    Ok(())
}

fn remove_site(name: &str) -> Result<()> {
    let mut registry = Registry::load()?;
    let path = registry.find_by_name(name)?.path.clone();
    registry.remove_site(&path)?;
    log!("sites"; "removed `{name}` ({}) from the registry", path.display());
    Ok(())
}

fn set_theme(paths: &SitePaths, name: Option<&str>) -> Result<()> {
    let mut config = load_config(paths)?;
    let Some(name) = name else {
        print_choices(config.color_scheme(), ColorScheme::ALL);
        return Ok(());
    };

    let scheme = ColorScheme::from_name(name).ok_or_else(|| {
        ConfigError::Validation(format!("unknown color scheme `{name}`, run `bazel theme` to list them"))
    })?;
    config.set_color_scheme(scheme);
    save_config(paths, &config)?;
    log!("theme"; "color scheme set to {scheme}");
    build_site(paths).map(|_| ())
}

fn set_font(paths: &SitePaths, name: Option<&str>) -> Result<()> {
    let mut config = load_config(paths)?;
    let Some(name) = name else {
        let current = Font::from_name(&config.theme.font).unwrap_or_default();
        print_choices(current, Font::ALL);
        return Ok(());
    };

    let font = Font::from_name(name).ok_or_else(|| {
        ConfigError::Validation(format!("unknown font `{name}`, run `bazel font` to list them"))
    })?;
    config.set_font(font);
    save_config(paths, &config)?;
    log!("font"; "font set to {font}");
    build_site(paths).map(|_| ())
}

fn set_social(paths: &SitePaths, command: &SocialCommand) -> Result<()> {
    let mut config = load_config(paths)?;
    match command {
        SocialCommand::Set { platform, url } => {
            config.set_social(platform, url);
            log!("social"; "{platform} → {url}");
        }
        SocialCommand::Remove { platform } => {
            if !config.remove_social(platform) {
                bail!("no `{platform}` link is configured");
            }
            log!("social"; "removed {platform}");
        }
    }
    save_config(paths, &config)?;
    build_site(paths).map(|_| ())
}

fn print_version(cli: &Cli) -> Result<()> {
    println!("bazel {}", Version::tool());

    let Ok(paths) = select_site(cli) else {
        return Ok(());
    };
    match SiteVersion::load(&paths.version_file())? {
        Some(marker) => println!("site  {} ({})", marker.version, paths.root().display()),
        None => println!("site  untracked, run `bazel upgrade` ({})", paths.root().display()),
    }
    Ok(())
}

/// Print every choice, marking the current one.
fn print_choices<T: Copy + PartialEq + Display>(current: T, all: impl IntoIterator<Item = T>) {
    for choice in all {
        if choice == current {
            println!("{} {}", "*".green(), choice.to_string().bold());
        } else {
            println!("  {choice}");
        }
    }
}
