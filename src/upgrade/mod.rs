//! Site upgrades between tool versions.
//!
//! ```text
//! .bazel-version (absent = 0.0.0)
//!     │
//!     ├── plan()        pick eligible steps from MIGRATIONS in order
//!     ├── apply         each step, aborting on the first failure
//!     ├── persist       new version + last_upgrade
//!     └── rebuild       build_site()
//! ```
//!
//! A failed step leaves the marker untouched, so rerunning retries from the
//! same version.

mod error;
pub mod migrations;
pub mod version;

pub use error::UpgradeError;
pub use migrations::{MIGRATIONS, Migration};
pub use version::{SiteVersion, Version};

use crate::{build::build_site, config::SitePaths, log};
use chrono::Utc;

/// Result of a successful `bazel upgrade`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpgradeOutcome {
    UpToDate(Version),
    Upgraded { from: Version, to: Version, steps: usize },
}

/// Steps to run from `current`, in order.
///
/// A step is eligible when `from <= version < to`; after it runs the version
/// becomes its `to`. Nothing is planned once `current` reaches `target`.
pub fn plan(current: Version, target: Version, migrations: &[Migration]) -> Vec<&Migration> {
    let mut version = current;
    let mut steps = Vec::new();
    for migration in migrations {
        if version >= target {
            break;
        }
        if version >= migration.from && version < migration.to {
            steps.push(migration);
            version = migration.to;
        }
    }
    steps
}

/// Upgrade the site to the tool's version and rebuild it.
pub fn upgrade_site(paths: &SitePaths) -> Result<UpgradeOutcome, UpgradeError> {
    upgrade_site_with(paths, MIGRATIONS, Version::tool())
}

pub fn upgrade_site_with(
    paths: &SitePaths,
    migrations: &[Migration],
    target: Version,
) -> Result<UpgradeOutcome, UpgradeError> {
    if !paths.is_site() {
        return Err(UpgradeError::NotASite(paths.root().to_path_buf()));
    }

    let version_file = paths.version_file();
    let mut marker = SiteVersion::load(&version_file)?.unwrap_or_else(SiteVersion::untracked);
    let current = marker.version;

    log!("upgrade"; "site version {current}, tool version {target}");
    if current >= target {
        return Ok(UpgradeOutcome::UpToDate(current));
    }

    let steps = plan(current, target, migrations);
    let mut reached = current;
    for migration in &steps {
        log!("upgrade"; "{} → {}: {}", migration.from, migration.to, migration.description);
        migration.apply(paths).map_err(|err| UpgradeError::Step {
            from: migration.from,
            to: migration.to,
            description: migration.description,
            source: err.into(),
        })?;
        reached = migration.to;
    }

    marker.version = reached;
    marker.last_upgrade = Utc::now();
    marker.save(&version_file)?;

    build_site(paths).map_err(|err| UpgradeError::Rebuild(err.into()))?;

    Ok(UpgradeOutcome::Upgraded {
        from: current,
        to: reached,
        steps: steps.len(),
    })
}
