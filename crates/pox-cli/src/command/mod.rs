//! Shared plumbing the `install`/`update`/`remove` subcommands all need:
//! loading `composer.json`/`composer.lock`, assembling the repository set,
//! and printing a solved transaction.

pub mod install;
pub mod remove;
pub mod update;

use std::path::Path;

use anyhow::{Context, Result};
use console::style;

use pox_pm::repository::{PackageRepository, Repository, RepositoryManager};
use pox_pm::{LockFile, Manifest, Transaction};

pub fn load_manifest(working_dir: &Path) -> Result<Manifest> {
    let path = working_dir.join("composer.json");
    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    Manifest::from_str(&content).map_err(Into::into)
}

pub fn load_lock(working_dir: &Path) -> Result<Option<LockFile>> {
    let path = working_dir.join("composer.lock");
    if !path.exists() {
        return Ok(None);
    }
    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    Ok(Some(LockFile::from_str(&content)?))
}

pub fn write_lock(working_dir: &Path, lock: &LockFile) -> Result<()> {
    let path = working_dir.join("composer.lock");
    log::info!("writing {} packages to {}", lock.packages.len(), path.display());
    std::fs::write(&path, lock.to_pretty_string()?)
        .with_context(|| format!("failed to write {}", path.display()))
}

/// Builds the set of repositories a resolve run should consult: any
/// `{"type": "package", "package": {...}}` entries under the manifest's
/// `repositories` key. VCS/HTTP-backed repositories are out of scope for
/// this resolver - see the `Repository` contract.
pub fn build_repository_manager(manifest: &Manifest) -> RepositoryManager {
    let mut manager = RepositoryManager::new();

    let Some(repositories) = manifest.extra.get("repositories").and_then(|v| v.as_array()) else {
        return manager;
    };

    for entry in repositories {
        if entry.get("type").and_then(|t| t.as_str()) != Some("package") {
            continue;
        }
        let Some(package_config) = entry.get("package") else { continue };
        match PackageRepository::new(package_config) {
            Ok(repo) => {
                log::debug!("registered package repository with {} package(s)", repo.len());
                manager.add_repository(Box::new(repo));
            }
            Err(e) => eprintln!("{} ignoring malformed repository entry: {e}", style("Warning:").yellow()),
        }
    }

    manager
}

pub fn print_transaction(transaction: &Transaction, verbose: bool) {
    if transaction.is_empty() {
        println!("{}", style("Nothing to install, update, or remove.").green());
        return;
    }

    for package in transaction.new_installs() {
        println!("  {} {}", style("-").green(), style(format!("Installing {}", package.pretty_string())).green());
    }
    for (from, to) in transaction.updates() {
        println!(
            "  {} {}",
            style("-").yellow(),
            style(format!("Updating {} ({} => {})", from.pretty_name(), from.pretty_version(), to.pretty_version())).yellow()
        );
    }
    for package in transaction.removals() {
        println!("  {} {}", style("-").red(), style(format!("Removing {}", package.pretty_string())).red());
    }

    if verbose {
        println!("{}", transaction.summary());
    }
}
