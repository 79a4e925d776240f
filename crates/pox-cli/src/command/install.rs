//! `pox install` - resolve `composer.json` into the set of packages already
//! recorded in `composer.lock` wherever those versions still satisfy it,
//! falling back to a full solve when there is no lock yet.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use console::style;

use pox_pm::repository::InstalledRepository;
use pox_pm::{LockFile, Policy, Solver};

use super::{build_repository_manager, load_lock, load_manifest, print_transaction, write_lock};

#[derive(Args, Debug)]
pub struct InstallArgs {
    /// Show what would change without writing composer.lock.
    #[arg(long)]
    pub dry_run: bool,

    /// Print the full transaction summary.
    #[arg(long)]
    pub verbose: bool,

    /// Accepted for Composer compatibility; source vs. dist installation is
    /// an Installer-shell concern this resolver does not perform.
    #[arg(long)]
    pub prefer_source: bool,

    /// Accepted for Composer compatibility; recommends are advisory only
    /// and never affect resolution.
    #[arg(long)]
    pub no_recommends: bool,

    /// Accepted for Composer compatibility; suggests are advisory only and
    /// never affect resolution.
    #[arg(long)]
    pub install_suggests: bool,

    /// Directory containing composer.json.
    #[arg(short = 'd', long, default_value = ".")]
    pub working_dir: PathBuf,
}

pub fn execute(args: InstallArgs) -> Result<i32> {
    let _ = (args.prefer_source, args.no_recommends, args.install_suggests);

    let manifest = load_manifest(&args.working_dir)?;
    let lock = load_lock(&args.working_dir)?;

    if let Some(lock) = &lock {
        lock.verify_fresh(&manifest)?;
    } else {
        println!("{} no composer.lock found, resolving from scratch", style("Info:").cyan());
    }

    let mut manager = build_repository_manager(&manifest);
    if let Some(lock) = &lock {
        manager.set_installed(InstalledRepository::from_packages(lock.locked_packages()));
    }

    let (pool, present_ids) = manager.build_pool_with_installed_ids();

    let mut policy = Policy::new().prefer_stable(manifest.prefer_stable);
    if let Some(lock) = &lock {
        for locked in &lock.packages {
            policy = policy.with_preferred_version(&locked.name, &locked.version);
        }
    }

    let mut request = manifest.to_request();
    request.fix(manifest.root_package());

    log::debug!("solving with {} package(s) already installed", present_ids.len());
    let result = Solver::new(&pool, &policy).solve(&request).map_err(pox_pm::ComposerError::from)?;
    log::info!("solved: {} package(s) in the result set", result.installed.len());
    let transaction = pox_pm::Transaction::from_solver_result(&pool, &present_ids, &result.installed);

    print_transaction(&transaction, args.verbose);

    if !args.dry_run {
        let lock_file = LockFile::from_resolved(&pool, &result.installed, &manifest);
        write_lock(&args.working_dir, &lock_file)?;
    }

    Ok(0)
}
