//! `pox update` - re-resolve `composer.json` against the newest versions
//! allowed by its constraints, ignoring any versions pinned in
//! composer.lock. Restricting to named packages limits which packages the
//! solver is allowed to move; everything else stays fixed where possible.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use pox_pm::repository::InstalledRepository;
use pox_pm::{LockFile, Policy, Solver};

use super::{build_repository_manager, load_lock, load_manifest, print_transaction, write_lock};

#[derive(Args, Debug)]
pub struct UpdateArgs {
    /// Package names to update; empty means update everything.
    pub packages: Vec<String>,

    /// Show what would change without writing composer.lock.
    #[arg(long)]
    pub dry_run: bool,

    /// Print the full transaction summary.
    #[arg(long)]
    pub verbose: bool,

    #[arg(long)]
    pub prefer_source: bool,

    #[arg(long)]
    pub no_recommends: bool,

    #[arg(long)]
    pub install_suggests: bool,

    /// Directory containing composer.json.
    #[arg(short = 'd', long, default_value = ".")]
    pub working_dir: PathBuf,
}

pub fn execute(args: UpdateArgs) -> Result<i32> {
    let _ = (args.prefer_source, args.no_recommends, args.install_suggests);

    let manifest = load_manifest(&args.working_dir)?;
    let lock = load_lock(&args.working_dir)?;

    let mut manager = build_repository_manager(&manifest);
    if let Some(lock) = &lock {
        manager.set_installed(InstalledRepository::from_packages(lock.locked_packages()));
    }

    let (pool, present_ids) = manager.build_pool_with_installed_ids();
    let policy = Policy::new().prefer_stable(manifest.prefer_stable);

    let mut request = manifest.to_request();
    request.fix(manifest.root_package());
    if args.packages.is_empty() {
        request.update_all();
    } else {
        request.update(args.packages.clone());
        for name in &args.packages {
            request.update_package(name.clone());
        }
    }

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
