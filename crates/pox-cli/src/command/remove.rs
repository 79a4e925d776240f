//! `pox remove` - drop a package from the dependency set and re-resolve.

use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::Args;

use pox_pm::repository::InstalledRepository;
use pox_pm::{LockFile, Policy, Solver};

use super::{build_repository_manager, load_lock, load_manifest, print_transaction, write_lock};

#[derive(Args, Debug)]
pub struct RemoveArgs {
    /// Package names to remove.
    #[arg(required = true)]
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

pub fn execute(args: RemoveArgs) -> Result<i32> {
    let _ = (args.prefer_source, args.no_recommends, args.install_suggests);

    let manifest = load_manifest(&args.working_dir)?;
    let lock = load_lock(&args.working_dir)?;

    let Some(lock) = lock else {
        bail!("no composer.lock found; nothing is installed to remove");
    };

    let mut manager = build_repository_manager(&manifest);
    manager.set_installed(InstalledRepository::from_packages(lock.locked_packages()));

    let (pool, present_ids) = manager.build_pool_with_installed_ids();
    let policy = Policy::new().prefer_stable(manifest.prefer_stable);

    let mut request = manifest.to_request();
    request.fix(manifest.root_package());
    for name in &args.packages {
        request.remove(name.clone());
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
