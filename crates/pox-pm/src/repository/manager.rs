use std::sync::Arc;

use crate::package::{parse_branch_aliases, AliasPackage, Package};
use crate::solver::{PackageId, Pool};

use super::installed::InstalledRepository;
use super::traits::Repository;

/// Aggregates every package repository a resolve run should consult and
/// registers all of them into a fresh `Pool`. Order of registration matters
/// only through each repository's `priority()` - the pool, not the manager,
/// is what the solver ultimately reads from.
#[derive(Debug, Default)]
pub struct RepositoryManager {
    repositories: Vec<Box<dyn Repository>>,
    installed: InstalledRepository,
}

impl RepositoryManager {
    pub fn new() -> Self {
        Self { repositories: Vec::new(), installed: InstalledRepository::new() }
    }

    pub fn add_repository(&mut self, repository: Box<dyn Repository>) -> &mut Self {
        self.repositories.push(repository);
        self
    }

    pub fn installed(&self) -> &InstalledRepository {
        &self.installed
    }

    pub fn installed_mut(&mut self) -> &mut InstalledRepository {
        &mut self.installed
    }

    pub fn set_installed(&mut self, installed: InstalledRepository) {
        self.installed = installed;
    }

    /// Every package across every non-installed repository, in registration order.
    pub fn all_packages(&self) -> Vec<(&Arc<Package>, i32)> {
        self.repositories
            .iter()
            .flat_map(|repo| repo.packages().iter().map(move |p| (p, repo.priority())))
            .collect()
    }

    pub fn find_packages(&self, name: &str) -> Vec<&Arc<Package>> {
        self.repositories.iter().flat_map(|repo| repo.find_packages(name)).collect()
    }

    /// Builds a `Pool` from every registered repository plus the installed set.
    pub fn build_pool(&self) -> Pool {
        let mut pool = Pool::new();
        for (package, priority) in self.all_packages() {
            let id = pool.add_package_from_repo((**package).clone(), priority);
            register_branch_aliases(&mut pool, id, package);
        }
        for package in self.installed.packages() {
            let id = pool.add_package_from_repo((**package).clone(), i32::MAX);
            register_branch_aliases(&mut pool, id, package);
        }
        pool
    }

    pub fn repository_count(&self) -> usize {
        self.repositories.len()
    }

    /// Like `build_pool`, but also returns the ids the installed packages
    /// were registered under, so a caller can diff the solver's result
    /// against the pre-solve baseline without re-walking the pool by name.
    pub fn build_pool_with_installed_ids(&self) -> (Pool, Vec<PackageId>) {
        let mut pool = Pool::new();
        for (package, priority) in self.all_packages() {
            let id = pool.add_package_from_repo((**package).clone(), priority);
            register_branch_aliases(&mut pool, id, package);
        }
        let installed_ids = self
            .installed
            .packages()
            .iter()
            .map(|package| {
                let id = pool.add_package_from_repo((**package).clone(), i32::MAX);
                register_branch_aliases(&mut pool, id, package);
                id
            })
            .collect();
        (pool, installed_ids)
    }
}

/// If `package`'s own `extra.branch-alias` names an alias for the branch it
/// is itself published as, registers that alias in the pool pointing back at
/// `id`. This is how `"dev-main": "1.0.x-dev"` in a dependency's
/// `composer.json` lets requirements like `"^1.0"` be satisfied by its
/// `dev-main` branch.
fn register_branch_aliases(pool: &mut Pool, id: PackageId, package: &Package) {
    let aliases = parse_branch_aliases(package.extra.as_ref());
    if let Some((alias_version, alias_pretty)) = aliases.get(&package.version) {
        let alias = AliasPackage::new(Arc::new(package.clone()), alias_version.clone(), alias_pretty.clone());
        pool.add_alias(alias, id);
    }
}
