use std::sync::Arc;

use crate::package::Package;

use super::traits::Repository;

/// The baseline repository fed to the solver: whatever is currently
/// installed. `Request::fix`/`Request::lock` pull packages from here rather
/// than this type participating in rule generation directly.
#[derive(Debug, Clone, Default)]
pub struct InstalledRepository {
    packages: Vec<Arc<Package>>,
}

impl InstalledRepository {
    pub fn new() -> Self {
        Self { packages: Vec::new() }
    }

    pub fn from_packages(packages: Vec<Package>) -> Self {
        Self { packages: packages.into_iter().map(Arc::new).collect() }
    }

    pub fn add(&mut self, package: Package) {
        self.packages.push(Arc::new(package));
    }

    pub fn remove(&mut self, name: &str) {
        let name = name.to_lowercase();
        self.packages.retain(|p| p.name() != name);
    }
}

impl Repository for InstalledRepository {
    fn packages(&self) -> &[Arc<Package>] {
        &self.packages
    }

    fn name(&self) -> &str {
        "installed"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_and_remove_roundtrip() {
        let mut repo = InstalledRepository::new();
        repo.add(Package::new("vendor/a", "1.0.0"));
        assert_eq!(repo.len(), 1);

        repo.remove("VENDOR/A");
        assert!(repo.is_empty());
    }

    #[test]
    fn find_package_matches_name_and_version() {
        let repo = InstalledRepository::from_packages(vec![
            Package::new("vendor/a", "1.0.0"),
            Package::new("vendor/a", "2.0.0"),
        ]);
        assert!(repo.find_package("vendor/a", "2.0.0").is_some());
        assert!(repo.find_package("vendor/a", "3.0.0").is_none());
    }
}
