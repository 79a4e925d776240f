use std::sync::Arc;

use crate::package::Package;

/// A source of candidate packages the `Pool` can register. Synchronous and
/// in-memory: fetching packages over the network or from version control is
/// out of scope, so every implementation already has its package list in hand.
pub trait Repository: std::fmt::Debug {
    /// Every package this repository offers, in registration order.
    fn packages(&self) -> &[Arc<Package>];

    /// Human-readable name, used in `Problem` rendering and CLI output.
    fn name(&self) -> &str;

    /// Selection priority: higher wins when more than one repository offers
    /// the same name/version pair. Passed straight through to `Pool::add_package_from_repo`.
    fn priority(&self) -> i32 {
        0
    }

    fn find_package(&self, name: &str, version: &str) -> Option<&Arc<Package>> {
        let name = name.to_lowercase();
        self.packages()
            .iter()
            .find(|p| p.name() == name && p.version() == version)
    }

    fn find_packages(&self, name: &str) -> Vec<&Arc<Package>> {
        let name = name.to_lowercase();
        self.packages().iter().filter(|p| p.name() == name).collect()
    }

    fn len(&self) -> usize {
        self.packages().len()
    }

    fn is_empty(&self) -> bool {
        self.packages().is_empty()
    }
}
