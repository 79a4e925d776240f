use std::sync::Arc;

use indexmap::IndexMap;

use crate::package::Package;

/// Kind of job a `Request` asks the solver to perform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobKind {
    Install { name: String, constraint: String },
    Remove { name: String },
    Update { name: String },
    UpdateAll,
}

/// A single entry of the request's ordered job list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    pub kind: JobKind,
    /// true for a dev-only requirement (excluded when `install_dev` is false).
    pub dev: bool,
}

/// What needs to be resolved: an ordered list of jobs, plus the context the
/// solver and policy need to interpret them (fixed/locked packages, dev mode,
/// and version preferences).
#[derive(Debug, Clone, Default)]
pub struct Request {
    /// Ordered jobs, in the order they were added - this order is part of
    /// what the solver's determinism guarantee covers.
    pub jobs: Vec<Job>,

    /// Packages that cannot be changed (e.g. platform packages, `--no-update`
    /// entries). Kept separate from `jobs` since they aren't user intent.
    pub fixed_packages: Vec<Arc<Package>>,

    /// Packages recorded in the lock file, consulted by the policy as a
    /// preference signal, not a constraint.
    pub locked_packages: Vec<Arc<Package>>,

    /// Restricts `JobKind::UpdateAll`/root updates to these names; empty means "all".
    pub update_allowlist: Vec<String>,

    pub install_dev: bool,
    pub prefer_stable: bool,
    pub prefer_lowest: bool,
}

impl Request {
    pub fn new() -> Self {
        Self {
            jobs: Vec::new(),
            fixed_packages: Vec::new(),
            locked_packages: Vec::new(),
            update_allowlist: Vec::new(),
            install_dev: true,
            prefer_stable: true,
            prefer_lowest: false,
        }
    }

    pub fn require(&mut self, name: impl Into<String>, constraint: impl Into<String>) -> &mut Self {
        self.jobs.push(Job {
            kind: JobKind::Install {
                name: name.into().to_lowercase(),
                constraint: constraint.into(),
            },
            dev: false,
        });
        self
    }

    pub fn require_dev(&mut self, name: impl Into<String>, constraint: impl Into<String>) -> &mut Self {
        self.jobs.push(Job {
            kind: JobKind::Install {
                name: name.into().to_lowercase(),
                constraint: constraint.into(),
            },
            dev: true,
        });
        self
    }

    pub fn remove(&mut self, name: impl Into<String>) -> &mut Self {
        self.jobs.push(Job {
            kind: JobKind::Remove { name: name.into().to_lowercase() },
            dev: false,
        });
        self
    }

    pub fn update_package(&mut self, name: impl Into<String>) -> &mut Self {
        self.jobs.push(Job {
            kind: JobKind::Update { name: name.into().to_lowercase() },
            dev: false,
        });
        self
    }

    pub fn update_all(&mut self) -> &mut Self {
        self.jobs.push(Job { kind: JobKind::UpdateAll, dev: false });
        self
    }

    pub fn fix(&mut self, package: Package) -> &mut Self {
        self.fixed_packages.push(Arc::new(package));
        self
    }

    pub fn lock(&mut self, package: Package) -> &mut Self {
        self.locked_packages.push(Arc::new(package));
        self
    }

    pub fn update(&mut self, packages: Vec<String>) -> &mut Self {
        self.update_allowlist = packages.into_iter().map(|s| s.to_lowercase()).collect();
        self
    }

    pub fn with_dev(&mut self, install_dev: bool) -> &mut Self {
        self.install_dev = install_dev;
        self
    }

    pub fn prefer_stable(&mut self, prefer: bool) -> &mut Self {
        self.prefer_stable = prefer;
        self
    }

    pub fn prefer_lowest(&mut self, prefer: bool) -> &mut Self {
        self.prefer_lowest = prefer;
        self
    }

    /// Returns the install jobs as an ordered `(name, constraint)` view,
    /// honoring `install_dev`.
    pub fn all_requires(&self) -> impl Iterator<Item = (&str, &str)> {
        self.jobs.iter().filter_map(move |job| {
            if job.dev && !self.install_dev {
                return None;
            }
            match &job.kind {
                JobKind::Install { name, constraint } => Some((name.as_str(), constraint.as_str())),
                _ => None,
            }
        })
    }

    /// Convenience view used by callers building a manifest-derived request.
    pub fn requires(&self) -> IndexMap<String, String> {
        self.all_requires()
            .map(|(n, c)| (n.to_string(), c.to_string()))
            .collect()
    }

    pub fn is_update_allowed(&self, name: &str) -> bool {
        if self.update_allowlist.is_empty() {
            return true;
        }
        self.update_allowlist.iter().any(|n| n == &name.to_lowercase())
    }

    pub fn is_fixed(&self, name: &str) -> bool {
        let name_lower = name.to_lowercase();
        self.fixed_packages.iter().any(|p| p.name.to_lowercase() == name_lower)
    }

    pub fn get_fixed(&self, name: &str) -> Option<&Arc<Package>> {
        let name_lower = name.to_lowercase();
        self.fixed_packages.iter().find(|p| p.name.to_lowercase() == name_lower)
    }

    pub fn get_locked(&self, name: &str) -> Option<&Arc<Package>> {
        let name_lower = name.to_lowercase();
        self.locked_packages.iter().find(|p| p.name.to_lowercase() == name_lower)
    }
}
