use std::collections::HashMap;
use std::sync::Arc;

use indexmap::IndexMap;
use pox_semver::VersionParser;

use crate::package::{AliasPackage, Package, Stability};

use super::rule::Literal;

/// A package id is just the positive literal that refers to it; id 0 is invalid.
pub type PackageId = Literal;

#[derive(Clone)]
pub enum PoolEntry {
    Package(Arc<Package>),
    Alias(Arc<AliasPackage>, PackageId),
}

/// The canonical, append-only registry of every candidate package the solver
/// may reason about. Ids are assigned densely starting at 1 and never reused.
pub struct Pool {
    entries: Vec<PoolEntry>,
    /// Every name (own name, plus every `provide`/`replace` target) maps to the
    /// ids of packages offering it, in registration order.
    by_name: IndexMap<String, Vec<PackageId>>,
    /// Ids of alias packages pointing at a given underlying package id.
    aliases_of: HashMap<PackageId, Vec<PackageId>>,
    /// Per-name priority override, consulted ahead of repository priority.
    name_priority: HashMap<String, i32>,
    minimum_stability: Stability,
    parser: VersionParser,
}

impl Pool {
    pub fn new() -> Self {
        Self {
            entries: vec![PoolEntry::Package(Arc::new(Package::new("", "")))], // id 0 sentinel
            by_name: IndexMap::new(),
            aliases_of: HashMap::new(),
            name_priority: HashMap::new(),
            minimum_stability: Stability::Stable,
            parser: VersionParser::new(),
        }
    }

    pub fn with_minimum_stability(mut self, stability: Stability) -> Self {
        self.minimum_stability = stability;
        self
    }

    pub fn minimum_stability(&self) -> Stability {
        self.minimum_stability
    }

    /// Registers a concrete package from a repository of the given priority
    /// (higher wins). Indexes it under its own name and every provide/replace name.
    pub fn add_package_from_repo(&mut self, mut package: Package, priority: i32) -> PackageId {
        package.repository_priority = priority;
        let package = Arc::new(package);
        let id = self.entries.len() as PackageId;
        self.index_name(package.name().to_string(), id);
        for name in package.provide.keys() {
            self.index_name(name.to_lowercase(), id);
        }
        for name in package.replace.keys() {
            self.index_name(name.to_lowercase(), id);
        }
        self.entries.push(PoolEntry::Package(package));
        id
    }

    /// Registers an alias of an already-registered package.
    pub fn add_alias(&mut self, alias: AliasPackage, target: PackageId) -> PackageId {
        let alias = Arc::new(alias);
        let id = self.entries.len() as PackageId;
        self.index_name(alias.name().to_string(), id);
        self.entries.push(PoolEntry::Alias(alias, target));
        self.aliases_of.entry(target).or_default().push(id);
        id
    }

    fn index_name(&mut self, name: String, id: PackageId) {
        self.by_name.entry(name).or_default().push(id);
    }

    pub fn len(&self) -> usize {
        self.entries.len() - 1
    }

    pub fn entry(&self, id: PackageId) -> &PoolEntry {
        &self.entries[id.unsigned_abs() as usize]
    }

    pub fn is_alias(&self, id: PackageId) -> bool {
        matches!(self.entry(id), PoolEntry::Alias(..))
    }

    pub fn is_root_package_alias(&self, id: PackageId) -> bool {
        match self.entry(id) {
            PoolEntry::Alias(a, _) => a.is_root_package_alias(),
            _ => false,
        }
    }

    pub fn alias_target(&self, id: PackageId) -> Option<PackageId> {
        match self.entry(id) {
            PoolEntry::Alias(_, target) => Some(*target),
            _ => None,
        }
    }

    pub fn get_aliases(&self, id: PackageId) -> &[PackageId] {
        self.aliases_of.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn package(&self, id: PackageId) -> Arc<Package> {
        match self.entry(id) {
            PoolEntry::Package(p) => p.clone(),
            PoolEntry::Alias(a, _) => a.alias_of_arc(),
        }
    }

    /// Returns the alias wrapper itself, if `id` refers to an alias entry.
    pub fn alias_package(&self, id: PackageId) -> Option<Arc<AliasPackage>> {
        match self.entry(id) {
            PoolEntry::Alias(a, _) => Some(a.clone()),
            PoolEntry::Package(_) => None,
        }
    }

    pub fn name(&self, id: PackageId) -> &str {
        match self.entry(id) {
            PoolEntry::Package(p) => p.name(),
            PoolEntry::Alias(a, _) => a.name(),
        }
    }

    pub fn version(&self, id: PackageId) -> &str {
        match self.entry(id) {
            PoolEntry::Package(p) => p.version(),
            PoolEntry::Alias(a, _) => a.version(),
        }
    }

    pub fn pretty_string(&self, id: PackageId) -> String {
        match self.entry(id) {
            PoolEntry::Package(p) => p.pretty_string(),
            PoolEntry::Alias(a, _) => a.pretty_string(),
        }
    }

    pub fn stability(&self, id: PackageId) -> Stability {
        match self.entry(id) {
            PoolEntry::Package(p) => p.stability(),
            PoolEntry::Alias(a, _) => a.stability(),
        }
    }

    pub fn is_dev(&self, id: PackageId) -> bool {
        match self.entry(id) {
            PoolEntry::Package(p) => p.is_dev(),
            PoolEntry::Alias(a, _) => a.is_dev(),
        }
    }

    pub fn require(&self, id: PackageId) -> IndexMap<String, String> {
        match self.entry(id) {
            PoolEntry::Package(p) => p.require.clone(),
            PoolEntry::Alias(a, _) => a.require().clone(),
        }
    }

    pub fn conflict(&self, id: PackageId) -> IndexMap<String, String> {
        match self.entry(id) {
            PoolEntry::Package(p) => p.conflict.clone(),
            PoolEntry::Alias(a, _) => a.conflict().clone(),
        }
    }

    pub fn replace(&self, id: PackageId) -> IndexMap<String, String> {
        match self.entry(id) {
            PoolEntry::Package(p) => p.replace.clone(),
            PoolEntry::Alias(a, _) => a.replace().clone(),
        }
    }

    pub fn repository_priority(&self, id: PackageId) -> i32 {
        match self.entry(id) {
            PoolEntry::Package(p) => p.repository_priority,
            PoolEntry::Alias(_, target) => self.repository_priority(*target),
        }
    }

    pub fn get_priority_by_id(&self, id: PackageId) -> i32 {
        if let Some(&p) = self.name_priority.get(self.name(id)) {
            return p;
        }
        self.repository_priority(id)
    }

    pub fn set_priority(&mut self, name: &str, priority: i32) {
        self.name_priority.insert(name.to_lowercase(), priority);
    }

    pub fn ids_for_name(&self, name: &str) -> &[PackageId] {
        self.by_name.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Returns every id that satisfies `name` under `constraint` (or all ids
    /// registered under `name` if `constraint` is `None` / `"*"`).
    pub fn what_provides(&self, name: &str, constraint: Option<&str>) -> Vec<PackageId> {
        let candidates = self.ids_for_name(name);
        let Some(constraint) = constraint.filter(|c| !c.is_empty() && *c != "*") else {
            return candidates.to_vec();
        };
        let Ok(parsed) = self.parser.parse_constraints_cached(constraint) else {
            return Vec::new();
        };
        candidates
            .iter()
            .copied()
            .filter(|&id| parsed.matches_normalized(self.version(id)))
            .collect()
    }
}

impl Default for Pool {
    fn default() -> Self {
        Self::new()
    }
}
