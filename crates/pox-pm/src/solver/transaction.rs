use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;

use crate::package::{AliasPackage, Package};

use super::pool::{Pool, PackageId};

/// The diff between what is currently installed and what the solver decided
/// should be installed, expressed as an ordered list of operations.
#[derive(Debug, Clone, Default)]
pub struct Transaction {
    pub operations: Vec<Operation>,
}

/// A single operation in a transaction.
#[derive(Debug, Clone)]
pub enum Operation {
    Install(Arc<Package>),
    Update { from: Arc<Package>, to: Arc<Package> },
    Uninstall(Arc<Package>),
    /// Mark an alias as installed: the alias package itself is never
    /// installed, but requirements matching the alias version are satisfied.
    MarkAliasInstalled(Arc<AliasPackage>),
    MarkAliasUninstalled(Arc<AliasPackage>),
}

impl Transaction {
    pub fn new() -> Self {
        Self { operations: Vec::new() }
    }

    /// Build a transaction from the solver's before/after package-id sets,
    /// resolving ids against the pool to get at the underlying packages.
    pub fn from_solver_result(
        pool: &Pool,
        present_ids: &[PackageId],
        result_ids: &[PackageId],
    ) -> Self {
        let present: Vec<Arc<Package>> = present_ids.iter().map(|&id| pool.package(id)).collect();
        let result: Vec<Arc<Package>> = result_ids.iter().map(|&id| pool.package(id)).collect();

        let result_aliases: Vec<Arc<AliasPackage>> = result_ids
            .iter()
            .filter_map(|&id| pool.alias_package(id))
            .collect();

        Self::from_packages(present, result, result_aliases)
    }

    pub fn from_packages(
        present_packages: Vec<Arc<Package>>,
        result_packages: Vec<Arc<Package>>,
        result_aliases: Vec<Arc<AliasPackage>>,
    ) -> Self {
        let mut tx = Self::new();
        tx.calculate_operations(present_packages, result_packages, result_aliases);
        tx
    }

    fn calculate_operations(
        &mut self,
        present_packages: Vec<Arc<Package>>,
        result_packages: Vec<Arc<Package>>,
        result_aliases: Vec<Arc<AliasPackage>>,
    ) {
        let mut present_package_map: HashMap<String, Arc<Package>> = HashMap::new();
        let mut remove_map: HashMap<String, Arc<Package>> = HashMap::new();
        let remove_alias_map: HashMap<String, Arc<AliasPackage>> = HashMap::new();

        for package in &present_packages {
            let name_lower = package.name.to_lowercase();
            present_package_map.insert(name_lower.clone(), package.clone());
            remove_map.insert(name_lower, package.clone());
        }

        for package in &result_packages {
            let name_lower = package.name.to_lowercase();

            if let Some(present_pkg) = present_package_map.get(&name_lower) {
                if self.needs_update(present_pkg, package) {
                    self.operations.push(Operation::Update {
                        from: present_pkg.clone(),
                        to: package.clone(),
                    });
                }
                remove_map.remove(&name_lower);
            } else {
                self.operations.push(Operation::Install(package.clone()));
                remove_map.remove(&name_lower);
            }
        }

        for alias in &result_aliases {
            self.operations.push(Operation::MarkAliasInstalled(alias.clone()));
        }

        let mut remove_list: Vec<_> = remove_map.into_iter().collect();
        remove_list.sort_by(|a, b| a.0.cmp(&b.0));
        for (_, package) in remove_list {
            self.operations.insert(0, Operation::Uninstall(package));
        }

        let mut remove_alias_list: Vec<_> = remove_alias_map.into_iter().collect();
        remove_alias_list.sort_by(|a, b| a.0.cmp(&b.0));
        for (_, alias) in remove_alias_list {
            self.operations.push(Operation::MarkAliasUninstalled(alias));
        }

        self.move_uninstalls_to_front();
    }

    fn needs_update(&self, present: &Package, target: &Package) -> bool {
        if present.version != target.version {
            return true;
        }

        let present_dist_ref = present.dist.as_ref().and_then(|d| d.reference.as_ref());
        let target_dist_ref = target.dist.as_ref().and_then(|d| d.reference.as_ref());
        if present_dist_ref.is_some() && target_dist_ref.is_some() && present_dist_ref != target_dist_ref {
            return true;
        }

        let present_source_ref = present.source.as_ref().map(|s| &s.reference);
        let target_source_ref = target.source.as_ref().map(|s| &s.reference);
        if present_source_ref.is_some() && target_source_ref.is_some() && present_source_ref != target_source_ref {
            return true;
        }

        false
    }

    fn move_uninstalls_to_front(&mut self) {
        let mut uninstalls = Vec::new();
        let mut others = Vec::new();

        for op in self.operations.drain(..) {
            match &op {
                Operation::Uninstall(_) | Operation::MarkAliasUninstalled(_) => uninstalls.push(op),
                _ => others.push(op),
            }
        }

        self.operations.extend(uninstalls);
        self.operations.extend(others);
    }

    pub fn install(&mut self, package: Arc<Package>) {
        self.operations.push(Operation::Install(package));
    }

    pub fn update(&mut self, from: Arc<Package>, to: Arc<Package>) {
        self.operations.push(Operation::Update { from, to });
    }

    pub fn uninstall(&mut self, package: Arc<Package>) {
        self.operations.push(Operation::Uninstall(package));
    }

    pub fn mark_alias_installed(&mut self, alias: Arc<AliasPackage>) {
        self.operations.push(Operation::MarkAliasInstalled(alias));
    }

    pub fn mark_alias_uninstalled(&mut self, alias: Arc<AliasPackage>) {
        self.operations.push(Operation::MarkAliasUninstalled(alias));
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn installs(&self) -> impl Iterator<Item = &Arc<Package>> {
        self.operations.iter().filter_map(|op| match op {
            Operation::Install(pkg) => Some(pkg),
            Operation::Update { to, .. } => Some(to),
            _ => None,
        })
    }

    pub fn uninstalls(&self) -> impl Iterator<Item = &Arc<Package>> {
        self.operations.iter().filter_map(|op| match op {
            Operation::Uninstall(pkg) => Some(pkg),
            Operation::Update { from, .. } => Some(from),
            _ => None,
        })
    }

    pub fn new_installs(&self) -> impl Iterator<Item = &Arc<Package>> {
        self.operations.iter().filter_map(|op| match op {
            Operation::Install(pkg) => Some(pkg),
            _ => None,
        })
    }

    pub fn updates(&self) -> impl Iterator<Item = (&Arc<Package>, &Arc<Package>)> {
        self.operations.iter().filter_map(|op| match op {
            Operation::Update { from, to } => Some((from, to)),
            _ => None,
        })
    }

    pub fn removals(&self) -> impl Iterator<Item = &Arc<Package>> {
        self.operations.iter().filter_map(|op| match op {
            Operation::Uninstall(pkg) => Some(pkg),
            _ => None,
        })
    }

    /// Reorder operations for safe execution: uninstalls first, then updates
    /// and installs in dependency order (a package is installed only after
    /// whatever it requires), then alias bookkeeping.
    pub fn sort(&mut self) {
        let mut uninstalls: Vec<Operation> = Vec::new();
        let mut updates: Vec<Operation> = Vec::new();
        let mut installs: Vec<Operation> = Vec::new();
        let mut alias_ops: Vec<Operation> = Vec::new();

        for op in self.operations.drain(..) {
            match &op {
                Operation::Uninstall(_) => uninstalls.push(op),
                Operation::Update { .. } => updates.push(op),
                Operation::Install(_) => installs.push(op),
                Operation::MarkAliasInstalled(_) | Operation::MarkAliasUninstalled(_) => alias_ops.push(op),
            }
        }

        let sorted_installs = topological_sort_operations(installs);
        let sorted_updates = topological_sort_operations(updates);

        self.operations.extend(uninstalls);
        self.operations.extend(sorted_updates);
        self.operations.extend(sorted_installs);
        self.operations.extend(alias_ops);
    }

    pub fn summary(&self) -> TransactionSummary {
        let mut summary = TransactionSummary::default();

        for op in &self.operations {
            match op {
                Operation::Install(_) => summary.installs += 1,
                Operation::Update { .. } => summary.updates += 1,
                Operation::Uninstall(_) => summary.uninstalls += 1,
                Operation::MarkAliasInstalled(_) => summary.alias_installs += 1,
                Operation::MarkAliasUninstalled(_) => summary.alias_uninstalls += 1,
            }
        }

        summary
    }

    pub fn alias_installs(&self) -> impl Iterator<Item = &Arc<AliasPackage>> {
        self.operations.iter().filter_map(|op| match op {
            Operation::MarkAliasInstalled(alias) => Some(alias),
            _ => None,
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct TransactionSummary {
    pub installs: usize,
    pub updates: usize,
    pub uninstalls: usize,
    pub alias_installs: usize,
    pub alias_uninstalls: usize,
}

impl std::fmt::Display for TransactionSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut parts = Vec::new();

        if self.installs > 0 {
            parts.push(format!("{} install(s)", self.installs));
        }
        if self.updates > 0 {
            parts.push(format!("{} update(s)", self.updates));
        }
        if self.uninstalls > 0 {
            parts.push(format!("{} removal(s)", self.uninstalls));
        }

        if parts.is_empty() {
            write!(f, "Nothing to do")
        } else {
            write!(f, "{}", parts.join(", "))
        }
    }
}

/// Topologically sorts operations so a package's requires are installed
/// before it is. Platform requirements (php, ext-*, lib-*) never appear as
/// operations and are skipped. Cycles shouldn't occur in a solved request;
/// if one does, the remaining operations are appended in their original order.
fn topological_sort_operations(operations: Vec<Operation>) -> Vec<Operation> {
    if operations.is_empty() {
        return operations;
    }

    let mut name_to_index: HashMap<String, usize> = HashMap::new();
    let mut packages: Vec<Arc<Package>> = Vec::new();

    for (idx, op) in operations.iter().enumerate() {
        let pkg = match op {
            Operation::Install(p) => p.clone(),
            Operation::Update { to, .. } => to.clone(),
            _ => continue,
        };
        name_to_index.insert(pkg.name.to_lowercase(), idx);
        packages.push(pkg);
    }

    let mut in_degree: Vec<usize> = vec![0; operations.len()];
    let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); operations.len()];

    for (idx, pkg) in packages.iter().enumerate() {
        for dep_name in pkg.require.keys() {
            let dep_lower = dep_name.to_lowercase();
            if dep_lower == "php" || dep_lower.starts_with("ext-") || dep_lower.starts_with("lib-") {
                continue;
            }
            if let Some(&dep_idx) = name_to_index.get(&dep_lower) {
                dependents[dep_idx].push(idx);
                in_degree[idx] += 1;
            }
        }
    }

    let mut queue: VecDeque<usize> = VecDeque::new();
    let mut result: Vec<usize> = Vec::new();

    for (idx, &degree) in in_degree.iter().enumerate() {
        if degree == 0 {
            queue.push_back(idx);
        }
    }

    while let Some(idx) = queue.pop_front() {
        result.push(idx);
        for &dependent_idx in &dependents[idx] {
            in_degree[dependent_idx] -= 1;
            if in_degree[dependent_idx] == 0 {
                queue.push_back(dependent_idx);
            }
        }
    }

    if result.len() != operations.len() {
        let in_result: HashSet<usize> = result.iter().copied().collect();
        for idx in 0..operations.len() {
            if !in_result.contains(&idx) {
                result.push(idx);
            }
        }
    }

    result.into_iter().map(|idx| operations[idx].clone()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::package::{Dist, Source};

    #[test]
    fn a_fresh_transaction_has_no_operations() {
        let tx = Transaction::new();
        assert!(tx.is_empty());
        assert_eq!(tx.len(), 0);
    }

    #[test]
    fn install_and_uninstall_are_counted_through_updates() {
        let mut tx = Transaction::new();
        tx.update(Arc::new(Package::new("vendor/package", "1.0.0")), Arc::new(Package::new("vendor/package", "2.0.0")));

        assert_eq!(tx.updates().count(), 1);
        assert_eq!(tx.installs().count(), 1, "an update counts as an install of the new version");
        assert_eq!(tx.uninstalls().count(), 1, "an update counts as an uninstall of the old version");
        assert_eq!(tx.new_installs().count(), 0, "but not as a fresh install");
    }

    #[test]
    fn summary_tallies_each_operation_kind_separately() {
        let mut tx = Transaction::new();
        tx.install(Arc::new(Package::new("a", "1.0.0")));
        tx.install(Arc::new(Package::new("b", "1.0.0")));
        tx.uninstall(Arc::new(Package::new("c", "1.0.0")));
        tx.mark_alias_installed(Arc::new(AliasPackage::new(
            Arc::new(Package::new("d", "dev-main")),
            "9999999-dev".to_string(),
            "dev-main".to_string(),
        )));

        let summary = tx.summary();
        assert_eq!(summary.installs, 2);
        assert_eq!(summary.uninstalls, 1);
        assert_eq!(summary.updates, 0);
        assert_eq!(summary.alias_installs, 1);
        assert_eq!(format!("{summary}"), "2 install(s), 1 removal(s)");
    }

    #[test]
    fn empty_summary_reports_nothing_to_do() {
        assert_eq!(Transaction::new().summary().to_string(), "Nothing to do");
    }

    #[test]
    fn sort_moves_every_uninstall_ahead_of_installs_and_updates() {
        let mut tx = Transaction::new();
        tx.install(Arc::new(Package::new("a", "1.0.0")));
        tx.uninstall(Arc::new(Package::new("b", "1.0.0")));
        tx.update(Arc::new(Package::new("c", "1.0.0")), Arc::new(Package::new("c", "2.0.0")));

        tx.sort();

        assert!(matches!(tx.operations[0], Operation::Uninstall(_)));
        let last_uninstall = tx.operations.iter().rposition(|op| matches!(op, Operation::Uninstall(_))).unwrap();
        let first_non_uninstall = tx.operations.iter().position(|op| !matches!(op, Operation::Uninstall(_))).unwrap();
        assert!(last_uninstall < first_non_uninstall);
    }

    #[test]
    fn sort_installs_a_dependency_chain_in_require_order() {
        let mut tx = Transaction::new();

        let pkg_a = Package::new("vendor/a", "1.0.0");
        let mut pkg_b = Package::new("vendor/b", "1.0.0");
        pkg_b.require.insert("vendor/a".to_string(), "^1.0".to_string());
        let mut pkg_c = Package::new("vendor/c", "1.0.0");
        pkg_c.require.insert("vendor/b".to_string(), "^1.0".to_string());
        pkg_c.require.insert("php".to_string(), ">=8.0".to_string());

        tx.install(Arc::new(pkg_c));
        tx.install(Arc::new(pkg_a));
        tx.install(Arc::new(pkg_b));

        tx.sort();

        let install_names: Vec<String> = tx
            .operations
            .iter()
            .filter_map(|op| match op {
                Operation::Install(p) => Some(p.name.clone()),
                _ => None,
            })
            .collect();

        let a_pos = install_names.iter().position(|n| n == "vendor/a").unwrap();
        let b_pos = install_names.iter().position(|n| n == "vendor/b").unwrap();
        let c_pos = install_names.iter().position(|n| n == "vendor/c").unwrap();

        assert!(a_pos < b_pos, "a is required by b, so it installs first");
        assert!(b_pos < c_pos, "b is required by c, so it installs first");
    }

    #[test]
    fn from_packages_detects_a_fresh_install() {
        let tx = Transaction::from_packages(vec![], vec![Arc::new(Package::new("vendor/a", "1.0.0"))], vec![]);

        assert_eq!(tx.new_installs().count(), 1);
        assert_eq!(tx.updates().count(), 0);
        assert_eq!(tx.removals().count(), 0);
    }

    #[test]
    fn from_packages_detects_a_version_bump_as_an_update() {
        let present = vec![Arc::new(Package::new("vendor/a", "1.0.0"))];
        let result = vec![Arc::new(Package::new("vendor/a", "2.0.0"))];

        let tx = Transaction::from_packages(present, result, vec![]);

        assert_eq!(tx.new_installs().count(), 0);
        assert_eq!(tx.updates().count(), 1);
        assert_eq!(tx.removals().count(), 0);
    }

    #[test]
    fn from_packages_is_a_no_op_when_nothing_changed() {
        let present = vec![Arc::new(Package::new("vendor/a", "1.0.0"))];
        let result = vec![Arc::new(Package::new("vendor/a", "1.0.0"))];

        let tx = Transaction::from_packages(present, result, vec![]);

        assert!(tx.is_empty());
    }

    #[test]
    fn from_packages_detects_a_changed_dist_reference_on_a_pinned_version() {
        let mut old = Package::new("vendor/a", "dev-main");
        old.dist = Some(Dist::new("zip", "https://example.test/a.zip").with_reference("aaa"));
        let mut new = Package::new("vendor/a", "dev-main");
        new.dist = Some(Dist::new("zip", "https://example.test/a.zip").with_reference("bbb"));

        let tx = Transaction::from_packages(vec![Arc::new(old)], vec![Arc::new(new)], vec![]);

        assert_eq!(tx.updates().count(), 1, "same version, but the dist commit moved");
    }

    #[test]
    fn from_packages_detects_a_changed_source_reference() {
        let mut old = Package::new("vendor/a", "dev-main");
        old.source = Some(Source::git("https://example.test/a.git", "aaa"));
        let mut new = Package::new("vendor/a", "dev-main");
        new.source = Some(Source::git("https://example.test/a.git", "bbb"));

        let tx = Transaction::from_packages(vec![Arc::new(old)], vec![Arc::new(new)], vec![]);

        assert_eq!(tx.updates().count(), 1);
    }

    #[test]
    fn from_packages_uninstalls_a_package_missing_from_the_result() {
        let present = vec![Arc::new(Package::new("vendor/a", "1.0.0"))];

        let tx = Transaction::from_packages(present, vec![], vec![]);

        assert_eq!(tx.removals().count(), 1);
    }

    #[test]
    fn from_packages_marks_resolved_aliases_installed() {
        let alias = Arc::new(AliasPackage::new(
            Arc::new(Package::new("vendor/a", "dev-main")),
            "1.0.0.0".to_string(),
            "1.0.0".to_string(),
        ));

        let tx = Transaction::from_packages(vec![], vec![], vec![alias]);

        assert_eq!(tx.alias_installs().count(), 1);
        assert_eq!(tx.summary().alias_installs, 1);
    }
}
