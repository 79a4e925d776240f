use std::collections::HashSet;

use crate::package::{Link, LinkType};

use super::pool::{Pool, PackageId};
use super::request::{JobKind, Request};
use super::rule::Rule;
use super::rule_set::RuleSet;

/// Builds the full `RuleSet` for a pool + request, per the rule-generation
/// procedure: requires, conflicts, same-name exclusion, obsoletes, aliases,
/// then the request's own install/remove/update jobs.
pub struct RuleGenerator<'a> {
    pool: &'a Pool,
}

impl<'a> RuleGenerator<'a> {
    pub fn new(pool: &'a Pool) -> Self {
        Self { pool }
    }

    pub fn generate(&self, request: &Request) -> RuleSet {
        let mut rules = RuleSet::new();
        let reachable = self.reachable_ids(request);

        for &id in &reachable {
            self.generate_requires(id, &mut rules);
            self.generate_conflicts(id, &mut rules);
            self.generate_obsoletes(id, &mut rules);
        }

        self.generate_same_name(&reachable, &mut rules);
        self.generate_aliases(&reachable, &mut rules);
        self.generate_job_rules(request, &mut rules);

        rules
    }

    /// The set of package ids that participate in the generated rule set:
    /// everything reachable by name from an install/update job, transitively
    /// through requires, plus every alias of a reachable id.
    fn reachable_ids(&self, request: &Request) -> Vec<PackageId> {
        let mut seen: HashSet<PackageId> = HashSet::new();
        let mut frontier: Vec<PackageId> = Vec::new();

        for (name, constraint) in request.all_requires() {
            for id in self.pool.what_provides(name, Some(constraint)) {
                if seen.insert(id) {
                    frontier.push(id);
                }
            }
        }
        for job in &request.jobs {
            if let JobKind::Update { name } | JobKind::Remove { name } = &job.kind {
                for id in self.pool.what_provides(name, None) {
                    if seen.insert(id) {
                        frontier.push(id);
                    }
                }
            }
        }
        for package in request.fixed_packages.iter().chain(request.locked_packages.iter()) {
            for id in self.pool.what_provides(package.name(), None) {
                if seen.insert(id) {
                    frontier.push(id);
                }
            }
        }

        while let Some(id) = frontier.pop() {
            for (name, constraint) in self.pool.require(id) {
                for target in self.pool.what_provides(&name, Some(&constraint)) {
                    if seen.insert(target) {
                        frontier.push(target);
                    }
                }
            }
            for alias_id in self.pool.get_aliases(id) {
                if seen.insert(*alias_id) {
                    frontier.push(*alias_id);
                }
            }
        }

        let mut ids: Vec<PackageId> = seen.into_iter().collect();
        ids.sort_unstable();
        ids
    }

    fn generate_requires(&self, id: PackageId, rules: &mut RuleSet) {
        for (name, constraint) in self.pool.require(id) {
            let targets = self.pool.what_provides(&name, Some(&constraint));
            let link = Link::new(self.pool.name(id), &name, &constraint, LinkType::Require);
            let rule = Rule::requires(id, targets).with_link(link);
            rules.add(rule);
        }
    }

    fn generate_conflicts(&self, id: PackageId, rules: &mut RuleSet) {
        for (name, constraint) in self.pool.conflict(id) {
            for other in self.pool.what_provides(&name, Some(&constraint)) {
                if other == id {
                    continue;
                }
                rules.add(Rule::conflict(vec![id, other]));
            }
        }
    }

    fn generate_obsoletes(&self, id: PackageId, rules: &mut RuleSet) {
        for (name, _constraint) in self.pool.replace(id) {
            for other in self.pool.ids_for_name(&name) {
                let other = *other;
                if other == id {
                    continue;
                }
                rules.add(Rule::obsoletes(vec![id, other]).with_obsoleted_by(id));
            }
        }
    }

    /// At most one package with a given effective name may be installed.
    fn generate_same_name(&self, reachable: &[PackageId], rules: &mut RuleSet) {
        let mut by_name: std::collections::HashMap<&str, Vec<PackageId>> = std::collections::HashMap::new();
        for &id in reachable {
            by_name.entry(self.pool.name(id)).or_default().push(id);
        }
        for ids in by_name.values() {
            if ids.len() < 2 {
                continue;
            }
            for i in 0..ids.len() {
                for j in (i + 1)..ids.len() {
                    rules.add(Rule::same_name(vec![ids[i], ids[j]]));
                }
            }
        }
    }

    fn generate_aliases(&self, reachable: &[PackageId], rules: &mut RuleSet) {
        for &id in reachable {
            if self.pool.is_alias(id) {
                if let Some(target) = self.pool.alias_target(id) {
                    rules.add(Rule::alias(id, target));
                    rules.add(Rule::alias(target, id));
                }
            }
        }
    }

    fn generate_job_rules(&self, request: &Request, rules: &mut RuleSet) {
        for job in &request.jobs {
            if job.dev && !request.install_dev {
                continue;
            }
            match &job.kind {
                JobKind::Install { name, constraint } => {
                    let targets = self.pool.what_provides(name, Some(constraint));
                    rules.add(Rule::job_install(targets));
                }
                JobKind::Remove { name } => {
                    for id in self.pool.what_provides(name, None) {
                        rules.add(Rule::job_remove(id));
                    }
                }
                JobKind::Update { name } => {
                    if let Some(installed) = request.get_fixed(name).or_else(|| request.get_locked(name)) {
                        let old_ids = self.pool.what_provides(installed.name(), None);
                        let candidates = self.pool.what_provides(name, None);
                        for old in old_ids {
                            rules.add(Rule::allow_update(old, candidates.clone()));
                        }
                    }
                }
                JobKind::UpdateAll => {
                    for package in &request.locked_packages {
                        let old_ids = self.pool.what_provides(package.name(), None);
                        let candidates = self.pool.what_provides(package.name(), None);
                        for old in old_ids {
                            rules.add(Rule::allow_update(old, candidates.clone()));
                        }
                    }
                }
            }
        }
    }
}
