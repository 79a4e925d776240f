use super::decisions::Decisions;
use super::pool::{PackageId, Pool};
use super::policy::Policy;
use super::problem::{Problem, ProblemSet};
use super::request::Request;
use super::rule::Literal;
use super::rule_generator::RuleGenerator;
use super::rule_set::RuleSet;
use super::watch_graph::{PropagateResult, WatchGraph};

/// The id set the solver settled on: everything decided installed.
#[derive(Debug, Clone, Default)]
pub struct SolverResult {
    pub installed: Vec<PackageId>,
}

/// CDCL search over the rules generated from a `Pool` + `Request`.
///
/// Single-threaded, synchronous, deterministic: literal order is fixed at
/// generation time and the policy never depends on wall-clock or iteration
/// count, so two solves of the same inputs produce the same result.
pub struct Solver<'a> {
    pool: &'a Pool,
    policy: &'a Policy,
}

/// Hard ceiling on propagate+branch iterations, to turn a solver bug into a
/// clean error instead of a hang.
const MAX_ITERATIONS: usize = 200_000;

impl<'a> Solver<'a> {
    pub fn new(pool: &'a Pool, policy: &'a Policy) -> Self {
        Self { pool, policy }
    }

    pub fn solve(&self, request: &Request) -> Result<SolverResult, ProblemSet> {
        let rules = RuleGenerator::new(self.pool).generate(request);
        let mut watch_graph = WatchGraph::from_rules(&rules);
        let mut decisions = Decisions::new();

        // Phase 2: assertions. Any literal whose opposite is already decided at
        // level 0 is an immediate contradiction.
        for rule in rules.assertions() {
            let lit = rule.literals()[0];
            if decisions.conflicting(lit) {
                let mut problems = ProblemSet::new();
                let mut problem = Problem::new("");
                problem.add_rule_with_pool(rule, self.pool);
                problems.add(problem);
                return Err(problems);
            }
            if decisions.undecided(lit) {
                decisions.decide(lit, 0, Some(rule.id()));
            }
        }

        match self.run_sat(&rules, &mut watch_graph, &mut decisions) {
            Ok(()) => Ok(self.build_result(&decisions)),
            Err(problems) => Err(problems),
        }
    }

    fn run_sat(
        &self,
        rules: &RuleSet,
        watch_graph: &mut WatchGraph,
        decisions: &mut Decisions,
    ) -> Result<(), ProblemSet> {
        let mut learned = RuleSetBuilder::new(rules);
        let mut iterations = 0usize;

        loop {
            iterations += 1;
            if iterations > MAX_ITERATIONS {
                let mut problems = ProblemSet::new();
                problems.add(Problem::new("Solver exceeded the iteration budget without converging."));
                return Err(problems);
            }

            match self.propagate(&learned, watch_graph, decisions) {
                PropagateOutcome::Ok => {}
                PropagateOutcome::Conflict(rule_id) => {
                    if decisions.level() == 0 {
                        let mut problems = ProblemSet::new();
                        let mut problem = Problem::new("");
                        problem.add_rule_with_pool(learned.get(rule_id), self.pool);
                        problems.add(problem);
                        return Err(problems);
                    }

                    let (learned_literals, backtrack_level, trail) =
                        self.analyze_conflict(&learned, decisions, rule_id);

                    if learned_literals.is_empty() {
                        let mut problems = ProblemSet::new();
                        let mut problem = Problem::new("No combination of installed packages satisfies every requirement.");
                        for rid in trail {
                            problem.add_rule_with_pool(learned.get(rid), self.pool);
                        }
                        problems.add(problem);
                        return Err(problems);
                    }

                    decisions.revert_to_level(backtrack_level);
                    let uip = *learned_literals
                        .iter()
                        .find(|&&l| decisions.undecided(l.abs()) || !decisions.conflicting(l))
                        .unwrap_or(&learned_literals[0]);
                    let rule_id = learned.add_learned(learned_literals);
                    watch_graph.add_rule(rule_id, learned.get(rule_id).literals());
                    decisions.decide(uip, backtrack_level, Some(rule_id));
                }
            }

            if let Some(literal) = self.select_next(&learned, decisions) {
                let level = decisions.increment_level();
                decisions.decide(literal, level, None);
            } else {
                return Ok(());
            }
        }
    }

    fn propagate(
        &self,
        rules: &RuleSetBuilder,
        watch_graph: &mut WatchGraph,
        decisions: &mut Decisions,
    ) -> PropagateOutcome {
        let mut queue_index = 0;
        loop {
            let queue = decisions.queue();
            if queue_index >= queue.len() {
                return PropagateOutcome::Ok;
            }
            let literal = queue[queue_index];
            queue_index += 1;
            let falsified = -literal;

            let is_false = |l: Literal| decisions.conflicting(l) || decisions.satisfied(-l);
            let is_true = |l: Literal| decisions.satisfied(l);

            let results = watch_graph.propagate_false(falsified, rules.as_ruleset(), is_false, is_true);
            for result in results {
                match result {
                    PropagateResult::Unit(lit, rule_id) => {
                        if decisions.undecided(lit.abs()) {
                            decisions.decide(lit, decisions.level(), Some(rule_id));
                        } else if decisions.conflicting(lit) {
                            return PropagateOutcome::Conflict(rule_id);
                        }
                    }
                    PropagateResult::Conflict(rule_id) => {
                        return PropagateOutcome::Conflict(rule_id);
                    }
                }
            }
        }
    }

    /// Returns the learned clause literals, the backtrack level, and the rule
    /// ids touched along the way (kept for UNSAT diagnostics when the clause
    /// collapses to empty).
    fn analyze_conflict(
        &self,
        rules: &RuleSetBuilder,
        decisions: &Decisions,
        conflict_rule: u32,
    ) -> (Vec<Literal>, u32, Vec<u32>) {
        let mut clause: Vec<Literal> = rules.get(conflict_rule).literals().to_vec();
        let mut touched = vec![conflict_rule];
        let current_level = decisions.level();
        let trail = decisions.queue().to_vec();

        loop {
            let at_current_level: Vec<Literal> = clause
                .iter()
                .copied()
                .filter(|&l| decisions.decision_level(l.abs()) == Some(current_level))
                .collect();

            if at_current_level.len() <= 1 {
                break;
            }

            let pivot_var = trail
                .iter()
                .rev()
                .map(|l| l.abs())
                .find(|&v| at_current_level.iter().any(|l| l.abs() == v));

            let Some(var) = pivot_var else { break };
            let Some(cause) = decisions.decision_rule(var) else { break };

            touched.push(cause);
            let antecedent = rules.get(cause).literals();
            clause = resolve(&clause, antecedent, var);
        }

        let mut levels: Vec<u32> = clause
            .iter()
            .filter_map(|&l| decisions.decision_level(l.abs()))
            .collect();
        levels.sort_unstable();
        levels.dedup();
        let backtrack_level = if levels.len() >= 2 { levels[levels.len() - 2] } else { 0 };

        (clause, backtrack_level, touched)
    }

    /// Picks the next undecided literal to branch on, from the first
    /// not-yet-satisfied multi-literal rule, preferring job rules, then
    /// ranking candidates through the policy.
    fn select_next(&self, rules: &RuleSetBuilder, decisions: &Decisions) -> Option<Literal> {
        let mut best: Option<&super::rule::Rule> = None;
        for rule in rules.as_ruleset().iter() {
            if rule.is_disabled() || rule.is_assertion() {
                continue;
            }
            if rule.literals().iter().any(|&l| decisions.satisfied(l)) {
                continue;
            }
            if !rule.literals().iter().any(|&l| decisions.undecided(l.abs())) {
                continue;
            }
            match best {
                None => best = Some(rule),
                Some(b) if rule.reason().priority() < b.reason().priority() => best = Some(rule),
                _ => {}
            }
        }

        let rule = best?;
        let candidates: Vec<PackageId> = rule
            .literals()
            .iter()
            .copied()
            .filter(|&l| l > 0 && decisions.undecided(l))
            .collect();

        if candidates.is_empty() {
            // every positive option already excluded; fall back to any undecided literal
            return rule.literals().iter().copied().find(|&l| decisions.undecided(l.abs()));
        }

        self.policy.select_preferred(self.pool, &candidates).into_iter().next()
    }

    fn build_result(&self, decisions: &Decisions) -> SolverResult {
        let mut installed = decisions.installed_packages();
        installed.sort_unstable();
        SolverResult { installed }
    }
}

enum PropagateOutcome {
    Ok,
    Conflict(u32),
}

fn resolve(clause: &[Literal], antecedent: &[Literal], var: i32) -> Vec<Literal> {
    let mut result: Vec<Literal> = clause.iter().copied().filter(|&l| l.abs() != var).collect();
    for &l in antecedent {
        if l.abs() != var && !result.contains(&l) {
            result.push(l);
        }
    }
    result.sort_unstable();
    result.dedup();
    result
}

/// Wraps the generated `RuleSet` so learned clauses can be appended during
/// search without needing `&mut RuleSet` threaded through every call site.
struct RuleSetBuilder {
    rules: RuleSet,
}

impl RuleSetBuilder {
    fn new(generated: &RuleSet) -> Self {
        let mut rules = RuleSet::new();
        for rule in generated.iter() {
            rules.add(rule.clone());
        }
        Self { rules }
    }

    fn get(&self, id: u32) -> &super::rule::Rule {
        self.rules.get(id)
    }

    fn add_learned(&mut self, literals: Vec<Literal>) -> u32 {
        self.rules.add(super::rule::Rule::learned(literals))
    }

    fn as_ruleset(&self) -> &RuleSet {
        &self.rules
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::package::Package;

    #[test]
    fn trivial_install_pulls_in_dependency() {
        let mut pool = Pool::new();
        let mut a = Package::new("vendor/a", "1.0.0.0");
        a.require.insert("vendor/b".to_string(), "^1.0".to_string());
        let a_id = pool.add_package_from_repo(a, 0);
        let b_id = pool.add_package_from_repo(Package::new("vendor/b", "1.0.0.0"), 0);

        let mut request = Request::new();
        request.require("vendor/a", "^1.0");

        let policy = Policy::new();
        let solver = Solver::new(&pool, &policy);
        let result = solver.solve(&request).expect("solvable");

        assert!(result.installed.contains(&a_id));
        assert!(result.installed.contains(&b_id));
    }

    #[test]
    fn conflicting_version_requirements_are_unsatisfiable() {
        let mut pool = Pool::new();
        let mut a = Package::new("vendor/a", "1.0.0.0");
        a.require.insert("vendor/c".to_string(), "^1.0".to_string());
        let mut b = Package::new("vendor/b", "1.0.0.0");
        b.require.insert("vendor/c".to_string(), "^2.0".to_string());
        pool.add_package_from_repo(a, 0);
        pool.add_package_from_repo(b, 0);
        pool.add_package_from_repo(Package::new("vendor/c", "1.0.0.0"), 0);
        pool.add_package_from_repo(Package::new("vendor/c", "2.0.0.0"), 0);

        let mut request = Request::new();
        request.require("vendor/a", "^1.0");
        request.require("vendor/b", "^1.0");

        let policy = Policy::new();
        let solver = Solver::new(&pool, &policy);
        assert!(solver.solve(&request).is_err());
    }

    #[test]
    fn provide_satisfies_requirement() {
        let mut pool = Pool::new();
        let mut x = Package::new("vendor/x", "1.0.0.0");
        x.require.insert("vendor/y".to_string(), "^1.0".to_string());
        let x_id = pool.add_package_from_repo(x, 0);
        let mut z = Package::new("vendor/z", "1.0.0.0");
        z.provide.insert("vendor/y".to_string(), "1.0.0".to_string());
        let z_id = pool.add_package_from_repo(z, 0);

        let mut request = Request::new();
        request.require("vendor/x", "^1.0");

        let policy = Policy::new();
        let solver = Solver::new(&pool, &policy);
        let result = solver.solve(&request).expect("solvable");

        assert!(result.installed.contains(&x_id));
        assert!(result.installed.contains(&z_id));
    }

    #[test]
    fn no_spurious_operations_when_nothing_requested() {
        let pool = Pool::new();
        let request = Request::new();
        let policy = Policy::new();
        let solver = Solver::new(&pool, &policy);
        let result = solver.solve(&request).expect("solvable");
        assert!(result.installed.is_empty());
    }
}
