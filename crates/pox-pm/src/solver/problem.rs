use super::pool::Pool;
use super::rule::{ReasonData, Rule, RuleReason};

/// A single human-readable explanation line contributing to an unsatisfiable request.
#[derive(Debug, Clone)]
pub struct Problem {
    message: String,
    rule_ids: Vec<u32>,
}

impl Problem {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            rule_ids: Vec::new(),
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Appends the rendering of `rule` (resolved against `pool` for names/versions).
    pub fn add_rule_with_pool(&mut self, rule: &Rule, pool: &Pool) {
        self.rule_ids.push(rule.id());
        let rendered = render_rule(rule, pool);
        if self.message.is_empty() {
            self.message = rendered;
        } else {
            self.message.push('\n');
            self.message.push_str(&rendered);
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn rule_ids(&self) -> &[u32] {
        &self.rule_ids
    }
}

/// The full set of problems blocking a request; rendered together as the
/// `UnsatisfiableRequest` error payload.
#[derive(Debug, Clone, Default)]
pub struct ProblemSet {
    problems: Vec<Problem>,
}

impl ProblemSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, problem: Problem) {
        self.problems.push(problem);
    }

    pub fn is_empty(&self) -> bool {
        self.problems.is_empty()
    }

    pub fn problems(&self) -> &[Problem] {
        &self.problems
    }
}

impl std::fmt::Display for ProblemSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.problems.is_empty() {
            return write!(f, "The request could not be solved for an unknown reason.");
        }
        writeln!(f, "Your requirements could not be resolved to an installable set of packages.")?;
        for (idx, problem) in self.problems.iter().enumerate() {
            writeln!(f, "  Problem {}", idx + 1)?;
            for line in problem.message().lines() {
                writeln!(f, "    - {line}")?;
            }
        }
        Ok(())
    }
}

fn render_rule(rule: &Rule, pool: &Pool) -> String {
    let literals: Vec<String> = rule
        .literals()
        .iter()
        .map(|&l| {
            let name = pool.pretty_string(l.abs());
            if l > 0 {
                name
            } else {
                format!("not {name}")
            }
        })
        .collect();

    match (rule.reason(), rule.reason_data()) {
        (RuleReason::JobInstall, _) => {
            format!("Install command rule ({})", literals.join(" | "))
        }
        (RuleReason::JobRemove, _) => {
            format!("Remove command rule ({})", literals.join(" | "))
        }
        (RuleReason::PackageConflict, _) => {
            if literals.len() == 2 {
                format!("{} conflicts with {}.", literals[0], literals[1])
            } else {
                format!("Conflict rule ({})", literals.join(" | "))
            }
        }
        (RuleReason::PackageRequires, ReasonData::Link(link)) => {
            let target = &link.target;
            let constraint = link.pretty_constraint();
            if target.starts_with("ext-") {
                format!(
                    "{} requires PHP extension {target} {constraint} -> the requested extension is missing or has the wrong version.",
                    link.source
                )
            } else if target.starts_with("lib-") {
                format!(
                    "{} requires library {target} {constraint} -> the requested linked library is missing or has the wrong version.",
                    link.source
                )
            } else if rule.literals().len() <= 1 {
                format!("{} requires {target} {constraint} -> no matching package found.", link.source)
            } else {
                format!(
                    "{} requires {target} {constraint} -> satisfiable by {}.",
                    link.source,
                    literals[1..].join(", ")
                )
            }
        }
        (RuleReason::PackageRequires, _) => format!("Requires rule ({})", literals.join(" | ")),
        (RuleReason::PackageSameName, _) => {
            format!("Can only install one of: {}.", literals.join(", "))
        }
        (RuleReason::Learned, _) => format!("Conclusion: {}", literals.join(" | ")),
        _ => format!("({})", literals.join(" | ")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::package::Package;

    #[test]
    fn same_name_problem_lists_all_literals() {
        let mut pool = Pool::new();
        let a = pool.add_package_from_repo(Package::new("vendor/lib", "1.0.0.0"), 0);
        let b = pool.add_package_from_repo(Package::new("vendor/lib", "2.0.0.0"), 0);
        let rule = Rule::same_name(vec![a, b]);
        let mut problem = Problem::new("");
        problem.add_rule_with_pool(&rule, &pool);
        assert!(problem.message().contains("Can only install one of"));
    }
}
