use std::collections::HashMap;

use super::rule::Literal;
use super::rule_set::RuleSet;

/// Each non-unit rule watches two of its literals. The rule is only
/// inspected when one of its watched literals is falsified - this is what
/// keeps unit propagation from re-scanning every rule on every assignment.
pub struct WatchGraph {
    /// literal -> ids of rules currently watching it
    watchers: HashMap<Literal, Vec<u32>>,
    /// rule id -> the two literal positions it watches (index into rule.literals())
    watched: HashMap<u32, [usize; 2]>,
}

pub enum PropagateResult {
    /// The rule became unit; this literal must now be assigned true.
    Unit(Literal, u32),
    /// The rule is now fully falsified.
    Conflict(u32),
}

impl WatchGraph {
    pub fn from_rules(rules: &RuleSet) -> Self {
        let mut graph = Self {
            watchers: HashMap::new(),
            watched: HashMap::new(),
        };
        for rule in rules.iter() {
            if rule.is_assertion() || rule.is_empty() {
                continue;
            }
            graph.add_rule(rule.id(), rule.literals());
        }
        graph
    }

    pub fn add_rule(&mut self, rule_id: u32, literals: &[Literal]) {
        if literals.len() < 2 {
            return;
        }
        self.watched.insert(rule_id, [0, 1]);
        self.watchers.entry(literals[0]).or_default().push(rule_id);
        self.watchers.entry(literals[1]).or_default().push(rule_id);
    }

    /// Called when `literal` has just become false (i.e. `-literal` was decided true).
    /// Walks every rule watching `literal`, tries to move the watch to a
    /// still-unfalsified literal, and reports any rule that became unit or
    /// fully conflicting.
    pub fn propagate_false(
        &mut self,
        literal: Literal,
        rules: &RuleSet,
        is_false: impl Fn(Literal) -> bool,
        is_true: impl Fn(Literal) -> bool,
    ) -> Vec<PropagateResult> {
        let mut results = Vec::new();
        let watchers = self.watchers.remove(&literal).unwrap_or_default();
        let mut still_watching = Vec::new();

        for rule_id in watchers {
            let rule = rules.get(rule_id);
            if rule.is_disabled() {
                continue;
            }
            let lits = rule.literals();
            let positions = *self.watched.get(&rule_id).unwrap_or(&[0, 1]);
            let other_pos = if lits[positions[0]] == literal { positions[1] } else { positions[0] };
            let other_lit = lits[other_pos];

            if is_true(other_lit) {
                // already satisfied through the other watch
                still_watching.push(rule_id);
                continue;
            }

            // try to find a new literal to watch in place of `literal`
            let mut replaced = false;
            for (idx, &lit) in lits.iter().enumerate() {
                if idx == other_pos {
                    continue;
                }
                if lit == literal {
                    continue;
                }
                if !is_false(lit) {
                    self.watched.insert(rule_id, sorted_pair(idx, other_pos));
                    self.watchers.entry(lit).or_default().push(rule_id);
                    replaced = true;
                    break;
                }
            }

            if replaced {
                continue;
            }

            if is_true(other_lit) {
                still_watching.push(rule_id);
            } else if is_false(other_lit) {
                still_watching.push(rule_id);
                results.push(PropagateResult::Conflict(rule_id));
            } else {
                still_watching.push(rule_id);
                results.push(PropagateResult::Unit(other_lit, rule_id));
            }
        }

        if !still_watching.is_empty() {
            self.watchers.entry(literal).or_default().extend(still_watching);
        }

        results
    }
}

fn sorted_pair(a: usize, b: usize) -> [usize; 2] {
    if a < b {
        [a, b]
    } else {
        [b, a]
    }
}
