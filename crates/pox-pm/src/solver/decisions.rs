use std::collections::HashMap;

use super::pool::PackageId;
use super::rule::Literal;

#[derive(Debug, Clone, Copy)]
struct Entry {
    level: u32,
    cause: Option<u32>,
    /// true => literal was decided positive (package installed)
    positive: bool,
}

/// The solver's partial assignment: for every decided package id, whether it
/// is installed or excluded, at which decision level, and which rule (if any)
/// forced the decision. Free decisions (branching) carry `cause = None`.
pub struct Decisions {
    by_id: HashMap<PackageId, Entry>,
    /// decision stack, in the order literals were assigned
    stack: Vec<Literal>,
    level: u32,
}

impl Decisions {
    pub fn new() -> Self {
        Self {
            by_id: HashMap::new(),
            stack: Vec::new(),
            level: 0,
        }
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn increment_level(&mut self) -> u32 {
        self.level += 1;
        self.level
    }

    /// Records `literal` as decided true at `level`, caused by `cause` (None for a free branch).
    pub fn decide(&mut self, literal: Literal, level: u32, cause: Option<u32>) {
        let id = literal.abs();
        self.by_id.insert(
            id,
            Entry {
                level,
                cause,
                positive: literal > 0,
            },
        );
        self.stack.push(literal);
    }

    /// Pops every decision above `target_level` and restores `level` to it.
    pub fn revert_to_level(&mut self, target_level: u32) {
        while let Some(&last) = self.stack.last() {
            let id = last.abs();
            let Some(entry) = self.by_id.get(&id) else {
                self.stack.pop();
                continue;
            };
            if entry.level <= target_level {
                break;
            }
            self.by_id.remove(&id);
            self.stack.pop();
        }
        self.level = target_level;
    }

    pub fn satisfied(&self, literal: Literal) -> bool {
        match self.by_id.get(&literal.abs()) {
            Some(e) => e.positive == (literal > 0),
            None => false,
        }
    }

    pub fn conflicting(&self, literal: Literal) -> bool {
        match self.by_id.get(&literal.abs()) {
            Some(e) => e.positive != (literal > 0),
            None => false,
        }
    }

    pub fn undecided(&self, id: PackageId) -> bool {
        !self.by_id.contains_key(&id.abs())
    }

    pub fn decided(&self, id: PackageId) -> bool {
        self.by_id.contains_key(&id.abs())
    }

    pub fn decided_install(&self, id: PackageId) -> bool {
        matches!(self.by_id.get(&id.abs()), Some(e) if e.positive)
    }

    pub fn decision_level(&self, id: PackageId) -> Option<u32> {
        self.by_id.get(&id.abs()).map(|e| e.level)
    }

    pub fn decision_rule(&self, id: PackageId) -> Option<u32> {
        self.by_id.get(&id.abs()).and_then(|e| e.cause)
    }

    pub fn queue(&self) -> &[Literal] {
        &self.stack
    }

    pub fn len(&self) -> usize {
        self.stack.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    pub fn installed_packages(&self) -> Vec<PackageId> {
        self.by_id
            .iter()
            .filter(|(_, e)| e.positive)
            .map(|(&id, _)| id)
            .collect()
    }

    /// Is `literal` a free (non-implied) decision - i.e. the result of branching?
    pub fn is_decision(&self, literal: Literal) -> bool {
        matches!(self.by_id.get(&literal.abs()), Some(e) if e.cause.is_none())
    }
}

impl Default for Decisions {
    fn default() -> Self {
        Self::new()
    }
}
