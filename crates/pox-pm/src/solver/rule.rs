use std::fmt;
use std::hash::{Hash, Hasher};

use super::pool::PackageId;
use crate::package::Link;

/// A literal in SAT terms - positive means "install", negative means "don't install".
pub type Literal = i32;

/// Why a rule exists. Drives both solver priority and Problems rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuleReason {
    /// An update job allowed an installed package to move to a replacement.
    InternalAllowUpdate,
    /// A request `install` job.
    JobInstall,
    /// A request `remove` job.
    JobRemove,
    /// Two packages declare an explicit conflict.
    PackageConflict,
    /// A package's `require` entry.
    PackageRequires,
    /// A package's `replace` entry.
    PackageObsoletes,
    /// An installed package obsoleted by a `replace` entry of a candidate.
    InstalledPackageObsoletes,
    /// Two packages share the same effective name (at most one installed).
    PackageSameName,
    /// Same-name exclusion implied by differing versions of one package, not an explicit replace.
    PackageImplicitObsoletes,
    /// Clause derived during conflict analysis.
    Learned,
    /// Binds an alias package to its target (both install together).
    PackageAlias,
}

impl RuleReason {
    /// Lower sorts first; used to order rule generation and to bucket RuleSet iteration.
    pub fn priority(&self) -> u8 {
        match self {
            RuleReason::JobInstall | RuleReason::JobRemove => 0,
            RuleReason::PackageRequires
            | RuleReason::PackageConflict
            | RuleReason::PackageSameName
            | RuleReason::PackageObsoletes
            | RuleReason::InstalledPackageObsoletes
            | RuleReason::PackageImplicitObsoletes
            | RuleReason::PackageAlias => 1,
            RuleReason::InternalAllowUpdate => 2,
            RuleReason::Learned => 4,
        }
    }

    pub fn is_multi_conflict(&self) -> bool {
        matches!(
            self,
            RuleReason::PackageSameName | RuleReason::PackageImplicitObsoletes
        )
    }

    fn as_str(&self) -> &'static str {
        match self {
            RuleReason::InternalAllowUpdate => "allow-update",
            RuleReason::JobInstall => "job-install",
            RuleReason::JobRemove => "job-remove",
            RuleReason::PackageConflict => "conflict",
            RuleReason::PackageRequires => "requires",
            RuleReason::PackageObsoletes => "obsoletes",
            RuleReason::InstalledPackageObsoletes => "installed-obsoletes",
            RuleReason::PackageSameName => "same-name",
            RuleReason::PackageImplicitObsoletes => "implicit-obsoletes",
            RuleReason::Learned => "learned",
            RuleReason::PackageAlias => "alias",
        }
    }
}

/// Extra context attached to a rule, used only for Problems rendering -
/// the solver itself only ever looks at `literals`.
#[derive(Debug, Clone)]
pub enum ReasonData {
    /// The `Link` (source package + target name + constraint) that produced a requires/conflict rule.
    Link(Link),
    /// The package whose presence obsoletes another.
    Package(PackageId),
    /// The literal pair bound by an alias rule.
    Alias(Literal, Literal),
    None,
}

/// A SAT rule (clause): a disjunction of literals, satisfied when at least one is true.
///
/// - `[A]` - A must be installed (assertion)
/// - `[-A]` - A must not be installed
/// - `[-A, B, C]` - if A is installed, B or C must be installed too
/// - `[-A, -B]` - A and B conflict
#[derive(Clone)]
pub struct Rule {
    literals: Vec<Literal>,
    reason: RuleReason,
    reason_data: ReasonDataKind,
    id: u32,
    disabled: bool,
}

/// `ReasonData` isn't `Clone`-cheap-friendly to store inline without boxing;
/// keep the enum but box the heavier `Link` variant.
#[derive(Debug, Clone)]
enum ReasonDataKind {
    Link(Box<Link>),
    Package(PackageId),
    Alias(Literal, Literal),
    None,
}

impl Rule {
    pub fn new(literals: Vec<Literal>, reason: RuleReason) -> Self {
        let mut literals = literals;
        literals.sort_unstable();
        literals.dedup();
        Self {
            literals,
            reason,
            reason_data: ReasonDataKind::None,
            id: 0,
            disabled: false,
        }
    }

    pub fn assertion(literal: Literal, reason: RuleReason) -> Self {
        Self::new(vec![literal], reason)
    }

    /// `-source v target1 v target2 v ...`
    pub fn requires(source: PackageId, targets: Vec<PackageId>) -> Self {
        let mut literals = vec![-source];
        literals.extend(targets);
        Self::new(literals, RuleReason::PackageRequires)
    }

    pub fn conflict(packages: Vec<PackageId>) -> Self {
        let literals: Vec<_> = packages.into_iter().map(|p| -p).collect();
        Self::new(literals, RuleReason::PackageConflict)
    }

    pub fn same_name(packages: Vec<PackageId>) -> Self {
        let literals: Vec<_> = packages.into_iter().map(|p| -p).collect();
        Self::new(literals, RuleReason::PackageSameName)
    }

    pub fn obsoletes(packages: Vec<PackageId>) -> Self {
        let literals: Vec<_> = packages.into_iter().map(|p| -p).collect();
        Self::new(literals, RuleReason::PackageObsoletes)
    }

    pub fn job_install(targets: Vec<PackageId>) -> Self {
        Self::new(targets, RuleReason::JobInstall)
    }

    pub fn job_remove(package: PackageId) -> Self {
        Self::assertion(-package, RuleReason::JobRemove)
    }

    pub fn allow_update(old: PackageId, candidates: Vec<PackageId>) -> Self {
        let mut literals = vec![-old];
        literals.extend(candidates);
        Self::new(literals, RuleReason::InternalAllowUpdate)
    }

    pub fn alias(alias: Literal, target: Literal) -> Self {
        let mut rule = Self::new(vec![-alias, target], RuleReason::PackageAlias);
        rule.reason_data = ReasonDataKind::Alias(alias, target);
        rule
    }

    pub fn learned(literals: Vec<Literal>) -> Self {
        Self::new(literals, RuleReason::Learned)
    }

    pub fn with_link(mut self, link: Link) -> Self {
        self.reason_data = ReasonDataKind::Link(Box::new(link));
        self
    }

    pub fn with_obsoleted_by(mut self, package: PackageId) -> Self {
        self.reason_data = ReasonDataKind::Package(package);
        self
    }

    pub fn reason_data(&self) -> ReasonData {
        match &self.reason_data {
            ReasonDataKind::Link(link) => ReasonData::Link((**link).clone()),
            ReasonDataKind::Package(p) => ReasonData::Package(*p),
            ReasonDataKind::Alias(a, t) => ReasonData::Alias(*a, *t),
            ReasonDataKind::None => ReasonData::None,
        }
    }

    pub fn set_id(&mut self, id: u32) {
        self.id = id;
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn reason(&self) -> RuleReason {
        self.reason
    }

    pub fn literals(&self) -> &[Literal] {
        &self.literals
    }

    pub fn is_assertion(&self) -> bool {
        self.literals.len() == 1
    }

    pub fn is_multi_conflict(&self) -> bool {
        self.reason.is_multi_conflict() && self.literals.len() > 2
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    pub fn disable(&mut self) {
        self.disabled = true;
    }

    pub fn enable(&mut self) {
        self.disabled = false;
    }

    pub fn len(&self) -> usize {
        self.literals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.literals.is_empty()
    }

    /// Fingerprint over the (already sorted, deduplicated) literal sequence.
    pub fn literal_hash(&self) -> u64 {
        use std::collections::hash_map::DefaultHasher;
        let mut hasher = DefaultHasher::new();
        self.literals.hash(&mut hasher);
        hasher.finish()
    }

    pub fn equals_literals(&self, other: &Rule) -> bool {
        self.literals == other.literals
    }
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Rule({:?}, {:?})", self.reason, self.literals)
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let literals: Vec<String> = self
            .literals
            .iter()
            .map(|&l| if l > 0 { format!("+{l}") } else { format!("{l}") })
            .collect();
        write!(f, "({}) [{}]", self.reason.as_str(), literals.join(" | "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assertion_has_one_literal() {
        let rule = Rule::assertion(5, RuleReason::JobInstall);
        assert!(rule.is_assertion());
        assert_eq!(rule.literals(), &[5]);
    }

    #[test]
    fn requires_prefixes_negated_source() {
        let rule = Rule::requires(1, vec![2, 3, 4]);
        assert_eq!(rule.literals(), &[-1, 2, 3, 4]);
        assert_eq!(rule.reason(), RuleReason::PackageRequires);
    }

    #[test]
    fn conflict_negates_all() {
        let rule = Rule::conflict(vec![1, 2]);
        assert_eq!(rule.literals(), &[-2, -1]);
        assert_eq!(rule.reason(), RuleReason::PackageConflict);
    }

    #[test]
    fn literal_hash_ignores_input_order() {
        let rule1 = Rule::new(vec![1, 2, 3], RuleReason::PackageRequires);
        let rule2 = Rule::new(vec![3, 1, 2], RuleReason::PackageRequires);
        let rule3 = Rule::new(vec![1, 2, 4], RuleReason::PackageRequires);

        assert_eq!(rule1.literal_hash(), rule2.literal_hash());
        assert_ne!(rule1.literal_hash(), rule3.literal_hash());
    }

    #[test]
    fn equals_literals_ignores_reason() {
        let rule1 = Rule::new(vec![1, 2, 3], RuleReason::PackageRequires);
        let rule2 = Rule::new(vec![3, 1, 2], RuleReason::PackageConflict);
        let rule3 = Rule::new(vec![1, 2], RuleReason::PackageRequires);

        assert!(rule1.equals_literals(&rule2));
        assert!(!rule1.equals_literals(&rule3));
    }

    #[test]
    fn alias_binds_both_directions() {
        let rule = Rule::alias(5, 6);
        assert_eq!(rule.literals(), &[-5, 6]);
    }
}
