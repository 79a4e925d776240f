use serde::{Deserialize, Serialize};

/// What relationship a `Link` expresses between its source and target package.
///
/// The rule generator turns every `Require`/`Conflict`/`Provide`/`Replace`
/// entry on a candidate package into exactly one of these before it ever
/// becomes a `Rule`; `DevRequire` links only enter the pool when the request
/// was built `with_dev(true)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkType {
    #[serde(rename = "requires")]
    Require,
    #[serde(rename = "devRequires")]
    DevRequire,
    #[serde(rename = "provides")]
    Provide,
    #[serde(rename = "conflicts")]
    Conflict,
    #[serde(rename = "replaces")]
    Replace,
}

/// A directed edge from one package name to another, carrying the version
/// constraint that must hold for the edge to be satisfied.
///
/// `alias.rs` mints one of these per require/require-dev/conflict/provide/
/// replace entry on the package an `AliasPackage` wraps, and `rule_generator.rs`
/// mints one per dependency a candidate's `Package::require` names; both feed
/// straight into rule generation, and `Problem` rendering reads `source`/
/// `target`/`pretty_constraint()` back out when explaining why a rule fired.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub source: String,
    pub target: String,
    pub constraint: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pretty_constraint: Option<String>,
    #[serde(rename = "type")]
    pub link_type: LinkType,
}

impl Link {
    pub fn new(source: impl Into<String>, target: impl Into<String>, constraint: impl Into<String>, link_type: LinkType) -> Self {
        let source = source.into().to_lowercase();
        let target = target.into().to_lowercase();
        let constraint = constraint.into();
        Self { source, target, pretty_constraint: Some(constraint.clone()), constraint, link_type }
    }

    /// The constraint string `Problem` should show the user, which is always
    /// just `constraint` today - the field exists separately so a future
    /// alias or branch link can substitute something more readable without
    /// disturbing what the solver actually evaluates.
    pub fn pretty_constraint(&self) -> &str {
        self.pretty_constraint.as_deref().unwrap_or(&self.constraint)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_lowercases_both_package_names() {
        let link = Link::new("My/Package", "Vendor/Library", "^1.0", LinkType::Require);
        assert_eq!(link.source, "my/package");
        assert_eq!(link.target, "vendor/library");
    }

    #[test]
    fn pretty_constraint_falls_back_to_constraint() {
        let link = Link::new("a/b", "c/d", ">=2.0,<3.0", LinkType::Conflict);
        assert_eq!(link.pretty_constraint(), ">=2.0,<3.0");
    }

    #[test]
    fn conflict_link_round_trips_its_type_through_json() {
        let conflict = Link::new("a/b", "c/d", "*", LinkType::Conflict);
        let json = serde_json::to_string(&conflict).unwrap();
        assert!(json.contains("\"conflicts\""));
        let parsed: Link = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, conflict);
    }

    #[test]
    fn provide_link_serializes_with_its_own_type_tag() {
        let provide = Link::new("a/b", "c/d", "*", LinkType::Provide);
        assert!(serde_json::to_string(&provide).unwrap().contains("\"provides\""));
    }
}
