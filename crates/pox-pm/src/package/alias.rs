use super::{Link, LinkType, Package, Stability};
use indexmap::IndexMap;
use std::collections::HashMap;
use std::sync::Arc;

/// A package that presents a different version than its underlying package.
///
/// The rule generator emits a pair of implication rules binding an alias to
/// its target (`(-a v c)` and `(-c v a)`), so the solver always installs both
/// or neither. Two sources feed aliases: branch aliases declared via
/// `extra.branch-alias`, and inline `"dev-main as 1.0.0"` constraints in a
/// requirement string.
#[derive(Debug, Clone)]
pub struct AliasPackage {
    alias_of: Arc<Package>,
    version: String,
    pretty_version: String,
    stability: Stability,
    is_dev: bool,
    /// Set once the rule generator attributes the `"as"` clause that created
    /// this alias to the root package rather than a dependency.
    is_root_package_alias: bool,
    has_self_version_requires: bool,
    require: IndexMap<String, String>,
    require_dev: IndexMap<String, String>,
    conflict: IndexMap<String, String>,
    provide: IndexMap<String, String>,
    replace: IndexMap<String, String>,
}

impl AliasPackage {
    /// Wraps `alias_of` so it also resolves under `version`, with every
    /// `self.version` dependency it carries rewritten to pin that version
    /// rather than the branch being aliased.
    pub fn new(alias_of: Arc<Package>, version: String, pretty_version: String) -> Self {
        let stability = Stability::from_version(&version);
        let is_dev = stability == Stability::Dev;

        let mut alias = Self {
            alias_of: alias_of.clone(),
            version: version.clone(),
            pretty_version: pretty_version.clone(),
            stability,
            is_dev,
            is_root_package_alias: false,
            has_self_version_requires: false,
            require: IndexMap::new(),
            require_dev: IndexMap::new(),
            conflict: IndexMap::new(),
            provide: IndexMap::new(),
            replace: IndexMap::new(),
        };

        alias.transform_dependencies(&alias_of, &version);
        alias
    }

    /// Rewrites every `self.version` dependency constraint on the underlying
    /// package to pin this alias's own version instead.
    fn transform_dependencies(&mut self, alias_of: &Package, version: &str) {
        self.require = Self::replace_self_version_deps(&alias_of.require, version, &mut self.has_self_version_requires);

        let mut dev_has_self_version = false;
        self.require_dev = Self::replace_self_version_deps(&alias_of.require_dev, version, &mut dev_has_self_version);
        self.has_self_version_requires |= dev_has_self_version;

        self.conflict = Self::replace_self_version_deps(&alias_of.conflict, version, &mut false);
        self.provide = Self::replace_self_version_deps(&alias_of.provide, version, &mut false);
        self.replace = Self::replace_self_version_deps(&alias_of.replace, version, &mut false);
    }

    /// Rewrites every `self.version` constraint in `deps` to pin the alias's
    /// own version instead of the branch it aliases. Non-`self.version`
    /// entries pass through unchanged.
    fn replace_self_version_deps(
        deps: &IndexMap<String, String>,
        version: &str,
        has_self_version: &mut bool,
    ) -> IndexMap<String, String> {
        deps.iter()
            .map(|(target, constraint)| {
                if constraint == "self.version" {
                    *has_self_version = true;
                    (target.clone(), format!("={version}"))
                } else {
                    (target.clone(), constraint.clone())
                }
            })
            .collect()
    }

    pub fn alias_of(&self) -> &Package {
        &self.alias_of
    }

    pub fn alias_of_arc(&self) -> Arc<Package> {
        Arc::clone(&self.alias_of)
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn pretty_version(&self) -> &str {
        &self.pretty_version
    }

    pub fn stability(&self) -> Stability {
        self.stability
    }

    pub fn is_dev(&self) -> bool {
        self.is_dev
    }

    /// The rule generator calls this once it decides a requirement's `"as"`
    /// clause applies to the root package rather than a dependency, which
    /// changes how `Problem` renders a conflict involving this alias.
    pub fn set_root_package_alias(&mut self, value: bool) {
        self.is_root_package_alias = value;
    }

    pub fn is_root_package_alias(&self) -> bool {
        self.is_root_package_alias
    }

    pub fn has_self_version_requires(&self) -> bool {
        self.has_self_version_requires
    }

    // Everything below delegates to the aliased package; only the version differs.

    pub fn name(&self) -> &str {
        self.alias_of.name()
    }

    pub fn pretty_name(&self) -> &str {
        self.alias_of.pretty_name()
    }

    pub fn package_type(&self) -> &str {
        self.alias_of.package_type()
    }

    pub fn unique_name(&self) -> String {
        format!("{}-{}", self.name(), self.version)
    }

    pub fn pretty_string(&self) -> String {
        format!("{} {}", self.pretty_name(), self.pretty_version())
    }

    pub fn require(&self) -> &IndexMap<String, String> {
        &self.require
    }

    pub fn require_dev(&self) -> &IndexMap<String, String> {
        &self.require_dev
    }

    pub fn conflict(&self) -> &IndexMap<String, String> {
        &self.conflict
    }

    pub fn provide(&self) -> &IndexMap<String, String> {
        &self.provide
    }

    pub fn replace(&self) -> &IndexMap<String, String> {
        &self.replace
    }

    /// Flattens every transformed dependency map into `Link`s the rule
    /// generator can treat the same as a concrete package's own links.
    pub fn get_links(&self) -> Vec<Link> {
        let as_links = |deps: &IndexMap<String, String>, link_type: LinkType| {
            deps.iter().map(move |(target, constraint)| Link::new(self.name(), target, constraint, link_type))
        };

        as_links(&self.require, LinkType::Require)
            .chain(as_links(&self.require_dev, LinkType::DevRequire))
            .chain(as_links(&self.conflict, LinkType::Conflict))
            .chain(as_links(&self.provide, LinkType::Provide))
            .chain(as_links(&self.replace, LinkType::Replace))
            .collect()
    }
}

impl std::fmt::Display for AliasPackage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} ({}alias of {})",
            self.unique_name(),
            if self.is_root_package_alias { "root " } else { "" },
            self.alias_of.version()
        )
    }
}

/// Default branch alias constant (used for dev-master/dev-main)
pub const DEFAULT_BRANCH_ALIAS: &str = "9999999-dev";

/// Reads a package's `extra.branch-alias` map, keyed by the normalized
/// source branch and valued `(alias_normalized, alias_pretty)`. A
/// `"dev-main": "1.0.x-dev"` entry means the `dev-main` branch should also
/// satisfy requirements written against `1.0.x-dev`.
pub fn parse_branch_aliases(extra: Option<&serde_json::Value>) -> HashMap<String, (String, String)> {
    let mut aliases = HashMap::new();

    let Some(extra) = extra else {
        return aliases;
    };

    let Some(branch_alias) = extra.get("branch-alias") else {
        return aliases;
    };

    let Some(branch_alias) = branch_alias.as_object() else {
        return aliases;
    };

    for (source_branch, target_branch) in branch_alias {
        let Some(target_branch) = target_branch.as_str() else {
            continue;
        };

        // Ensure it's an alias to a -dev package
        if !target_branch.ends_with("-dev") {
            continue;
        }

        // Normalize the source branch
        let source_normalized = normalize_branch(source_branch);

        // Handle the target branch
        let (alias_normalized, alias_pretty) = if target_branch == DEFAULT_BRANCH_ALIAS {
            (DEFAULT_BRANCH_ALIAS.to_string(), target_branch.to_string())
        } else {
            // Normalize without -dev suffix
            let without_dev = &target_branch[..target_branch.len() - 4];
            let normalized = normalize_branch(without_dev);

            // Ensure normalized version ends with -dev
            if !normalized.ends_with("-dev") {
                continue;
            }

            (normalized, target_branch.to_string())
        };

        aliases.insert(source_normalized, (alias_normalized, alias_pretty));
    }

    aliases
}

/// Maps a branch name to the dev-version form the pool indexes packages
/// under: `main`/`master`/`trunk`/`default` become `dev-<name>`, a branch
/// that looks numeric (`1.0`) becomes `1.x-dev`, anything else gets a
/// `dev-` prefix.
fn normalize_branch(branch: &str) -> String {
    let branch = branch.trim();

    // Remove "dev-" prefix if present
    let branch = branch.strip_prefix("dev-").unwrap_or(branch);

    // Common branch name mappings
    match branch.to_lowercase().as_str() {
        "master" | "main" | "trunk" | "default" => format!("dev-{}", branch),
        _ => {
            // Check if it looks like a version
            if branch.chars().next().map(|c| c.is_ascii_digit()).unwrap_or(false) {
                // Numeric branch like "1.0" -> "1.0.x-dev"
                format!("{}.x-dev", branch.trim_end_matches(".x").trim_end_matches(".0"))
            } else {
                format!("dev-{}", branch)
            }
        }
    }
}

/// Splits a `"dev-main as 1.0.0"`-style requirement constraint into the
/// constraint to actually resolve (`dev-main`) and the version it should be
/// presented as (`1.0.0`). Returns `None` for a plain constraint.
pub fn parse_inline_alias(constraint: &str) -> Option<(String, String)> {
    let parts: Vec<&str> = constraint.split(" as ").collect();
    if parts.len() == 2 {
        let actual = parts[0].trim().to_string();
        let alias = parts[1].trim().to_string();
        Some((actual, alias))
    } else {
        None
    }
}
