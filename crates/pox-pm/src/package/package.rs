use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::{Dist, Source};

/// Stability of a version, in descending order of confidence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stability {
    Stable,
    Rc,
    Beta,
    Alpha,
    Dev,
}

impl Stability {
    /// Infers stability from a normalized version string, the way Composer's
    /// `VersionParser::parseStability` does.
    pub fn from_version(version: &str) -> Self {
        let v = version.to_lowercase();
        if v.ends_with("-dev") || v.starts_with("dev-") {
            return Stability::Dev;
        }
        if let Some(idx) = v.find("-rc") {
            let _ = idx;
            return Stability::Rc;
        }
        if v.contains("-beta") || v.contains("-b") {
            return Stability::Beta;
        }
        if v.contains("-alpha") || v.contains("-a") {
            return Stability::Alpha;
        }
        Stability::Stable
    }

    /// Lower is more stable; mirrors the enum's declaration order.
    pub fn priority(&self) -> u8 {
        *self as u8
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Stability::Stable => "stable",
            Stability::Rc => "RC",
            Stability::Beta => "beta",
            Stability::Alpha => "alpha",
            Stability::Dev => "dev",
        }
    }
}

impl Default for Stability {
    fn default() -> Self {
        Stability::Stable
    }
}

impl std::fmt::Display for Stability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Returns the canonical package type string, defaulting unset types to "library".
pub fn package_type(raw: Option<&str>) -> &str {
    raw.unwrap_or("library")
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub homepage: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Support {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issues: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub docs: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Funding {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub funding_type: Option<String>,
    pub url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Abandoned {
    pub is_abandoned: bool,
    pub replacement: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchiveConfig {
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub exclude: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptHandler;

pub type Scripts = IndexMap<String, Vec<String>>;

/// A single candidate version of a named package, as registered in the Pool.
///
/// This is the unit the solver reasons about: its `require`/`conflict`/`provide`/
/// `replace` maps are what `RuleGenerator` walks to build clauses, and its
/// `name`/`version` identity is what the `Policy` and `Transaction` key on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Package {
    /// Lowercase package name, e.g. "vendor/library".
    pub name: String,
    /// Pretty (original-case) name for display.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pretty_name: Option<String>,
    /// Normalized version, e.g. "1.2.3.0" or "dev-main".
    pub version: String,
    /// Pretty version for display, e.g. "1.2.3" or "dev-main".
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pretty_version: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none", rename = "type")]
    pub package_type: Option<String>,

    #[serde(default)]
    pub require: IndexMap<String, String>,
    #[serde(rename = "require-dev", default)]
    pub require_dev: IndexMap<String, String>,
    #[serde(default)]
    pub conflict: IndexMap<String, String>,
    #[serde(default)]
    pub provide: IndexMap<String, String>,
    #[serde(default)]
    pub replace: IndexMap<String, String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<Source>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dist: Option<Dist>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub authors: Vec<Author>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub support: Option<Support>,
    #[serde(default)]
    pub funding: Vec<Funding>,

    /// The `extra` object from `composer.json`, carried through unparsed
    /// except for `branch-alias`, which `RepositoryManager::build_pool`
    /// reads to register a branch's alias packages in the pool.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extra: Option<serde_json::Value>,

    /// Priority of the repository this package was registered from. Higher wins.
    #[serde(skip)]
    pub repository_priority: i32,
}

impl Package {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        let name = name.into().to_lowercase();
        let version = version.into();
        Self {
            name,
            pretty_name: None,
            version,
            pretty_version: None,
            package_type: None,
            require: IndexMap::new(),
            require_dev: IndexMap::new(),
            conflict: IndexMap::new(),
            provide: IndexMap::new(),
            replace: IndexMap::new(),
            source: None,
            dist: None,
            description: None,
            authors: Vec::new(),
            support: None,
            funding: Vec::new(),
            extra: None,
            repository_priority: 0,
        }
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.repository_priority = priority;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn pretty_name(&self) -> &str {
        self.pretty_name.as_deref().unwrap_or(&self.name)
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn pretty_version(&self) -> &str {
        self.pretty_version.as_deref().unwrap_or(&self.version)
    }

    pub fn package_type(&self) -> &str {
        package_type(self.package_type.as_deref())
    }

    pub fn stability(&self) -> Stability {
        Stability::from_version(&self.version)
    }

    pub fn is_dev(&self) -> bool {
        self.stability() == Stability::Dev
    }

    pub fn unique_name(&self) -> String {
        format!("{}-{}", self.name, self.version)
    }

    pub fn pretty_string(&self) -> String {
        format!("{} {}", self.pretty_name(), self.pretty_version())
    }
}

impl std::fmt::Display for Package {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.pretty_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unique_name_joins_name_and_version() {
        let pkg = Package::new("Vendor/Lib", "1.0.0.0");
        assert_eq!(pkg.name(), "vendor/lib");
        assert_eq!(pkg.unique_name(), "vendor/lib-1.0.0.0");
    }

    #[test]
    fn stability_detects_dev() {
        assert_eq!(Stability::from_version("dev-main"), Stability::Dev);
        assert_eq!(Stability::from_version("1.0.x-dev"), Stability::Dev);
        assert_eq!(Stability::from_version("1.0.0"), Stability::Stable);
        assert_eq!(Stability::from_version("2.0.0-beta1"), Stability::Beta);
        assert_eq!(Stability::from_version("2.0.0-rc1"), Stability::Rc);
    }
}
