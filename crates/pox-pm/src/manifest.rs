//! Parses a Composer-style `composer.json` manifest into a solver `Request`.
//!
//! Unknown top-level keys are preserved opaquely in `extra` rather than
//! interpreted, the way `serde_json`'s `preserve_order` map round-trips a
//! file Composer itself would read without complaint.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ComposerError, Result};
use crate::package::{parse_inline_alias, Package, Stability};
use crate::solver::Request;

/// The root `composer.json` document.
///
/// Only the fields the solver cares about are typed; everything else
/// (`autoload`, `scripts`, `extra`, …) lands in `extra` untouched since
/// generating autoloaders and running scripts are Installer-shell concerns.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Manifest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(rename = "type", default = "default_package_type")]
    pub package_type: String,

    #[serde(default)]
    pub require: IndexMap<String, String>,
    #[serde(rename = "require-dev", default)]
    pub require_dev: IndexMap<String, String>,
    #[serde(default)]
    pub conflict: IndexMap<String, String>,
    #[serde(default)]
    pub replace: IndexMap<String, String>,
    #[serde(default)]
    pub provide: IndexMap<String, String>,

    #[serde(rename = "minimum-stability", skip_serializing_if = "Option::is_none")]
    pub minimum_stability: Option<String>,
    #[serde(rename = "prefer-stable", default)]
    pub prefer_stable: bool,

    /// Everything this struct doesn't name explicitly, preserved verbatim.
    #[serde(flatten)]
    pub extra: IndexMap<String, Value>,
}

fn default_package_type() -> String {
    "library".to_string()
}

impl Manifest {
    pub fn from_str(content: &str) -> Result<Self> {
        serde_json::from_str(content).map_err(|e| ComposerError::ManifestParse(e.to_string()))
    }

    pub fn to_pretty_string(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| ComposerError::ManifestParse(e.to_string()))
    }

    /// Parses `minimum-stability` into the typed enum, defaulting to stable
    /// the way Composer does when the key is absent or unrecognized.
    pub fn minimum_stability(&self) -> Stability {
        match self.minimum_stability.as_deref().map(str::to_lowercase).as_deref() {
            Some("dev") => Stability::Dev,
            Some("alpha") => Stability::Alpha,
            Some("beta") => Stability::Beta,
            Some("rc") => Stability::Rc,
            _ => Stability::Stable,
        }
    }

    /// The root package's own conflict/replace/provide, modeled as a
    /// synthetic `Package` so the rule generator can treat root-level
    /// constraints the same way it treats any other package's.
    pub fn root_package(&self) -> Package {
        let name = self.name.clone().unwrap_or_else(|| "__root__/__root__".to_string());
        let version = self.version.clone().unwrap_or_else(|| "dev-main".to_string());
        let mut pkg = Package::new(name, version);
        pkg.package_type = Some(self.package_type.clone());
        pkg.description = self.description.clone();
        pkg.require = self.require.clone();
        pkg.require_dev = self.require_dev.clone();
        pkg.conflict = self.conflict.clone();
        pkg.replace = self.replace.clone();
        pkg.provide = self.provide.clone();
        pkg
    }

    /// Builds a `Request` from this manifest's `require`/`require-dev`
    /// sections, applying `minimum-stability`/`prefer-stable` to the jobs'
    /// implied policy.
    pub fn to_request(&self) -> Request {
        let mut request = Request::new();
        request.prefer_stable(self.prefer_stable);

        for (name, constraint) in &self.require {
            request.require(name.clone(), resolve_constraint(constraint));
        }
        for (name, constraint) in &self.require_dev {
            request.require_dev(name.clone(), resolve_constraint(constraint));
        }

        request
    }
}

/// Strips a `"dev-main as 1.0.0"`-style inline alias down to the constraint
/// the solver actually needs to satisfy (`"dev-main"`); the declaring side's
/// job is only to pin the branch it wants, not to teach the pool a new
/// version for it. A plain constraint passes through untouched.
fn resolve_constraint(constraint: &str) -> String {
    match parse_inline_alias(constraint) {
        Some((actual, _alias)) => actual,
        None => constraint.to_string(),
    }
}

/// Checks a package name is in the `vendor/package` form Composer requires:
/// lowercase, exactly one `/`, and restricted to `[a-z0-9-_.]` per segment.
pub fn is_valid_package_name(name: &str) -> bool {
    let parts: Vec<&str> = name.split('/').collect();
    if parts.len() != 2 {
        return false;
    }
    let is_valid_part = |s: &str| {
        !s.is_empty()
            && s.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '-' | '_' | '.'))
    };
    is_valid_part(parts[0]) && is_valid_part(parts[1])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_minimal_manifest() {
        let json = r#"{
            "name": "vendor/package",
            "require": { "php": ">=8.0" }
        }"#;
        let manifest = Manifest::from_str(json).unwrap();
        assert_eq!(manifest.name.as_deref(), Some("vendor/package"));
        assert_eq!(manifest.require.get("php"), Some(&">=8.0".to_string()));
    }

    #[test]
    fn preserves_unknown_keys_in_extra() {
        let json = r#"{
            "name": "vendor/package",
            "autoload": { "psr-4": { "Vendor\\Package\\": "src/" } }
        }"#;
        let manifest = Manifest::from_str(json).unwrap();
        assert!(manifest.extra.contains_key("autoload"));
    }

    #[test]
    fn to_request_carries_require_and_require_dev() {
        let json = r#"{
            "name": "vendor/package",
            "require": { "vendor/other": "^1.0" },
            "require-dev": { "phpunit/phpunit": "^10.0" },
            "prefer-stable": true
        }"#;
        let manifest = Manifest::from_str(json).unwrap();
        let request = manifest.to_request();
        assert!(request.prefer_stable);
        assert_eq!(request.all_requires().count(), 2);

        let mut request = request;
        request.with_dev(false);
        assert_eq!(request.all_requires().count(), 1);
    }

    #[test]
    fn to_request_strips_inline_alias_syntax_from_a_constraint() {
        let json = r#"{
            "name": "vendor/package",
            "require": { "vendor/branch": "dev-main as 1.0.0" }
        }"#;
        let manifest = Manifest::from_str(json).unwrap();
        let request = manifest.to_request();
        let (_, constraint) = request.all_requires().find(|(n, _)| *n == "vendor/branch").unwrap();
        assert_eq!(constraint, "dev-main");
    }

    #[test]
    fn minimum_stability_defaults_to_stable() {
        let manifest = Manifest::from_str(r#"{"name": "vendor/package"}"#).unwrap();
        assert_eq!(manifest.minimum_stability(), Stability::Stable);

        let manifest = Manifest::from_str(r#"{"name": "v/p", "minimum-stability": "beta"}"#).unwrap();
        assert_eq!(manifest.minimum_stability(), Stability::Beta);
    }

    #[test]
    fn root_package_carries_conflict_and_replace() {
        let json = r#"{
            "name": "vendor/package",
            "conflict": { "vendor/bad": "*" },
            "replace": { "vendor/old": "self.version" }
        }"#;
        let manifest = Manifest::from_str(json).unwrap();
        let root = manifest.root_package();
        assert_eq!(root.conflict.get("vendor/bad"), Some(&"*".to_string()));
        assert_eq!(root.replace.get("vendor/old"), Some(&"self.version".to_string()));
    }

    #[test]
    fn package_name_validation() {
        assert!(is_valid_package_name("vendor/package"));
        assert!(is_valid_package_name("my-vendor/my-package"));
        assert!(!is_valid_package_name("InvalidName"));
        assert!(!is_valid_package_name("Vendor/Package"));
        assert!(!is_valid_package_name("vendor/"));
    }

    #[test]
    fn rejects_malformed_json() {
        let err = Manifest::from_str("{not json").unwrap_err();
        assert!(matches!(err, ComposerError::ManifestParse(_)));
    }
}
