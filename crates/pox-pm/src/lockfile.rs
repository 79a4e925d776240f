//! Reads and writes the `composer.lock`-style lock file: the solved install
//! set plus a content-hash of the manifest sections that produced it, so a
//! stale lock can be detected before the solver ever runs.

use indexmap::IndexMap;
use md5::{Digest, Md5};
use serde::{Deserialize, Serialize};

use crate::error::{ComposerError, Result};
use crate::manifest::Manifest;
use crate::package::{AliasPackage, Package};
use crate::solver::{PackageId, Pool};

/// One locked package entry. Mirrors the subset of `composer.lock`'s package
/// object the solver needs to rebuild a `Package` and feed it back in as a
/// locked/preferred version.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LockedPackage {
    pub name: String,
    pub version: String,
    #[serde(rename = "source-reference", skip_serializing_if = "Option::is_none")]
    pub source_reference: Option<String>,
    #[serde(default)]
    pub require: IndexMap<String, String>,
    #[serde(rename = "require-dev", default)]
    pub require_dev: IndexMap<String, String>,
}

impl From<&Package> for LockedPackage {
    fn from(package: &Package) -> Self {
        Self {
            name: package.name.clone(),
            version: package.version.clone(),
            source_reference: package.source.as_ref().map(|s| s.reference.clone()),
            require: package.require.clone(),
            require_dev: package.require_dev.clone(),
        }
    }
}

impl LockedPackage {
    pub fn to_package(&self) -> Package {
        let mut pkg = Package::new(self.name.clone(), self.version.clone());
        pkg.require = self.require.clone();
        pkg.require_dev = self.require_dev.clone();
        pkg
    }
}

/// A locked branch alias: `package`/alias-version pair, as Composer records
/// it in the lock file's `aliases` array.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LockedAlias {
    pub package: String,
    pub version: String,
    pub alias: String,
}

impl From<&AliasPackage> for LockedAlias {
    fn from(alias: &AliasPackage) -> Self {
        Self {
            package: alias.name().to_string(),
            version: alias.alias_of().version().to_string(),
            alias: alias.pretty_version().to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LockFile {
    #[serde(default)]
    pub packages: Vec<LockedPackage>,
    #[serde(default)]
    pub aliases: Vec<LockedAlias>,
    #[serde(rename = "content-hash")]
    pub content_hash: String,
}

impl LockFile {
    /// Builds a lock file from the solver's final install set - every id it
    /// decided installed, resolved back against the pool - not from a
    /// transaction's before/after diff, since a diff only names what
    /// changed and a lock file must record the complete resulting state.
    pub fn from_resolved(pool: &Pool, result_ids: &[PackageId], manifest: &Manifest) -> Self {
        let packages = result_ids.iter().map(|&id| LockedPackage::from(pool.package(id).as_ref())).collect();
        let aliases = result_ids
            .iter()
            .filter_map(|&id| pool.alias_package(id))
            .map(|a| LockedAlias::from(a.as_ref()))
            .collect();

        Self { packages, aliases, content_hash: compute_content_hash(manifest) }
    }

    pub fn from_str(content: &str) -> Result<Self> {
        serde_json::from_str(content).map_err(|e| ComposerError::LockFileParse(e.to_string()))
    }

    pub fn to_pretty_string(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| ComposerError::LockFileParse(e.to_string()))
    }

    /// Returns an error if this lock's hash no longer matches the manifest's
    /// current require/conflict/replace/provide sections.
    pub fn verify_fresh(&self, manifest: &Manifest) -> Result<()> {
        if self.content_hash != compute_content_hash(manifest) {
            return Err(ComposerError::LockFileOutOfSync);
        }
        Ok(())
    }

    pub fn locked_packages(&self) -> Vec<Package> {
        self.packages.iter().map(LockedPackage::to_package).collect()
    }
}

/// Hashes the manifest sections that determine the solve: `name`, `require`,
/// `require-dev`, `conflict`, `replace`, `provide`, `extra`. Keys are sorted
/// (`BTreeMap`) and forward slashes are escaped the way PHP's `json_encode`
/// escapes them by default, matching Composer's own `md5(json_encode(...))`
/// content-hash so a lock produced by either implementation validates
/// against the other.
fn compute_content_hash(manifest: &Manifest) -> String {
    use std::collections::BTreeMap;

    let mut relevant: BTreeMap<&str, serde_json::Value> = BTreeMap::new();
    relevant.insert("name", serde_json::json!(manifest.name));
    if !manifest.require.is_empty() {
        relevant.insert("require", serde_json::to_value(&manifest.require).unwrap());
    }
    if !manifest.require_dev.is_empty() {
        relevant.insert("require-dev", serde_json::to_value(&manifest.require_dev).unwrap());
    }
    if !manifest.conflict.is_empty() {
        relevant.insert("conflict", serde_json::to_value(&manifest.conflict).unwrap());
    }
    if !manifest.replace.is_empty() {
        relevant.insert("replace", serde_json::to_value(&manifest.replace).unwrap());
    }
    if !manifest.provide.is_empty() {
        relevant.insert("provide", serde_json::to_value(&manifest.provide).unwrap());
    }
    if let Some(stability) = &manifest.minimum_stability {
        relevant.insert("minimum-stability", serde_json::json!(stability));
    }
    if manifest.prefer_stable {
        relevant.insert("prefer-stable", serde_json::json!(true));
    }

    let json = serde_json::to_string(&relevant).unwrap_or_default();
    let escaped = json.replace('/', "\\/");

    let mut hasher = Md5::new();
    hasher.update(escaped.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_hash_matches_composer_for_a_simple_manifest() {
        let manifest = Manifest::from_str(
            r#"{"name": "vendor/test", "require": {"symfony/console": "*"}}"#,
        )
        .unwrap();
        assert_eq!(compute_content_hash(&manifest), "952f760ba9cfb2ca4a799c52d42099d4");
    }

    #[test]
    fn verify_fresh_detects_drift() {
        let manifest = Manifest::from_str(r#"{"name": "vendor/test"}"#).unwrap();
        let lock = LockFile { content_hash: compute_content_hash(&manifest), ..Default::default() };
        assert!(lock.verify_fresh(&manifest).is_ok());

        let changed = Manifest::from_str(r#"{"name": "vendor/test", "require": {"a/b": "^1.0"}}"#).unwrap();
        assert!(matches!(lock.verify_fresh(&changed), Err(ComposerError::LockFileOutOfSync)));
    }

    #[test]
    fn round_trips_through_json() {
        let lock = LockFile {
            packages: vec![LockedPackage {
                name: "vendor/package".to_string(),
                version: "1.0.0".to_string(),
                source_reference: None,
                require: IndexMap::new(),
                require_dev: IndexMap::new(),
            }],
            aliases: Vec::new(),
            content_hash: "abc".to_string(),
        };
        let json = lock.to_pretty_string().unwrap();
        let parsed = LockFile::from_str(&json).unwrap();
        assert_eq!(parsed.packages.len(), 1);
        assert_eq!(parsed.packages[0].name, "vendor/package");
    }

    #[test]
    fn rejects_malformed_lock_json() {
        let err = LockFile::from_str("{not json").unwrap_err();
        assert!(matches!(err, ComposerError::LockFileParse(_)));
    }
}
