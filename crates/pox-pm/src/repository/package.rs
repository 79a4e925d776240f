//! In-memory repository backed by inline package definitions, the way
//! Composer's `{"type": "package", "package": {...}}` repository works.

use std::sync::Arc;

use serde_json::Value;

use crate::package::Package;

use super::traits::Repository;

/// Loads `Package` values directly from JSON (by reusing `Package`'s own
/// `serde::Deserialize` impl) rather than network fetching or VCS cloning -
/// the simplest concrete repository a caller can build by hand.
#[derive(Debug)]
pub struct PackageRepository {
    name: String,
    packages: Vec<Arc<Package>>,
    priority: i32,
}

impl PackageRepository {
    /// `package_config` is either a single package object or an array of them.
    pub fn new(package_config: &Value) -> Result<Self, String> {
        let entries: Vec<&Value> = match package_config {
            Value::Array(items) => items.iter().collect(),
            Value::Object(_) => vec![package_config],
            _ => return Err("package repository config must be an object or array".to_string()),
        };

        let mut packages = Vec::with_capacity(entries.len());
        for (index, entry) in entries.into_iter().enumerate() {
            let package: Package = serde_json::from_value(entry.clone())
                .map_err(|e| format!("invalid package at index {index}: {e}"))?;
            packages.push(Arc::new(package));
        }

        let name = match packages.as_slice() {
            [single] => format!("package {}", single.name()),
            many => format!("package repo ({} packages)", many.len()),
        };

        Ok(Self { name, packages, priority: 0 })
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }
}

impl Repository for PackageRepository {
    fn packages(&self) -> &[Arc<Package>] {
        &self.packages
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn priority(&self) -> i32 {
        self.priority
    }
}
