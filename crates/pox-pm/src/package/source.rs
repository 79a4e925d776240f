use serde::{Deserialize, Serialize};

/// Where a package's source code lives in version control.
///
/// The resolver never clones anything - it only needs `reference` to tell
/// two otherwise-identical versions apart when deciding whether a package
/// actually changed (see `Transaction::needs_update`), and `url`/`source_type`
/// to carry through into the lock file for a later install step to consume.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    #[serde(rename = "type")]
    pub source_type: String,
    pub url: String,
    pub reference: String,
}

impl Source {
    pub fn new(source_type: impl Into<String>, url: impl Into<String>, reference: impl Into<String>) -> Self {
        Self { source_type: source_type.into(), url: url.into(), reference: reference.into() }
    }

    pub fn git(url: impl Into<String>, reference: impl Into<String>) -> Self {
        Self::new("git", url, reference)
    }
}

impl Default for Source {
    fn default() -> Self {
        Self { source_type: "git".to_string(), url: String::new(), reference: String::new() }
    }
}

/// Where a pre-built archive of a package can be fetched from.
///
/// `shasum`/`sha256` round-trip through `composer.json`/`composer.lock`
/// untouched; this crate never downloads or verifies an archive, so nothing
/// reads them beyond `Transaction::needs_update`'s reference comparison.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dist {
    #[serde(rename = "type")]
    pub dist_type: String,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shasum: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sha256: Option<String>,
}

impl Dist {
    pub fn new(dist_type: impl Into<String>, url: impl Into<String>) -> Self {
        Self { dist_type: dist_type.into(), url: url.into(), reference: None, shasum: None, sha256: None }
    }

    pub fn zip(url: impl Into<String>) -> Self {
        Self::new("zip", url)
    }

    pub fn with_reference(mut self, reference: impl Into<String>) -> Self {
        self.reference = Some(reference.into());
        self
    }

    pub fn with_shasum(mut self, shasum: impl Into<String>) -> Self {
        self.shasum = Some(shasum.into());
        self
    }
}

impl Default for Dist {
    fn default() -> Self {
        Self { dist_type: "zip".to_string(), url: String::new(), reference: None, shasum: None, sha256: None }
    }
}
