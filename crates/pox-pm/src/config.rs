use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::package::Stability;
use crate::solver::Policy;

/// The subset of Composer's config object the solver's `Policy` actually
/// consults. Vendor directory layout, auth, process timeouts and the rest of
/// the installer configuration schema belong to the Installer shell, not here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(rename = "minimum-stability", default)]
    pub minimum_stability: Stability,
    #[serde(rename = "prefer-stable", default)]
    pub prefer_stable: bool,
    /// Platform package name -> version override, e.g. `{"php": "8.3.0"}`,
    /// used in place of probing the running environment.
    #[serde(default)]
    pub platform: HashMap<String, String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            minimum_stability: Stability::Stable,
            prefer_stable: false,
            platform: HashMap::new(),
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn to_policy(&self) -> Policy {
        Policy::new().prefer_stable(self.prefer_stable)
    }

    pub fn platform_version(&self, name: &str) -> Option<&str> {
        self.platform.get(&name.to_lowercase()).map(String::as_str)
    }
}
