use std::collections::{BTreeMap, HashMap};

use super::pool::{Pool, PackageId};

/// Deterministic oracle consulted by the solver whenever more than one
/// candidate can satisfy a disjunction. Never mutates the pool or its inputs.
#[derive(Debug, Clone, Default)]
pub struct Policy {
    pub prefer_stable: bool,
    pub prefer_lowest: bool,
    /// Mirrors Composer's `COMPOSER_PREFER_DEV_OVER_PRERELEASE`: when set
    /// alongside `prefer_lowest`, a dev version outranks an alpha/beta/RC.
    pub prefer_dev_over_prerelease: bool,
    /// package name -> normalized version to prefer, e.g. from a lock file.
    pub preferred_versions: HashMap<String, String>,
}

impl Policy {
    pub fn new() -> Self {
        Self {
            prefer_stable: true,
            prefer_lowest: false,
            prefer_dev_over_prerelease: false,
            preferred_versions: HashMap::new(),
        }
    }

    pub fn prefer_stable(mut self, prefer: bool) -> Self {
        self.prefer_stable = prefer;
        self
    }

    pub fn prefer_lowest(mut self, prefer: bool) -> Self {
        self.prefer_lowest = prefer;
        self
    }

    pub fn prefer_dev_over_prerelease(mut self, prefer: bool) -> Self {
        self.prefer_dev_over_prerelease = prefer;
        self
    }

    pub fn preferred_versions(mut self, versions: HashMap<String, String>) -> Self {
        self.preferred_versions = versions;
        self
    }

    pub fn with_preferred_version(mut self, package: &str, version: &str) -> Self {
        self.preferred_versions.insert(package.to_lowercase(), version.to_string());
        self
    }

    /// Ranks `candidates` best-first: higher repo priority, then (per
    /// `prefer_stable`/`prefer_lowest`) stability and version, non-alias
    /// before alias unless the alias is a root-package alias, pool id last.
    pub fn select_preferred(&self, pool: &Pool, candidates: &[PackageId]) -> Vec<PackageId> {
        self.select_preferred_for_requirement(pool, candidates, None)
    }

    pub fn select_preferred_for_requirement(
        &self,
        pool: &Pool,
        candidates: &[PackageId],
        required_package: Option<&str>,
    ) -> Vec<PackageId> {
        if candidates.is_empty() {
            return Vec::new();
        }

        let mut by_name: BTreeMap<String, Vec<PackageId>> = BTreeMap::new();
        for &id in candidates {
            by_name.entry(pool.name(id).to_string()).or_default().push(id);
        }

        for group in by_name.values_mut() {
            group.sort_by(|&a, &b| self.compare_by_priority(pool, a, b, required_package, true));
        }

        let mut result: Vec<PackageId> = by_name.into_values().flatten().collect();
        result.sort_by(|&a, &b| self.compare_by_priority(pool, a, b, required_package, false));
        result
    }

    fn compare_by_priority(
        &self,
        pool: &Pool,
        a: PackageId,
        b: PackageId,
        required_package: Option<&str>,
        ignore_replace: bool,
    ) -> std::cmp::Ordering {
        let a_is_root_alias = pool.is_root_package_alias(a);
        let b_is_root_alias = pool.is_root_package_alias(b);
        if a_is_root_alias && !b_is_root_alias {
            return std::cmp::Ordering::Less;
        }
        if !a_is_root_alias && b_is_root_alias {
            return std::cmp::Ordering::Greater;
        }

        if pool.name(a) == pool.name(b) {
            let a_is_alias = pool.is_alias(a);
            let b_is_alias = pool.is_alias(b);
            if a_is_alias && !b_is_alias {
                return std::cmp::Ordering::Less;
            }
            if !a_is_alias && b_is_alias {
                return std::cmp::Ordering::Greater;
            }
        }

        if !ignore_replace {
            let replace_a = pool.replace(a);
            let replace_b = pool.replace(b);
            if replace_a.keys().any(|n| n.eq_ignore_ascii_case(pool.name(b))) {
                return std::cmp::Ordering::Greater;
            }
            if replace_b.keys().any(|n| n.eq_ignore_ascii_case(pool.name(a))) {
                return std::cmp::Ordering::Less;
            }

            if let Some(req_pkg) = required_package {
                if let Some(req_vendor) = req_pkg.split('/').next() {
                    let prefix = format!("{req_vendor}/");
                    let a_same_vendor = pool.name(a).starts_with(&prefix);
                    let b_same_vendor = pool.name(b).starts_with(&prefix);
                    if a_same_vendor && !b_same_vendor {
                        return std::cmp::Ordering::Less;
                    }
                    if !a_same_vendor && b_same_vendor {
                        return std::cmp::Ordering::Greater;
                    }
                }
            }
        }

        // higher repo priority sorts first (preferred), so reverse the natural comparison
        let priority_a = pool.get_priority_by_id(a);
        let priority_b = pool.get_priority_by_id(b);
        if priority_a != priority_b {
            return priority_b.cmp(&priority_a);
        }

        if self.prefer_stable {
            let stab_a = pool.stability(a);
            let stab_b = pool.stability(b);

            if self.prefer_lowest && self.prefer_dev_over_prerelease {
                use crate::package::Stability;
                let a_is_dev = stab_a == Stability::Dev;
                let b_is_dev = stab_b == Stability::Dev;
                let a_is_prerelease = matches!(stab_a, Stability::Alpha | Stability::Beta | Stability::Rc);
                let b_is_prerelease = matches!(stab_b, Stability::Alpha | Stability::Beta | Stability::Rc);

                if a_is_dev && b_is_prerelease {
                    return std::cmp::Ordering::Less;
                }
                if b_is_dev && a_is_prerelease {
                    return std::cmp::Ordering::Greater;
                }
            }

            let stability_cmp = stab_a.priority().cmp(&stab_b.priority());
            if stability_cmp != std::cmp::Ordering::Equal {
                return stability_cmp;
            }
        }

        if !self.preferred_versions.is_empty() {
            if let Some(preferred) = self.preferred_versions.get(pool.name(a)) {
                let a_is_preferred = versions_match(pool.version(a), preferred);
                let b_is_preferred = versions_match(pool.version(b), preferred);
                if a_is_preferred && !b_is_preferred {
                    return std::cmp::Ordering::Less;
                }
                if !a_is_preferred && b_is_preferred {
                    return std::cmp::Ordering::Greater;
                }
            }
        }

        let version_cmp = compare_versions(pool.version(a), pool.version(b));
        let version_result = if self.prefer_lowest { version_cmp } else { version_cmp.reverse() };
        if version_result != std::cmp::Ordering::Equal {
            return version_result;
        }

        a.cmp(&b)
    }

    pub fn select_best(&self, pool: &Pool, candidates: &[PackageId]) -> Option<PackageId> {
        self.select_preferred(pool, candidates).into_iter().next()
    }

    /// Candidates a caller could substitute in for an installed package during an update.
    pub fn find_update_packages(&self, pool: &Pool, name: &str) -> Vec<PackageId> {
        self.select_preferred(pool, pool.ids_for_name(name))
    }
}

fn versions_match(version: &str, preferred: &str) -> bool {
    normalize_numeric(version) == normalize_numeric(preferred)
}

fn normalize_numeric(v: &str) -> Vec<u32> {
    v.split(|c: char| !c.is_ascii_digit())
        .filter(|s| !s.is_empty())
        .filter_map(|s| s.parse().ok())
        .collect()
}

/// Purely numeric dotted-version comparison; the solver only ever compares
/// versions it already obtained from the pool, which normalizes through
/// `pox_semver::VersionParser` before registration.
fn compare_versions(a: &str, b: &str) -> std::cmp::Ordering {
    let parts_a = normalize_numeric(a);
    let parts_b = normalize_numeric(b);
    let max_len = parts_a.len().max(parts_b.len());

    for i in 0..max_len {
        let pa = parts_a.get(i).copied().unwrap_or(0);
        let pb = parts_b.get(i).copied().unwrap_or(0);
        match pa.cmp(&pb) {
            std::cmp::Ordering::Equal => continue,
            other => return other,
        }
    }
    std::cmp::Ordering::Equal
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::package::Package;

    #[test]
    fn compare_versions_numeric() {
        assert_eq!(compare_versions("1.0.0", "1.0.0"), std::cmp::Ordering::Equal);
        assert_eq!(compare_versions("2.0.0", "1.0.0"), std::cmp::Ordering::Greater);
        assert_eq!(compare_versions("1.10.0", "1.9.0"), std::cmp::Ordering::Greater);
    }

    #[test]
    fn prefers_highest_version_by_default() {
        let mut pool = Pool::new();
        let id1 = pool.add_package_from_repo(Package::new("vendor/pkg", "1.0.0.0"), 0);
        let id2 = pool.add_package_from_repo(Package::new("vendor/pkg", "2.0.0.0"), 0);
        let id3 = pool.add_package_from_repo(Package::new("vendor/pkg", "1.5.0.0"), 0);

        let policy = Policy::new();
        let sorted = policy.select_preferred(&pool, &[id1, id2, id3]);

        assert_eq!(sorted, vec![id2, id3, id1]);
    }

    #[test]
    fn prefer_lowest_reverses_order() {
        let mut pool = Pool::new();
        let id1 = pool.add_package_from_repo(Package::new("vendor/pkg", "1.0.0.0"), 0);
        let id2 = pool.add_package_from_repo(Package::new("vendor/pkg", "2.0.0.0"), 0);
        let id3 = pool.add_package_from_repo(Package::new("vendor/pkg", "1.5.0.0"), 0);

        let policy = Policy::new().prefer_lowest(true);
        let sorted = policy.select_preferred(&pool, &[id1, id2, id3]);

        assert_eq!(sorted, vec![id1, id3, id2]);
    }

    #[test]
    fn higher_repository_priority_wins_regardless_of_version() {
        let mut pool = Pool::new();
        let low_priority_newer = pool.add_package_from_repo(Package::new("vendor/pkg", "2.0.0.0"), 0);
        let high_priority_older = pool.add_package_from_repo(Package::new("vendor/pkg", "1.0.0.0"), 10);

        let policy = Policy::new();
        let sorted = policy.select_preferred(&pool, &[low_priority_newer, high_priority_older]);

        assert_eq!(sorted[0], high_priority_older);
    }
}
