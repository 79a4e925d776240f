//! End-to-end coverage of the pool/request/solver/transaction pipeline,
//! exercising the scenarios a dependency resolver has to get right: a
//! trivial install, a genuine version conflict, update propagation,
//! provide/replace substitution, branch aliasing, and removal with a
//! reverse dependency.

use super::*;
use crate::package::{AliasPackage, Package};

fn pkg(name: &str, version: &str) -> Package {
    Package::new(name, version)
}

fn pkg_requiring(name: &str, version: &str, requires: &[(&str, &str)]) -> Package {
    let mut p = Package::new(name, version);
    for (dep, constraint) in requires {
        p.require.insert((*dep).to_string(), (*constraint).to_string());
    }
    p
}

// S1: installing a package with no dependencies pulls in nothing else.
#[test]
fn s1_trivial_install_installs_exactly_the_requested_package() {
    let mut pool = Pool::new();
    let a = pool.add_package_from_repo(pkg("vendor/a", "1.0.0.0"), 0);

    let mut request = Request::new();
    request.require("vendor/a", "^1.0");

    let policy = Policy::new();
    let result = Solver::new(&pool, &policy).solve(&request).expect("solvable");

    assert_eq!(result.installed, vec![a]);

    let tx = Transaction::from_solver_result(&pool, &[], &result.installed);
    let installed: Vec<&str> = tx.new_installs().map(|p| p.name()).collect();
    assert_eq!(installed, vec!["vendor/a"]);
}

// S2: two packages requiring disjoint version ranges of a shared dependency
// cannot both be satisfied - the solver must report UNSAT, not silently pick one.
#[test]
fn s2_incompatible_transitive_requirements_are_unsatisfiable() {
    let mut pool = Pool::new();
    pool.add_package_from_repo(pkg_requiring("vendor/a", "1.0.0.0", &[("vendor/shared", "^1.0")]), 0);
    pool.add_package_from_repo(pkg_requiring("vendor/b", "1.0.0.0", &[("vendor/shared", "^2.0")]), 0);
    pool.add_package_from_repo(pkg("vendor/shared", "1.0.0.0"), 0);
    pool.add_package_from_repo(pkg("vendor/shared", "2.0.0.0"), 0);

    let mut request = Request::new();
    request.require("vendor/a", "^1.0");
    request.require("vendor/b", "^1.0");

    let policy = Policy::new();
    let err = Solver::new(&pool, &policy).solve(&request).expect_err("must be unsatisfiable");
    assert!(!err.is_empty());
    assert!(err.to_string().contains("could not be resolved"));
}

// S3: an update job on an already-locked package should move it to the
// newest version the policy prefers, generating an Update operation rather
// than an Install/Uninstall pair.
#[test]
fn s3_update_job_moves_locked_package_to_newest_version() {
    let mut pool = Pool::new();
    pool.add_package_from_repo(pkg("vendor/a", "1.0.0.0"), 0);
    let newest = pool.add_package_from_repo(pkg("vendor/a", "2.0.0.0"), 0);

    let mut request = Request::new();
    let locked = pkg("vendor/a", "1.0.0.0");
    request.lock(locked.clone());
    request.require("vendor/a", "*");
    request.update_package("vendor/a");

    let policy = Policy::new();
    let result = Solver::new(&pool, &policy).solve(&request).expect("solvable");

    assert_eq!(result.installed, vec![newest]);

    let present = vec![std::sync::Arc::new(locked)];
    let tx = Transaction::from_packages(
        present,
        result.installed.iter().map(|&id| pool.package(id)).collect(),
        Vec::new(),
    );
    let updates: Vec<_> = tx.updates().collect();
    assert_eq!(updates.len(), 1);
    assert_eq!(updates[0].1.version(), "2.0.0.0");
}

// S4: a requirement satisfied only through a `provide` entry of another
// package must pull that provider in, not fail to resolve.
#[test]
fn s4_provide_entry_satisfies_an_unrelated_requirement() {
    let mut pool = Pool::new();
    let consumer = pool.add_package_from_repo(pkg_requiring("vendor/app", "1.0.0.0", &[("psr/log-implementation", "1.0")]), 0);
    let mut provider = pkg("vendor/logger", "1.0.0.0");
    provider.provide.insert("psr/log-implementation".to_string(), "1.0.0".to_string());
    let provider_id = pool.add_package_from_repo(provider, 0);

    let mut request = Request::new();
    request.require("vendor/app", "^1.0");

    let policy = Policy::new();
    let result = Solver::new(&pool, &policy).solve(&request).expect("solvable");

    assert!(result.installed.contains(&consumer));
    assert!(result.installed.contains(&provider_id));
}

// S5: a branch alias binds both directions - installing the alias installs
// the underlying package, and satisfying a requirement against the alias
// version is equivalent to satisfying it against the real package.
#[test]
fn s5_alias_binds_target_and_requirement_together() {
    let mut pool = Pool::new();
    let target = pool.add_package_from_repo(pkg("vendor/lib", "dev-main"), 0);
    let underlying = pool.package(target);
    let alias_pkg = AliasPackage::new(underlying, "1.1.x-dev".to_string(), "1.1.x-dev".to_string());
    let alias_id = pool.add_alias(alias_pkg, target);

    pool.add_package_from_repo(pkg_requiring("vendor/app", "1.0.0.0", &[("vendor/lib", "^1.1@dev")]), 0);

    let mut request = Request::new();
    request.require("vendor/app", "^1.0");

    let policy = Policy::new();
    let result = Solver::new(&pool, &policy).solve(&request).expect("solvable");

    assert!(result.installed.contains(&target), "aliasing an id must also install its target");
    let _ = alias_id;
}

// S6: removing a package that something else still requires must fail
// (reported as unsatisfiable), not silently drop the dependent too.
#[test]
fn s6_remove_with_live_reverse_dependency_is_unsatisfiable() {
    let mut pool = Pool::new();
    pool.add_package_from_repo(pkg_requiring("vendor/app", "1.0.0.0", &[("vendor/lib", "^1.0")]), 0);
    pool.add_package_from_repo(pkg("vendor/lib", "1.0.0.0"), 0);

    let mut request = Request::new();
    request.require("vendor/app", "^1.0");
    request.remove("vendor/lib");

    let policy = Policy::new();
    assert!(Solver::new(&pool, &policy).solve(&request).is_err());
}

// Invariant: removing a package that nothing requires succeeds cleanly and
// produces exactly one Uninstall operation.
#[test]
fn remove_with_no_reverse_dependency_succeeds() {
    let mut pool = Pool::new();
    pool.add_package_from_repo(pkg("vendor/lib", "1.0.0.0"), 0);

    let mut request = Request::new();
    let locked = pkg("vendor/lib", "1.0.0.0");
    request.lock(locked.clone());
    request.remove("vendor/lib");

    let policy = Policy::new();
    let result = Solver::new(&pool, &policy).solve(&request).expect("solvable");
    assert!(result.installed.is_empty());

    let present = vec![std::sync::Arc::new(locked)];
    let tx = Transaction::from_packages(present, Vec::new(), Vec::new());
    assert_eq!(tx.removals().count(), 1);
}

// Invariant: two solves over the same pool and request produce identical
// operation lists - the solver's decisions don't depend on anything but its inputs.
#[test]
fn solving_twice_is_deterministic() {
    let mut pool = Pool::new();
    pool.add_package_from_repo(pkg_requiring("vendor/a", "1.0.0.0", &[("vendor/b", "^1.0"), ("vendor/c", "^1.0")]), 0);
    pool.add_package_from_repo(pkg("vendor/b", "1.0.0.0"), 0);
    pool.add_package_from_repo(pkg("vendor/c", "1.0.0.0"), 0);
    pool.add_package_from_repo(pkg("vendor/c", "1.1.0.0"), 0);

    let mut request = Request::new();
    request.require("vendor/a", "^1.0");

    let policy = Policy::new();
    let solver = Solver::new(&pool, &policy);

    let first = solver.solve(&request).expect("solvable").installed;
    let second = solver.solve(&request).expect("solvable").installed;
    assert_eq!(first, second);
}
