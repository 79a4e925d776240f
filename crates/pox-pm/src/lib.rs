//! Composer-compatible dependency resolution: a CDCL SAT solver over PHP
//! package manifests, plus the manifest/lock-file/repository layer around it.

pub mod config;
pub mod error;
pub mod event;
pub mod lockfile;
pub mod manifest;
pub mod package;
pub mod repository;
pub mod solver;

pub use config::Config;
pub use error::{ComposerError, Result};
pub use event::{Event, EventDispatcher, EventDispatcherChain, EventKind, NullEventDispatcher};
pub use lockfile::{LockFile, LockedAlias, LockedPackage};
pub use manifest::Manifest;
pub use package::Package;
pub use repository::{InstalledRepository, PackageRepository, Repository, RepositoryManager};
pub use solver::{Pool, Policy, Problem, ProblemSet, Request, Solver, SolverResult, Transaction};
