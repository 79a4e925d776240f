//! Where candidate packages come from: a synchronous `Repository` contract,
//! an inline-JSON repository, the installed-package baseline, and a manager
//! that rolls every repository into a `Pool`.

mod installed;
mod manager;
mod package;
mod traits;

pub use installed::InstalledRepository;
pub use manager::RepositoryManager;
pub use package::PackageRepository;
pub use traits::Repository;
