//! Package model: the descriptors the Pool registers and the solver reasons about.

mod alias;
mod link;
mod package;
mod source;

pub use alias::{parse_branch_aliases, parse_inline_alias, AliasPackage, DEFAULT_BRANCH_ALIAS};
pub use link::{Link, LinkType};
pub use package::{
    package_type, Abandoned, ArchiveConfig, Author, Funding, Package, ScriptHandler, Scripts,
    Stability, Support,
};
pub use source::{Dist, Source};
