use crate::solver::ProblemSet;

pub type Result<T> = std::result::Result<T, ComposerError>;

/// Every failure mode the solver and its ambient stack can produce.
///
/// The first three variants are the solver's own: every conflict short of
/// these is recovered internally through learning and backtracking. The
/// remaining variants belong to the manifest/lock-file/repository layer
/// around it, kept separate so a caller can tell "your input was malformed"
/// from "the request you gave the solver has no solution."
#[derive(Debug, thiserror::Error)]
pub enum ComposerError {
    #[error("{0}")]
    UnsatisfiableRequest(ProblemSet),

    #[error("invalid pool: {0}")]
    InvalidPool(String),

    #[error("operation cancelled")]
    Cancelled,

    #[error("failed to parse manifest: {0}")]
    ManifestParse(String),

    #[error("lock file is out of sync with the manifest (content hash mismatch)")]
    LockFileOutOfSync,

    #[error("failed to parse lock file: {0}")]
    LockFileParse(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<ProblemSet> for ComposerError {
    fn from(problems: ProblemSet) -> Self {
        ComposerError::UnsatisfiableRequest(problems)
    }
}
