use splitup_domain::{GroupId, SettleUpError, SplitError};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SnapshotError {
    #[error("group {0} not found")]
    GroupNotFound(GroupId),
    #[error("snapshot unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error(transparent)]
    Snapshot(#[from] SnapshotError),
    #[error(transparent)]
    InvalidExpense(#[from] SplitError),
    #[error(transparent)]
    SettleUp(#[from] SettleUpError),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UpdateCheckError {
    #[error("remote config unavailable: {0}")]
    Unavailable(String),
}
