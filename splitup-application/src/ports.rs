use crate::{
    error::{SnapshotError, UpdateCheckError},
    model::GroupSnapshot,
    update_policy::RemoteVersionConfig,
};
use splitup_domain::{GroupId, MemberId};

/// Supplies a consistent view of one group's records.
///
/// Implementations decide how fresh the data is; callers re-run the ledger
/// whenever the store reports a change.
pub trait LedgerSnapshotSource: Send + Sync {
    fn load_group(&self, group_id: &GroupId) -> Result<GroupSnapshot, SnapshotError>;

    /// Snapshots of every group `member` belongs to, in group id order.
    fn groups_of(&self, member: &MemberId) -> Result<Vec<GroupSnapshot>, SnapshotError>;
}

pub trait UpdateChecker: Send + Sync {
    fn fetch_remote(&self) -> Result<RemoteVersionConfig, UpdateCheckError>;
}
