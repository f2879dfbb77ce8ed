use rust_decimal::Decimal;
use serde::Deserialize;
use splitup_application::{
    GroupSnapshot, LedgerSnapshotSource, RemoteVersionConfig, SnapshotError, UpdateCheckError,
    UpdateChecker,
};
use splitup_domain::{
    Expense, ExpenseId, Group, GroupId, Member, MemberId, SettlementId, SettlementRecord,
    SplitPolicy,
};
use std::{collections::BTreeMap, fs, path::Path};

#[derive(Debug, Deserialize)]
struct UserRecord {
    #[serde(default)]
    name: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct StoreExport {
    users: BTreeMap<MemberId, UserRecord>,
    groups: BTreeMap<GroupId, Group>,
    expenses: BTreeMap<ExpenseId, Expense>,
    settlements: BTreeMap<SettlementId, SettlementRecord>,
    remote_config: Option<RemoteVersionConfig>,
}

/// Read-only view over a JSON export of the document store.
#[derive(Debug)]
pub struct JsonStoreSnapshotSource {
    store: StoreExport,
}

impl JsonStoreSnapshotSource {
    pub fn from_json(json: &str) -> Result<Self, SnapshotError> {
        let store = serde_json::from_str(json)
            .map_err(|err| SnapshotError::Unavailable(format!("invalid store export: {err}")))?;
        Ok(Self { store })
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, SnapshotError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|err| {
            SnapshotError::Unavailable(format!("failed to read {}: {err}", path.display()))
        })?;
        Self::from_json(&json)
    }

    pub fn remote_config(&self) -> Option<&RemoteVersionConfig> {
        self.store.remote_config.as_ref()
    }

    fn snapshot(&self, group: &Group) -> GroupSnapshot {
        let members = group
            .member_ids
            .iter()
            .filter_map(|id| {
                let user = lookup(&self.store.users, id, &group.id, "user")?;
                Some(Member::new(id.clone(), user.name.clone()))
            })
            .collect();
        let expenses = group
            .expense_ids
            .iter()
            .filter_map(|id| lookup(&self.store.expenses, id, &group.id, "expense"))
            .map(|expense| percentage_shares(expense.clone()))
            .collect();
        let settlements = group
            .settlement_ids
            .iter()
            .filter_map(|id| lookup(&self.store.settlements, id, &group.id, "settlement").cloned())
            .collect();

        GroupSnapshot {
            group: group.clone(),
            members,
            expenses,
            settlements,
        }
    }
}

fn lookup<'a, K, V>(
    records: &'a BTreeMap<K, V>,
    id: &K,
    group_id: &GroupId,
    kind: &'static str,
) -> Option<&'a V>
where
    K: Ord + std::fmt::Display,
{
    let record = records.get(id);
    if record.is_none() {
        tracing::warn!(group_id = %group_id, id = %id, kind, "Skipping missing record");
    }
    record
}

/// The store keeps `PERCENTAGE` split details as the amount each participant
/// owes. The domain reads them as percentages of the total.
fn percentage_shares(mut expense: Expense) -> Expense {
    if expense.split_policy != SplitPolicy::Percentage || !expense.amount.is_positive() {
        return expense;
    }
    let total = expense.amount.as_decimal();
    for (member_id, share) in &mut expense.split_shares {
        match share
            .checked_div(total)
            .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
        {
            Some(percent) => *share = percent,
            None => tracing::warn!(
                expense_id = %expense.id,
                member_id = %member_id,
                "Keeping split detail that cannot be read as a percentage"
            ),
        }
    }
    expense
}

impl LedgerSnapshotSource for JsonStoreSnapshotSource {
    fn load_group(&self, group_id: &GroupId) -> Result<GroupSnapshot, SnapshotError> {
        self.store
            .groups
            .get(group_id)
            .map(|group| self.snapshot(group))
            .ok_or_else(|| SnapshotError::GroupNotFound(group_id.clone()))
    }

    fn groups_of(&self, member: &MemberId) -> Result<Vec<GroupSnapshot>, SnapshotError> {
        Ok(self
            .store
            .groups
            .values()
            .filter(|group| group.member_ids.contains(member))
            .map(|group| self.snapshot(group))
            .collect())
    }
}

/// Serves the version gate bundled with a store export.
#[derive(Clone, Debug, Default)]
pub struct StaticUpdateChecker {
    config: Option<RemoteVersionConfig>,
}

impl StaticUpdateChecker {
    pub fn new(config: Option<RemoteVersionConfig>) -> Self {
        Self { config }
    }

    pub fn from_store(store: &JsonStoreSnapshotSource) -> Self {
        Self::new(store.remote_config().cloned())
    }
}

impl UpdateChecker for StaticUpdateChecker {
    fn fetch_remote(&self) -> Result<RemoteVersionConfig, UpdateCheckError> {
        self.config
            .clone()
            .ok_or_else(|| UpdateCheckError::Unavailable("no remoteConfig in export".to_owned()))
    }
}
