use splitup_domain::{
    ActivityFeed, ActivityItem, Expense, ExpenseId, Group, GroupId, Member, MemberBalances,
    MemberId, MemberPosition, Money, SettlementPlan, SettlementRecord,
};

/// Records of one group as read from the store in a single pass.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GroupSnapshot {
    pub group: Group,
    pub members: Vec<Member>,
    pub expenses: Vec<Expense>,
    pub settlements: Vec<SettlementRecord>,
}

impl GroupSnapshot {
    pub fn unsettled_expense_ids(&self) -> impl Iterator<Item = &ExpenseId> + '_ {
        self.expenses
            .iter()
            .filter(|expense| !expense.is_settled)
            .map(|expense| &expense.id)
    }
}

/// Derived ledger state for a snapshot. Rebuilt on every refresh.
#[derive(Debug)]
pub struct LedgerView {
    pub snapshot: GroupSnapshot,
    pub balances: MemberBalances,
    pub plan: SettlementPlan,
    pub total_unsettled: Money,
}

impl LedgerView {
    pub fn group_id(&self) -> &GroupId {
        &self.snapshot.group.id
    }

    pub fn members(&self) -> &[Member] {
        &self.snapshot.members
    }

    pub fn feed(&self) -> Vec<ActivityItem<'_>> {
        ActivityFeed::build(&self.snapshot.expenses, &self.snapshot.settlements)
    }

    pub fn balance_of(&self, member: &MemberId) -> Money {
        self.balances.get(member).copied().unwrap_or(Money::ZERO)
    }

    pub fn position(&self, member: &MemberId) -> MemberPosition {
        MemberPosition::from_balance(self.balance_of(member))
    }
}

/// Store writes for a group-wide settle-up.
#[derive(Debug, PartialEq, Eq)]
pub struct SettleUpCommit {
    pub group_id: GroupId,
    pub plan: SettlementPlan,
    pub expenses_to_settle: Vec<ExpenseId>,
}
