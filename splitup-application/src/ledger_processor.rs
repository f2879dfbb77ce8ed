use crate::{
    error::LedgerError,
    model::{GroupSnapshot, LedgerView, SettleUpCommit},
    ports::LedgerSnapshotSource,
};
use splitup_domain::{
    BalanceEngine, Expense, ExpenseId, GroupId, MemberId, MemberPosition, MemberSummary, Money,
    SettleUpPolicy, SettlementDraft, Timestamp,
};
use std::collections::BTreeSet;

/// Runs the ledger for one group at a time against a snapshot source.
#[derive(Clone, Copy)]
pub struct LedgerProcessor<'a> {
    source: &'a dyn LedgerSnapshotSource,
    engine: &'a BalanceEngine,
}

impl<'a> LedgerProcessor<'a> {
    pub fn new(source: &'a dyn LedgerSnapshotSource, engine: &'a BalanceEngine) -> Self {
        Self { source, engine }
    }

    pub fn engine(&self) -> &BalanceEngine {
        self.engine
    }

    /// Reloads the group and recomputes balances and the suggested plan.
    pub fn refresh(&self, group_id: &GroupId) -> Result<LedgerView, LedgerError> {
        let snapshot = self.source.load_group(group_id)?;
        Ok(self.view(snapshot))
    }

    pub fn view(&self, snapshot: GroupSnapshot) -> LedgerView {
        let balances = self.engine.compute_balances(
            &snapshot.members,
            &snapshot.expenses,
            &snapshot.settlements,
        );
        let plan = self
            .engine
            .minimize_settlements(&snapshot.members, &balances);
        let total_unsettled: Money = snapshot
            .expenses
            .iter()
            .filter(|expense| !expense.is_settled)
            .fold(Money::ZERO, |sum, expense| sum.saturating_add(expense.amount));

        tracing::debug!(
            group_id = %snapshot.group.id,
            member_count = snapshot.members.len(),
            expense_count = snapshot.expenses.len(),
            settlement_count = snapshot.settlements.len(),
            transfer_count = plan.len(),
            "Refreshed ledger"
        );

        LedgerView {
            snapshot,
            balances,
            plan,
            total_unsettled,
        }
    }

    pub fn position(
        &self,
        group_id: &GroupId,
        member: &MemberId,
    ) -> Result<MemberPosition, LedgerError> {
        Ok(self.refresh(group_id)?.position(member))
    }

    /// Totals across every group the member belongs to.
    pub fn member_summary(&self, member: &MemberId) -> Result<MemberSummary, LedgerError> {
        let snapshots = self.source.groups_of(member)?;
        let mut summary = MemberSummary::default();
        for snapshot in &snapshots {
            summary.include_group(
                self.engine,
                member,
                &snapshot.members,
                &snapshot.expenses,
                &snapshot.settlements,
            );
        }
        tracing::debug!(
            member_id = %member,
            group_count = snapshots.len(),
            active_groups = summary.active_groups,
            "Summarized member"
        );
        Ok(summary)
    }

    /// Rejects an expense before it is written to the store.
    pub fn validate_expense(&self, expense: &Expense) -> Result<(), LedgerError> {
        self.engine
            .calculator()
            .validate_shares(expense)
            .inspect_err(|err| {
                tracing::warn!(expense_id = %expense.id, error = %err, "Rejected expense");
            })?;
        Ok(())
    }

    /// Marks every open expense of the group as settled.
    pub fn settle_up(&self, group_id: &GroupId) -> Result<SettleUpCommit, LedgerError> {
        let snapshot = self.source.load_group(group_id)?;
        let outcome = SettleUpPolicy::settle_group(
            self.engine,
            group_id,
            &snapshot.members,
            &snapshot.expenses,
            &snapshot.settlements,
        )?;

        Ok(SettleUpCommit {
            group_id: group_id.clone(),
            plan: outcome.plan,
            expenses_to_settle: outcome.expenses_to_settle,
        })
    }

    /// Settlement records for paying out the view's plan, linked to the
    /// expenses that were open when the plan was computed.
    pub fn draft_settlements(view: &LedgerView, settled_at: Timestamp) -> Vec<SettlementDraft> {
        let expense_ids: BTreeSet<ExpenseId> =
            view.snapshot.unsettled_expense_ids().cloned().collect();
        view.plan.to_drafts(view.group_id(), settled_at, &expense_ids)
    }
}
