use crate::{
    error::SettleUpError,
    model::{Expense, ExpenseId, GroupId, Member, MemberBalances, SettlementRecord},
    services::{balance_engine::BalanceEngine, settlement_planner::SettlementPlan},
};

/// What a group-wide settle-up asks the store to do.
#[derive(Debug, PartialEq, Eq)]
pub struct SettleUpOutcome {
    /// Balances before settling, for display.
    pub balances: MemberBalances,
    pub plan: SettlementPlan,
    /// Unsettled expenses to flag `isSettled`.
    pub expenses_to_settle: Vec<ExpenseId>,
}

pub struct SettleUpPolicy;

impl SettleUpPolicy {
    /// Settles every open expense of a group at once.
    pub fn settle_group(
        engine: &BalanceEngine,
        group_id: &GroupId,
        members: &[Member],
        expenses: &[Expense],
        settlements: &[SettlementRecord],
    ) -> Result<SettleUpOutcome, SettleUpError> {
        let expenses_to_settle: Vec<ExpenseId> = expenses
            .iter()
            .filter(|expense| !expense.is_settled)
            .map(|expense| expense.id.clone())
            .collect();
        if expenses_to_settle.is_empty() {
            return Err(SettleUpError::NothingToSettle(group_id.clone()));
        }

        let balances = engine.compute_balances(members, expenses, settlements);
        let plan = engine.minimize_settlements(members, &balances);

        tracing::info!(
            group_id = %group_id,
            expense_count = expenses_to_settle.len(),
            transfer_count = plan.len(),
            "Prepared group settle-up"
        );

        Ok(SettleUpOutcome {
            balances,
            plan,
            expenses_to_settle,
        })
    }
}
