use crate::{
    model::{Expense, Member, MemberId, Money, SettlementRecord},
    services::balance_engine::BalanceEngine,
};

/// One member's standing across every group they belong to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MemberSummary {
    /// Other participants' shares of open expenses the member paid for.
    pub owed_to_member: Money,
    /// The member's shares of open expenses someone else paid for.
    pub owed_by_member: Money,
    /// Groups with at least one open expense.
    pub active_groups: usize,
    /// Sum of the member's group balances, settlement records included.
    pub balance: Money,
}

impl MemberSummary {
    /// Gross owed-to minus gross owes, before any settlement record.
    pub fn net(&self) -> Money {
        self.owed_to_member.saturating_sub(self.owed_by_member)
    }

    /// Adds one group's records to the summary.
    pub fn include_group(
        &mut self,
        engine: &BalanceEngine,
        member: &MemberId,
        members: &[Member],
        expenses: &[Expense],
        settlements: &[SettlementRecord],
    ) {
        let mut open = expenses.iter().filter(|expense| !expense.is_settled).peekable();
        if open.peek().is_some() {
            self.active_groups += 1;
        }

        for expense in open {
            let shares = match engine.calculator().shares(expense) {
                Ok(shares) => shares,
                Err(err) => {
                    tracing::warn!(
                        expense_id = %expense.id,
                        error = %err,
                        "Leaving expense out of member summary"
                    );
                    continue;
                }
            };
            if &expense.paid_by == member {
                self.owed_to_member = shares
                    .iter()
                    .filter(|(participant, _)| participant != member)
                    .fold(self.owed_to_member, |sum, (_, share)| sum.saturating_add(*share));
            } else if let Some((_, share)) = shares.iter().find(|(participant, _)| participant == member) {
                self.owed_by_member = self.owed_by_member.saturating_add(*share);
            }
        }

        let balance = engine
            .compute_balances(members, expenses, settlements)
            .get(member)
            .copied()
            .unwrap_or(Money::ZERO);
        self.balance = self.balance.saturating_add(balance);
    }
}
