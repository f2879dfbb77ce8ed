use crate::{
    error::BalanceError,
    model::{Expense, Member, MemberBalances, MemberId, Money, SettlementRecord},
    services::{
        activity_feed::ActivityItem,
        settlement_planner::{SettlementPlan, SettlementPlanner},
        split_calculator::SplitCalculator,
    },
};
use rust_decimal::Decimal;
use std::collections::BTreeMap;

/// Bound on `|sum(balances)|` for the engine's own arithmetic.
pub const ZERO_SUM_TOLERANCE: Money = Money::from_decimal(Decimal::from_parts(1, 0, 0, false, 6));

/// Folds expenses and settlement records into net balances.
///
/// Every id that shows up in an applied record gets an entry, even when it
/// was not listed as a member up front, so the balances always sum to zero.
pub struct BalanceAccumulator {
    balances: MemberBalances,
    calculator: SplitCalculator,
}

impl BalanceAccumulator {
    pub fn new<'m, I>(members: I) -> Self
    where
        I: IntoIterator<Item = &'m MemberId>,
    {
        let balances = members
            .into_iter()
            .map(|member| (member.clone(), Money::ZERO))
            .collect();

        Self {
            balances,
            calculator: SplitCalculator::default(),
        }
    }

    pub fn with_calculator(mut self, calculator: SplitCalculator) -> Self {
        self.calculator = calculator;
        self
    }

    /// Credits the payer with the full amount and debits every participant
    /// their share. Settled expenses are ignored. On error the balances are
    /// left untouched.
    pub fn apply_expense(&mut self, expense: &Expense) -> Result<(), BalanceError> {
        if expense.is_settled {
            return Ok(());
        }

        let shares = self.calculator.shares(expense)?;
        let deltas = std::iter::once((&expense.paid_by, expense.amount))
            .chain(shares.iter().map(|(member, share)| (member, -*share)));
        self.book(expense.id.as_str(), deltas)
    }

    /// A payment raises the payer's balance and lowers the receiver's.
    pub fn apply_settlement(&mut self, settlement: &SettlementRecord) -> Result<(), BalanceError> {
        let deltas = [
            (&settlement.from_user_id, settlement.amount),
            (&settlement.to_user_id, -settlement.amount),
        ];
        self.book(settlement.id.as_str(), deltas)
    }

    pub fn apply(&mut self, item: &ActivityItem<'_>) -> Result<(), BalanceError> {
        match item {
            ActivityItem::Expense(expense) => self.apply_expense(expense),
            ActivityItem::Settlement(settlement) => self.apply_settlement(settlement),
        }
    }

    pub fn balances(&self) -> &MemberBalances {
        &self.balances
    }

    pub fn into_balances(self) -> MemberBalances {
        self.balances
    }

    /// Nets the deltas per member and writes them only if every resulting
    /// balance stays representable.
    fn book<'r, I>(&mut self, record_id: &str, deltas: I) -> Result<(), BalanceError>
    where
        I: IntoIterator<Item = (&'r MemberId, Money)>,
    {
        let overflow = |member: &MemberId| BalanceError::Overflow {
            record_id: record_id.to_owned(),
            member_id: member.clone(),
        };

        let mut net: BTreeMap<&MemberId, Money> = BTreeMap::new();
        for (member, delta) in deltas {
            let entry = net.entry(member).or_insert(Money::ZERO);
            *entry = entry.checked_add(delta).ok_or_else(|| overflow(member))?;
        }

        let mut updated = Vec::with_capacity(net.len());
        for (member, delta) in net {
            let current = self.balances.get(member).copied().unwrap_or(Money::ZERO);
            let next = current.checked_add(delta).ok_or_else(|| overflow(member))?;
            updated.push((member.clone(), next));
        }
        self.balances.extend(updated);
        Ok(())
    }
}

/// Net balances and suggested payments for one group snapshot.
///
/// Stateless: every call recomputes from the records it is given.
#[derive(Clone, Copy, Debug, Default)]
pub struct BalanceEngine {
    calculator: SplitCalculator,
    planner: SettlementPlanner,
}

impl BalanceEngine {
    pub fn new(calculator: SplitCalculator) -> Self {
        Self {
            calculator,
            planner: SettlementPlanner::default(),
        }
    }

    pub fn calculator(&self) -> &SplitCalculator {
        &self.calculator
    }

    /// Net balance per member. Records that cannot be booked (an expense
    /// without participants, or amounts that would overflow a balance) are
    /// skipped as a whole.
    pub fn compute_balances(
        &self,
        members: &[Member],
        expenses: &[Expense],
        settlements: &[SettlementRecord],
    ) -> MemberBalances {
        let mut accumulator = BalanceAccumulator::new(members.iter().map(|member| &member.id))
            .with_calculator(self.calculator);

        for expense in expenses {
            if let Err(err) = accumulator.apply_expense(expense) {
                tracing::warn!(
                    expense_id = %expense.id,
                    group_id = %expense.group_id,
                    error = %err,
                    "Skipping expense that cannot be split"
                );
            }
        }
        for settlement in settlements {
            if let Err(err) = accumulator.apply_settlement(settlement) {
                tracing::warn!(
                    settlement_id = %settlement.id,
                    group_id = %settlement.group_id,
                    error = %err,
                    "Skipping settlement that cannot be booked"
                );
            }
        }

        let balances = accumulator.into_balances();
        match Money::checked_sum(balances.values().copied()) {
            Some(total) if total.is_within(ZERO_SUM_TOLERANCE) => {}
            total => tracing::warn!(
                member_count = balances.len(),
                total = ?total,
                "Balances do not sum to zero"
            ),
        }
        balances
    }

    /// Greedy debtor/creditor pairing; see [`SettlementPlanner::plan`].
    pub fn minimize_settlements(
        &self,
        members: &[Member],
        balances: &MemberBalances,
    ) -> SettlementPlan {
        self.planner.plan(members, balances)
    }
}
