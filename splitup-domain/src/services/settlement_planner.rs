use crate::model::{
    ExpenseId, GroupId, Member, MemberBalances, MemberId, Money, SettlementDraft, Timestamp,
};
use fxhash::FxHashMap;
use rust_decimal::Decimal;
use std::{
    cmp::Ordering,
    collections::{BTreeSet, BinaryHeap},
};

/// Balances within this distance of zero count as settled.
pub const SETTLEMENT_EPSILON: Money = Money::from_decimal(Decimal::from_parts(1, 0, 0, false, 2));

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlannedTransfer {
    pub from: Member,
    pub to: Member,
    pub amount: Money,
}

/// Suggested payments that bring every balance within [`SETTLEMENT_EPSILON`]
/// of zero when executed in order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SettlementPlan {
    transfers: Vec<PlannedTransfer>,
}

impl SettlementPlan {
    pub fn new(transfers: Vec<PlannedTransfer>) -> Self {
        Self { transfers }
    }

    pub fn transfers(&self) -> &[PlannedTransfer] {
        &self.transfers
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PlannedTransfer> {
        self.transfers.iter()
    }

    pub fn len(&self) -> usize {
        self.transfers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transfers.is_empty()
    }

    pub fn total(&self) -> Money {
        self.transfers
            .iter()
            .fold(Money::ZERO, |total, transfer| total.saturating_add(transfer.amount))
    }

    /// Books every transfer as if it had been paid.
    pub fn apply_to(&self, balances: &mut MemberBalances) {
        for transfer in &self.transfers {
            let from = balances
                .entry(transfer.from.id.clone())
                .or_insert(Money::ZERO);
            *from = from.saturating_add(transfer.amount);
            let to = balances.entry(transfer.to.id.clone()).or_insert(Money::ZERO);
            *to = to.saturating_sub(transfer.amount);
        }
    }

    /// Settlement records to hand to the store once the payments are made.
    pub fn to_drafts(
        &self,
        group_id: &GroupId,
        settled_at: Timestamp,
        expense_ids: &BTreeSet<ExpenseId>,
    ) -> Vec<SettlementDraft> {
        self.transfers
            .iter()
            .map(|transfer| SettlementDraft {
                group_id: group_id.clone(),
                from_user_id: transfer.from.id.clone(),
                to_user_id: transfer.to.id.clone(),
                amount: transfer.amount,
                settled_at,
                expense_ids: expense_ids.clone(),
            })
            .collect()
    }
}

impl<'a> IntoIterator for &'a SettlementPlan {
    type Item = &'a PlannedTransfer;
    type IntoIter = std::slice::Iter<'a, PlannedTransfer>;

    fn into_iter(self) -> Self::IntoIter {
        self.transfers.iter()
    }
}

/// Outstanding amount for one side of the pairing.
///
/// Heap order: larger `need` first, then the lexicographically smaller id.
#[derive(Debug, PartialEq, Eq)]
struct Party<'a> {
    need: Money,
    id: &'a MemberId,
}

impl Ord for Party<'_> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.need
            .cmp(&other.need)
            .then_with(|| other.id.cmp(self.id))
    }
}

impl PartialOrd for Party<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Greedy debt simplification.
///
/// Repeatedly pairs the debtor owing the most with the creditor owed the most
/// (ties broken by ascending member id) and settles the smaller of the two
/// needs. Each step retires at least one party, so a plan has at most
/// `debtors + creditors - 1` transfers. Not transaction-minimal in general.
///
/// Balances within epsilon of zero ("dust"), including what is left of a
/// partly settled party, are left alone unless one side runs out while the
/// other still needs more than epsilon. Dust on the empty side is then swept
/// in, so a creditor owed 0.03 by three debtors of 0.01 each still collects
/// until it is within epsilon. Every transfer zeroes at least one party.
#[derive(Clone, Copy, Debug)]
pub struct SettlementPlanner {
    epsilon: Money,
}

impl Default for SettlementPlanner {
    fn default() -> Self {
        Self {
            epsilon: SETTLEMENT_EPSILON,
        }
    }
}

impl SettlementPlanner {
    pub fn with_epsilon(epsilon: Money) -> Self {
        Self {
            epsilon: epsilon.abs(),
        }
    }

    /// `members` only supplies display names; ids without a member record
    /// are planned under their id.
    pub fn plan(&self, members: &[Member], balances: &MemberBalances) -> SettlementPlan {
        let directory: FxHashMap<&MemberId, &Member> =
            members.iter().map(|member| (&member.id, member)).collect();
        let resolve = |id: &MemberId| {
            directory
                .get(id)
                .map(|member| (*member).clone())
                .unwrap_or_else(|| Member::unnamed(id.clone()))
        };

        let mut debtors = BinaryHeap::new();
        let mut creditors = BinaryHeap::new();
        let mut dust_debtors = BinaryHeap::new();
        let mut dust_creditors = BinaryHeap::new();
        for (id, balance) in balances {
            if *balance < -self.epsilon {
                debtors.push(Party {
                    need: -*balance,
                    id,
                });
            } else if *balance > self.epsilon {
                creditors.push(Party { need: *balance, id });
            } else if balance.is_negative() {
                dust_debtors.push(Party {
                    need: -*balance,
                    id,
                });
            } else if balance.is_positive() {
                dust_creditors.push(Party { need: *balance, id });
            }
        }
        let debtor_count = debtors.len();
        let creditor_count = creditors.len();
        let dust_count = dust_debtors.len() + dust_creditors.len();

        let mut transfers = Vec::with_capacity((debtor_count + creditor_count).saturating_sub(1));
        loop {
            if debtors.is_empty() && self.has_open_need(&creditors) {
                debtors.append(&mut dust_debtors);
            }
            if creditors.is_empty() && self.has_open_need(&debtors) {
                creditors.append(&mut dust_creditors);
            }
            if debtors.is_empty() || creditors.is_empty() {
                break;
            }
            let (Some(mut debtor), Some(mut creditor)) = (debtors.pop(), creditors.pop()) else {
                break;
            };

            let amount = debtor.need.min(creditor.need);
            transfers.push(PlannedTransfer {
                from: resolve(debtor.id),
                to: resolve(creditor.id),
                amount,
            });

            debtor.need -= amount;
            creditor.need -= amount;
            self.requeue(debtor, &mut debtors, &mut dust_debtors);
            self.requeue(creditor, &mut creditors, &mut dust_creditors);
        }

        tracing::debug!(
            debtor_count,
            creditor_count,
            dust_count,
            transfer_count = transfers.len(),
            "Built settlement plan"
        );

        SettlementPlan { transfers }
    }

    /// Parties with need left go back to the open heap, or to the dust heap
    /// once within epsilon.
    fn requeue<'a>(
        &self,
        party: Party<'a>,
        open: &mut BinaryHeap<Party<'a>>,
        dust: &mut BinaryHeap<Party<'a>>,
    ) {
        if party.need > self.epsilon {
            open.push(party);
        } else if party.need.is_positive() {
            dust.push(party);
        }
    }

    fn has_open_need(&self, parties: &BinaryHeap<Party<'_>>) -> bool {
        parties.peek().is_some_and(|party| party.need > self.epsilon)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn planner() -> SettlementPlanner {
        SettlementPlanner::default()
    }

    fn members() -> Vec<Member> {
        ["a", "b", "c", "d"]
            .into_iter()
            .map(|id| Member::new(id, id.to_uppercase()))
            .collect()
    }

    fn balances(entries: &[(&str, Money)]) -> MemberBalances {
        entries
            .iter()
            .map(|(id, amount)| (MemberId::from(*id), *amount))
            .collect()
    }

    fn triples(plan: &SettlementPlan) -> Vec<(&str, &str, Money)> {
        plan.iter()
            .map(|transfer| {
                (
                    transfer.from.id.as_str(),
                    transfer.to.id.as_str(),
                    transfer.amount,
                )
            })
            .collect()
    }

    #[rstest]
    #[case::one_creditor_two_debtors(
        &[("a", Money::from_i64(200)), ("b", Money::from_i64(-100)), ("c", Money::from_i64(-100))],
        vec![("b", "a", Money::from_i64(100)), ("c", "a", Money::from_i64(100))]
    )]
    #[case::single_debtor_left(
        &[("a", Money::from_i64(100)), ("b", Money::ZERO), ("c", Money::from_i64(-100))],
        vec![("c", "a", Money::from_i64(100))]
    )]
    #[case::largest_need_first(
        &[
            ("a", Money::from_i64(30)),
            ("b", Money::from_i64(70)),
            ("c", Money::from_i64(-20)),
            ("d", Money::from_i64(-80)),
        ],
        vec![
            ("d", "b", Money::from_i64(70)),
            ("c", "a", Money::from_i64(20)),
            ("d", "a", Money::from_i64(10)),
        ]
    )]
    #[case::dust_is_ignored(
        &[("a", Money::new(1, 2)), ("b", Money::new(-1, 2))],
        vec![]
    )]
    #[case::all_even(&[("a", Money::ZERO), ("b", Money::ZERO)], vec![])]
    fn plan_cases(
        planner: SettlementPlanner,
        #[case] input: &[(&str, Money)],
        #[case] expected: Vec<(&str, &str, Money)>,
    ) {
        let plan = planner.plan(&members(), &balances(input));
        assert_eq!(triples(&plan), expected);
    }

    #[rstest]
    fn dust_debtors_are_swept_when_a_creditor_is_left_open(planner: SettlementPlanner) {
        let mut input = balances(&[
            ("a", Money::new(3, 2)),
            ("b", Money::new(-1, 2)),
            ("c", Money::new(-1, 2)),
            ("d", Money::new(-1, 2)),
        ]);

        let plan = planner.plan(&members(), &input);
        plan.apply_to(&mut input);

        assert_eq!(
            triples(&plan),
            vec![("b", "a", Money::new(1, 2)), ("c", "a", Money::new(1, 2))]
        );
        assert!(input.values().all(|balance| balance.is_within(SETTLEMENT_EPSILON)));
    }

    #[rstest]
    fn dust_creditors_are_swept_when_a_debtor_is_left_open(planner: SettlementPlanner) {
        let input = balances(&[
            ("a", Money::new(-3, 2)),
            ("b", Money::new(1, 2)),
            ("c", Money::new(1, 2)),
            ("d", Money::new(1, 2)),
        ]);

        let plan = planner.plan(&members(), &input);

        assert_eq!(
            triples(&plan),
            vec![("a", "b", Money::new(1, 2)), ("a", "c", Money::new(1, 2))]
        );
    }

    #[rstest]
    fn leftovers_of_settled_debtors_cover_a_late_creditor(planner: SettlementPlanner) {
        let members: Vec<Member> = ["a", "b", "c", "d", "e"]
            .into_iter()
            .map(|id| Member::new(id, id.to_uppercase()))
            .collect();
        let mut input = balances(&[
            ("a", Money::new(2, 2)),
            ("b", Money::new(2, 2)),
            ("c", Money::new(2, 2)),
            ("d", Money::new(-3, 2)),
            ("e", Money::new(-3, 2)),
        ]);

        let plan = planner.plan(&members, &input);
        plan.apply_to(&mut input);

        assert_eq!(
            triples(&plan),
            vec![
                ("d", "a", Money::new(2, 2)),
                ("e", "b", Money::new(2, 2)),
                ("d", "c", Money::new(1, 2)),
            ]
        );
        assert!(input.values().all(|balance| balance.is_within(SETTLEMENT_EPSILON)));
    }

    #[rstest]
    fn equal_needs_break_ties_by_member_id(planner: SettlementPlanner) {
        let input = balances(&[
            ("d", Money::from_i64(50)),
            ("c", Money::from_i64(50)),
            ("b", Money::from_i64(-50)),
            ("a", Money::from_i64(-50)),
        ]);

        let plan = planner.plan(&members(), &input);

        assert_eq!(
            triples(&plan),
            vec![
                ("a", "c", Money::from_i64(50)),
                ("b", "d", Money::from_i64(50)),
            ]
        );
    }

    #[rstest]
    fn applying_plan_zeroes_balances(planner: SettlementPlanner) {
        let mut input = balances(&[
            ("a", Money::new(6667, 2)),
            ("b", Money::new(-3333, 2)),
            ("c", Money::new(-3334, 2)),
        ]);

        let plan = planner.plan(&members(), &input);
        plan.apply_to(&mut input);

        assert!(input.values().all(|balance| balance.is_within(SETTLEMENT_EPSILON)));
        assert_eq!(plan.total(), Money::new(6667, 2));
    }

    #[rstest]
    fn unknown_members_are_planned_under_their_id(planner: SettlementPlanner) {
        let input = balances(&[("a", Money::from_i64(5)), ("ghost", Money::from_i64(-5))]);

        let plan = planner.plan(&members(), &input);

        assert_eq!(plan.transfers()[0].from, Member::unnamed("ghost".into()));
        assert_eq!(plan.transfers()[0].to.display_name, "A");
    }

    #[test]
    fn drafts_carry_group_time_and_expenses() {
        let plan = SettlementPlan::new(vec![PlannedTransfer {
            from: Member::new("b", "B"),
            to: Member::new("a", "A"),
            amount: Money::from_i64(100),
        }]);
        let expense_ids: BTreeSet<ExpenseId> = [ExpenseId::from("e1")].into_iter().collect();

        let drafts = plan.to_drafts(&"g1".into(), Timestamp::from_millis(42), &expense_ids);

        assert_eq!(
            drafts,
            vec![SettlementDraft {
                group_id: "g1".into(),
                from_user_id: "b".into(),
                to_user_id: "a".into(),
                amount: Money::from_i64(100),
                settled_at: Timestamp::from_millis(42),
                expense_ids,
            }]
        );
    }
}
