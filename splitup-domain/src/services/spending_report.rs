use crate::{
    model::{Expense, Group, GroupId, Member, MemberId, Money},
    services::split_calculator::SplitCalculator,
};
use fxhash::FxHashMap;
use indexmap::IndexMap;
use rust_decimal::Decimal;
use std::collections::BTreeMap;

pub const UNKNOWN_GROUP_NAME: &str = "Unknown Group";
pub const UNKNOWN_MEMBER_NAME: &str = "Unknown";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GroupSpending {
    pub group_id: GroupId,
    pub group_name: String,
    pub amount: Money,
    /// Share of the report total, 0..=100.
    pub percentage: Decimal,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Contributor {
    pub member_id: MemberId,
    pub display_name: String,
    pub amount: Money,
    pub expense_count: usize,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ViewerStats {
    /// Sum of expenses the viewer paid for.
    pub paid: Money,
    /// Sum of the viewer's shares across all expenses.
    pub share: Money,
    /// Expenses the viewer paid for or takes part in.
    pub expense_count: usize,
}

/// Spending overview across the open expenses of a set of groups. Settled
/// expenses are left out of every figure.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SpendingReport {
    pub total: Money,
    pub groups: Vec<GroupSpending>,
    pub top_contributors: Vec<Contributor>,
    pub viewer: Option<ViewerStats>,
}

impl SpendingReport {
    /// Groups and contributors are ordered by amount, largest first; ties
    /// keep first-seen group order and ascending member id.
    pub fn build(
        groups: &[Group],
        members: &[Member],
        expenses: &[Expense],
        viewer: Option<&MemberId>,
        top_n: usize,
        calculator: &SplitCalculator,
    ) -> Self {
        let expenses: Vec<&Expense> = expenses.iter().filter(|e| !e.is_settled).collect();
        let total = expenses
            .iter()
            .fold(Money::ZERO, |sum, expense| sum.saturating_add(expense.amount));

        let group_names: FxHashMap<&GroupId, &str> = groups
            .iter()
            .map(|group| (&group.id, group.name.as_str()))
            .collect();
        let mut per_group: IndexMap<&GroupId, Money> = IndexMap::new();
        for expense in &expenses {
            let amount = per_group.entry(&expense.group_id).or_insert(Money::ZERO);
            *amount = amount.saturating_add(expense.amount);
        }
        let mut group_spending: Vec<GroupSpending> = per_group
            .into_iter()
            .map(|(group_id, amount)| GroupSpending {
                group_id: group_id.clone(),
                group_name: group_names
                    .get(group_id)
                    .copied()
                    .unwrap_or(UNKNOWN_GROUP_NAME)
                    .to_owned(),
                amount,
                percentage: percentage_of(amount, total),
            })
            .collect();
        group_spending.sort_by(|a, b| b.amount.cmp(&a.amount));

        let member_names: FxHashMap<&MemberId, &str> = members
            .iter()
            .map(|member| (&member.id, member.display_name.as_str()))
            .collect();
        let mut per_payer: BTreeMap<&MemberId, (Money, usize)> = BTreeMap::new();
        for expense in &expenses {
            let entry = per_payer
                .entry(&expense.paid_by)
                .or_insert((Money::ZERO, 0));
            entry.0 = entry.0.saturating_add(expense.amount);
            entry.1 += 1;
        }
        let mut contributors: Vec<Contributor> = per_payer
            .into_iter()
            .map(|(member_id, (amount, expense_count))| Contributor {
                member_id: member_id.clone(),
                display_name: member_names
                    .get(member_id)
                    .copied()
                    .unwrap_or(UNKNOWN_MEMBER_NAME)
                    .to_owned(),
                amount,
                expense_count,
            })
            .collect();
        contributors.sort_by(|a, b| b.amount.cmp(&a.amount));
        contributors.truncate(top_n);

        let viewer = viewer.map(|viewer| viewer_stats(viewer, &expenses, calculator));

        Self {
            total,
            groups: group_spending,
            top_contributors: contributors,
            viewer,
        }
    }
}

fn percentage_of(amount: Money, total: Money) -> Decimal {
    if total.is_positive() {
        amount.as_decimal() / total.as_decimal() * Decimal::ONE_HUNDRED
    } else {
        Decimal::ZERO
    }
}

fn viewer_stats(viewer: &MemberId, expenses: &[&Expense], calculator: &SplitCalculator) -> ViewerStats {
    let mut stats = ViewerStats::default();
    for &expense in expenses {
        if &expense.paid_by == viewer {
            stats.paid = stats.paid.saturating_add(expense.amount);
        }
        // Expenses that cannot be split contribute no share.
        let share = calculator
            .share_for(expense, viewer)
            .unwrap_or(Money::ZERO);
        stats.share = stats.share.saturating_add(share);
        if expense.involves(viewer) {
            stats.expense_count += 1;
        }
    }
    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SplitPolicy;
    use rstest::{fixture, rstest};

    #[fixture]
    fn groups() -> Vec<Group> {
        vec![
            Group {
                id: "trip".into(),
                name: "Goa trip".to_owned(),
                ..Group::default()
            },
            Group {
                id: "flat".into(),
                name: "Flat".to_owned(),
                ..Group::default()
            },
        ]
    }

    #[fixture]
    fn members() -> Vec<Member> {
        vec![Member::new("a", "Asha"), Member::new("b", "Bilal")]
    }

    #[fixture]
    fn expenses() -> Vec<Expense> {
        vec![
            Expense::equal("e1", "flat", Money::from_i64(100), "a", ["a", "b"]),
            Expense::equal("e2", "trip", Money::from_i64(250), "b", ["a", "b"]),
            Expense::with_shares(
                "e3",
                "trip",
                Money::from_i64(150),
                "b",
                SplitPolicy::Percentage,
                [("b", Decimal::from(100))],
            ),
            Expense::equal("e4", "lost", Money::from_i64(500), "z", ["z"]),
            Expense::equal("e5", "flat", Money::from_i64(1000), "a", ["a", "b"]).settled(),
        ]
    }

    #[rstest]
    fn aggregates_groups_and_contributors(
        groups: Vec<Group>,
        members: Vec<Member>,
        expenses: Vec<Expense>,
    ) {
        let report = SpendingReport::build(
            &groups,
            &members,
            &expenses,
            None,
            5,
            &SplitCalculator::default(),
        );

        assert_eq!(report.total, Money::from_i64(1000));
        let group_rows: Vec<(&str, &str, Money, Decimal)> = report
            .groups
            .iter()
            .map(|g| {
                (
                    g.group_id.as_str(),
                    g.group_name.as_str(),
                    g.amount,
                    g.percentage,
                )
            })
            .collect();
        assert_eq!(
            group_rows,
            vec![
                ("lost", UNKNOWN_GROUP_NAME, Money::from_i64(500), Decimal::from(50)),
                ("trip", "Goa trip", Money::from_i64(400), Decimal::from(40)),
                ("flat", "Flat", Money::from_i64(100), Decimal::from(10)),
            ]
        );

        let contributors: Vec<(&str, &str, usize)> = report
            .top_contributors
            .iter()
            .map(|c| (c.member_id.as_str(), c.display_name.as_str(), c.expense_count))
            .collect();
        assert_eq!(
            contributors,
            vec![
                ("z", UNKNOWN_MEMBER_NAME, 1),
                ("b", "Bilal", 2),
                ("a", "Asha", 1),
            ]
        );
        assert_eq!(report.viewer, None);
    }

    #[rstest]
    fn truncates_to_top_n(groups: Vec<Group>, members: Vec<Member>, expenses: Vec<Expense>) {
        let report = SpendingReport::build(
            &groups,
            &members,
            &expenses,
            None,
            1,
            &SplitCalculator::default(),
        );

        assert_eq!(report.top_contributors.len(), 1);
        assert_eq!(report.top_contributors[0].amount, Money::from_i64(500));
    }

    #[rstest]
    fn viewer_stats_use_split_shares(
        groups: Vec<Group>,
        members: Vec<Member>,
        expenses: Vec<Expense>,
    ) {
        let viewer = MemberId::from("a");
        let report = SpendingReport::build(
            &groups,
            &members,
            &expenses,
            Some(&viewer),
            5,
            &SplitCalculator::default(),
        );

        assert_eq!(
            report.viewer,
            Some(ViewerStats {
                paid: Money::from_i64(100),
                share: Money::from_i64(175),
                expense_count: 2,
            })
        );
    }

    #[test]
    fn empty_report_has_zero_percentages() {
        let report = SpendingReport::build(&[], &[], &[], None, 5, &SplitCalculator::default());
        assert_eq!(report, SpendingReport::default());
    }
}
