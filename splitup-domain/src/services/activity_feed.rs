use crate::model::{Expense, GroupId, Money, SettlementRecord, Timestamp};
use std::cmp::Reverse;

/// Entry of a group's combined transaction history.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ActivityItem<'a> {
    Expense(&'a Expense),
    Settlement(&'a SettlementRecord),
}

impl<'a> ActivityItem<'a> {
    pub fn timestamp(&self) -> Timestamp {
        match self {
            ActivityItem::Expense(expense) => expense.created_at,
            ActivityItem::Settlement(settlement) => settlement.settled_at,
        }
    }

    pub fn id(&self) -> &'a str {
        match self {
            ActivityItem::Expense(expense) => expense.id.as_str(),
            ActivityItem::Settlement(settlement) => settlement.id.as_str(),
        }
    }

    pub fn group_id(&self) -> &'a GroupId {
        match self {
            ActivityItem::Expense(expense) => &expense.group_id,
            ActivityItem::Settlement(settlement) => &settlement.group_id,
        }
    }

    pub fn amount(&self) -> Money {
        match self {
            ActivityItem::Expense(expense) => expense.amount,
            ActivityItem::Settlement(settlement) => settlement.amount,
        }
    }

    fn kind_rank(&self) -> u8 {
        match self {
            ActivityItem::Expense(_) => 0,
            ActivityItem::Settlement(_) => 1,
        }
    }
}

pub struct ActivityFeed;

impl ActivityFeed {
    /// Unsettled expenses and all settlement records, newest first. Entries
    /// sharing a timestamp list expenses before settlements, then by id.
    pub fn build<'a>(
        expenses: &'a [Expense],
        settlements: &'a [SettlementRecord],
    ) -> Vec<ActivityItem<'a>> {
        let mut items: Vec<ActivityItem<'a>> = expenses
            .iter()
            .filter(|expense| !expense.is_settled)
            .map(ActivityItem::Expense)
            .chain(settlements.iter().map(ActivityItem::Settlement))
            .collect();

        items.sort_by(|a, b| {
            (Reverse(a.timestamp()), a.kind_rank(), a.id()).cmp(&(
                Reverse(b.timestamp()),
                b.kind_rank(),
                b.id(),
            ))
        });
        items
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merges_newest_first_and_hides_settled_expenses() {
        let expenses = vec![
            Expense::equal("e1", "g1", Money::from_i64(10), "a", ["a", "b"])
                .created_at(Timestamp::from_millis(100)),
            Expense::equal("e2", "g1", Money::from_i64(20), "a", ["a", "b"])
                .created_at(Timestamp::from_millis(300))
                .settled(),
            Expense::equal("e3", "g1", Money::from_i64(30), "b", ["a", "b"])
                .created_at(Timestamp::from_millis(200)),
        ];
        let settlements = vec![
            SettlementRecord::new("s1", "g1", "b", "a", Money::from_i64(5))
                .settled_at(Timestamp::from_millis(250)),
            SettlementRecord::new("s2", "g1", "a", "b", Money::from_i64(1))
                .settled_at(Timestamp::from_millis(200)),
        ];

        let feed = ActivityFeed::build(&expenses, &settlements);
        let ids: Vec<&str> = feed.iter().map(ActivityItem::id).collect();

        assert_eq!(ids, vec!["s1", "e3", "s2", "e1"]);
        assert_eq!(feed[0].amount(), Money::from_i64(5));
        assert_eq!(feed[1].timestamp(), Timestamp::from_millis(200));
    }

    #[test]
    fn empty_inputs_give_empty_feed() {
        assert!(ActivityFeed::build(&[], &[]).is_empty());
    }
}
