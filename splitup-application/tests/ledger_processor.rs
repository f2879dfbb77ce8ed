use rstest::{fixture, rstest};
use splitup_application::{
    GroupSnapshot, LedgerError, LedgerProcessor, LedgerSnapshotSource, SnapshotError,
};
use splitup_domain::{
    ActivityItem, BalanceEngine, Expense, ExpenseId, Group, GroupId, Member, MemberId,
    MemberPosition, MemberSummary, Money, SettleUpError, SettlementRecord, SplitError, SplitPolicy, Timestamp,
};
use rust_decimal::Decimal;
use std::collections::HashMap;

struct InMemorySource {
    groups: HashMap<GroupId, GroupSnapshot>,
}

impl LedgerSnapshotSource for InMemorySource {
    fn load_group(&self, group_id: &GroupId) -> Result<GroupSnapshot, SnapshotError> {
        self.groups
            .get(group_id)
            .cloned()
            .ok_or_else(|| SnapshotError::GroupNotFound(group_id.clone()))
    }

    fn groups_of(&self, member: &MemberId) -> Result<Vec<GroupSnapshot>, SnapshotError> {
        let mut groups: Vec<GroupSnapshot> = self
            .groups
            .values()
            .filter(|snapshot| snapshot.group.member_ids.contains(member))
            .cloned()
            .collect();
        groups.sort_by(|a, b| a.group.id.cmp(&b.group.id));
        Ok(groups)
    }
}

fn snapshot(expenses: Vec<Expense>, settlements: Vec<SettlementRecord>) -> GroupSnapshot {
    GroupSnapshot {
        group: Group {
            id: "g1".into(),
            name: "Flat".to_owned(),
            member_ids: ["a", "b", "c"].into_iter().map(Into::into).collect(),
            ..Group::default()
        },
        members: vec![
            Member::new("a", "Asha"),
            Member::new("b", "Bilal"),
            Member::new("c", "Chen"),
        ],
        expenses,
        settlements,
    }
}

#[fixture]
fn source() -> InMemorySource {
    let open = snapshot(
        vec![
            Expense::equal("e1", "g1", Money::from_i64(300), "a", ["a", "b", "c"])
                .created_at(Timestamp::from_millis(10)),
            Expense::equal("e0", "g1", Money::from_i64(60), "b", ["a", "b"])
                .created_at(Timestamp::from_millis(5))
                .settled(),
        ],
        vec![
            SettlementRecord::new("s1", "g1", "b", "a", Money::from_i64(100))
                .settled_at(Timestamp::from_millis(20)),
        ],
    );
    let closed = GroupSnapshot {
        group: Group {
            id: "g2".into(),
            ..Group::default()
        },
        ..snapshot(
            vec![Expense::equal("e9", "g2", Money::from_i64(10), "a", ["a", "b"]).settled()],
            vec![],
        )
    };
    InMemorySource {
        groups: [(GroupId::from("g1"), open), (GroupId::from("g2"), closed)]
            .into_iter()
            .collect(),
    }
}

#[rstest]
fn refresh_builds_balances_plan_and_feed(source: InMemorySource) {
    let engine = BalanceEngine::default();
    let processor = LedgerProcessor::new(&source, &engine);

    let view = processor.refresh(&"g1".into()).expect("group exists");

    assert_eq!(view.balance_of(&"a".into()), Money::from_i64(100));
    assert_eq!(view.balance_of(&"b".into()), Money::ZERO);
    assert_eq!(view.balance_of(&"c".into()), Money::from_i64(-100));
    assert_eq!(view.total_unsettled, Money::from_i64(300));
    assert_eq!(view.plan.len(), 1);
    assert_eq!(view.plan.transfers()[0].from.display_name, "Chen");
    assert_eq!(view.plan.transfers()[0].to.display_name, "Asha");

    let feed: Vec<&str> = view.feed().iter().map(ActivityItem::id).collect();
    assert_eq!(feed, vec!["s1", "e1"]);
}

#[rstest]
fn position_splits_owed_and_owes(source: InMemorySource) {
    let engine = BalanceEngine::default();
    let processor = LedgerProcessor::new(&source, &engine);

    assert_eq!(
        processor.position(&"g1".into(), &"c".into()),
        Ok(MemberPosition {
            owed: Money::ZERO,
            owes: Money::from_i64(100),
        })
    );
}

#[rstest]
fn missing_group_is_reported(source: InMemorySource) {
    let engine = BalanceEngine::default();
    let processor = LedgerProcessor::new(&source, &engine);

    let err = processor.refresh(&"nope".into()).expect_err("group is missing");

    assert_eq!(
        err,
        LedgerError::Snapshot(SnapshotError::GroupNotFound("nope".into()))
    );
}

#[rstest]
fn settle_up_lists_open_expenses(source: InMemorySource) {
    let engine = BalanceEngine::default();
    let processor = LedgerProcessor::new(&source, &engine);

    let commit = processor.settle_up(&"g1".into()).expect("open expense");
    assert_eq!(commit.expenses_to_settle, vec![ExpenseId::from("e1")]);
    assert_eq!(commit.plan.total(), Money::from_i64(100));

    assert_eq!(
        processor.settle_up(&"g2".into()),
        Err(LedgerError::SettleUp(SettleUpError::NothingToSettle(
            "g2".into()
        )))
    );
}

#[rstest]
fn drafts_reference_open_expenses(source: InMemorySource) {
    let engine = BalanceEngine::default();
    let processor = LedgerProcessor::new(&source, &engine);
    let view = processor.refresh(&"g1".into()).expect("group exists");

    let drafts = LedgerProcessor::draft_settlements(&view, Timestamp::from_millis(99));

    assert_eq!(drafts.len(), 1);
    assert_eq!(drafts[0].from_user_id.as_str(), "c");
    assert_eq!(drafts[0].to_user_id.as_str(), "a");
    assert_eq!(drafts[0].settled_at, Timestamp::from_millis(99));
    assert_eq!(
        drafts[0].expense_ids.iter().map(ExpenseId::as_str).collect::<Vec<_>>(),
        vec!["e1"]
    );
}

#[rstest]
fn validate_expense_rejects_bad_shares(source: InMemorySource) {
    let engine = BalanceEngine::default();
    let processor = LedgerProcessor::new(&source, &engine);
    let expense = Expense::with_shares(
        "e5",
        "g1",
        Money::from_i64(100),
        "a",
        SplitPolicy::Percentage,
        [("a", Decimal::from(60)), ("b", Decimal::from(30))],
    );

    let err = processor
        .validate_expense(&expense)
        .expect_err("shares do not add up");

    assert!(matches!(
        err,
        LedgerError::InvalidExpense(SplitError::ShareMismatch { .. })
    ));
}

#[rstest]
fn member_summary_covers_every_group_of_the_member(source: InMemorySource) {
    let engine = BalanceEngine::default();
    let processor = LedgerProcessor::new(&source, &engine);

    let summary = processor
        .member_summary(&MemberId::from("a"))
        .expect("source is available");
    assert_eq!(
        summary,
        MemberSummary {
            owed_to_member: Money::from_i64(200),
            owed_by_member: Money::ZERO,
            active_groups: 1,
            balance: Money::from_i64(100),
        }
    );
    assert_eq!(summary.net(), Money::from_i64(200));

    assert_eq!(
        processor.member_summary(&MemberId::from("z")),
        Ok(MemberSummary::default())
    );
}
