use crate::{
    currency::CurrencyFormat,
    text_table::{Alignment, TextTableBuilder},
};
use splitup_application::{LedgerView, SettleUpCommit};
use splitup_domain::{ActivityItem, Member, MemberId, MemberPosition};
use std::{borrow::Cow, fmt::Write};

pub struct LedgerPresenter;

impl LedgerPresenter {
    pub fn render(view: &LedgerView, format: &CurrencyFormat, viewer: Option<&MemberId>) -> String {
        let mut out = String::new();
        let group_name = if view.snapshot.group.name.is_empty() {
            view.group_id().as_str()
        } else {
            view.snapshot.group.name.as_str()
        };
        let _ = writeln!(out, "{group_name}");
        let _ = writeln!(
            out,
            "Unsettled expenses: {}",
            format.format(view.total_unsettled)
        );

        if let Some(viewer) = viewer {
            let _ = writeln!(out, "{}", Self::position_line(view.position(viewer), format));
        }

        out.push_str("\nBalances\n");
        out.push_str(&Self::balance_table(view, format));

        out.push_str("\nSuggested settlements\n");
        if view.plan.is_empty() {
            out.push_str("All settled up\n");
        } else {
            out.push_str(&Self::plan_table(view, format));
        }

        let feed = view.feed();
        if !feed.is_empty() {
            out.push_str("\nActivity\n");
            out.push_str(&Self::feed_table(view.members(), &feed, format));
        }
        out
    }

    /// Store writes and payments of a settle-up, all taken from the commit.
    pub fn render_commit(commit: &SettleUpCommit, format: &CurrencyFormat) -> String {
        let mut out = String::from("Expenses to mark settled:\n");
        for expense_id in &commit.expenses_to_settle {
            let _ = writeln!(out, "  {expense_id}");
        }
        out.push_str("Payments:\n");
        for transfer in &commit.plan {
            let _ = writeln!(
                out,
                "  {} → {} {}",
                transfer.from.display_name,
                transfer.to.display_name,
                format.format(transfer.amount)
            );
        }
        out
    }

    pub fn position_line(position: MemberPosition, format: &CurrencyFormat) -> String {
        match (position.owed.is_positive(), position.owes.is_positive()) {
            (true, _) => format!("You are owed {}", format.format(position.owed)),
            (_, true) => format!("You owe {}", format.format(position.owes)),
            _ => "You are settled up".to_owned(),
        }
    }

    pub fn balance_table(view: &LedgerView, format: &CurrencyFormat) -> String {
        let headers = [Cow::Borrowed("Member"), Cow::Borrowed("Balance")];
        TextTableBuilder::new()
            .alignments(&[Alignment::Left, Alignment::Right])
            .headers(&headers)
            .rows(view.balances.iter().map(|(id, balance)| {
                [
                    display_name(view.members(), id),
                    Cow::Owned(format.format_signed(*balance)),
                ]
            }))
            .build()
    }

    pub fn plan_table(view: &LedgerView, format: &CurrencyFormat) -> String {
        let headers = [
            Cow::Borrowed("From"),
            Cow::Borrowed(""),
            Cow::Borrowed("To"),
            Cow::Borrowed("Amount"),
        ];
        TextTableBuilder::new()
            .alignments(&[
                Alignment::Left,
                Alignment::Left,
                Alignment::Left,
                Alignment::Right,
            ])
            .headers(&headers)
            .rows(view.plan.iter().map(|transfer| {
                [
                    Cow::Borrowed(transfer.from.display_name.as_str()),
                    Cow::Borrowed("→"),
                    Cow::Borrowed(transfer.to.display_name.as_str()),
                    Cow::Owned(format.format(transfer.amount)),
                ]
            }))
            .build()
    }

    fn feed_table(members: &[Member], feed: &[ActivityItem<'_>], format: &CurrencyFormat) -> String {
        TextTableBuilder::new()
            .alignments(&[Alignment::Left, Alignment::Left, Alignment::Right])
            .rows(feed.iter().map(|item| match item {
                ActivityItem::Expense(expense) => {
                    let label = if expense.description.is_empty() {
                        Cow::Borrowed("Expense")
                    } else {
                        Cow::Borrowed(expense.description.as_str())
                    };
                    [
                        label,
                        Cow::Owned(format!(
                            "paid by {}",
                            display_name(members, &expense.paid_by)
                        )),
                        Cow::Owned(format.format(expense.amount)),
                    ]
                }
                ActivityItem::Settlement(settlement) => [
                    Cow::Borrowed("Settlement"),
                    Cow::Owned(format!(
                        "{} → {}",
                        display_name(members, &settlement.from_user_id),
                        display_name(members, &settlement.to_user_id)
                    )),
                    Cow::Owned(format.format(settlement.amount)),
                ],
            }))
            .build()
    }
}

fn display_name<'a>(members: &'a [Member], id: &'a MemberId) -> Cow<'a, str> {
    members
        .iter()
        .find(|member| &member.id == id)
        .map_or(Cow::Borrowed(id.as_str()), |member| {
            Cow::Borrowed(member.display_name.as_str())
        })
}
