use crate::{
    currency::CurrencyFormat,
    text_table::{Alignment, TextTableBuilder},
};
use rust_decimal::Decimal;
use splitup_domain::{MemberSummary, SpendingReport};
use std::{borrow::Cow, fmt::Write};

pub struct SpendingReportPresenter;

impl SpendingReportPresenter {
    pub fn render(report: &SpendingReport, format: &CurrencyFormat) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Total spending: {}", format.format(report.total));

        if let Some(viewer) = &report.viewer {
            let _ = writeln!(out, "You paid: {}", format.format(viewer.paid));
            let _ = writeln!(out, "Your share: {}", format.format(viewer.share));
            let _ = writeln!(out, "Your expenses: {}", viewer.expense_count);
        }

        if !report.groups.is_empty() {
            let headers = [
                Cow::Borrowed("Group"),
                Cow::Borrowed("Amount"),
                Cow::Borrowed("Share"),
            ];
            out.push_str("\nBy group\n");
            out.push_str(
                &TextTableBuilder::new()
                    .alignments(&[Alignment::Left, Alignment::Right, Alignment::Right])
                    .headers(&headers)
                    .rows(report.groups.iter().map(|group| {
                        [
                            Cow::Borrowed(group.group_name.as_str()),
                            Cow::Owned(format.format(group.amount)),
                            Cow::Owned(percent(group.percentage)),
                        ]
                    }))
                    .build(),
            );
        }

        if !report.top_contributors.is_empty() {
            let headers = [
                Cow::Borrowed("Member"),
                Cow::Borrowed("Paid"),
                Cow::Borrowed("Expenses"),
            ];
            out.push_str("\nTop contributors\n");
            out.push_str(
                &TextTableBuilder::new()
                    .alignments(&[Alignment::Left, Alignment::Right, Alignment::Right])
                    .headers(&headers)
                    .rows(report.top_contributors.iter().map(|contributor| {
                        [
                            Cow::Borrowed(contributor.display_name.as_str()),
                            Cow::Owned(format.format(contributor.amount)),
                            Cow::Owned(contributor.expense_count.to_string()),
                        ]
                    }))
                    .build(),
            );
        }
        out
    }

    /// Home-screen totals for one member across their groups.
    pub fn render_summary(summary: &MemberSummary, format: &CurrencyFormat) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Active groups: {}", summary.active_groups);
        let _ = writeln!(out, "Others owe you: {}", format.format(summary.owed_to_member));
        let _ = writeln!(out, "You owe others: {}", format.format(summary.owed_by_member));
        let _ = writeln!(out, "Net: {}", format.format_signed(summary.net()));
        let _ = writeln!(
            out,
            "After payments: {}",
            format.format_signed(summary.balance)
        );
        out
    }
}

fn percent(value: Decimal) -> String {
    format!("{:.1}%", value.round_dp(1))
}
