#![warn(clippy::uninlined_format_args)]

pub mod error;
pub mod model;
pub mod services;

pub use error::{BalanceError, SettleUpError, SplitError};
pub use model::{
    Expense, ExpenseId, Group, GroupId, Member, MemberBalances, MemberId, MemberPosition, Money,
    SettlementDraft, SettlementId, SettlementRecord, SplitPolicy, Timestamp,
};
pub use services::{
    ActivityFeed, ActivityItem, BalanceAccumulator, BalanceEngine, Contributor,
    EqualSplitRounding, GroupSpending, MemberSummary, PlannedTransfer, SettleUpOutcome,
    SettleUpPolicy, SettlementPlan, SettlementPlanner, SpendingReport, SplitCalculator,
    ViewerStats,
};
