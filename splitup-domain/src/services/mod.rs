pub mod activity_feed;
pub mod balance_engine;
pub mod member_summary;
pub mod settle_up_policy;
pub mod settlement_planner;
pub mod spending_report;
pub mod split_calculator;

pub use activity_feed::{ActivityFeed, ActivityItem};
pub use balance_engine::{BalanceAccumulator, BalanceEngine, ZERO_SUM_TOLERANCE};
pub use member_summary::MemberSummary;
pub use settle_up_policy::{SettleUpOutcome, SettleUpPolicy};
pub use settlement_planner::{
    PlannedTransfer, SETTLEMENT_EPSILON, SettlementPlan, SettlementPlanner,
};
pub use spending_report::{Contributor, GroupSpending, SpendingReport, ViewerStats};
pub use split_calculator::{EqualSplitRounding, SHARE_TOLERANCE, SplitCalculator};
