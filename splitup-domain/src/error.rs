use thiserror::Error;

use crate::model::{ExpenseId, GroupId, MemberId, Money, SplitPolicy};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SplitError {
    #[error("{policy} shares of expense {expense_id} sum to {actual}, expected {expected}")]
    ShareMismatch {
        expense_id: ExpenseId,
        policy: SplitPolicy,
        expected: Money,
        actual: Money,
    },
    #[error("expense {expense_id} has no participants")]
    EmptySplitSet { expense_id: ExpenseId },
    #[error("unknown split policy `{0}`")]
    UnknownPolicy(String),
    #[error("expense {expense_id} amount must be positive (found {amount})")]
    InvalidAmount { expense_id: ExpenseId, amount: Money },
    #[error("shares of expense {expense_id} exceed the representable amount range")]
    AmountOverflow { expense_id: ExpenseId },
}

/// Reasons a record cannot be booked into running balances.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BalanceError {
    #[error(transparent)]
    Split(#[from] SplitError),
    #[error("balance of {member_id} leaves the representable range applying {record_id}")]
    Overflow {
        record_id: String,
        member_id: MemberId,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SettleUpError {
    #[error("group {0} has no unsettled expenses")]
    NothingToSettle(GroupId),
}
